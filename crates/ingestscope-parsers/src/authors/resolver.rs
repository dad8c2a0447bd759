//! Structured contributor lists: affiliation labels resolved against the
//! fragment's own affiliation table.

use std::collections::HashMap;

use ingestscope_core::AuthorEntry;
use ingestscope_core::Element;
use ingestscope_core::clean::clean_text;
use tracing::warn;

use super::orcid::extract_orcid;

/// Label to display text, scoped to one fragment.
#[derive(Debug, Clone, Default)]
pub struct AffiliationTable {
    entries: HashMap<String, String>,
}

impl AffiliationTable {
    /// Collect every `affiliation` element under `scope` that carries an
    /// `xml:id`.
    pub fn build(scope: &Element) -> Self {
        let mut table = Self::default();
        for affiliation in scope.find_all("affiliation") {
            if let Some(label) = affiliation.attr("xml:id") {
                table.insert(label, affiliation.text_with_separator(", "));
            }
        }
        table
    }

    pub fn insert(&mut self, label: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(label.into(), text.into());
    }

    /// Canonical label and text for `label`, tolerating a leading `#`.
    pub fn resolve<'a>(&'a self, label: &str) -> Option<(&'a str, &'a str)> {
        let lookup = |key: &str| {
            self.entries
                .get_key_value(key)
                .map(|(k, v)| (k.as_str(), v.as_str()))
        };
        lookup(label).or_else(|| label.strip_prefix('#').and_then(lookup))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResolvedAuthors {
    pub authors: Vec<AuthorEntry>,
    /// Labels referenced by a creator but absent from the table.
    pub unresolved: Vec<String>,
}

pub struct AuthorResolver<'t> {
    table: &'t AffiliationTable,
}

impl<'t> AuthorResolver<'t> {
    pub fn new(table: &'t AffiliationTable) -> Self {
        Self { table }
    }

    /// Resolve every `creator` element under `scope`, in document order.
    pub fn resolve(&self, scope: &Element) -> ResolvedAuthors {
        let mut out = ResolvedAuthors::default();
        for creator in scope.find_all("creator") {
            let author = self.resolve_creator(creator, &mut out.unresolved);
            if !author.is_empty() {
                out.authors.push(author);
            }
        }
        out
    }

    fn resolve_creator(&self, creator: &Element, unresolved: &mut Vec<String>) -> AuthorEntry {
        let text_of = |query: &str| {
            creator
                .find(query)
                .map(|el| clean_text(&el.text()))
                .filter(|t| !t.is_empty())
        };

        let mut author = AuthorEntry {
            given: text_of("givenNames"),
            surname: text_of("familyName"),
            email: text_of("email"),
            ..Default::default()
        };
        if author.given.is_none() && author.surname.is_none() {
            author.collab = text_of("groupName");
        }

        author.orcid = creator
            .find_all("id")
            .into_iter()
            .filter(|id| id.attr_is("type", "orcid"))
            .find_map(|id| id.attr("value").and_then(extract_orcid));

        if let Some(refs) = creator.attr("affiliationRef") {
            for label in refs.split_whitespace() {
                match self.table.resolve(label) {
                    Some((key, text)) => author.push_affiliation(key, text),
                    None => {
                        warn!(label, "affiliation label not found in document");
                        unresolved.push(label.to_string());
                    }
                }
            }
        }
        author
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingestscope_core::Document;

    const CONTENT: &str = r##"<contentMeta>
  <creators>
    <creator creatorRole="author" affiliationRef="#a1 a2">
      <personName><givenNames>Jane</givenNames><familyName>Doe</familyName></personName>
      <id type="orcid" value="https://orcid.org/0000-0002-1825-0097"/>
      <contactDetails><email>jane@example.org</email></contactDetails>
    </creator>
    <creator creatorRole="author" affiliationRef="#a9 a2">
      <personName><givenNames>Rick</givenNames><familyName>Roe</familyName></personName>
    </creator>
    <creator creatorRole="author" affiliationRef="#a1">
      <groupName>The Example Consortium</groupName>
    </creator>
  </creators>
  <affiliationGroup>
    <affiliation xml:id="a1" countryCode="GB">
      <orgDiv>Department of Physics</orgDiv>
      <orgName>University of Somewhere</orgName>
      <address><city>Town</city></address>
    </affiliation>
    <affiliation xml:id="a2"><orgName>Institute</orgName></affiliation>
  </affiliationGroup>
</contentMeta>"##;

    fn resolve() -> ResolvedAuthors {
        let doc = Document::parse(CONTENT).unwrap();
        let table = AffiliationTable::build(doc.root());
        assert_eq!(table.len(), 2);
        AuthorResolver::new(&table).resolve(doc.root())
    }

    #[test]
    fn table_joins_descendant_text() {
        let doc = Document::parse(CONTENT).unwrap();
        let table = AffiliationTable::build(doc.root());
        assert_eq!(
            table.resolve("#a1"),
            Some(("a1", "Department of Physics, University of Somewhere, Town"))
        );
        assert_eq!(table.resolve("a2"), Some(("a2", "Institute")));
        assert_eq!(table.resolve("a3"), None);
    }

    #[test]
    fn resolves_people_with_parallel_affiliations() {
        let resolved = resolve();
        assert_eq!(resolved.authors.len(), 3);

        let jane = &resolved.authors[0];
        assert_eq!(jane.given.as_deref(), Some("Jane"));
        assert_eq!(jane.surname.as_deref(), Some("Doe"));
        assert_eq!(jane.orcid.as_deref(), Some("0000-0002-1825-0097"));
        assert_eq!(jane.email.as_deref(), Some("jane@example.org"));
        assert_eq!(jane.xaff, vec!["a1", "a2"]);
        assert_eq!(jane.aff[1], "Institute");

        for author in &resolved.authors {
            assert_eq!(author.aff.len(), author.xaff.len());
        }
    }

    #[test]
    fn unresolved_labels_are_skipped_and_reported() {
        let resolved = resolve();
        let rick = &resolved.authors[1];
        assert_eq!(rick.xaff, vec!["a2"]);
        assert_eq!(resolved.unresolved, vec!["#a9"]);
    }

    #[test]
    fn group_name_becomes_collaboration() {
        let resolved = resolve();
        let group = &resolved.authors[2];
        assert_eq!(group.collab.as_deref(), Some("The Example Consortium"));
        assert!(group.surname.is_none());
        assert_eq!(group.xaff, vec!["a1"]);
    }
}
