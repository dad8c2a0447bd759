//! arXiv OAI-PMH records in Dublin Core (`oai_dc`).

use ingestscope_core::clean::{clean_optional, clean_text};
use ingestscope_core::config::ArxivConfig;
use ingestscope_core::{
    Comment, Document, Element, IngestError, Keyword, Preprint, RecordDraft, Result,
};
use tracing::trace;

use crate::authors::{CollaborationParams, NameSplitter};
use crate::context::ExtractionContext;
use crate::dispatch::{DialectKind, Extractor, SchemaRequirement};

const METADATA_ROOT: &str = "record/metadata/oai_dc:dc";

struct ArxivScope<'a> {
    header: Option<&'a Element>,
    metadata: &'a Element,
}

type ArxivContext<'a> = ExtractionContext<'a, ArxivScope<'a>>;
type Step = fn(&ArxivExtractor, &mut ArxivContext<'_>) -> Result<()>;

const STEPS: &[(&str, Step)] = &[
    ("ids", ArxivExtractor::parse_ids),
    ("title", ArxivExtractor::parse_title),
    ("authors", ArxivExtractor::parse_authors),
    ("pubdate", ArxivExtractor::parse_pubdate),
    ("abstract", ArxivExtractor::parse_abstract),
    ("keywords", ArxivExtractor::parse_keywords),
];

pub struct ArxivExtractor {
    schema: SchemaRequirement,
    names: NameSplitter,
}

impl Default for ArxivExtractor {
    fn default() -> Self {
        Self::new(&ArxivConfig::default())
    }
}

impl ArxivExtractor {
    pub fn new(config: &ArxivConfig) -> Self {
        Self {
            schema: SchemaRequirement {
                root: METADATA_ROOT,
                attribute: "xmlns:oai_dc",
                supported: config.schemas.clone(),
            },
            names: NameSplitter::new(CollaborationParams::from(config)),
        }
    }

    /// Preprint id from the OAI header (`oai:arXiv.org:<id>`), DOI from any
    /// `doi:`-prefixed `dc:identifier`.
    fn parse_ids(&self, ctx: &mut ArxivContext<'_>) -> Result<()> {
        if let Some(identifier) = ctx.scope.header.and_then(|h| h.find("identifier")) {
            let raw = identifier.text();
            let arxiv_id = raw.trim().rsplit(':').next().unwrap_or_default().trim();
            if !arxiv_id.is_empty() {
                ctx.draft.publication = Some(format!("eprint arXiv:{arxiv_id}"));
                ctx.draft.ids.preprint = Some(Preprint {
                    source: "arXiv".to_string(),
                    id: arxiv_id.to_string(),
                });
            }
        }

        for node in ctx.scope.metadata.find_all("dc:identifier") {
            let text = node.text();
            if text.contains("doi:") {
                ctx.draft.ids.doi = clean_optional(Some(text.replace("doi:", "")));
            }
        }
        Ok(())
    }

    fn parse_title(&self, ctx: &mut ArxivContext<'_>) -> Result<()> {
        let titles: Vec<String> = ctx
            .scope
            .metadata
            .find_all("dc:title")
            .into_iter()
            .map(|t| t.text())
            .collect();
        let title = clean_text(&titles.join(": "));
        if title.is_empty() {
            return Err(IngestError::MissingTitle);
        }
        ctx.draft.title = Some(title);
        Ok(())
    }

    fn parse_authors(&self, ctx: &mut ArxivContext<'_>) -> Result<()> {
        let authors: Vec<_> = ctx
            .scope
            .metadata
            .find_all("dc:creator")
            .into_iter()
            .flat_map(|creator| self.names.split(&creator.text()))
            .collect();
        if authors.is_empty() {
            return Err(IngestError::MissingAuthors);
        }
        ctx.draft.authors = authors;
        Ok(())
    }

    fn parse_pubdate(&self, ctx: &mut ArxivContext<'_>) -> Result<()> {
        ctx.draft.pubdate_electronic = ctx
            .scope
            .metadata
            .find("dc:date")
            .and_then(|d| clean_optional(Some(d.text())));
        Ok(())
    }

    /// The first description is the abstract; arXiv puts author comments
    /// (page counts, journal refs) in the following ones.
    fn parse_abstract(&self, ctx: &mut ArxivContext<'_>) -> Result<()> {
        let mut descriptions = ctx.scope.metadata.find_all("dc:description").into_iter();
        if let Some(first) = descriptions.next() {
            ctx.draft.abstract_text = clean_optional(Some(first.text()));
        }
        for extra in descriptions {
            let text = clean_text(&extra.text());
            if !text.is_empty() {
                ctx.draft.comments.push(Comment::new("arxiv", text));
            }
        }
        Ok(())
    }

    fn parse_keywords(&self, ctx: &mut ArxivContext<'_>) -> Result<()> {
        for subject in ctx.scope.metadata.find_all("dc:subject") {
            let text = clean_text(&subject.text());
            if !text.is_empty() {
                ctx.draft.keywords.push(Keyword::new("arxiv", text));
            }
        }
        Ok(())
    }
}

impl Extractor for ArxivExtractor {
    fn kind(&self) -> DialectKind {
        DialectKind::Arxiv
    }

    fn schema(&self) -> &SchemaRequirement {
        &self.schema
    }

    fn extract(&self, doc: &Document) -> Result<RecordDraft> {
        let metadata = doc.find_path(METADATA_ROOT).ok_or_else(|| IngestError::NoSchema {
            attribute: self.schema.attribute.to_string(),
        })?;
        let scope = ArxivScope {
            header: doc.find_path("record/header"),
            metadata,
        };

        let mut ctx = ExtractionContext::new(doc, scope);
        for (name, step) in STEPS {
            trace!(dialect = "arxiv", step = name, "extracting");
            step(self, &mut ctx)?;
        }
        Ok(ctx.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"<record>
  <header>
    <identifier>oai:arXiv.org:1234</identifier>
    <datestamp>2020-01-02</datestamp>
  </header>
  <metadata>
    <oai_dc:dc xmlns:oai_dc="http://www.openarchives.org/OAI/2.0/oai_dc/" xmlns:dc="http://purl.org/dc/elements/1.1/">
      <dc:title>Dark Matter in Dwarf Galaxies</dc:title>
      <dc:creator>Doe, Jane</dc:creator>
      <dc:creator>Collaboration, Gaia</dc:creator>
      <dc:subject>Astrophysics - Astrophysics of Galaxies</dc:subject>
      <dc:subject>Physics - Cosmology</dc:subject>
      <dc:description>We study
        things.</dc:description>
      <dc:description>Comment: 12 pages, 3 figures</dc:description>
      <dc:date>2020-01-01</dc:date>
      <dc:date>2020-03-04</dc:date>
      <dc:type>text</dc:type>
      <dc:identifier>http://arxiv.org/abs/1234</dc:identifier>
      <dc:identifier>doi:xyz</dc:identifier>
    </oai_dc:dc>
  </metadata>
</record>"#;

    fn extract(xml: &str) -> Result<RecordDraft> {
        ArxivExtractor::default().extract(&Document::parse(xml).unwrap())
    }

    #[test]
    fn extracts_identifiers() {
        let draft = extract(RECORD).unwrap();
        assert_eq!(draft.ids.doi.as_deref(), Some("xyz"));
        let preprint = draft.ids.preprint.unwrap();
        assert_eq!(preprint.source, "arXiv");
        assert_eq!(preprint.id, "1234");
        assert_eq!(draft.publication.as_deref(), Some("eprint arXiv:1234"));
    }

    #[test]
    fn extracts_text_fields() {
        let draft = extract(RECORD).unwrap();
        assert_eq!(draft.title.as_deref(), Some("Dark Matter in Dwarf Galaxies"));
        assert_eq!(draft.abstract_text.as_deref(), Some("We study things."));
        assert_eq!(draft.comments, vec![Comment::new("arxiv", "Comment: 12 pages, 3 figures")]);
        assert_eq!(draft.pubdate_electronic.as_deref(), Some("2020-01-01"));
        assert_eq!(draft.keywords.len(), 2);
        assert_eq!(draft.keywords[1], Keyword::new("arxiv", "Physics - Cosmology"));
    }

    #[test]
    fn splits_people_and_collaborations() {
        let draft = extract(RECORD).unwrap();
        assert_eq!(draft.authors.len(), 2);
        assert_eq!(draft.authors[0].surname.as_deref(), Some("Doe"));
        assert_eq!(draft.authors[0].given.as_deref(), Some("Jane"));
        assert_eq!(draft.authors[1].collab.as_deref(), Some("Gaia Collaboration"));
    }

    #[test]
    fn last_doi_identifier_wins() {
        let xml = RECORD.replace(
            "<dc:identifier>doi:xyz</dc:identifier>",
            "<dc:identifier>doi:10.1/first</dc:identifier><dc:identifier>doi:10.1/second</dc:identifier>",
        );
        let draft = extract(&xml).unwrap();
        assert_eq!(draft.ids.doi.as_deref(), Some("10.1/second"));
    }

    #[test]
    fn unknown_entity_in_title_leaves_other_entities_decoded() {
        let xml = RECORD.replace(
            "Dark Matter in Dwarf Galaxies",
            "Dark &bogus;CDM &amp; halos &Lambda;",
        );
        let draft = extract(&xml).unwrap();
        assert_eq!(draft.title.as_deref(), Some("Dark &bogus;CDM & halos \u{39b}"));
    }

    #[test]
    fn multiple_titles_are_joined() {
        let xml = RECORD.replace(
            "<dc:creator>Doe, Jane</dc:creator>",
            "<dc:title>A Subtitle</dc:title><dc:creator>Doe, Jane</dc:creator>",
        );
        let draft = extract(&xml).unwrap();
        assert_eq!(
            draft.title.as_deref(),
            Some("Dark Matter in Dwarf Galaxies: A Subtitle")
        );
    }

    #[test]
    fn missing_title_fails() {
        let xml = RECORD.replace("<dc:title>Dark Matter in Dwarf Galaxies</dc:title>", "");
        assert!(matches!(extract(&xml), Err(IngestError::MissingTitle)));
    }

    #[test]
    fn missing_authors_fails() {
        let xml = RECORD
            .replace("<dc:creator>Doe, Jane</dc:creator>", "")
            .replace("<dc:creator>Collaboration, Gaia</dc:creator>", "");
        assert!(matches!(extract(&xml), Err(IngestError::MissingAuthors)));
    }

    #[test]
    fn missing_metadata_root_is_no_schema() {
        let err = extract("<record><header/></record>").unwrap_err();
        assert!(matches!(err, IngestError::NoSchema { .. }));
    }
}
