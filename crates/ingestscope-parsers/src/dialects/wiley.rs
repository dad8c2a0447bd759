//! Wiley `component` XML.
//!
//! Bibliographic metadata is spread over three `publicationMeta` blocks
//! (`level` = `product`, `part`, `unit`: journal, issue and article), plus a
//! `contentMeta` block for titles and people and an optional `bibliography`.

use ingestscope_core::clean::{clean_optional, flatten_reference};
use ingestscope_core::config::WileyConfig;
use ingestscope_core::{
    Document, Element, IngestError, Issn, Keyword, PublisherId, RecordDraft, Result,
};
use tracing::{trace, warn};

use crate::authors::{AffiliationTable, AuthorResolver};
use crate::context::ExtractionContext;
use crate::dates::{DateReconciler, ELECTRONIC_DATE_TIERS, pad_partial_date};
use crate::dispatch::{DialectKind, Extractor, SchemaRequirement};

/// Values Wiley uses for "no page number".
const ABSENT_PAGES: &[&str] = &["n/a", "no"];

#[derive(Default)]
struct WileyScope<'a> {
    product: Option<&'a Element>,
    part: Option<&'a Element>,
    unit: Option<&'a Element>,
    content: Option<&'a Element>,
    bibliography: Option<&'a Element>,
}

impl<'a> WileyScope<'a> {
    fn locate(doc: &'a Document) -> Self {
        let mut scope = Self::default();
        for meta in doc.find_all("publicationMeta") {
            match meta.attr("level") {
                Some("product") => scope.product = Some(meta),
                Some("part") => scope.part = Some(meta),
                Some("unit") => scope.unit = Some(meta),
                _ => {}
            }
        }
        scope.content = doc.find("contentMeta");
        scope.bibliography = doc.find("bibliography");
        scope
    }
}

type WileyContext<'a> = ExtractionContext<'a, WileyScope<'a>>;
type Step = fn(&WileyExtractor, &mut WileyContext<'_>) -> Result<()>;

const STEPS: &[(&str, Step)] = &[
    ("ids", WileyExtractor::parse_ids),
    ("publication", WileyExtractor::parse_publication),
    ("pages", WileyExtractor::parse_pages),
    ("pubdate", WileyExtractor::parse_pubdate),
    ("edhistory", WileyExtractor::parse_edhistory),
    ("title_abstract", WileyExtractor::parse_title_abstract),
    ("copyright", WileyExtractor::parse_copyright),
    ("authors", WileyExtractor::parse_authors),
    ("keywords", WileyExtractor::parse_keywords),
    ("references", WileyExtractor::parse_references),
];

pub struct WileyExtractor {
    schema: SchemaRequirement,
    elocator_digits: usize,
}

impl Default for WileyExtractor {
    fn default() -> Self {
        Self::new(&WileyConfig::default())
    }
}

/// Trimmed text, `None` when blank.
fn text_of(element: &Element) -> Option<String> {
    clean_optional(Some(element.text()))
}

/// `value` attribute, falling back to the element text.
fn id_value(id: &Element) -> Option<String> {
    id.attr("value")
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| text_of(id))
}

fn is_present_page(page: &str) -> bool {
    !ABSENT_PAGES.contains(&page)
}

fn last_chars(value: &str, count: usize) -> String {
    let total = value.chars().count();
    value.chars().skip(total.saturating_sub(count)).collect()
}

impl WileyExtractor {
    pub fn new(config: &WileyConfig) -> Self {
        Self {
            schema: SchemaRequirement {
                root: "component",
                attribute: "xmlns",
                supported: config.schemas.clone(),
            },
            elocator_digits: config.elocator_digits,
        }
    }

    fn parse_ids(&self, ctx: &mut WileyContext<'_>) -> Result<()> {
        if let Some(product) = ctx.scope.product {
            for issn in product.find_all("issn") {
                if let Some(value) = text_of(issn) {
                    ctx.draft.issn.push(Issn {
                        kind: issn.attr("type").unwrap_or_default().to_string(),
                        value,
                    });
                }
            }
        }

        let Some(unit) = ctx.scope.unit else {
            return Ok(());
        };
        if let Some(doi) = unit.find("doi").and_then(text_of) {
            ctx.draft.ids.doi = Some(doi);
        }
        for id in unit.find_all("id") {
            let Some(kind) = id.attr("type") else {
                continue;
            };
            if kind == "society" || kind == "eLocator" {
                continue;
            }
            if let Some(identifier) = id.attr("value") {
                ctx.draft.ids.pub_ids.push(PublisherId {
                    attribute: kind.to_string(),
                    identifier: identifier.to_string(),
                });
            }
        }
        Ok(())
    }

    fn parse_publication(&self, ctx: &mut WileyContext<'_>) -> Result<()> {
        if let Some(product) = ctx.scope.product {
            for title in product.find_all("title") {
                if title.attr_is("type", "main") {
                    ctx.draft.publication = text_of(title);
                }
            }
        }
        if let Some(part) = ctx.scope.part {
            for numbering in part.find_all("numbering") {
                match numbering.attr("type") {
                    Some("journalVolume") => ctx.draft.volume = text_of(numbering),
                    Some("journalIssue") => ctx.draft.issue = text_of(numbering),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Explicit page numbers first. Without a first page, the society id
    /// stands in for it and the eLocator supplies the electronic id.
    fn parse_pages(&self, ctx: &mut WileyContext<'_>) -> Result<()> {
        let Some(unit) = ctx.scope.unit else {
            return Ok(());
        };

        let mut page_first = None;
        for numbering in unit.find_all("numbering") {
            match numbering.attr("type") {
                Some("pageFirst") => page_first = text_of(numbering),
                Some("pageLast") => {
                    if let Some(last) = text_of(numbering).filter(|p| is_present_page(p)) {
                        ctx.draft.page_last = Some(last);
                    }
                }
                _ => {}
            }
        }

        if page_first.is_none() {
            for id in unit.find_all("id") {
                match id.attr("type") {
                    Some("society") => page_first = id_value(id),
                    Some("eLocator") => {
                        ctx.draft.electronic_id =
                            id_value(id).map(|v| last_chars(&v, self.elocator_digits));
                    }
                    _ => {}
                }
            }
        }
        ctx.draft.page_first = page_first.filter(|p| is_present_page(p));

        ctx.draft.numpages = unit
            .find("countGroup")
            .and_then(|group| group.find("count"))
            .filter(|count| count.attr_is("type", "pageTotal"))
            .and_then(|count| count.attr("number"))
            .map(str::to_string);
        Ok(())
    }

    fn parse_pubdate(&self, ctx: &mut WileyContext<'_>) -> Result<()> {
        ctx.draft.pubdate_print = ctx
            .scope
            .part
            .and_then(|part| part.find("coverDate"))
            .and_then(|cover| cover.attr("startDate"))
            .and_then(pad_partial_date);

        if let Some(unit) = ctx.scope.unit {
            let mut dates = DateReconciler::new(ELECTRONIC_DATE_TIERS);
            for event in unit.find_all("event") {
                if let (Some(kind), Some(date)) = (event.attr("type"), event.attr("date")) {
                    dates.offer(kind, date);
                }
            }
            ctx.draft.pubdate_electronic = dates.resolve();
        }
        Ok(())
    }

    fn parse_edhistory(&self, ctx: &mut WileyContext<'_>) -> Result<()> {
        let Some(unit) = ctx.scope.unit else {
            return Ok(());
        };
        for event in unit.find_all("event") {
            let Some(date) = event.attr("date").map(str::trim).filter(|d| !d.is_empty()) else {
                continue;
            };
            match event.attr("type") {
                Some("manuscriptReceived") => ctx.draft.edhist_rec.push(date.to_string()),
                Some("manuscriptRevised") => ctx.draft.edhist_rev.push(date.to_string()),
                Some("manuscriptAccepted") => ctx.draft.edhist_acc = Some(date.to_string()),
                _ => {}
            }
        }
        Ok(())
    }

    fn parse_title_abstract(&self, ctx: &mut WileyContext<'_>) -> Result<()> {
        let content = ctx.scope.content;

        let mut main = None;
        let mut subtitles = Vec::new();
        if let Some(group) = content.and_then(|c| c.find("titleGroup")) {
            for title in group.find_all("title") {
                match title.attr("type") {
                    Some("main") => main = text_of(title),
                    Some("subtitle") => subtitles.extend(text_of(title)),
                    _ => {}
                }
            }
        }
        let Some(main) = main else {
            return Err(IngestError::MissingTitle);
        };
        ctx.draft.title = Some(
            std::iter::once(main)
                .chain(subtitles)
                .collect::<Vec<_>>()
                .join(": "),
        );

        if let Some(group) = content.and_then(|c| c.find("abstractGroup")) {
            for abstract_el in group.find_all("abstract") {
                if abstract_el.attr_is("type", "main") {
                    ctx.draft.abstract_text = text_of(abstract_el);
                }
            }
        }
        Ok(())
    }

    fn parse_copyright(&self, ctx: &mut WileyContext<'_>) -> Result<()> {
        ctx.draft.copyright = ctx
            .scope
            .unit
            .and_then(|unit| unit.find("copyright"))
            .and_then(text_of);
        Ok(())
    }

    fn parse_authors(&self, ctx: &mut WileyContext<'_>) -> Result<()> {
        let Some(content) = ctx.scope.content else {
            return Err(IngestError::MissingAuthors);
        };
        ctx.affiliations = AffiliationTable::build(content);
        let resolved = AuthorResolver::new(&ctx.affiliations).resolve(content);

        for label in resolved.unresolved {
            ctx.draft.warn(format!("unresolved affiliation label: {label}"));
        }
        if resolved.authors.is_empty() {
            return Err(IngestError::MissingAuthors);
        }
        ctx.draft.authors = resolved.authors;
        Ok(())
    }

    fn parse_keywords(&self, ctx: &mut WileyContext<'_>) -> Result<()> {
        if let Some(content) = ctx.scope.content {
            for keyword in content.find_all("keyword") {
                if let Some(text) = text_of(keyword) {
                    ctx.draft.keywords.push(Keyword::new("Wiley", text));
                }
            }
        }
        Ok(())
    }

    /// Citations are passed on as raw XML for a downstream reference
    /// resolver.
    fn parse_references(&self, ctx: &mut WileyContext<'_>) -> Result<()> {
        if let Some(bibliography) = ctx.scope.bibliography {
            ctx.draft.references = bibliography
                .find_all("citation")
                .into_iter()
                .map(|citation| flatten_reference(&citation.to_xml()))
                .collect();
        }
        Ok(())
    }
}

impl Extractor for WileyExtractor {
    fn kind(&self) -> DialectKind {
        DialectKind::Wiley
    }

    fn schema(&self) -> &SchemaRequirement {
        &self.schema
    }

    fn extract(&self, doc: &Document) -> Result<RecordDraft> {
        let mut ctx = ExtractionContext::new(doc, WileyScope::locate(doc));
        if ctx.scope.unit.is_none() {
            warn!("no unit-level publicationMeta; article identifiers will be missing");
        }
        for (name, step) in STEPS {
            trace!(dialect = "wiley", step = name, "extracting");
            step(self, &mut ctx)?;
        }
        Ok(ctx.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPONENT: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<component xmlns="http://www.wiley.com/namespaces/wiley" type="serialArticle" xml:lang="en">
  <header>
    <publicationMeta level="product">
      <doi>10.1002/(ISSN)1944-8007</doi>
      <issn type="print">0094-8276</issn>
      <issn type="electronic">1944-8007</issn>
      <titleGroup>
        <title type="main">Geophysical Research Letters</title>
        <title type="short">Geophys. Res. Lett.</title>
      </titleGroup>
    </publicationMeta>
    <publicationMeta level="part" position="10">
      <doi>10.1002/grl.v46.10</doi>
      <numberingGroup>
        <numbering type="journalVolume" number="46">46</numbering>
        <numbering type="journalIssue">10</numbering>
      </numberingGroup>
      <coverDate startDate="2019-05">28 May 2019</coverDate>
    </publicationMeta>
    <publicationMeta level="unit" type="article" position="10" status="forIssue">
      <doi>10.1029/2019GL082345</doi>
      <idGroup>
        <id type="unit" value="GRL58912"/>
        <id type="society" value="2019GL082345"/>
        <id type="eLocator" value="e1234567890"/>
      </idGroup>
      <countGroup>
        <count type="pageTotal" number="9"/>
      </countGroup>
      <eventGroup>
        <event type="manuscriptReceived" date="2019-02-11"/>
        <event type="manuscriptRevised" date="2019-04-01"/>
        <event type="manuscriptRevised" date="2019-04-20"/>
        <event type="manuscriptAccepted" date="2019-04-30"/>
        <event type="publishedOnlineAccepted" date="2019-05-03"/>
        <event type="firstOnline" date="2019-05-15"/>
        <event type="publishedOnlineFinalForm" date="2019-05-28"/>
      </eventGroup>
      <copyright ownership="thirdParty">&#169;2019. American Geophysical Union.</copyright>
    </publicationMeta>
    <contentMeta>
      <titleGroup>
        <title type="main">Tidal Stress
          Modulation</title>
        <title type="subtitle">A Case Study</title>
        <title type="short">Tidal Stress</title>
      </titleGroup>
      <creators>
        <creator xml:id="au1" creatorRole="author" affiliationRef="#grl59000-aff-0001">
          <personName><givenNames>Ana</givenNames><familyName>Silva</familyName></personName>
          <id type="orcid" value="https://orcid.org/0000-0002-1825-0097"/>
          <contactDetails><email>ana@example.org</email></contactDetails>
        </creator>
        <creator xml:id="au2" creatorRole="author" affiliationRef="#grl59000-aff-0002 #missing">
          <personName><givenNames>Bo</givenNames><familyName>Chen</familyName></personName>
        </creator>
      </creators>
      <affiliationGroup>
        <affiliation xml:id="grl59000-aff-0001" countryCode="PT">
          <orgDiv>Instituto Dom Luiz</orgDiv>
          <orgName>Universidade de Lisboa</orgName>
        </affiliation>
        <affiliation xml:id="grl59000-aff-0002"><orgName>Caltech</orgName></affiliation>
      </affiliationGroup>
      <keywordGroup type="author">
        <keyword xml:id="kwd1">tides</keyword>
        <keyword xml:id="kwd2">earthquakes</keyword>
      </keywordGroup>
      <abstractGroup>
        <abstract type="main"><title type="main">Abstract</title>
          <p>Tides   modulate stress.</p>
        </abstract>
        <abstract type="short"><p>Short.</p></abstract>
      </abstractGroup>
    </contentMeta>
  </header>
  <body>
    <bibliography>
      <citation xml:id="grl1" type="journal"><author><familyName>Ide</familyName></author>
        <journalTitle>Nature</journalTitle></citation>
      <citation xml:id="grl2" type="book"><bookTitle>Seismology&#160;Basics</bookTitle></citation>
    </bibliography>
  </body>
</component>"##;

    fn extract(xml: &str) -> Result<RecordDraft> {
        WileyExtractor::default().extract(&Document::parse(xml).unwrap())
    }

    #[test]
    fn extracts_identifiers_and_publication() {
        let draft = extract(COMPONENT).unwrap();
        assert_eq!(draft.ids.doi.as_deref(), Some("10.1029/2019GL082345"));
        assert_eq!(
            draft.ids.pub_ids,
            vec![PublisherId {
                attribute: "unit".into(),
                identifier: "GRL58912".into(),
            }]
        );
        assert_eq!(draft.issn.len(), 2);
        assert_eq!(draft.issn[1].kind, "electronic");
        assert_eq!(draft.publication.as_deref(), Some("Geophysical Research Letters"));
        assert_eq!(draft.volume.as_deref(), Some("46"));
        assert_eq!(draft.issue.as_deref(), Some("10"));
    }

    #[test]
    fn society_id_and_elocator_fill_missing_pages() {
        let draft = extract(COMPONENT).unwrap();
        assert_eq!(draft.page_first.as_deref(), Some("2019GL082345"));
        assert_eq!(draft.electronic_id.as_deref(), Some("67890"));
        assert_eq!(draft.numpages.as_deref(), Some("9"));
        assert_eq!(draft.page_last, None);
    }

    #[test]
    fn absent_page_sentinels() {
        let xml = COMPONENT.replace(
            "<countGroup>",
            r#"<numberingGroup><numbering type="pageFirst">n/a</numbering><numbering type="pageLast">12</numbering></numberingGroup><countGroup>"#,
        );
        let draft = extract(&xml).unwrap();
        assert_eq!(draft.page_first, None);
        assert_eq!(draft.page_last.as_deref(), Some("12"));
        // explicit first page present, so no eLocator fallback
        assert_eq!(draft.electronic_id, None);
    }

    #[test]
    fn dates_follow_tier_precedence() {
        let draft = extract(COMPONENT).unwrap();
        assert_eq!(draft.pubdate_print.as_deref(), Some("2019-05-00"));
        assert_eq!(draft.pubdate_electronic.as_deref(), Some("2019-05-15"));
        assert_eq!(draft.edhist_rec, vec!["2019-02-11"]);
        assert_eq!(draft.edhist_rev, vec!["2019-04-01", "2019-04-20"]);
        assert_eq!(draft.edhist_acc.as_deref(), Some("2019-04-30"));
    }

    #[test]
    fn last_accepted_date_wins() {
        let xml = COMPONENT.replace(
            r#"<event type="manuscriptAccepted" date="2019-04-30"/>"#,
            r#"<event type="manuscriptAccepted" date="2019-04-30"/><event type="manuscriptAccepted" date="2019-05-02"/>"#,
        );
        let draft = extract(&xml).unwrap();
        assert_eq!(draft.edhist_acc.as_deref(), Some("2019-05-02"));
        assert_eq!(draft.edhist_rev.len(), 2);
    }

    #[test]
    fn titles_abstract_and_copyright() {
        let draft = extract(COMPONENT).unwrap();
        assert_eq!(draft.title.as_deref(), Some("Tidal Stress Modulation: A Case Study"));
        assert_eq!(draft.abstract_text.as_deref(), Some("Abstract Tides modulate stress."));
        assert_eq!(
            draft.copyright.as_deref(),
            Some("\u{a9}2019. American Geophysical Union.")
        );
        assert_eq!(
            draft.keywords,
            vec![Keyword::new("Wiley", "tides"), Keyword::new("Wiley", "earthquakes")]
        );
    }

    #[test]
    fn authors_resolve_affiliations_and_warn_on_unknown_labels() {
        let draft = extract(COMPONENT).unwrap();
        assert_eq!(draft.authors.len(), 2);
        let ana = &draft.authors[0];
        assert_eq!(ana.orcid.as_deref(), Some("0000-0002-1825-0097"));
        assert_eq!(ana.aff, vec!["Instituto Dom Luiz, Universidade de Lisboa"]);
        assert_eq!(ana.xaff, vec!["grl59000-aff-0001"]);

        let bo = &draft.authors[1];
        assert_eq!(bo.aff, vec!["Caltech"]);
        assert_eq!(bo.aff.len(), bo.xaff.len());
        assert_eq!(draft.warnings, vec!["unresolved affiliation label: #missing"]);
    }

    #[test]
    fn references_are_flattened_raw_xml() {
        let draft = extract(COMPONENT).unwrap();
        assert_eq!(draft.references.len(), 2);
        assert!(draft.references[0].starts_with(r#"<citation xml:id="grl1" type="journal">"#));
        assert!(!draft.references[0].contains('\n'));
        assert!(draft.references[1].contains("Seismology Basics"));
    }

    #[test]
    fn unknown_entities_stay_verbatim_in_references_and_titles() {
        let xml = COMPONENT
            .replace(
                "<journalTitle>Nature</journalTitle>",
                "<journalTitle>A &amp; B &bogus;</journalTitle>",
            )
            .replace("A Case Study", "&bogus; &amp; Friends");
        let draft = extract(&xml).unwrap();
        assert!(draft.references[0].contains("<journalTitle>A &amp; B &bogus;</journalTitle>"));
        assert_eq!(
            draft.title.as_deref(),
            Some("Tidal Stress Modulation: &bogus; & Friends")
        );
    }

    #[test]
    fn missing_title_and_authors() {
        let no_title = COMPONENT.replace(
            r#"<title type="main">Tidal Stress"#,
            r#"<title type="alt">Tidal Stress"#,
        );
        assert!(matches!(extract(&no_title), Err(IngestError::MissingTitle)));

        let no_authors = COMPONENT
            .replace("<creators>", "<!--")
            .replace("</creators>", "-->");
        assert!(matches!(extract(&no_authors), Err(IngestError::MissingAuthors)));
    }

    #[test]
    fn elocator_is_truncated_by_character() {
        assert_eq!(last_chars("e1234567890", 5), "67890");
        assert_eq!(last_chars("é12", 5), "é12");
        assert_eq!(last_chars("αβγδεζ", 5), "βγδεζ");
    }
}
