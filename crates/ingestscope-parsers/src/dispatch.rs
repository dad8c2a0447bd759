//! Choosing the extractor for a parsed document from its declared schema.

use std::fmt;
use std::str::FromStr;

use ingestscope_core::{Document, IngestError, RecordDraft, Result};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    Arxiv,
    Wiley,
}

impl DialectKind {
    pub const ALL: [DialectKind; 2] = [DialectKind::Arxiv, DialectKind::Wiley];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arxiv => "arxiv",
            Self::Wiley => "wiley",
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "arxiv" => Ok(Self::Arxiv),
            "wiley" => Ok(Self::Wiley),
            other => Err(IngestError::UnknownDialect(other.to_string())),
        }
    }
}

/// Where a dialect declares its schema and which values it accepts.
#[derive(Debug, Clone)]
pub struct SchemaRequirement {
    /// `/`-separated lookup path to the metadata root.
    pub root: &'static str,
    pub attribute: &'static str,
    pub supported: Vec<String>,
}

impl SchemaRequirement {
    pub fn check(&self, doc: &Document, dialect: DialectKind) -> Result<()> {
        let declared = doc
            .find_path(self.root)
            .and_then(|root| root.attr(self.attribute))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| IngestError::NoSchema {
                attribute: self.attribute.to_string(),
            })?;

        if self.supported.iter().any(|s| s == declared) {
            Ok(())
        } else {
            Err(IngestError::WrongSchema {
                dialect: dialect.to_string(),
                found: declared.to_string(),
            })
        }
    }
}

/// One source vocabulary's field-extraction rules.
pub trait Extractor: Send + Sync {
    fn kind(&self) -> DialectKind;

    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    fn schema(&self) -> &SchemaRequirement;

    fn extract(&self, doc: &Document) -> Result<RecordDraft>;
}

#[derive(Default)]
pub struct SchemaDispatcher {
    extractors: Vec<Box<dyn Extractor>>,
}

impl SchemaDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extractor. Auto-detection tries them in this order.
    pub fn register(&mut self, extractor: impl Extractor + 'static) {
        self.extractors.push(Box::new(extractor));
    }

    pub fn kinds(&self) -> impl Iterator<Item = DialectKind> + '_ {
        self.extractors.iter().map(|e| e.kind())
    }

    /// The extractor for `kind`, provided the document declares a schema it
    /// supports.
    pub fn select(&self, kind: DialectKind, doc: &Document) -> Result<&dyn Extractor> {
        let extractor = self
            .extractors
            .iter()
            .find(|e| e.kind() == kind)
            .ok_or_else(|| IngestError::UnknownDialect(kind.to_string()))?;
        extractor.schema().check(doc, kind)?;
        debug!(dialect = %kind, "schema accepted");
        Ok(extractor.as_ref())
    }

    /// First registered extractor whose schema check passes. Without a
    /// match, the first `WrongSchema` seen is returned, else `NoSchema`.
    pub fn detect(&self, doc: &Document) -> Result<&dyn Extractor> {
        let mut first_error: Option<IngestError> = None;
        for extractor in &self.extractors {
            match extractor.schema().check(doc, extractor.kind()) {
                Ok(()) => {
                    debug!(dialect = extractor.name(), "dialect detected");
                    return Ok(extractor.as_ref());
                }
                Err(err @ IngestError::WrongSchema { .. }) => {
                    if !matches!(first_error, Some(IngestError::WrongSchema { .. })) {
                        first_error = Some(err);
                    }
                }
                Err(err) => {
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }
        Err(first_error.unwrap_or_else(|| IngestError::NoSchema {
            attribute: "xmlns".to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake {
        kind: DialectKind,
        schema: SchemaRequirement,
    }

    impl Extractor for Fake {
        fn kind(&self) -> DialectKind {
            self.kind
        }

        fn schema(&self) -> &SchemaRequirement {
            &self.schema
        }

        fn extract(&self, _doc: &Document) -> Result<RecordDraft> {
            Ok(RecordDraft::default())
        }
    }

    fn dispatcher() -> SchemaDispatcher {
        let mut dispatcher = SchemaDispatcher::new();
        dispatcher.register(Fake {
            kind: DialectKind::Arxiv,
            schema: SchemaRequirement {
                root: "record/metadata/oai_dc:dc",
                attribute: "xmlns:oai_dc",
                supported: vec!["urn:oai".into()],
            },
        });
        dispatcher.register(Fake {
            kind: DialectKind::Wiley,
            schema: SchemaRequirement {
                root: "component",
                attribute: "xmlns",
                supported: vec!["urn:wiley".into()],
            },
        });
        dispatcher
    }

    fn doc(xml: &str) -> Document {
        Document::parse(xml).unwrap()
    }

    #[test]
    fn selects_matching_schema() {
        let d = doc(r#"<record><metadata><oai_dc:dc xmlns:oai_dc="urn:oai"/></metadata></record>"#);
        let dispatcher = dispatcher();
        let extractor = dispatcher.select(DialectKind::Arxiv, &d).unwrap();
        assert_eq!(extractor.name(), "arxiv");
    }

    #[test]
    fn missing_root_or_attribute_is_no_schema() {
        let no_root = doc("<record><metadata/></record>");
        let no_attr = doc("<record><metadata><oai_dc:dc/></metadata></record>");
        for d in [no_root, no_attr] {
            let err = dispatcher().select(DialectKind::Arxiv, &d).err().unwrap();
            assert!(matches!(err, IngestError::NoSchema { ref attribute } if attribute == "xmlns:oai_dc"));
        }
    }

    #[test]
    fn unsupported_value_is_wrong_schema() {
        let d = doc(r#"<component xmlns="urn:other"/>"#);
        let err = dispatcher().select(DialectKind::Wiley, &d).err().unwrap();
        match err {
            IngestError::WrongSchema { dialect, found } => {
                assert_eq!(dialect, "wiley");
                assert_eq!(found, "urn:other");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn detect_tries_each_dialect() {
        let d = doc(r#"<component xmlns="urn:wiley"/>"#);
        assert_eq!(dispatcher().detect(&d).unwrap().kind(), DialectKind::Wiley);

        let wrong = doc(r#"<component xmlns="urn:other"/>"#);
        assert!(matches!(
            dispatcher().detect(&wrong).err().unwrap(),
            IngestError::WrongSchema { .. }
        ));

        let unknown = doc("<article/>");
        assert!(matches!(
            dispatcher().detect(&unknown).err().unwrap(),
            IngestError::NoSchema { .. }
        ));
    }

    #[test]
    fn dialect_names_parse() {
        assert_eq!("ArXiv".parse::<DialectKind>().unwrap(), DialectKind::Arxiv);
        assert!(matches!(
            "jats".parse::<DialectKind>(),
            Err(IngestError::UnknownDialect(_))
        ));
    }
}
