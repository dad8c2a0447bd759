//! Chunk → parse → dispatch → extract → finalize, wired from configuration.

use std::fmt;
use std::str::FromStr;

use ingestscope_core::{
    CanonicalRecord, Document, IngestConfig, IngestError, RecordDraft, Result,
};
use tracing::{debug, warn};

use crate::builder::CanonicalRecordBuilder;
use crate::chunker::DocumentChunker;
use crate::dialects::{ArxivExtractor, WileyExtractor};
use crate::dispatch::{DialectKind, Extractor, SchemaDispatcher};

/// Which dialect to apply: a fixed one, or whichever schema matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialectChoice {
    #[default]
    Auto,
    Fixed(DialectKind),
}

impl FromStr for DialectChoice {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else {
            s.parse().map(Self::Fixed)
        }
    }
}

impl fmt::Display for DialectChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Fixed(kind) => f.write_str(kind.as_str()),
        }
    }
}

pub struct Engine {
    config: IngestConfig,
    dispatcher: SchemaDispatcher,
    chunker: DocumentChunker,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(IngestConfig::default())
    }
}

impl Engine {
    pub fn new(config: IngestConfig) -> Self {
        let mut dispatcher = SchemaDispatcher::new();
        dispatcher.register(ArxivExtractor::new(&config.arxiv));
        dispatcher.register(WileyExtractor::new(&config.wiley));

        let chunker = DocumentChunker::new(&config.chunking.record_tag)
            .keep_header(config.chunking.keep_header);

        Self {
            config,
            dispatcher,
            chunker,
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &SchemaDispatcher {
        &self.dispatcher
    }

    /// Override header/footer retention from configuration.
    pub fn with_keep_header(mut self, keep: bool) -> Self {
        self.config.chunking.keep_header = keep;
        self.chunker = self.chunker.keep_header(keep);
        self
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.chunker.split(text)
    }

    /// Parse and extract one document without finalizing it.
    pub fn extract(
        &self,
        text: &str,
        choice: DialectChoice,
    ) -> Result<(DialectKind, RecordDraft)> {
        let doc = Document::parse(text)?;
        let extractor: &dyn Extractor = match choice {
            DialectChoice::Auto => self.dispatcher.detect(&doc)?,
            DialectChoice::Fixed(kind) => self.dispatcher.select(kind, &doc)?,
        };
        debug!(dialect = extractor.name(), "extracting record");
        let draft = extractor.extract(&doc)?;
        Ok((extractor.kind(), draft))
    }

    pub fn parse(&self, text: &str, choice: DialectChoice) -> Result<CanonicalRecord> {
        let (kind, draft) = self.extract(text, choice)?;
        Ok(CanonicalRecordBuilder::new(kind).finalize(&draft))
    }

    /// One result per fragment, in document order. A failing fragment does
    /// not affect its siblings.
    pub fn parse_batch(&self, text: &str, choice: DialectChoice) -> Vec<Result<CanonicalRecord>> {
        let fragments = self.split(text);
        debug!(fragments = fragments.len(), "document split");
        fragments
            .iter()
            .enumerate()
            .map(|(index, fragment)| {
                let result = self.parse(fragment, choice);
                if let Err(err) = &result {
                    warn!(fragment = index, error = %err, "skipping fragment");
                }
                result
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn engine_is_shareable_across_threads() {
        assert_send_sync::<Engine>();
    }

    #[test]
    fn dialect_choice_parses() {
        assert_eq!("auto".parse::<DialectChoice>().unwrap(), DialectChoice::Auto);
        assert_eq!(
            "wiley".parse::<DialectChoice>().unwrap(),
            DialectChoice::Fixed(DialectKind::Wiley)
        );
        assert!("marc".parse::<DialectChoice>().is_err());
        assert_eq!(DialectChoice::Fixed(DialectKind::Arxiv).to_string(), "arxiv");
    }

    #[test]
    fn registers_both_dialects_in_order() {
        let kinds: Vec<_> = Engine::default().dispatcher().kinds().collect();
        assert_eq!(kinds, vec![DialectKind::Arxiv, DialectKind::Wiley]);
    }

    #[test]
    fn unparsable_text_is_a_load_error() {
        let err = Engine::default().parse("<record><oops></record>", DialectChoice::Auto);
        assert!(matches!(err, Err(IngestError::XmlLoad(_))));
    }

    #[test]
    fn configured_schemas_override_defaults() {
        let mut config = IngestConfig::default();
        config.wiley.schemas = vec!["urn:custom".into()];
        let engine = Engine::new(config);
        let err = engine
            .parse(
                r#"<component xmlns="http://www.wiley.com/namespaces/wiley"/>"#,
                DialectChoice::Fixed(DialectKind::Wiley),
            )
            .unwrap_err();
        assert!(matches!(err, IngestError::WrongSchema { .. }));
    }
}
