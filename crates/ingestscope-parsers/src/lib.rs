//! Dialect extractors and the normalization pipeline.
//!
//! Raw publisher XML goes in; [`CanonicalRecord`](ingestscope_core::CanonicalRecord)s
//! come out. [`Engine`] is the usual entry point.

pub mod authors;
pub mod builder;
pub mod chunker;
pub mod context;
pub mod dates;
pub mod dialects;
pub mod dispatch;
pub mod engine;

pub use builder::CanonicalRecordBuilder;
pub use chunker::{DocumentChunker, RecordBoundary};
pub use dialects::{ArxivExtractor, WileyExtractor};
pub use dispatch::{DialectKind, Extractor, SchemaDispatcher, SchemaRequirement};
pub use engine::{DialectChoice, Engine};
