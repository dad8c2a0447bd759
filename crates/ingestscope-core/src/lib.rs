//! Core of ingestscope: record models, errors and configuration, plus the
//! XML tree and text-cleanup helpers the dialect extractors build on.

pub mod clean;
pub mod config;
pub mod error;
pub mod models;
pub mod tree;

pub use config::IngestConfig;
pub use error::{ErrorClass, ExitCode, IngestError, Result};
pub use models::*;
pub use tree::{Document, Element};
