use serde::{Deserialize, Serialize};

use super::{AuthorEntry, IdentifierSet, Issn};

/// Flat, in-progress record filled by one dialect's extraction steps.
///
/// Field names follow the ingest vocabulary (`page_first`, `edhist_acc`, ...);
/// the canonical shape is produced later by the record builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordDraft {
    pub ids: IdentifierSet,
    pub issn: Vec<Issn>,

    pub publication: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,

    pub page_first: Option<String>,
    pub page_last: Option<String>,
    pub electronic_id: Option<String>,
    pub numpages: Option<String>,

    pub pubdate_print: Option<String>,
    pub pubdate_electronic: Option<String>,

    pub edhist_rec: Vec<String>,
    pub edhist_rev: Vec<String>,
    pub edhist_acc: Option<String>,

    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub comments: Vec<Comment>,
    pub keywords: Vec<Keyword>,

    pub authors: Vec<AuthorEntry>,
    pub copyright: Option<String>,
    pub references: Vec<String>,

    /// Non-fatal problems met while extracting, e.g. unresolved labels.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub system: String,
    pub string: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub origin: String,
    pub text: String,
}

impl Keyword {
    pub fn new(system: impl Into<String>, string: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            string: string.into(),
        }
    }
}

impl Comment {
    pub fn new(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            text: text.into(),
        }
    }
}

impl RecordDraft {
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}
