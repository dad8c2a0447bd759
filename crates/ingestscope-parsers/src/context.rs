use ingestscope_core::{Document, RecordDraft};

use crate::authors::AffiliationTable;

/// State threaded through one dialect's extraction steps for one fragment.
///
/// `scope` holds the dialect's pre-located blocks of the tree so each step
/// doesn't have to search for them again.
pub struct ExtractionContext<'a, S> {
    pub doc: &'a Document,
    pub scope: S,
    pub draft: RecordDraft,
    pub affiliations: AffiliationTable,
}

impl<'a, S> ExtractionContext<'a, S> {
    pub fn new(doc: &'a Document, scope: S) -> Self {
        Self {
            doc,
            scope,
            draft: RecordDraft::default(),
            affiliations: AffiliationTable::default(),
        }
    }

    pub fn finish(self) -> RecordDraft {
        self.draft
    }
}
