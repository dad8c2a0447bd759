pub mod author;
pub mod draft;
pub mod identifiers;
pub mod record;

pub use author::AuthorEntry;
pub use draft::{Comment, Keyword, RecordDraft};
pub use identifiers::{IdentifierSet, Issn, Preprint, PublisherId};
pub use record::{
    AffiliationOut, AuthorName, AuthorOut, CanonicalRecord, CommentOut, EditorialHistory, IssnOut,
    KeywordOut, Pagination, PersistentId, PubDate, Publication, PublisherIdOut, RecordData,
    TextBlock,
};
