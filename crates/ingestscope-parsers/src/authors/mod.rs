pub mod names;
pub mod orcid;
pub mod resolver;

pub use names::{CollaborationParams, NameSplitter, split_person};
pub use orcid::extract_orcid;
pub use resolver::{AffiliationTable, AuthorResolver, ResolvedAuthors};
