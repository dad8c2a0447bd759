//! Shaping a [`RecordDraft`] into the canonical output schema.

use chrono::{DateTime, Utc};
use ingestscope_core::models::{
    AffiliationOut, AuthorEntry, AuthorName, AuthorOut, CanonicalRecord, CommentOut,
    EditorialHistory, IssnOut, KeywordOut, Pagination, PersistentId, PubDate, Publication,
    PublisherIdOut, RecordData, RecordDraft, TextBlock,
};

use crate::dispatch::DialectKind;

pub const PARSED_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";
pub const LOAD_TYPE: &str = "fromFile";

#[derive(Debug, Clone)]
pub struct CanonicalRecordBuilder {
    load_format: String,
}

impl CanonicalRecordBuilder {
    pub fn new(dialect: DialectKind) -> Self {
        Self {
            load_format: dialect.to_string(),
        }
    }

    pub fn finalize(&self, draft: &RecordDraft) -> CanonicalRecord {
        self.finalize_at(draft, Utc::now())
    }

    /// Same draft and timestamp always give the same record.
    pub fn finalize_at(&self, draft: &RecordDraft, parsed_at: DateTime<Utc>) -> CanonicalRecord {
        CanonicalRecord {
            record_data: RecordData {
                load_type: LOAD_TYPE.to_string(),
                load_format: self.load_format.clone(),
                parsed_time: parsed_at.format(PARSED_TIME_FORMAT).to_string(),
            },
            title: text_block(&draft.title),
            abstract_text: text_block(&draft.abstract_text),
            authors: draft.authors.iter().map(author_out).collect(),
            persistent_ids: persistent_ids(draft),
            publisher_ids: draft
                .ids
                .pub_ids
                .iter()
                .map(|id| PublisherIdOut {
                    attribute: id.attribute.clone(),
                    identifier: id.identifier.clone(),
                })
                .collect(),
            publication: non_empty(
                Publication {
                    name: draft.publication.clone(),
                    volume: draft.volume.clone(),
                    issue: draft.issue.clone(),
                    issn: draft
                        .issn
                        .iter()
                        .map(|issn| IssnOut {
                            pubtype: issn.kind.clone(),
                            issn_string: issn.value.clone(),
                        })
                        .collect(),
                },
                Publication::is_empty,
            ),
            pub_date: non_empty(
                PubDate {
                    electronic: draft.pubdate_electronic.clone(),
                    print: draft.pubdate_print.clone(),
                },
                PubDate::is_empty,
            ),
            pagination: non_empty(
                Pagination {
                    first_page: draft.page_first.clone(),
                    last_page: draft.page_last.clone(),
                    electronic_id: draft.electronic_id.clone(),
                    page_count: draft.numpages.clone(),
                },
                Pagination::is_empty,
            ),
            editorial_history: non_empty(
                EditorialHistory {
                    received: draft.edhist_rec.clone(),
                    revised: draft.edhist_rev.clone(),
                    accepted: draft.edhist_acc.clone(),
                },
                EditorialHistory::is_empty,
            ),
            keywords: draft
                .keywords
                .iter()
                .map(|k| KeywordOut {
                    key_system: k.system.clone(),
                    key_string: k.string.clone(),
                })
                .collect(),
            comments: draft
                .comments
                .iter()
                .map(|c| CommentOut {
                    comment_origin: c.origin.clone(),
                    comment_text: c.text.clone(),
                })
                .collect(),
            references: draft.references.clone(),
            copyright: draft.copyright.clone(),
            warnings: draft.warnings.clone(),
        }
    }
}

fn non_empty<T>(value: T, is_empty: impl Fn(&T) -> bool) -> Option<T> {
    (!is_empty(&value)).then_some(value)
}

fn text_block(text: &Option<String>) -> Option<TextBlock> {
    text.as_ref().map(|t| TextBlock {
        text_english: t.clone(),
    })
}

fn persistent_ids(draft: &RecordDraft) -> Vec<PersistentId> {
    let mut ids = Vec::new();
    if let Some(doi) = &draft.ids.doi {
        ids.push(PersistentId::Doi(doi.clone()));
    }
    if let Some(preprint) = &draft.ids.preprint {
        ids.push(PersistentId::Preprint {
            source: preprint.source.clone(),
            identifier: preprint.id.clone(),
        });
    }
    ids
}

/// Labels (`xaff`) are an input-side detail and are not emitted.
fn author_out(author: &AuthorEntry) -> AuthorOut {
    let name = (author.given.is_some() || author.surname.is_some()).then(|| AuthorName {
        given_name: author.given.clone(),
        surname: author.surname.clone(),
    });
    AuthorOut {
        name,
        collab: author.collab.clone(),
        affiliation: author
            .aff
            .iter()
            .map(|aff| AffiliationOut {
                aff_pub_raw: aff.clone(),
            })
            .collect(),
        orcid: author.orcid.clone(),
        email: author.email.clone(),
    }
}
