use serde::{Deserialize, Serialize};

/// Final, schema-shaped output for one record fragment.
///
/// The serde representation is the canonical JSON handed to downstream
/// indexing; empty entities are left out of the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    pub record_data: RecordData,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<TextBlock>,

    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<TextBlock>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<AuthorOut>,

    #[serde(rename = "persistentIDs", default, skip_serializing_if = "Vec::is_empty")]
    pub persistent_ids: Vec<PersistentId>,

    #[serde(rename = "publisherIDs", default, skip_serializing_if = "Vec::is_empty")]
    pub publisher_ids: Vec<PublisherIdOut>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication: Option<Publication>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<PubDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editorial_history: Option<EditorialHistory>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<KeywordOut>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<CommentOut>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordData {
    pub load_type: String,
    pub load_format: String,
    /// UTC, `%Y-%m-%dT%H:%M:%S%.6fZ`.
    pub parsed_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub text_english: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorOut {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<AuthorName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collab: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affiliation: Vec<AffiliationOut>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorName {
    #[serde(rename = "given-name", default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliationOut {
    #[serde(rename = "affPubRaw")]
    pub aff_pub_raw: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PersistentId {
    #[serde(rename = "DOI")]
    Doi(String),
    #[serde(rename = "preprint")]
    Preprint { source: String, identifier: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublisherIdOut {
    pub attribute: String,
    #[serde(rename = "Identifier")]
    pub identifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "volumeNum", default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(rename = "issueNum", default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(rename = "ISSN", default, skip_serializing_if = "Vec::is_empty")]
    pub issn: Vec<IssnOut>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssnOut {
    pub pubtype: String,
    pub issn_string: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PubDate {
    #[serde(rename = "electrDate", default, skip_serializing_if = "Option::is_none")]
    pub electronic: Option<String>,
    #[serde(rename = "printDate", default, skip_serializing_if = "Option::is_none")]
    pub print: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(rename = "firstPage", default, skip_serializing_if = "Option::is_none")]
    pub first_page: Option<String>,
    #[serde(rename = "lastPage", default, skip_serializing_if = "Option::is_none")]
    pub last_page: Option<String>,
    #[serde(rename = "electronicID", default, skip_serializing_if = "Option::is_none")]
    pub electronic_id: Option<String>,
    #[serde(rename = "pageCount", default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorialHistory {
    #[serde(rename = "receivedDates", default, skip_serializing_if = "Vec::is_empty")]
    pub received: Vec<String>,
    #[serde(rename = "revisedDates", default, skip_serializing_if = "Vec::is_empty")]
    pub revised: Vec<String>,
    #[serde(rename = "acceptedDate", default, skip_serializing_if = "Option::is_none")]
    pub accepted: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordOut {
    pub key_system: String,
    pub key_string: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentOut {
    pub comment_origin: String,
    pub comment_text: String,
}

impl Publication {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.volume.is_none() && self.issue.is_none() && self.issn.is_empty()
    }
}

impl PubDate {
    pub fn is_empty(&self) -> bool {
        self.electronic.is_none() && self.print.is_none()
    }
}

impl Pagination {
    pub fn is_empty(&self) -> bool {
        self.first_page.is_none()
            && self.last_page.is_none()
            && self.electronic_id.is_none()
            && self.page_count.is_none()
    }
}

impl EditorialHistory {
    pub fn is_empty(&self) -> bool {
        self.received.is_empty() && self.revised.is_empty() && self.accepted.is_none()
    }
}

impl CanonicalRecord {
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_ref().map(|t| t.text_english.as_str())
    }

    pub fn doi(&self) -> Option<&str> {
        self.persistent_ids.iter().find_map(|id| match id {
            PersistentId::Doi(doi) => Some(doi.as_str()),
            PersistentId::Preprint { .. } => None,
        })
    }
}
