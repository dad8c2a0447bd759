use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentifierSet {
    /// Single-valued: a later write replaces an earlier one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preprint: Option<Preprint>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pub_ids: Vec<PublisherId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprint {
    pub source: String,
    pub id: String,
}

/// Publisher-internal identifier such as a Wiley `id` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublisherId {
    pub attribute: String,
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issn {
    /// `print`, `electronic`, ... as declared by the publisher.
    pub kind: String,
    pub value: String,
}

impl IdentifierSet {
    pub fn is_empty(&self) -> bool {
        self.doi.is_none() && self.preprint.is_none() && self.pub_ids.is_empty()
    }
}
