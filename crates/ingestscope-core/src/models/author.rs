use serde::{Deserialize, Serialize};

/// One author of a record, either a person or a collaboration.
///
/// `aff` and `xaff` are parallel: `aff[i]` is the display text the label
/// `xaff[i]` resolved to in the fragment's affiliation table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collab: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub aff: Vec<String>,
    #[serde(default)]
    pub xaff: Vec<String>,
}

impl AuthorEntry {
    pub fn person(given: impl Into<String>, surname: impl Into<String>) -> Self {
        let given = given.into();
        Self {
            given: (!given.is_empty()).then_some(given),
            surname: Some(surname.into()),
            ..Default::default()
        }
    }

    pub fn collaboration(name: impl Into<String>) -> Self {
        Self {
            collab: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn is_collaboration(&self) -> bool {
        self.collab.is_some()
    }

    /// Record a resolved affiliation, keeping `aff`/`xaff` aligned.
    pub fn push_affiliation(&mut self, label: impl Into<String>, text: impl Into<String>) {
        self.xaff.push(label.into());
        self.aff.push(text.into());
    }

    pub fn is_empty(&self) -> bool {
        self.given.is_none()
            && self.surname.is_none()
            && self.collab.is_none()
            && self.orcid.is_none()
            && self.email.is_none()
            && self.aff.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn person_without_given_name() {
        let author = AuthorEntry::person("", "Plato");
        assert_eq!(author.given, None);
        assert_eq!(author.surname.as_deref(), Some("Plato"));
        assert!(!author.is_collaboration());
    }

    #[test]
    fn affiliations_stay_parallel() {
        let mut author = AuthorEntry::collaboration("ATLAS Collaboration");
        author.push_affiliation("a1", "CERN");
        author.push_affiliation("a2", "DESY");
        assert_eq!(author.aff.len(), author.xaff.len());
        assert_eq!(author.xaff, vec!["a1", "a2"]);
        assert!(!author.is_empty());
        assert!(AuthorEntry::default().is_empty());
    }
}
