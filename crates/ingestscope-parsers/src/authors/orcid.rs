use once_cell::sync::Lazy;
use regex::Regex;

static ORCID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4}-){3}\d{3}(\d|X)").unwrap());

/// Bare ORCID iD from a raw value, which may be a full `https://orcid.org/` URL.
pub fn extract_orcid(value: &str) -> Option<String> {
    ORCID_REGEX.find(value).map(|m| m.as_str().to_string())
}
