//! Splitting free-text author strings into structured entries.

use ingestscope_core::AuthorEntry;
use ingestscope_core::clean::clean_text;
use ingestscope_core::config::ArxivConfig;

/// Generational suffixes that stay attached to the surname.
const SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv"];

/// Lowercase surname particles (`van`, `de`, ...) that belong to the surname.
const PARTICLES: &[&str] = &[
    "van", "von", "de", "der", "den", "del", "della", "di", "da", "du", "dos", "das", "la", "le",
    "ter", "ten",
];

#[derive(Debug, Clone)]
pub struct CollaborationParams {
    /// Matched case-insensitively against whole words.
    pub keywords: Vec<String>,
    pub remove_the: bool,
    pub first_author_delimiter: Option<char>,
    /// Turn `"Collaboration, Gaia"` back into `"Gaia Collaboration"`.
    pub fix_mixed_collaboration: bool,
}

impl Default for CollaborationParams {
    fn default() -> Self {
        Self::from(&ArxivConfig::default())
    }
}

impl From<&ArxivConfig> for CollaborationParams {
    fn from(config: &ArxivConfig) -> Self {
        Self {
            keywords: config
                .collaboration_keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            remove_the: config.remove_the,
            first_author_delimiter: Some(':'),
            fix_mixed_collaboration: config.fix_mixed_collaboration,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NameSplitter {
    params: CollaborationParams,
}

impl NameSplitter {
    pub fn new(params: CollaborationParams) -> Self {
        Self { params }
    }

    /// Split on the first-author delimiter, then classify each part. A
    /// collaboration part may carry trailing personal names after a comma.
    pub fn split(&self, raw: &str) -> Vec<AuthorEntry> {
        let raw = clean_text(raw);
        if raw.is_empty() {
            return Vec::new();
        }
        if !self.is_collaboration(&raw) {
            return split_person(&raw).into_iter().collect();
        }

        let parts: Vec<&str> = match self.params.first_author_delimiter {
            Some(delimiter) => raw.split(delimiter).collect(),
            None => vec![raw.as_str()],
        };
        parts
            .into_iter()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .flat_map(|part| {
                if self.is_collaboration(part) {
                    self.collaboration_part(part)
                } else {
                    split_person(part).into_iter().collect()
                }
            })
            .collect()
    }

    pub fn is_collaboration(&self, text: &str) -> bool {
        text.split(|c: char| !c.is_alphanumeric())
            .any(|word| {
                let word = word.to_lowercase();
                self.params.keywords.iter().any(|k| *k == word)
            })
    }

    fn is_bare_keyword(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.params.keywords.iter().any(|k| *k == text)
    }

    /// `"Collaboration, Gaia"` is arXiv applying `Surname, Given` to a
    /// collaboration and becomes `"Gaia Collaboration"`. Anything after the
    /// first comma of `"Gaia Collaboration, Brown, A."` is personal names.
    fn collaboration_part(&self, part: &str) -> Vec<AuthorEntry> {
        let Some((head, tail)) = part.split_once(',') else {
            return vec![self.collaboration(part)];
        };
        let (head, tail) = (head.trim(), tail.trim());
        if tail.is_empty() || !self.is_collaboration(head) {
            return vec![self.collaboration(part)];
        }

        if self.is_bare_keyword(head) {
            if !self.params.fix_mixed_collaboration {
                return vec![self.collaboration(part)];
            }
            let (name, rest) = match tail.split_once(',') {
                Some((name, rest)) => (name.trim(), rest),
                None => (tail, ""),
            };
            let mut entries = vec![self.collaboration(&format!("{name} {head}"))];
            entries.extend(self.split_trailing(rest));
            return entries;
        }

        let mut entries = vec![self.collaboration(head)];
        entries.extend(self.split_trailing(tail));
        entries
    }

    /// Comma list of `Surname, Given[, Suffix]` groups, with any
    /// collaboration pieces kept whole.
    fn split_trailing(&self, rest: &str) -> Vec<AuthorEntry> {
        let mut entries = Vec::new();
        let mut pieces = rest
            .split(',')
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .peekable();
        while let Some(piece) = pieces.next() {
            if self.is_collaboration(piece) {
                entries.push(self.collaboration(piece));
                continue;
            }
            let mut name = piece.to_string();
            if let Some(given) = pieces.next_if(|p| !is_suffix(p) && !self.is_collaboration(p)) {
                name = format!("{name}, {given}");
            }
            while let Some(suffix) = pieces.next_if(|p| is_suffix(p)) {
                name = format!("{name}, {suffix}");
            }
            entries.extend(split_person(&name));
        }
        entries
    }

    fn collaboration(&self, name: &str) -> AuthorEntry {
        let name = if self.params.remove_the {
            strip_leading_the(name)
        } else {
            name
        };
        AuthorEntry::collaboration(name.to_string())
    }
}

fn strip_leading_the(name: &str) -> &str {
    match name.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("the ") => name[4..].trim_start(),
        _ => name,
    }
}

fn is_suffix(token: &str) -> bool {
    let token = token.trim_end_matches('.').to_lowercase();
    SUFFIXES.contains(&token.as_str())
}

fn is_particle(token: &str) -> bool {
    PARTICLES.contains(&token)
}

/// Split one personal name. `Surname, Given` when a comma is present,
/// otherwise the last token (with any particles before it) is the surname.
pub fn split_person(raw: &str) -> Option<AuthorEntry> {
    let raw = clean_text(raw);
    let raw = raw.trim_matches(|c: char| c == ',' || c.is_whitespace());
    if raw.is_empty() {
        return None;
    }

    if raw.contains(',') {
        let mut pieces = raw.split(',').map(str::trim).filter(|p| !p.is_empty());
        let mut surname = pieces.next()?.to_string();
        let mut given = Vec::new();
        for piece in pieces {
            if is_suffix(piece) {
                surname.push(' ');
                surname.push_str(piece);
            } else {
                given.push(piece);
            }
        }
        return Some(AuthorEntry::person(given.join(" "), surname));
    }

    let tokens: Vec<&str> = raw.split_whitespace().collect();
    let mut end = tokens.len();
    let suffix = if end >= 2 && is_suffix(tokens[end - 1]) {
        end -= 1;
        Some(tokens[end])
    } else {
        None
    };
    let mut start = end - 1;
    while start > 0 && is_particle(tokens[start - 1]) {
        start -= 1;
    }

    let mut surname = tokens[start..end].join(" ");
    if let Some(suffix) = suffix {
        surname.push(' ');
        surname.push_str(suffix);
    }
    Some(AuthorEntry::person(tokens[..start].join(" "), surname))
}
