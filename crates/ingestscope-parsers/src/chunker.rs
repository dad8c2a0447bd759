//! Splitting multi-record documents into independently parseable fragments.

/// Start/end markers derived from a record element name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordBoundary {
    open: String,
    close: String,
}

impl RecordBoundary {
    pub fn new(tag: &str) -> Self {
        Self {
            open: format!("<{tag}"),
            close: format!("</{tag}"),
        }
    }

    /// Span of the next start marker at or after `from`.
    fn next_start(&self, text: &str, from: usize) -> Option<(usize, usize)> {
        find_marker(text, &self.open, from)
    }

    fn next_end(&self, text: &str, from: usize) -> Option<(usize, usize)> {
        find_marker(text, &self.close, from)
    }
}

/// `<name` only counts when the following character ends the name; the
/// marker then runs through the next `>`.
fn find_marker(text: &str, prefix: &str, mut from: usize) -> Option<(usize, usize)> {
    while let Some(offset) = text.get(from..)?.find(prefix) {
        let start = from + offset;
        let after = start + prefix.len();
        match text[after..].chars().next() {
            Some(c) if !is_name_char(c) => {
                let close = text[after..].find('>')?;
                return Some((start, after + close + 1));
            }
            Some(_) => from = after,
            None => return None,
        }
    }
    None
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')
}

#[derive(Debug, Clone)]
pub struct DocumentChunker {
    boundary: RecordBoundary,
    keep_header: bool,
}

impl DocumentChunker {
    pub fn new(tag: &str) -> Self {
        Self {
            boundary: RecordBoundary::new(tag),
            keep_header: false,
        }
    }

    /// Wrap each fragment in the text before the first record and after the
    /// last one, so namespace declarations on the envelope stay in scope.
    pub fn keep_header(mut self, keep: bool) -> Self {
        self.keep_header = keep;
        self
    }

    /// Byte spans `[start, end)` of every record, in document order.
    /// Each start marker pairs with the first end marker after it.
    pub fn spans(&self, text: &str) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut cursor = 0;
        while let Some((start, open_end)) = self.boundary.next_start(text, cursor) {
            let Some((_, end)) = self.boundary.next_end(text, open_end) else {
                break;
            };
            spans.push((start, end));
            cursor = end;
        }
        spans
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let spans = self.spans(text);
        let (Some(first), Some(last)) = (spans.first(), spans.last()) else {
            return Vec::new();
        };
        let header = &text[..first.0];
        let footer = &text[last.1..];

        spans
            .iter()
            .map(|&(start, end)| {
                let body = &text[start..end];
                if self.keep_header {
                    format!("{header}{body}{footer}").trim().to_string()
                } else {
                    body.trim().to_string()
                }
            })
            .collect()
    }
}
