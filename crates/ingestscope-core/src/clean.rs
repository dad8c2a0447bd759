//! Text cleanup applied to extracted field values.

use std::borrow::Cow;

use quick_xml::escape::{escape, partial_escape, unescape_with};

/// Collapse every run of whitespace (including newlines and NBSP) into a
/// single space and trim both ends.
pub fn clean_text(input: &str) -> String {
    input
        .split_whitespace()
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn clean_optional(value: Option<String>) -> Option<String> {
    value.map(|v| clean_text(&v)).filter(|v| !v.is_empty())
}

/// Decode XML, numeric and common HTML entity references.
///
/// References are resolved one at a time. An unknown named entity is left
/// exactly as written and does not stop its neighbours from decoding:
/// publisher feeds routinely contain entities without a DTD to declare them.
pub fn decode_entities(raw: &str) -> Cow<'_, str> {
    rewrite_entities(raw, keep)
}

/// Canonical markup for raw element text: every known reference is decoded
/// and re-escaped minimally, unknown references stay as written.
pub fn normalize_text_markup(raw: &str) -> Cow<'_, str> {
    rewrite_entities(raw, escape_text)
}

/// Same as [`normalize_text_markup`] for attribute values, where quotes are
/// escaped too.
pub fn normalize_attribute_markup(raw: &str) -> Cow<'_, str> {
    rewrite_entities(raw, escape_attribute)
}

fn keep(text: &str) -> Cow<'_, str> {
    Cow::Borrowed(text)
}

fn escape_text(text: &str) -> Cow<'_, str> {
    partial_escape(text)
}

fn escape_attribute(text: &str) -> Cow<'_, str> {
    escape(text)
}

/// Copy `raw`, passing the decoded form of each resolvable reference through
/// `emit`. Anything that is not a resolvable reference is copied untouched.
fn rewrite_entities<'a>(raw: &'a str, emit: fn(&str) -> Cow<'_, str>) -> Cow<'a, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        let reference = entity_reference(rest);
        match reference.and_then(|r| unescape_with(r, resolve_entity).ok()) {
            Some(decoded) => out.push_str(&emit(&decoded)),
            None => out.push_str(reference.unwrap_or("&")),
        }
        rest = &rest[reference.map_or(1, str::len)..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// The `&name;` or `&#n;` reference at the start of `text`, if well formed.
fn entity_reference(text: &str) -> Option<&str> {
    let end = text.find(';')?;
    let name = &text[1..end];
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '#');
    valid.then(|| &text[..=end])
}

/// Replace characters that break single-line reference strings.
pub fn flatten_reference(raw: &str) -> String {
    raw.replace('\n', " ").replace('\u{a0}', " ")
}

fn resolve_entity(name: &str) -> Option<&'static str> {
    let value = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "hellip" => "\u{2026}",
        "minus" => "\u{2212}",
        "times" => "\u{d7}",
        "deg" => "\u{b0}",
        "plusmn" => "\u{b1}",
        "micro" => "\u{b5}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "shy" => "\u{ad}",
        "thinsp" => "\u{2009}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "aacute" => "\u{e1}",
        "eacute" => "\u{e9}",
        "iacute" => "\u{ed}",
        "oacute" => "\u{f3}",
        "uacute" => "\u{fa}",
        "Aacute" => "\u{c1}",
        "Eacute" => "\u{c9}",
        "agrave" => "\u{e0}",
        "egrave" => "\u{e8}",
        "auml" => "\u{e4}",
        "ouml" => "\u{f6}",
        "uuml" => "\u{fc}",
        "Auml" => "\u{c4}",
        "Ouml" => "\u{d6}",
        "Uuml" => "\u{dc}",
        "szlig" => "\u{df}",
        "ccedil" => "\u{e7}",
        "ntilde" => "\u{f1}",
        "oslash" => "\u{f8}",
        "aring" => "\u{e5}",
        "alpha" => "\u{3b1}",
        "beta" => "\u{3b2}",
        "gamma" => "\u{3b3}",
        "delta" => "\u{3b4}",
        "mu" => "\u{3bc}",
        "pi" => "\u{3c0}",
        "sigma" => "\u{3c3}",
        "lambda" => "\u{3bb}",
        "Lambda" => "\u{39b}",
        "Omega" => "\u{3a9}",
        "omega" => "\u{3c9}",
        _ => return None,
    };
    Some(value)
}
