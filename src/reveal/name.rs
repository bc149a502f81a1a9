//! Pulling the `name` field out of decrypted plaintext.
//!
//! Plaintexts are expected to be JSON objects with a top-level `name`. Some
//! producers emit almost-JSON, so a pattern match on `"name": "..."` is tried
//! when strict parsing does not yield a name.
//!
//! The pattern fallback takes the first `"name"` key anywhere in the text, which
//! may belong to a nested object.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""name"\s*:\s*"([^"]*)""#).expect("static regex"));

/// Extracts a non-empty name, trying strict JSON first.
pub fn extract_name(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = serde_json::from_str::<Value>(text) {
        if let Some(Value::String(name)) = parsed.get("name") {
            return (!name.is_empty()).then(|| name.clone());
        }
    }

    extract_name_by_pattern(text)
}

/// The tolerant path on its own: first `"name": "..."` match, `\uXXXX` escapes decoded.
pub fn extract_name_by_pattern(text: &str) -> Option<String> {
    let captured = NAME_PATTERN.captures(text)?.get(1)?.as_str();
    if captured.is_empty() {
        return None;
    }
    Some(unescape_unicode(captured))
}

/// Decodes `\uXXXX` sequences, pairing UTF-16 surrogates. Unpaired surrogates
/// become U+FFFD; every other character is kept as is.
fn unescape_unicode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut units: Vec<u16> = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        if let Some(unit) = rest.strip_prefix("\\u").and_then(parse_hex4) {
            units.push(unit);
            rest = &rest[6..];
            continue;
        }

        flush_units(&mut units, &mut out);
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    flush_units(&mut units, &mut out);

    out
}

fn parse_hex4(s: &str) -> Option<u16> {
    let hex = s.get(..4)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(hex, 16).ok()
}

fn flush_units(units: &mut Vec<u16>, out: &mut String) {
    if units.is_empty() {
        return;
    }
    out.extend(
        char::decode_utf16(units.drain(..)).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_json_name() {
        assert_eq!(extract_name(r#"{"name":"김민준"}"#).as_deref(), Some("김민준"));
        assert_eq!(
            extract_name(r#"{"id": 3, "name": "Lee", "grade": 2}"#).as_deref(),
            Some("Lee")
        );
    }

    #[test]
    fn both_paths_decode_escapes_identically() {
        let text = r#"{"name":"\uAC00\uB0D8"}"#;
        assert_eq!(extract_name(text).as_deref(), Some("가냘"));
        assert_eq!(extract_name_by_pattern(text).as_deref(), Some("가냘"));
    }

    #[test]
    fn falls_back_to_pattern_for_broken_json() {
        let text = r#"{"name": "김민준", "note": "trailing comma",}"#;
        assert_eq!(extract_name(text).as_deref(), Some("김민준"));
    }

    #[test]
    fn surrogate_pairs_are_combined() {
        let text = r#"{"name":"\uD83D\uDE00 smile", oops}"#;
        assert_eq!(extract_name(text).as_deref(), Some("😀 smile"));
        assert_eq!(extract_name_by_pattern(r#""name":"\uD83D!""#).as_deref(), Some("\u{FFFD}!"));
    }

    #[test]
    fn non_string_or_missing_names_fail() {
        assert_eq!(extract_name(""), None);
        assert_eq!(extract_name(r#"{"name": 42}"#), None);
        assert_eq!(extract_name(r#"{"name": ""}"#), None);
        assert_eq!(extract_name(r#"{"student": "x"}"#), None);
        assert_eq!(extract_name("plain text"), None);
    }

    #[test]
    fn pattern_fallback_finds_nested_name() {
        // Valid JSON without a top-level name still goes through the pattern.
        let text = r#"{"student": {"name": "Park"}}"#;
        assert_eq!(extract_name(text).as_deref(), Some("Park"));
    }

    #[test]
    fn malformed_escapes_are_left_alone() {
        assert_eq!(unescape_unicode(r"a\u12Zb"), r"a\u12Zb");
        assert_eq!(unescape_unicode(r"caf\u00e9 été"), "café été");
    }
}
