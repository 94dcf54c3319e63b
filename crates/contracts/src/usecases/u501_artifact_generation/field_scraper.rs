//! Incremental extraction of string fields from a growing JSON document.
//!
//! Generation streams the artifact as one JSON object whose text grows with
//! every `chunk`. The scanner walks the first object of the current
//! buffer, decoding string values (escapes included) and skipping nested
//! objects, arrays and scalars. A value whose closing quote has not arrived
//! yet is reported as in progress with everything decoded so far.

use std::collections::HashSet;
use std::iter::Peekable;
use std::str::Chars;

use crate::domain::a002_artifact::{ArtifactFieldSpec, FieldKind};

/// Top-level member found in the buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannedValue {
    Text { value: String, closed: bool },
    /// Any non-string value, complete or not
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedMember {
    pub key: String,
    pub value: ScannedValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProgress {
    InProgress(String),
    Complete(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUpdate {
    pub key: String,
    pub progress: FieldProgress,
}

impl FieldUpdate {
    pub fn value(&self) -> &str {
        match &self.progress {
            FieldProgress::InProgress(v) | FieldProgress::Complete(v) => v,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.progress, FieldProgress::Complete(_))
    }
}

/// Tracks which `ia` fields already completed during one generation run.
#[derive(Debug, Clone, Default)]
pub struct FieldScraper {
    targets: Vec<String>,
    completed: HashSet<String>,
}

impl FieldScraper {
    pub fn new(fields: &[ArtifactFieldSpec]) -> Self {
        Self {
            targets: fields
                .iter()
                .filter(|f| f.kind == FieldKind::Ia)
                .map(|f| f.key.clone())
                .collect(),
            completed: HashSet::new(),
        }
    }

    /// Scans the cumulative buffer. Each pending target present in the
    /// buffer yields one update; a target is reported complete once.
    pub fn scan(&mut self, buffer: &str) -> Vec<FieldUpdate> {
        let members = scan_members(buffer);
        let mut updates = Vec::new();
        for key in &self.targets {
            if self.completed.contains(key) {
                continue;
            }
            let found = members.iter().find_map(|m| match &m.value {
                ScannedValue::Text { value, closed } if &m.key == key => Some((value, *closed)),
                _ => None,
            });
            let Some((value, closed)) = found else {
                continue;
            };
            let progress = if closed {
                FieldProgress::Complete(value.clone())
            } else {
                FieldProgress::InProgress(value.clone())
            };
            updates.push(FieldUpdate {
                key: key.clone(),
                progress,
            });
        }
        for update in updates.iter().filter(|u| u.is_complete()) {
            self.completed.insert(update.key.clone());
        }
        updates
    }

    /// Marks a field complete after an explicit `field` event.
    pub fn mark_complete(&mut self, key: &str) -> bool {
        self.targets.iter().any(|t| t == key) && self.completed.insert(key.to_string())
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn is_complete(&self, key: &str) -> bool {
        self.completed.contains(key)
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }
}

/// Members of the first object in the buffer, in document order. Braces in
/// prose before the JSON are passed over: the object is the first `{` that
/// opens at least one member. Stops at the first incomplete or malformed token.
pub fn scan_members(text: &str) -> Vec<ScannedMember> {
    text.match_indices('{')
        .map(|(start, _)| scan_object(&text[start + 1..]))
        .find(|members| !members.is_empty())
        .unwrap_or_default()
}

fn scan_object(body: &str) -> Vec<ScannedMember> {
    let mut members = Vec::new();
    let mut chars = body.chars().peekable();

    loop {
        skip_separators(&mut chars);
        match chars.next() {
            Some('"') => {}
            _ => return members,
        }
        let (key, closed) = read_string(&mut chars);
        if !closed {
            return members;
        }
        skip_whitespace(&mut chars);
        if chars.next() != Some(':') {
            return members;
        }
        skip_whitespace(&mut chars);
        match chars.peek() {
            None => return members,
            Some('"') => {
                chars.next();
                let (value, closed) = read_string(&mut chars);
                members.push(ScannedMember {
                    key,
                    value: ScannedValue::Text { value, closed },
                });
                if !closed {
                    return members;
                }
            }
            Some(_) => {
                let finished = skip_value(&mut chars);
                members.push(ScannedMember {
                    key,
                    value: ScannedValue::Other,
                });
                if !finished {
                    return members;
                }
            }
        }
    }
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

fn skip_separators(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace() || *c == ',') {
        chars.next();
    }
}

/// Reads a string body after its opening quote. Returns the decoded text and
/// whether the closing quote was seen. A trailing partial escape is dropped.
fn read_string(chars: &mut Peekable<Chars<'_>>) -> (String, bool) {
    let mut out = String::new();
    while let Some(c) = chars.next() {
        match c {
            '"' => return (out, true),
            '\\' => match chars.next() {
                None => return (out, false),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('b') => out.push('\u{0008}'),
                Some('f') => out.push('\u{000C}'),
                Some('u') => match read_unicode_escape(chars) {
                    Some(decoded) => out.push(decoded),
                    None => return (out, false),
                },
                Some(other) => out.push(other),
            },
            c => out.push(c),
        }
    }
    (out, false)
}

fn read_hex4(chars: &mut Peekable<Chars<'_>>) -> Option<u32> {
    let mut code = 0;
    for _ in 0..4 {
        code = code * 16 + chars.next()?.to_digit(16)?;
    }
    Some(code)
}

/// Decodes `XXXX` after `\u`, pairing surrogates. `None` when input ran out.
fn read_unicode_escape(chars: &mut Peekable<Chars<'_>>) -> Option<char> {
    let high = read_hex4(chars)?;
    if (0xD800..0xDC00).contains(&high) {
        if chars.next()? != '\\' || chars.next()? != 'u' {
            return Some(char::REPLACEMENT_CHARACTER);
        }
        let low = read_hex4(chars)?;
        if !(0xDC00..0xE000).contains(&low) {
            return Some(char::REPLACEMENT_CHARACTER);
        }
        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        return Some(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
    }
    Some(char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER))
}

/// Skips a non-string value. Returns `false` when the input ended first.
fn skip_value(chars: &mut Peekable<Chars<'_>>) -> bool {
    let mut depth = 0usize;
    while let Some(&c) = chars.peek() {
        match c {
            '"' => {
                chars.next();
                if !read_string(chars).1 {
                    return false;
                }
                continue;
            }
            '{' | '[' => depth += 1,
            '}' | ']' if depth == 0 => return true,
            '}' | ']' => depth -= 1,
            ',' if depth == 0 => return true,
            _ => {}
        }
        chars.next();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<ArtifactFieldSpec> {
        vec![
            ArtifactFieldSpec::new("numero", "Número", FieldKind::Auto),
            ArtifactFieldSpec::new("a", "A", FieldKind::Ia),
            ArtifactFieldSpec::new("b", "B", FieldKind::Ia),
            ArtifactFieldSpec::new("riscos", "Riscos", FieldKind::Riscos),
        ]
    }

    #[test]
    fn test_partial_then_complete_once() {
        let mut scraper = FieldScraper::new(&fields());
        let first = scraper.scan(r#"{"a": "hello, wor"#);
        assert_eq!(
            first,
            vec![FieldUpdate {
                key: "a".into(),
                progress: FieldProgress::InProgress("hello, wor".into())
            }]
        );
        let second = scraper.scan(r#"{"a": "hello, world""#);
        assert_eq!(second[0].progress, FieldProgress::Complete("hello, world".into()));
        let third = scraper.scan(r#"{"a": "hello, world", "b": "x"#);
        assert_eq!(third.len(), 1);
        assert_eq!(third[0].key, "b");
        assert_eq!(scraper.completed_count(), 1);
    }

    #[test]
    fn test_escapes_in_partial_value() {
        let mut scraper = FieldScraper::new(&fields());
        let updates = scraper.scan(r#"{"a": "linha 1\nele disse \"sim\"\tfim"#);
        assert_eq!(updates[0].value(), "linha 1\nele disse \"sim\"\tfim");
        assert!(!updates[0].is_complete());
    }

    #[test]
    fn test_partial_escape_at_buffer_end_is_dropped() {
        let members = scan_members(r#"{"a": "abc\"#);
        assert_eq!(
            members[0].value,
            ScannedValue::Text { value: "abc".into(), closed: false }
        );
        let members = scan_members(r#"{"a": "x\u00e"#);
        assert_eq!(
            members[0].value,
            ScannedValue::Text { value: "x".into(), closed: false }
        );
    }

    #[test]
    fn test_unicode_escapes() {
        let members = scan_members(r#"{"a": "ol\u00e1 \ud83d\ude00"}"#);
        assert_eq!(
            members[0].value,
            ScannedValue::Text { value: "olá 😀".into(), closed: true }
        );
    }

    #[test]
    fn test_nested_values_are_skipped() {
        let text = r#"```json
{"riscos": [{"a": "not a field", "n": 1}], "meta": {"b": "x"}, "count": 3, "b": "fim"}"#;
        let members = scan_members(text);
        let keys: Vec<_> = members.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["riscos", "meta", "count", "b"]);

        let mut scraper = FieldScraper::new(&fields());
        let updates = scraper.scan(text);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].key, "b");
        assert!(updates[0].is_complete());
    }

    #[test]
    fn test_structural_characters_inside_strings() {
        let members = scan_members(r#"{"x": ["}", "]"], "a": "{não, é: fim}"}"#);
        assert_eq!(members.len(), 2);
        assert_eq!(
            members[1].value,
            ScannedValue::Text { value: "{não, é: fim}".into(), closed: true }
        );
    }

    #[test]
    fn test_auto_and_special_fields_are_not_targets() {
        let mut scraper = FieldScraper::new(&fields());
        assert_eq!(scraper.target_count(), 2);
        assert!(scraper.scan(r#"{"numero": "1", "riscos": "x"}"#).is_empty());
        assert!(!scraper.mark_complete("numero"));
        assert!(scraper.mark_complete("a"));
        assert!(!scraper.mark_complete("a"));
    }

    #[test]
    fn test_braces_in_preamble_are_skipped() {
        let mut scraper = FieldScraper::new(&fields());
        let updates = scraper.scan("Segue o {rascunho}:\n{\"a\": \"Aquisi");
        assert_eq!(
            updates,
            vec![FieldUpdate {
                key: "a".into(),
                progress: FieldProgress::InProgress("Aquisi".into())
            }]
        );
        let members = scan_members("use {} ou {x}\n```json\n{\"b\": \"fim\"}");
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].key, "b");
    }

    #[test]
    fn test_no_object_yet() {
        assert!(scan_members("Gerando...").is_empty());
        assert!(scan_members("{").is_empty());
        assert!(scan_members(r#"{"a"#).is_empty());
    }
}
