//! `\` trigger for picking skills while typing an instruction.

use super::aggregate::Skill;

pub const TRIGGER: char = '\\';

/// Active trigger: byte offset of the `\` and the lowercase query after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerQuery {
    pub start: usize,
    pub query: String,
}

/// Finds a trigger before `cursor` (byte offset). The `\` must begin the text
/// or follow whitespace, and the query must not contain a space.
pub fn find_trigger(text: &str, cursor: usize) -> Option<TriggerQuery> {
    let cursor = cursor.min(text.len());
    let head = text.get(..cursor)?;
    let start = head.rfind(TRIGGER)?;
    let preceded_ok = head[..start]
        .chars()
        .next_back()
        .map_or(true, char::is_whitespace);
    if !preceded_ok {
        return None;
    }
    let query = &head[start + TRIGGER.len_utf8()..];
    if query.contains(' ') {
        return None;
    }
    Some(TriggerQuery {
        start,
        query: query.to_lowercase(),
    })
}

pub fn suggestions<'a>(skills: &'a [Skill], query: &str) -> Vec<&'a Skill> {
    skills.iter().filter(|s| s.matches(query)).collect()
}

/// Removes the trigger and query from the text; returns the new text and the
/// cursor position to restore.
pub fn strip_trigger(text: &str, trigger: &TriggerQuery, cursor: usize) -> (String, usize) {
    let cursor = cursor.min(text.len()).max(trigger.start);
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..trigger.start]);
    out.push_str(&text[cursor..]);
    (out, trigger.start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_at_start_and_after_space() {
        let t = find_trigger("\\jur", 4).unwrap();
        assert_eq!(t, TriggerQuery { start: 0, query: "jur".into() });
        let t = find_trigger("melhore \\Pre", 12).unwrap();
        assert_eq!(t.start, 8);
        assert_eq!(t.query, "pre");
    }

    #[test]
    fn test_no_trigger_inside_word_or_after_space_in_query() {
        assert!(find_trigger("a\\b", 3).is_none());
        assert!(find_trigger("\\abc def", 8).is_none());
        assert!(find_trigger("nada", 4).is_none());
    }

    #[test]
    fn test_strip_trigger_restores_cursor() {
        let text = "melhore \\jur o texto";
        let t = find_trigger(text, 12).unwrap();
        let (out, cursor) = strip_trigger(text, &t, 12);
        assert_eq!(out, "melhore  o texto");
        assert_eq!(cursor, 8);
    }
}
