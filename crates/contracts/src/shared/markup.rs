//! Minimal chat markup: `**bold**` spans and line breaks.
//!
//! Messages are rendered as segments instead of HTML so model output is never
//! injected as markup.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Bold(String),
    LineBreak,
}

pub fn segments(text: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push(Segment::LineBreak);
        }
        push_line(line, &mut out);
    }
    out
}

fn push_line(line: &str, out: &mut Vec<Segment>) {
    let mut rest = line;
    while let Some(open) = rest.find("**") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("**") else {
            break;
        };
        if open > 0 {
            out.push(Segment::Text(rest[..open].to_string()));
        }
        out.push(Segment::Bold(after[..close].to_string()));
        rest = &after[close + 2..];
    }
    if !rest.is_empty() {
        out.push(Segment::Text(rest.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_and_breaks() {
        assert_eq!(
            segments("Olá **LIA**!\nTudo bem"),
            vec![
                Segment::Text("Olá ".into()),
                Segment::Bold("LIA".into()),
                Segment::Text("!".into()),
                Segment::LineBreak,
                Segment::Text("Tudo bem".into()),
            ]
        );
    }

    #[test]
    fn test_unclosed_bold_stays_text() {
        assert_eq!(segments("a **b"), vec![Segment::Text("a **b".into())]);
        assert!(segments("").is_empty());
    }
}
