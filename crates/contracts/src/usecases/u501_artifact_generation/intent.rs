//! Generation intent found in assistant prose, and cleanup of the technical
//! markers before display.

use once_cell::sync::Lazy;
use regex::Regex;

static MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[GERAR_\w+\]").expect("valid marker regex"));

static ACTION_JSON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\{"action":\s*"generate"[^}]*\}"#).expect("valid action regex"));

const INTENT_PHRASES: [&str; 2] = ["vou iniciar a geração", "iniciando a geração"];

/// Whether a completed assistant message asks to start generation.
pub fn has_generate_intent(text: &str, marker: &str) -> bool {
    if !marker.is_empty() && text.contains(marker) {
        return true;
    }
    let lower = text.to_lowercase();
    INTENT_PHRASES.iter().any(|p| lower.contains(p))
}

/// Text shown in a chat bubble.
pub fn display_text(text: &str) -> String {
    let without_markers = MARKER_RE.replace_all(text, "");
    ACTION_JSON_RE
        .replace_all(&without_markers, "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_or_phrase() {
        assert!(has_generate_intent("Tudo pronto [GERAR_DFD]", "[GERAR_DFD]"));
        assert!(has_generate_intent("Certo, VOU INICIAR A GERAÇÃO agora", "[GERAR_ETP]"));
        assert!(!has_generate_intent("Qual o prazo?", "[GERAR_DFD]"));
        assert!(!has_generate_intent("Tudo pronto [GERAR_ETP]", "[GERAR_DFD]"));
    }

    #[test]
    fn test_display_strips_markers() {
        let text = "Perfeito! [GERAR_ETP]\n{\"action\": \"generate\", \"ok\": true}";
        assert_eq!(display_text(text), "Perfeito!");
    }
}
