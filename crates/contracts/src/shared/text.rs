//! Text folding for search and ordering of Portuguese labels.

/// Lowercases and strips the accents used in Portuguese.
pub fn fold(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Accent and case insensitive substring test.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    fold(haystack).contains(&fold(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_strips_accents_and_case() {
        assert_eq!(fold("Ceará"), "ceara");
        assert_eq!(fold("LICITAÇÃO"), "licitacao");
    }

    #[test]
    fn test_contains_folded_both_sides() {
        assert!(contains_folded("Jurídico", "juri"));
        assert!(contains_folded("juridico", "JURÍ"));
        assert!(!contains_folded("Jurídico", "tabela"));
    }
}
