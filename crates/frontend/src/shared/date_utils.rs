/// Utilities for date and text formatting in tables
use contracts::projections::p901_price_research::dto::parse_date;

/// `2024-03-15` or `2024-03-15T14:02:26Z` -> `15/03/2024`; `-` when absent
/// or unparseable.
pub fn format_date(raw: Option<&str>) -> String {
    raw.and_then(parse_date)
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Cuts after `max` characters and appends `...`; `-` for empty text.
pub fn truncate(text: Option<&str>, max: usize) -> String {
    match text {
        None | Some("") => "-".to_string(),
        Some(t) if t.chars().count() > max => {
            let cut: String = t.chars().take(max).collect();
            format!("{cut}...")
        }
        Some(t) => t.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some("2024-03-15")), "15/03/2024");
        assert_eq!(format_date(Some("2024-03-15T14:02:26.123Z")), "15/03/2024");
        assert_eq!(format_date(Some("invalid")), "-");
        assert_eq!(format_date(None), "-");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate(Some("Papelaria Central"), 9), "Papelaria...");
        assert_eq!(truncate(Some("Açúcar"), 10), "Açúcar");
        assert_eq!(truncate(Some("ção"), 2), "ça...");
        assert_eq!(truncate(None, 5), "-");
    }
}
