//! pt-BR number formatting.

/// `R$ 1.234,5678` style: thousands with `.`, decimal comma, between two
/// and four fraction digits. Missing values render as `-`.
pub fn format_brl(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("R$ {}", format_decimal(v, 2, 4)),
        _ => "-".to_string(),
    }
}

/// Formats with at least `min` and at most `max` fraction digits.
pub fn format_decimal(value: f64, min: usize, max: usize) -> String {
    let fixed = format!("{:.*}", max, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < min {
        frac.push('0');
    }
    let negative = value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac.is_empty() {
        out.push(',');
        out.push_str(&frac);
    }
    out
}

/// Integer counts with a `.` thousands separator.
pub fn format_count(n: usize) -> String {
    group_thousands(&n.to_string())
}

pub fn format_percent(value: f64) -> String {
    format!("{}%", format_decimal(value, 2, 2))
}

fn group_thousands(digits: &str) -> String {
    let mut result = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(Some(1234.5)), "R$ 1.234,50");
        assert_eq!(format_brl(Some(0.12346)), "R$ 0,1235");
        assert_eq!(format_brl(Some(10.0)), "R$ 10,00");
        assert_eq!(format_brl(Some(1_000_000.0)), "R$ 1.000.000,00");
        assert_eq!(format_brl(Some(-2.5)), "R$ -2,50");
        assert_eq!(format_brl(None), "-");
    }

    #[test]
    fn test_format_percent_and_count() {
        assert_eq!(format_percent(40.824829), "40,82%");
        assert_eq!(format_count(12345), "12.345");
        assert_eq!(format_count(12), "12");
    }
}
