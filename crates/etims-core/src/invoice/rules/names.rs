//! Party name cleanup.

/// Tokens that start the next label on the same OCR line.
const STOP_TOKENS: &[&str] = &[
    "PIN", "TEL", "PHONE", "MOBILE", "EMAIL", "E-MAIL", "VAT", "ADDRESS", "DATE", "INVOICE",
];

/// Trim OCR artifacts from a captured party name.
///
/// Cuts the capture at the next label on the line, strips stray punctuation
/// at both ends and collapses inner whitespace. Returns `None` if nothing
/// is left.
pub fn clean_name(raw: &str) -> Option<String> {
    let tokens: Vec<&str> = raw
        .split_whitespace()
        .take_while(|token| {
            let bare = token.trim_end_matches([':', '.', ',']).to_ascii_uppercase();
            !STOP_TOKENS.contains(&bare.as_str())
        })
        .collect();

    let joined = tokens.join(" ");
    let cleaned = joined
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .trim_end_matches(|c: char| {
            c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-' | '_' | '|' | '*' | '~' | '"' | '\'' | '(')
        });

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name_trims_artifacts() {
        assert_eq!(
            clean_name("  | ACME TRADING LIMITED ;"),
            Some("ACME TRADING LIMITED".to_string())
        );
        assert_eq!(clean_name("Jane   Wanjiru  "), Some("Jane Wanjiru".to_string()));
    }

    #[test]
    fn test_clean_name_keeps_abbreviations() {
        assert_eq!(clean_name("Acme Co. Ltd."), Some("Acme Co. Ltd.".to_string()));
        assert_eq!(clean_name("Acme (K) Ltd"), Some("Acme (K) Ltd".to_string()));
    }

    #[test]
    fn test_clean_name_stops_at_next_label() {
        assert_eq!(
            clean_name("ACME LIMITED PIN"),
            Some("ACME LIMITED".to_string())
        );
        assert_eq!(
            clean_name("Jane Wanjiru Tel. 0712"),
            Some("Jane Wanjiru".to_string())
        );
    }

    #[test]
    fn test_clean_name_empty() {
        assert_eq!(clean_name(" -- "), None);
        assert_eq!(clean_name("PIN"), None);
    }
}
