//! Invoice number cleanup and plausibility check.

/// Accept numbers of 5-30 characters made of letters, digits, `/` and `-`,
/// with at least one digit.
pub fn validate_invoice_number(number: &str) -> bool {
    (5..=30).contains(&number.len())
        && number
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '/' || c == '-')
        && number.chars().any(|c| c.is_ascii_digit())
}

/// Upper-case a captured number and strip trailing punctuation.
pub fn clean_invoice_number(raw: &str) -> Option<String> {
    let cleaned = raw
        .trim()
        .trim_end_matches(['.', ',', ';', ':', '-', '/'])
        .to_ascii_uppercase();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
