//! Amount parsing for KES invoices.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse an amount (e.g., "KES 60,000.00", "1 234,5" or "1234.56") into a
/// decimal rounded to two fractional digits.
///
/// A comma followed by exactly three digits is a thousands separator; when
/// both separators appear, the last one is the decimal point.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let comma = cleaned.rfind(',');
    let dot = cleaned.rfind('.');

    let normalized = match (comma, dot) {
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(c), None) => {
            let fraction = &cleaned[c + 1..];
            if cleaned.matches(',').count() == 1 && (1..=2).contains(&fraction.len()) {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        (None, Some(d)) => {
            let fraction = &cleaned[d + 1..];
            if cleaned.matches('.').count() > 1 && fraction.len() == 3 {
                cleaned.replace('.', "")
            } else {
                let (int_part, frac_part) = cleaned.split_at(d);
                format!("{}{}", int_part.replace('.', ""), frac_part)
            }
        }
        (None, None) => cleaned,
    };

    let normalized = normalized.trim_end_matches('.');
    let normalized = if normalized.starts_with('.') {
        format!("0{}", normalized)
    } else {
        normalized.to_string()
    };

    let mut amount = Decimal::from_str(&normalized).ok()?.round_dp(2);
    amount.rescale(2);
    Some(amount)
}

/// Format an amount in KES style (60,000.00).
pub fn format_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount);
    let (sign, s) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };

    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s, "00"));

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    format!("{}{}.{}", sign, formatted, decimal_part)
}
