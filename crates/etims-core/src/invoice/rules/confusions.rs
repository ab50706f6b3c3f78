//! OCR glyph confusion rules.
//!
//! A closed, static table of `(confused, replacement, class)` tuples. Each
//! class names the position kind a rule applies to, so adding a confusion is
//! a one-line change that does not affect other classes.

/// Positions a confusion rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfusionClass {
    /// Numeric segment of a tax identifier.
    TaxIdDigit,
}

/// One substitution rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confusion {
    pub confused: char,
    pub replacement: char,
    pub class: ConfusionClass,
}

const fn rule(confused: char, replacement: char, class: ConfusionClass) -> Confusion {
    Confusion {
        confused,
        replacement,
        class,
    }
}

/// All known confusions.
pub const CONFUSIONS: &[Confusion] = &[
    rule('O', '0', ConfusionClass::TaxIdDigit),
    rule('o', '0', ConfusionClass::TaxIdDigit),
    rule('Q', '0', ConfusionClass::TaxIdDigit),
    rule('I', '1', ConfusionClass::TaxIdDigit),
    rule('i', '1', ConfusionClass::TaxIdDigit),
    rule('l', '1', ConfusionClass::TaxIdDigit),
    rule('|', '1', ConfusionClass::TaxIdDigit),
    rule('S', '5', ConfusionClass::TaxIdDigit),
    rule('B', '8', ConfusionClass::TaxIdDigit),
];

/// Replacement for `c` in a position of the given class, if any rule applies.
pub fn replacement_for(c: char, class: ConfusionClass) -> Option<char> {
    CONFUSIONS
        .iter()
        .find(|r| r.class == class && r.confused == c)
        .map(|r| r.replacement)
}

/// Apply every rule of `class` to `segment`, returning the corrected text and
/// the number of characters that changed.
pub fn correct_segment(segment: &str, class: ConfusionClass) -> (String, usize) {
    let mut substitutions = 0;
    let corrected = segment
        .chars()
        .map(|c| match replacement_for(c, class) {
            Some(r) => {
                substitutions += 1;
                r
            }
            None => c,
        })
        .collect();

    (corrected, substitutions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_only_produce_digits() {
        assert_eq!(replacement_for('O', ConfusionClass::TaxIdDigit), Some('0'));
        assert_eq!(replacement_for('0', ConfusionClass::TaxIdDigit), None);
        assert_eq!(replacement_for('W', ConfusionClass::TaxIdDigit), None);
        assert!(CONFUSIONS.iter().all(|r| r.replacement.is_ascii_digit()));
    }

    #[test]
    fn test_no_rule_maps_a_char_twice_within_a_class() {
        for (i, a) in CONFUSIONS.iter().enumerate() {
            for b in &CONFUSIONS[i + 1..] {
                assert!(
                    !(a.class == b.class && a.confused == b.confused),
                    "duplicate rule for {:?}",
                    a.confused
                );
            }
        }
    }

    #[test]
    fn test_correct_segment_counts_substitutions() {
        let (fixed, n) = correct_segment("O14l19184", ConfusionClass::TaxIdDigit);
        assert_eq!(fixed, "014119184");
        assert_eq!(n, 2);

        let (fixed, n) = correct_segment("014019184", ConfusionClass::TaxIdDigit);
        assert_eq!(fixed, "014019184");
        assert_eq!(n, 0);
    }
}
