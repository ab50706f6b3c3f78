//! KRA PIN (Kenya Revenue Authority tax identifier) validation and OCR correction.

use super::confusions::{ConfusionClass, correct_segment};

/// Length of a KRA PIN: letter + 9 digits + letter.
pub const PIN_LENGTH: usize = 11;

/// Validate the KRA PIN format (`A012345678Z`).
pub fn validate_pin(pin: &str) -> bool {
    let bytes = pin.as_bytes();

    bytes.len() == PIN_LENGTH
        && bytes[0].is_ascii_uppercase()
        && bytes[PIN_LENGTH - 1].is_ascii_uppercase()
        && bytes[1..PIN_LENGTH - 1].iter().all(u8::is_ascii_digit)
}

/// A PIN after confusion correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinCorrection {
    pub pin: String,
    /// Characters changed by confusion rules (case folding is not counted).
    pub substitutions: usize,
}

impl PinCorrection {
    pub fn corrected(&self) -> bool {
        self.substitutions > 0
    }
}

/// Correct common OCR confusions in a captured PIN.
///
/// Digit rules are applied positionally to the 9-character numeric segment
/// only; the leading and trailing letters are never rewritten. A leading
/// letter doubled by OCR (12 characters, two letters first) is dropped and
/// counted as a substitution. Input of any other length is only upper-cased.
pub fn correct_pin(raw: &str) -> PinCorrection {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let mut chars: Vec<char> = compact.chars().collect();
    let mut substitutions = 0;

    if chars.len() == PIN_LENGTH + 1
        && chars[0].is_ascii_alphabetic()
        && chars[1].is_ascii_alphabetic()
    {
        chars.remove(1);
        substitutions += 1;
    }

    if chars.len() != PIN_LENGTH {
        return PinCorrection {
            pin: compact.to_ascii_uppercase(),
            substitutions: 0,
        };
    }

    let digits: String = chars[1..PIN_LENGTH - 1].iter().collect();
    let (digits, corrected) = correct_segment(&digits, ConfusionClass::TaxIdDigit);

    PinCorrection {
        pin: format!("{}{}{}", chars[0], digits, chars[PIN_LENGTH - 1]).to_ascii_uppercase(),
        substitutions: substitutions + corrected,
    }
}

/// Pass-through used when correction is disabled.
pub fn uncorrected_pin(raw: &str) -> PinCorrection {
    PinCorrection {
        pin: raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase(),
        substitutions: 0,
    }
}
