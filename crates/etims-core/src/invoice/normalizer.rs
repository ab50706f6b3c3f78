//! Candidate normalization and OCR-confusion correction.

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::fields::{Candidate, FieldClass, FieldValue};

use super::rules::amounts::parse_amount;
use super::rules::dates::DateTemplates;
use super::rules::invoice_number::clean_invoice_number;
use super::rules::kra_pin::{correct_pin, uncorrected_pin, validate_pin};
use super::rules::names::clean_name;

/// Maps raw candidates to canonical typed values.
#[derive(Debug, Clone)]
pub struct Normalizer {
    dates: DateTemplates,
    auto_correct: bool,
}

impl Normalizer {
    pub fn new(dates: DateTemplates, auto_correct: bool) -> Self {
        Self { dates, auto_correct }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(
            DateTemplates::new().with_extra(&config.extra_date_formats),
            config.auto_correct,
        )
    }

    /// Normalize one candidate.
    ///
    /// On success the returned candidate carries `normalized_value` and, for
    /// tax identifiers, the correction record. On failure the candidate is
    /// consumed and the error describes why it was dropped.
    pub fn normalize(&self, mut candidate: Candidate) -> Result<Candidate, ExtractionError> {
        let field = candidate.field;
        let raw = candidate.raw_text.as_str();

        let value = match field.class() {
            FieldClass::Amount => parse_amount(raw)
                .map(FieldValue::Amount)
                .ok_or_else(|| normalization_error(&candidate, "no parsable amount"))?,

            FieldClass::Date => self
                .dates
                .parse(raw)
                .map(FieldValue::Date)
                .ok_or_else(|| normalization_error(&candidate, "no date template matched"))?,

            FieldClass::InvoiceNumber => clean_invoice_number(raw)
                .map(FieldValue::Text)
                .ok_or_else(|| normalization_error(&candidate, "empty invoice number"))?,

            FieldClass::Name => clean_name(raw)
                .map(FieldValue::Text)
                .ok_or_else(|| normalization_error(&candidate, "nothing left after cleanup"))?,

            FieldClass::TaxId => {
                let correction = if self.auto_correct {
                    correct_pin(raw)
                } else {
                    uncorrected_pin(raw)
                };

                if !validate_pin(&correction.pin) {
                    return Err(ExtractionError::ChecksumRejected {
                        field,
                        value: candidate.raw_text,
                    });
                }

                candidate.correction_applied = correction.corrected();
                candidate.substitutions = correction.substitutions;
                FieldValue::Text(correction.pin)
            }
        };

        candidate.normalized_value = Some(value);
        Ok(candidate)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

fn normalization_error(candidate: &Candidate, reason: &str) -> ExtractionError {
    ExtractionError::Normalization {
        field: candidate.field,
        value: candidate.raw_text.clone(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::library::PatternTag;
    use crate::models::fields::{FieldId, Span};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn candidate(field: FieldId, tag: PatternTag, raw: &str) -> Candidate {
        Candidate::new(field, tag, 0, raw, Span::new(0, raw.len()))
    }

    #[test]
    fn test_normalize_amount() {
        let normalizer = Normalizer::default();
        let c = normalizer
            .normalize(candidate(FieldId::Amount, PatternTag::TotalAmount, "60,000.00"))
            .unwrap();

        assert_eq!(
            c.normalized_value,
            Some(FieldValue::Amount(Decimal::from_str("60000.00").unwrap()))
        );
        assert!(!c.correction_applied);
    }

    #[test]
    fn test_normalize_date() {
        let normalizer = Normalizer::default();
        let c = normalizer
            .normalize(candidate(FieldId::DueDate, PatternTag::LabeledDueDate, "14/02/2026"))
            .unwrap();

        assert_eq!(
            c.normalized_value,
            Some(FieldValue::Date(NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()))
        );
    }

    #[test]
    fn test_unparsable_date_is_normalization_error() {
        let normalizer = Normalizer::default();
        let err = normalizer
            .normalize(candidate(FieldId::InvoiceDate, PatternTag::GenericDate, "45/45/2025"))
            .unwrap_err();

        assert!(matches!(err, ExtractionError::Normalization { .. }));
        assert_eq!(err.field(), FieldId::InvoiceDate);
    }

    #[test]
    fn test_extra_date_format() {
        let config = ExtractionConfig {
            extra_date_formats: vec!["%Y%m%d".to_string()],
            ..Default::default()
        };
        let normalizer = Normalizer::from_config(&config);
        let c = normalizer
            .normalize(candidate(FieldId::InvoiceDate, PatternTag::BareIsoDate, "20251217"))
            .unwrap();

        assert_eq!(c.normalized_value.unwrap().canonical(), "2025-12-17");
    }

    #[test]
    fn test_tax_id_exact() {
        let normalizer = Normalizer::default();
        let c = normalizer
            .normalize(candidate(FieldId::SupplierTaxId, PatternTag::FirstPin, "A014019184W"))
            .unwrap();

        assert_eq!(c.normalized_value, Some(FieldValue::Text("A014019184W".into())));
        assert!(!c.correction_applied);
        assert_eq!(c.substitutions, 0);
    }

    #[test]
    fn test_tax_id_corrected() {
        let normalizer = Normalizer::default();
        let c = normalizer
            .normalize(candidate(FieldId::BuyerTaxId, PatternTag::SecondPin, "A0l4O19184W"))
            .unwrap();

        assert_eq!(c.normalized_value, Some(FieldValue::Text("A014019184W".into())));
        assert!(c.correction_applied);
        assert_eq!(c.substitutions, 2);
    }

    #[test]
    fn test_tax_id_rejected_without_correction() {
        let config = ExtractionConfig {
            auto_correct: false,
            ..Default::default()
        };
        let normalizer = Normalizer::from_config(&config);
        let err = normalizer
            .normalize(candidate(FieldId::SupplierTaxId, PatternTag::FirstPin, "AO14019184W"))
            .unwrap_err();

        assert_eq!(
            err,
            ExtractionError::ChecksumRejected {
                field: FieldId::SupplierTaxId,
                value: "AO14019184W".to_string(),
            }
        );
    }

    #[test]
    fn test_tax_id_rejected_after_correction() {
        let normalizer = Normalizer::default();
        let err = normalizer
            .normalize(candidate(FieldId::SupplierTaxId, PatternTag::FirstPin, "AX14019184W"))
            .unwrap_err();

        assert!(matches!(err, ExtractionError::ChecksumRejected { .. }));
    }

    #[test]
    fn test_names_and_numbers() {
        let normalizer = Normalizer::default();

        let c = normalizer
            .normalize(candidate(FieldId::SellerName, PatternTag::LabeledSeller, " ACME LTD ;"))
            .unwrap();
        assert_eq!(c.normalized_value, Some(FieldValue::Text("ACME LTD".into())));

        let c = normalizer
            .normalize(candidate(
                FieldId::InvoiceNumber,
                PatternTag::LabeledInvoiceNumber,
                "krasrn000314580.",
            ))
            .unwrap();
        assert_eq!(c.normalized_value, Some(FieldValue::Text("KRASRN000314580".into())));
    }
}
