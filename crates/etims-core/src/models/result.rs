//! Extraction and reconciliation results, and their wire form.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fields::{FieldError, FieldErrorReason, FieldId, FieldValue, ScoredCandidate};

/// Caller-supplied field values, keyed by field. May be partial or empty.
pub type UserValues = BTreeMap<FieldId, String>;

/// Outcome of one extraction call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    /// Selected candidate per field; every field is a key.
    pub fields: BTreeMap<FieldId, Option<ScoredCandidate>>,
    /// False if a required field is missing.
    pub extraction_success: bool,
    /// Field errors in field order, then detection order.
    pub extraction_errors: Vec<FieldError>,
    /// Source text, kept for diagnostics when enabled.
    pub raw_text: Option<String>,
}

impl ExtractionResult {
    /// A result in which nothing was extracted and nothing failed.
    pub fn empty() -> Self {
        Self {
            fields: FieldId::ALL.into_iter().map(|f| (f, None)).collect(),
            extraction_success: true,
            extraction_errors: Vec::new(),
            raw_text: None,
        }
    }

    pub fn get(&self, field: FieldId) -> Option<&ScoredCandidate> {
        self.fields.get(&field).and_then(Option::as_ref)
    }

    pub fn value(&self, field: FieldId) -> Option<&FieldValue> {
        self.get(field).and_then(ScoredCandidate::value)
    }

    /// Confidence of the selected candidate, 0.0 when nothing was selected.
    pub fn confidence(&self, field: FieldId) -> f32 {
        self.get(field).map_or(0.0, |c| c.confidence)
    }

    /// Confidence of every field, keyed by wire name.
    pub fn confidence_scores(&self) -> BTreeMap<String, f32> {
        FieldId::ALL
            .into_iter()
            .map(|f| (f.wire_name().to_string(), self.confidence(f)))
            .collect()
    }

    /// Selected fields whose confidence is below `threshold`.
    pub fn low_confidence_fields(&self, threshold: f32) -> Vec<FieldId> {
        FieldId::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_some_and(|c| c.confidence < threshold))
            .collect()
    }

    /// Serializable record consumed by the API layer.
    pub fn to_record(&self) -> ExtractionRecord {
        let text = |field: FieldId| match self.value(field) {
            Some(FieldValue::Text(s)) => Some(s.clone()),
            _ => None,
        };

        ExtractionRecord {
            invoice_number: text(FieldId::InvoiceNumber),
            invoice_amount: self.value(FieldId::Amount).and_then(FieldValue::as_amount),
            invoice_date: self.value(FieldId::InvoiceDate).and_then(FieldValue::as_date),
            due_date: self.value(FieldId::DueDate).and_then(FieldValue::as_date),
            supplier_kra_pin: text(FieldId::SupplierTaxId),
            buyer_kra_pin: text(FieldId::BuyerTaxId),
            buyer_details: PartyDetails {
                name: text(FieldId::BuyerName),
            },
            seller_details: PartyDetails {
                name: text(FieldId::SellerName),
            },
            confidence_scores: self.confidence_scores(),
            extraction_success: self.extraction_success,
            extraction_errors: self.extraction_errors.clone(),
            raw_text: self.raw_text.clone(),
        }
    }
}

/// Party block of the wire record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Wire form of an [`ExtractionResult`].
///
/// Key names and nesting are a compatibility contract with the API layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub invoice_number: Option<String>,
    /// Decimal string with two fractional digits.
    pub invoice_amount: Option<Decimal>,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub supplier_kra_pin: Option<String>,
    pub buyer_kra_pin: Option<String>,
    pub buyer_details: PartyDetails,
    pub seller_details: PartyDetails,
    pub confidence_scores: BTreeMap<String, f32>,
    pub extraction_success: bool,
    pub extraction_errors: Vec<FieldError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

/// Final field values after merging extraction output with user values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledInvoiceFields {
    /// Canonical value per field; absent fields have no key.
    pub values: BTreeMap<FieldId, String>,
    pub extraction_errors: Vec<FieldError>,
    pub extraction_success: bool,
}

impl ReconciledInvoiceFields {
    pub fn get(&self, field: FieldId) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Feed this output back in as user values.
    pub fn as_user_values(&self) -> UserValues {
        self.values.clone()
    }

    /// Fields reported missing.
    pub fn missing_fields(&self) -> Vec<FieldId> {
        self.extraction_errors
            .iter()
            .filter(|e| e.reason == FieldErrorReason::MissingRequiredField)
            .map(|e| e.field)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::library::PatternTag;
    use crate::models::fields::{Candidate, Span};
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn selected(field: FieldId, tag: PatternTag, value: FieldValue, confidence: f32) -> ScoredCandidate {
        let raw = value.canonical();
        let mut candidate = Candidate::new(field, tag, 0, raw.clone(), Span::new(0, raw.len()));
        candidate.normalized_value = Some(value);
        ScoredCandidate::new(candidate, confidence)
    }

    fn sample() -> ExtractionResult {
        let mut result = ExtractionResult::empty();
        result.fields.insert(
            FieldId::InvoiceNumber,
            Some(selected(
                FieldId::InvoiceNumber,
                PatternTag::LabeledInvoiceNumber,
                FieldValue::Text("KRASRN000314580".into()),
                0.95,
            )),
        );
        result.fields.insert(
            FieldId::Amount,
            Some(selected(
                FieldId::Amount,
                PatternTag::GroupedAmount,
                FieldValue::Amount(Decimal::from_str("60000.00").unwrap()),
                0.91,
            )),
        );
        result.fields.insert(
            FieldId::BuyerName,
            Some(selected(
                FieldId::BuyerName,
                PatternTag::CompanySuffix,
                FieldValue::Text("ACME LIMITED".into()),
                0.5,
            )),
        );
        result
    }

    #[test]
    fn test_empty_has_every_field() {
        let result = ExtractionResult::empty();
        assert_eq!(result.fields.len(), FieldId::ALL.len());
        assert!(result.fields.values().all(Option::is_none));
        assert!(result.confidence_scores().values().all(|c| *c == 0.0));
    }

    #[test]
    fn test_low_confidence_fields() {
        let result = sample();
        assert_eq!(result.low_confidence_fields(0.7), vec![FieldId::BuyerName]);
        assert_eq!(
            result.low_confidence_fields(0.96),
            vec![FieldId::InvoiceNumber, FieldId::Amount, FieldId::BuyerName]
        );
    }

    #[test]
    fn test_record_wire_format() {
        let json = serde_json::to_value(sample().to_record()).unwrap();

        assert_eq!(json["invoice_number"], "KRASRN000314580");
        assert_eq!(json["invoice_amount"], "60000.00");
        assert_eq!(json["invoice_date"], serde_json::Value::Null);
        assert_eq!(json["buyer_details"]["name"], "ACME LIMITED");
        assert_eq!(json["seller_details"], serde_json::json!({}));
        assert_eq!(json["extraction_success"], true);
        assert!(json.get("raw_text").is_none());

        let scores = json["confidence_scores"].as_object().unwrap();
        let keys: Vec<&str> = scores.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "buyer_details.name",
                "buyer_kra_pin",
                "due_date",
                "invoice_amount",
                "invoice_date",
                "invoice_number",
                "seller_details.name",
                "supplier_kra_pin",
            ]
        );
        assert_eq!(scores["due_date"], 0.0);
    }

    #[test]
    fn test_record_dates_are_iso() {
        let mut result = ExtractionResult::empty();
        result.fields.insert(
            FieldId::DueDate,
            Some(selected(
                FieldId::DueDate,
                PatternTag::LabeledDueDate,
                FieldValue::Date(NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()),
                0.92,
            )),
        );

        let json = serde_json::to_value(result.to_record()).unwrap();
        assert_eq!(json["due_date"], "2026-02-14");
    }

    #[test]
    fn test_reconciled_round_trip_through_json() {
        let mut values = BTreeMap::new();
        values.insert(FieldId::DueDate, "2026-02-14".to_string());
        let fields = ReconciledInvoiceFields {
            values,
            extraction_errors: vec![FieldError::missing(FieldId::Amount)],
            extraction_success: false,
        };

        let json = serde_json::to_string(&fields).unwrap();
        let back: ReconciledInvoiceFields = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fields);
        assert_eq!(back.missing_fields(), vec![FieldId::Amount]);
    }
}
