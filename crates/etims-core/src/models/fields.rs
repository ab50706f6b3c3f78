//! Field identifiers, values and per-candidate records.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::invoice::rules::library::PatternTag;

/// Fields the engine extracts from an invoice.
///
/// Declaration order is the canonical field order: result maps iterate in
/// this order and extraction errors are reported in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldId {
    #[serde(rename = "invoice_number")]
    InvoiceNumber,
    #[serde(rename = "invoice_amount")]
    Amount,
    #[serde(rename = "invoice_date")]
    InvoiceDate,
    #[serde(rename = "due_date")]
    DueDate,
    #[serde(rename = "supplier_kra_pin")]
    SupplierTaxId,
    #[serde(rename = "buyer_kra_pin")]
    BuyerTaxId,
    #[serde(rename = "seller_details.name")]
    SellerName,
    #[serde(rename = "buyer_details.name")]
    BuyerName,
}

impl FieldId {
    /// Every field, in canonical order.
    pub const ALL: [FieldId; 8] = [
        FieldId::InvoiceNumber,
        FieldId::Amount,
        FieldId::InvoiceDate,
        FieldId::DueDate,
        FieldId::SupplierTaxId,
        FieldId::BuyerTaxId,
        FieldId::SellerName,
        FieldId::BuyerName,
    ];

    /// Name used by the API layer for this field.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::InvoiceNumber => "invoice_number",
            Self::Amount => "invoice_amount",
            Self::InvoiceDate => "invoice_date",
            Self::DueDate => "due_date",
            Self::SupplierTaxId => "supplier_kra_pin",
            Self::BuyerTaxId => "buyer_kra_pin",
            Self::SellerName => "seller_details.name",
            Self::BuyerName => "buyer_details.name",
        }
    }

    /// Parse a wire name back into a field id.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.wire_name() == name)
    }

    /// Value class of the field.
    pub fn class(&self) -> FieldClass {
        match self {
            Self::InvoiceNumber => FieldClass::InvoiceNumber,
            Self::Amount => FieldClass::Amount,
            Self::InvoiceDate | Self::DueDate => FieldClass::Date,
            Self::SupplierTaxId | Self::BuyerTaxId => FieldClass::TaxId,
            Self::SellerName | Self::BuyerName => FieldClass::Name,
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Kind of value a field holds. Drives normalization, scoring ceilings and
/// which OCR confusion rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldClass {
    InvoiceNumber,
    Amount,
    Date,
    TaxId,
    Name,
}

/// Canonical typed value of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Amount(Decimal),
    Date(NaiveDate),
}

impl FieldValue {
    /// Canonical string form: amounts with two fractional digits, ISO dates.
    pub fn canonical(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Amount(d) => {
                let mut d = d.round_dp(2);
                d.rescale(2);
                d.to_string()
            }
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn as_amount(&self) -> Option<Decimal> {
        match self {
            Self::Amount(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Byte range of a match in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A raw text span proposed as the value of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// Field this candidate was proposed for.
    pub field: FieldId,
    /// Descriptor that produced the match.
    pub tag: PatternTag,
    /// Position of that descriptor in the field's ranked list (0 = most specific).
    pub rank: usize,
    /// Text captured by the descriptor.
    pub raw_text: String,
    /// Location of `raw_text` in the source.
    pub span: Span,
    /// Typed value, set by the normalizer.
    pub normalized_value: Option<FieldValue>,
    /// Whether OCR confusion correction changed the value.
    pub correction_applied: bool,
    /// Number of characters replaced by correction.
    pub substitutions: usize,
}

impl Candidate {
    pub fn new(
        field: FieldId,
        tag: PatternTag,
        rank: usize,
        raw_text: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            field,
            tag,
            rank,
            raw_text: raw_text.into(),
            span,
            normalized_value: None,
            correction_applied: false,
            substitutions: 0,
        }
    }

    /// Number of whitespace-separated tokens in the raw text.
    pub fn token_count(&self) -> usize {
        self.raw_text.split_whitespace().count()
    }
}

/// A normalized candidate together with its confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl ScoredCandidate {
    pub fn new(candidate: Candidate, confidence: f32) -> Self {
        Self {
            candidate,
            confidence,
        }
    }

    pub fn value(&self) -> Option<&FieldValue> {
        self.candidate.normalized_value.as_ref()
    }

    /// Canonical string of the normalized value, if any.
    pub fn canonical_value(&self) -> Option<String> {
        self.value().map(FieldValue::canonical)
    }

    pub fn span(&self) -> Span {
        self.candidate.span
    }

    pub fn correction_applied(&self) -> bool {
        self.candidate.correction_applied
    }
}

/// Reason code attached to a field-level error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorReason {
    PatternNotFound,
    NormalizationFailed,
    ChecksumRejected,
    MissingRequiredField,
}

impl FieldErrorReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PatternNotFound => "pattern_not_found",
            Self::NormalizationFailed => "normalization_failed",
            Self::ChecksumRejected => "checksum_rejected",
            Self::MissingRequiredField => "missing_required_field",
        }
    }
}

impl fmt::Display for FieldErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One itemized extraction error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: FieldId,
    pub reason: FieldErrorReason,
}

impl FieldError {
    pub fn new(field: FieldId, reason: FieldErrorReason) -> Self {
        Self { field, reason }
    }

    pub fn missing(field: FieldId) -> Self {
        Self::new(field, FieldErrorReason::MissingRequiredField)
    }
}

impl From<&crate::error::ExtractionError> for FieldError {
    fn from(err: &crate::error::ExtractionError) -> Self {
        Self::new(err.field(), err.reason())
    }
}
