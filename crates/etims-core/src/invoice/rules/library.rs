//! Field pattern library: the ranked pattern list of every field.
//!
//! The table is built once per process and never mutated, so it can be
//! shared by concurrent extraction calls without synchronization.

use std::ops::RangeInclusive;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::models::fields::{FieldClass, FieldId};

use super::invoice_number::validate_invoice_number;
use super::kra_pin::validate_pin;
use super::patterns::*;

/// Identity of a pattern variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternTag {
    LabeledInvoiceNumber,
    CuInvoiceNumber,
    ScuId,
    ReceiptSignature,
    TotalAmount,
    GrandTotal,
    AmountDue,
    Total,
    CurrencyAmount,
    GroupedAmount,
    PlainAmount,
    DateCreated,
    LabeledInvoiceDate,
    GenericDate,
    BareIsoDate,
    LabeledDueDate,
    PaymentDue,
    PayBy,
    SellerPin,
    FirstPin,
    BuyerPin,
    PinAfterEmail,
    SecondPin,
    LabeledSeller,
    NameAfterCuNumber,
    LabeledBuyer,
    CompanySuffix,
}

/// One way of finding a field in text.
pub struct PatternDescriptor {
    pub tag: PatternTag,
    /// Pattern exposing the value through the `value` group.
    pub regex: &'static Regex,
    /// Whitespace-separated token count a well-formed value has.
    pub expected_tokens: RangeInclusive<usize>,
    /// Format predicate applied to the normalized value.
    pub validity: Option<fn(&str) -> bool>,
}

impl PatternDescriptor {
    fn new(tag: PatternTag, regex: &'static Regex, expected_tokens: RangeInclusive<usize>) -> Self {
        Self {
            tag,
            regex,
            expected_tokens,
            validity: None,
        }
    }

    fn validated_by(mut self, validity: fn(&str) -> bool) -> Self {
        self.validity = Some(validity);
        self
    }

    /// Whether a value passes this descriptor's predicate (true if none).
    pub fn accepts(&self, value: &str) -> bool {
        self.validity.is_none_or(|check| check(value))
    }
}

impl std::fmt::Debug for PatternDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternDescriptor")
            .field("tag", &self.tag)
            .field("regex", &self.regex.as_str())
            .field("expected_tokens", &self.expected_tokens)
            .field("validated", &self.validity.is_some())
            .finish()
    }
}

/// Static description of one extractable field.
#[derive(Debug)]
pub struct FieldSpec {
    pub field: FieldId,
    pub class: FieldClass,
    /// Most specific first.
    pub patterns: Vec<PatternDescriptor>,
    pub required: bool,
}

impl FieldSpec {
    fn new(field: FieldId, required: bool, patterns: Vec<PatternDescriptor>) -> Self {
        Self {
            field,
            class: field.class(),
            patterns,
            required,
        }
    }
}

lazy_static! {
    static ref FIELD_SPECS: Vec<FieldSpec> = {
        use PatternTag::*;
        let d = PatternDescriptor::new;

        vec![
            FieldSpec::new(FieldId::InvoiceNumber, true, vec![
                d(LabeledInvoiceNumber, &INVOICE_NUMBER_LABELED, 1..=1).validated_by(validate_invoice_number),
                d(CuInvoiceNumber, &CU_INVOICE_NUMBER, 1..=1).validated_by(validate_invoice_number),
                d(ScuId, &SCU_ID, 1..=1).validated_by(validate_invoice_number),
                d(ReceiptSignature, &RECEIPT_SIGNATURE, 1..=1).validated_by(validate_invoice_number),
            ]),
            FieldSpec::new(FieldId::Amount, true, vec![
                d(TotalAmount, &TOTAL_AMOUNT, 1..=1),
                d(GrandTotal, &GRAND_TOTAL, 1..=1),
                d(AmountDue, &AMOUNT_DUE, 1..=1),
                d(Total, &BARE_TOTAL, 1..=1),
                d(CurrencyAmount, &CURRENCY_AMOUNT, 1..=1),
                d(GroupedAmount, &GROUPED_AMOUNT, 1..=1),
                d(PlainAmount, &PLAIN_AMOUNT, 1..=1),
            ]),
            FieldSpec::new(FieldId::InvoiceDate, false, vec![
                d(DateCreated, &DATE_CREATED, 1..=3),
                d(LabeledInvoiceDate, &INVOICE_DATE, 1..=3),
                d(GenericDate, &GENERIC_DATE, 1..=3),
                d(BareIsoDate, &BARE_ISO_DATE, 1..=1),
            ]),
            FieldSpec::new(FieldId::DueDate, false, vec![
                d(LabeledDueDate, &DUE_DATE, 1..=3),
                d(PaymentDue, &PAYMENT_DUE, 1..=3),
                d(PayBy, &PAY_BY, 1..=3),
            ]),
            FieldSpec::new(FieldId::SupplierTaxId, false, vec![
                d(SellerPin, &SELLER_PIN, 1..=1).validated_by(validate_pin),
                d(FirstPin, &FIRST_PIN, 1..=1).validated_by(validate_pin),
            ]),
            FieldSpec::new(FieldId::BuyerTaxId, false, vec![
                d(BuyerPin, &BUYER_PIN, 1..=1).validated_by(validate_pin),
                d(PinAfterEmail, &PIN_AFTER_EMAIL, 1..=1).validated_by(validate_pin),
                d(SecondPin, &SECOND_PIN, 1..=1).validated_by(validate_pin),
            ]),
            FieldSpec::new(FieldId::SellerName, false, vec![
                d(LabeledSeller, &SELLER_NAME, 1..=8),
                d(NameAfterCuNumber, &NAME_AFTER_CU_NUMBER, 2..=4),
            ]),
            FieldSpec::new(FieldId::BuyerName, false, vec![
                d(LabeledBuyer, &BUYER_NAME, 1..=8),
                d(CompanySuffix, &COMPANY_NAME, 2..=8),
            ]),
        ]
    };
}

/// The full field table, in canonical field order.
pub fn field_specs() -> &'static [FieldSpec] {
    &FIELD_SPECS
}

/// Spec of one field.
pub fn field_spec(field: FieldId) -> &'static FieldSpec {
    // FIELD_SPECS is declared in FieldId::ALL order.
    &FIELD_SPECS[field as usize]
}

/// Ranked descriptors of a field, most specific first.
pub fn patterns_for(field: FieldId) -> &'static [PatternDescriptor] {
    &field_spec(field).patterns
}

/// Fields whose absence fails an extraction.
pub fn required_fields() -> impl Iterator<Item = FieldId> {
    field_specs().iter().filter(|s| s.required).map(|s| s.field)
}
