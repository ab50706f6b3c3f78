//! Regex patterns for eTIMS / KRA invoice extraction.
//!
//! Every pattern exposes the field value through the named group `value`.
//! A match in which the named group `skip` participates is discarded by the
//! candidate extractor.

use lazy_static::lazy_static;
use regex::Regex;

/// KRA PIN shape, widened to the glyphs OCR commonly confuses:
/// letter + 9 digits + letter.
const PIN: &str = r"[A-Za-z0158][0-9OoQIil|SB]{9}[A-Za-z0158]";

/// Buyer PINs also appear with the leading letter doubled by OCR.
const BUYER_PIN_SHAPE: &str = r"[A-Za-z0158][A-Za-z]?[0-9OoQIil|SB]{9}[A-Za-z0158]";

/// "PIN", "PIN No", "PIN:" label.
const PIN_LABEL: &str = r"\b(?i:PIN)[ \t]*(?i:No\.?)?[ \t]*:?[ \t]*";

/// Numeric and textual date shapes accepted by the date normalizer.
const DATE: &str = r"\d{4}[-/.]\d{1,2}[-/.]\d{1,2}|\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}|\d{1,2}[ \t]+[A-Za-z]{3,9}\.?,?[ \t]+\d{4}";

/// Amount with optional thousands grouping and up to two decimals.
const AMOUNT: &str = r"\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?|\d+(?:\.\d{1,2})?";

/// Party name on a single line.
const NAME: &str = r"[A-Za-z][A-Za-z0-9&.,'()\- ]{1,79}";

fn build(pattern: &str) -> Regex {
    // Patterns are compile-time constants covered by tests.
    Regex::new(pattern).expect("invalid built-in pattern")
}

/// Amount after a label, with optional colon and currency.
fn labeled_amount(label: &str) -> Regex {
    build(&format!(
        r"(?i){label}[ \t]*:?[ \t]*(?:KES|KSH|Kshs?\.?)?[ \t]*(?P<value>{AMOUNT})"
    ))
}

lazy_static! {
    // Invoice number patterns
    pub static ref INVOICE_NUMBER_LABELED: Regex = build(
        r"(?i)\b(?:cu[ \t]+)?(?:invoice|inv)\.?[ \t]*(?:no\b\.?|number\b|num\b|#)[ \t]*:?[ \t]*(?P<value>[A-Z0-9/\-]*\d[A-Z0-9/\-]*)"
    );

    pub static ref CU_INVOICE_NUMBER: Regex = build(
        r"(?i)\b(?P<value>KRAS[RN][NO0]*\d+(?:/\d+)?)\b"
    );

    pub static ref SCU_ID: Regex = build(
        r"(?i)\bSCU[ \t]+ID[ \t]*:?[ \t]*(?P<value>[A-Z0-9]{5,})"
    );

    pub static ref RECEIPT_SIGNATURE: Regex = build(
        r"(?i)\bReceipt[ \t]+Signature[ \t]*:?[ \t]*(?P<value>[A-Z0-9]{10,})"
    );

    // Amount patterns (KES format: 1,234.56)
    pub static ref TOTAL_AMOUNT: Regex = labeled_amount(r"\btotal[ \t]+amount\b");

    pub static ref GRAND_TOTAL: Regex = labeled_amount(r"\bgrand[ \t]*total\b");

    pub static ref AMOUNT_DUE: Regex = labeled_amount(r"\bamount[ \t]*(?:due|payable)\b");

    // "Sub Total" lines are matched only to be skipped.
    pub static ref BARE_TOTAL: Regex = labeled_amount(r"(?:\b(?P<skip>sub)[ \t\-]*)?\btotal\b");

    pub static ref CURRENCY_AMOUNT: Regex = build(
        r"(?i)\b(?:KES|KSH|Kshs?)\.?[ \t]*(?P<value>\d{1,3}(?:,\d{3})+(?:\.\d{2})?|\d+\.\d{2})\b"
    );

    pub static ref GROUPED_AMOUNT: Regex = build(
        r"\b(?P<value>\d{1,3}(?:,\d{3})+\.\d{2})\b"
    );

    pub static ref PLAIN_AMOUNT: Regex = build(
        r"\b(?P<value>\d+\.\d{2})\b"
    );

    // Invoice date patterns
    pub static ref DATE_CREATED: Regex = build(&format!(
        r"(?i)\bDate[ \t]+Created[ \t]*:?[ \t]*(?P<value>{DATE})"
    ));

    pub static ref INVOICE_DATE: Regex = build(&format!(
        r"(?i)\b(?:Invoice[ \t]*Date|Date[ \t]+of[ \t]+(?:Issue|Invoice)|Issue[ \t]+Date)[ \t]*:?[ \t]*(?P<value>{DATE})"
    ));

    pub static ref GENERIC_DATE: Regex = build(&format!(
        r"(?i)(?:\b(?P<skip>due|expiry|payment)[ \t]+)?\bDate\b[ \t]*:?[ \t]*(?P<value>{DATE})"
    ));

    pub static ref BARE_ISO_DATE: Regex = build(
        r"(?i)(?:\b(?P<skip>due|expiry|payment)\b[^\n]{0,20}?)?\b(?P<value>\d{4}-\d{2}-\d{2})\b"
    );

    // Due date patterns
    pub static ref DUE_DATE: Regex = build(&format!(
        r"(?i)\bDue[ \t]*Date[ \t]*:?[ \t]*(?P<value>{DATE})"
    ));

    pub static ref PAYMENT_DUE: Regex = build(&format!(
        r"(?i)\bPayment[ \t]+Due(?:[ \t]+Date)?[ \t]*:?[ \t]*(?P<value>{DATE})"
    ));

    pub static ref PAY_BY: Regex = build(&format!(
        r"(?i)\b(?:Pay(?:able)?|Due)[ \t]+(?:by|on)[ \t]*:?[ \t]*(?P<value>{DATE})"
    ));

    // KRA PIN patterns
    pub static ref SELLER_PIN: Regex = build(&format!(
        r"\b(?i:Sale[ \t]+From|Seller|Supplier)\b(?s:.{{0,200}}?){PIN_LABEL}(?P<value>{PIN})\b"
    ));

    pub static ref FIRST_PIN: Regex = build(&format!(
        r"\A(?s:.*?){PIN_LABEL}(?P<value>{PIN})\b"
    ));

    pub static ref BUYER_PIN: Regex = build(&format!(
        r"\b(?i:Buyer|Customer|Sale[ \t]+To|Bill[ \t]+To|Sold[ \t]+To)\b(?s:.{{0,200}}?){PIN_LABEL}(?P<value>{BUYER_PIN_SHAPE})\b"
    ));

    pub static ref PIN_AFTER_EMAIL: Regex = build(&format!(
        r"@[\w\-]+(?:\.[\w\-]+)+\s+{PIN_LABEL}(?P<value>{BUYER_PIN_SHAPE})\b"
    ));

    pub static ref SECOND_PIN: Regex = build(&format!(
        r"\A(?s:.*?){PIN_LABEL}{PIN}\b(?s:.*?){PIN_LABEL}(?P<value>{BUYER_PIN_SHAPE})\b"
    ));

    // Party names
    pub static ref SELLER_NAME: Regex = build(&format!(
        r"\b(?i:Sale[ \t]+From|Seller|Supplier)(?i:[ \t]+Name)?[ \t]*:[ \t]*(?P<value>{NAME})"
    ));

    pub static ref NAME_AFTER_CU_NUMBER: Regex = build(
        r"(?i:CU[ \t]+Invoice[ \t]+Number)[ \t]*:?[ \t]*\r?\n[ \t]*(?P<value>[A-Z]+(?:[ \t]+[A-Z]+){1,3})\b"
    );

    pub static ref BUYER_NAME: Regex = build(&format!(
        r"\b(?i:Buyer|Customer|Bill[ \t]+To|Sold[ \t]+To|Sale[ \t]+To)(?i:[ \t]+Name)?[ \t]*:[ \t]*(?P<value>{NAME})"
    ));

    pub static ref COMPANY_NAME: Regex = build(
        r"\b(?P<value>[A-Z][A-Z&.\-]*(?:[ \t]+[A-Z&.\-]+)*?[ \t]+(?:LIMITED|LTD|SOLUTIONS))\b"
    );
}
