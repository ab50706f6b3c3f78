use etims_core::{
    ExtractionEngine, ExtractionResult, FieldId, InvoiceExtractor, UserValues, reconcile,
};
use pretty_assertions::assert_eq;

const INVOICE: &str = "\
CU Invoice Number:
JOHN KAMAU DOE
KRASRN0100/12
PIN: P051234567Q
john@example.co.ke
PIN: A0l4019184W
Date Created: 2025-12-17 21:50:06
Total: 5,800.00
";

fn extracted() -> ExtractionResult {
    ExtractionEngine::default().extract(INVOICE).unwrap()
}

#[test]
fn test_empty_user_values_keep_every_selection() {
    let result = extracted();
    let reconciled = reconcile(&result, &UserValues::new());

    for field in FieldId::ALL {
        assert_eq!(
            reconciled.get(field).map(str::to_string),
            result.value(field).map(|v| v.canonical()),
            "{}",
            field
        );
    }
    assert_eq!(reconciled.extraction_success, result.extraction_success);
}

#[test]
fn test_sample_invoice_fields() {
    let reconciled = reconcile(&extracted(), &UserValues::new());

    assert_eq!(reconciled.get(FieldId::InvoiceNumber), Some("KRASRN0100/12"));
    assert_eq!(reconciled.get(FieldId::SellerName), Some("JOHN KAMAU DOE"));
    assert_eq!(reconciled.get(FieldId::SupplierTaxId), Some("P051234567Q"));
    assert_eq!(reconciled.get(FieldId::BuyerTaxId), Some("A014019184W"));
    assert_eq!(reconciled.get(FieldId::InvoiceDate), Some("2025-12-17"));
    assert_eq!(reconciled.get(FieldId::Amount), Some("5800.00"));
}

#[test]
fn test_user_values_always_win() {
    let result = extracted();
    let user: UserValues = [
        (FieldId::InvoiceNumber, "manual-7"),
        (FieldId::Amount, "not a number"),
        (FieldId::BuyerName, "Jane Wanjiru"),
    ]
    .into_iter()
    .map(|(f, v)| (f, v.to_string()))
    .collect();

    let reconciled = reconcile(&result, &user);

    for (field, value) in &user {
        assert_eq!(reconciled.get(*field), Some(value.as_str()));
    }
}

#[test]
fn test_reconcile_is_idempotent() {
    let result = extracted();
    let user: UserValues = [(FieldId::DueDate, "2026-02-14".to_string())].into_iter().collect();

    let once = reconcile(&result, &user);
    let again = reconcile(&ExtractionResult::empty(), &once.as_user_values());
    assert_eq!(again, once);

    let failed = reconcile(&ExtractionResult::empty(), &UserValues::new());
    assert!(!failed.extraction_success);
    assert_eq!(
        reconcile(&ExtractionResult::empty(), &failed.as_user_values()),
        failed
    );
}
