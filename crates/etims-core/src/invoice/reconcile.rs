//! Merging extraction output with user-supplied values.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::fields::{FieldError, FieldErrorReason, FieldId};
use crate::models::result::{ExtractionResult, ReconciledInvoiceFields, UserValues};

use super::rules::library::field_spec;

/// Merge `result` with `user_values` into a new, independent mapping.
///
/// A non-blank user value wins verbatim regardless of extraction
/// confidence. Otherwise the selected candidate's canonical value is used.
/// A required field with neither is reported as `missing_required_field`.
/// Neither input is modified.
pub fn reconcile(result: &ExtractionResult, user_values: &UserValues) -> ReconciledInvoiceFields {
    let mut values = BTreeMap::new();
    let mut extraction_errors = Vec::new();

    for field in FieldId::ALL {
        let user = user_values
            .get(&field)
            .filter(|v| !v.trim().is_empty())
            .cloned();

        let value = match user {
            Some(v) => {
                debug!("{}: using user value", field);
                Some(v)
            }
            None => result.value(field).map(|v| v.canonical()),
        };

        match value {
            Some(v) => {
                values.insert(field, v);
            }
            None if field_spec(field).required => {
                extraction_errors.push(FieldError::missing(field));
            }
            None => {}
        }
    }

    let extraction_success = !extraction_errors
        .iter()
        .any(|e| e.reason == FieldErrorReason::MissingRequiredField);

    ReconciledInvoiceFields {
        values,
        extraction_errors,
        extraction_success,
    }
}
