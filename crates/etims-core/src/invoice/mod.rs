//! Invoice field extraction module.

pub mod candidates;
mod engine;
pub mod normalizer;
pub mod reconcile;
pub mod rules;
pub mod scorer;
pub mod selector;

pub use candidates::extract_candidates;
pub use engine::ExtractionEngine;
pub use normalizer::Normalizer;
pub use reconcile::reconcile;
pub use scorer::ConfidenceScorer;
pub use selector::select;

use crate::error::Result;
use crate::models::result::{ExtractionResult, ReconciledInvoiceFields, UserValues};

/// Trait for invoice field extractors.
pub trait InvoiceExtractor {
    /// Extract every field from recognized text.
    fn extract(&self, raw_text: &str) -> Result<ExtractionResult>;

    /// Extract, then reconcile with caller-supplied values.
    fn extract_and_reconcile(
        &self,
        raw_text: &str,
        user_values: &UserValues,
    ) -> Result<ReconciledInvoiceFields> {
        let result = self.extract(raw_text)?;
        Ok(reconcile(&result, user_values))
    }
}
