//! Rule-based extraction engine tying the pipeline stages together.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{EtimsError, ExtractionError, Result};
use crate::models::config::{EngineConfig, ExtractionConfig};
use crate::models::fields::{Candidate, FieldError, FieldErrorReason, FieldId, ScoredCandidate};
use crate::models::result::ExtractionResult;

use super::InvoiceExtractor;
use super::candidates::extract_candidates;
use super::normalizer::Normalizer;
use super::rules::library::field_spec;
use super::scorer::ConfidenceScorer;
use super::selector::select;

/// Pattern-based invoice field extractor.
///
/// Holds only read-only configuration, so one instance can serve any number
/// of concurrent calls.
#[derive(Debug, Clone)]
pub struct ExtractionEngine {
    config: ExtractionConfig,
    normalizer: Normalizer,
    scorer: ConfidenceScorer,
}

impl ExtractionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            normalizer: Normalizer::from_config(&config.extraction),
            scorer: ConfidenceScorer::new(config.scoring),
            config: config.extraction,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Fail fast on text that cannot hold an invoice.
    fn check_input(&self, raw_text: &str) -> Result<()> {
        let len = raw_text.trim().chars().count();
        if len == 0 {
            return Err(EtimsError::InvalidInput("raw text is empty".to_string()));
        }
        if len < self.config.min_text_length {
            return Err(EtimsError::InvalidInput(format!(
                "raw text has {} characters, at least {} required",
                len, self.config.min_text_length
            )));
        }
        Ok(())
    }

    /// Normalize, score and select among one field's candidates.
    ///
    /// Returns the selection and the field errors to report.
    fn resolve_field(
        &self,
        field: FieldId,
        candidates: Vec<Candidate>,
    ) -> (Option<ScoredCandidate>, Vec<FieldError>) {
        let found = candidates.len();
        let mut dropped: Vec<ExtractionError> = Vec::new();

        let scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .filter_map(|candidate| match self.normalizer.normalize(candidate) {
                Ok(candidate) => Some(self.scorer.score_candidate(candidate)),
                Err(e) => {
                    debug!("Dropped candidate: {}", e);
                    dropped.push(e);
                    None
                }
            })
            .collect();

        let selected = select(scored);
        let mut errors = Vec::new();

        match &selected {
            Some(best) => {
                debug!(
                    "{}: selected {:?} ({:?}) with confidence {:.2}",
                    field,
                    best.canonical_value().unwrap_or_default(),
                    best.candidate.tag,
                    best.confidence
                );
            }
            None => {
                if found == 0 {
                    debug!("{}", ExtractionError::PatternNotFound(field));
                }
                if let ([only], 1) = (dropped.as_slice(), found) {
                    errors.push(FieldError::from(only));
                }

                if field_spec(field).required {
                    errors.push(FieldError::missing(field));
                } else {
                    warn!("Could not extract {}", field);
                }
            }
        }

        (selected, errors)
    }
}

impl Default for ExtractionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl InvoiceExtractor for ExtractionEngine {
    fn extract(&self, raw_text: &str) -> Result<ExtractionResult> {
        let start = Instant::now();
        self.check_input(raw_text)?;

        info!("Extracting invoice fields from {} characters of text", raw_text.len());

        let mut fields = BTreeMap::new();
        let mut extraction_errors = Vec::new();

        for (field, candidates) in extract_candidates(raw_text) {
            let (selected, errors) = self.resolve_field(field, candidates);
            fields.insert(field, selected);
            extraction_errors.extend(errors);
        }

        let extraction_success = !extraction_errors
            .iter()
            .any(|e| e.reason == FieldErrorReason::MissingRequiredField);

        let result = ExtractionResult {
            fields,
            extraction_success,
            extraction_errors,
            raw_text: self
                .config
                .include_raw_text
                .then(|| raw_text.to_string()),
        };

        info!(
            "Extracted {}/{} fields in {} ms (success: {})",
            result.fields.values().filter(|f| f.is_some()).count(),
            FieldId::ALL.len(),
            start.elapsed().as_millis(),
            result.extraction_success
        );

        let review = result.low_confidence_fields(self.config.review_threshold);
        if !review.is_empty() {
            debug!("Fields below review threshold: {:?}", review);
        }

        Ok(result)
    }
}
