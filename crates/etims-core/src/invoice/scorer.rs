//! Confidence scoring of normalized candidates.

use crate::models::config::ScoringWeights;
use crate::models::fields::{Candidate, FieldClass, ScoredCandidate};

use super::rules::library::patterns_for;

/// Deterministic candidate scorer.
///
/// The score depends only on the candidate and the weights: the field's
/// class ceiling, minus a step per descriptor rank, minus the correction
/// penalty, minus the token penalty when the value has an unexpected number
/// of tokens. Identifiers whose validity predicate fails never score above
/// the validity floor.
#[derive(Debug, Clone, Default)]
pub struct ConfidenceScorer {
    weights: ScoringWeights,
}

impl ConfidenceScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Confidence of a candidate, in `[0, 1]`.
    pub fn score(&self, candidate: &Candidate) -> f32 {
        let w = &self.weights;
        let class = candidate.field.class();
        let descriptor = patterns_for(candidate.field).get(candidate.rank);

        let mut score = w.ceiling(class)
            - candidate.rank as f32 * w.rank_step
            - w.correction_penalty(candidate.substitutions);

        let tokens_expected = descriptor
            .is_none_or(|d| d.expected_tokens.contains(&candidate.token_count()));
        if !tokens_expected {
            score -= w.token_penalty;
        }

        if is_identifier(class) {
            let valid = match (descriptor, &candidate.normalized_value) {
                (Some(d), Some(value)) => d.accepts(&value.canonical()),
                _ => false,
            };
            if !valid {
                score = score.min(w.validity_floor);
            }
        }

        score.clamp(0.0, 1.0)
    }

    /// Score a candidate, attaching the result.
    pub fn score_candidate(&self, candidate: Candidate) -> ScoredCandidate {
        let confidence = self.score(&candidate);
        ScoredCandidate::new(candidate, confidence)
    }
}

fn is_identifier(class: FieldClass) -> bool {
    matches!(class, FieldClass::InvoiceNumber | FieldClass::TaxId)
}
