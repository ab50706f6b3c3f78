//! Configuration structures for the extraction engine.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EtimsError, Result};
use crate::invoice::rules::library::field_specs;
use crate::models::fields::FieldClass;

/// Main configuration for the etims engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Invoice extraction configuration.
    pub extraction: ExtractionConfig,

    /// Confidence scoring weights.
    pub scoring: ScoringWeights,
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum trimmed text length accepted as input.
    pub min_text_length: usize,

    /// Copy the raw text into the result for diagnostics.
    pub include_raw_text: bool,

    /// Try to correct common OCR errors in tax identifiers.
    pub auto_correct: bool,

    /// Deployment-specific date templates (chrono format strings), tried
    /// after the built-in ones.
    pub extra_date_formats: Vec<String>,

    /// Fields selected below this confidence are flagged for review.
    pub review_threshold: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_text_length: 1,
            include_raw_text: false,
            auto_correct: true,
            extra_date_formats: Vec::new(),
            review_threshold: 0.7,
        }
    }
}

/// Tunable constants of the confidence scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub invoice_number_ceiling: f32,
    pub amount_ceiling: f32,
    pub date_ceiling: f32,
    pub tax_id_ceiling: f32,
    pub name_ceiling: f32,

    /// Deducted per step down the descriptor ranking.
    pub rank_step: f32,

    /// Penalty for the first corrected character.
    pub correction_base: f32,
    /// Additional penalty for every further corrected character.
    pub correction_per_extra: f32,
    /// Upper bound of the correction penalty.
    pub correction_max: f32,

    /// Penalty when the token count is outside the descriptor's range.
    pub token_penalty: f32,

    /// Cap for identifiers failing their validity predicate.
    pub validity_floor: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            invoice_number_ceiling: 0.95,
            amount_ceiling: 0.96,
            date_ceiling: 0.92,
            tax_id_ceiling: 0.97,
            name_ceiling: 0.80,
            rank_step: 0.01,
            correction_base: 0.10,
            correction_per_extra: 0.05,
            correction_max: 0.45,
            token_penalty: 0.15,
            validity_floor: 0.40,
        }
    }
}

impl ScoringWeights {
    /// Best score a candidate of the given class can reach.
    pub fn ceiling(&self, class: FieldClass) -> f32 {
        match class {
            FieldClass::InvoiceNumber => self.invoice_number_ceiling,
            FieldClass::Amount => self.amount_ceiling,
            FieldClass::Date => self.date_ceiling,
            FieldClass::TaxId => self.tax_id_ceiling,
            FieldClass::Name => self.name_ceiling,
        }
    }

    /// Penalty for `substitutions` corrected characters.
    pub fn correction_penalty(&self, substitutions: usize) -> f32 {
        if substitutions == 0 {
            return 0.0;
        }
        let extra = (substitutions - 1) as f32;
        (self.correction_base + self.correction_per_extra * extra).min(self.correction_max)
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.extraction.review_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(EtimsError::Config(format!(
                "review_threshold must be within 0.0..=1.0, got {}",
                threshold
            )));
        }

        let s = &self.scoring;
        let unit = [
            ("invoice_number_ceiling", s.invoice_number_ceiling),
            ("amount_ceiling", s.amount_ceiling),
            ("date_ceiling", s.date_ceiling),
            ("tax_id_ceiling", s.tax_id_ceiling),
            ("name_ceiling", s.name_ceiling),
            ("validity_floor", s.validity_floor),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(EtimsError::Config(format!(
                    "{} must be within 0.0..=1.0, got {}",
                    name, value
                )));
            }
        }

        let penalties = [
            ("rank_step", s.rank_step),
            ("correction_base", s.correction_base),
            ("correction_per_extra", s.correction_per_extra),
            ("correction_max", s.correction_max),
            ("token_penalty", s.token_penalty),
        ];
        for (name, value) in penalties {
            if value.is_nan() || value < 0.0 {
                return Err(EtimsError::Config(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        // An exact identifier match must outscore any corrected one, whatever
        // descriptor each came from.
        let ranks = field_specs()
            .iter()
            .filter(|spec| spec.patterns.iter().any(|d| d.validity.is_some()))
            .map(|spec| spec.patterns.len())
            .max()
            .unwrap_or(1);
        let spread = s.rank_step * ranks.saturating_sub(1) as f32;
        if spread > s.correction_base {
            return Err(EtimsError::Config(format!(
                "rank_step x {} ({}) must not exceed correction_base ({})",
                ranks - 1,
                spread,
                s.correction_base
            )));
        }

        Ok(())
    }
}
