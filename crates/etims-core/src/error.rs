//! Error types for the etims-core library.

use thiserror::Error;

use crate::models::fields::{FieldErrorReason, FieldId};

/// Main error type for the etims library.
#[derive(Error, Debug)]
pub enum EtimsError {
    /// The raw text handed to the engine cannot be processed at all.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Invoice field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Field-local extraction failures.
///
/// None of these abort an extraction call. They are collected per field and
/// surface to callers as [`FieldErrorReason`] entries in the result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// No pattern matched anywhere in the text.
    #[error("no candidate found for {0}")]
    PatternNotFound(FieldId),

    /// A matched candidate could not be converted to its typed form.
    #[error("failed to normalize {field} from {value:?}: {reason}")]
    Normalization {
        field: FieldId,
        value: String,
        reason: String,
    },

    /// Identifier format is invalid even after OCR correction.
    #[error("{field} rejected {value:?} after correction")]
    ChecksumRejected { field: FieldId, value: String },

    /// Required field is missing after extraction or reconciliation.
    #[error("missing required field: {0}")]
    MissingRequiredField(FieldId),
}

impl ExtractionError {
    /// The field this failure belongs to.
    pub fn field(&self) -> FieldId {
        match self {
            Self::PatternNotFound(field) | Self::MissingRequiredField(field) => *field,
            Self::Normalization { field, .. } | Self::ChecksumRejected { field, .. } => *field,
        }
    }

    /// Wire reason code for this failure.
    pub fn reason(&self) -> FieldErrorReason {
        match self {
            Self::PatternNotFound(_) => FieldErrorReason::PatternNotFound,
            Self::Normalization { .. } => FieldErrorReason::NormalizationFailed,
            Self::ChecksumRejected { .. } => FieldErrorReason::ChecksumRejected,
            Self::MissingRequiredField(_) => FieldErrorReason::MissingRequiredField,
        }
    }
}

/// Result type for the etims library.
pub type Result<T> = std::result::Result<T, EtimsError>;
