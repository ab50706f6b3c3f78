//! Data models for extraction input, output and configuration.

pub mod config;
pub mod fields;
pub mod result;

pub use config::{EngineConfig, ExtractionConfig, ScoringWeights};
pub use fields::{
    Candidate, FieldClass, FieldError, FieldErrorReason, FieldId, FieldValue, ScoredCandidate,
    Span,
};
pub use result::{
    ExtractionRecord, ExtractionResult, PartyDetails, ReconciledInvoiceFields, UserValues,
};
