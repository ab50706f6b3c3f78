//! Core library for eTIMS invoice field extraction.
//!
//! This crate provides:
//! - A static library of ranked field patterns for Kenyan eTIMS/KRA invoices
//! - Candidate extraction, normalization and OCR-confusion correction
//! - Deterministic confidence scoring and best-candidate selection
//! - Reconciliation of extracted values with user-supplied overrides
//!
//! Text recognition itself is out of scope: callers pass already-recognized
//! text.

pub mod error;
pub mod invoice;
pub mod models;

pub use error::{EtimsError, ExtractionError, Result};
pub use invoice::{ExtractionEngine, InvoiceExtractor, reconcile};
pub use models::config::{EngineConfig, ExtractionConfig, ScoringWeights};
pub use models::fields::{FieldError, FieldErrorReason, FieldId, FieldValue, ScoredCandidate};
pub use models::result::{
    ExtractionRecord, ExtractionResult, PartyDetails, ReconciledInvoiceFields, UserValues,
};
