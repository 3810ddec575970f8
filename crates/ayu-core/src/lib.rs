//! Ayu Core Library
//!
//! This crate provides the domain models, validation rules, error types and
//! configuration shared by the intake form engine, the HTTP client and the CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod transport;
pub mod validation;

// Re-export commonly used types
pub use config::IntakeConfig;
pub use error::{ErrorMetadata, IntakeError, LogLevel, TransportFailure};
pub use models::{
    EntryId, FieldKind, FieldSpec, FieldValue, FileCategory, FileEntry, FormSchema, FormValues,
    PartValue, PayloadPart, RawFile, SubmissionReceipt, SubmissionRequest, SubmissionState,
};
pub use transport::IntakeTransport;
pub use validation::{FileRules, Rejection};
