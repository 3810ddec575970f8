//! Validation rules
//!
//! Per-file rules applied when files are added to a collection, and the
//! structural checks run over the non-file fields before submission.

pub mod files;
pub mod form;

pub use files::{FileRules, Rejection};
pub use form::{invalid_fields, validate_form};
