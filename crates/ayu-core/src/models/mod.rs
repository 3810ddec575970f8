//! Domain models for the intake form

pub mod file;
pub mod form;
pub mod submission;

pub use file::{content_type_for_extension, EntryId, FileCategory, FileEntry, RawFile};
pub use form::{normalize_phone, FieldKind, FieldSpec, FieldValue, FormSchema, FormValues};
pub use submission::{
    ErrorBody, HealthStatus, PartValue, PayloadPart, StoredSubmission, SubmissionList,
    SubmissionReceipt, SubmissionRequest, SubmissionState,
};
