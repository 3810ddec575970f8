//! Error types module
//!
//! Errors that leave a component are unified under [`IntakeError`]. Transport
//! problems are described by [`TransportFailure`], which carries the reason
//! shown to the user. Per-file rejections live in [`crate::validation`] and
//! never propagate past the collection that produced them.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like incomplete forms
    Debug,
    /// Warning level - for recoverable issues like an unreachable endpoint
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error is presented to the person filling the form.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "FORM_INCOMPLETE")
    fn error_code(&self) -> &'static str;

    /// Whether resubmitting the same form can succeed
    fn is_recoverable(&self) -> bool;

    /// Text placed in the feedback region
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Failure of the outbound submission request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportFailure {
    #[error("Endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("Submission rejected with status {status}: {reason}")]
    Rejected { status: u16, reason: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl TransportFailure {
    /// Best available reason string for the feedback message.
    pub fn reason(&self) -> &str {
        match self {
            TransportFailure::Unreachable(reason) => reason,
            TransportFailure::Rejected { reason, .. } => reason,
            TransportFailure::MalformedResponse(reason) => reason,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Form incomplete: {}", fields.join(", "))]
    FormIncomplete { fields: Vec<String> },

    #[error(transparent)]
    Transport(#[from] TransportFailure),

    #[error("Invalid form schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn intake_error_static_metadata(err: &IntakeError) -> (&'static str, bool, LogLevel) {
    match err {
        IntakeError::FormIncomplete { .. } => ("FORM_INCOMPLETE", true, LogLevel::Debug),
        IntakeError::Transport(TransportFailure::Unreachable(_)) => {
            ("ENDPOINT_UNREACHABLE", true, LogLevel::Warn)
        }
        IntakeError::Transport(TransportFailure::Rejected { .. }) => {
            ("SUBMISSION_REJECTED", true, LogLevel::Warn)
        }
        IntakeError::Transport(TransportFailure::MalformedResponse(_)) => {
            ("MALFORMED_RESPONSE", true, LogLevel::Error)
        }
        IntakeError::InvalidSchema(_) => ("INVALID_SCHEMA", false, LogLevel::Error),
        IntakeError::InvalidInput(_) => ("INVALID_INPUT", false, LogLevel::Debug),
        IntakeError::Io(_) => ("IO_ERROR", false, LogLevel::Error),
    }
}

impl ErrorMetadata for IntakeError {
    fn error_code(&self) -> &'static str {
        intake_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        intake_error_static_metadata(self).1
    }

    fn client_message(&self) -> String {
        match self {
            IntakeError::FormIncomplete { .. } => {
                crate::constants::MSG_FORM_INCOMPLETE.to_string()
            }
            IntakeError::Transport(failure) => format!(
                "Error: {}. Please try again or contact support.",
                failure.reason()
            ),
            other => other.to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        intake_error_static_metadata(self).2
    }
}
