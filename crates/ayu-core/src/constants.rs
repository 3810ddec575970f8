//! Limits, timings and user-facing message text for the intake form.

use std::time::Duration;

/// Maximum number of files per category.
pub const DEFAULT_MAX_FILES: usize = 5;

/// Maximum size of a single file (5 MiB).
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// MIME prefix every photo must carry.
pub const PHOTO_MIME_PREFIX: &str = "image/";

/// Delay between a successful submission and the full form reset.
pub const RESET_DELAY: Duration = Duration::from_millis(2000);

/// Lifetime of an untouched success notice.
pub const SUCCESS_CLEAR_DELAY: Duration = Duration::from_millis(5000);

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_SUBMIT_PATH: &str = "/api/submit-patient-data";
pub const HEALTH_PATH: &str = "/api/health";
pub const SUBMISSIONS_PATH: &str = "/api/submissions";
pub const SUBMISSION_PATH: &str = "/api/submission";

/// Metadata field names appended to every payload.
pub const SUBMISSION_TIME_FIELD: &str = "submissionTime";
pub const PHOTO_COUNT_FIELD: &str = "photoCount";
pub const REPORT_COUNT_FIELD: &str = "reportCount";

/// Longest phone number kept by the tel field normaliser.
pub const MAX_PHONE_DIGITS: usize = 15;

pub const MSG_SUBMIT_SUCCESS: &str =
    "Patient information submitted successfully! Our team will review your case shortly.";
pub const MSG_FORM_INCOMPLETE: &str = "Please fill in all required fields";
pub const MSG_SUBMISSION_FAILED: &str = "Submission failed";
pub const MSG_OFFLINE: &str = "You are offline. Please check your internet connection.";
pub const MSG_ONLINE: &str = "You are back online!";
