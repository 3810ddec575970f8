use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{PHOTO_COUNT_FIELD, REPORT_COUNT_FIELD, SUBMISSION_TIME_FIELD};
use crate::models::{FileCategory, FileEntry, FormValues};

/// Lifecycle of the single submit affordance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed(String),
}

impl SubmissionState {
    /// The submit control is disabled only while a request is in flight.
    pub fn trigger_enabled(&self) -> bool {
        !matches!(self, SubmissionState::Submitting)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File {
        file_name: String,
        mime_type: String,
        data: Bytes,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPart {
    pub name: String,
    pub value: PartValue,
}

/// One submit attempt's multipart payload, built fresh from the current form.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub parts: Vec<PayloadPart>,
    pub submitted_at: DateTime<Utc>,
    pub photo_count: usize,
    pub report_count: usize,
}

impl SubmissionRequest {
    /// Field values first (schema order), then `photo_<i>`, `report_<i>`, then metadata.
    /// File indices restart at 0 for every build.
    pub fn build(
        values: &FormValues,
        photos: &[FileEntry],
        reports: &[FileEntry],
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let mut parts: Vec<PayloadPart> = values
            .iter()
            .map(|(name, value)| PayloadPart {
                name: name.to_string(),
                value: PartValue::Text(value.encode()),
            })
            .collect();

        for (category, entries) in [(FileCategory::Photo, photos), (FileCategory::Report, reports)] {
            parts.extend(entries.iter().enumerate().map(|(index, entry)| PayloadPart {
                name: format!("{}_{}", category.field_prefix(), index),
                value: PartValue::File {
                    file_name: entry.name.clone(),
                    mime_type: entry.mime_type.clone(),
                    data: entry.data.clone(),
                },
            }));
        }

        let metadata = [
            (
                SUBMISSION_TIME_FIELD,
                submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
            (PHOTO_COUNT_FIELD, photos.len().to_string()),
            (REPORT_COUNT_FIELD, reports.len().to_string()),
        ];
        parts.extend(metadata.into_iter().map(|(name, value)| PayloadPart {
            name: name.to_string(),
            value: PartValue::Text(value),
        }));

        Self {
            parts,
            submitted_at,
            photo_count: photos.len(),
            report_count: reports.len(),
        }
    }

    pub fn part(&self, name: &str) -> Option<&PartValue> {
        self.parts.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.part(name) {
            Some(PartValue::Text(text)) => Some(text),
            _ => None,
        }
    }
}

/// Body of a successful submission response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub submission_id: Option<String>,
    #[serde(default)]
    pub photos_uploaded: Option<u32>,
    #[serde(default)]
    pub reports_uploaded: Option<u32>,
}

/// Error body returned by the endpoint on non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /api/health` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// `GET /api/submissions` response. Stored submissions are free-form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionList {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub submissions: Vec<serde_json::Value>,
}

/// `GET /api/submission/<id>` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSubmission {
    #[serde(default)]
    pub success: bool,
    pub submission: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldKind, FieldSpec, FormSchema, RawFile};
    use chrono::TimeZone;

    fn entry(name: &str, mime: &str) -> FileEntry {
        FileEntry::from_raw(RawFile::new(name, mime, name.as_bytes().to_vec()))
    }

    fn schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::new("fullName", "Full name", FieldKind::Text).required(),
            FieldSpec::new("dataConsent", "Consent", FieldKind::Checkbox),
        ])
        .unwrap()
    }

    #[test]
    fn build_orders_fields_files_then_metadata() {
        let schema = schema();
        let mut values = schema.default_values();
        values.set_text(&schema, "fullName", "Asha Devi").unwrap();
        values.set_checked(&schema, "dataConsent", true).unwrap();

        let photos = vec![entry("a.png", "image/png"), entry("b.jpg", "image/jpeg")];
        let reports = vec![entry("lab.pdf", "application/pdf")];
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();

        let request = SubmissionRequest::build(&values, &photos, &reports, at);
        let names: Vec<&str> = request.parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "fullName",
                "dataConsent",
                "photo_0",
                "photo_1",
                "report_0",
                "submissionTime",
                "photoCount",
                "reportCount"
            ]
        );
        assert_eq!(request.text("dataConsent"), Some("true"));
        assert_eq!(request.text("submissionTime"), Some("2024-03-01T09:30:00.000Z"));
        assert_eq!(request.text("photoCount"), Some("2"));
        assert_eq!(request.text("reportCount"), Some("1"));
        assert!(matches!(
            request.part("photo_1"),
            Some(PartValue::File { file_name, .. }) if file_name == "b.jpg"
        ));
    }

    #[test]
    fn indices_follow_current_order() {
        let values = schema().default_values();
        let first = entry("first.png", "image/png");
        let second = entry("second.png", "image/png");

        // After "first" is removed and re-added it sits behind "second"
        let photos = vec![second, first];
        let request = SubmissionRequest::build(&values, &photos, &[], Utc::now());
        assert!(matches!(
            request.part("photo_0"),
            Some(PartValue::File { file_name, .. }) if file_name == "second.png"
        ));
        assert!(request.part("photo_2").is_none());
        assert_eq!(request.text("reportCount"), Some("0"));
    }

    #[test]
    fn unchecked_checkbox_encodes_false() {
        let values = schema().default_values();
        let request = SubmissionRequest::build(&values, &[], &[], Utc::now());
        assert_eq!(request.text("dataConsent"), Some("false"));
        assert_eq!(request.text("fullName"), Some(""));
    }

    #[test]
    fn receipt_parses_endpoint_shape() {
        let receipt: SubmissionReceipt = serde_json::from_str(
            r#"{"success":true,"message":"ok","submissionId":"20240301093000","photosUploaded":2,"reportsUploaded":0}"#,
        )
        .unwrap();
        assert_eq!(receipt.submission_id.as_deref(), Some("20240301093000"));
        assert_eq!(receipt.photos_uploaded, Some(2));
    }

    #[test]
    fn only_submitting_disables_trigger() {
        assert!(SubmissionState::Idle.trigger_enabled());
        assert!(!SubmissionState::Submitting.trigger_enabled());
        assert!(SubmissionState::Failed("x".to_string()).trigger_enabled());
    }
}
