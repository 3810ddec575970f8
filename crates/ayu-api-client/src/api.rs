//! Domain methods for the intake endpoint.

use anyhow::{Context, Result};
use async_trait::async_trait;
use ayu_core::constants::{HEALTH_PATH, SUBMISSIONS_PATH, SUBMISSION_PATH};
use ayu_core::models::{
    HealthStatus, PartValue, StoredSubmission, SubmissionList, SubmissionReceipt,
    SubmissionRequest,
};
use ayu_core::{IntakeTransport, TransportFailure};
use bytes::Bytes;
use reqwest::multipart::{Form, Part};

use crate::ApiClient;

/// Serialize a payload as `multipart/form-data`, keeping part order.
pub fn multipart_form(request: SubmissionRequest) -> Form {
    request
        .parts
        .into_iter()
        .fold(Form::new(), |form, part| match part.value {
            PartValue::Text(text) => form.text(part.name, text),
            PartValue::File {
                file_name,
                mime_type,
                data,
            } => {
                let file_part = |data: Bytes| {
                    let length = data.len() as u64;
                    Part::stream_with_length(reqwest::Body::from(data), length)
                        .file_name(file_name.clone())
                };
                let typed = match file_part(data.clone()).mime_str(&mime_type) {
                    Ok(typed) => typed,
                    Err(e) => {
                        tracing::debug!(
                            part = %part.name,
                            mime_type = %mime_type,
                            error = %e,
                            "Unusable MIME type, sending part untyped"
                        );
                        file_part(data)
                    }
                };
                form.part(part.name, typed)
            }
        })
}

impl ApiClient {
    /// POST the payload to the configured submission path.
    pub async fn submit_request(
        &self,
        request: SubmissionRequest,
    ) -> Result<SubmissionReceipt, TransportFailure> {
        let photo_count = request.photo_count;
        let report_count = request.report_count;
        let receipt: SubmissionReceipt = self
            .post_multipart(self.submit_path(), multipart_form(request))
            .await?;

        tracing::info!(
            photo_count,
            report_count,
            submission_id = receipt.submission_id.as_deref().unwrap_or("-"),
            "Intake form accepted"
        );
        Ok(receipt)
    }

    /// `GET /api/health`.
    pub async fn health(&self) -> Result<HealthStatus> {
        self.get(HEALTH_PATH).await
    }

    /// `GET /api/submissions`.
    pub async fn list_submissions(&self) -> Result<SubmissionList> {
        self.get(SUBMISSIONS_PATH).await
    }

    /// `GET /api/submission/{id}`.
    pub async fn get_submission(&self, submission_id: &str) -> Result<StoredSubmission> {
        if submission_id.trim().is_empty() {
            return Err(anyhow::anyhow!("Submission id must not be empty"));
        }
        self.get(&format!(
            "{}/{}",
            SUBMISSION_PATH,
            urlencoding::encode(submission_id)
        ))
        .await
        .with_context(|| format!("Failed to fetch submission {}", submission_id))
    }
}

#[async_trait]
impl IntakeTransport for ApiClient {
    async fn submit(
        &self,
        request: SubmissionRequest,
    ) -> Result<SubmissionReceipt, TransportFailure> {
        self.submit_request(request).await
    }

    async fn health(&self) -> Result<(), TransportFailure> {
        ApiClient::health(self)
            .await
            .map(|_| ())
            .map_err(|e| TransportFailure::Unreachable(format!("{:#}", e)))
    }
}
