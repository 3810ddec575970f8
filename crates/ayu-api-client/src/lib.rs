//! HTTP client for the Ayu intake endpoint.
//!
//! Provides a minimal client with generic GET/multipart helpers, the domain
//! methods (submit, health, stored submissions) and the [`IntakeTransport`]
//! implementation the form engine submits through.

pub mod api;

use std::time::Duration;

use anyhow::{Context, Result};
use ayu_core::constants::{DEFAULT_SUBMIT_PATH, MSG_SUBMISSION_FAILED};
use ayu_core::models::ErrorBody;
use ayu_core::{IntakeConfig, TransportFailure};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

/// HTTP client for the intake endpoint.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    submit_path: String,
}

impl ApiClient {
    /// `timeout` of `None` leaves requests unbounded; the endpoint decides.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            submit_path: DEFAULT_SUBMIT_PATH.to_string(),
        })
    }

    pub fn from_config(config: &IntakeConfig) -> Result<Self> {
        Ok(Self::new(config.api_url.clone(), config.request_timeout)?
            .with_submit_path(config.submit_path.clone()))
    }

    pub fn with_submit_path(mut self, path: impl Into<String>) -> Self {
        self.submit_path = path.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn submit_path(&self) -> &str {
        &self.submit_path
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET request. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.build_url(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let body: T = response
            .json()
            .await
            .context("Failed to parse response as JSON")?;

        Ok(body)
    }

    /// POST multipart form and deserialize the response, mapping every failure
    /// onto the reason shown to the user.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, TransportFailure> {
        let url = self.build_url(path);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, error = %e, "Request did not reach the endpoint");
                TransportFailure::Unreachable(e.to_string())
            })?;

        let response = reject_unsuccessful(response).await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportFailure::MalformedResponse(e.to_string()))?;
        serde_json::from_slice(&body)
            .map_err(|e| TransportFailure::MalformedResponse(format!("invalid JSON body: {}", e)))
    }
}

/// Non-success statuses carry `{ "error": "..." }`; anything else falls back
/// to the generic message.
async fn reject_unsuccessful(response: Response) -> Result<Response, TransportFailure> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let reason = serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .and_then(|body| body.error)
        .filter(|error| !error.trim().is_empty())
        .unwrap_or_else(|| MSG_SUBMISSION_FAILED.to_string());

    tracing::warn!(status = status.as_u16(), reason = %reason, "Endpoint rejected request");
    Err(TransportFailure::Rejected {
        status: status.as_u16(),
        reason,
    })
}

pub use api::multipart_form;
