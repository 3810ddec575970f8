//! Boundary between the form engine and the remote intake endpoint.
//!
//! The engine only knows this trait; the HTTP client crate provides the real
//! implementation and tests provide scripted ones.

use async_trait::async_trait;

use crate::error::TransportFailure;
use crate::models::{SubmissionReceipt, SubmissionRequest};

#[async_trait]
pub trait IntakeTransport: Send + Sync {
    /// Send one submission. Resolves once the endpoint answers or the
    /// transport gives up.
    async fn submit(&self, request: SubmissionRequest)
        -> Result<SubmissionReceipt, TransportFailure>;

    /// Reachability probe used for connectivity notices.
    async fn health(&self) -> Result<(), TransportFailure> {
        Ok(())
    }
}
