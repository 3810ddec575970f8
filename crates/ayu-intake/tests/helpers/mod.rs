#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ayu_core::models::{FileEntry, RawFile, SubmissionReceipt, SubmissionRequest};
use ayu_core::{IntakeConfig, IntakeTransport, TransportFailure};
use ayu_intake::{DecodeError, ImageDecoder, SubmissionController};
use tokio::sync::Notify;

/// Transport answering from a script, optionally holding each request until released.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<SubmissionReceipt, TransportFailure>>>,
    requests: Mutex<Vec<SubmissionRequest>>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
    healthy: Mutex<bool>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<SubmissionReceipt, TransportFailure>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            healthy: Mutex::new(true),
            ..Default::default()
        }
    }

    pub fn gated(
        responses: Vec<Result<SubmissionReceipt, TransportFailure>>,
        gate: Arc<Notify>,
    ) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(responses)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<SubmissionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn set_healthy(&self, healthy: bool) {
        *self.healthy.lock().unwrap() = healthy;
    }
}

#[async_trait]
impl IntakeTransport for ScriptedTransport {
    async fn submit(
        &self,
        request: SubmissionRequest,
    ) -> Result<SubmissionReceipt, TransportFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(receipt()))
    }

    async fn health(&self) -> Result<(), TransportFailure> {
        if *self.healthy.lock().unwrap() {
            Ok(())
        } else {
            Err(TransportFailure::Unreachable("connection refused".to_string()))
        }
    }
}

/// Decoder that answers immediately without touching the bytes.
pub struct InstantDecoder;

#[async_trait]
impl ImageDecoder for InstantDecoder {
    async fn decode(&self, entry: &FileEntry) -> Result<String, DecodeError> {
        Ok(format!("data:test,{}", entry.name))
    }
}

pub fn receipt() -> SubmissionReceipt {
    SubmissionReceipt {
        success: true,
        message: Some("Patient data submitted successfully".to_string()),
        submission_id: Some("20240301093000".to_string()),
        photos_uploaded: Some(0),
        reports_uploaded: Some(0),
    }
}

pub fn controller(transport: Arc<ScriptedTransport>) -> SubmissionController {
    SubmissionController::builder(transport)
        .config(IntakeConfig::default())
        .decoder(Arc::new(InstantDecoder))
        .build()
}

pub async fn fill_required_fields(controller: &SubmissionController) {
    for (name, value) in [
        ("fullName", "Asha Devi"),
        ("age", "34"),
        ("gender", "female"),
        ("phone", "+91 98765 43210"),
        ("chiefComplaint", "Skin rash"),
        ("symptoms", "Itching on both forearms"),
        ("severity", "moderate"),
    ] {
        controller.set_text(name, value).await.unwrap();
    }
    controller.set_checked("emergencyConsent", true).await.unwrap();
    controller.set_checked("dataConsent", true).await.unwrap();
}

pub fn photo(name: &str) -> RawFile {
    RawFile::new(name, "image/jpeg", vec![0xFFu8; 64])
}

pub fn report(name: &str) -> RawFile {
    RawFile::new(name, "application/pdf", b"%PDF-1.4".to_vec())
}
