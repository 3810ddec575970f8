//! Submission lifecycle.
//!
//! The controller owns both file collections, the field values, the preview
//! renderers and the feedback channel. It validates the form, builds one
//! multipart payload per attempt, hands it to the transport and maps the
//! outcome onto [`SubmissionState`], which the host observes to enable or
//! disable the submit control.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use ayu_core::constants::{MSG_OFFLINE, MSG_ONLINE, MSG_SUBMIT_SUCCESS};
use ayu_core::models::{
    EntryId, FileCategory, FileEntry, FormSchema, FormValues, RawFile, SubmissionReceipt,
    SubmissionRequest, SubmissionState,
};
use ayu_core::validation::{validate_form, FileRules};
use ayu_core::{ErrorMetadata, IntakeConfig, IntakeError, IntakeTransport, LogLevel};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::collection::{AddResult, FileCollection};
use crate::connectivity::Connectivity;
use crate::feedback::{FeedbackChannel, FeedbackSurface, TracingSurface};
use crate::preview::{ImageDecoder, PreviewRenderer, ThumbnailDecoder};

/// Result of a submit activation that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted(SubmissionReceipt),
    /// A submission was already in flight; nothing was sent.
    Ignored,
}

struct FormState {
    values: FormValues,
    photos: FileCollection,
    reports: FileCollection,
}

impl FormState {
    fn collection_mut(&mut self, category: FileCategory) -> &mut FileCollection {
        match category {
            FileCategory::Photo => &mut self.photos,
            FileCategory::Report => &mut self.reports,
        }
    }

    fn collection(&self, category: FileCategory) -> &FileCollection {
        match category {
            FileCategory::Photo => &self.photos,
            FileCategory::Report => &self.reports,
        }
    }
}

struct Inner {
    schema: FormSchema,
    form: Mutex<FormState>,
    photo_previews: PreviewRenderer,
    report_previews: PreviewRenderer,
    feedback: FeedbackChannel,
    state: watch::Sender<SubmissionState>,
    transport: Arc<dyn IntakeTransport>,
    reset_delay: Duration,
    /// Bumped on every transition into `Succeeded`.
    success_generation: AtomicU64,
    connectivity: StdMutex<Option<Connectivity>>,
}

#[derive(Clone)]
pub struct SubmissionController {
    inner: Arc<Inner>,
}

pub struct SubmissionControllerBuilder {
    transport: Arc<dyn IntakeTransport>,
    config: IntakeConfig,
    schema: FormSchema,
    surface: Arc<dyn FeedbackSurface>,
    decoder: Arc<dyn ImageDecoder>,
}

impl SubmissionControllerBuilder {
    pub fn config(mut self, config: IntakeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn schema(mut self, schema: FormSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn surface(mut self, surface: Arc<dyn FeedbackSurface>) -> Self {
        self.surface = surface;
        self
    }

    pub fn decoder(mut self, decoder: Arc<dyn ImageDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn build(self) -> SubmissionController {
        let config = self.config;

        let mut photos = FileCollection::new(FileRules::new(
            FileCategory::Photo,
            config.max_files,
            config.max_file_size_bytes,
        ));
        let mut reports = FileCollection::new(FileRules::new(
            FileCategory::Report,
            config.max_files,
            config.max_file_size_bytes,
        ));

        let photo_previews = PreviewRenderer::new(FileCategory::Photo, self.decoder.clone());
        let report_previews = PreviewRenderer::new(FileCategory::Report, self.decoder);
        photo_previews.attach(&mut photos);
        report_previews.attach(&mut reports);

        let (state, _) = watch::channel(SubmissionState::Idle);

        SubmissionController {
            inner: Arc::new(Inner {
                form: Mutex::new(FormState {
                    values: self.schema.default_values(),
                    photos,
                    reports,
                }),
                schema: self.schema,
                photo_previews,
                report_previews,
                feedback: FeedbackChannel::new(self.surface, config.success_clear_delay),
                state,
                transport: self.transport,
                reset_delay: config.reset_delay,
                success_generation: AtomicU64::new(0),
                connectivity: StdMutex::new(None),
            }),
        }
    }
}

/// Leaves `Submitting` if the submit future is dropped mid-request, so the
/// trigger can never stay disabled.
struct SubmittingGuard<'a> {
    state: &'a watch::Sender<SubmissionState>,
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|state| {
            if *state == SubmissionState::Submitting {
                tracing::warn!("Submission abandoned before completion");
                *state = SubmissionState::Idle;
                true
            } else {
                false
            }
        });
    }
}

impl SubmissionController {
    pub fn builder(transport: Arc<dyn IntakeTransport>) -> SubmissionControllerBuilder {
        SubmissionControllerBuilder {
            transport,
            config: IntakeConfig::default(),
            schema: FormSchema::patient_intake(),
            surface: Arc::new(TracingSurface),
            decoder: Arc::new(ThumbnailDecoder::default()),
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.inner.schema
    }

    pub fn feedback(&self) -> &FeedbackChannel {
        &self.inner.feedback
    }

    pub fn previews(&self, category: FileCategory) -> &PreviewRenderer {
        match category {
            FileCategory::Photo => &self.inner.photo_previews,
            FileCategory::Report => &self.inner.report_previews,
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SubmissionState> {
        self.inner.state.subscribe()
    }

    pub fn trigger_enabled(&self) -> bool {
        self.inner.state.borrow().trigger_enabled()
    }

    /// Handle a file-picker selection. Each rejection is posted to the
    /// feedback region in input order.
    pub async fn select_files(&self, category: FileCategory, files: Vec<RawFile>) -> AddResult {
        let result = {
            let mut form = self.inner.form.lock().await;
            form.collection_mut(category).add(files)
        };

        for rejection in result.rejections() {
            self.inner.feedback.error(rejection.to_string());
        }
        result
    }

    /// The remove affordance of a preview node.
    pub async fn remove_file(&self, category: FileCategory, id: EntryId) {
        let mut form = self.inner.form.lock().await;
        self.previews(category)
            .activate_remove(form.collection_mut(category), id);
    }

    /// Snapshot of one collection in display order.
    pub async fn files(&self, category: FileCategory) -> Vec<FileEntry> {
        self.inner.form.lock().await.collection(category).items().to_vec()
    }

    pub async fn set_text(&self, name: &str, value: &str) -> Result<(), IntakeError> {
        let mut form = self.inner.form.lock().await;
        form.values.set_text(&self.inner.schema, name, value)
    }

    pub async fn set_checked(&self, name: &str, checked: bool) -> Result<(), IntakeError> {
        let mut form = self.inner.form.lock().await;
        form.values.set_checked(&self.inner.schema, name, checked)
    }

    pub async fn values(&self) -> FormValues {
        self.inner.form.lock().await.values.clone()
    }

    /// Submit activation.
    ///
    /// Ignored while a submission is in flight. An incomplete form fails
    /// without touching the network. Otherwise one request is sent and its
    /// outcome drives the state and the feedback region.
    pub async fn submit(&self) -> Result<SubmitOutcome, IntakeError> {
        let request = {
            let form = self.inner.form.lock().await;

            if *self.inner.state.borrow() == SubmissionState::Submitting {
                tracing::debug!("Submit ignored, a submission is already in flight");
                return Ok(SubmitOutcome::Ignored);
            }

            if let Err(e) = validate_form(&self.inner.schema, &form.values) {
                tracing::debug!(error = %e, "Submit blocked by form validation");
                self.inner.feedback.error(e.client_message());
                return Err(e);
            }

            self.inner.state.send_replace(SubmissionState::Submitting);
            SubmissionRequest::build(
                &form.values,
                form.photos.items(),
                form.reports.items(),
                chrono::Utc::now(),
            )
        };

        let _guard = SubmittingGuard {
            state: &self.inner.state,
        };

        tracing::info!(
            photo_count = request.photo_count,
            report_count = request.report_count,
            "Submitting intake form"
        );

        match self.inner.transport.submit(request).await {
            Ok(receipt) => {
                tracing::info!(
                    submission_id = receipt.submission_id.as_deref().unwrap_or("-"),
                    "Submission accepted"
                );
                let generation =
                    self.inner.success_generation.fetch_add(1, Ordering::SeqCst) + 1;
                self.inner.state.send_replace(SubmissionState::Succeeded);
                self.inner.feedback.success(MSG_SUBMIT_SUCCESS);
                self.schedule_reset(generation);
                Ok(SubmitOutcome::Submitted(receipt))
            }
            Err(failure) => {
                let err = IntakeError::from(failure);
                match err.log_level() {
                    LogLevel::Error => tracing::error!(error = %err, "Submission failed"),
                    _ => tracing::warn!(error = %err, "Submission failed"),
                }
                let reason = match &err {
                    IntakeError::Transport(failure) => failure.reason().to_string(),
                    other => other.to_string(),
                };
                self.inner
                    .state
                    .send_replace(SubmissionState::Failed(reason));
                self.inner.feedback.error(err.client_message());
                Err(err)
            }
        }
    }

    /// Start a submission without waiting for it.
    pub fn spawn_submit(&self) -> JoinHandle<Result<SubmitOutcome, IntakeError>> {
        let controller = self.clone();
        tokio::spawn(async move { controller.submit().await })
    }

    /// Clear both collections, their previews, the field values and the
    /// feedback region. A `Succeeded` state returns to `Idle`.
    pub async fn reset(&self) {
        let mut form = self.inner.form.lock().await;
        self.reset_locked(&mut form);
    }

    fn reset_locked(&self, form: &mut FormState) {
        form.photos.clear();
        form.reports.clear();
        form.values.reset(&self.inner.schema);
        self.inner.feedback.clear();
        self.inner.state.send_if_modified(|state| {
            if *state == SubmissionState::Succeeded {
                *state = SubmissionState::Idle;
                true
            } else {
                false
            }
        });
        tracing::debug!("Form reset");
    }

    fn schedule_reset(&self, generation: u64) {
        let controller = self.clone();
        let delay = self.inner.reset_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            controller.reset_after_success(generation).await;
        });
    }

    /// Reset only if the success numbered `generation` is still the current
    /// state. Checked under the form lock, which `submit` also holds while
    /// entering `Submitting`.
    async fn reset_after_success(&self, generation: u64) {
        let mut form = self.inner.form.lock().await;
        let current = self.inner.success_generation.load(Ordering::SeqCst);
        if current != generation || self.state() != SubmissionState::Succeeded {
            // A later attempt owns the form now
            tracing::debug!(generation, current, "Stale reset skipped");
            return;
        }
        self.reset_locked(&mut form);
    }

    /// Host connectivity signal. Advisory only: posts a notice on transitions
    /// and leaves files, values and submission state untouched.
    pub fn connectivity_changed(&self, connectivity: Connectivity) {
        let changed = {
            let mut last = self
                .inner
                .connectivity
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            // Starting out online is not news
            let changed = match *last {
                None => connectivity == Connectivity::Offline,
                Some(previous) => previous != connectivity,
            };
            *last = Some(connectivity);
            changed
        };
        if !changed {
            return;
        }

        tracing::info!(?connectivity, "Connectivity changed");
        match connectivity {
            Connectivity::Offline => self.inner.feedback.info(MSG_OFFLINE),
            Connectivity::Online => self.inner.feedback.success(MSG_ONLINE),
        }
    }

    /// Probe the endpoint once and report the result as a connectivity signal.
    pub async fn probe_connectivity(&self) -> Connectivity {
        let connectivity = match self.inner.transport.health().await {
            Ok(()) => Connectivity::Online,
            Err(e) => {
                tracing::debug!(error = %e, "Health probe failed");
                Connectivity::Offline
            }
        };
        self.connectivity_changed(connectivity);
        connectivity
    }
}
