//! Single-slot feedback region.
//!
//! A new message always replaces the previous one. Success notices expire
//! after a fixed delay unless replaced first; errors and info notices stay.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackMessage {
    pub text: String,
    pub severity: Severity,
}

/// Host surface showing the feedback region.
pub trait FeedbackSurface: Send + Sync {
    /// Bring the feedback region into view for a freshly set message.
    fn reveal(&self, message: &FeedbackMessage);
}

/// Surface for headless hosts: every message goes to the log.
pub struct TracingSurface;

impl FeedbackSurface for TracingSurface {
    fn reveal(&self, message: &FeedbackMessage) {
        match message.severity {
            Severity::Error => tracing::warn!(feedback = %message.text, "Feedback"),
            _ => tracing::info!(feedback = %message.text, "Feedback"),
        }
    }
}

struct Inner {
    slot: watch::Sender<Option<FeedbackMessage>>,
    generation: AtomicU64,
    surface: Arc<dyn FeedbackSurface>,
    success_clear_delay: Duration,
}

#[derive(Clone)]
pub struct FeedbackChannel {
    inner: Arc<Inner>,
}

impl FeedbackChannel {
    pub fn new(surface: Arc<dyn FeedbackSurface>, success_clear_delay: Duration) -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                slot,
                generation: AtomicU64::new(0),
                surface,
                success_clear_delay,
            }),
        }
    }

    pub fn info(&self, text: impl Into<String>) {
        self.show(text, Severity::Info);
    }

    pub fn success(&self, text: impl Into<String>) {
        self.show(text, Severity::Success);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.show(text, Severity::Error);
    }

    pub fn show(&self, text: impl Into<String>, severity: Severity) {
        let message = FeedbackMessage {
            text: text.into(),
            severity,
        };

        let mut generation = 0;
        self.inner.slot.send_modify(|slot| {
            generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *slot = Some(message.clone());
        });
        self.inner.surface.reveal(&message);

        if severity == Severity::Success {
            self.schedule_expiry(generation);
        }
    }

    /// Empty the slot, cancelling any pending expiry.
    pub fn clear(&self) {
        self.inner.slot.send_modify(|slot| {
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            *slot = None;
        });
    }

    pub fn current(&self) -> Option<FeedbackMessage> {
        self.inner.slot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<FeedbackMessage>> {
        self.inner.slot.subscribe()
    }

    fn schedule_expiry(&self, generation: u64) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No runtime available, success notice will not expire");
            return;
        };

        let inner = self.inner.clone();
        handle.spawn(async move {
            tokio::time::sleep(inner.success_clear_delay).await;
            inner.slot.send_if_modified(|slot| {
                // Replaced or cleared since this notice was shown
                if inner.generation.load(Ordering::SeqCst) != generation || slot.is_none() {
                    return false;
                }
                *slot = None;
                true
            });
        });
    }
}
