//! Ayu intake form engine
//!
//! Holds the two bounded file collections (photos and reports), renders their
//! previews, owns the single feedback slot and drives the submission lifecycle
//! `Idle -> Submitting -> Succeeded | Failed`.
//!
//! Host events (file selection, remove clicks, submit clicks, connectivity
//! changes) are method calls on [`SubmissionController`]; the host observes
//! state through `watch` channels.

pub mod collection;
pub mod connectivity;
pub mod controller;
pub mod feedback;
pub mod preview;

pub use collection::{AddResult, CollectionEvent, CollectionListener, FileCollection};
pub use connectivity::{spawn_connectivity_probe, Connectivity};
pub use controller::{SubmissionController, SubmissionControllerBuilder, SubmitOutcome};
pub use feedback::{FeedbackChannel, FeedbackMessage, FeedbackSurface, Severity, TracingSurface};
pub use preview::{
    DecodeError, ImageDecoder, PreviewContent, PreviewNode, PreviewRenderer, ThumbnailDecoder,
};
