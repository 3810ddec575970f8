//! Preview rendering for collection members.
//!
//! Images get a thumbnail decoded off the event path; everything else gets a
//! label with the file name. The renderer follows collection events, so a
//! remove click and a programmatic `clear()` both keep the display in sync.

use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use ayu_core::models::{EntryId, FileCategory, FileEntry};
use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use tokio::sync::watch;

use crate::collection::{CollectionEvent, CollectionListener, FileCollection};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Image decode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Decode task failed: {0}")]
    Task(String),
}

/// Turns an image entry into a displayable data URL.
#[async_trait]
pub trait ImageDecoder: Send + Sync {
    async fn decode(&self, entry: &FileEntry) -> Result<String, DecodeError>;
}

/// Decodes with the `image` crate and re-encodes a bounded PNG thumbnail.
pub struct ThumbnailDecoder {
    max_edge: u32,
}

impl ThumbnailDecoder {
    pub fn new(max_edge: u32) -> Self {
        Self { max_edge }
    }
}

impl Default for ThumbnailDecoder {
    fn default() -> Self {
        Self::new(200)
    }
}

#[async_trait]
impl ImageDecoder for ThumbnailDecoder {
    async fn decode(&self, entry: &FileEntry) -> Result<String, DecodeError> {
        let data = entry.data.clone();
        let max_edge = self.max_edge;

        tokio::task::spawn_blocking(move || -> Result<String, DecodeError> {
            let thumbnail = image::load_from_memory(&data)?.thumbnail(max_edge, max_edge);
            let mut png = Cursor::new(Vec::new());
            thumbnail.write_to(&mut png, ImageFormat::Png)?;
            Ok(format!(
                "data:image/png;base64,{}",
                general_purpose::STANDARD.encode(png.into_inner())
            ))
        })
        .await
        .map_err(|e| DecodeError::Task(e.to_string()))?
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewContent {
    /// Image node waiting for its decode; stays this way if decoding fails.
    Pending,
    Thumbnail(String),
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewNode {
    pub entry_id: EntryId,
    pub file_name: String,
    pub content: PreviewContent,
}

#[derive(Default)]
struct Board {
    nodes: Vec<PreviewNode>,
}

impl Board {
    fn node_mut(&mut self, id: EntryId) -> Option<&mut PreviewNode> {
        self.nodes.iter_mut().find(|n| n.entry_id == id)
    }

    fn remove(&mut self, id: EntryId) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.entry_id != id);
        self.nodes.len() != before
    }
}

#[derive(Clone)]
pub struct PreviewRenderer {
    category: FileCategory,
    board: Arc<Mutex<Board>>,
    decoder: Arc<dyn ImageDecoder>,
    revision: Arc<watch::Sender<u64>>,
}

impl PreviewRenderer {
    pub fn new(category: FileCategory, decoder: Arc<dyn ImageDecoder>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            category,
            board: Arc::new(Mutex::new(Board::default())),
            decoder,
            revision: Arc::new(revision),
        }
    }

    /// Subscribe this renderer to a collection's events.
    pub fn attach(&self, collection: &mut FileCollection) {
        collection.subscribe(Arc::new(self.clone()));
    }

    pub fn category(&self) -> FileCategory {
        self.category
    }

    /// Snapshot of the rendered nodes in display order.
    pub fn nodes(&self) -> Vec<PreviewNode> {
        lock(&self.board).nodes.clone()
    }

    pub fn node(&self, id: EntryId) -> Option<PreviewNode> {
        lock(&self.board)
            .nodes
            .iter()
            .find(|n| n.entry_id == id)
            .cloned()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.board).nodes.is_empty()
    }

    /// Bumped on every display change, for hosts that redraw on change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// The remove affordance on a node: drop the file and the node.
    pub fn activate_remove(&self, collection: &mut FileCollection, id: EntryId) {
        collection.remove(id);
        if lock(&self.board).remove(id) {
            self.bump();
        }
    }

    fn register(&self, entry: &FileEntry) {
        let content = if entry.is_image() {
            PreviewContent::Pending
        } else {
            PreviewContent::Label(entry.name.clone())
        };

        lock(&self.board).nodes.push(PreviewNode {
            entry_id: entry.id,
            file_name: entry.name.clone(),
            content,
        });
        self.bump();

        if entry.is_image() {
            self.spawn_decode(entry.clone());
        }
    }

    fn spawn_decode(&self, entry: FileEntry) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(entry_id = %entry.id, "No runtime available, preview stays pending");
            return;
        };

        let renderer = self.clone();
        handle.spawn(async move {
            match renderer.decoder.decode(&entry).await {
                Ok(data_url) => renderer.apply_thumbnail(entry.id, data_url),
                Err(e) => {
                    tracing::debug!(
                        category = %renderer.category,
                        entry_id = %entry.id,
                        error = %e,
                        "Preview decode failed"
                    );
                }
            }
        });
    }

    fn apply_thumbnail(&self, id: EntryId, data_url: String) {
        let applied = match lock(&self.board).node_mut(id) {
            Some(node) => {
                node.content = PreviewContent::Thumbnail(data_url);
                true
            }
            None => false,
        };

        if applied {
            self.bump();
        } else {
            tracing::debug!(entry_id = %id, "Entry removed before its preview was ready");
        }
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }
}

impl CollectionListener for PreviewRenderer {
    fn on_event(&self, category: FileCategory, event: &CollectionEvent) {
        if category != self.category {
            return;
        }
        match event {
            CollectionEvent::Added(entry) => self.register(entry),
            CollectionEvent::Removed(id) => {
                if lock(&self.board).remove(*id) {
                    self.bump();
                }
            }
            CollectionEvent::Cleared => {
                lock(&self.board).nodes.clear();
                self.bump();
            }
        }
    }
}

fn lock(board: &Mutex<Board>) -> MutexGuard<'_, Board> {
    board.lock().unwrap_or_else(PoisonError::into_inner)
}
