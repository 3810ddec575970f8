//! Bounded, typed set of pending files for one category.

use std::sync::Arc;

use ayu_core::models::{EntryId, FileCategory, FileEntry, RawFile};
use ayu_core::validation::{FileRules, Rejection};

#[derive(Debug, Clone)]
pub enum CollectionEvent {
    Added(FileEntry),
    Removed(EntryId),
    Cleared,
}

/// Receives collection events synchronously, in mutation order.
pub trait CollectionListener: Send + Sync {
    fn on_event(&self, category: FileCategory, event: &CollectionEvent);
}

/// Per-candidate outcomes of one `add` call, in input order.
#[derive(Debug, Clone, Default)]
pub struct AddResult {
    pub outcomes: Vec<Result<FileEntry, Rejection>>,
}

impl AddResult {
    pub fn accepted(&self) -> impl Iterator<Item = &FileEntry> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    pub fn rejections(&self) -> impl Iterator<Item = &Rejection> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted().count()
    }
}

pub struct FileCollection {
    rules: FileRules,
    items: Vec<FileEntry>,
    listeners: Vec<Arc<dyn CollectionListener>>,
}

impl FileCollection {
    pub fn new(rules: FileRules) -> Self {
        Self {
            rules,
            items: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn category(&self) -> FileCategory {
        self.rules.category()
    }

    pub fn subscribe(&mut self, listener: Arc<dyn CollectionListener>) {
        self.listeners.push(listener);
    }

    /// Validate and append each candidate in order.
    ///
    /// A rejected candidate does not stop later ones. Only accepted files
    /// count toward the limit, so 6 candidates against 2 free slots yield 2
    /// acceptances followed by 4 `TooMany` rejections.
    pub fn add(&mut self, candidates: impl IntoIterator<Item = RawFile>) -> AddResult {
        let mut result = AddResult::default();

        for candidate in candidates {
            if let Err(rejection) = self.rules.validate_all(&candidate, self.items.len()) {
                tracing::debug!(
                    category = %self.category(),
                    file_name = %candidate.name,
                    size = candidate.size(),
                    reason = %rejection,
                    "File rejected"
                );
                result.outcomes.push(Err(rejection));
                continue;
            }

            let entry = FileEntry::from_raw(candidate);
            tracing::debug!(
                category = %self.category(),
                entry_id = %entry.id,
                file_name = %entry.name,
                size = entry.size,
                "File accepted"
            );
            self.items.push(entry.clone());
            self.emit(&CollectionEvent::Added(entry.clone()));
            result.outcomes.push(Ok(entry));
        }

        result
    }

    /// Remove by identity. Absent ids are ignored and emit nothing.
    pub fn remove(&mut self, id: EntryId) -> Option<FileEntry> {
        let index = self.items.iter().position(|e| e.id == id)?;
        let entry = self.items.remove(index);
        tracing::debug!(category = %self.category(), entry_id = %id, "File removed");
        self.emit(&CollectionEvent::Removed(id));
        Some(entry)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.emit(&CollectionEvent::Cleared);
    }

    pub fn items(&self) -> &[FileEntry] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn emit(&self, event: &CollectionEvent) {
        let category = self.category();
        for listener in &self.listeners {
            listener.on_event(category, event);
        }
    }
}
