use std::fmt;
use std::path::{Component, Path};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IntakeError;

/// The two independent file intents collected by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Photo,
    Report,
}

impl FileCategory {
    /// Prefix of the zero-indexed payload field names (`photo_0`, `report_0`).
    pub fn field_prefix(&self) -> &'static str {
        match self {
            FileCategory::Photo => "photo",
            FileCategory::Report => "report",
        }
    }

    /// Plural noun used in user-facing messages.
    pub fn plural(&self) -> &'static str {
        match self {
            FileCategory::Photo => "photos",
            FileCategory::Report => "reports",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_prefix())
    }
}

/// Identity of a file accepted into a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A file as handed over by the host at selection time.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl RawFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Read a local file, detecting its MIME type from content with an
    /// extension fallback.
    pub fn from_path(path: &Path) -> Result<Self, IntakeError> {
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(IntakeError::InvalidInput(format!(
                "path must not contain '..': {}",
                path.display()
            )));
        }

        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                IntakeError::InvalidInput(format!("not a file path: {}", path.display()))
            })?
            .to_string();

        let mime_type = infer::get(&data)
            .map(|kind| kind.mime_type().to_string())
            .or_else(|| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .and_then(content_type_for_extension)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "application/octet-stream".to_string());

        Ok(Self::new(name, mime_type, data))
    }
}

/// A file accepted into a collection, tracked by identity.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub id: EntryId,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub data: Bytes,
}

impl FileEntry {
    pub fn from_raw(raw: RawFile) -> Self {
        Self {
            id: EntryId::new(),
            size: raw.size(),
            name: raw.name,
            mime_type: raw.mime_type,
            data: raw.data,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type
            .to_ascii_lowercase()
            .starts_with(crate::constants::PHOTO_MIME_PREFIX)
    }
}

/// Map a file extension to its expected content type.
pub fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    let content_type = match extension.to_lowercase().as_str() {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        // Documents
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        "csv" => "text/csv",
        _ => return None,
    };
    Some(content_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn from_path_sniffs_png_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rash.bin");
        let png_header: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        std::fs::File::create(&path)
            .unwrap()
            .write_all(png_header)
            .unwrap();

        let raw = RawFile::from_path(&path).unwrap();
        assert_eq!(raw.name, "rash.bin");
        assert_eq!(raw.mime_type, "image/png");
        assert_eq!(raw.size(), png_header.len() as u64);
    }

    #[test]
    fn from_path_falls_back_to_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "blood test normal").unwrap();

        let raw = RawFile::from_path(&path).unwrap();
        assert_eq!(raw.mime_type, "text/plain");
    }

    #[test]
    fn from_path_rejects_parent_components() {
        let result = RawFile::from_path(Path::new("../secret.pdf"));
        assert!(matches!(result, Err(IntakeError::InvalidInput(_))));
    }

    #[test]
    fn entries_get_distinct_ids() {
        let a = FileEntry::from_raw(RawFile::new("a.png", "image/png", vec![1u8]));
        let b = FileEntry::from_raw(RawFile::new("a.png", "image/png", vec![1u8]));
        assert_ne!(a.id, b.id);
        assert!(a.is_image());
    }

    #[test]
    fn category_prefixes() {
        assert_eq!(FileCategory::Photo.field_prefix(), "photo");
        assert_eq!(FileCategory::Report.plural(), "reports");
    }
}
