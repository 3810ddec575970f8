use crate::constants::{DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_SIZE_BYTES, PHOTO_MIME_PREFIX};
use crate::models::{FileCategory, RawFile};

/// Why a candidate file was not accepted into a collection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("You can only upload up to {max} {category_plural}")]
    TooMany {
        max: usize,
        category_plural: &'static str,
    },

    #[error("File {file_name} is too large. Max size is {}", format_size(.max))]
    TooLarge {
        file_name: String,
        size: u64,
        max: u64,
    },

    #[error("File {file_name} is not an image")]
    WrongType {
        file_name: String,
        mime_type: String,
    },
}

/// Count, size and type limits for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRules {
    category: FileCategory,
    max_count: usize,
    max_size_bytes: u64,
    allowed_mime_prefix: Option<&'static str>,
}

impl FileRules {
    pub fn new(category: FileCategory, max_count: usize, max_size_bytes: u64) -> Self {
        let allowed_mime_prefix = match category {
            FileCategory::Photo => Some(PHOTO_MIME_PREFIX),
            FileCategory::Report => None,
        };
        Self {
            category,
            max_count,
            max_size_bytes,
            allowed_mime_prefix,
        }
    }

    pub fn for_category(category: FileCategory) -> Self {
        Self::new(category, DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_SIZE_BYTES)
    }

    pub fn category(&self) -> FileCategory {
        self.category
    }

    /// Validate count given how many files are already held
    pub fn validate_count(&self, held: usize) -> Result<(), Rejection> {
        if held >= self.max_count {
            return Err(Rejection::TooMany {
                max: self.max_count,
                category_plural: self.category.plural(),
            });
        }
        Ok(())
    }

    /// Validate file size
    pub fn validate_size(&self, file: &RawFile) -> Result<(), Rejection> {
        if file.size() > self.max_size_bytes {
            return Err(Rejection::TooLarge {
                file_name: file.name.clone(),
                size: file.size(),
                max: self.max_size_bytes,
            });
        }
        Ok(())
    }

    /// Validate MIME type against the category prefix, if any
    pub fn validate_type(&self, file: &RawFile) -> Result<(), Rejection> {
        if let Some(prefix) = self.allowed_mime_prefix {
            if !file.mime_type.to_ascii_lowercase().starts_with(prefix) {
                return Err(Rejection::WrongType {
                    file_name: file.name.clone(),
                    mime_type: file.mime_type.clone(),
                });
            }
        }
        Ok(())
    }

    /// Count first, then size, then type.
    pub fn validate_all(&self, file: &RawFile, held: usize) -> Result<(), Rejection> {
        self.validate_count(held)?;
        self.validate_size(file)?;
        self.validate_type(file)?;
        Ok(())
    }
}

fn format_size(bytes: &u64) -> String {
    const MIB: u64 = 1024 * 1024;
    let bytes = *bytes;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= 1024 {
        format!("{:.1}MB", bytes as f64 / MIB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
