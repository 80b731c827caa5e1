//! File attachments waiting to be sent

use crate::llm::Part;
use base64::Engine as _;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unsupported file type {media_type} for {file_name}")]
    Unsupported {
        file_name: String,
        media_type: String,
    },
}

/// Images, PDFs, plain text, audio and video can be inlined into a request
pub fn is_supported_media_type(media_type: &str) -> bool {
    let media_type = media_type.to_ascii_lowercase();
    ["image/", "audio/", "video/"]
        .iter()
        .any(|prefix| media_type.starts_with(prefix))
        || media_type == "application/pdf"
        || media_type == "text/plain"
}

/// A file held between selection and send
#[derive(Clone, PartialEq, Eq)]
pub struct PendingAttachment {
    pub file_name: String,
    pub media_type: String,
    pub data: Vec<u8>,
}

impl PendingAttachment {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Result<Self, AttachmentError> {
        let file_name = file_name.into();
        let media_type = media_type.into();
        if !is_supported_media_type(&media_type) {
            return Err(AttachmentError::Unsupported {
                file_name,
                media_type,
            });
        }
        Ok(Self {
            file_name,
            media_type,
            data,
        })
    }

    /// Read a file fully into memory, guessing its media type from the extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AttachmentError> {
        let path = path.as_ref();
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

        if !is_supported_media_type(&media_type) {
            return Err(AttachmentError::Unsupported {
                file_name,
                media_type,
            });
        }

        let data = std::fs::read(path).map_err(|source| AttachmentError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(file = %file_name, media_type = %media_type, bytes = data.len(), "Attachment loaded");
        Self::new(file_name, media_type, data)
    }

    /// Inline-data part with the base64-encoded payload
    pub fn to_inline_part(&self) -> Part {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.data);
        Part::inline(self.media_type.clone(), encoded)
    }
}

impl fmt::Debug for PendingAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingAttachment")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}
