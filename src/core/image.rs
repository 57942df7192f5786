//! Image uploads and the checks applied before one is sent for
//! identification.

use std::error::Error as StdError;
use std::fmt;
use std::path::Path;

use crate::core::message::ImageRef;

/// Largest image the identification endpoint accepts (16 MiB).
pub const MAX_IMAGE_BYTES: u64 = 16 * 1024 * 1024;

/// Media types accepted for identification. `image/jpg` is not registered
/// but browsers and phones still declare it.
pub const ALLOWED_MEDIA_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: String,
    media_type: String,
    size: u64,
    data: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            size: data.len() as u64,
            data,
        }
    }

    /// Read an image from disk, declaring its media type from the file
    /// extension. Files over [`MAX_IMAGE_BYTES`] are not read; only their
    /// size is recorded so validation can report it.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let media_type = media_type_for_path(path).to_string();
        let size = tokio::fs::metadata(path).await?.len();

        let data = if size > MAX_IMAGE_BYTES {
            Vec::new()
        } else {
            tokio::fs::read(path).await?
        };

        Ok(Self {
            file_name,
            media_type,
            size: size.max(data.len() as u64),
            data,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Check the declared type against [`ALLOWED_MEDIA_TYPES`] and the size
    /// against [`MAX_IMAGE_BYTES`], in that order.
    pub fn validate(&self) -> Result<(), ImageRejection> {
        if !is_allowed_media_type(&self.media_type) {
            return Err(ImageRejection::UnsupportedType {
                media_type: self.media_type.clone(),
            });
        }
        if self.size > MAX_IMAGE_BYTES {
            return Err(ImageRejection::TooLarge { size: self.size });
        }
        Ok(())
    }

    pub fn to_ref(&self) -> ImageRef {
        ImageRef {
            file_name: self.file_name.clone(),
            media_type: self.media_type.clone(),
            size: self.size,
        }
    }
}

/// Compares the essence of `media_type` (parameters such as `; charset`
/// dropped) case-insensitively.
pub fn is_allowed_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or_default().trim();
    ALLOWED_MEDIA_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(essence))
}

pub fn media_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => UNKNOWN_MEDIA_TYPE,
    }
}

/// Reasons an image is refused before any request is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRejection {
    UnsupportedType { media_type: String },
    TooLarge { size: u64 },
}

impl fmt::Display for ImageRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRejection::UnsupportedType { media_type } => write!(
                f,
                "I can't read that file type ({media_type}). Please upload a PNG, JPG, JPEG, GIF, or WEBP image."
            ),
            ImageRejection::TooLarge { size } => write!(
                f,
                "That image is too large ({}). The maximum size is 16 MB.",
                format_size(*size)
            ),
        }
    }
}

impl StdError for ImageRejection {}

fn format_size(bytes: u64) -> String {
    const MIB: f64 = 1024.0 * 1024.0;
    format!("{:.1} MB", bytes as f64 / MIB)
}
