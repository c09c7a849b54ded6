//! Embedding image files as self-contained `data:` URIs.

use base64::Engine as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Largest accepted source file, in bytes.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("Please select an image under 5MB")]
    TooLarge { size: u64 },

    #[error("{} is not a supported image type", .0.display())]
    UnsupportedType(PathBuf),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl AttachmentError {
    pub fn title(&self) -> &'static str {
        match self {
            AttachmentError::TooLarge { .. } => "File too large",
            AttachmentError::UnsupportedType(_) => "Unsupported file",
            AttachmentError::Io { .. } => "Cannot read file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedImage {
    pub file_name: String,
    pub data_uri: String,
    pub size_bytes: u64,
}

/// Read an image file and encode it as a data URI.
///
/// The size limit is checked against file metadata before anything is read.
pub fn read_image(path: &Path) -> Result<AttachedImage, AttachmentError> {
    let mime =
        mime_for_path(path).ok_or_else(|| AttachmentError::UnsupportedType(path.to_path_buf()))?;
    let io_err = |source| AttachmentError::Io {
        path: path.to_path_buf(),
        source,
    };

    let size = fs::metadata(path).map_err(io_err)?.len();
    if size > MAX_IMAGE_BYTES {
        return Err(AttachmentError::TooLarge { size });
    }
    let bytes = fs::read(path).map_err(io_err)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(AttachedImage {
        file_name,
        data_uri: encode_data_uri(mime, &bytes),
        size_bytes: bytes.len() as u64,
    })
}

pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{b64}")
}

/// Decoded size of a base64 data URI payload, computed from its length.
pub fn data_uri_payload_len(data_uri: &str) -> Option<usize> {
    let (_, payload) = data_uri.split_once(";base64,")?;
    let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
    (payload.len() * 3 / 4).checked_sub(padding)
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => return None,
    };
    Some(mime)
}
