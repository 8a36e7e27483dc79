//! Attachment metadata. No file contents are read or transferred.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttachmentError {
    #[error("attachment name is empty")]
    EmptyName,

    #[error("unsupported attachment type '{0}' (expected a PDF or an image)")]
    UnsupportedType(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Pdf,
    Image,
}

impl AttachmentKind {
    /// Infer the kind from a file name's extension
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(AttachmentKind::Pdf),
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "svg" => Some(AttachmentKind::Image),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AttachmentKind::Pdf => "PDF",
            AttachmentKind::Image => "Image",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    pub size_label: String,
    pub kind: AttachmentKind,
}

impl Attachment {
    /// Describe a file the user picked
    pub fn from_file(name: &str, size_bytes: u64) -> Result<Self, AttachmentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AttachmentError::EmptyName);
        }
        let kind = AttachmentKind::from_file_name(name)
            .ok_or_else(|| AttachmentError::UnsupportedType(name.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            size_label: size_label(size_bytes),
            kind,
        })
    }
}

/// Human-readable file size: "512 B", "12.4 KB", "2.1 MB"
pub fn size_label(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let size = bytes as f64;
    if size < KB {
        format!("{bytes} B")
    } else if size < MB {
        format!("{:.1} KB", size / KB)
    } else {
        format!("{:.1} MB", size / MB)
    }
}
