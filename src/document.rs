// src/document.rs
use std::path::Path;

use crate::error::{ClientError, ClientResult};
use crate::utils;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A resume file as the user selected it.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    pub file_name: String,
    /// Declared type; never sniffed from the bytes.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ResumeDocument {
    pub fn new(file_name: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        }
    }

    /// Read a file from disk, declaring its type from the extension.
    pub async fn from_path(path: &Path) -> ClientResult<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ClientError::validation(format!("Invalid file path: {}", path.display())))?
            .to_string();

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ClientError::validation(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        let content_type = utils::content_type_for(&file_name);
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type
            .split(';')
            .next()
            .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
            .unwrap_or(false)
    }

    pub fn size_mb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0 / 1024.0
    }
}
