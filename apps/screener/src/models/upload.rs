use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::ClientError;
use crate::models::candidate::CandidateId;

/// Largest resume the service accepts (16 MiB).
pub const MAX_RESUME_BYTES: usize = 16 * 1024 * 1024;

const ACCEPTED_EXTENSIONS: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
];

/// Why the file picker refused a file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RejectedFile {
    #[error("Unsupported file type '{0}'. Only PDF and DOCX files are accepted")]
    UnsupportedType(String),

    #[error("The selected file is empty")]
    Empty,

    #[error("The selected file is {size} bytes; the limit is 16 MB")]
    TooLarge { size: usize },
}

/// A resume selected for upload, held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeFile {
    pub file_name: String,
    pub bytes: Bytes,
}

impl ResumeFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }

    /// MIME type sent with the multipart part.
    pub fn mime_type(&self) -> &'static str {
        self.extension()
            .and_then(|ext| {
                ACCEPTED_EXTENSIONS
                    .iter()
                    .find(|(accepted, _)| *accepted == ext)
                    .map(|(_, mime)| *mime)
            })
            .unwrap_or("application/octet-stream")
    }

    /// Picker-side acceptance check: PDF or DOCX, non-empty, within the size limit.
    pub fn check_accepted(&self) -> Result<(), RejectedFile> {
        let ext = self.extension().unwrap_or_default();
        if !ACCEPTED_EXTENSIONS.iter().any(|(accepted, _)| *accepted == ext) {
            return Err(RejectedFile::UnsupportedType(self.file_name.clone()));
        }
        if self.bytes.is_empty() {
            return Err(RejectedFile::Empty);
        }
        if self.bytes.len() > MAX_RESUME_BYTES {
            return Err(RejectedFile::TooLarge {
                size: self.bytes.len(),
            });
        }
        Ok(())
    }
}

/// Success body of `POST /api/upload`. Only the candidate id is consumed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub candidate_id: Option<CandidateId>,
}

impl UploadResponse {
    /// Lenient read of a 2xx body: anything unreadable yields a response
    /// without a candidate id rather than an error.
    pub fn from_body(body: &[u8]) -> Self {
        let candidate_id = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("candidate_id").and_then(CandidateId::from_json));
        Self { candidate_id }
    }
}
