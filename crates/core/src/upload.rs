//! Upload constraints shared by the petition-image and report-evidence
//! endpoints: size ceilings, content-type allow-lists, and stored-filename
//! construction.

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum petition image size: 5 MB.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Maximum report evidence size: 10 MB.
pub const MAX_EVIDENCE_BYTES: usize = 10 * 1024 * 1024;

/// Content types accepted for petition images.
pub const IMAGE_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif"];

/// Content types accepted for report evidence.
pub const EVIDENCE_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "video/mp4",
    "video/quicktime",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// What is being uploaded; selects the size ceiling and type allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    PetitionImage,
    ReportEvidence,
}

impl UploadKind {
    pub fn max_bytes(&self) -> usize {
        match self {
            UploadKind::PetitionImage => MAX_IMAGE_BYTES,
            UploadKind::ReportEvidence => MAX_EVIDENCE_BYTES,
        }
    }

    pub fn allowed_types(&self) -> &'static [&'static str] {
        match self {
            UploadKind::PetitionImage => IMAGE_CONTENT_TYPES,
            UploadKind::ReportEvidence => EVIDENCE_CONTENT_TYPES,
        }
    }
}

/// Validate an upload's declared content type and byte size.
pub fn validate_upload(kind: UploadKind, content_type: &str, size: usize) -> Result<(), CoreError> {
    if !kind.allowed_types().contains(&content_type) {
        return Err(CoreError::Validation(format!(
            "Unsupported file type '{content_type}'. Allowed: {}",
            kind.allowed_types().join(", ")
        )));
    }
    if size > kind.max_bytes() {
        return Err(CoreError::Validation(format!(
            "File exceeds the {} MB size limit",
            kind.max_bytes() / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Build a collision-free stored filename for an upload.
///
/// The original filename is discarded except for its extension, which is
/// sanitized to alphanumerics. Filenames never contain path separators, so a
/// stored name is always safe to join onto the upload directory.
pub fn stored_filename(prefix: &str, entity_id: DbId, original: &str, timestamp: i64) -> String {
    let ext: String = match original.rsplit_once('.') {
        Some((_, tail)) => tail
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(8)
            .collect::<String>()
            .to_lowercase(),
        None => String::new(),
    };
    let ext = if ext.is_empty() { "bin".to_string() } else { ext };
    format!("{prefix}_{entity_id}_{timestamp}.{ext}")
}

/// Reject filenames that could escape the upload directory when served back.
pub fn validate_served_filename(name: &str) -> Result<(), CoreError> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.')
    {
        return Err(CoreError::Validation("Invalid filename".to_string()));
    }
    Ok(())
}
