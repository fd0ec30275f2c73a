//! File attachment constants and validators.

use crate::error::{CoreError, CoreResult};
use crate::task::FileAttachment;

/// Maximum attachment size in bytes (5 MiB).
pub const MAX_FILE_SIZE: i64 = 5 * 1024 * 1024;

pub const ALLOWED_MIME_TYPES: &[&str] = &["application/pdf", "image/png", "image/jpeg"];

pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".png", ".jpg", ".jpeg"];

/// Lower-cased extension of `file_name`, including the leading dot.
fn extension(file_name: &str) -> Option<String> {
    file_name
        .rfind('.')
        .map(|idx| file_name[idx..].to_ascii_lowercase())
}

/// Validate a file descriptor before it is attached to a task.
pub fn validate_attachment(file: &FileAttachment) -> CoreResult<()> {
    if file.file_name.trim().is_empty() {
        return Err(CoreError::Validation("file_name must not be empty".into()));
    }
    if file.file_path.trim().is_empty() {
        return Err(CoreError::Validation("file_path must not be empty".into()));
    }
    if file.file_size < 0 {
        return Err(CoreError::Validation("file_size must not be negative".into()));
    }
    if file.file_size > MAX_FILE_SIZE {
        return Err(CoreError::Validation(format!(
            "File size exceeds maximum allowed size of 5MB. Current size: {:.2}MB",
            file.file_size as f64 / 1024.0 / 1024.0
        )));
    }
    if !ALLOWED_MIME_TYPES.contains(&file.file_mime_type.as_str()) {
        return Err(CoreError::Validation(format!(
            "Invalid file type. Allowed types: PDF, PNG, JPEG. Received: {}",
            file.file_mime_type
        )));
    }
    match extension(&file.file_name) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        other => Err(CoreError::Validation(format!(
            "Invalid file extension. Allowed: {}. Received: {}",
            ALLOWED_EXTENSIONS.join(", "),
            other.unwrap_or_default()
        ))),
    }
}
