use infer::MatcherType;
use std::path::Path;

use crate::errors::AppError;
use crate::models::PendingUpload;

/// Extensions the document service ingests.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "doc", "docx", "txt"];

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

fn mime_for_extension(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => DOCX_MIME,
        _ => "text/plain",
    }
}

/// Whether a sniffed type is consistent with the file's extension. A docx is
/// a zip container and may be reported as one; plain text only has the
/// text-like signatures (xml, html) to be confused with.
fn sniffed_type_agrees(extension: &str, kind: &infer::Type) -> bool {
    match extension {
        "pdf" => kind.mime_type() == "application/pdf",
        "doc" => matches!(kind.mime_type(), "application/msword" | "application/x-ole-storage"),
        "docx" => matches!(kind.mime_type(), DOCX_MIME | "application/zip"),
        _ => kind.matcher_type() == MatcherType::Text,
    }
}

/// Checks a selected file before it is sent and returns the MIME type to
/// upload it with.
pub fn screen_document(pending: &PendingUpload) -> Result<&'static str, AppError> {
    if pending.file_name.trim().is_empty() {
        return Err(AppError::BadRequest("Invalid filename".to_string()));
    }
    if pending.bytes.is_empty() {
        return Err(AppError::BadRequest(format!("'{}' is empty", pending.file_name)));
    }

    let extension = Path::new(&pending.file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::BadRequest(format!("File type not allowed: {}", extension)));
    }

    // Plain text has no signature, so an unrecognized payload is let through.
    if let Some(kind) = infer::get(&pending.bytes) {
        if !sniffed_type_agrees(&extension, &kind) {
            return Err(AppError::BadRequest(format!(
                "'{}' looks like {}, not a {} document",
                pending.file_name,
                kind.mime_type(),
                extension
            )));
        }
    }

    Ok(mime_for_extension(&extension))
}
