//! Upload intake: validation and page counting before a document enters the session

use crate::compose::load_document;
use crate::constants::{MAX_UPLOAD_BYTES, PDF_HEADER};
use crate::types::*;

/// Reject uploads that are not PDFs or exceed the size limit.
///
/// A file counts as a PDF when its name ends in `.pdf` (any case) or its
/// content starts with the `%PDF-` signature.
pub fn validate_upload(file_name: &str, bytes: &[u8]) -> Result<()> {
    let named_pdf = file_name.to_ascii_lowercase().ends_with(".pdf");
    if !named_pdf && !bytes.starts_with(PDF_HEADER) {
        return Err(UploadRejection::NotPdf.into());
    }

    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(UploadRejection::TooLarge {
            size: bytes.len(),
            limit: MAX_UPLOAD_BYTES,
        }
        .into());
    }

    Ok(())
}

/// Validate an upload, parse it, and package it as the working document
pub fn accept_upload(file_name: &str, bytes: impl Into<Vec<u8>>) -> Result<WorkingDocument> {
    let bytes = bytes.into();
    validate_upload(file_name, &bytes)?;

    let page_count = load_document(&bytes)?.get_pages().len();
    if page_count == 0 {
        return Err(NupError::NoPages);
    }

    log::info!(
        "Accepted {} ({}, {} page(s))",
        file_name,
        format_file_size(bytes.len()),
        page_count
    );
    Ok(WorkingDocument::new(bytes, file_name, page_count))
}

/// Human-readable size: `512 B`, `1.5 KB`, `3.2 MB`
pub fn format_file_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
    }
}
