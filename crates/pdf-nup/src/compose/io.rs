//! Document I/O operations for composition

use super::load::load_document;
use crate::intake::accept_upload;
use crate::types::*;
use lopdf::Document;
use std::path::Path;

/// Load a single PDF document
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    tokio::task::spawn_blocking(move || load_document(&bytes)).await?
}

/// Read a PDF from disk and run it through upload intake
pub async fn read_working_document(path: impl AsRef<Path>) -> Result<WorkingDocument> {
    let path = path.as_ref().to_owned();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());
    let bytes = tokio::fs::read(&path).await?;
    tokio::task::spawn_blocking(move || accept_upload(&file_name, bytes)).await?
}

/// Serialize a document into PDF bytes
pub fn serialize(doc: &mut Document) -> Result<Vec<u8>> {
    doc.compress();
    let mut writer = Vec::new();
    doc.save_to(&mut writer)?;
    Ok(writer)
}

/// Write composed bytes to disk
pub async fn save_pdf(bytes: &[u8], path: impl AsRef<Path>) -> Result<()> {
    tokio::fs::write(path, bytes).await?;
    Ok(())
}
