//! Working-document storage between navigation steps

use crate::constants::DEFAULT_STORE_QUOTA_BYTES;
use crate::types::*;

/// Holds at most one working document, bounded by a byte quota
#[derive(Debug)]
pub struct WorkingStore {
    current: Option<WorkingDocument>,
    quota_bytes: usize,
}

impl Default for WorkingStore {
    fn default() -> Self {
        Self::with_quota(DEFAULT_STORE_QUOTA_BYTES)
    }
}

impl WorkingStore {
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            current: None,
            quota_bytes,
        }
    }

    pub fn quota(&self) -> usize {
        self.quota_bytes
    }

    /// Replace the stored document.
    ///
    /// The previous document is cleared first, so a rejected payload leaves
    /// the store empty.
    pub fn put(&mut self, document: WorkingDocument) -> Result<()> {
        self.current = None;

        if document.size() > self.quota_bytes {
            return Err(NupError::StorageExhausted {
                attempted: document.size(),
                quota: self.quota_bytes,
            });
        }

        log::debug!(
            "Stored working document {} ({} bytes)",
            document.file_name,
            document.size()
        );
        self.current = Some(document);
        Ok(())
    }

    pub fn get(&self) -> Option<&WorkingDocument> {
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
