use pdf_nup::NupError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation shared between a controller and one generation
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Bail out with [`NupError::Cancelled`] once the flag is set
    pub fn checkpoint(&self) -> Result<(), NupError> {
        if self.is_cancelled() {
            Err(NupError::Cancelled)
        } else {
            Ok(())
        }
    }
}
