//! Preview generation on top of the `pdf-nup` composition pipeline.
//!
//! A [`PreviewController`] composes the working document, rasterizes the
//! first few output sheets and reports progress as [`PreviewUpdate`]s. Each
//! new request supersedes the one still in flight.

mod cancel;
mod controller;
#[cfg(feature = "pdf-viewer")]
mod pdfium;
mod rasterizer;

pub use cancel::CancelFlag;
pub use controller::{PreviewController, PreviewFailure, PreviewState};
#[cfg(feature = "pdf-viewer")]
pub use pdfium::{PdfiumConfig, PdfiumRasterizer};
pub use rasterizer::{RasterImage, Rasterizer, RenderableDocument};

// Re-export types from the library crate
pub use pdf_nup::{NupError, NupOptions, WorkingDocument};

use std::sync::Arc;

/// Monotonic id of one preview request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenerationId(pub u64);

/// One rendered slot of a preview
#[derive(Debug, Clone)]
pub enum PreviewPage {
    Rendered { index: usize, image: RasterImage },
    /// The sheet could not be rasterized; surrounding sheets are unaffected
    Failed { index: usize, message: String },
}

impl PreviewPage {
    pub fn index(&self) -> usize {
        match self {
            PreviewPage::Rendered { index, .. } | PreviewPage::Failed { index, .. } => *index,
        }
    }

    pub fn image(&self) -> Option<&RasterImage> {
        match self {
            PreviewPage::Rendered { image, .. } => Some(image),
            PreviewPage::Failed { .. } => None,
        }
    }
}

/// Outcome of a successful preview generation
#[derive(Debug, Clone)]
pub struct PreviewResult {
    /// At most the first few sheets, in order
    pub pages: Vec<PreviewPage>,
    /// Number of sheets in the full composed document
    pub total_sheets: usize,
}

/// Updates sent from the controller to its observer
#[derive(Debug, Clone)]
pub enum PreviewUpdate {
    Generating {
        generation: GenerationId,
    },
    Ready {
        generation: GenerationId,
        result: Arc<PreviewResult>,
    },
    Failed {
        generation: GenerationId,
        failure: PreviewFailure,
    },
}

impl PreviewUpdate {
    pub fn generation(&self) -> GenerationId {
        match self {
            PreviewUpdate::Generating { generation }
            | PreviewUpdate::Ready { generation, .. }
            | PreviewUpdate::Failed { generation, .. } => *generation,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PreviewUpdate::Generating { .. })
    }
}
