use crate::constants::{
    A3_DIMENSIONS_PT, A4_DIMENSIONS_PT, A5_DIMENSIONS_PT, LEGAL_DIMENSIONS_PT,
    LETTER_DIMENSIONS_PT, REGULAR_MARGIN_FRACTION, SNUG_MARGIN_FRACTION,
    SPACIOUS_MARGIN_FRACTION, TABLOID_DIMENSIONS_PT,
};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NupError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Document has no pages")]
    NoPages,
    #[error("Upload rejected: {0}")]
    Upload(#[from] UploadRejection),
    #[error("Unable to parse PDF after {attempts} attempt(s): {source}")]
    Parse {
        attempts: usize,
        #[source]
        source: lopdf::Error,
    },
    #[error("PDF is encrypted")]
    Encrypted,
    #[error("Invalid page geometry{}: {width} x {height} pt", page_number_suffix(.page))]
    InvalidPageGeometry {
        /// 1-based page number, when known
        page: Option<usize>,
        width: f32,
        height: f32,
    },
    #[error("Working storage exhausted: {attempted} bytes exceeds quota of {quota} bytes")]
    StorageExhausted { attempted: usize, quota: usize },
    #[error("Renderer initialization failed: {0}")]
    RendererInit(String),
    #[error("Render failed{}: {message}", page_index_suffix(.page))]
    Render {
        /// 0-based page index, when the failure is tied to one page
        page: Option<usize>,
        message: String,
    },
    #[error("Operation cancelled")]
    Cancelled,
}

impl NupError {
    /// Message suitable for showing to an end user.
    ///
    /// Every error class maps to its own wording and never includes the
    /// underlying library text.
    pub fn user_message(&self) -> String {
        match self {
            NupError::Pdf(_) | NupError::Parse { .. } => {
                "Failed to read PDF. The file may be corrupted.".to_string()
            }
            NupError::Encrypted => {
                "This PDF is password-protected. Remove the password and try again.".to_string()
            }
            NupError::InvalidPageGeometry { .. } => {
                "The PDF contains a page with invalid dimensions.".to_string()
            }
            NupError::NoPages => "PDF has no pages".to_string(),
            NupError::Upload(rejection) => rejection.to_string(),
            NupError::StorageExhausted { attempted, .. } => format!(
                "The document ({}) is too large to keep in working storage.",
                crate::intake::format_file_size(*attempted)
            ),
            NupError::RendererInit(_) => "Failed to load PDF renderer. Please retry.".to_string(),
            NupError::Render { .. } => "Failed to render a preview page.".to_string(),
            NupError::Io(_) | NupError::Config(_) | NupError::TaskJoin(_) | NupError::Cancelled => {
                "Failed to process PDF. Please try again.".to_string()
            }
        }
    }
}

fn page_number_suffix(page: &Option<usize>) -> String {
    page.map(|p| format!(" on page {p}")).unwrap_or_default()
}

fn page_index_suffix(page: &Option<usize>) -> String {
    page.map(|p| format!(" on page {}", p + 1)).unwrap_or_default()
}

/// Reasons an upload is refused before any parsing happens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    #[error("Please upload a PDF file")]
    NotPdf,
    #[error("File size exceeds {}MB limit", .limit / (1024 * 1024))]
    TooLarge { size: usize, limit: usize },
}

pub type Result<T> = std::result::Result<T, NupError>;

/// Number of source pages tiled onto each output sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Layout {
    /// Two pages per sheet
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "2-up"))]
    TwoUp,
    /// Four pages per sheet in a 2x2 grid
    #[cfg_attr(feature = "serde", serde(rename = "4-up"))]
    FourUp,
}

impl Layout {
    pub fn pages_per_sheet(self) -> usize {
        match self {
            Layout::TwoUp => 2,
            Layout::FourUp => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Layout::TwoUp => "2-up",
            Layout::FourUp => "4-up",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Margin and gap preset, as a fraction of the sheet dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Spacing {
    Snug,
    #[default]
    Regular,
    Spacious,
}

impl Spacing {
    pub fn margin_fraction(self) -> f32 {
        match self {
            Spacing::Snug => SNUG_MARGIN_FRACTION,
            Spacing::Regular => REGULAR_MARGIN_FRACTION,
            Spacing::Spacious => SPACIOUS_MARGIN_FRACTION,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Spacing::Snug => "snug",
            Spacing::Regular => "regular",
            Spacing::Spacious => "spacious",
        }
    }
}

impl fmt::Display for Spacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output sheet orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Orientation {
    /// Landscape: width > height
    #[default]
    Landscape,
    /// Portrait: height > width
    Portrait,
}

impl Orientation {
    pub fn label(self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Base paper sizes for output sheets, in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaperSize {
    A3,
    A4,
    A5,
    #[default]
    Letter,
    Legal,
    Tabloid,
    Custom { width_pt: f32, height_pt: f32 },
}

impl PaperSize {
    /// Get base dimensions (portrait for the standard sizes)
    pub fn dimensions_pt(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => A3_DIMENSIONS_PT,
            PaperSize::A4 => A4_DIMENSIONS_PT,
            PaperSize::A5 => A5_DIMENSIONS_PT,
            PaperSize::Letter => LETTER_DIMENSIONS_PT,
            PaperSize::Legal => LEGAL_DIMENSIONS_PT,
            PaperSize::Tabloid => TABLOID_DIMENSIONS_PT,
            PaperSize::Custom {
                width_pt,
                height_pt,
            } => {
                // Store custom sizes portrait so orientation transposes consistently
                (width_pt.min(height_pt), width_pt.max(height_pt))
            }
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_pt();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// A rectangle on an output sheet, in points from the bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Placement {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// True when the two rectangles share interior area (touching edges do not count)
    pub fn overlaps(&self, other: &Placement) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.top()
            && other.y < self.top()
    }
}

/// Uniform scale and centering offsets for one page inside one cell
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitTransform {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl FitTransform {
    /// Rectangle the scaled page occupies once placed in `cell`
    pub fn drawn_rect(&self, cell: &Placement, page_width: f32, page_height: f32) -> Placement {
        Placement::new(
            cell.x + self.offset_x,
            cell.y + self.offset_y,
            page_width * self.scale,
            page_height * self.scale,
        )
    }
}

/// The uploaded document held between steps
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingDocument {
    pub bytes: Arc<[u8]>,
    pub file_name: String,
    pub page_count: usize,
}

impl WorkingDocument {
    pub fn new(bytes: impl Into<Arc<[u8]>>, file_name: impl Into<String>, page_count: usize) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
            page_count,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Statistics about an N-up composition
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NupStatistics {
    pub source_pages: usize,
    pub pages_per_sheet: usize,
    pub output_sheets: usize,
    /// Slots left empty on the final sheet
    pub empty_slots: usize,
}
