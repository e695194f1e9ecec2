//! Shared constants for N-up composition
//!
//! This module centralizes magic numbers and constants used throughout
//! the composition and preview process.

// =============================================================================
// Paper Sizes (points, portrait)
// =============================================================================

/// US Letter: 8.5" × 11"
pub const LETTER_DIMENSIONS_PT: (f32, f32) = (612.0, 792.0);

/// US Legal: 8.5" × 14"
pub const LEGAL_DIMENSIONS_PT: (f32, f32) = (612.0, 1008.0);

/// Tabloid: 11" × 17"
pub const TABLOID_DIMENSIONS_PT: (f32, f32) = (792.0, 1224.0);

pub const A3_DIMENSIONS_PT: (f32, f32) = (841.89, 1190.55);
pub const A4_DIMENSIONS_PT: (f32, f32) = (595.28, 841.89);
pub const A5_DIMENSIONS_PT: (f32, f32) = (419.53, 595.28);

/// Page size assumed when a source page declares no MediaBox anywhere in its tree
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = LETTER_DIMENSIONS_PT;

// =============================================================================
// Spacing
// =============================================================================

/// Margin fraction for snug spacing (2%)
pub const SNUG_MARGIN_FRACTION: f32 = 0.02;

/// Margin fraction for regular spacing (5%)
pub const REGULAR_MARGIN_FRACTION: f32 = 0.05;

/// Margin fraction for spacious spacing (10%)
pub const SPACIOUS_MARGIN_FRACTION: f32 = 0.10;

// =============================================================================
// Preview
// =============================================================================

/// Number of output sheets rendered for a preview
pub const PREVIEW_SHEET_LIMIT: usize = 3;

/// Render scale factor for preview images
pub const PREVIEW_RENDER_SCALE: f32 = 1.5;

// =============================================================================
// Intake and Storage
// =============================================================================

/// Largest upload accepted (20 MiB)
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Default quota of the working-document store (64 MiB)
pub const DEFAULT_STORE_QUOTA_BYTES: usize = 64 * 1024 * 1024;

/// Signature every PDF file begins with
pub const PDF_HEADER: &[u8] = b"%PDF-";

/// End-of-file marker
pub const PDF_EOF_MARKER: &[u8] = b"%%EOF";
