use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// N-up composition configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NupOptions {
    pub layout: Layout,
    pub spacing: Spacing,
    pub orientation: Orientation,
    /// Base paper size, transposed by `orientation`
    pub paper_size: PaperSize,
}

impl NupOptions {
    pub fn new(layout: Layout, spacing: Spacing, orientation: Orientation) -> Self {
        Self {
            layout,
            spacing,
            orientation,
            paper_size: PaperSize::Letter,
        }
    }

    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options: Self = serde_json::from_slice(&bytes)
            .map_err(|e| NupError::Config(format!("Failed to parse config: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| NupError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if let PaperSize::Custom {
            width_pt,
            height_pt,
        } = self.paper_size
        {
            let valid = |v: f32| v.is_finite() && v > 0.0;
            if !valid(width_pt) || !valid(height_pt) {
                return Err(NupError::Config(format!(
                    "Custom paper size must be positive, got {} x {} pt",
                    width_pt, height_pt
                )));
            }
        }

        Ok(())
    }

    /// Output sheet (width, height) in points
    pub fn sheet_dimensions(&self) -> (f32, f32) {
        self.paper_size.dimensions_with_orientation(self.orientation)
    }

    /// File name for the composed document, e.g. `report-2-up-landscape.pdf`
    pub fn output_file_name(&self, original_name: &str) -> String {
        output_file_name(original_name, self.layout, self.orientation)
    }
}

/// Build `<base>-<layout>-<orientation>.pdf` from the uploaded file name.
///
/// A trailing `.pdf` is stripped regardless of case.
pub fn output_file_name(original_name: &str, layout: Layout, orientation: Orientation) -> String {
    let base = match original_name.len().checked_sub(4) {
        Some(split)
            if original_name.is_char_boundary(split)
                && original_name[split..].eq_ignore_ascii_case(".pdf") =>
        {
            &original_name[..split]
        }
        _ => original_name,
    };

    format!("{}-{}-{}.pdf", base, layout, orientation)
}
