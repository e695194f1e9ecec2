//! Fitting a source page into a cell

use crate::types::{FitTransform, NupError, Result};

/// Scale a page to fit inside a cell while keeping its aspect ratio,
/// centred on both axes.
///
/// The scale is `min(cell_width / page_width, cell_height / page_height)`,
/// so the drawn page never exceeds the cell on either axis.
pub fn fit(page_width: f32, page_height: f32, cell_width: f32, cell_height: f32) -> Result<FitTransform> {
    if !is_positive(page_width) || !is_positive(page_height) {
        return Err(NupError::InvalidPageGeometry {
            page: None,
            width: page_width,
            height: page_height,
        });
    }

    let scale_x = cell_width / page_width;
    let scale_y = cell_height / page_height;
    let scale = scale_x.min(scale_y);

    let offset_x = (cell_width - page_width * scale) / 2.0;
    let offset_y = (cell_height - page_height * scale) / 2.0;

    Ok(FitTransform {
        scale,
        offset_x,
        offset_y,
    })
}

/// Finite and strictly greater than zero
pub(crate) fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
