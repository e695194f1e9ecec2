//! Sheet planning: which source page goes into which slot of which sheet

use super::{fit, is_positive, placements_on};
use crate::options::NupOptions;
use crate::types::{FitTransform, Layout, NupError, NupStatistics, Placement, Result};

/// One filled slot on an output sheet
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotPlan {
    /// Slot index within the sheet (reading order)
    pub slot: usize,
    /// 0-based index of the source page drawn here
    pub source_index: usize,
    /// The cell reserved for this slot
    pub cell: Placement,
    pub transform: FitTransform,
    /// Where the scaled page actually lands
    pub drawn: Placement,
}

/// Everything needed to draw one output sheet
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetPlan {
    pub index: usize,
    pub width: f32,
    pub height: f32,
    /// Filled slots only; trailing empty slots are omitted
    pub slots: Vec<SlotPlan>,
}

/// Number of output sheets for a source page count
pub fn output_page_count(source_pages: usize, layout: Layout) -> usize {
    source_pages.div_ceil(layout.pages_per_sheet())
}

/// Plan every output sheet for the given source page sizes.
///
/// All sizes are validated before any fitting happens, so a degenerate page
/// fails the whole plan with its 1-based page number.
pub fn plan_sheets(page_sizes: &[(f32, f32)], options: &NupOptions) -> Result<Vec<SheetPlan>> {
    if let Some((index, &(width, height))) = page_sizes
        .iter()
        .enumerate()
        .find(|(_, (w, h))| !is_positive(*w) || !is_positive(*h))
    {
        return Err(NupError::InvalidPageGeometry {
            page: Some(index + 1),
            width,
            height,
        });
    }

    let pages_per_sheet = options.layout.pages_per_sheet();
    let (sheet_width, sheet_height) = options.sheet_dimensions();
    let cells = placements_on(
        options.layout,
        options.spacing,
        options.orientation,
        options.paper_size,
    );
    let sheet_count = output_page_count(page_sizes.len(), options.layout);

    let mut sheets = Vec::with_capacity(sheet_count);
    for sheet_index in 0..sheet_count {
        let mut slots = Vec::with_capacity(pages_per_sheet);

        for (slot, cell) in cells.iter().enumerate() {
            let source_index = sheet_index * pages_per_sheet + slot;
            let Some(&(page_width, page_height)) = page_sizes.get(source_index) else {
                break;
            };

            let transform = fit(page_width, page_height, cell.width, cell.height)?;
            slots.push(SlotPlan {
                slot,
                source_index,
                cell: *cell,
                transform,
                drawn: transform.drawn_rect(cell, page_width, page_height),
            });
        }

        sheets.push(SheetPlan {
            index: sheet_index,
            width: sheet_width,
            height: sheet_height,
            slots,
        });
    }

    Ok(sheets)
}

/// Calculate statistics for a composition
pub fn calculate_statistics(source_pages: usize, layout: Layout) -> NupStatistics {
    let pages_per_sheet = layout.pages_per_sheet();
    let output_sheets = output_page_count(source_pages, layout);

    NupStatistics {
        source_pages,
        pages_per_sheet,
        output_sheets,
        empty_slots: output_sheets * pages_per_sheet - source_pages,
    }
}
