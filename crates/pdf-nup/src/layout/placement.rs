//! Cell placement on an output sheet
//!
//! Margins are a fixed fraction of each sheet dimension; the gap between
//! cells is the smaller of the two margins. Cells are returned in reading
//! order so slot `i` on a sheet always receives the `i`-th page of its group.

use crate::types::{Layout, Orientation, PaperSize, Placement, Spacing};

/// Calculate the cell placements for a US Letter based sheet.
///
/// Returns exactly `layout.pages_per_sheet()` rectangles.
pub fn placements(layout: Layout, spacing: Spacing, orientation: Orientation) -> Vec<Placement> {
    placements_on(layout, spacing, orientation, PaperSize::Letter)
}

/// Calculate the cell placements for an arbitrary base paper size.
///
/// # Arguments
/// * `layout` - Number of cells (2-up or 4-up)
/// * `spacing` - Margin preset
/// * `orientation` - Sheet orientation; also decides how 2-up cells are split
/// * `paper` - Base paper size, transposed by `orientation`
pub fn placements_on(
    layout: Layout,
    spacing: Spacing,
    orientation: Orientation,
    paper: PaperSize,
) -> Vec<Placement> {
    let (width, height) = paper.dimensions_with_orientation(orientation);
    let fraction = spacing.margin_fraction();
    let margin_x = width * fraction;
    let margin_y = height * fraction;
    let gap = margin_x.min(margin_y);

    match (layout, orientation) {
        (Layout::TwoUp, Orientation::Landscape) => {
            let cell_width = (width - margin_x * 2.0 - gap) / 2.0;
            let cell_height = height - margin_y * 2.0;

            vec![
                Placement::new(margin_x, margin_y, cell_width, cell_height),
                Placement::new(margin_x + cell_width + gap, margin_y, cell_width, cell_height),
            ]
        }
        (Layout::TwoUp, Orientation::Portrait) => {
            let cell_width = width - margin_x * 2.0;
            let cell_height = (height - margin_y * 2.0 - gap) / 2.0;

            vec![
                // Top
                Placement::new(margin_x, margin_y + cell_height + gap, cell_width, cell_height),
                // Bottom
                Placement::new(margin_x, margin_y, cell_width, cell_height),
            ]
        }
        (Layout::FourUp, _) => {
            let cell_width = (width - margin_x * 2.0 - gap) / 2.0;
            let cell_height = (height - margin_y * 2.0 - gap) / 2.0;
            let right_x = margin_x + cell_width + gap;
            let top_y = margin_y + cell_height + gap;

            vec![
                // Top row (left to right)
                Placement::new(margin_x, top_y, cell_width, cell_height),
                Placement::new(right_x, top_y, cell_width, cell_height),
                // Bottom row (left to right)
                Placement::new(margin_x, margin_y, cell_width, cell_height),
                Placement::new(right_x, margin_y, cell_width, cell_height),
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.001;

    #[test]
    fn test_two_up_landscape_regular() {
        let cells = placements(Layout::TwoUp, Spacing::Regular, Orientation::Landscape);
        assert_eq!(cells.len(), 2);

        // 792 x 612 sheet, 5% margins: 39.6 x 30.6, gap 30.6
        let expected_width = (792.0 - 2.0 * 39.6 - 30.6) / 2.0;
        assert!((cells[0].x - 39.6).abs() < EPSILON);
        assert!((cells[0].y - 30.6).abs() < EPSILON);
        assert!((cells[0].width - expected_width).abs() < EPSILON);
        assert!((cells[0].height - (612.0 - 2.0 * 30.6)).abs() < EPSILON);
        assert!((cells[1].x - (39.6 + expected_width + 30.6)).abs() < EPSILON);
        assert_eq!(cells[0].y, cells[1].y);
    }

    #[test]
    fn test_two_up_portrait_stacks_top_first() {
        let cells = placements(Layout::TwoUp, Spacing::Snug, Orientation::Portrait);
        assert_eq!(cells.len(), 2);
        assert!(cells[0].y > cells[1].y, "first slot should be the top cell");
        assert_eq!(cells[0].x, cells[1].x);
        assert_eq!(cells[0].width, cells[1].width);
    }

    #[test]
    fn test_four_up_reading_order() {
        for orientation in [Orientation::Landscape, Orientation::Portrait] {
            let cells = placements(Layout::FourUp, Spacing::Spacious, orientation);
            assert_eq!(cells.len(), 4);

            // Top row above bottom row
            assert!(cells[0].y > cells[2].y);
            assert!(cells[1].y > cells[3].y);
            // Left column before right column
            assert!(cells[0].x < cells[1].x);
            assert!(cells[2].x < cells[3].x);
        }
    }

    #[test]
    fn test_gap_is_smaller_margin() {
        // Landscape: margin_y is smaller, so the horizontal gap uses it
        let cells = placements(Layout::TwoUp, Spacing::Spacious, Orientation::Landscape);
        let gap = cells[1].x - cells[0].right();
        assert!((gap - 61.2).abs() < EPSILON);
    }

    #[test]
    fn test_custom_paper() {
        let paper = PaperSize::Custom {
            width_pt: 1000.0,
            height_pt: 500.0,
        };
        let cells = placements_on(Layout::TwoUp, Spacing::Regular, Orientation::Portrait, paper);
        // Custom sizes are normalized to portrait, so portrait is 500 x 1000
        assert!((cells[0].x - 25.0).abs() < EPSILON);
        assert!((cells[0].width - 450.0).abs() < EPSILON);
    }
}
