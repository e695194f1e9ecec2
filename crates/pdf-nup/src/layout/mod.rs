//! Layout calculation modules for N-up composition
//!
//! This module handles all the geometric calculations:
//! - Cell placement on a sheet (margins, gap, slot order)
//! - Fitting a source page into a cell (scale and centering)
//! - Sheet planning (which source page lands in which slot)

mod fit;
mod placement;
mod plan;

pub use fit::fit;
pub(crate) use fit::is_positive;
pub use placement::*;
pub use plan::*;
