//! PDF rendering modules for N-up composition
//!
//! This module handles all PDF-specific operations:
//! - Resolving source page geometry (inherited MediaBox)
//! - Creating XObjects from source pages
//! - Building output sheets with placement transforms
//! - Deep copying PDF objects

mod sheet;
mod xobject;

pub use sheet::*;
pub use xobject::{PageBox, copy_object_deep, create_page_xobject, get_page_dimensions, page_box};
