pub mod compose;
pub mod constants;
pub mod intake;
pub mod layout;
mod options;
pub mod render;
mod store;
mod types;

pub use compose::{compose, compose_bytes, compose_document, load_document, load_pdf, save_pdf};
pub use intake::{accept_upload, validate_upload};
pub use layout::{
    SheetPlan, SlotPlan, calculate_statistics, fit, output_page_count, placements, placements_on,
    plan_sheets,
};
pub use options::*;
pub use store::WorkingStore;
pub use types::*;
