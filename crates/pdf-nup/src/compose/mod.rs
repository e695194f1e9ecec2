//! N-up composition
//!
//! This module orchestrates the composition process:
//! 1. Load the source document (with the parse-leniency ladder)
//! 2. Resolve every source page's geometry
//! 3. Plan the output sheets (placements + fit transforms)
//! 4. Draw each planned sheet into a new document and serialize it

mod io;
mod load;

pub use io::{load_pdf, read_working_document, save_pdf, serialize};
pub use load::{Leniency, PARSE_LADDER, load_document};

use crate::layout::plan_sheets;
use crate::options::NupOptions;
use crate::render::{PageBox, page_box, render_sheet};
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;

/// Compose source PDF bytes into N-up output bytes.
///
/// Either a complete document is returned or an error; partial output is
/// never produced.
pub async fn compose(bytes: impl Into<Vec<u8>>, options: &NupOptions) -> Result<Vec<u8>> {
    options.validate()?;

    let bytes = bytes.into();
    let options = *options;

    tokio::task::spawn_blocking(move || compose_bytes(&bytes, &options)).await?
}

/// Synchronous version of [`compose`]
pub fn compose_bytes(bytes: &[u8], options: &NupOptions) -> Result<Vec<u8>> {
    let source = load_document(bytes)?;
    let mut output = compose_document(&source, options)?;
    let out = serialize(&mut output)?;

    log::info!(
        "Composed {} source bytes into {} output bytes ({}, {}, {})",
        bytes.len(),
        out.len(),
        options.layout,
        options.spacing,
        options.orientation
    );
    Ok(out)
}

/// Compose a loaded source document into a new N-up document
pub fn compose_document(source: &Document, options: &NupOptions) -> Result<Document> {
    options.validate()?;

    let page_ids: Vec<ObjectId> = source.get_pages().values().copied().collect();
    let boxes = source_page_boxes(source, &page_ids)?;
    let sizes: Vec<(f32, f32)> = boxes.iter().map(PageBox::size).collect();

    let sheets = plan_sheets(&sizes, options)?;
    log::debug!(
        "Planned {} sheet(s) for {} source page(s)",
        sheets.len(),
        page_ids.len()
    );

    let mut output = Document::with_version("1.7");
    let pages_tree_id = output.new_object_id();
    let mut page_refs = Vec::with_capacity(sheets.len());
    let mut cache: HashMap<ObjectId, ObjectId> = HashMap::new();

    for sheet in &sheets {
        let page_id = render_sheet(
            &mut output,
            source,
            &page_ids,
            &boxes,
            sheet,
            pages_tree_id,
            &mut cache,
        )?;
        log::debug!("Drew sheet {} with {} page(s)", sheet.index + 1, sheet.slots.len());
        page_refs.push(Object::Reference(page_id));
    }

    // Create pages tree
    let count = page_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(page_refs)),
        ("Count", Object::Integer(count)),
    ]);
    output
        .objects
        .insert(pages_tree_id, Object::Dictionary(pages_dict));

    // Create catalog
    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]));

    output.trailer.set("Root", catalog_id);

    Ok(output)
}

/// Resolve the MediaBox of every source page, in page order
pub fn source_page_boxes(source: &Document, page_ids: &[ObjectId]) -> Result<Vec<PageBox>> {
    page_ids.iter().map(|&id| page_box(source, id)).collect()
}
