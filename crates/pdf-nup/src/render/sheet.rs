//! Output sheet rendering

use super::xobject::{PageBox, create_page_xobject};
use crate::layout::{SheetPlan, SlotPlan};
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Render one planned sheet into the output document.
///
/// # Arguments
/// * `output` - The output document
/// * `source` - The source document containing the pages
/// * `source_page_ids` - Object IDs of all source pages, in page order
/// * `source_boxes` - Resolved MediaBox of each source page
/// * `sheet` - The planned sheet
/// * `parent_pages_id` - The parent Pages object ID
/// * `cache` - Object copy cache shared across sheets
pub fn render_sheet(
    output: &mut Document,
    source: &Document,
    source_page_ids: &[ObjectId],
    source_boxes: &[PageBox],
    sheet: &SheetPlan,
    parent_pages_id: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(sheet.width),
            Object::Real(sheet.height),
        ]),
    );

    let mut content_ops = Vec::with_capacity(sheet.slots.len());
    let mut xobjects = Dictionary::new();

    for slot in &sheet.slots {
        let source_page_id = source_page_ids[slot.source_index];
        let page_box = &source_boxes[slot.source_index];
        let xobject_name = format!("P{}", slot.slot);

        let xobject_id = create_page_xobject(output, source, source_page_id, page_box, cache)?;
        xobjects.set(xobject_name.as_bytes(), Object::Reference(xobject_id));

        content_ops.push(placement_command(&xobject_name, slot, page_box));
    }

    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let content = content_ops.join("");
    let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));

    Ok(output.add_object(page_dict))
}

/// Generate the content stream command that draws one slot.
///
/// The form's BBox starts at the source MediaBox origin, so the translation
/// subtracts the scaled origin to land the box corner on `slot.drawn`.
pub fn placement_command(xobject_name: &str, slot: &SlotPlan, page_box: &PageBox) -> String {
    let scale = slot.transform.scale;
    let tx = slot.drawn.x - page_box.x * scale;
    let ty = slot.drawn.y - page_box.y * scale;

    format!(
        "q {} 0 0 {} {} {} cm /{} Do Q\n",
        scale, scale, tx, ty, xobject_name
    )
}
