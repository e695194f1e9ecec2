//! Embedding source pages as Form XObjects
//!
//! Each source page becomes a Form XObject in the output document, which is
//! then drawn onto an output sheet with a transformation matrix.

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Page tree depth after which inheritance lookups give up (guards against cycles)
const MAX_INHERITANCE_DEPTH: usize = 32;

/// A page's MediaBox: origin plus size, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PageBox {
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn to_array(self) -> Vec<Object> {
        vec![
            Object::Real(self.x),
            Object::Real(self.y),
            Object::Real(self.x + self.width),
            Object::Real(self.y + self.height),
        ]
    }
}

impl Default for PageBox {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: DEFAULT_PAGE_DIMENSIONS.0,
            height: DEFAULT_PAGE_DIMENSIONS.1,
        }
    }
}

// =============================================================================
// XObject Creation
// =============================================================================

/// Create an XObject from a source page.
///
/// Resources are deep-copied through `cache`, so fonts and images shared
/// between source pages are copied into the output only once.
///
/// # Arguments
/// * `output` - The output document to add the XObject to
/// * `source` - The source document containing the page
/// * `page_id` - The object ID of the source page
/// * `page_box` - The page's resolved MediaBox, used as the form's BBox
/// * `cache` - Source-to-output object ID map shared across the whole run
pub fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    page_box: &PageBox,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let page_dict = source.get_dictionary(page_id)?;
    let content = get_page_content(source, page_dict)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("BBox", Object::Array(page_box.to_array()));
    xobject_dict.set("FormType", Object::Integer(1));

    // Content we could not decode keeps its original encoding
    if let Some(encoding) = &content.encoding {
        xobject_dict.set("Filter", copy_object_deep(output, source, &encoding.filter, cache)?);
        if let Some(params) = &encoding.params {
            xobject_dict.set("DecodeParms", copy_object_deep(output, source, params, cache)?);
        }
    }

    if let Some(resources) = inherited_attribute(source, page_id, b"Resources") {
        xobject_dict.set(
            "Resources",
            copy_object_deep(output, source, resources, cache)?,
        );
    }

    let stream = Stream::new(xobject_dict, content.data).with_compression(content.encoding.is_none());
    Ok(output.add_object(stream))
}

// =============================================================================
// Page Content Extraction
// =============================================================================

/// Filter entries of a content stream that is passed through still encoded
struct ContentEncoding {
    filter: Object,
    params: Option<Object>,
}

/// Page content ready to become a form's stream
#[derive(Default)]
struct PageContent {
    data: Vec<u8>,
    encoding: Option<ContentEncoding>,
}

/// Get the content stream data from a page.
///
/// A single stream that lopdf cannot decode is carried over encoded, along
/// with its filters. Concatenating several streams needs every one decoded.
fn get_page_content(doc: &Document, page_dict: &Dictionary) -> Result<PageContent> {
    let contents = match page_dict.get(b"Contents") {
        Ok(c) => c,
        Err(_) => return Ok(PageContent::default()), // No content = blank page
    };

    match contents {
        Object::Reference(id) => match doc.get_object(*id)? {
            // An indirect array of stream references
            Object::Array(arr) => get_concatenated_content_streams(doc, arr),
            Object::Stream(stream) => Ok(single_stream_content(stream)),
            _ => Ok(PageContent::default()),
        },
        Object::Array(arr) => get_concatenated_content_streams(doc, arr),
        _ => Ok(PageContent::default()),
    }
}

fn single_stream_content(stream: &Stream) -> PageContent {
    match decode_stream(stream) {
        Ok(data) => PageContent {
            data,
            encoding: None,
        },
        Err(e) => {
            log::warn!("Keeping undecodable content stream encoded: {}", e);
            PageContent {
                data: stream.content.clone(),
                encoding: stream.dict.get(b"Filter").ok().map(|filter| ContentEncoding {
                    filter: filter.clone(),
                    params: stream.dict.get(b"DecodeParms").ok().cloned(),
                }),
            }
        }
    }
}

/// Concatenate multiple content streams
fn get_concatenated_content_streams(doc: &Document, refs: &[Object]) -> Result<PageContent> {
    let mut data = Vec::new();

    for obj in refs {
        if let Object::Reference(id) = obj {
            if let Ok(stream) = doc.get_object(*id)?.as_stream() {
                data.extend_from_slice(&decode_stream(stream)?);
                data.push(b'\n');
            }
        }
    }

    Ok(PageContent {
        data,
        encoding: None,
    })
}

/// Stream content with all filters removed; unfiltered streams pass through
fn decode_stream(stream: &Stream) -> lopdf::Result<Vec<u8>> {
    if stream.dict.has(b"Filter") {
        stream.decompressed_content()
    } else {
        Ok(stream.content.clone())
    }
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Deep copy an object from source to output document, following references.
///
/// Uses a cache to avoid copying the same object multiple times.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            // Reserve the target ID before recursing so reference cycles
            // (e.g. annotation /P back-links) terminate
            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let referenced = source.get_object(*id)?;
            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => Ok(Object::Stream(Stream {
            dict: copy_dictionary(output, source, &stream.dict, cache)?,
            content: stream.content.clone(),
            allows_compression: stream.allows_compression,
            start_position: None,
        })),
        // Primitive types: just clone
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        // Parent links would drag the whole source page tree along
        if key.as_slice() == b"Parent" {
            continue;
        }
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}

// =============================================================================
// Page Geometry
// =============================================================================

/// Resolve a source page's MediaBox, following page tree inheritance.
///
/// Pages with no MediaBox anywhere in their ancestry get US Letter. The box
/// is not normalized: an inverted or empty box yields a non-positive size,
/// which planning rejects.
pub fn page_box(doc: &Document, page_id: ObjectId) -> Result<PageBox> {
    // Surface a missing page object as an error rather than a default box
    doc.get_dictionary(page_id)?;

    let Some(media_box) = inherited_attribute(doc, page_id, b"MediaBox") else {
        return Ok(PageBox::default());
    };

    let values: Option<Vec<f32>> = resolve(doc, media_box)
        .as_array()
        .ok()
        .map(|arr| arr.iter().filter_map(|o| extract_number(resolve(doc, o))).collect());

    match values.as_deref() {
        Some([x0, y0, x1, y1]) => Ok(PageBox {
            x: *x0,
            y: *y0,
            width: x1 - x0,
            height: y1 - y0,
        }),
        _ => {
            log::warn!("Page {:?} has a malformed MediaBox, assuming Letter", page_id);
            Ok(PageBox::default())
        }
    }
}

/// Get source page dimensions (width, height) in points
pub fn get_page_dimensions(doc: &Document, page_id: ObjectId) -> Result<(f32, f32)> {
    Ok(page_box(doc, page_id)?.size())
}

/// Look up a page attribute, walking up `/Parent` links for inheritable keys
fn inherited_attribute<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent_id).ok()?;
    }

    None
}

/// Follow a single level of indirection
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
