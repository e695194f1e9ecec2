use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdf_nup::*;

fn create_test_pdf_with_sizes(sizes: &[(i64, i64)]) -> Document {
    let mut doc = Document::with_version("1.7");

    // Create page tree root ID
    let pages_id = doc.new_object_id();

    // Create pages array
    let mut kids = Vec::new();
    for &(width, height) in sizes {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(width),
                    Object::Integer(height),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    // Create pages dict
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(sizes.len() as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    // Create catalog
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    doc
}

fn create_test_pdf(num_pages: usize) -> Document {
    create_test_pdf_with_sizes(&vec![(612, 792); num_pages])
}

fn to_bytes(mut doc: Document) -> Vec<u8> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    writer
}

fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

/// Number of XObjects drawn on an output sheet
fn drawn_count(doc: &Document, page_id: ObjectId) -> usize {
    let page = doc.get_dictionary(page_id).unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    resources.get(b"XObject").unwrap().as_dict().unwrap().len()
}

fn media_box(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let page = doc.get_dictionary(page_id).unwrap();
    let mb = page.get(b"MediaBox").unwrap().as_array().unwrap();
    let num = |o: &Object| match o {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r,
        _ => panic!("non-numeric MediaBox entry"),
    };
    (num(&mb[2]) - num(&mb[0]), num(&mb[3]) - num(&mb[1]))
}

#[test]
fn test_five_pages_two_up_landscape() {
    let doc = create_test_pdf(5);
    let options = NupOptions::new(Layout::TwoUp, Spacing::Regular, Orientation::Landscape);

    let output = compose_document(&doc, &options).unwrap();
    let ids = page_ids(&output);

    assert_eq!(ids.len(), 3);
    assert_eq!(drawn_count(&output, ids[0]), 2);
    assert_eq!(drawn_count(&output, ids[1]), 2);
    assert_eq!(drawn_count(&output, ids[2]), 1);
}

#[test]
fn test_eight_pages_four_up_fills_both_sheets() {
    for orientation in [Orientation::Landscape, Orientation::Portrait] {
        let doc = create_test_pdf(8);
        let options = NupOptions::new(Layout::FourUp, Spacing::Snug, orientation);

        let output = compose_document(&doc, &options).unwrap();
        let ids = page_ids(&output);

        assert_eq!(ids.len(), 2, "orientation {:?}", orientation);
        for id in ids {
            assert_eq!(drawn_count(&output, id), 4);
        }
    }
}

#[test]
fn test_single_page_four_up() {
    let doc = create_test_pdf(1);
    let options = NupOptions::new(Layout::FourUp, Spacing::Regular, Orientation::Portrait);

    let output = compose_document(&doc, &options).unwrap();
    let ids = page_ids(&output);

    assert_eq!(ids.len(), 1);
    assert_eq!(drawn_count(&output, ids[0]), 1);
}

#[test]
fn test_sheet_size_follows_orientation() {
    let doc = create_test_pdf(2);

    let landscape = compose_document(&doc, &NupOptions::default()).unwrap();
    let (w, h) = media_box(&landscape, page_ids(&landscape)[0]);
    assert!((w - 792.0).abs() < 0.01 && (h - 612.0).abs() < 0.01);

    let options = NupOptions::new(Layout::TwoUp, Spacing::Regular, Orientation::Portrait);
    let portrait = compose_document(&doc, &options).unwrap();
    let (w, h) = media_box(&portrait, page_ids(&portrait)[0]);
    assert!((w - 612.0).abs() < 0.01 && (h - 792.0).abs() < 0.01);
}

#[test]
fn test_sheet_count_matches_output_page_count() {
    for layout in [Layout::TwoUp, Layout::FourUp] {
        for n in 0..=9 {
            let doc = create_test_pdf(n);
            let options = NupOptions::new(layout, Spacing::Regular, Orientation::Landscape);
            let output = compose_document(&doc, &options).unwrap();

            assert_eq!(
                output.get_pages().len(),
                output_page_count(n, layout),
                "n = {}, layout = {}",
                n,
                layout
            );
        }
    }
}

#[test]
fn test_round_trip_through_bytes() {
    let bytes = to_bytes(create_test_pdf(7));
    let options = NupOptions::new(Layout::FourUp, Spacing::Spacious, Orientation::Landscape);

    let out = compose_bytes(&bytes, &options).unwrap();
    let reloaded = Document::load_mem(&out).unwrap();

    assert_eq!(reloaded.get_pages().len(), 2);
}

#[tokio::test]
async fn test_compose_async() {
    let bytes = to_bytes(create_test_pdf(3));
    let out = compose(bytes, &NupOptions::default()).await.unwrap();

    let reloaded = Document::load_mem(&out).unwrap();
    assert_eq!(reloaded.get_pages().len(), 2);
}

#[test]
fn test_compose_is_deterministic() {
    let doc = create_test_pdf_with_sizes(&[(612, 792), (842, 595), (300, 300)]);
    let options = NupOptions::new(Layout::FourUp, Spacing::Regular, Orientation::Portrait);

    let first = compose_document(&doc, &options).unwrap();
    let second = compose_document(&doc, &options).unwrap();

    let content = |d: &Document| {
        let id = page_ids(d)[0];
        d.get_page_content(id).unwrap()
    };
    assert_eq!(content(&first), content(&second));
}

#[test]
fn test_zero_sized_page_rejected() {
    let doc = create_test_pdf_with_sizes(&[(612, 792), (612, 0), (612, 792)]);

    match compose_document(&doc, &NupOptions::default()) {
        Err(NupError::InvalidPageGeometry { page: Some(2), .. }) => {}
        other => panic!("Expected InvalidPageGeometry on page 2, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_invalid_bytes_return_no_output() {
    let result = compose_bytes(b"%PDF-1.7 this is not really a pdf", &NupOptions::default());
    assert!(matches!(result, Err(NupError::Parse { .. })));
}

#[test]
fn test_inherited_media_box() {
    let mut doc = create_test_pdf(1);

    // Move the MediaBox from the page up to the Pages node
    let page_id = page_ids(&doc)[0];
    let pages_id = doc
        .get_dictionary(page_id)
        .unwrap()
        .get(b"Parent")
        .unwrap()
        .as_reference()
        .unwrap();
    doc.get_dictionary_mut(page_id).unwrap().remove(b"MediaBox");
    doc.get_dictionary_mut(pages_id).unwrap().set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(400),
            Object::Integer(200),
        ]),
    );

    let (w, h) = render::get_page_dimensions(&doc, page_id).unwrap();
    assert_eq!((w, h), (400.0, 200.0));
}

#[test]
fn test_encrypted_trailer_rejected() {
    let mut doc = create_test_pdf(1);
    let encrypt_id = doc.add_object(Dictionary::from_iter(vec![
        ("Filter", Object::Name(b"Standard".to_vec())),
        ("V", Object::Integer(1)),
        ("R", Object::Integer(2)),
    ]));
    doc.trailer.set("Encrypt", Object::Reference(encrypt_id));
    let bytes = to_bytes(doc);

    assert!(matches!(load_document(&bytes), Err(NupError::Encrypted)));
}

#[test]
fn test_appended_data_recovered_by_trimming() {
    // More than lopdf's 512-byte %%EOF search window of trailing junk
    let mut bytes = to_bytes(create_test_pdf(3));
    bytes.extend_from_slice(&[b'#'; 1024]);

    assert!(Document::load_mem(&bytes).is_err());

    let doc = load_document(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 3);

    let out = compose_bytes(&bytes, &NupOptions::default()).unwrap();
    assert_eq!(Document::load_mem(&out).unwrap().get_pages().len(), 2);
}

#[test]
fn test_offset_media_box_lands_on_drawn_rect() {
    let mut doc = create_test_pdf(1);
    let page_id = page_ids(&doc)[0];
    doc.get_dictionary_mut(page_id).unwrap().set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(50),
            Object::Integer(50),
            Object::Integer(662),
            Object::Integer(842),
        ]),
    );

    let options = NupOptions::default();
    let output = compose_document(&doc, &options).unwrap();
    let sheet_id = page_ids(&output)[0];
    let content = output.get_page_content(sheet_id).unwrap();
    let content = String::from_utf8(content).unwrap();

    let tokens: Vec<&str> = content.split_whitespace().collect();
    let cm = tokens.iter().position(|t| *t == "cm").unwrap();
    let operands: Vec<f32> = tokens[cm - 6..cm]
        .iter()
        .map(|t| t.parse().unwrap())
        .collect();
    let (s, tx, ty) = (operands[0], operands[4], operands[5]);
    assert_eq!(operands[3], s);
    assert_eq!((operands[1], operands[2]), (0.0, 0.0));

    let plan = plan_sheets(&[(612.0, 792.0)], &options).unwrap();
    let slot = &plan[0].slots[0];

    assert!((s - slot.transform.scale).abs() < 1e-4);
    assert!((s * 50.0 + tx - slot.drawn.x).abs() < 0.01);
    assert!((s * 50.0 + ty - slot.drawn.y).abs() < 0.01);
    assert!((s * 662.0 + tx - slot.drawn.right()).abs() < 0.01);
    assert!((s * 842.0 + ty - slot.drawn.top()).abs() < 0.01);
}

/// Replace the single page's content with a stream the given dictionary
/// describes
fn with_content_stream(doc: &mut Document, dict: Dictionary, content: &[u8]) -> ObjectId {
    let page_id = page_ids(doc)[0];
    let content_id = doc.add_object(Stream::new(dict, content.to_vec()));
    doc.get_dictionary_mut(page_id)
        .unwrap()
        .set("Contents", Object::Reference(content_id));
    content_id
}

#[test]
fn test_undecodable_content_keeps_its_filter() {
    let mut doc = create_test_pdf(1);
    let dict = Dictionary::from_iter(vec![(
        "Filter",
        Object::Name(b"UnknownDecode".to_vec()),
    )]);
    with_content_stream(&mut doc, dict, b"raw-bytes");

    let output = compose_document(&doc, &NupOptions::default()).unwrap();
    let sheet = output.get_dictionary(page_ids(&output)[0]).unwrap();
    let resources = sheet.get(b"Resources").unwrap().as_dict().unwrap();
    let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
    let form_id = xobjects.get(b"P0").unwrap().as_reference().unwrap();
    let form = output.get_object(form_id).unwrap().as_stream().unwrap();

    assert_eq!(
        form.dict.get(b"Filter").unwrap(),
        &Object::Name(b"UnknownDecode".to_vec())
    );
    assert_eq!(form.content, b"raw-bytes");
    assert!(!form.allows_compression);
}

#[test]
fn test_undecodable_stream_in_content_array_fails() {
    let mut doc = create_test_pdf(1);
    let page_id = page_ids(&doc)[0];
    let plain_id = doc
        .get_dictionary(page_id)
        .unwrap()
        .get(b"Contents")
        .unwrap()
        .as_reference()
        .unwrap();
    let dict = Dictionary::from_iter(vec![(
        "Filter",
        Object::Name(b"UnknownDecode".to_vec()),
    )]);
    let encoded_id = with_content_stream(&mut doc, dict, b"raw-bytes");
    doc.get_dictionary_mut(page_id).unwrap().set(
        "Contents",
        Object::Array(vec![
            Object::Reference(plain_id),
            Object::Reference(encoded_id),
        ]),
    );

    let result = compose_document(&doc, &NupOptions::default());
    assert!(matches!(result, Err(NupError::Pdf(_))));
}
