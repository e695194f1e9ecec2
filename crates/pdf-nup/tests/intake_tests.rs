use lopdf::{Dictionary, Document, Object, Stream};
use pdf_nup::constants::MAX_UPLOAD_BYTES;
use pdf_nup::*;

fn create_test_pdf(num_pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    writer
}

#[test]
fn test_accept_upload_counts_pages() {
    let doc = accept_upload("slides.pdf", create_test_pdf(6)).unwrap();
    assert_eq!(doc.page_count, 6);
    assert_eq!(doc.file_name, "slides.pdf");
}

#[test]
fn test_upload_without_pdf_name_or_signature() {
    let result = validate_upload("notes.txt", b"plain text");
    assert!(matches!(
        result,
        Err(NupError::Upload(UploadRejection::NotPdf))
    ));
}

#[test]
fn test_upload_signature_overrides_extension() {
    let bytes = create_test_pdf(1);
    assert!(validate_upload("scan", &bytes).is_ok());
}

#[test]
fn test_upload_too_large() {
    let bytes = vec![b' '; MAX_UPLOAD_BYTES + 1];
    match validate_upload("huge.pdf", &bytes) {
        Err(NupError::Upload(UploadRejection::TooLarge { size, limit })) => {
            assert_eq!(size, MAX_UPLOAD_BYTES + 1);
            assert_eq!(limit, MAX_UPLOAD_BYTES);
        }
        other => panic!("Expected TooLarge, got {:?}", other),
    }
}

#[test]
fn test_upload_with_no_pages() {
    assert!(matches!(
        accept_upload("empty.pdf", create_test_pdf(0)),
        Err(NupError::NoPages)
    ));
}

#[test]
fn test_store_replaces_and_clears() {
    let mut store = WorkingStore::default();
    assert!(store.get().is_none());

    store.put(WorkingDocument::new(vec![1u8; 10], "a.pdf", 1)).unwrap();
    store.put(WorkingDocument::new(vec![2u8; 10], "b.pdf", 2)).unwrap();
    assert_eq!(store.get().map(|d| d.file_name.as_str()), Some("b.pdf"));

    store.clear();
    assert!(store.get().is_none());
}

#[test]
fn test_store_quota_exceeded() {
    let mut store = WorkingStore::with_quota(16);
    store.put(WorkingDocument::new(vec![0u8; 8], "small.pdf", 1)).unwrap();

    let err = store
        .put(WorkingDocument::new(vec![0u8; 32], "big.pdf", 1))
        .unwrap_err();
    match &err {
        NupError::StorageExhausted { attempted, quota } => {
            assert_eq!(*attempted, 32);
            assert_eq!(*quota, 16);
        }
        other => panic!("Expected StorageExhausted, got {:?}", other),
    }
    assert!(err.user_message().contains("32 B"));

    // The previous document was cleared before the rejected write
    assert!(store.get().is_none());
}

#[test]
fn test_user_messages_are_distinct() {
    let errors = [
        NupError::Encrypted,
        NupError::NoPages,
        NupError::InvalidPageGeometry {
            page: Some(1),
            width: 0.0,
            height: 1.0,
        },
        NupError::RendererInit("missing library".to_string()),
        NupError::Render {
            page: Some(0),
            message: "boom".to_string(),
        },
        NupError::StorageExhausted {
            attempted: 10,
            quota: 5,
        },
        NupError::Config("x".to_string()),
        NupError::Upload(UploadRejection::NotPdf),
    ];

    let messages: Vec<String> = errors.iter().map(NupError::user_message).collect();
    for (i, a) in messages.iter().enumerate() {
        for b in messages.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
    }

    // Internal text never leaks into the user message
    assert!(!messages[3].contains("missing library"));
    assert!(!messages[4].contains("boom"));
}
