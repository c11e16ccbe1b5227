//! Shared helpers for integration tests

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use pdf_tools::pdf::{SourceDocument, TextCollector};

/// Build a PDF with one page per entry in `texts`
///
/// Unlike the unit-test fixtures, every page carries its own MediaBox and
/// Resources, the layout most producers write.
pub fn create_test_pdf(texts: &[&str]) -> Vec<u8> {
    create_sized_pdf(texts, [0, 0, 612, 792])
}

pub fn create_sized_pdf(texts: &[&str], media_box: [i64; 4]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    for text in texts {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(24)]),
                Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
                Operation::new(
                    "Tj",
                    vec![Object::String(text.as_bytes().to_vec(), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("save test pdf");
    buffer
}

/// Text of each page, trimmed, in page order
pub fn page_texts(bytes: &[u8]) -> Vec<String> {
    let document = SourceDocument::open(bytes).expect("open output");
    document
        .pages()
        .map(|page| document.page_text(&page).expect("page text").trim().to_string())
        .collect()
}

pub fn page_count(bytes: &[u8]) -> usize {
    SourceDocument::open(bytes).expect("open output").page_count()
}

pub fn rotations(bytes: &[u8]) -> Vec<u16> {
    SourceDocument::open(bytes)
        .expect("open output")
        .pages()
        .map(|page| page.rotation().degrees())
        .collect()
}

pub fn document_text(bytes: &[u8]) -> String {
    TextCollector::new()
        .collect_text_from_bytes(bytes)
        .expect("collect text")
}

/// Like [`create_test_pdf`], with a Link annotation on page `from` whose
/// destination is page `to` (both 1-based)
pub fn create_linked_pdf(texts: &[&str], from: u32, to: u32) -> Vec<u8> {
    let mut doc = Document::load_mem(&create_test_pdf(texts)).expect("load test pdf");
    let pages = doc.get_pages();
    let source = pages[&from];
    let target = pages[&to];

    let link_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => vec![Object::Integer(72), Object::Integer(700), Object::Integer(200), Object::Integer(730)],
        "Dest" => vec![Object::Reference(target), Object::Name(b"Fit".to_vec())],
    });
    doc.get_dictionary_mut(source)
        .expect("link source page")
        .set("Annots", vec![Object::Reference(link_id)]);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("save linked pdf");
    buffer
}

/// Decompressed content of every stream in the file, whether reachable
/// from the page tree or not
pub fn all_stream_content(bytes: &[u8]) -> String {
    let doc = Document::load_mem(bytes).expect("load output");
    doc.objects
        .values()
        .filter_map(|object| match object {
            Object::Stream(stream) => Some(
                stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone()),
            ),
            _ => None,
        })
        .map(|content| String::from_utf8_lossy(&content).into_owned())
        .collect()
}
