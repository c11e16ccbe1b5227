//! In-memory PDF fixtures for unit tests

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, StringFormat};

/// Describes a test document; MediaBox and Resources live on the Pages node
/// so every page inherits them.
pub(crate) struct Fixture {
    pub texts: Vec<String>,
    pub page_rotate: Vec<Option<i64>>,
    pub tree_rotate: Option<i64>,
    pub media_box: [i64; 4],
}

impl Fixture {
    /// `count` pages reading "Page 1", "Page 2", ...
    pub fn numbered(count: u32) -> Self {
        Self::with_texts((1..=count).map(|i| format!("Page {}", i)).collect())
    }

    pub fn with_texts(texts: Vec<String>) -> Self {
        let page_rotate = vec![None; texts.len()];
        Self {
            texts,
            page_rotate,
            tree_rotate: None,
            media_box: [0, 0, 612, 792],
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Courier".to_vec())),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ]));
        let resources_id = doc.add_object(Dictionary::from_iter(vec![(
            "Font",
            Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
        )]));

        let mut page_ids = Vec::new();
        for (text, rotate) in self.texts.iter().zip(&self.page_rotate) {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
                    Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                    Operation::new(
                        "Tj",
                        vec![Object::String(text.clone().into_bytes(), StringFormat::Literal)],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

            let mut page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                ("Contents", Object::Reference(content_id)),
            ]);
            if let Some(rotate) = rotate {
                page.set("Rotate", Object::Integer(*rotate));
            }
            page_ids.push(doc.add_object(page));
        }

        let mut pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(page_ids.len() as i64)),
            (
                "Kids",
                Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
            (
                "MediaBox",
                Object::Array(self.media_box.iter().map(|v| Object::Integer(*v)).collect()),
            ),
            ("Resources", Object::Reference(resources_id)),
        ]);
        if let Some(rotate) = self.tree_rotate {
            pages.set("Rotate", Object::Integer(rotate));
        }
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }
}
