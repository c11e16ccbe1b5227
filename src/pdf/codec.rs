//! Codec boundary over lopdf
//!
//! [`SourceDocument`] opens a byte buffer and exposes its page table as
//! [`PageRef`]s. [`DocumentBuilder`] copies pages from any number of source
//! documents into a fresh document and serializes it.
//!
//! Copying follows the lopdf merge example: every object of a source is
//! imported once with its ids shifted past the builder's current maximum,
//! the selected pages are re-parented under a new page tree, and whatever
//! is no longer reachable from the new catalog is pruned on serialization.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::debug;

use super::page::{DocumentId, PageIndex, PageRef, Rotation};
use crate::error::{Error, Result};
use crate::layout::PageBox;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic Parent chains in malformed files
const MAX_TREE_DEPTH: usize = 64;

/// A parsed, read-only source document
pub struct SourceDocument {
    id: DocumentId,
    doc: Document,
    page_ids: Vec<ObjectId>,
}

impl SourceDocument {
    /// Open a document from raw bytes
    pub fn open(bytes: &[u8]) -> Result<Self> {
        Self::open_as(DocumentId::default(), bytes)
    }

    /// Open a document under an explicit id
    ///
    /// Documents appended into the same [`DocumentBuilder`] must have distinct ids.
    pub fn open_as(id: DocumentId, bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes).map_err(Error::Decode)?;
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

        debug!(document = %id, pages = page_ids.len(), "opened source document");

        Ok(Self { id, doc, page_ids })
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Handle for the page at a 0-based index
    pub fn page(&self, index: PageIndex) -> Option<PageRef> {
        let object_id = *self.page_ids.get(index.0)?;

        Some(PageRef {
            document: self.id,
            index,
            rotation: page_rotation(&self.doc, object_id),
            object_id,
            contents: self.doc.get_page_contents(object_id),
            media_box: page_media_box(&self.doc, object_id),
        })
    }

    /// All pages in document order
    pub fn pages(&self) -> impl Iterator<Item = PageRef> + '_ {
        (0..self.page_count()).filter_map(|i| self.page(PageIndex(i)))
    }

    /// The page's content streams, decompressed and concatenated
    pub fn page_content(&self, page: &PageRef) -> Result<Vec<u8>> {
        Ok(self.doc.get_page_content(page.object_id)?)
    }

    /// Text of a single page as extracted by lopdf
    pub fn page_text(&self, page: &PageRef) -> Result<String> {
        Ok(self.doc.extract_text(&[page.number().0])?)
    }

    /// Title and Author from the Info dictionary, when present
    pub(crate) fn info_string(&self, key: &[u8]) -> Option<String> {
        let info = resolve(&self.doc, self.doc.trailer.get(b"Info").ok()?);
        let Object::Dictionary(info) = info else {
            return None;
        };
        lopdf::decode_text_string(resolve(&self.doc, info.get(key).ok()?)).ok()
    }
}

/// Handle to a page placed in a [`DocumentBuilder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputPage(pub(crate) ObjectId);

/// Accumulates pages for a new document
pub struct DocumentBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    offsets: HashMap<DocumentId, u32>,
    placed: HashSet<ObjectId>,
    source_tree: HashSet<ObjectId>,
    pub(crate) stamp_font: Option<ObjectId>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        Self {
            doc,
            pages_id,
            kids: Vec::new(),
            offsets: HashMap::new(),
            placed: HashSet::new(),
            source_tree: HashSet::new(),
            stamp_font: None,
        }
    }

    /// Number of pages appended so far
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append a copy of `page` as the next page of the output
    ///
    /// The copy carries its inherited attributes (MediaBox, Resources,
    /// Rotate, CropBox) directly, so it renders the same under the new
    /// page tree. Appending the same source page twice yields two
    /// independent page objects.
    pub fn append_page(&mut self, source: &SourceDocument, page: &PageRef) -> Result<OutputPage> {
        if page.document != source.id {
            return Err(Error::ForeignPage {
                page_document: page.document.0,
                source_document: source.id.0,
            });
        }

        let offset = self.import(source)?;
        let imported_id = shift_id(page.object_id, offset).ok_or(Error::ObjectIdOverflow {
            document: source.id.0,
        })?;

        let mut page_dict = self.doc.get_dictionary(imported_id)?.clone();
        for key in INHERITABLE_KEYS {
            if !page_dict.has(key) {
                if let Some(value) = inherited_attribute(&self.doc, imported_id, key) {
                    page_dict.set(key.to_vec(), value.clone());
                }
            }
        }
        page_dict.set("Parent", Object::Reference(self.pages_id));

        // First placement keeps the imported id so annotations pointing at
        // the page stay valid; repeats get a fresh object and their own
        // annotations.
        let page_id = if self.placed.insert(imported_id) {
            imported_id
        } else {
            let page_id = self.doc.new_object_id();
            self.copy_annotations(&mut page_dict, page_id);
            page_id
        };
        self.doc.objects.insert(page_id, Object::Dictionary(page_dict));
        self.kids.push(page_id);

        debug!(
            document = %source.id,
            page = %page.number(),
            output_page = self.kids.len(),
            "appended page"
        );

        Ok(OutputPage(page_id))
    }

    /// Finish the page tree and write the document
    ///
    /// No Info dictionary or file ID is written, so identical input always
    /// serializes to identical bytes.
    pub fn serialize(mut self) -> Result<Vec<u8>> {
        let kids: Vec<Object> = self.kids.iter().map(|&id| Object::Reference(id)).collect();

        let mut pages_object = Dictionary::new();
        pages_object.set("Type", Object::Name(b"Pages".to_vec()));
        pages_object.set("Count", Object::Integer(self.kids.len() as i64));
        pages_object.set("Kids", Object::Array(kids));
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages_object));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(self.pages_id));
        let catalog_id = self.doc.add_object(Object::Dictionary(catalog));
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        // Unplaced pages and old page tree nodes are blanked, so a link or
        // outline entry pointing at them cannot keep their content alive.
        let kept: HashSet<ObjectId> = self.kids.iter().copied().collect();
        let mut blanked = 0;
        for id in &self.source_tree {
            if !kept.contains(id) {
                self.doc.objects.insert(*id, Object::Null);
                blanked += 1;
            }
        }

        let pruned = self.doc.prune_objects();
        self.doc.renumber_objects();
        self.doc.compress();

        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer)?;

        debug!(
            pages = self.kids.len(),
            blanked,
            pruned = pruned.len(),
            bytes = buffer.len(),
            "serialized document"
        );

        Ok(buffer)
    }

    /// MediaBox of a page already placed in the builder
    pub fn page_box(&self, page: OutputPage) -> PageBox {
        page_media_box(&self.doc, page.0)
    }

    /// Current rotation of a page already placed in the builder
    pub fn page_rotation(&self, page: OutputPage) -> Rotation {
        page_rotation(&self.doc, page.0)
    }

    pub(crate) fn document(&self) -> &Document {
        &self.doc
    }

    pub(crate) fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Import every object of `source` once, returning its id offset
    fn import(&mut self, source: &SourceDocument) -> Result<u32> {
        if let Some(&offset) = self.offsets.get(&source.id) {
            return Ok(offset);
        }

        let overflow = || Error::ObjectIdOverflow {
            document: source.id.0,
        };

        let offset = self.doc.max_id;
        let source_max = source
            .doc
            .objects
            .keys()
            .map(|&(number, _)| number)
            .max()
            .unwrap_or(0)
            .max(source.doc.max_id);
        let max_id = offset.checked_add(source_max).ok_or_else(overflow)?;

        for (&id, object) in source.doc.objects.iter() {
            let shifted = shift_id(id, offset).ok_or_else(overflow)?;
            let object = offset_references(object, offset).ok_or_else(overflow)?;
            if is_page_tree_node(&object) {
                self.source_tree.insert(shifted);
            }
            self.doc.objects.insert(shifted, object);
        }
        for &page_id in &source.page_ids {
            self.source_tree.insert(shift_id(page_id, offset).ok_or_else(overflow)?);
        }

        self.doc.max_id = max_id;
        self.offsets.insert(source.id, offset);

        debug!(document = %source.id, offset, objects = source.doc.objects.len(), "imported objects");

        Ok(offset)
    }

    /// Give a repeated page its own annotation objects, each pointing back at it
    fn copy_annotations(&mut self, page_dict: &mut Dictionary, page_id: ObjectId) {
        let annotations = match page_dict.get(b"Annots").map(|annots| resolve(&self.doc, annots)) {
            Ok(Object::Array(items)) => items.clone(),
            _ => return,
        };

        let mut copies = Vec::with_capacity(annotations.len());
        for annotation in &annotations {
            let mut dict = match resolve(&self.doc, annotation) {
                Object::Dictionary(dict) => dict.clone(),
                other => {
                    copies.push(other.clone());
                    continue;
                }
            };
            dict.set("P", Object::Reference(page_id));
            copies.push(Object::Reference(self.doc.add_object(dict)));
        }

        page_dict.set("Annots", Object::Array(copies));
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shift every object reference inside `object` by `offset`
///
/// `None` when a shifted object number would overflow.
fn offset_references(object: &Object, offset: u32) -> Option<Object> {
    let shifted = match object {
        Object::Reference(id) => Object::Reference(shift_id(*id, offset)?),
        Object::Array(items) => Object::Array(
            items
                .iter()
                .map(|item| offset_references(item, offset))
                .collect::<Option<_>>()?,
        ),
        Object::Dictionary(dict) => Object::Dictionary(offset_dictionary(dict, offset)?),
        Object::Stream(stream) => {
            let mut stream = stream.clone();
            stream.dict = offset_dictionary(&stream.dict, offset)?;
            Object::Stream(stream)
        }
        _ => object.clone(),
    };
    Some(shifted)
}

fn offset_dictionary(dict: &Dictionary, offset: u32) -> Option<Dictionary> {
    let mut shifted = Dictionary::new();
    for (key, value) in dict.iter() {
        shifted.set(key.clone(), offset_references(value, offset)?);
    }
    Some(shifted)
}

fn shift_id((number, generation): ObjectId, offset: u32) -> Option<ObjectId> {
    Some((number.checked_add(offset)?, generation))
}

fn is_page_tree_node(object: &Object) -> bool {
    let Object::Dictionary(dict) = object else {
        return false;
    };
    matches!(
        dict.get(b"Type"),
        Ok(Object::Name(name)) if name.as_slice() == b"Page" || name.as_slice() == b"Pages"
    )
}

/// Follow a single indirect reference, returning the object itself otherwise
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

/// Look up `key` on the page or the nearest ancestor that defines it
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }

    None
}

/// Effective /Rotate of a page, normalized to `0..360`
pub(crate) fn page_rotation(doc: &Document, page_id: ObjectId) -> Rotation {
    inherited_attribute(doc, page_id, b"Rotate")
        .map(|value| resolve(doc, value))
        .and_then(as_number)
        .map(|degrees| Rotation::from_degrees(degrees.round() as i64))
        .unwrap_or_default()
}

/// Effective /MediaBox of a page, US Letter when absent or malformed
pub(crate) fn page_media_box(doc: &Document, page_id: ObjectId) -> PageBox {
    let Some(Object::Array(corners)) =
        inherited_attribute(doc, page_id, b"MediaBox").map(|value| resolve(doc, value))
    else {
        return PageBox::letter();
    };

    let numbers: Vec<f32> = corners
        .iter()
        .filter_map(|corner| as_number(resolve(doc, corner)))
        .collect();

    match numbers.as_slice() {
        [llx, lly, urx, ury] => PageBox::from_corners(*llx, *lly, *urx, *ury),
        _ => PageBox::letter(),
    }
}

fn as_number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value),
        _ => None,
    }
}
