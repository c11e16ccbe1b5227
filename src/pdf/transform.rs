//! Per-page transformations on pages placed in a [`DocumentBuilder`]

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use super::codec::{page_media_box, page_rotation, resolve, DocumentBuilder, OutputPage};
use super::page::Rotation;
use super::stamp::{stamp_font_dictionary, Overlay, STAMP_FONT_NAME};
use crate::error::{Error, Result};

/// Applies rotation and overlay composition to output pages
#[derive(Debug, Clone, Copy, Default)]
pub struct PageTransformer;

impl PageTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Turn a page by `degrees` on top of its current rotation
    ///
    /// Only the page's /Rotate attribute changes; its content stream is untouched.
    /// Returns the page's new rotation.
    pub fn apply_rotation(
        &self,
        builder: &mut DocumentBuilder,
        page: OutputPage,
        degrees: Rotation,
    ) -> Result<Rotation> {
        let current = page_rotation(builder.document(), page.0);
        let rotated = current.compose(degrees);

        let page_dict = builder.document_mut().get_dictionary_mut(page.0)?;
        page_dict.set("Rotate", Object::Integer(i64::from(rotated.degrees())));

        debug!(from = %current, to = %rotated, "rotated page");
        Ok(rotated)
    }

    /// Draw `overlay` on top of the page's existing content
    ///
    /// The existing content is wrapped in `q`/`Q` so any transformation it
    /// leaves behind cannot displace the stamp. The merge is permanent.
    pub fn apply_overlay(
        &self,
        builder: &mut DocumentBuilder,
        page: OutputPage,
        overlay: Overlay,
    ) -> Result<()> {
        let page_box = page_media_box(builder.document(), page.0);
        let overlay_box = overlay.page_box();
        if !overlay_box.same_size(&page_box) {
            return Err(Error::FormatMismatch {
                overlay_width: overlay_box.width,
                overlay_height: overlay_box.height,
                page_width: page_box.width,
                page_height: page_box.height,
            });
        }

        let font_id = stamp_font(builder);
        let doc = builder.document_mut();
        add_font_to_page_resources(doc, page.0, font_id)?;

        let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let restore_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
        let overlay_id = doc.add_object(Stream::new(Dictionary::new(), overlay.into_content()));

        let mut contents = vec![Object::Reference(save_id)];
        contents.extend(page_content_list(doc, page.0)?);
        contents.push(Object::Reference(restore_id));
        contents.push(Object::Reference(overlay_id));

        doc.get_dictionary_mut(page.0)?
            .set("Contents", Object::Array(contents));

        Ok(())
    }
}

/// Shared stamp font object, created on first use
fn stamp_font(builder: &mut DocumentBuilder) -> ObjectId {
    if let Some(font_id) = builder.stamp_font {
        return font_id;
    }
    let font_id = builder
        .document_mut()
        .add_object(Object::Dictionary(stamp_font_dictionary()));
    builder.stamp_font = Some(font_id);
    font_id
}

/// The page's content stream references as a flat list
///
/// /Contents may be a stream reference, an array of them, or a reference to
/// such an array.
fn page_content_list(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let page_dict = doc.get_dictionary(page_id)?;
    let Ok(contents) = page_dict.get(b"Contents") else {
        return Ok(Vec::new());
    };

    let list = match contents {
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Object::Array(items) => items.clone(),
        _ => Vec::new(),
    };
    Ok(list)
}

/// Register the stamp font in the page's own Resources dictionary
///
/// Resources shared with other pages through a reference are copied onto
/// the page first, so the other pages are left untouched.
fn add_font_to_page_resources(doc: &mut Document, page_id: ObjectId, font_id: ObjectId) -> Result<()> {
    let mut resources = {
        let page_dict = doc.get_dictionary(page_id)?;
        match page_dict.get(b"Resources").map(|res| resolve(doc, res)) {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        }
    };

    let mut fonts = match resources.get(b"Font").map(|fonts| resolve(doc, fonts)) {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };
    fonts.set(STAMP_FONT_NAME, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(resources));

    Ok(())
}
