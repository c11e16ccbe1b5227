//! Whole-document text extraction

use tracing::debug;

use super::codec::SourceDocument;
use crate::error::Result;

/// Joins per-page text in page order
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCollector;

impl TextCollector {
    pub fn new() -> Self {
        Self
    }

    /// Text of pages 1..N concatenated with no separator
    ///
    /// A page whose text cannot be extracted contributes nothing.
    pub fn collect_text(&self, document: &SourceDocument) -> String {
        let mut text = String::new();

        for page in document.pages() {
            match document.page_text(&page) {
                Ok(page_text) => text.push_str(&page_text),
                Err(e) => debug!(page = %page.number(), error = %e, "no extractable text"),
            }
        }

        text
    }

    /// Open `bytes` and collect its text
    pub fn collect_text_from_bytes(&self, bytes: &[u8]) -> Result<String> {
        let document = SourceDocument::open(bytes)?;
        Ok(self.collect_text(&document))
    }
}
