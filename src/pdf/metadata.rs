//! PDF metadata extraction

use super::codec::SourceDocument;
use super::page::{PageNumber, Rotation};
use crate::error::Result;
use crate::layout::PageBox;

/// Size and orientation of one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageSummary {
    pub number: PageNumber,
    pub media_box: PageBox,
    pub rotation: Rotation,
}

/// PDF metadata
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
    /// Per-page geometry in page order
    pub pages: Vec<PageSummary>,
}

/// Extract metadata from PDF bytes
pub fn inspect(bytes: &[u8]) -> Result<DocumentInfo> {
    let document = SourceDocument::open(bytes)?;

    let pages = document
        .pages()
        .map(|page| PageSummary {
            number: page.number(),
            media_box: page.media_box(),
            rotation: page.rotation(),
        })
        .collect();

    Ok(DocumentInfo {
        page_count: document.page_count(),
        title: document.info_string(b"Title"),
        author: document.info_string(b"Author"),
        pages,
    })
}

/// Count the number of pages in a PDF
pub fn count_pages(bytes: &[u8]) -> Result<usize> {
    Ok(SourceDocument::open(bytes)?.page_count())
}
