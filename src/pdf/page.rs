//! Page handles and page indexing types
//!
//! User-facing page numbers are 1-based ([`PageNumber`]) while the codec
//! addresses pages by 0-based position ([`PageIndex`]). The two are distinct
//! types so a conversion has to be spelled out at every boundary.

use std::fmt;
use std::str::FromStr;

use lopdf::ObjectId;

use crate::error::{Error, Result};
use crate::layout::PageBox;

/// Identifies one source document within an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DocumentId(pub usize);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 1-based page number as entered by a user
///
/// Zero is representable so that lenient indexing can clip it; it never
/// converts to a [`PageIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageNumber(pub u32);

impl PageNumber {
    /// The 0-based index for this page, or `None` for page 0
    pub fn to_index(self) -> Option<PageIndex> {
        self.0.checked_sub(1).map(|i| PageIndex(i as usize))
    }

    /// Whether this page exists in a document of `page_count` pages
    pub fn within(self, page_count: usize) -> bool {
        self.0 >= 1 && (self.0 as usize) <= page_count
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PageNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_page_number(s)
    }
}

/// 0-based page position as used by the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageIndex(pub usize);

impl PageIndex {
    /// The 1-based page number for this index
    pub fn to_number(self) -> PageNumber {
        PageNumber(self.0 as u32 + 1)
    }
}

/// Page rotation in degrees, always in `0..360`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rotation(u16);

impl Rotation {
    /// Normalize any integer number of degrees, negative values included
    pub fn from_degrees(degrees: i64) -> Self {
        Self(degrees.rem_euclid(360) as u16)
    }

    pub fn degrees(self) -> u16 {
        self.0
    }

    /// Rotation after additionally turning by `other`
    pub fn compose(self, other: Rotation) -> Rotation {
        Rotation((self.0 + other.0) % 360)
    }

    /// PDF viewers only honour quarter turns
    pub fn is_quarter_turn(self) -> bool {
        self.0 % 90 == 0
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// Immutable handle to one page of a [`SourceDocument`](super::codec::SourceDocument)
#[derive(Debug, Clone, PartialEq)]
pub struct PageRef {
    pub(crate) document: DocumentId,
    pub(crate) index: PageIndex,
    pub(crate) rotation: Rotation,
    pub(crate) object_id: ObjectId,
    pub(crate) contents: Vec<ObjectId>,
    pub(crate) media_box: PageBox,
}

impl PageRef {
    pub fn document(&self) -> DocumentId {
        self.document
    }

    pub fn index(&self) -> PageIndex {
        self.index
    }

    pub fn number(&self) -> PageNumber {
        self.index.to_number()
    }

    /// Effective rotation, including any value inherited from the page tree
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Object id of the page dictionary inside its source document
    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    /// Object ids of the page's content streams, in drawing order
    pub fn content_streams(&self) -> &[ObjectId] {
        &self.contents
    }

    pub fn media_box(&self) -> PageBox {
        self.media_box
    }
}

/// Parse a 1-based page number
pub fn parse_page_number(input: &str) -> Result<PageNumber> {
    let input = input.trim();
    input
        .parse::<u32>()
        .map(PageNumber)
        .map_err(|_| Error::Range(format!("'{}' is not a page number", input)))
}

/// Parse a rotation amount in degrees; any integer is accepted
pub fn parse_degrees(input: &str) -> Result<i64> {
    let input = input.trim();
    input
        .parse::<i64>()
        .map_err(|_| Error::Range(format!("'{}' is not a whole number of degrees", input)))
}

/// Longest list [`parse_page_list`] will expand
pub const MAX_LISTED_PAGES: usize = 100_000;

/// Parse a page list like "1-3, 5, 8-10" into page numbers
///
/// Order and duplicates are preserved: "3,1,1" selects page 3, then page 1 twice.
/// A list that would expand past [`MAX_LISTED_PAGES`] entries is a `Range` error.
pub fn parse_page_list(input: &str) -> Result<Vec<PageNumber>> {
    let mut pages = Vec::new();

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((start, end)) = part.split_once('-') {
            let start = parse_page_number(start)?;
            let end = parse_page_number(end)?;

            if start > end {
                return Err(Error::Range(format!("range {}-{} runs backwards", start, end)));
            }

            let span = (end.0 - start.0) as usize + 1;
            if pages.len() + span > MAX_LISTED_PAGES {
                return Err(list_too_long());
            }
            pages.extend((start.0..=end.0).map(PageNumber));
        } else {
            if pages.len() >= MAX_LISTED_PAGES {
                return Err(list_too_long());
            }
            pages.push(parse_page_number(part)?);
        }
    }

    Ok(pages)
}

fn list_too_long() -> Error {
    Error::Range(format!("page list expands to more than {} pages", MAX_LISTED_PAGES))
}
