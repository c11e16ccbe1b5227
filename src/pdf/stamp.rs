//! Page-number stamp rendering
//!
//! A stamp is a short label drawn near the bottom edge of a page. The
//! renderer produces an [`Overlay`]: a one-page content stream sized for the
//! target page, which [`PageTransformer`](super::transform::PageTransformer)
//! then merges on top of the page's own content.
//!
//! Horizontal anchors are fixed offsets, not measured text widths. A long
//! label can run past the page edge at `Right`, or drift off-centre at
//! `Middle`.

use std::fmt;
use std::str::FromStr;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, StringFormat};

use crate::error::{Error, Result};
use crate::layout::PageBox;

/// Resource name the stamp font is registered under on each page
pub const STAMP_FONT_NAME: &str = "PdfToolsStamp";

/// Font size for stamps, in points
pub const STAMP_FONT_SIZE: i64 = 10;

/// Distance of the text baseline from the bottom edge
const BOTTOM_MARGIN: f32 = 10.0;

/// Distance of a left-anchored label from the left edge
const LEFT_MARGIN: f32 = 10.0;

/// Offset from the right edge for a right-anchored label (approximate label width plus margin)
const RIGHT_OFFSET: f32 = 80.0;

/// Half of the approximate label width, used to centre middle-anchored labels
const HALF_LABEL_WIDTH: f32 = 20.0;

/// Where along the bottom edge a stamp is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StampPosition {
    #[default]
    Left,
    Middle,
    Right,
}

impl FromStr for StampPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "middle" | "center" | "centre" => Ok(Self::Middle),
            "right" => Ok(Self::Right),
            other => Err(Error::InvalidOption(format!(
                "unknown stamp position '{}' (expected left, middle or right)",
                other
            ))),
        }
    }
}

impl fmt::Display for StampPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Left => "left",
            Self::Middle => "middle",
            Self::Right => "right",
        };
        f.write_str(name)
    }
}

/// A rendered stamp, ready to be merged onto exactly one page
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    text: String,
    page_box: PageBox,
    x: f32,
    y: f32,
    content: Vec<u8>,
}

impl Overlay {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The page box the overlay was laid out against
    pub fn page_box(&self) -> PageBox {
        self.page_box
    }

    /// Baseline origin of the label in page coordinates
    pub fn origin(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Encoded content stream drawing the label
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub(crate) fn into_content(self) -> Vec<u8> {
        self.content
    }
}

/// Renders stamp labels with a fixed font and size
#[derive(Debug, Clone, Copy, Default)]
pub struct StampRenderer;

impl StampRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Lay out `text` at `position` on a page of the given size
    pub fn render(&self, text: &str, position: StampPosition, page_box: PageBox) -> Overlay {
        let x = page_box.x0
            + match position {
                StampPosition::Left => LEFT_MARGIN,
                StampPosition::Middle => page_box.width / 2.0 - HALF_LABEL_WIDTH,
                StampPosition::Right => page_box.width - RIGHT_OFFSET,
            };
        let y = page_box.y0 + BOTTOM_MARGIN;

        Overlay {
            text: text.to_string(),
            page_box,
            x,
            y,
            content: encode_label(text, x, y),
        }
    }
}

/// Font dictionary referenced by every stamp
pub(crate) fn stamp_font_dictionary() -> Dictionary {
    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    font
}

fn encode_label(text: &str, x: f32, y: f32) -> Vec<u8> {
    let operations = vec![
        Operation::new("q", vec![]),
        Operation::new("g", vec![Object::Integer(0)]),
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(STAMP_FONT_NAME.as_bytes().to_vec()),
                Object::Integer(STAMP_FONT_SIZE),
            ],
        ),
        Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
        Operation::new("Tj", vec![Object::String(latin1_bytes(text), StringFormat::Literal)]),
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
    ];

    let mut encoded = vec![b'\n'];
    encoded.extend(label_stream(operations));
    encoded
}

fn label_stream(operations: Vec<Operation>) -> Vec<u8> {
    // Only names, numbers and literal strings reach here; none fail to encode.
    Content { operations }.encode().unwrap_or_default()
}

/// WinAnsi-compatible bytes; characters outside Latin-1 become '?'
fn latin1_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
