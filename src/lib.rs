//! PDF Tools Library
//!
//! Page-level manipulation of PDF documents held in memory.
//! This library provides functionality to:
//! - Extract a page range or an arbitrary list of pages
//! - Merge documents in order
//! - Rotate or delete pages
//! - Stamp page numbers onto every page
//! - Extract the text of a whole document
//!
//! Every operation takes PDF bytes and returns new PDF bytes; reading and
//! writing files is left to the caller (see [`storage`]).
//!
//! # Example
//!
//! ```no_run
//! use pdf_tools::pdf::{DocumentAssembler, OutputSpec, PageNumber};
//!
//! let input = std::fs::read("report.pdf").expect("Failed to read input");
//! let spec = OutputSpec::ExtractRange {
//!     start: PageNumber(2),
//!     end: PageNumber(4),
//! };
//!
//! let output = DocumentAssembler::default()
//!     .run(&spec, &[input.as_slice()])
//!     .expect("Failed to extract pages");
//! std::fs::write("excerpt.pdf", output).expect("Failed to write output");
//! ```

pub mod error;
pub mod layout;
pub mod pdf;
pub mod storage;

// Re-export commonly used items
pub use error::{Error, Result};
