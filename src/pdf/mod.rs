//! PDF page manipulation module

pub mod assemble;
pub mod codec;
pub mod metadata;
pub mod page;
pub mod stamp;
pub mod text;
pub mod transform;

#[cfg(test)]
mod fixtures;

// Re-export commonly used items
pub use assemble::{AssemblerOptions, DocumentAssembler, IndexingPolicy, NumberingMethod, OutputSpec};
pub use codec::{DocumentBuilder, OutputPage, SourceDocument};
pub use metadata::{count_pages, inspect, DocumentInfo, PageSummary};
pub use page::{parse_degrees, parse_page_list, parse_page_number, DocumentId, PageIndex, PageNumber, PageRef, Rotation};
pub use stamp::{Overlay, StampPosition, StampRenderer};
pub use text::TextCollector;
pub use transform::PageTransformer;
