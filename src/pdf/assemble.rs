//! Whole-document operations
//!
//! [`DocumentAssembler`] turns one or more source documents plus an
//! [`OutputSpec`] into the bytes of a new document. Every operation opens its
//! inputs afresh, builds a new page sequence and serializes it; sources are
//! never modified.
//!
//! Page numbers in an [`OutputSpec`] are 1-based. How numbers outside the
//! document are treated is decided by [`IndexingPolicy`].

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use tracing::{info, warn};

use super::codec::{DocumentBuilder, SourceDocument};
use super::page::{DocumentId, PageIndex, PageNumber, Rotation};
use super::stamp::{StampPosition, StampRenderer};
use super::transform::PageTransformer;
use crate::error::{Error, Result};

/// Treatment of page numbers that do not exist in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexingPolicy {
    /// Clip ranges, skip unknown pages, ignore a missing delete target
    #[default]
    Lenient,
    /// Reject any page number outside `1..=page_count`
    Strict,
}

/// Label format for page numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberingMethod {
    /// "Page i of N"
    Simple,
    /// "i"
    Detailed,
    /// "Page i"
    #[default]
    Classic,
}

impl NumberingMethod {
    pub fn label(self, page: PageNumber, total: usize) -> String {
        match self {
            Self::Simple => format!("Page {} of {}", page, total),
            Self::Detailed => page.to_string(),
            Self::Classic => format!("Page {}", page),
        }
    }
}

/// Unknown names fall back to [`NumberingMethod::Classic`]
impl FromStr for NumberingMethod {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Self::Simple,
            "detailed" => Self::Detailed,
            _ => Self::Classic,
        })
    }
}

impl fmt::Display for NumberingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Simple => "simple",
            Self::Detailed => "detailed",
            Self::Classic => "classic",
        };
        f.write_str(name)
    }
}

/// What to produce from the input documents
#[derive(Debug, Clone, PartialEq)]
pub enum OutputSpec {
    /// Pages `start..=end` of a single document
    ExtractRange { start: PageNumber, end: PageNumber },
    /// The listed pages of a single document, in list order
    ExtractPages { pages: Vec<PageNumber> },
    /// All pages of every input, inputs in the order supplied
    Merge,
    /// Every page turned by `degrees` (any integer, normalized mod 360)
    Rotate { degrees: i64 },
    /// Every page except `page`
    DeletePage { page: PageNumber },
    /// Every page stamped with its number
    Number {
        method: NumberingMethod,
        position: StampPosition,
    },
}

impl OutputSpec {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExtractRange { .. } => "extract-range",
            Self::ExtractPages { .. } => "extract-pages",
            Self::Merge => "merge",
            Self::Rotate { .. } => "rotate",
            Self::DeletePage { .. } => "delete-page",
            Self::Number { .. } => "number",
        }
    }
}

/// Options shared by every operation
#[derive(Debug, Clone, Copy, Default)]
pub struct AssemblerOptions {
    pub indexing: IndexingPolicy,
}

/// Runs [`OutputSpec`]s against source documents
#[derive(Debug, Clone, Default)]
pub struct DocumentAssembler {
    options: AssemblerOptions,
    renderer: StampRenderer,
    transformer: PageTransformer,
}

impl DocumentAssembler {
    pub fn new(options: AssemblerOptions) -> Self {
        Self {
            options,
            renderer: StampRenderer::new(),
            transformer: PageTransformer::new(),
        }
    }

    pub fn options(&self) -> AssemblerOptions {
        self.options
    }

    /// Run `spec` over `inputs`
    ///
    /// `Merge` takes any non-zero number of inputs; every other operation
    /// takes exactly one.
    pub fn run(&self, spec: &OutputSpec, inputs: &[&[u8]]) -> Result<Vec<u8>> {
        if let OutputSpec::Merge = spec {
            return self.merge(inputs);
        }

        let bytes = match inputs {
            [bytes] => *bytes,
            _ => {
                return Err(Error::InputCount {
                    expected: 1,
                    actual: inputs.len(),
                })
            }
        };

        match spec {
            OutputSpec::ExtractRange { start, end } => self.extract_range(bytes, *start, *end),
            OutputSpec::ExtractPages { pages } => self.extract_pages(bytes, pages),
            OutputSpec::Rotate { degrees } => self.rotate(bytes, *degrees),
            OutputSpec::DeletePage { page } => self.delete_page(bytes, *page),
            OutputSpec::Number { method, position } => self.number_pages(bytes, *method, *position),
            OutputSpec::Merge => self.merge(inputs),
        }
    }

    /// Pages `start..=end`, clipped to the document under lenient indexing
    pub fn extract_range(&self, bytes: &[u8], start: PageNumber, end: PageNumber) -> Result<Vec<u8>> {
        let source = SourceDocument::open(bytes)?;
        let page_count = source.page_count();

        if self.strict() {
            for number in [start, end] {
                ensure_within(number, page_count)?;
            }
            if start > end {
                return Err(Error::Range(format!("range {}-{} runs backwards", start, end)));
            }
        }

        let first = start.0.max(1);
        let last = end.0.min(page_count_u32(page_count));
        if first > last {
            warn!(%start, %end, page_count, "range selects no pages, output will be empty");
        } else if first != start.0 || last != end.0 {
            warn!(%start, %end, first, last, "range clipped to document");
        }

        let indices = (first..=last).filter_map(|n| PageNumber(n).to_index());

        let mut builder = DocumentBuilder::new();
        copy_pages(&mut builder, &source, indices)?;
        self.finish("extract-range", page_count, builder)
    }

    /// The listed pages in list order; duplicates are kept
    pub fn extract_pages(&self, bytes: &[u8], pages: &[PageNumber]) -> Result<Vec<u8>> {
        let source = SourceDocument::open(bytes)?;
        let page_count = source.page_count();

        let mut indices = Vec::with_capacity(pages.len());
        for &number in pages {
            match number.to_index().filter(|_| number.within(page_count)) {
                Some(index) => indices.push(index),
                None if self.strict() => {
                    return Err(Error::PageOutOfRange {
                        number: number.0,
                        page_count,
                    })
                }
                None => warn!(page = %number, page_count, "skipping page outside document"),
            }
        }

        let mut builder = DocumentBuilder::new();
        copy_pages(&mut builder, &source, indices)?;
        self.finish("extract-pages", page_count, builder)
    }

    /// Concatenate every input's pages, inputs in the order given
    pub fn merge(&self, inputs: &[&[u8]]) -> Result<Vec<u8>> {
        if inputs.is_empty() {
            return Err(Error::NoInputs);
        }

        // Open everything first so a bad input fails before any work is done
        let sources = inputs
            .iter()
            .enumerate()
            .map(|(i, bytes)| SourceDocument::open_as(DocumentId(i), bytes))
            .collect::<Result<Vec<_>>>()?;

        let mut builder = DocumentBuilder::new();
        let mut total = 0;
        for source in &sources {
            total += source.page_count();
            copy_pages(&mut builder, source, (0..source.page_count()).map(PageIndex))?;
        }

        self.finish("merge", total, builder)
    }

    /// Turn every page by `degrees`
    pub fn rotate(&self, bytes: &[u8], degrees: i64) -> Result<Vec<u8>> {
        let source = SourceDocument::open(bytes)?;
        let rotation = Rotation::from_degrees(degrees);
        if !rotation.is_quarter_turn() {
            warn!(degrees, %rotation, "rotation is not a multiple of 90, viewers may ignore it");
        }

        let mut builder = DocumentBuilder::new();
        for page in source.pages() {
            let placed = builder.append_page(&source, &page)?;
            self.transformer.apply_rotation(&mut builder, placed, rotation)?;
        }

        self.finish("rotate", source.page_count(), builder)
    }

    /// Every page except `page`
    pub fn delete_page(&self, bytes: &[u8], page: PageNumber) -> Result<Vec<u8>> {
        let source = SourceDocument::open(bytes)?;
        let page_count = source.page_count();

        let target = page.to_index().filter(|_| page.within(page_count));
        if target.is_none() {
            if self.strict() {
                return Err(Error::PageOutOfRange {
                    number: page.0,
                    page_count,
                });
            }
            warn!(%page, page_count, "page to delete does not exist, keeping every page");
        }

        let indices = (0..page_count).map(PageIndex).filter(|&i| Some(i) != target);

        let mut builder = DocumentBuilder::new();
        copy_pages(&mut builder, &source, indices)?;
        self.finish("delete-page", page_count, builder)
    }

    /// Stamp every page with a label produced by `method`
    pub fn number_pages(
        &self,
        bytes: &[u8],
        method: NumberingMethod,
        position: StampPosition,
    ) -> Result<Vec<u8>> {
        let source = SourceDocument::open(bytes)?;
        let total = source.page_count();

        let mut builder = DocumentBuilder::new();
        for page in source.pages() {
            let placed = builder.append_page(&source, &page)?;
            let label = method.label(page.number(), total);
            let overlay = self.renderer.render(&label, position, builder.page_box(placed));
            self.transformer.apply_overlay(&mut builder, placed, overlay)?;
        }

        self.finish("number", total, builder)
    }

    fn strict(&self) -> bool {
        self.options.indexing == IndexingPolicy::Strict
    }

    fn finish(&self, operation: &str, pages_in: usize, builder: DocumentBuilder) -> Result<Vec<u8>> {
        let pages_out = builder.page_count();
        let bytes = builder.serialize()?;
        info!(operation, pages_in, pages_out, bytes = bytes.len(), "operation complete");
        Ok(bytes)
    }
}

fn copy_pages(
    builder: &mut DocumentBuilder,
    source: &SourceDocument,
    indices: impl IntoIterator<Item = PageIndex>,
) -> Result<()> {
    for index in indices {
        if let Some(page) = source.page(index) {
            builder.append_page(source, &page)?;
        }
    }
    Ok(())
}

fn ensure_within(number: PageNumber, page_count: usize) -> Result<()> {
    if number.within(page_count) {
        Ok(())
    } else {
        Err(Error::PageOutOfRange {
            number: number.0,
            page_count,
        })
    }
}

fn page_count_u32(page_count: usize) -> u32 {
    u32::try_from(page_count).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::Fixture;
    use crate::pdf::text::TextCollector;
    use pretty_assertions::assert_eq;

    fn lenient() -> DocumentAssembler {
        DocumentAssembler::default()
    }

    fn strict() -> DocumentAssembler {
        DocumentAssembler::new(AssemblerOptions {
            indexing: IndexingPolicy::Strict,
        })
    }

    fn page_texts(bytes: &[u8]) -> Vec<String> {
        let document = SourceDocument::open(bytes).unwrap();
        document
            .pages()
            .map(|page| document.page_text(&page).unwrap().trim().to_string())
            .collect()
    }

    #[test]
    fn test_labels() {
        assert_eq!(NumberingMethod::Simple.label(PageNumber(2), 3), "Page 2 of 3");
        assert_eq!(NumberingMethod::Detailed.label(PageNumber(2), 3), "2");
        assert_eq!(NumberingMethod::Classic.label(PageNumber(2), 3), "Page 2");
    }

    #[test]
    fn test_unknown_method_is_classic() {
        assert_eq!("fancy".parse::<NumberingMethod>().unwrap(), NumberingMethod::Classic);
        assert_eq!("SIMPLE".parse::<NumberingMethod>().unwrap(), NumberingMethod::Simple);
    }

    #[test]
    fn test_extract_range_inclusive() {
        let bytes = Fixture::numbered(5).build();
        let out = lenient().extract_range(&bytes, PageNumber(2), PageNumber(4)).unwrap();
        assert_eq!(page_texts(&out), vec!["Page 2", "Page 3", "Page 4"]);
    }

    #[test]
    fn test_extract_range_clips_end() {
        let bytes = Fixture::numbered(3).build();
        let out = lenient().extract_range(&bytes, PageNumber(0), PageNumber(10)).unwrap();
        assert_eq!(page_texts(&out), vec!["Page 1", "Page 2", "Page 3"]);
    }

    #[test]
    fn test_extract_range_past_end_is_empty() {
        let bytes = Fixture::numbered(3).build();
        let out = lenient().extract_range(&bytes, PageNumber(4), PageNumber(9)).unwrap();
        assert_eq!(SourceDocument::open(&out).unwrap().page_count(), 0);
    }

    #[test]
    fn test_extract_range_strict_rejects_overflow() {
        let bytes = Fixture::numbered(3).build();
        let result = strict().extract_range(&bytes, PageNumber(2), PageNumber(4));
        assert!(matches!(
            result,
            Err(Error::PageOutOfRange { number: 4, page_count: 3 })
        ));
    }

    #[test]
    fn test_extract_pages_in_list_order() {
        let bytes = Fixture::numbered(4).build();
        let pages = [PageNumber(4), PageNumber(1), PageNumber(9), PageNumber(1)];
        let out = lenient().extract_pages(&bytes, &pages).unwrap();
        assert_eq!(page_texts(&out), vec!["Page 4", "Page 1", "Page 1"]);

        let result = strict().extract_pages(&bytes, &pages);
        assert!(matches!(result, Err(Error::PageOutOfRange { number: 9, .. })));
    }

    #[test]
    fn test_merge_concatenates_in_order() {
        let a = Fixture::with_texts(vec!["a1".into(), "a2".into()]).build();
        let b = Fixture::with_texts(vec!["b1".into()]).build();
        let out = lenient().merge(&[a.as_slice(), b.as_slice(), a.as_slice()]).unwrap();
        assert_eq!(page_texts(&out), vec!["a1", "a2", "b1", "a1", "a2"]);
    }

    #[test]
    fn test_merge_requires_inputs() {
        assert!(matches!(lenient().merge(&[]), Err(Error::NoInputs)));
    }

    #[test]
    fn test_merge_fails_on_bad_input() {
        let a = Fixture::numbered(1).build();
        let result = lenient().merge(&[a.as_slice(), b"garbage".as_slice()]);
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_rotate_normalizes_negative() {
        let mut fixture = Fixture::numbered(2);
        fixture.page_rotate[1] = Some(90);
        let out = lenient().rotate(&fixture.build(), -90).unwrap();

        let rotations: Vec<u16> = SourceDocument::open(&out)
            .unwrap()
            .pages()
            .map(|page| page.rotation().degrees())
            .collect();
        assert_eq!(rotations, vec![270, 0]);
    }

    #[test]
    fn test_delete_page() {
        let bytes = Fixture::numbered(4).build();
        let out = lenient().delete_page(&bytes, PageNumber(2)).unwrap();
        assert_eq!(page_texts(&out), vec!["Page 1", "Page 3", "Page 4"]);
    }

    #[test]
    fn test_delete_missing_page_keeps_all() {
        let bytes = Fixture::numbered(3).build();
        for page in [PageNumber(0), PageNumber(4)] {
            let out = lenient().delete_page(&bytes, page).unwrap();
            assert_eq!(SourceDocument::open(&out).unwrap().page_count(), 3);
            assert!(matches!(
                strict().delete_page(&bytes, page),
                Err(Error::PageOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn test_number_pages_simple() {
        let bytes = Fixture::numbered(3).build();
        let out = lenient()
            .number_pages(&bytes, NumberingMethod::Simple, StampPosition::Left)
            .unwrap();

        let texts = page_texts(&out);
        assert_eq!(texts.len(), 3);
        for (i, text) in texts.iter().enumerate() {
            assert!(text.contains(&format!("Page {}", i + 1)));
            assert!(text.contains(&format!("Page {} of 3", i + 1)));
        }
    }

    #[test]
    fn test_run_dispatches_and_checks_input_count() {
        let bytes = Fixture::numbered(2).build();
        let assembler = lenient();

        let out = assembler
            .run(&OutputSpec::DeletePage { page: PageNumber(1) }, &[bytes.as_slice()])
            .unwrap();
        assert_eq!(page_texts(&out), vec!["Page 2"]);

        let result = assembler.run(&OutputSpec::Rotate { degrees: 90 }, &[bytes.as_slice(), bytes.as_slice()]);
        assert!(matches!(result, Err(Error::InputCount { expected: 1, actual: 2 })));
    }

    #[test]
    fn test_rotation_keeps_text() {
        let bytes = Fixture::numbered(3).build();
        let out = lenient().rotate(&bytes, 90).unwrap();
        let collector = TextCollector::new();
        assert_eq!(
            collector.collect_text_from_bytes(&out).unwrap(),
            collector.collect_text_from_bytes(&bytes).unwrap()
        );
    }
}
