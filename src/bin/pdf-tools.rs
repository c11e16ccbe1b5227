//! PDF Tools CLI
//!
//! A command-line tool for extracting, merging, rotating, deleting and
//! numbering PDF pages.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pdf_tools::pdf::{
    inspect, parse_degrees, parse_page_list, parse_page_number, AssemblerOptions, DocumentAssembler,
    IndexingPolicy, NumberingMethod, OutputSpec, PageNumber, StampPosition, TextCollector,
};
use pdf_tools::storage::{expand_globs, read_input, write_output};

/// PDF Tools - Page-level PDF manipulation
#[derive(Parser)]
#[command(name = "pdf-tools")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Keep pages 2 to 4
    pdf-tools extract report.pdf --start 2 --end 4 -o excerpt.pdf

    # Merge chapters in order
    pdf-tools merge -o book.pdf cover.pdf \"chapter-*.pdf\"

    # Number pages at the bottom right
    pdf-tools number book.pdf --method simple --position right -o numbered.pdf

    # Dump text to stdout
    pdf-tools text book.pdf")]
struct Cli {
    /// Reject page numbers outside the document instead of skipping them
    #[arg(long, global = true)]
    strict: bool,

    /// Log every page decision
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract an inclusive page range
    Extract {
        /// Input PDF file
        input: PathBuf,

        /// First page to keep (1-based)
        #[arg(long, value_parser = parse_page_number)]
        start: PageNumber,

        /// Last page to keep (1-based, inclusive)
        #[arg(long, value_parser = parse_page_number)]
        end: PageNumber,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Extract a list of pages in the given order
    Pages {
        /// Input PDF file
        input: PathBuf,

        /// Pages and ranges, e.g. "3,1,5-7"
        #[arg(long)]
        pages: String,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Merge multiple PDF files into one
    Merge {
        /// Input PDF files (in order). Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Rotate every page
    Rotate {
        /// Input PDF file
        input: PathBuf,

        /// Clockwise degrees; negative values turn counter-clockwise
        #[arg(long, allow_hyphen_values = true, value_parser = parse_degrees)]
        degrees: i64,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Remove a single page
    Delete {
        /// Input PDF file
        input: PathBuf,

        /// Page to remove (1-based)
        #[arg(long, value_parser = parse_page_number)]
        page: PageNumber,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Stamp page numbers at the bottom of every page
    Number {
        /// Input PDF file
        input: PathBuf,

        /// Label format: simple ("Page i of N"), detailed ("i") or classic ("Page i")
        #[arg(long, default_value = "classic")]
        method: NumberingMethod,

        /// Horizontal placement: left, middle or right
        #[arg(long, default_value = "left")]
        position: StampPosition,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Extract the text of every page
    Text {
        /// Input PDF file
        input: PathBuf,

        /// Write the text to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = AssemblerOptions {
        indexing: if cli.strict {
            IndexingPolicy::Strict
        } else {
            IndexingPolicy::Lenient
        },
    };

    if let Err(e) = run(cli.command, options) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "pdf_tools=debug" } else { "pdf_tools=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands, options: AssemblerOptions) -> Result<()> {
    let assembler = DocumentAssembler::new(options);

    match command {
        Commands::Extract { input, start, end, output } => {
            cmd_single(&assembler, &input, &output, OutputSpec::ExtractRange { start, end })
        }
        Commands::Pages { input, pages, output } => {
            let pages = parse_page_list(&pages).context("Invalid --pages")?;
            cmd_single(&assembler, &input, &output, OutputSpec::ExtractPages { pages })
        }
        Commands::Merge { inputs, output } => cmd_merge(&assembler, &inputs, &output),
        Commands::Rotate { input, degrees, output } => {
            cmd_single(&assembler, &input, &output, OutputSpec::Rotate { degrees })
        }
        Commands::Delete { input, page, output } => {
            cmd_single(&assembler, &input, &output, OutputSpec::DeletePage { page })
        }
        Commands::Number { input, method, position, output } => {
            cmd_single(&assembler, &input, &output, OutputSpec::Number { method, position })
        }
        Commands::Text { input, output } => cmd_text(&input, output.as_deref()),
        Commands::Info { input } => cmd_info(&input),
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    read_input(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    write_output(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

/// Run a single-document operation from `input` to `output`
fn cmd_single(assembler: &DocumentAssembler, input: &Path, output: &Path, spec: OutputSpec) -> Result<()> {
    let bytes = read(input)?;
    let result = assembler
        .run(&spec, &[bytes.as_slice()])
        .with_context(|| format!("{} failed on {}", spec.name(), input.display()))?;

    write(output, &result)?;
    info!(output = %output.display(), "wrote {}", spec.name());
    Ok(())
}

/// Merge multiple PDFs into one
fn cmd_merge(assembler: &DocumentAssembler, inputs: &[String], output: &Path) -> Result<()> {
    let paths = expand_globs(inputs)?;
    info!(count = paths.len(), "merging PDF files");

    let buffers = paths.iter().map(|path| read(path)).collect::<Result<Vec<_>>>()?;
    let slices: Vec<&[u8]> = buffers.iter().map(Vec::as_slice).collect();

    let result = assembler.merge(&slices).context("Merge failed")?;
    write(output, &result)?;
    info!(output = %output.display(), "merged");
    Ok(())
}

fn cmd_text(input: &Path, output: Option<&Path>) -> Result<()> {
    let bytes = read(input)?;
    let text = TextCollector::new()
        .collect_text_from_bytes(&bytes)
        .with_context(|| format!("Failed to extract text from {}", input.display()))?;

    match output {
        Some(path) => write(path, text.as_bytes()),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}

/// Show PDF information
fn cmd_info(input: &Path) -> Result<()> {
    let bytes = read(input)?;
    let info = inspect(&bytes).with_context(|| format!("Failed to inspect {}", input.display()))?;

    println!("File: {}", input.display());
    println!("Pages: {}", info.page_count);
    if let Some(title) = &info.title {
        println!("Title: {}", title);
    }
    if let Some(author) = &info.author {
        println!("Author: {}", author);
    }
    for page in &info.pages {
        println!(
            "  Page {}: {:.2} x {:.2} pt, rotated {}",
            page.number, page.media_box.width, page.media_box.height, page.rotation
        );
    }

    Ok(())
}
