//! CLI binary for edgequake-pdf2img.
//!
//! A thin shim over the library crate: it selects the input file, drives a
//! [`ConversionController`] with a terminal view, and writes the pages and/or
//! the ZIP into an output directory.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2img::state::pages_label;
use edgequake_pdf2img::{
    ArchiveCompression, ConversionConfig, ConversionController, ConversionState, ConverterView,
    DirectoryTarget, FailureKind, PdfiumRenderer, PreviewCard, SourceFile, StatusLine,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

/// Summary printed when a run completes, e.g. `"1 page converted"`.
fn done_line(pages: usize) -> String {
    format!("{} converted", pages_label(pages))
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── Terminal view using indicatif ────────────────────────────────────────────

/// Shows the controller's progress on stderr.
///
/// With a progress bar, the bar carries the status and every finished page
/// gets a log line above it. Without one, status lines are printed as they
/// change (unless `quiet`).
struct TerminalView {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl TerminalView {
    fn new(show_progress: bool, quiet: bool) -> Self {
        let bar = show_progress.then(|| {
            let bar = ProgressBar::new(0);
            let spinner_style =
                ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(TICKS);
            bar.set_style(spinner_style);
            bar.set_prefix("Preparing");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        Self { bar, quiet }
    }

    /// Switch to the full progress-bar style once the page count is known.
    fn activate_bar(bar: &ProgressBar, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        bar.set_length(total as u64);
        bar.set_style(progress_style);
        bar.set_prefix("Rendering");
        bar.reset_eta();
    }
}

impl ConverterView for TerminalView {
    fn on_state(&mut self, state: &ConversionState) {
        let Some(bar) = &self.bar else { return };
        match *state {
            ConversionState::Loading => bar.set_prefix("Reading"),
            ConversionState::Parsing => bar.set_prefix("Parsing"),
            ConversionState::Rendering { page: 1, total } => Self::activate_bar(bar, total),
            ConversionState::Rendering { page, .. } => bar.set_message(format!("page {page}")),
            ConversionState::Done { pages } => {
                bar.finish_and_clear();
                eprintln!("{} {}", green("✔"), bold(&done_line(pages)));
            }
            ConversionState::Failed(FailureKind::ConversionFailure)
            | ConversionState::Failed(FailureKind::ReadFailure)
            | ConversionState::Cancelled => bar.abandon(),
            _ => {}
        }
    }

    fn show_status(&mut self, status: &StatusLine) {
        match &self.bar {
            Some(bar) if !bar.is_finished() => bar.set_message(status.text.clone()),
            _ if self.quiet => {}
            _ if status.strong => eprintln!("{}", bold(&status.text)),
            _ => eprintln!("{}", dim(&status.text)),
        }
    }

    fn append_preview(&mut self, card: &PreviewCard) {
        let size = card.image.encoded_len();
        match &self.bar {
            Some(bar) => {
                bar.println(format!(
                    "  {} {:<8} {}",
                    green("✓"),
                    card.label,
                    dim(&format!("{:>8} bytes", size))
                ));
                bar.inc(1);
            }
            None if !self.quiet => {
                eprintln!("  {} {}", green("✓"), card.label);
            }
            None => {}
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Render every page into the current directory
  pdf2img report.pdf

  # Pages plus a ZIP (report-images.zip) into ./out
  pdf2img report.pdf -o out --zip

  # Only the ZIP, stored without recompression
  pdf2img report.pdf --zip --no-pages --compression stored

  # Lower resolution, capped at 2000 px
  pdf2img --scale 1.0 --max-pixels 2000 slides.pdf

  # Inspect PDF metadata (no rendering)
  pdf2img --inspect-only report.pdf

  # JSON summary on stdout
  pdf2img --json report.pdf > summary.json

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory)
  PDF2IMG_*         Every flag has an env equivalent, e.g. PDF2IMG_SCALE=1.5
  RUST_LOG          Override log filter (e.g. RUST_LOG=edgequake_pdf2img=debug)
"#;

/// Convert PDF pages to PNG images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2img",
    version,
    about = "Convert PDF pages to PNG images and bundle them into a ZIP",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file.
    input: PathBuf,

    /// Directory receiving page-N.png files and the ZIP.
    #[arg(short, long, env = "PDF2IMG_OUTPUT", default_value = ".")]
    output: PathBuf,

    /// Rasterisation scale factor (0.25–8.0).
    #[arg(long, env = "PDF2IMG_SCALE", default_value_t = edgequake_pdf2img::DEFAULT_SCALE)]
    scale: f32,

    /// Also write <name>-images.zip with every page.
    #[arg(long, env = "PDF2IMG_ZIP")]
    zip: bool,

    /// Do not write individual page files.
    #[arg(long, env = "PDF2IMG_NO_PAGES")]
    no_pages: bool,

    /// ZIP entry compression.
    #[arg(long, env = "PDF2IMG_COMPRESSION", value_enum, default_value = "deflated")]
    compression: CompressionArg,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2IMG_PASSWORD")]
    password: Option<String>,

    /// Cap either rendered dimension at this many pixels.
    #[arg(long, env = "PDF2IMG_MAX_PIXELS")]
    max_pixels: Option<u32>,

    /// Path to libpdfium (file or directory).
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print a JSON summary on stdout.
    #[arg(long, env = "PDF2IMG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2IMG_NO_PROGRESS")]
    no_progress: bool,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2IMG_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum CompressionArg {
    Stored,
    Deflated,
}

impl From<CompressionArg> for ArchiveCompression {
    fn from(v: CompressionArg) -> Self {
        match v {
            CompressionArg::Stored => ArchiveCompression::Stored,
            CompressionArg::Deflated => ArchiveCompression::Deflated,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar carries all the feedback that matters, so library
    // INFO logs are suppressed while it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let renderer = build_renderer(&cli);
    let source = SourceFile::from_path(&cli.input)
        .await
        .with_context(|| format!("Failed to open {}", cli.input.display()))?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let payload = source
            .read_payload()
            .await
            .with_context(|| format!("Failed to read {}", cli.input.display()))?;
        let meta = renderer
            .inspect(payload)
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", source.display_info());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Build controller ─────────────────────────────────────────────────
    let config = ConversionConfig::builder()
        .scale(cli.scale)
        .compression(cli.compression.clone().into())
        .build()
        .context("Invalid configuration")?;

    let view = TerminalView::new(show_progress, cli.quiet);
    let mut controller = ConversionController::new(config, Arc::new(renderer), view);

    let cancel = controller.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    controller
        .select_source(Some(source))
        .context("Input rejected")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let summary = controller.convert().await.context("Conversion failed")?;

    let target = DirectoryTarget::new(&cli.output);
    if !cli.no_pages {
        for page in controller.pages().iter().map(|p| p.page).collect::<Vec<_>>() {
            let receipt = controller
                .download_page(page, &target)
                .await
                .with_context(|| format!("Failed to write page {}", page))?;
            tracing::debug!("Wrote {:?}", receipt.path);
        }
    }

    let archive = if cli.zip {
        controller
            .download_all(&target)
            .await
            .context("Failed to write ZIP")?
    } else {
        None
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?;
        println!("{json}");
    }

    if !cli.quiet {
        let written = if cli.no_pages { 0 } else { summary.pages.len() };
        eprintln!(
            "{}  {} page files  {}ms  →  {}",
            if summary.page_count > 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            written,
            summary.stats.total_duration_ms,
            bold(&target.dir().display().to_string()),
        );
        match archive {
            Some(receipt) => eprintln!(
                "   {} {}",
                dim("archive"),
                bold(&receipt.file_name)
            ),
            None if cli.zip => eprintln!("   {}", red("no pages to archive")),
            None => {}
        }
    }

    Ok(())
}

/// Map CLI args to a `PdfiumRenderer`.
fn build_renderer(cli: &Cli) -> PdfiumRenderer {
    let mut renderer = PdfiumRenderer::new();
    if let Some(ref path) = cli.pdfium_lib {
        renderer = renderer.library_path(path);
    }
    if let Some(ref password) = cli.password {
        renderer = renderer.password(password);
    }
    if let Some(px) = cli.max_pixels {
        renderer = renderer.max_rendered_pixels(px);
    }
    renderer
}
