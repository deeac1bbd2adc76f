//! CLI binary for docscan.
//!
//! `serve` runs the browser UI; `scan` runs one document through the same
//! session pipeline and prints or writes the result.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use docscan::{
    view, write_report, ExtractionSession, ScanConfig, ScanConfigBuilder, ScanContext,
    UploadedDocument,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Browser UI on http://127.0.0.1:8501
  docscan serve

  # Listen on all interfaces, engine on another host
  docscan serve --bind 0.0.0.0:8501 --engine-url http://ocr-box:8080

  # Print the free text of a scan
  docscan scan receipt.jpg

  # Raw engine JSON
  docscan scan --json statement.pdf > result.json

  # Full report: report.html, table_{n}.csv, result.json
  docscan scan invoice.png -o out/

ENVIRONMENT VARIABLES:
  DOCSCAN_ENGINE_URL                   Structure engine base URL (default http://127.0.0.1:8080)
  DOCSCAN_BIND                         Web UI address (default 127.0.0.1:8501)
  DOCSCAN_PDF_SCALE                    PDF page-one raster scale (default 2.0)
  DOCSCAN_MAX_UPLOAD_MB                Upload limit in MiB (default 200)
  DOCSCAN_MAX_SESSIONS                 Browser sessions kept in memory (default 64)
  DOCSCAN_DISABLE_MODEL_SOURCE_CHECK   Skip the engine check at startup
  PDFIUM_LIB_PATH                      Path to libpdfium (else ./lib/, then the system library)
  RUST_LOG                             Log filter, overrides -v / -q
"#;

/// Extract tables, formulas and text from scanned documents.
#[derive(Parser, Debug)]
#[command(
    name = "docscan",
    version,
    about = "Extract tables, formulas and text from scanned documents",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the browser UI.
    Serve(ServeArgs),
    /// Scan one document from the command line.
    Scan(ScanArgs),
}

/// Flags shared by both subcommands. Unset flags fall back to `DOCSCAN_*`.
#[derive(Args, Debug)]
struct EngineArgs {
    /// Structure engine base URL.
    #[arg(long)]
    engine_url: Option<String>,

    /// Raster scale for the first page of a PDF (0.5–6.0).
    #[arg(long)]
    pdf_scale: Option<f32>,

    /// Skip the engine's model-source check at startup.
    #[arg(long)]
    skip_model_source_check: bool,
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// Address to listen on.
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Largest accepted upload, in MiB.
    #[arg(long)]
    max_upload_mb: Option<usize>,
}

#[derive(Args, Debug)]
struct ScanArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// Image (PNG, JPG) or PDF to scan.
    file: PathBuf,

    /// Write report.html, table_{n}.csv and result.json into this directory.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the raw engine JSON instead of the extracted text.
    #[arg(long)]
    json: bool,
}

impl EngineArgs {
    fn apply(&self, mut builder: ScanConfigBuilder) -> ScanConfigBuilder {
        if let Some(ref url) = self.engine_url {
            builder = builder.engine_url(url.clone());
        }
        if let Some(scale) = self.pdf_scale {
            builder = builder.pdf_scale(scale);
        }
        if self.skip_model_source_check {
            builder = builder.skip_model_source_check(true);
        }
        builder
    }
}

// The HTTP engine uses a blocking client, which must be created and dropped
// outside the async runtime; `main` stays synchronous and only `serve` enters
// tokio.
fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // A scan shows a spinner; keep library INFO logs off the terminal then.
    let scanning = matches!(cli.command, Command::Scan(_));
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || scanning {
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

    match cli.command {
        Command::Serve(args) => serve(args),
        Command::Scan(args) => scan(args, cli.quiet),
    }
}

fn serve(args: ServeArgs) -> Result<()> {
    let mut builder = args.engine.apply(ScanConfig::env_builder());
    if let Some(bind) = args.bind {
        builder = builder.bind(bind);
    }
    if let Some(mb) = args.max_upload_mb {
        builder = builder.max_upload_bytes(mb.saturating_mul(1024 * 1024));
    }
    let config = builder.build().context("Invalid configuration")?;

    let ctx =
        ScanContext::from_config(config).context("Failed to initialise the structure engine")?;
    let ctx = Arc::new(ctx);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime
        .block_on(docscan::web::serve(Arc::clone(&ctx)))
        .context("Web server failed")?;
    Ok(())
}

fn scan(args: ScanArgs, quiet: bool) -> Result<()> {
    let config = args
        .engine
        .apply(ScanConfig::env_builder())
        .build()
        .context("Invalid configuration")?;

    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.file.display().to_string());
    let mime = mime_guess::from_path(&args.file)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    let spinner = (!quiet).then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Scanning");
        bar.set_message(name.clone());
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let start = Instant::now();
    let outcome = ScanContext::from_config(config).and_then(|ctx| {
        let mut session = ExtractionSession::new();
        session.submit(UploadedDocument::new(bytes, mime, name.clone()));
        session.ensure_result(&ctx)
    });
    if let Some(bar) = &spinner {
        bar.finish_and_clear();
    }
    let extraction = outcome.with_context(|| format!("Failed to scan {name}"))?;

    if args.json {
        let json = serde_json::to_string_pretty(extraction.result())
            .context("Failed to serialise result")?;
        println!("{json}");
    } else {
        let rendered = view::render(&extraction, false);
        let mut stdout = io::stdout().lock();
        if let Some(text) = &rendered.sections.text {
            stdout
                .write_all(text.as_bytes())
                .context("Failed to write to stdout")?;
            if !text.ends_with('\n') {
                stdout.write_all(b"\n").ok();
            }
        }
        if !quiet {
            eprintln!(
                "{} {} table(s), {} formula(s)",
                dim("·"),
                rendered.sections.tables.len(),
                rendered.sections.formulas.len()
            );
        }
    }

    if let Some(ref dir) = args.output {
        let files = write_report(dir, &extraction)
            .with_context(|| format!("Failed to write report to {}", dir.display()))?;
        if !quiet {
            eprintln!(
                "{}  {}  {}ms  →  {}",
                green("✔"),
                name,
                start.elapsed().as_millis(),
                bold(&files.html.display().to_string()),
            );
        }
    }

    Ok(())
}
