//! CLI binary for docconv.
//!
//! A thin shim over the library crate: flags map to `ClientConfig`, the
//! chosen file is fed through the matching `Host` panel, and the outcome is
//! reported on stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docconv::{
    format_file_size, CandidateFile, ClientConfig, ConversionClient, ConversionProgressCallback,
    DirectorySink, Direction, DocumentFamily, Host, PanelStatus, ProgressCallback, Tab, WordFormat,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::debug;
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner while uploading and waiting; byte bar once the artifact streams back.
///
/// The bar is only drawn once an upload starts, so a file rejected before
/// that leaves nothing behind on the terminal.
struct CliProgressCallback {
    bar: OnceLock<ProgressBar>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: OnceLock::new(),
        })
    }

    fn spinner() -> ProgressBar {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(spinner_style);
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    }

    fn finish(&self) {
        if let Some(bar) = self.bar.get() {
            bar.finish_and_clear();
        }
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_upload_start(&self, file_name: &str, size: u64) {
        let bar = self.bar.get_or_init(Self::spinner);
        bar.set_prefix("Converting");
        bar.set_message(format!("{file_name} ({})", format_file_size(size)));
    }

    fn on_response(&self, status: u16) {
        if let Some(bar) = self.bar.get() {
            bar.set_message(format!("server answered {status}"));
        }
    }

    fn on_download_progress(&self, received: u64, total: Option<u64>) {
        let Some(bar) = self.bar.get() else { return };
        if let Some(total) = total {
            if bar.length() != Some(total) {
                let style = ProgressStyle::with_template(
                    "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {bytes}/{total_bytes}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  ");
                bar.set_style(style);
                bar.set_length(total);
                bar.set_prefix("Receiving");
            }
        }
        bar.set_position(received);
    }

    fn on_conversion_complete(&self, _file_name: &str, _bytes: u64) {
        self.finish();
    }

    fn on_conversion_error(&self, _message: &str) {
        self.finish();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Word → PDF, saved into the current directory
  docconv to-pdf resume.docx

  # PDF → legacy .doc, saved into ./out
  docconv to-word report.pdf --format doc -o out

  # Talk to a specific service with a 2-minute bound
  docconv --api-url https://docs.example.com --timeout 120 to-pdf letter.doc

  # What the service says it supports
  docconv formats --json

LIMITS:
  Word input:  .doc, .docx      PDF input:  .pdf
  Max upload:  50 MB

ENVIRONMENT VARIABLES:
  DOCCONV_API_URL     Base URL of the conversion service
  DOCCONV_OUTPUT_DIR  Directory converted files are written to
  DOCCONV_TIMEOUT     Request timeout in seconds (unset = no limit)
  RUST_LOG            Override log filtering (e.g. docconv=debug)
"#;

/// Convert Word ↔ PDF through a remote conversion service.
#[derive(Parser, Debug)]
#[command(
    name = "docconv",
    version,
    about = "Convert Word documents to PDF and PDF documents to Word",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the conversion service.
    #[arg(long, global = true, env = "DOCCONV_API_URL")]
    api_url: Option<String>,

    /// Directory converted files are written to.
    #[arg(short, long, global = true, env = "DOCCONV_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Replace an existing file instead of choosing a numbered name.
    #[arg(long, global = true, env = "DOCCONV_OVERWRITE")]
    overwrite: bool,

    /// Request timeout in seconds. No limit when unset.
    #[arg(long, global = true, env = "DOCCONV_TIMEOUT",
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Disable the progress spinner.
    #[arg(long, global = true, env = "DOCCONV_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCCONV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCCONV_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a Word document (.doc, .docx) to PDF.
    ToPdf {
        /// Word document to convert.
        file: PathBuf,
    },
    /// Convert a PDF document to Word.
    ToWord {
        /// PDF document to convert.
        file: PathBuf,

        /// Word flavour to produce.
        #[arg(long, value_enum, default_value = "docx")]
        format: FormatArg,
    },
    /// Convert in whichever direction the file's extension implies.
    Convert {
        /// Word or PDF document to convert.
        file: PathBuf,

        /// Word flavour to produce when the input is a PDF.
        #[arg(long, value_enum, default_value = "docx")]
        format: FormatArg,
    },
    /// List the formats the service advertises.
    Formats {
        /// Print the raw JSON response.
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Docx,
    Doc,
}

impl From<FormatArg> for WordFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Docx => WordFormat::Docx,
            FormatArg::Doc => WordFormat::Doc,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner provides all the feedback that matters; keep library
    // INFO logs from tearing through it.
    let show_progress = !cli.quiet && !cli.no_progress && !matches!(cli.command, Commands::Formats { .. });
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

    let progress: Option<ProgressCallback> = if show_progress && !cli.verbose {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress)?;
    let client = ConversionClient::new(config).context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Formats { json } => {
            let formats = client
                .supported_formats()
                .await
                .context("Failed to fetch supported formats")?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&formats).context("Failed to serialise formats")?
                );
            } else {
                println!("Source formats:  {}", formats.source_formats.join(", "));
                println!("Target formats:  {}", formats.target_formats.join(", "));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::ToPdf { ref file } => {
            run_conversion(&cli, client, file.clone(), Direction::WordToPdf).await
        }
        Commands::ToWord { ref file, format } => {
            run_conversion(&cli, client, file.clone(), Direction::PdfToWord(format.into())).await
        }
        Commands::Convert { ref file, format } => {
            let Some(direction) = infer_direction(file, format.into()) else {
                eprintln!(
                    "{} Cannot tell the direction from '{}'; use to-pdf or to-word",
                    red("✘"),
                    file.display()
                );
                return Ok(ExitCode::FAILURE);
            };
            run_conversion(&cli, client, file.clone(), direction).await
        }
    }
}

/// Feed `file` through the host panel for `direction` and report the outcome.
async fn run_conversion(
    cli: &Cli,
    client: ConversionClient,
    file: PathBuf,
    direction: Direction,
) -> Result<ExitCode> {
    let sink = DirectorySink::new(&cli.output_dir).overwrite(cli.overwrite);
    debug!("{} → {}", file.display(), sink.dir().display());
    let mut host = Host::new(Arc::new(client), Arc::new(sink));

    let tab = Tab::for_direction(direction);
    host.select_tab(tab);
    let panel = host.active_panel_mut();
    if let Direction::PdfToWord(format) = direction {
        panel.set_target_format(format);
    }

    let candidate = CandidateFile::open(&file)
        .await
        .with_context(|| format!("Cannot open {}", file.display()))?;
    let size = candidate.size();

    if let Err(e) = panel.select_file(Some(candidate)) {
        eprintln!("{} {}", red("✘"), e);
        return Ok(ExitCode::FAILURE);
    }

    let status = panel.convert().await;
    match status {
        PanelStatus::Success => {
            if !cli.quiet {
                let saved = panel
                    .delivered_to()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                eprintln!(
                    "{} {}  {}  →  {}",
                    green("✔"),
                    tab,
                    dim(&format_file_size(size)),
                    bold(&saved),
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            let message = panel.error_message().unwrap_or("Conversion failed");
            eprintln!("{} {}", red("✘"), message);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Direction implied by the input's extension.
fn infer_direction(file: &Path, format: WordFormat) -> Option<Direction> {
    let name = file.file_name()?.to_str()?;
    match DocumentFamily::from_file_name(name)? {
        DocumentFamily::Word => Some(Direction::WordToPdf),
        DocumentFamily::Pdf => Some(Direction::PdfToWord(format)),
    }
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder();

    if let Some(ref url) = cli.api_url {
        builder = builder.base_url(url);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
