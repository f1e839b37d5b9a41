//! # docconv
//!
//! Convert Word documents to PDF and PDF documents to Word by handing them to
//! a remote conversion service over HTTP.
//!
//! The crate does no document processing itself. What it does own is the
//! part that decides *whether* and *how* a file goes to the service: the
//! admission rules, the single multipart exchange, delivery of the result,
//! and the lifecycle that ties them together.
//!
//! ## Flow
//!
//! ```text
//! file
//!  │
//!  ├─ 1. Admit    name / size / MIME checks        (validate)
//!  ├─ 2. Upload   one multipart POST                (client)
//!  ├─ 3. Receive  artifact + suggested file name    (client)
//!  └─ 4. Deliver  write into the output directory   (download)
//! ```
//!
//! [`ConversionPanel`] runs those steps as a small state machine (one per
//! direction) and [`Host`] puts the two panels side by side.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docconv::{convert_to_dir, ClientConfig, Direction};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Base URL from DOCCONV_API_URL, else http://localhost:5196
//!     let config = ClientConfig::from_env()?;
//!     let saved = convert_to_dir("resume.docx", Direction::WordToPdf, ".", &config).await?;
//!     println!("saved {}", saved.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docconv` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docconv = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod convert;
pub mod direction;
pub mod download;
pub mod error;
pub mod host;
pub mod panel;
pub mod progress;
pub mod validate;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{Artifact, ConversionClient, ConversionOutcome, Converter, SupportedFormats};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use convert::{convert_path, convert_sync, convert_to_dir};
pub use direction::{Direction, DocumentFamily, WordFormat};
pub use download::{ArtifactSink, DirectorySink};
pub use error::{DocConvError, ValidationError};
pub use host::{Host, Tab};
pub use panel::{ConversionPanel, PanelSnapshot, PanelStatus};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use validate::{
    format_file_size, validate, validate_pdf_document, validate_word_document, CandidateFile,
    ValidationOutcome, MAX_UPLOAD_BYTES,
};
