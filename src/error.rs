//! Error types for the docconv library.
//!
//! Two error types reflect two distinct failure points:
//!
//! * [`ValidationError`] — **Pre-flight**: the candidate file was rejected
//!   by the admission rules in [`crate::validate`] and never reached the
//!   network. Its `Display` text is exactly the message shown to the user.
//!
//! * [`DocConvError`] — **Attempt-level**: anything that ends a conversion
//!   attempt, from a rejected file through transport and server failures to
//!   local I/O while reading the upload or writing the artifact.
//!
//! Every variant renders to a single human-readable line. None of them is
//! retried automatically and none is fatal to the caller: the panel always
//! lands back in an interactive state.

use std::path::PathBuf;
use thiserror::Error;

/// Message used when the server rejects a request without a usable body.
pub const GENERIC_CONVERSION_FAILURE: &str = "Conversion failed";

/// Message used when a transport error carries no text of its own.
pub const GENERIC_UNEXPECTED_FAILURE: &str = "An unexpected error occurred";

/// Why a candidate file was not admitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No file was supplied.
    #[error("Please select a file")]
    NoFile,

    /// The file has zero bytes.
    #[error("File is empty")]
    Empty,

    /// The file exceeds the upload limit.
    #[error("File size must be less than 50MB")]
    TooLarge { size: u64, max: u64 },

    /// The file name does not end with an extension the target family accepts.
    #[error("Invalid file format. Allowed formats: {}", .allowed.join(", "))]
    UnsupportedExtension {
        name: String,
        allowed: &'static [&'static str],
    },
}

/// All errors that end a conversion attempt.
#[derive(Debug, Error)]
pub enum DocConvError {
    // ── Admission ─────────────────────────────────────────────────────────
    /// The file failed the client-side admission rules.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Input path does not exist.
    #[error("File not found: '{}'", .path.display())]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{}'", .path.display())]
    PermissionDenied { path: PathBuf },

    /// The file existed when admitted but could not be read for upload.
    #[error("Failed to read '{}': {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Transport ─────────────────────────────────────────────────────────
    /// The request could not be sent or the response could not be read.
    #[error("{message}")]
    Request { message: String },

    /// The configured request timeout elapsed.
    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    // ── Server ────────────────────────────────────────────────────────────
    /// The service answered with a non-success status.
    ///
    /// `message` is the structured `detail`/`title` from the body, or
    /// [`GENERIC_CONVERSION_FAILURE`].
    #[error("{message}")]
    Server { status: u16, message: String },

    // ── Delivery ──────────────────────────────────────────────────────────
    /// Could not write the converted artifact.
    #[error("Failed to write output file '{}': {source}", .path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config ────────────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    #[error("{0}")]
    Unknown(String),
}

impl DocConvError {
    /// Classify a `reqwest` transport error.
    pub(crate) fn from_transport(err: reqwest::Error, timeout_secs: Option<u64>) -> Self {
        if err.is_timeout() {
            if let Some(secs) = timeout_secs {
                return DocConvError::Timeout { secs };
            }
        }
        let message = err.to_string();
        if message.trim().is_empty() {
            DocConvError::Request {
                message: GENERIC_UNEXPECTED_FAILURE.to_string(),
            }
        } else {
            DocConvError::Request { message }
        }
    }

    /// True when the attempt never left the client.
    pub fn is_validation(&self) -> bool {
        matches!(self, DocConvError::Validation(_))
    }

    /// HTTP status for server-side failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            DocConvError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}
