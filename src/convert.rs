//! One-shot conversion entry points.
//!
//! These compose the same pieces a panel uses (admission, upload, delivery)
//! for callers that have a path and want a result, without tracking any
//! lifecycle state. Validation always runs first, so a rejected file never
//! reaches the network.

use crate::client::{ConversionClient, ConversionOutcome};
use crate::config::ClientConfig;
use crate::direction::Direction;
use crate::download::{ArtifactSink, DirectorySink};
use crate::error::DocConvError;
use crate::validate::{validate, CandidateFile};
use std::path::{Path, PathBuf};
use tracing::info;

/// Convert the file at `input` and return the artifact in memory.
///
/// # Errors
/// - `FileNotFound` / `PermissionDenied` when the path cannot be opened
/// - `Validation` when the file is not admissible for `direction`
/// - `Request` / `Timeout` / `Server` from the exchange itself
pub async fn convert_path(
    input: impl AsRef<Path>,
    direction: Direction,
    config: &ClientConfig,
) -> ConversionOutcome {
    let file = CandidateFile::open(input).await?;
    validate(Some(&file), direction.source_family())?;

    let client = ConversionClient::new(config.clone())?;
    client.convert(&file, direction).await
}

/// Convert the file at `input` and save the artifact into `output_dir`.
///
/// Returns the path written. Existing files are not overwritten; a
/// numbered name is chosen instead.
pub async fn convert_to_dir(
    input: impl AsRef<Path>,
    direction: Direction,
    output_dir: impl AsRef<Path>,
    config: &ClientConfig,
) -> Result<PathBuf, DocConvError> {
    let artifact = convert_path(input, direction, config).await?;
    let sink = DirectorySink::new(output_dir.as_ref());
    let path = sink.deliver(&artifact).await?;
    info!("Wrote {}", path.display());
    Ok(path)
}

/// Synchronous wrapper around [`convert_path`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    direction: Direction,
    config: &ClientConfig,
) -> ConversionOutcome {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| DocConvError::Unknown(format!("Failed to create tokio runtime: {e}")))?;
    rt.block_on(convert_path(input, direction, config))
}
