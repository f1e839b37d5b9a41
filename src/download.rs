//! Artifact delivery: the native stand-in for a browser download.
//!
//! A successful conversion hands its [`Artifact`] to an [`ArtifactSink`].
//! [`DirectorySink`] writes it into a directory through a temporary file in
//! that same directory, then renames it into place. The temporary file is
//! owned by a [`tempfile::NamedTempFile`], so it is removed on every early
//! return (write error, rename error, cancelled future) without a matching
//! cleanup call anywhere.
//!
//! Like a browser, the sink never overwrites an existing download unless
//! asked to: `report.pdf` becomes `report (1).pdf`, `report (2).pdf`, …

use crate::client::Artifact;
use crate::error::DocConvError;
use futures::future::BoxFuture;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Highest numeric suffix tried before giving up on a free name.
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Receives converted artifacts.
pub trait ArtifactSink: Send + Sync {
    /// Store `artifact` and return where it ended up.
    fn deliver<'a>(&'a self, artifact: &'a Artifact) -> BoxFuture<'a, Result<PathBuf, DocConvError>>;
}

/// Writes artifacts into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    overwrite: bool,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            overwrite: false,
        }
    }

    /// Replace existing files instead of picking a numbered name.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write(&self, artifact: &Artifact) -> Result<PathBuf, DocConvError> {
        let write_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| DocConvError::OutputWriteFailed { path, source }
        };
        let first_target = self.dir.join(artifact.file_name());

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(write_err(&self.dir))?;

        let tmp = NamedTempFile::new_in(&self.dir).map_err(write_err(&first_target))?;
        {
            let handle = tmp.as_file().try_clone().map_err(write_err(tmp.path()))?;
            let mut file = tokio::fs::File::from_std(handle);
            file.write_all(artifact.bytes())
                .await
                .map_err(write_err(&first_target))?;
            file.sync_all().await.map_err(write_err(&first_target))?;
        }

        if self.overwrite {
            tmp.persist(&first_target)
                .map_err(|e| DocConvError::OutputWriteFailed {
                    path: first_target.clone(),
                    source: e.error,
                })?;
            return Ok(first_target);
        }

        let mut tmp = tmp;
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let target = self.dir.join(numbered_name(artifact.file_name(), attempt));
            match tmp.persist_noclobber(&target) {
                Ok(_) => return Ok(target),
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                    debug!("'{}' exists, trying next name", target.display());
                    tmp = e.file;
                }
                Err(e) => {
                    return Err(DocConvError::OutputWriteFailed {
                        path: target,
                        source: e.error,
                    })
                }
            }
        }

        Err(DocConvError::OutputWriteFailed {
            path: first_target,
            source: std::io::Error::new(ErrorKind::AlreadyExists, "no free file name"),
        })
    }
}

impl ArtifactSink for DirectorySink {
    fn deliver<'a>(&'a self, artifact: &'a Artifact) -> BoxFuture<'a, Result<PathBuf, DocConvError>> {
        Box::pin(async move {
            let path = self.write(artifact).await?;
            info!("Saved {} bytes to {}", artifact.len(), path.display());
            Ok(path)
        })
    }
}

/// `report.pdf`, `report (1).pdf`, `report (2).pdf`, …
fn numbered_name(file_name: &str, n: usize) -> String {
    if n == 0 {
        return file_name.to_string();
    }
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({n}).{ext}"),
        _ => format!("{file_name} ({n})"),
    }
}
