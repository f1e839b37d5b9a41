//! File admission: candidate files and the rules that gate them.
//!
//! A [`CandidateFile`] is what the user handed over — an in-memory blob or a
//! path on disk — together with its name, size and reported MIME type.
//! [`validate`] decides whether it may be uploaded for a given
//! [`DocumentFamily`]. Validation is synchronous and never touches the
//! network; the only side effect is a warning when the reported MIME type
//! disagrees with the extension.
//!
//! ## Rule order
//!
//! First failing rule wins:
//!
//! 1. a file must be present
//! 2. it must not be empty
//! 3. it must not exceed [`MAX_UPLOAD_BYTES`]
//! 4. its name must end with an allowed extension (case-insensitive)
//! 5. a non-empty MIME type outside the allowed set is only logged
//!
//! The extension is authoritative because MIME types are reported
//! inconsistently across platforms (`.docx` often arrives as
//! `application/octet-stream` or `application/zip`).

use crate::direction::{DocumentFamily, PDF_MIME_TYPES, WORD_MIME_TYPES};
use crate::error::{DocConvError, ValidationError};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Upload limit mirrored from the conversion service (50 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Result of running the admission rules.
pub type ValidationOutcome = Result<(), ValidationError>;

/// Where the file's bytes live until upload.
#[derive(Debug, Clone)]
enum FileSource {
    Memory(Vec<u8>),
    Path(PathBuf),
}

/// A user-supplied document pending validation and conversion.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    name: String,
    size: u64,
    content_type: String,
    source: FileSource,
}

impl CandidateFile {
    /// Wrap an in-memory payload, e.g. one received from a drop target.
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            content_type: content_type.into(),
            source: FileSource::Memory(bytes),
        }
    }

    /// Admit a file from disk without reading its contents.
    ///
    /// The reported content type is inferred from the extension, the same
    /// way a browser file picker does.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DocConvError> {
        let path = path.as_ref().to_path_buf();

        let file = match tokio::fs::File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DocConvError::FileNotFound { path });
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(DocConvError::PermissionDenied { path });
            }
            Err(source) => return Err(DocConvError::ReadFailed { path, source }),
        };

        let metadata = file
            .metadata()
            .await
            .map_err(|source| DocConvError::ReadFailed {
                path: path.clone(),
                source,
            })?;
        if !metadata.is_file() {
            return Err(DocConvError::ReadFailed {
                path,
                source: std::io::Error::other("not a regular file"),
            });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = guess_content_type(&name).to_string();

        debug!(
            "Opened candidate '{}' ({} bytes, type '{}')",
            path.display(),
            metadata.len(),
            content_type
        );

        Ok(Self {
            name,
            size: metadata.len(),
            content_type,
            source: FileSource::Path(path),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// MIME type as reported by the source; may be empty.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Path on disk, if the file was opened rather than supplied in memory.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            FileSource::Path(p) => Some(p),
            FileSource::Memory(_) => None,
        }
    }

    /// Load the payload for upload.
    pub async fn read_bytes(&self) -> Result<Vec<u8>, DocConvError> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| DocConvError::ReadFailed {
                        path: path.clone(),
                        source,
                    })
            }
        }
    }
}

/// MIME type a browser would report for `name`, or `""` when unknown.
pub fn guess_content_type(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    if lower.ends_with(".pdf") {
        PDF_MIME_TYPES[0]
    } else if lower.ends_with(".docx") {
        WORD_MIME_TYPES[1]
    } else if lower.ends_with(".doc") {
        WORD_MIME_TYPES[0]
    } else {
        ""
    }
}

/// Run the admission rules for `family` against `file`.
pub fn validate(file: Option<&CandidateFile>, family: DocumentFamily) -> ValidationOutcome {
    let file = file.ok_or(ValidationError::NoFile)?;

    if file.size == 0 {
        return Err(ValidationError::Empty);
    }

    if file.size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge {
            size: file.size,
            max: MAX_UPLOAD_BYTES,
        });
    }

    let lower = file.name.to_lowercase();
    let allowed = family.allowed_extensions();
    if !allowed.iter().any(|ext| lower.ends_with(ext)) {
        return Err(ValidationError::UnsupportedExtension {
            name: file.name.clone(),
            allowed,
        });
    }

    if !file.content_type.is_empty()
        && !family
            .allowed_mime_types()
            .contains(&file.content_type.as_str())
    {
        warn!(
            "File '{}' has unexpected MIME type '{}', but extension is valid",
            file.name, file.content_type
        );
    }

    Ok(())
}

/// Validate a Word document (`.doc`, `.docx`).
pub fn validate_word_document(file: Option<&CandidateFile>) -> ValidationOutcome {
    validate(file, DocumentFamily::Word)
}

/// Validate a PDF document.
pub fn validate_pdf_document(file: Option<&CandidateFile>) -> ValidationOutcome {
    validate(file, DocumentFamily::Pdf)
}

/// Render a byte count as `"0 Bytes"`, `"2 KB"`, `"1.43 MB"`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
