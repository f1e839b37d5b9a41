//! HTTP client for the conversion service.
//!
//! One call to [`ConversionClient::convert`] is one multipart POST: the
//! candidate file goes up in a single `file` field, and either a binary
//! document or a structured error comes back. There is no batching and no
//! retry; every failure is folded into the returned [`ConversionOutcome`]
//! so callers never see a panic or an unclassified error.
//!
//! ## Response handling
//!
//! | Response | Outcome |
//! |----------|---------|
//! | 2xx | `Ok(Artifact)` named from `Content-Disposition`, else `converted.<ext>` |
//! | non-2xx, JSON `{detail}` / `{title}` | `Err(Server)` carrying that text |
//! | non-2xx, anything else | `Err(Server)` with "Conversion failed" |
//! | transport failure | `Err(Request)` / `Err(Timeout)` |

use crate::config::ClientConfig;
use crate::direction::Direction;
use crate::error::{DocConvError, GENERIC_CONVERSION_FAILURE};
use crate::progress::{ConversionProgressCallback, NoopProgressCallback};
use crate::validate::CandidateFile;
use futures::future::BoxFuture;
use futures::StreamExt;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A converted document, ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    bytes: Vec<u8>,
    file_name: String,
    content_type: Option<String>,
}

impl Artifact {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Suggested name: the server's, or the direction's default.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// `success(artifact)` or `failure(error)`; the message is `error.to_string()`.
pub type ConversionOutcome = Result<Artifact, DocConvError>;

/// Capability listing returned by `GET /api/document/formats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedFormats {
    #[serde(default)]
    pub source_formats: Vec<String>,
    #[serde(default)]
    pub target_formats: Vec<String>,
}

/// Largest buffer reserved from a response's `Content-Length`.
const MAX_PREALLOC_BYTES: u64 = 64 * 1024 * 1024;

/// Part type sent when the reported one does not parse as a MIME type.
const FALLBACK_PART_MIME: &str = "application/octet-stream";

/// Error body shape used by the service (RFC 7807 problem details).
#[derive(Debug, Deserialize)]
struct ProblemDetails {
    detail: Option<String>,
    title: Option<String>,
}

/// Anything that can turn a candidate file into an artifact.
///
/// [`ConversionClient`] is the production implementation; the panel only
/// depends on this trait so it can be driven without a live service.
pub trait Converter: Send + Sync {
    fn convert<'a>(
        &'a self,
        file: &'a CandidateFile,
        direction: Direction,
    ) -> BoxFuture<'a, ConversionOutcome>;
}

/// Client for the remote conversion service.
#[derive(Debug, Clone)]
pub struct ConversionClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ConversionClient {
    /// Build a client from a validated configuration.
    pub fn new(config: ClientConfig) -> Result<Self, DocConvError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| DocConvError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// Client with defaults and `DOCCONV_API_URL` applied.
    pub fn from_env() -> Result<Self, DocConvError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Upload `file` and wait for the converted document.
    pub async fn convert(&self, file: &CandidateFile, direction: Direction) -> ConversionOutcome {
        let start = Instant::now();
        info!(
            "Converting '{}' ({} bytes) {}",
            file.name(),
            file.size(),
            direction.label()
        );

        let outcome = self.send(file, direction).await;
        let callback = self.callback();

        match &outcome {
            Ok(artifact) => {
                info!(
                    "Converted '{}' → '{}' ({} bytes) in {}ms",
                    file.name(),
                    artifact.file_name(),
                    artifact.len(),
                    start.elapsed().as_millis()
                );
                callback.on_conversion_complete(artifact.file_name(), artifact.len() as u64);
            }
            Err(e) => {
                warn!("Conversion of '{}' failed: {}", file.name(), e);
                callback.on_conversion_error(&e.to_string());
            }
        }

        outcome
    }

    /// Fetch the service's advertised source and target formats.
    pub async fn supported_formats(&self) -> Result<SupportedFormats, DocConvError> {
        let url = self.config.formats_url();
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(DocConvError::Server {
                status: status.as_u16(),
                message: error_message_from_body(&body),
            });
        }

        serde_json::from_slice(&body)
            .map_err(|e| DocConvError::Unknown(format!("Invalid formats response: {e}")))
    }

    async fn send(&self, file: &CandidateFile, direction: Direction) -> ConversionOutcome {
        let callback = self.callback();
        let payload = file.read_bytes().await?;

        let mut part = Part::bytes(payload).file_name(file.name().to_string());
        if let Some(mime) = part_mime(file.name(), file.content_type()) {
            part = part.mime_str(mime).map_err(|e| self.transport_error(e))?;
        }
        let form = Form::new().part("file", part);

        let url = self.config.convert_url(direction);
        debug!("POST {} (file '{}')", url, file.name());
        callback.on_upload_start(file.name(), file.size());

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        callback.on_response(status.as_u16());
        debug!("Response {} from {}", status, url);

        if !status.is_success() {
            // An unreadable body is treated like an unparseable one.
            let body = response.bytes().await.unwrap_or_default();
            return Err(DocConvError::Server {
                status: status.as_u16(),
                message: error_message_from_body(&body),
            });
        }

        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .and_then(|v| filename_from_content_disposition(&v))
            .unwrap_or_else(|| direction.default_file_name());
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let total = response.content_length();

        // Content-Length is only a hint; never reserve more than the cap up front.
        let mut bytes = Vec::with_capacity(total.map_or(0, |t| t.min(MAX_PREALLOC_BYTES)) as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.transport_error(e))?;
            bytes.extend_from_slice(&chunk);
            callback.on_download_progress(bytes.len() as u64, total);
        }

        let artifact = Artifact::new(bytes, file_name);
        Ok(match content_type {
            Some(ct) => artifact.with_content_type(ct),
            None => artifact,
        })
    }

    fn callback(&self) -> &dyn ConversionProgressCallback {
        match &self.config.progress_callback {
            Some(cb) => cb.as_ref(),
            None => &NoopProgressCallback,
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> DocConvError {
        DocConvError::from_transport(err, self.config.request_timeout_secs)
    }
}

impl Converter for ConversionClient {
    fn convert<'a>(
        &'a self,
        file: &'a CandidateFile,
        direction: Direction,
    ) -> BoxFuture<'a, ConversionOutcome> {
        Box::pin(ConversionClient::convert(self, file, direction))
    }
}

/// MIME type to declare on the upload part, if any.
///
/// The reported type never blocks an upload: one that does not parse is
/// replaced by `application/octet-stream`.
fn part_mime<'a>(file_name: &str, content_type: &'a str) -> Option<&'a str> {
    if content_type.is_empty() {
        return None;
    }
    if Part::text("").mime_str(content_type).is_ok() {
        Some(content_type)
    } else {
        warn!(
            "File '{}' reports unparseable MIME type '{}', sending as {}",
            file_name, content_type, FALLBACK_PART_MIME
        );
        Some(FALLBACK_PART_MIME)
    }
}

/// User-facing message for a non-success response body.
///
/// First non-empty of `detail`, `title`; otherwise "Conversion failed".
pub fn error_message_from_body(body: &[u8]) -> String {
    serde_json::from_slice::<ProblemDetails>(body)
        .ok()
        .and_then(|p| {
            p.detail
                .filter(|s| !s.trim().is_empty())
                .or(p.title.filter(|s| !s.trim().is_empty()))
        })
        .unwrap_or_else(|| GENERIC_CONVERSION_FAILURE.to_string())
}

static RE_FILENAME_EXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:^|;)\s*filename\*\s*=\s*"?([^;"\n]*)"?"#).unwrap()
});

static RE_FILENAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:^|;)\s*filename\s*=\s*(?:"([^"\n]*)"|'([^'\n]*)'|([^;\n]*))"#).unwrap()
});

/// Extract the suggested file name from a `Content-Disposition` value.
///
/// `filename*=` (RFC 5987, `charset'lang'percent-encoded`) is preferred when
/// it decodes; otherwise the quoted or bare `filename=` is used. Directory
/// components are stripped so the result is always a bare file name.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let extended = RE_FILENAME_EXT
        .captures(header)
        .and_then(|c| c.get(1))
        .and_then(|m| decode_ext_value(m.as_str()));

    let plain = || {
        RE_FILENAME.captures(header).and_then(|c| {
            c.get(1)
                .or_else(|| c.get(2))
                .or_else(|| c.get(3))
                .map(|m| m.as_str().replace(['"', '\''], ""))
        })
    };

    extended
        .and_then(|n| sanitize_file_name(&n))
        .or_else(|| plain().and_then(|n| sanitize_file_name(&n)))
}

/// Decode `UTF-8''r%C3%A9sum%C3%A9.pdf` → `résumé.pdf`.
fn decode_ext_value(raw: &str) -> Option<String> {
    let value = match raw.splitn(3, '\'').collect::<Vec<_>>().as_slice() {
        [_charset, _lang, value] => *value,
        _ => raw,
    };

    let bytes = value.trim().as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = value.trim().get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn sanitize_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base.to_string())
    }
}
