//! Configuration for talking to the conversion service.
//!
//! Everything the client needs to know about its peer lives in
//! [`ClientConfig`], built via [`ClientConfigBuilder`]. The defaults match
//! the service's published contract, so most callers only set the base URL
//! (or let [`ClientConfig::from_env`] pick it up from `DOCCONV_API_URL`).

use crate::direction::Direction;
use crate::error::DocConvError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Environment variable that overrides the service base URL.
pub const API_URL_ENV: &str = "DOCCONV_API_URL";

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5196";

/// Endpoint for Word → PDF uploads.
pub const DEFAULT_WORD_TO_PDF_PATH: &str = "/api/document/convert";

/// Endpoint for PDF → Word uploads; the subformat travels as `targetFormat`.
pub const DEFAULT_PDF_TO_WORD_PATH: &str = "/api/document/convert-to-word";

/// Capability listing.
pub const DEFAULT_FORMATS_PATH: &str = "/api/document/formats";

/// Configuration for a [`crate::client::ConversionClient`].
///
/// # Example
/// ```rust
/// use docconv::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("https://docs.example.com")
///     .request_timeout_secs(120)
///     .build()
///     .unwrap();
/// assert_eq!(config.base_url, "https://docs.example.com");
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Scheme + host (+ optional port and prefix), without trailing slash.
    pub base_url: String,

    /// Path for Word → PDF. Default: `/api/document/convert`.
    pub word_to_pdf_path: String,

    /// Path for PDF → Word. Default: `/api/document/convert-to-word`.
    pub pdf_to_word_path: String,

    /// Path for the capability listing. Default: `/api/document/formats`.
    pub formats_path: String,

    /// Whole-request timeout in seconds. Default: none.
    ///
    /// Conversions of large documents can legitimately take minutes, so no
    /// bound is applied unless the caller asks for one.
    pub request_timeout_secs: Option<u64>,

    /// TCP connect timeout in seconds. Default: 10.
    pub connect_timeout_secs: u64,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Receives upload/download events for the current request.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            word_to_pdf_path: DEFAULT_WORD_TO_PDF_PATH.to_string(),
            pdf_to_word_path: DEFAULT_PDF_TO_WORD_PATH.to_string(),
            formats_path: DEFAULT_FORMATS_PATH.to_string(),
            request_timeout_secs: None,
            connect_timeout_secs: 10,
            user_agent: concat!("docconv/", env!("CARGO_PKG_VERSION")).to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("word_to_pdf_path", &self.word_to_pdf_path)
            .field("pdf_to_word_path", &self.pdf_to_word_path)
            .field("formats_path", &self.formats_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Defaults, with the base URL taken from `DOCCONV_API_URL` when set.
    pub fn from_env() -> Result<Self, DocConvError> {
        let mut builder = Self::builder();
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                builder = builder.base_url(url);
            }
        }
        builder.build()
    }

    /// Absolute URL for a conversion in `direction`, query included.
    pub fn convert_url(&self, direction: Direction) -> String {
        match direction {
            Direction::WordToPdf => format!("{}{}", self.base_url, self.word_to_pdf_path),
            Direction::PdfToWord(format) => format!(
                "{}{}?targetFormat={}",
                self.base_url,
                self.pdf_to_word_path,
                format.as_str()
            ),
        }
    }

    /// Absolute URL of the capability listing.
    pub fn formats_url(&self) -> String {
        format!("{}{}", self.base_url, self.formats_path)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.config.base_url = url.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn word_to_pdf_path(mut self, path: impl Into<String>) -> Self {
        self.config.word_to_pdf_path = path.into();
        self
    }

    pub fn pdf_to_word_path(mut self, path: impl Into<String>) -> Self {
        self.config.pdf_to_word_path = path.into();
        self
    }

    pub fn formats_path(mut self, path: impl Into<String>) -> Self {
        self.config.formats_path = path.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, DocConvError> {
        let c = &self.config;
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(DocConvError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got '{}'",
                c.base_url
            )));
        }
        for (name, path) in [
            ("word_to_pdf_path", &c.word_to_pdf_path),
            ("pdf_to_word_path", &c.pdf_to_word_path),
            ("formats_path", &c.formats_path),
        ] {
            if !path.starts_with('/') {
                return Err(DocConvError::InvalidConfig(format!(
                    "{name} must start with '/', got '{path}'"
                )));
            }
        }
        if c.request_timeout_secs == Some(0) {
            return Err(DocConvError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        if c.connect_timeout_secs == 0 {
            return Err(DocConvError::InvalidConfig(
                "connect timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
