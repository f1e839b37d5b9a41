//! Progress-callback trait for request lifecycle events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ClientConfigBuilder::progress_callback`] to observe a
//! conversion while it runs: the upload starting, the service answering,
//! the artifact streaming back, and the final outcome.
//!
//! # Example
//!
//! ```rust
//! use docconv::{ClientConfig, ConversionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
//!
//! struct ByteCounter {
//!     received: AtomicU64,
//! }
//!
//! impl ConversionProgressCallback for ByteCounter {
//!     fn on_download_progress(&self, received: u64, _total: Option<u64>) {
//!         self.received.store(received, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(ByteCounter { received: AtomicU64::new(0) });
//!
//! let config = ClientConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by [`crate::client::ConversionClient`] as a request progresses.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync` because the
/// client may be shared between panels running on different tasks.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once the payload is loaded, just before the request is sent.
    fn on_upload_start(&self, file_name: &str, size: u64) {
        let _ = (file_name, size);
    }

    /// Called when response headers arrive.
    fn on_response(&self, status: u16) {
        let _ = status;
    }

    /// Called after each chunk of a successful response body.
    ///
    /// `total` is the `Content-Length`, when the server sent one.
    fn on_download_progress(&self, received: u64, total: Option<u64>) {
        let _ = (received, total);
    }

    /// Called once with the artifact name and size on success.
    fn on_conversion_complete(&self, file_name: &str, bytes: u64) {
        let _ = (file_name, bytes);
    }

    /// Called once with the user-facing message on failure.
    fn on_conversion_error(&self, message: &str) {
        let _ = message;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ClientConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
