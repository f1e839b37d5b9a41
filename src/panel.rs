//! The per-direction conversion lifecycle.
//!
//! A [`ConversionPanel`] owns one candidate file at a time and walks it
//! through admission, upload and delivery:
//!
//! ```text
//!             select_file(valid)                 convert()
//!   ┌──────┐ ───────────────▶ Validating ─▶ Idle ─────────▶ Converting
//!   │ Idle │                      │       (file held)          │   │
//!   └──────┘ ◀── reset() ──┐      │ invalid                ok  │   │ err
//!                          │      ▼                            ▼   ▼
//!                          └── Error (message) ◀─────── Success   Error
//!                                                        │
//!                                                 sink.deliver(artifact)
//! ```
//!
//! The same type serves both directions; everything direction-specific
//! comes from the [`Direction`] it was built with. All transitions take
//! `&mut self`, so a panel can never have two requests in flight. If a
//! pending [`ConversionPanel::convert`] future is dropped the panel stays
//! in `Converting` until [`ConversionPanel::reset`] is called; further
//! `convert` calls are no-ops in that state.

use crate::client::Converter;
use crate::direction::{Direction, WordFormat};
use crate::download::ArtifactSink;
use crate::error::ValidationError;
use crate::validate::{format_file_size, validate, CandidateFile, ValidationOutcome};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

/// Lifecycle state of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelStatus {
    Idle,
    Validating,
    Converting,
    Success,
    Error,
}

impl fmt::Display for PanelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PanelStatus::Idle => "idle",
            PanelStatus::Validating => "validating",
            PanelStatus::Converting => "converting",
            PanelStatus::Success => "success",
            PanelStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// What an observer sees after each transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelSnapshot {
    pub status: PanelStatus,
    pub direction: Direction,
    pub file_name: Option<String>,
    /// Human-readable size of the held file, e.g. `"2 KB"`.
    pub file_size: Option<String>,
    pub error: Option<String>,
    pub delivered_to: Option<PathBuf>,
}

/// Drives one conversion direction.
pub struct ConversionPanel {
    direction: Direction,
    converter: Arc<dyn Converter>,
    sink: Arc<dyn ArtifactSink>,
    status: PanelStatus,
    file: Option<CandidateFile>,
    error: Option<String>,
    delivered_to: Option<PathBuf>,
    state_tx: watch::Sender<PanelSnapshot>,
}

impl fmt::Debug for ConversionPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionPanel")
            .field("direction", &self.direction)
            .field("status", &self.status)
            .field("file", &self.file.as_ref().map(CandidateFile::name))
            .field("error", &self.error)
            .field("delivered_to", &self.delivered_to)
            .finish_non_exhaustive()
    }
}

impl ConversionPanel {
    pub fn new(
        direction: Direction,
        converter: Arc<dyn Converter>,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        let initial = PanelSnapshot {
            status: PanelStatus::Idle,
            direction,
            file_name: None,
            file_size: None,
            error: None,
            delivered_to: None,
        };
        let (state_tx, _) = watch::channel(initial);
        Self {
            direction,
            converter,
            sink,
            status: PanelStatus::Idle,
            file: None,
            error: None,
            delivered_to: None,
            state_tx,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn status(&self) -> PanelStatus {
        self.status
    }

    /// The admitted file, if any.
    pub fn file(&self) -> Option<&CandidateFile> {
        self.file.as_ref()
    }

    /// Message to show inline, if the last attempt failed.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Where the last artifact was delivered.
    pub fn delivered_to(&self) -> Option<&Path> {
        self.delivered_to.as_deref()
    }

    /// Whether the convert control is enabled.
    pub fn can_convert(&self) -> bool {
        self.file.is_some() && self.status != PanelStatus::Converting
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            status: self.status,
            direction: self.direction,
            file_name: self.file.as_ref().map(|f| f.name().to_string()),
            file_size: self.file.as_ref().map(|f| format_file_size(f.size())),
            error: self.error.clone(),
            delivered_to: self.delivered_to.clone(),
        }
    }

    /// Stream of snapshots, starting with the current one.
    ///
    /// Observers see the latest state; a transient state such as
    /// `Validating` may be coalesced with the one that follows it.
    pub fn subscribe(&self) -> WatchStream<PanelSnapshot> {
        WatchStream::new(self.state_tx.subscribe())
    }

    /// Choose the Word flavour for a PDF → Word panel.
    ///
    /// Returns `false` (and changes nothing) on a Word → PDF panel.
    pub fn set_target_format(&mut self, format: WordFormat) -> bool {
        match self.direction {
            Direction::PdfToWord(_) => {
                self.direction = Direction::PdfToWord(format);
                self.publish();
                true
            }
            Direction::WordToPdf => false,
        }
    }

    /// Supply a new file (picker or drop), superseding any previous one.
    ///
    /// Clears prior messages and results. `None` (an empty selection)
    /// leaves the panel idle with nothing held and reports
    /// [`ValidationError::NoFile`] without surfacing it as an error.
    pub fn select_file(&mut self, file: Option<CandidateFile>) -> ValidationOutcome {
        self.error = None;
        self.delivered_to = None;
        self.file = None;

        let Some(file) = file else {
            self.set_status(PanelStatus::Idle);
            return Err(ValidationError::NoFile);
        };

        self.set_status(PanelStatus::Validating);
        let outcome = validate(Some(&file), self.direction.source_family());

        match &outcome {
            Ok(()) => {
                debug!("Admitted '{}' for {}", file.name(), self.direction);
                self.file = Some(file);
                self.set_status(PanelStatus::Idle);
            }
            Err(e) => {
                debug!("Rejected '{}': {}", file.name(), e);
                self.error = Some(e.to_string());
                self.set_status(PanelStatus::Error);
            }
        }

        outcome
    }

    /// Convert the held file and deliver the result.
    ///
    /// A no-op unless [`Self::can_convert`] holds. Returns the status the
    /// panel ends in.
    pub async fn convert(&mut self) -> PanelStatus {
        if !self.can_convert() {
            debug!("Convert ignored in state {}", self.status);
            return self.status;
        }

        self.error = None;
        self.delivered_to = None;
        self.set_status(PanelStatus::Converting);

        let outcome = match self.file.as_ref() {
            Some(file) => self.converter.convert(file, self.direction).await,
            None => return self.status,
        };

        match outcome {
            Ok(artifact) => {
                self.set_status(PanelStatus::Success);
                // The artifact lives only for the delivery call.
                let delivery = self.sink.deliver(&artifact).await;
                drop(artifact);

                match delivery {
                    Ok(path) => {
                        info!("{} delivered to {}", self.direction.label(), path.display());
                        self.delivered_to = Some(path);
                        self.publish();
                    }
                    Err(e) => {
                        warn!("Delivery failed: {}", e);
                        self.error = Some(e.to_string());
                        self.set_status(PanelStatus::Error);
                    }
                }
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.set_status(PanelStatus::Error);
            }
        }

        self.status
    }

    /// Drop the held file and any message; back to `Idle`.
    pub fn reset(&mut self) {
        self.file = None;
        self.error = None;
        self.delivered_to = None;
        self.set_status(PanelStatus::Idle);
    }

    fn set_status(&mut self, status: PanelStatus) {
        self.status = status;
        self.publish();
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.snapshot());
    }
}
