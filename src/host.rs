//! Two panels under a tab selector.
//!
//! The host owns a Word → PDF panel and a PDF → Word panel that share a
//! converter and a sink but no mutable state. Switching tabs only changes
//! which panel is "in front"; neither panel is touched.

use crate::client::Converter;
use crate::direction::{Direction, WordFormat};
use crate::download::ArtifactSink;
use crate::panel::ConversionPanel;
use std::fmt;
use std::sync::Arc;

/// Which panel is in front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    WordToPdf,
    PdfToWord,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Tab::WordToPdf => "Word → PDF",
            Tab::PdfToWord => "PDF → Word",
        }
    }

    /// The tab whose panel handles `direction`.
    pub fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::WordToPdf => Tab::WordToPdf,
            Direction::PdfToWord(_) => Tab::PdfToWord,
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug)]
pub struct Host {
    active: Tab,
    word_to_pdf: ConversionPanel,
    pdf_to_word: ConversionPanel,
}

impl Host {
    pub fn new(converter: Arc<dyn Converter>, sink: Arc<dyn ArtifactSink>) -> Self {
        Self {
            active: Tab::default(),
            word_to_pdf: ConversionPanel::new(
                Direction::WordToPdf,
                Arc::clone(&converter),
                Arc::clone(&sink),
            ),
            pdf_to_word: ConversionPanel::new(
                Direction::PdfToWord(WordFormat::default()),
                converter,
                sink,
            ),
        }
    }

    pub fn active_tab(&self) -> Tab {
        self.active
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.active = tab;
    }

    pub fn panel(&self, tab: Tab) -> &ConversionPanel {
        match tab {
            Tab::WordToPdf => &self.word_to_pdf,
            Tab::PdfToWord => &self.pdf_to_word,
        }
    }

    pub fn panel_mut(&mut self, tab: Tab) -> &mut ConversionPanel {
        match tab {
            Tab::WordToPdf => &mut self.word_to_pdf,
            Tab::PdfToWord => &mut self.pdf_to_word,
        }
    }

    pub fn active_panel(&self) -> &ConversionPanel {
        self.panel(self.active)
    }

    pub fn active_panel_mut(&mut self) -> &mut ConversionPanel {
        self.panel_mut(self.active)
    }

    /// Both panels at once, for driving them concurrently.
    pub fn panels_mut(&mut self) -> (&mut ConversionPanel, &mut ConversionPanel) {
        (&mut self.word_to_pdf, &mut self.pdf_to_word)
    }
}
