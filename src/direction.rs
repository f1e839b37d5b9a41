//! Conversion directions and the document families they accept.
//!
//! A [`Direction`] carries everything that differs between the Word→PDF and
//! PDF→Word flows: which family the input must belong to, which endpoint the
//! upload goes to, and what the artifact is called when the server does not
//! suggest a name. The panel, validator and client are written once against
//! this type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Allowed extensions for Word input, lowercase with leading dot.
pub const WORD_EXTENSIONS: &[&str] = &[".doc", ".docx"];

/// MIME types browsers and OSes report for Word documents.
pub const WORD_MIME_TYPES: &[&str] = &[
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Allowed extensions for PDF input.
pub const PDF_EXTENSIONS: &[&str] = &[".pdf"];

/// MIME types reported for PDF documents.
pub const PDF_MIME_TYPES: &[&str] = &["application/pdf"];

/// A family of document formats the validator can admit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFamily {
    Word,
    Pdf,
}

impl DocumentFamily {
    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            DocumentFamily::Word => WORD_EXTENSIONS,
            DocumentFamily::Pdf => PDF_EXTENSIONS,
        }
    }

    pub fn allowed_mime_types(self) -> &'static [&'static str] {
        match self {
            DocumentFamily::Word => WORD_MIME_TYPES,
            DocumentFamily::Pdf => PDF_MIME_TYPES,
        }
    }

    /// Guess the family from a file name's extension (case-insensitive).
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        [DocumentFamily::Word, DocumentFamily::Pdf]
            .into_iter()
            .find(|family| {
                family
                    .allowed_extensions()
                    .iter()
                    .any(|ext| lower.ends_with(ext))
            })
    }
}

impl fmt::Display for DocumentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFamily::Word => f.write_str("Word"),
            DocumentFamily::Pdf => f.write_str("PDF"),
        }
    }
}

/// The Word flavour produced by a PDF→Word conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordFormat {
    /// Office Open XML (Word 2007+). (default)
    #[default]
    Docx,
    /// Legacy binary Word 97–2003.
    Doc,
}

impl WordFormat {
    /// Value sent as the `targetFormat` parameter and used as file extension.
    pub fn as_str(self) -> &'static str {
        match self {
            WordFormat::Docx => "docx",
            WordFormat::Doc => "doc",
        }
    }
}

impl fmt::Display for WordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WordFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "docx" => Ok(WordFormat::Docx),
            "doc" => Ok(WordFormat::Doc),
            other => Err(format!("unknown Word format '{other}' (expected docx or doc)")),
        }
    }
}

/// Which way a conversion goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    WordToPdf,
    PdfToWord(WordFormat),
}

impl Direction {
    /// Family the uploaded file must belong to.
    pub fn source_family(self) -> DocumentFamily {
        match self {
            Direction::WordToPdf => DocumentFamily::Word,
            Direction::PdfToWord(_) => DocumentFamily::Pdf,
        }
    }

    /// Extension of the produced artifact, without the dot.
    pub fn output_extension(self) -> &'static str {
        match self {
            Direction::WordToPdf => "pdf",
            Direction::PdfToWord(format) => format.as_str(),
        }
    }

    /// Artifact name used when the server does not suggest one.
    pub fn default_file_name(self) -> String {
        format!("converted.{}", self.output_extension())
    }

    /// Short label for logs and the CLI.
    pub fn label(self) -> &'static str {
        match self {
            Direction::WordToPdf => "Word → PDF",
            Direction::PdfToWord(_) => "PDF → Word",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::WordToPdf => f.write_str("word-to-pdf"),
            Direction::PdfToWord(format) => write!(f, "pdf-to-word ({format})"),
        }
    }
}
