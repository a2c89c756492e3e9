//! Error types.
//!
//! Two tiers: [`ReadError`] aborts a whole load, [`Diagnostic`] records a
//! problem with one tag or value while the surrounding read carries on.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal load failure.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Failed to read file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open MSCZ archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Invalid UTF-8 in score file: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("{0}")]
    Container(String),

    #[error("Unsupported root element: '{0}'. Only 'museScore' is supported.")]
    UnsupportedRoot(String),

    #[error("'{0}' is not a readable element type")]
    UnknownElementType(String),

    #[error("{count} diagnostic(s) in strict mode, first: {first}")]
    Strict { count: usize, first: Diagnostic },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What went wrong with a single tag or value.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DiagnosticKind {
    #[error("unknown element <{tag}>")]
    UnknownElement { tag: String },

    #[error("invalid {what}: {value}")]
    InvalidValue { what: String, value: String },
}

/// A non-fatal problem found while reading, with its source position.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind} at line {line}, column {column}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: u32,
    pub column: u32,
}

impl Diagnostic {
    pub fn is_unknown_element(&self, name: &str) -> bool {
        matches!(&self.kind, DiagnosticKind::UnknownElement { tag } if tag == name)
    }

    pub fn is_invalid_value(&self) -> bool {
        matches!(self.kind, DiagnosticKind::InvalidValue { .. })
    }
}
