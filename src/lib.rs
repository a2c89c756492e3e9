//! engraving_read — reader for MuseScore score files.
//!
//! Loads uncompressed (.mscx) and packaged (.mscz) scores into an object
//! model of the annotations they carry: tempo and dynamic markings, staff
//! and system texts, chord symbols, fretboard diagrams, bends, instrument
//! changes, staff states and figured bass.
//!
//! # Example
//! ```no_run
//! use engraving_read::{read_file, ElementType, LoadOptions};
//!
//! let score = read_file("path/to/score.mscz", &LoadOptions::default()).unwrap();
//! println!("Format: {}", score.msc_version);
//! println!("Chord symbols: {}", score.elements_of(ElementType::Harmony).count());
//! for d in &score.diagnostics {
//!     println!("{d}");
//! }
//! ```

pub mod archive;
pub mod context;
pub mod error;
pub mod instrument;
pub mod model;
pub mod property;
pub mod read;
pub mod score;
pub mod types;
pub mod xml;

use std::path::Path;

use roxmltree::Document;
use serde::{Deserialize, Serialize};

pub use context::{CompatContext, LoadOptions, MidiMapping, Part, ReadContext};
pub use error::{Diagnostic, DiagnosticKind, ReadError};
pub use instrument::Instrument;
pub use model::*;
pub use read::read_element;
pub use score::{load_document, LoadedScore};
pub use xml::XmlReader;

/// Read a score file from a path.
/// Format is chosen by extension:
/// - `.mscx` → uncompressed score
/// - `.mscz` → compressed package (ZIP archive)
pub fn read_file<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<LoadedScore, ReadError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| ReadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    read_bytes(&data, path.extension().and_then(|e| e.to_str()), options)
}

/// Read a score from raw bytes with an optional format hint.
/// If `extension` is None, the format is detected from the content.
pub fn read_bytes(data: &[u8], extension: Option<&str>, options: &LoadOptions) -> Result<LoadedScore, ReadError> {
    match extension {
        Some("mscz") => read_mscz(data, options),
        Some("mscx") => read_mscx(std::str::from_utf8(data)?, options),
        _ => {
            // XML first, then ZIP
            if let Ok(xml) = std::str::from_utf8(data) {
                if xml.trim_start().starts_with('<') {
                    return read_mscx(xml, options);
                }
            }
            read_mscz(data, options)
        }
    }
}

pub fn read_mscz(data: &[u8], options: &LoadOptions) -> Result<LoadedScore, ReadError> {
    let xml = archive::extract_mscx_from_mscz(data)?;
    read_mscx(&xml, options)
}

/// Read an uncompressed score document.
pub fn read_mscx(xml: &str, options: &LoadOptions) -> Result<LoadedScore, ReadError> {
    let doc = Document::parse(xml)?;
    let score = load_document(&doc, options)?;
    check_strict(options, &score.diagnostics)?;
    Ok(score)
}

/// A single entity read on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedElement {
    pub element: Element,
    pub diagnostics: Vec<Diagnostic>,
}

/// Read one annotation fragment such as `<Dynamic>...</Dynamic>`. The
/// root tag selects the entity kind. Without a version in `options` the
/// current format is assumed.
pub fn read_element_str(xml: &str, options: &LoadOptions) -> Result<LoadedElement, ReadError> {
    let doc = Document::parse(xml)?;
    let tag = doc.root_element().tag_name().name();
    let kind = ElementType::from_xml_name(tag)
        .ok_or_else(|| ReadError::UnknownElementType(tag.to_string()))?;

    let compat = options.msc_version.map(CompatContext::new).unwrap_or_default();
    let mut ctx = ReadContext::new(compat);
    let mut e = XmlReader::new(&doc);
    let mut element = Element::new(kind);
    read_element(&mut element, &mut e, &mut ctx);

    let diagnostics = e.take_diagnostics();
    check_strict(options, &diagnostics)?;
    Ok(LoadedElement {
        element,
        diagnostics,
    })
}

fn check_strict(options: &LoadOptions, diagnostics: &[Diagnostic]) -> Result<(), ReadError> {
    match diagnostics.first() {
        Some(first) if options.strict => Err(ReadError::Strict {
            count: diagnostics.len(),
            first: first.clone(),
        }),
        _ => Ok(()),
    }
}

/// Convert a loaded score to a JSON string.
pub fn score_to_json(score: &LoadedScore) -> Result<String, ReadError> {
    Ok(serde_json::to_string_pretty(score)?)
}
