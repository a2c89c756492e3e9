//! Forward-only element cursor over a parsed score document.
//!
//! Readers never look at the DOM directly. They walk it one start tag at a
//! time, the way a streaming pull parser is walked:
//!
//! ```text
//! while e.read_next_start_element() {
//!     match e.name() {
//!         "velocity" => d.velocity = e.read_int(),
//!         _ => e.unknown(),
//!     }
//! }
//! // cursor now sits on the closing tag of the element being read
//! ```
//!
//! Every `read_*` value accessor consumes the current element, leaving the
//! cursor on its end tag, so the next `read_next_start_element` moves on to
//! the following sibling.

use roxmltree::{Document, Node};

use crate::error::{Diagnostic, DiagnosticKind};
use crate::types::{checked_fraction, fraction_zero, Fraction, DIVISION};

#[derive(Debug, Clone, Copy)]
enum Position<'a, 'input> {
    Start(Node<'a, 'input>),
    End(Node<'a, 'input>),
}

pub struct XmlReader<'a, 'input> {
    doc: &'a Document<'input>,
    pos: Position<'a, 'input>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a, 'input> XmlReader<'a, 'input> {
    /// Cursor on the start tag of the document's root element.
    pub fn new(doc: &'a Document<'input>) -> Self {
        Self::at(doc, doc.root_element())
    }

    /// Cursor on the start tag of `node`.
    pub fn at(doc: &'a Document<'input>, node: Node<'a, 'input>) -> Self {
        Self {
            doc,
            pos: Position::Start(node),
            diagnostics: Vec::new(),
        }
    }

    fn node(&self) -> Node<'a, 'input> {
        match self.pos {
            Position::Start(n) | Position::End(n) => n,
        }
    }

    /// Tag name of the element under the cursor.
    pub fn name(&self) -> &'a str {
        self.node().tag_name().name()
    }

    pub fn is_start_element(&self) -> bool {
        matches!(self.pos, Position::Start(_))
    }

    pub fn is_end_element(&self) -> bool {
        matches!(self.pos, Position::End(_))
    }

    /// Advance to the next start tag inside the element currently being
    /// read. Returns false (cursor on that element's end tag) when there
    /// are no more children.
    pub fn read_next_start_element(&mut self) -> bool {
        match self.pos {
            Position::Start(n) => match n.first_element_child() {
                Some(child) => {
                    self.pos = Position::Start(child);
                    true
                }
                None => {
                    self.pos = Position::End(n);
                    false
                }
            },
            Position::End(n) => {
                if let Some(sibling) = n.next_sibling_element() {
                    self.pos = Position::Start(sibling);
                    return true;
                }
                if let Some(parent) = n.parent_element() {
                    self.pos = Position::End(parent);
                }
                false
            }
        }
    }

    /// Skip the whole subtree of the current element.
    pub fn skip_current_element(&mut self) {
        if let Position::Start(n) = self.pos {
            self.pos = Position::End(n);
        }
    }

    /// Record the current element as unknown and skip it.
    pub fn unknown(&mut self) {
        let tag = self.name().to_string();
        log::debug!("unknown element <{tag}>");
        self.push(DiagnosticKind::UnknownElement { tag });
        self.skip_current_element();
    }

    /// Record an out-of-domain value found at the current element.
    pub fn invalid(&mut self, what: &str, value: impl ToString) {
        let value = value.to_string();
        log::warn!("invalid {what}: {value} in <{}>", self.name());
        self.push(DiagnosticKind::InvalidValue {
            what: what.to_string(),
            value,
        });
    }

    fn push(&mut self, kind: DiagnosticKind) {
        let pos = self.doc.text_pos_at(self.node().range().start);
        self.diagnostics.push(Diagnostic {
            kind,
            line: pos.row,
            column: pos.col,
        });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    // ─── Attributes ──────────────────────────────────────────────────

    pub fn has_attribute(&self, name: &str) -> bool {
        self.node().has_attribute(name)
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.node().attribute(name)
    }

    /// Integer attribute; missing or malformed values give `default`.
    pub fn int_attribute(&self, name: &str, default: i32) -> i32 {
        self.attribute(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    pub fn double_attribute(&self, name: &str, default: f64) -> f64 {
        self.attribute(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    // ─── Element bodies ──────────────────────────────────────────────

    /// Character data of the current element; consumes the element.
    pub fn read_text(&mut self) -> String {
        match self.pos {
            Position::Start(n) => {
                let text: String = n
                    .children()
                    .filter(|c| c.is_text())
                    .filter_map(|c| c.text())
                    .collect();
                self.pos = Position::End(n);
                text
            }
            Position::End(_) => String::new(),
        }
    }

    /// Inner markup of the current element, verbatim; consumes the element.
    pub fn read_xml(&mut self) -> String {
        match self.pos {
            Position::Start(n) => {
                let inner = if n.has_children() {
                    inner_markup(&self.doc.input_text()[n.range()]).to_string()
                } else {
                    String::new()
                };
                self.pos = Position::End(n);
                inner
            }
            Position::End(_) => String::new(),
        }
    }

    pub fn read_int(&mut self) -> i32 {
        let text = self.read_text();
        match text.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                self.invalid("integer", text.trim());
                0
            }
        }
    }

    /// Floating point body, clamped into `min..=max`.
    pub fn read_double(&mut self, min: f64, max: f64) -> f64 {
        let text = self.read_text();
        match text.trim().parse::<f64>() {
            Ok(v) => v.clamp(min, max),
            Err(_) => {
                self.invalid("number", text.trim());
                0.0_f64.clamp(min, max)
            }
        }
    }

    pub fn read_f64(&mut self) -> Option<f64> {
        let text = self.read_text();
        match text.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                self.invalid("number", text.trim());
                None
            }
        }
    }

    /// Booleans are written as 0/1; "true"/"false" are accepted too.
    pub fn read_bool(&mut self) -> bool {
        let text = self.read_text();
        match text.trim() {
            "true" => true,
            "false" | "" => false,
            other => match other.parse::<i32>() {
                Ok(v) => v != 0,
                Err(_) => {
                    self.invalid("boolean", other);
                    false
                }
            },
        }
    }

    /// Fraction body: `z`/`n` attributes, a "z/n" body, or a plain tick
    /// count (legacy) measured in [`DIVISION`] ticks per quarter. Values
    /// that do not form a fraction, or overflow one, are diagnosed and
    /// read as zero.
    pub fn read_fraction(&mut self) -> Fraction {
        let mut z = self.int_attribute("z", 0);
        let mut n = self.int_attribute("n", 1);
        let text = self.read_text();
        let s = text.trim();
        if !s.is_empty() {
            match s.split_once('/') {
                None => match s.parse::<i32>() {
                    Ok(ticks) => {
                        z = ticks;
                        n = DIVISION * 4;
                    }
                    Err(_) => return self.invalid_fraction(s),
                },
                Some((num, den)) => match (num.trim().parse(), den.trim().parse()) {
                    (Ok(a), Ok(b)) => {
                        z = a;
                        n = b;
                    }
                    _ => return self.invalid_fraction(s),
                },
            }
        }
        match checked_fraction(z, n) {
            Some(f) => f,
            None => self.invalid_fraction(&format!("{z}/{n}")),
        }
    }

    fn invalid_fraction(&mut self, shown: &str) -> Fraction {
        self.invalid("fraction", shown);
        fraction_zero()
    }
}

/// Strip the start and end tag from an element's source text.
fn inner_markup(source: &str) -> &str {
    let mut quote = None;
    let mut open_end = None;
    for (i, ch) in source.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '>') => {
                open_end = Some(i + 1);
                break;
            }
            _ => {}
        }
    }
    let start = match open_end {
        Some(i) => i,
        None => return "",
    };
    let end = source.rfind("</").unwrap_or(source.len()).max(start);
    &source[start..end]
}
