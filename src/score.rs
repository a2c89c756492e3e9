//! Document loader: walks a score file's parts and staff streams, keeps
//! track of the time position, and hands every annotation it meets to the
//! entity readers.
//!
//! Notes, beams, spanners and layout content are skipped without
//! diagnostics; only their durations are looked at, to know where the
//! following annotations sit.

use std::collections::HashMap;

use roxmltree::Document;
use serde::{Deserialize, Serialize};

use crate::context::{CompatContext, LoadOptions, MidiMapping, Part, ReadContext};
use crate::error::{Diagnostic, ReadError};
use crate::instrument::read_instrument;
use crate::model::{Element, ElementType};
use crate::read::read_element;
use crate::types::*;
use crate::xml::XmlReader;

/// Everything read from one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedScore {
    pub msc_version: u32,
    pub parts: Vec<Part>,
    /// Annotations in document order
    pub elements: Vec<Element>,
    pub midi_mappings: Vec<MidiMapping>,
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadedScore {
    pub fn elements_of(&self, kind: ElementType) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(move |el| el.element_type() == kind)
    }
}

/// Load a parsed `museScore` document.
pub fn load_document(doc: &Document, options: &LoadOptions) -> Result<LoadedScore, ReadError> {
    let root = doc.root_element();
    let root_name = root.tag_name().name();
    if root_name != "museScore" {
        return Err(ReadError::UnsupportedRoot(root_name.to_string()));
    }

    let compat = match options.msc_version {
        Some(v) => CompatContext::new(v),
        None => root
            .attribute("version")
            .and_then(CompatContext::from_version_attr)
            .unwrap_or_default(),
    };

    let mut e = XmlReader::new(doc);
    let mut loader = ScoreLoader::new(ReadContext::new(compat));
    while e.read_next_start_element() {
        match e.name() {
            "Score" => loader.read_score(&mut e),
            // 1.x files keep the score content directly under the root
            _ => {
                if !loader.read_score_tag(&mut e) {
                    e.skip_current_element();
                }
            }
        }
    }

    let score = LoadedScore {
        msc_version: compat.msc_version,
        parts: loader.ctx.parts,
        elements: loader.elements,
        midi_mappings: loader.ctx.midi_mappings,
        diagnostics: e.take_diagnostics(),
    };
    log::info!(
        "loaded format {}: {} parts, {} annotations, {} diagnostics",
        score.msc_version,
        score.parts.len(),
        score.elements.len(),
        score.diagnostics.len()
    );
    Ok(score)
}

// ─── Loader state ────────────────────────────────────────────────────

/// Position inside one voice of a measure.
struct Stream {
    track: i32,
    /// Measure start
    start: Fraction,
    /// Offset from the measure start
    pos: Fraction,
    /// Ratios of the tuplets currently open
    tuplets: Vec<Fraction>,
}

impl Stream {
    fn new(track: i32, start: Fraction) -> Self {
        Self {
            track,
            start,
            pos: fraction_zero(),
            tuplets: Vec::new(),
        }
    }

    /// Absolute position. Positions are only ever moved to values whose
    /// absolute form fits, so the fallback is never taken.
    fn tick(&self) -> Fraction {
        checked_add(self.start, self.pos).unwrap_or(self.start)
    }

    fn tuplet_ratio(&self) -> Option<Fraction> {
        self.tuplets
            .iter()
            .try_fold(Fraction::from_integer(1), |acc, r| checked_mul(acc, *r))
    }

    /// Move to `pos` from the measure start. False when the absolute
    /// position would overflow; the stream then stays where it was.
    fn seek(&mut self, pos: Option<Fraction>) -> bool {
        match pos.filter(|p| checked_add(self.start, *p).is_some()) {
            Some(p) => {
                self.pos = p;
                true
            }
            None => false,
        }
    }

    fn advance(&mut self, len: Fraction) -> bool {
        self.seek(checked_add(self.pos, len))
    }

    /// Move to an absolute position.
    fn seek_absolute(&mut self, tick: Fraction) -> bool {
        self.seek(checked_sub(tick, self.start))
    }
}

/// Staff ids are 1 based; ids whose tracks would not fit an i32 are
/// rejected.
const MAX_STAFF_ID: i32 = i32::MAX / VOICES as i32;

/// Largest accepted legacy tick base.
const MAX_DIVISION: i32 = i32::MAX / 4;

struct ScoreLoader {
    ctx: ReadContext,
    elements: Vec<Element>,
    /// Ticks per quarter of legacy tick values
    division: i32,
    /// Staves declared by parts so far
    staves: i32,
    time_sig: Fraction,
    /// Tuplets declared by id (3.x)
    tuplets_by_id: HashMap<i32, Fraction>,
}

impl ScoreLoader {
    fn new(ctx: ReadContext) -> Self {
        Self {
            ctx,
            elements: Vec::new(),
            division: DIVISION,
            staves: 0,
            time_sig: Fraction::from_integer(1),
            tuplets_by_id: HashMap::new(),
        }
    }

    fn read_score(&mut self, e: &mut XmlReader) {
        while e.read_next_start_element() {
            if !self.read_score_tag(e) {
                // includes nested excerpt scores
                e.skip_current_element();
            }
        }
    }

    fn read_score_tag(&mut self, e: &mut XmlReader) -> bool {
        match e.name() {
            "Division" => {
                let division = e.read_int();
                if (1..=MAX_DIVISION).contains(&division) {
                    self.division = division;
                } else {
                    e.invalid("division", division);
                }
            }
            "Part" => self.read_part(e),
            "Staff" => self.read_staff(e),
            _ => return false,
        }
        true
    }

    fn read_part(&mut self, e: &mut XmlReader) {
        let id = e
            .attribute("id")
            .map(str::to_string)
            .unwrap_or_else(|| (self.ctx.parts.len() + 1).to_string());
        let mut part = Part::new(id);
        let mut staves: Option<(i32, i32)> = None;

        while e.read_next_start_element() {
            match e.name() {
                "Staff" => {
                    if let Some(idx) = staff_index(e, self.staves + 1) {
                        staves = Some(match staves {
                            Some((first, _)) => (first, idx),
                            None => (idx, idx),
                        });
                        self.staves = self.staves.max(idx + 1);
                    }
                    e.skip_current_element();
                }
                "trackName" => part.name = e.read_text(),
                "Instrument" => {
                    let inst = read_instrument(e, &mut self.ctx, Some(&part.id));
                    if part.name.is_empty() {
                        part.name = inst.track_name.clone();
                    }
                    part.set_instrument(fraction_zero(), inst);
                }
                _ => e.skip_current_element(),
            }
        }

        if let Some((first, last)) = staves {
            part.set_staves(first, last);
        }
        log::debug!("part {} '{}' tracks {}..{}", part.id, part.name, part.start_track, part.end_track);
        self.ctx.parts.push(part);
    }

    fn read_staff(&mut self, e: &mut XmlReader) {
        let Some(staff) = staff_index(e, 1) else {
            e.skip_current_element();
            return;
        };
        let mut measure_start = fraction_zero();
        self.time_sig = Fraction::from_integer(1);
        self.tuplets_by_id.clear();

        while e.read_next_start_element() {
            match e.name() {
                "Measure" => {
                    let len = self.read_measure(e, staff, measure_start);
                    match checked_add(measure_start, len) {
                        Some(next) => measure_start = next,
                        None => e.invalid("measure length", len),
                    }
                }
                _ => e.skip_current_element(),
            }
        }
    }

    /// Read one measure and return its length.
    fn read_measure(&mut self, e: &mut XmlReader, staff: i32, start: Fraction) -> Fraction {
        let explicit_len = match e.attribute("len") {
            Some(len) => {
                let parsed = parse_fraction(len);
                if parsed.is_none() {
                    e.invalid("measure length", len);
                }
                parsed
            }
            None => None,
        };
        let first_track = staff * VOICES as i32;
        let mut voice = 0;
        // 2.x and older: no voice elements
        let mut direct = Stream::new(first_track, start);

        while e.read_next_start_element() {
            if e.name() == "voice" {
                if voice >= VOICES as i32 {
                    e.invalid("voice", voice);
                    e.skip_current_element();
                    continue;
                }
                let mut stream = Stream::new(first_track + voice, start);
                voice += 1;
                while e.read_next_start_element() {
                    self.read_stream_tag(e, &mut stream);
                }
            } else {
                self.read_stream_tag(e, &mut direct);
            }
        }

        explicit_len.unwrap_or(self.time_sig)
    }

    fn read_stream_tag(&mut self, e: &mut XmlReader, stream: &mut Stream) {
        let tag = e.name();
        match tag {
            "Chord" | "Rest" => self.read_chord_rest(e, stream),
            "Tuplet" => {
                let id = e.attribute("id");
                let ratio = read_tuplet(e);
                match id {
                    Some(id) => {
                        if let Ok(id) = id.trim().parse() {
                            self.tuplets_by_id.insert(id, ratio);
                        }
                    }
                    None => stream.tuplets.push(ratio),
                }
            }
            "endTuplet" => {
                stream.tuplets.pop();
                e.skip_current_element();
            }
            "location" => {
                while e.read_next_start_element() {
                    match e.name() {
                        "fractions" => {
                            let offset = e.read_fraction();
                            if !stream.advance(offset) {
                                e.invalid("location", offset);
                            }
                        }
                        _ => e.skip_current_element(),
                    }
                }
            }
            "tick" => self.read_legacy_tick(e, stream),
            "TimeSig" => self.read_time_sig(e),
            _ => match ElementType::from_xml_name(tag) {
                Some(kind) => self.read_annotation(kind, e, stream.track, stream.tick()),
                None => e.skip_current_element(),
            },
        }
    }

    fn read_chord_rest(&mut self, e: &mut XmlReader, stream: &mut Stream) {
        let mut duration_type = None;
        let mut dots = 0;
        let mut duration = None;
        let mut grace = false;
        let mut tuplet = None;
        let mut track = stream.track;

        while e.read_next_start_element() {
            let tag = e.name();
            match tag {
                "durationType" => {
                    let text = e.read_text();
                    duration_type = DurationType::from_xml(&text);
                    if duration_type.is_none() {
                        e.invalid("duration type", text.trim());
                    }
                }
                "dots" => dots = u32::try_from(e.read_int()).unwrap_or(0),
                "duration" => duration = Some(e.read_fraction()),
                "acciaccatura" | "appoggiatura" | "grace4" | "grace8after" | "grace16"
                | "grace16after" | "grace32" | "grace32after" => {
                    grace = true;
                    e.skip_current_element();
                }
                "Tuplet" => {
                    let id = e.read_int();
                    tuplet = self.tuplets_by_id.get(&id).copied();
                }
                "tick" => self.read_legacy_tick(e, stream),
                "track" => track = e.read_int(),
                _ => match ElementType::from_xml_name(tag) {
                    Some(kind) => self.read_annotation(kind, e, track, stream.tick()),
                    None => e.skip_current_element(),
                },
            }
        }

        if grace {
            return;
        }
        let base = match duration_type {
            Some(DurationType::Measure) => Some(duration.unwrap_or(self.time_sig)),
            Some(t) => t.fraction().map(|f| dotted(f, dots)),
            None => duration,
        };
        let Some(len) = base else {
            return;
        };
        let scaled = stream
            .tuplet_ratio()
            .and_then(|r| checked_mul(r, tuplet.unwrap_or(Fraction::from_integer(1))))
            .and_then(|r| checked_mul(len, r));
        match scaled {
            Some(len) if stream.advance(len) => {}
            _ => e.invalid("duration", len),
        }
    }

    fn read_time_sig(&mut self, e: &mut XmlReader) {
        let mut n = 0;
        let mut d = 0;
        while e.read_next_start_element() {
            match e.name() {
                "sigN" | "nom1" => n = e.read_int(),
                "sigD" | "den" => d = e.read_int(),
                _ => e.skip_current_element(),
            }
        }
        if n > 0 && d > 0 {
            self.time_sig = Fraction::new(n, d);
        } else {
            e.invalid("time signature", format!("{n}/{d}"));
        }
    }

    /// Move `stream` to the absolute position of a legacy `<tick>` body.
    fn read_legacy_tick(&self, e: &mut XmlReader, stream: &mut Stream) {
        let ticks = e.read_int();
        let moved = checked_fraction(ticks, self.division * 4)
            .map(|tick| stream.seek_absolute(tick))
            .unwrap_or(false);
        if !moved {
            e.invalid("tick", ticks);
        }
    }

    fn read_annotation(&mut self, kind: ElementType, e: &mut XmlReader, track: i32, tick: Fraction) {
        let mut el = Element::new(kind);
        el.set_position(track, tick);
        read_element(&mut el, e, &mut self.ctx);

        if let Element::InstrumentChange(change) = &el {
            let applied =
                self.ctx
                    .set_instrument(el.track(), el.tick(), change.instrument.clone());
            if !applied {
                log::warn!("instrument change on track {} outside every part", el.track());
            }
        }
        self.elements.push(el);
    }
}

/// Ratio of a `<Tuplet>` definition: normal notes over actual notes.
fn read_tuplet(e: &mut XmlReader) -> Fraction {
    let mut normal = 0;
    let mut actual = 0;
    while e.read_next_start_element() {
        match e.name() {
            "normalNotes" => normal = e.read_int(),
            "actualNotes" => actual = e.read_int(),
            _ => e.skip_current_element(),
        }
    }
    if normal > 0 && actual > 0 {
        Fraction::new(normal, actual)
    } else {
        e.invalid("tuplet", format!("{normal}:{actual}"));
        Fraction::from_integer(1)
    }
}

/// Zero based index of the `id` attribute of a `<Staff>`.
fn staff_index(e: &mut XmlReader, default: i32) -> Option<i32> {
    let id = e.int_attribute("id", default);
    if (1..=MAX_STAFF_ID).contains(&id) {
        Some(id - 1)
    } else {
        e.invalid("staff id", id);
        None
    }
}

/// "3/4" as a fraction.
fn parse_fraction(s: &str) -> Option<Fraction> {
    let (n, d) = s.trim().split_once('/')?;
    let n: i32 = n.trim().parse().ok()?;
    let d: i32 = d.trim().parse().ok()?;
    checked_fraction(n, d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_len_attribute() {
        assert_eq!(parse_fraction("3/4"), Some(Fraction::new(3, 4)));
        assert_eq!(parse_fraction("1/0"), None);
        assert_eq!(parse_fraction("x"), None);
        assert_eq!(parse_fraction("-2147483648/-1"), None);
    }

    #[test]
    fn stream_refuses_overflowing_positions() {
        let mut s = Stream::new(0, Fraction::from_integer(i32::MAX - 1));
        assert!(s.advance(Fraction::from_integer(1)));
        assert!(!s.advance(Fraction::from_integer(1)));
        assert_eq!(s.tick(), Fraction::from_integer(i32::MAX));
        assert!(!s.seek_absolute(Fraction::from_integer(i32::MIN)));
        assert_eq!(s.pos, Fraction::from_integer(1));

        s.tuplets.push(Fraction::new(1, 1 << 16));
        s.tuplets.push(Fraction::new(1, 1 << 16));
        assert_eq!(s.tuplet_ratio(), None);
    }

    #[test]
    fn tuplet_ratios_nest() {
        let mut s = Stream::new(0, fraction_zero());
        s.tuplets.push(Fraction::new(2, 3));
        s.tuplets.push(Fraction::new(4, 5));
        assert_eq!(s.tuplet_ratio(), Some(Fraction::new(8, 15)));
    }
}
