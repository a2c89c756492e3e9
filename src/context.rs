//! Ambient state shared by the readers during one load: the document's
//! compatibility context, the parts read so far, and the MIDI mappings
//! their instruments declared.

use serde::{Deserialize, Serialize};

use crate::instrument::Instrument;
use crate::types::{Fraction, VOICES};

/// Documents saved before this format version wrote instrument changes
/// without their own transposition.
pub const LEGACY_TRANSPOSE_VERSION: u32 = 206;

/// Format version assumed when a document does not declare one.
pub const CURRENT_VERSION: u32 = 420;

/// Format version of the document being read, as major * 100 + minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatContext {
    pub msc_version: u32,
}

impl Default for CompatContext {
    fn default() -> Self {
        Self {
            msc_version: CURRENT_VERSION,
        }
    }
}

impl CompatContext {
    pub fn new(msc_version: u32) -> Self {
        Self { msc_version }
    }

    /// Parse a root `version` attribute: "2.06" gives 206, "4.20" gives 420.
    pub fn from_version_attr(version: &str) -> Option<Self> {
        let (major, minor) = version.trim().split_once('.')?;
        let major: u32 = major.parse().ok()?;
        let minor: u32 = minor.parse().ok()?;
        let version = major.checked_mul(100)?.checked_add(minor)?;
        Some(Self::new(version))
    }

    /// Instrument changes inherit the staff's transposition.
    pub fn legacy_transposition(&self) -> bool {
        self.msc_version < LEGACY_TRANSPOSE_VERSION
    }
}

/// Caller-controlled load settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Format version to assume instead of the document's own (fragments
    /// have none).
    pub msc_version: Option<u32>,
    /// Reject any load that produced diagnostics.
    pub strict: bool,
}

/// Instrument in effect on a part from `tick` on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedInstrument {
    pub tick: Fraction,
    pub instrument: Instrument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,
    pub name: String,
    /// First track of the part's staves
    pub start_track: i32,
    /// One past the last track
    pub end_track: i32,
    /// Sorted by tick
    pub instruments: Vec<TimedInstrument>,
}

impl Part {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            start_track: 0,
            end_track: 0,
            instruments: Vec::new(),
        }
    }

    pub fn has_track(&self, track: i32) -> bool {
        (self.start_track..self.end_track).contains(&track)
    }

    /// Give the part the staves `first..=last` (zero based).
    pub fn set_staves(&mut self, first: i32, last: i32) {
        self.start_track = first * VOICES as i32;
        self.end_track = (last + 1) * VOICES as i32;
    }

    /// Instrument in effect at `tick`.
    pub fn instrument(&self, tick: Fraction) -> Option<&Instrument> {
        self.instruments
            .iter()
            .rev()
            .find(|i| i.tick <= tick)
            .or_else(|| self.instruments.first())
            .map(|i| &i.instrument)
    }

    pub fn set_instrument(&mut self, tick: Fraction, instrument: Instrument) {
        match self.instruments.iter().position(|i| i.tick >= tick) {
            Some(idx) if self.instruments[idx].tick == tick => {
                self.instruments[idx].instrument = instrument;
            }
            Some(idx) => self
                .instruments
                .insert(idx, TimedInstrument { tick, instrument }),
            None => self.instruments.push(TimedInstrument { tick, instrument }),
        }
    }
}

/// Port and channel a part's instrument channel plays on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiMapping {
    pub part_id: String,
    /// Channel name within the instrument
    pub channel: String,
    pub port: i32,
    pub midi_channel: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ReadContext {
    pub compat: CompatContext,
    pub parts: Vec<Part>,
    pub midi_mappings: Vec<MidiMapping>,
}

impl ReadContext {
    pub fn new(compat: CompatContext) -> Self {
        Self {
            compat,
            ..Default::default()
        }
    }

    pub fn msc_version(&self) -> u32 {
        self.compat.msc_version
    }

    pub fn part_for_track(&self, track: i32) -> Option<&Part> {
        self.parts.iter().find(|p| p.has_track(track))
    }

    pub fn part_for_track_mut(&mut self, track: i32) -> Option<&mut Part> {
        self.parts.iter_mut().find(|p| p.has_track(track))
    }

    /// Instrument active on the staff of `track` at `tick`.
    pub fn instrument_at(&self, track: i32, tick: Fraction) -> Option<&Instrument> {
        self.part_for_track(track)?.instrument(tick)
    }

    /// Make `instrument` the active one of `track`'s part from `tick` on.
    /// Returns false when no part owns the track.
    pub fn set_instrument(&mut self, track: i32, tick: Fraction, instrument: Instrument) -> bool {
        match self.part_for_track_mut(track) {
            Some(part) => {
                part.set_instrument(tick, instrument);
                true
            }
            None => false,
        }
    }

    pub fn add_midi_mapping(&mut self, mapping: MidiMapping) {
        self.midi_mappings.push(mapping);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Interval;

    #[test]
    fn version_attribute() {
        assert_eq!(CompatContext::from_version_attr("2.06"), Some(CompatContext::new(206)));
        assert_eq!(CompatContext::from_version_attr("4.20"), Some(CompatContext::new(420)));
        assert_eq!(CompatContext::from_version_attr("1.14"), Some(CompatContext::new(114)));
        assert_eq!(CompatContext::from_version_attr("four"), None);
        assert_eq!(CompatContext::from_version_attr("99999999.00"), None);
        assert_eq!(ReadContext::new(CompatContext::new(302)).msc_version(), 302);
        assert_eq!(ReadContext::default().msc_version(), CURRENT_VERSION);
        assert!(CompatContext::new(205).legacy_transposition());
        assert!(!CompatContext::new(206).legacy_transposition());
    }

    #[test]
    fn instrument_lookup_by_tick() {
        let mut part = Part::new("P1");
        part.set_staves(0, 1);
        let mut clarinet = Instrument::default();
        clarinet.transpose = Interval { diatonic: -1, chromatic: -2 };
        part.set_instrument(Fraction::from_integer(0), Instrument::default());
        part.set_instrument(Fraction::from_integer(2), clarinet.clone());

        assert!(part.has_track(7));
        assert!(!part.has_track(8));
        assert_eq!(part.instrument(Fraction::new(3, 2)), Some(&Instrument::default()));
        assert_eq!(part.instrument(Fraction::from_integer(2)), Some(&clarinet));
        assert_eq!(part.instrument(Fraction::from_integer(9)), Some(&clarinet));
    }
}
