//! Instrument descriptors and their reader.
//!
//! Only what a score needs to know about an instrument is modelled:
//! names, ranges, transposition, tablature strings and the playback
//! channels. Articulation, drum and MIDI action tables are consumed and
//! dropped.

use serde::{Deserialize, Serialize};

use crate::context::{MidiMapping, ReadContext};
use crate::types::Interval;
use crate::xml::XmlReader;

/// Name given to an instrument's default channel.
pub const DEFAULT_CHANNEL_NAME: &str = "normal";

/// MIDI controller numbers understood in `<controller>`.
mod ctrl {
    pub const BANK_MSB: i32 = 0;
    pub const VOLUME: i32 = 7;
    pub const PAN: i32 = 10;
    pub const BANK_LSB: i32 = 32;
    pub const REVERB: i32 = 91;
    pub const CHORUS: i32 = 93;
}

/// A playback channel of an instrument (e.g. "normal", "pizzicato").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub program: i32,
    pub bank: i32,
    pub volume: i32,
    pub pan: i32,
    pub reverb: i32,
    pub chorus: i32,
    pub synti: String,
    pub mute: bool,
    pub solo: bool,
    /// Output port, when the document assigns one
    pub midi_port: Option<i32>,
    pub midi_channel: Option<i32>,
}

impl Channel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: 0,
            bank: 0,
            volume: 100,
            pan: 64,
            reverb: 0,
            chorus: 0,
            synti: "Fluid".to_string(),
            mute: false,
            solo: false,
            midi_port: None,
            midi_channel: None,
        }
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_NAME)
    }
}

/// Open strings of a fretted instrument, lowest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringData {
    pub frets: i32,
    pub strings: Vec<InstrString>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrString {
    /// MIDI pitch of the open string
    pub pitch: i32,
    /// String cannot be fretted
    pub open: bool,
}

/// Clef an instrument starts its staff with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentClef {
    /// Staff within the part, 0 based
    pub staff: i32,
    pub clef: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// `id` attribute, e.g. "violin"
    pub id: String,
    pub long_name: String,
    pub short_name: String,
    pub track_name: String,
    /// Sound id, e.g. "strings.violin"
    pub instrument_id: String,
    pub min_pitch_p: i32,
    pub max_pitch_p: i32,
    pub min_pitch_a: i32,
    pub max_pitch_a: i32,
    pub transpose: Interval,
    pub use_drumset: bool,
    pub single_note_dynamics: bool,
    pub clefs: Vec<InstrumentClef>,
    pub string_data: Option<StringData>,
    pub channels: Vec<Channel>,
}

impl Default for Instrument {
    fn default() -> Self {
        Self {
            id: String::new(),
            long_name: String::new(),
            short_name: String::new(),
            track_name: String::new(),
            instrument_id: String::new(),
            min_pitch_p: 0,
            max_pitch_p: 127,
            min_pitch_a: 0,
            max_pitch_a: 127,
            transpose: Interval::default(),
            use_drumset: false,
            single_note_dynamics: true,
            clefs: Vec::new(),
            string_data: None,
            channels: Vec::new(),
        }
    }
}

impl Instrument {
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name == name)
    }
}

// ─── Reading ─────────────────────────────────────────────────────────

/// Read an `<Instrument>` element. With a part id, every channel that
/// names its port or MIDI channel is registered on `ctx` as a mapping of
/// that part.
pub fn read_instrument(e: &mut XmlReader, ctx: &mut ReadContext, part_id: Option<&str>) -> Instrument {
    let mut inst = Instrument {
        id: e.attribute("id").unwrap_or_default().to_string(),
        ..Default::default()
    };

    while e.read_next_start_element() {
        match e.name() {
            "longName" => inst.long_name = e.read_text(),
            "shortName" => inst.short_name = e.read_text(),
            "trackName" => inst.track_name = e.read_text(),
            "instrumentId" => inst.instrument_id = e.read_text(),
            "minPitch" => {
                // 1.x wrote one range for both
                let v = e.read_int();
                inst.min_pitch_p = v;
                inst.min_pitch_a = v;
            }
            "maxPitch" => {
                let v = e.read_int();
                inst.max_pitch_p = v;
                inst.max_pitch_a = v;
            }
            "minPitchP" => inst.min_pitch_p = e.read_int(),
            "maxPitchP" => inst.max_pitch_p = e.read_int(),
            "minPitchA" => inst.min_pitch_a = e.read_int(),
            "maxPitchA" => inst.max_pitch_a = e.read_int(),
            "transposeDiatonic" => inst.transpose.diatonic = e.read_int(),
            "transposeChromatic" => inst.transpose.chromatic = e.read_int(),
            "useDrumset" => inst.use_drumset = e.read_bool(),
            "singleNoteDynamics" => inst.single_note_dynamics = e.read_bool(),
            "clef" => {
                let staff = e.int_attribute("staff", 1).saturating_sub(1);
                let clef = e.read_text().trim().to_string();
                inst.clefs.push(InstrumentClef { staff, clef });
            }
            "StringData" => inst.string_data = Some(read_string_data(e)),
            "Channel" | "channel" => inst.channels.push(read_channel(e)),
            "Articulation" | "Drum" | "MidiAction" | "Genre" | "drumset" => {
                e.skip_current_element()
            }
            _ => e.unknown(),
        }
    }

    if inst.channels.is_empty() {
        inst.channels.push(Channel::default());
    }

    if let Some(part_id) = part_id {
        for channel in &inst.channels {
            if channel.midi_port.is_none() && channel.midi_channel.is_none() {
                continue;
            }
            ctx.add_midi_mapping(MidiMapping {
                part_id: part_id.to_string(),
                channel: channel.name.clone(),
                port: channel.midi_port.unwrap_or(0),
                midi_channel: channel.midi_channel.unwrap_or(0),
            });
        }
    }

    inst
}

fn read_string_data(e: &mut XmlReader) -> StringData {
    let mut data = StringData::default();
    while e.read_next_start_element() {
        match e.name() {
            "frets" => data.frets = e.read_int(),
            "string" => {
                let open = e.int_attribute("open", 0) != 0;
                let pitch = e.read_int();
                data.strings.push(InstrString { pitch, open });
            }
            _ => e.unknown(),
        }
    }
    data
}

fn read_channel(e: &mut XmlReader) -> Channel {
    let name = e
        .attribute("name")
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_CHANNEL_NAME);
    let mut ch = Channel::new(name);
    let mut bank_msb = 0;
    let mut bank_lsb = 0;

    while e.read_next_start_element() {
        match e.name() {
            "program" => {
                ch.program = e.int_attribute("value", -1);
                if ch.program == -1 {
                    ch.program = e.read_int();
                } else {
                    e.skip_current_element();
                }
            }
            "controller" => {
                // 7-bit MIDI data
                let value = e.int_attribute("value", 0).clamp(0, 127);
                match e.int_attribute("ctrl", -1) {
                    ctrl::BANK_MSB => bank_msb = value,
                    ctrl::BANK_LSB => bank_lsb = value,
                    ctrl::VOLUME => ch.volume = value,
                    ctrl::PAN => ch.pan = value,
                    ctrl::REVERB => ch.reverb = value,
                    ctrl::CHORUS => ch.chorus = value,
                    _ => {}
                }
                e.skip_current_element();
            }
            "synti" => ch.synti = e.read_text(),
            "midiPort" => ch.midi_port = Some(e.read_int()),
            "midiChannel" => ch.midi_channel = Some(e.read_int()),
            "mute" => {
                ch.mute = true;
                e.skip_current_element();
            }
            "solo" => {
                ch.solo = true;
                e.skip_current_element();
            }
            "descr" | "MidiAction" => e.skip_current_element(),
            _ => e.unknown(),
        }
    }
    ch.bank = (bank_msb << 7) + bank_lsb;
    ch
}
