//! Value types shared by the model and the readers, with their XML token
//! conversions.
//!
//! Token spellings are part of the file format: they are what older and
//! newer versions of the format write, so they never change.

use serde::{Deserialize, Serialize};

/// A time position or duration, in whole notes.
pub type Fraction = num_rational::Ratio<i32>;

/// Ticks per quarter note.
pub const DIVISION: i32 = 480;
/// Voices per staff.
pub const VOICES: usize = 4;
/// Tempo used when a tempo marking carries no readable value, in beats per
/// second (120 BPM).
pub const DEFAULT_TEMPO: f64 = 2.0;

pub fn fraction_zero() -> Fraction {
    Fraction::from_integer(0)
}

// ─── Durations ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationType {
    Long,
    Breve,
    Whole,
    Half,
    Quarter,
    Eighth,
    D16th,
    D32nd,
    D64th,
    D128th,
    D256th,
    D512th,
    D1024th,
    Zero,
    Measure,
}

impl DurationType {
    pub fn from_xml(token: &str) -> Option<Self> {
        Some(match token.trim() {
            "long" => Self::Long,
            "breve" => Self::Breve,
            "whole" => Self::Whole,
            "half" => Self::Half,
            "quarter" => Self::Quarter,
            "eighth" => Self::Eighth,
            "16th" => Self::D16th,
            "32nd" => Self::D32nd,
            "64th" => Self::D64th,
            "128th" => Self::D128th,
            "256th" => Self::D256th,
            "512th" => Self::D512th,
            "1024th" => Self::D1024th,
            "zero" => Self::Zero,
            "measure" => Self::Measure,
            _ => return None,
        })
    }

    /// Undotted length. `Measure` has no intrinsic length.
    pub fn fraction(self) -> Option<Fraction> {
        let (n, d) = match self {
            Self::Long => (4, 1),
            Self::Breve => (2, 1),
            Self::Whole => (1, 1),
            Self::Half => (1, 2),
            Self::Quarter => (1, 4),
            Self::Eighth => (1, 8),
            Self::D16th => (1, 16),
            Self::D32nd => (1, 32),
            Self::D64th => (1, 64),
            Self::D128th => (1, 128),
            Self::D256th => (1, 256),
            Self::D512th => (1, 512),
            Self::D1024th => (1, 1024),
            Self::Zero => (0, 1),
            Self::Measure => return None,
        };
        Some(Fraction::new(n, d))
    }
}

/// Length of a duration with `dots` augmentation dots.
pub fn dotted(base: Fraction, dots: u32) -> Fraction {
    let mut total = base;
    let mut add = base;
    for _ in 0..dots.min(4) {
        add = add / Fraction::from_integer(2);
        total = total + add;
    }
    total
}

// ─── Checked fraction arithmetic ─────────────────────────────────────
//
// Document values reach the full i32 range, where reducing or combining
// two `Fraction`s can overflow. These helpers work on i64 ratios, which
// hold any sum or product of two i32 ratios, and narrow the result back.

type WideFraction = num_rational::Ratio<i64>;

fn widen(f: Fraction) -> WideFraction {
    WideFraction::new_raw(i64::from(*f.numer()), i64::from(*f.denom()))
}

fn narrow(f: WideFraction) -> Option<Fraction> {
    let numer = i32::try_from(*f.numer()).ok()?;
    let denom = i32::try_from(*f.denom()).ok()?;
    Some(Fraction::new_raw(numer, denom))
}

/// `numer / denom` in lowest terms. `None` for a zero denominator or a
/// result outside the range of [`Fraction`] (e.g. `i32::MIN / -1`).
pub fn checked_fraction(numer: i32, denom: i32) -> Option<Fraction> {
    if denom == 0 {
        return None;
    }
    narrow(WideFraction::new(i64::from(numer), i64::from(denom)))
}

pub fn checked_add(a: Fraction, b: Fraction) -> Option<Fraction> {
    narrow(widen(a) + widen(b))
}

pub fn checked_sub(a: Fraction, b: Fraction) -> Option<Fraction> {
    narrow(widen(a) - widen(b))
}

pub fn checked_mul(a: Fraction, b: Fraction) -> Option<Fraction> {
    narrow(widen(a) * widen(b))
}

// ─── Dynamics ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DynamicRange {
    #[default]
    Staff,
    Part,
    System,
}

impl DynamicRange {
    /// Accepts the token spelling and the older numeric one.
    pub fn from_xml(token: &str) -> Option<Self> {
        Some(match token.trim() {
            "staff" | "0" => Self::Staff,
            "part" | "1" => Self::Part,
            "system" | "2" => Self::System,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DynamicSpeed {
    #[default]
    Normal,
    Slow,
    Fast,
}

impl DynamicSpeed {
    pub fn from_xml(token: &str) -> Option<Self> {
        Some(match token.trim() {
            "normal" => Self::Normal,
            "slow" => Self::Slow,
            "fast" => Self::Fast,
            _ => return None,
        })
    }
}

// ─── Harmony ─────────────────────────────────────────────────────────

/// Display case of a chord symbol's root or bass letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NoteCaseType {
    Auto,
    #[default]
    Capital,
    Lower,
    Upper,
}

impl NoteCaseType {
    pub fn from_int(v: i32) -> Option<Self> {
        Some(match v {
            -1 => Self::Auto,
            0 => Self::Capital,
            1 => Self::Lower,
            2 => Self::Upper,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HarmonyType {
    #[default]
    Standard,
    Roman,
    Nashville,
}

impl HarmonyType {
    pub fn from_int(v: i32) -> Option<Self> {
        Some(match v {
            0 => Self::Standard,
            1 => Self::Roman,
            2 => Self::Nashville,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HarmonyVoicing {
    Invalid,
    #[default]
    Auto,
    RootOnly,
    Close,
    DropTwo,
    SixNote,
    FourNote,
    ThreeNote,
}

impl HarmonyVoicing {
    pub fn from_int(v: i32) -> Option<Self> {
        Some(match v {
            -1 => Self::Invalid,
            0 => Self::Auto,
            1 => Self::RootOnly,
            2 => Self::Close,
            3 => Self::DropTwo,
            4 => Self::SixNote,
            5 => Self::FourNote,
            6 => Self::ThreeNote,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HarmonyDurationType {
    #[default]
    UntilNextChordSymbol,
    UntilMeasureEnd,
    SegmentDuration,
}

impl HarmonyDurationType {
    pub fn from_int(v: i32) -> Option<Self> {
        Some(match v {
            0 => Self::UntilNextChordSymbol,
            1 => Self::UntilMeasureEnd,
            2 => Self::SegmentDuration,
            _ => return None,
        })
    }
}

// ─── Tonal pitch classes ─────────────────────────────────────────────

/// Root or bass not set.
pub const TPC_INVALID: i32 = -2;
pub const TPC_MIN: i32 = -1;
pub const TPC_MAX: i32 = 33;

pub fn tpc_is_valid(tpc: i32) -> bool {
    (TPC_MIN..=TPC_MAX).contains(&tpc)
}

/// Letter and accidental offset (-2..=2) of a tonal pitch class, which
/// runs along the line of fifths from F double flat (-1) to B double sharp.
pub fn tpc_step_alter(tpc: i32) -> Option<(char, i32)> {
    if !tpc_is_valid(tpc) {
        return None;
    }
    let letters = ['F', 'C', 'G', 'D', 'A', 'E', 'B'];
    let step = letters[((tpc + 1) % 7) as usize];
    Some((step, (tpc + 1) / 7 - 2))
}

pub fn step_alter_to_tpc(step: char, alter: i32) -> Option<i32> {
    let idx = "FCGDAEB".find(step.to_ascii_uppercase())? as i32;
    let tpc = idx - 1 + (alter + 2) * 7;
    tpc_is_valid(tpc).then_some(tpc)
}

/// Chord-symbol spelling of a pitch class, e.g. "Bb", "f#".
pub fn tpc_spelling(tpc: i32, case: NoteCaseType) -> Option<String> {
    let (step, alter) = tpc_step_alter(tpc)?;
    let mut s = String::new();
    match case {
        NoteCaseType::Lower => s.push(step.to_ascii_lowercase()),
        _ => s.push(step),
    }
    let acc = match alter {
        -2 => "bb",
        -1 => "b",
        1 => "#",
        2 => "##",
        _ => "",
    };
    s.push_str(acc);
    Some(s)
}

// ─── Fretboards ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FretDotType {
    #[default]
    Normal,
    Cross,
    Square,
    Triangle,
}

impl FretDotType {
    /// Unknown names fall back to a normal dot.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "cross" => Self::Cross,
            "square" => Self::Square,
            "triangle" => Self::Triangle,
            _ => Self::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FretMarkerType {
    Circle,
    Cross,
    #[default]
    None,
}

impl FretMarkerType {
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "circle" => Self::Circle,
            "cross" => Self::Cross,
            _ => Self::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

impl Orientation {
    pub fn from_xml(token: &str) -> Option<Self> {
        Some(match token.trim() {
            "vertical" | "0" => Self::Vertical,
            "horizontal" | "1" => Self::Horizontal,
            _ => return None,
        })
    }
}

// ─── Staff state / play technique ────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StaffStateType {
    Lines,
    Type,
    #[default]
    Instrument,
    Invisible,
}

impl StaffStateType {
    pub fn from_int(v: i32) -> Option<Self> {
        Some(match v {
            0 => Self::Lines,
            1 => Self::Type,
            2 => Self::Instrument,
            3 => Self::Invisible,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayingTechniqueType {
    #[default]
    Natural,
    Pizzicato,
    Open,
    Mute,
    Tremolo,
    Detache,
    Martele,
    ColLegno,
    SulPonticello,
    SulTasto,
    Vibrato,
    Legato,
    Distortion,
    Overdrive,
    Harmonics,
    JazzTone,
}

impl PlayingTechniqueType {
    pub fn from_xml(token: &str) -> Option<Self> {
        Some(match token.trim() {
            "normal" | "natural" => Self::Natural,
            "pizzicato" => Self::Pizzicato,
            "open" => Self::Open,
            "mute" => Self::Mute,
            "tremolo" => Self::Tremolo,
            "detache" => Self::Detache,
            "martele" => Self::Martele,
            "col_legno" => Self::ColLegno,
            "sul_ponticello" => Self::SulPonticello,
            "sul_tasto" => Self::SulTasto,
            "vibrato" => Self::Vibrato,
            "legato" => Self::Legato,
            "distortion" => Self::Distortion,
            "overdrive" => Self::Overdrive,
            "harmonics" => Self::Harmonics,
            "jazz_tone" => Self::JazzTone,
            _ => return None,
        })
    }
}

// ─── Layout values ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Placement {
    #[default]
    Above,
    Below,
}

impl Placement {
    pub fn from_xml(token: &str) -> Option<Self> {
        Some(match token.trim() {
            "above" => Self::Above,
            "below" => Self::Below,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrameType {
    #[default]
    NoFrame,
    Square,
    Circle,
}

impl FrameType {
    pub fn from_int(v: i32) -> Option<Self> {
        Some(match v {
            0 => Self::NoFrame,
            1 => Self::Square,
            2 => Self::Circle,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlignH {
    #[default]
    Left,
    Right,
    HCenter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlignV {
    #[default]
    Top,
    VCenter,
    Baseline,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Align {
    pub h: AlignH,
    pub v: AlignV,
}

impl Align {
    /// "left,top", "center,baseline", ... Either half may be omitted.
    pub fn from_xml(token: &str) -> Option<Self> {
        let mut align = Align::default();
        for part in token.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part {
                "left" => align.h = AlignH::Left,
                "right" => align.h = AlignH::Right,
                "center" | "hcenter" => align.h = AlignH::HCenter,
                "top" => align.v = AlignV::Top,
                "vcenter" => align.v = AlignV::VCenter,
                "baseline" => align.v = AlignV::Baseline,
                "bottom" => align.v = AlignV::Bottom,
                _ => return None,
            }
        }
        Some(align)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Font style bit mask.
pub mod font_style {
    pub const BOLD: i32 = 1;
    pub const ITALIC: i32 = 2;
    pub const UNDERLINE: i32 = 4;
    pub const STRIKE: i32 = 8;
    pub const ALL: i32 = BOLD | ITALIC | UNDERLINE | STRIKE;
}

/// Transposition interval of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Interval {
    pub diatonic: i32,
    pub chromatic: i32,
}
