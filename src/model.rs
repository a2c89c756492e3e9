//! Object model populated by the readers.
//!
//! Every entity is built in layers the same way its reader is: an
//! [`ItemBase`] shared by everything, a [`TextBase`] for text-bearing
//! entities, a [`StaffTextBase`] for staff-attached texts with playback
//! hooks, and the fields of the concrete kind on top.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::instrument::Instrument;
use crate::property::{Pid, PropertyFlags, PropertySlot, PropertyValue};
use crate::types::*;

// ─── Element kinds ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Tempo,
    StaffText,
    SystemText,
    PlayTechAnnotation,
    Sticking,
    RehearsalMark,
    Dynamic,
    Harmony,
    FretDiagram,
    TremoloBar,
    InstrumentChange,
    StaffState,
    FiguredBass,
}

impl ElementType {
    pub const ALL: [ElementType; 13] = [
        ElementType::Tempo,
        ElementType::StaffText,
        ElementType::SystemText,
        ElementType::PlayTechAnnotation,
        ElementType::Sticking,
        ElementType::RehearsalMark,
        ElementType::Dynamic,
        ElementType::Harmony,
        ElementType::FretDiagram,
        ElementType::TremoloBar,
        ElementType::InstrumentChange,
        ElementType::StaffState,
        ElementType::FiguredBass,
    ];

    /// Element tag in the file format.
    pub fn xml_name(self) -> &'static str {
        match self {
            ElementType::Tempo => "Tempo",
            ElementType::StaffText => "StaffText",
            ElementType::SystemText => "SystemText",
            ElementType::PlayTechAnnotation => "PlayTechAnnotation",
            ElementType::Sticking => "Sticking",
            ElementType::RehearsalMark => "RehearsalMark",
            ElementType::Dynamic => "Dynamic",
            ElementType::Harmony => "Harmony",
            ElementType::FretDiagram => "FretDiagram",
            ElementType::TremoloBar => "TremoloBar",
            ElementType::InstrumentChange => "InstrumentChange",
            ElementType::StaffState => "StaffState",
            ElementType::FiguredBass => "FiguredBass",
        }
    }

    pub fn from_xml_name(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.xml_name() == tag)
    }
}

// ─── Base layers ─────────────────────────────────────────────────────

/// State every entity carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemBase {
    /// staff index * VOICES + voice
    pub track: i32,
    /// Position from the start of the score, in whole notes
    pub tick: Fraction,
    pub visible: bool,
    /// Persistent element id, when the document has one
    pub eid: Option<String>,
    pub properties: BTreeMap<Pid, PropertySlot>,
}

impl Default for ItemBase {
    fn default() -> Self {
        Self {
            track: 0,
            tick: fraction_zero(),
            visible: true,
            eid: None,
            properties: BTreeMap::new(),
        }
    }
}

impl ItemBase {
    pub fn property(&self, pid: Pid) -> Option<&PropertyValue> {
        self.properties.get(&pid).map(|slot| &slot.value)
    }

    pub fn flags(&self, pid: Pid) -> Option<PropertyFlags> {
        self.properties.get(&pid).map(|slot| slot.flags)
    }

    /// Store `value` if it fits the property's domain.
    pub fn set_property(&mut self, pid: Pid, value: PropertyValue) -> bool {
        if !pid.accepts(&value) {
            return false;
        }
        match self.properties.get_mut(&pid) {
            Some(slot) => slot.value = value,
            None => {
                self.properties.insert(
                    pid,
                    PropertySlot {
                        value,
                        flags: PropertyFlags::NoStyle,
                    },
                );
            }
        }
        true
    }

    pub fn set_flags(&mut self, pid: Pid, flags: PropertyFlags) {
        if let Some(slot) = self.properties.get_mut(&pid) {
            slot.flags = flags;
        }
    }
}

/// Generic access shared by all entity kinds.
pub trait EngravingItem {
    fn element_type(&self) -> ElementType;
    fn item(&self) -> &ItemBase;
    fn item_mut(&mut self) -> &mut ItemBase;

    /// Properties whose defaults come from the style sheet.
    fn styled_pids(&self) -> &'static [Pid] {
        &[]
    }

    /// Assign a keyed property. Returns false when the value is rejected.
    fn set_property(&mut self, pid: Pid, value: PropertyValue) -> bool {
        self.item_mut().set_property(pid, value)
    }

    fn property(&self, pid: Pid) -> Option<&PropertyValue> {
        self.item().property(pid)
    }
}

/// Style-linked properties of every text-bearing entity.
pub const TEXT_STYLED_PIDS: &[Pid] = &[
    Pid::FontFace,
    Pid::FontSize,
    Pid::FontStyle,
    Pid::Align,
    Pid::FrameType,
    Pid::FrameWidth,
    Pid::FramePadding,
    Pid::FrameRound,
    Pid::FrameFgColor,
    Pid::FrameBgColor,
    Pid::SizeSpatiumDependent,
    Pid::Placement,
    Pid::MinDistance,
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBase {
    pub item: ItemBase,
    /// Body with inline markup, e.g. `<b>Allegro</b>`
    pub xml_text: String,
}

impl TextBase {
    /// Body with markup tags removed and the common entities decoded.
    pub fn plain_text(&self) -> String {
        strip_markup(&self.xml_text)
    }
}

pub fn strip_markup(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut in_tag = false;
    for ch in xml.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

pub trait TextItem: EngravingItem {
    fn text(&self) -> &TextBase;
    fn text_mut(&mut self) -> &mut TextBase;
}

/// MIDI actions requested on one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelActions {
    pub channel: i32,
    pub midi_action_names: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwingParameters {
    /// Swung note length in ticks; 0 turns swing off for the unit
    pub unit: i32,
    /// Percentage of the pair given to the first note
    pub ratio: i32,
}

/// Staff-attached text that can also drive playback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffTextBase {
    pub text: TextBase,
    pub channel_actions: Vec<ChannelActions>,
    /// Channel to switch to, per voice; empty means no switch
    pub channel_names: [String; VOICES],
    pub aeolus_stops: [i32; 4],
    pub set_aeolus_stops: bool,
    pub swing: bool,
    pub swing_parameters: SwingParameters,
    pub capo: i32,
}

impl StaffTextBase {
    /// Forget playback configuration from a previous read.
    pub fn clear(&mut self) {
        self.channel_actions.clear();
        self.channel_names = Default::default();
        self.aeolus_stops = [0; 4];
        self.set_aeolus_stops = false;
        self.swing = false;
        self.swing_parameters = SwingParameters::default();
        self.capo = 0;
    }

    /// Append `name` to the action list of `channel`, adding the channel
    /// entry on first use.
    pub fn add_midi_action(&mut self, channel: i32, name: &str) {
        match self.channel_actions.iter_mut().find(|a| a.channel == channel) {
            Some(actions) => actions.midi_action_names.push(name.to_string()),
            None => self.channel_actions.push(ChannelActions {
                channel,
                midi_action_names: vec![name.to_string()],
            }),
        }
    }

    pub fn set_channel_name(&mut self, voice: usize, name: &str) {
        if let Some(slot) = self.channel_names.get_mut(voice) {
            *slot = name.to_string();
        }
    }
}

pub trait StaffTextItem: TextItem {
    fn staff_text(&self) -> &StaffTextBase;
    fn staff_text_mut(&mut self) -> &mut StaffTextBase;
}

// ─── Text entities ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffText {
    pub base: StaffTextBase,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemText {
    pub base: StaffTextBase,
}

/// Playing technique such as "pizz." or "mute"; its kind is the
/// `playTechType` property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayTechAnnotation {
    pub base: StaffTextBase,
}

impl PlayTechAnnotation {
    pub fn technique(&self) -> PlayingTechniqueType {
        match self.property(Pid::PlayTechType) {
            Some(PropertyValue::PlayTechType(t)) => *t,
            _ => PlayingTechniqueType::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sticking {
    pub text: TextBase,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RehearsalMark {
    pub text: TextBase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempoText {
    pub text: TextBase,
    /// Beats per second
    pub tempo: f64,
    /// Tempo follows the number written in the text
    pub follow_text: bool,
}

impl Default for TempoText {
    fn default() -> Self {
        Self {
            text: TextBase::default(),
            tempo: DEFAULT_TEMPO,
            follow_text: false,
        }
    }
}

impl TempoText {
    pub fn bpm(&self) -> f64 {
        self.tempo * 60.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dynamic {
    pub text: TextBase,
    /// Marking such as "mf" or "sfz"
    pub dynamic_type: String,
    /// MIDI velocity, -1 for the marking's default
    pub velocity: i32,
    pub dyn_range: DynamicRange,
    pub change_in_velocity: i32,
    pub vel_change_speed: DynamicSpeed,
}

impl Default for Dynamic {
    fn default() -> Self {
        Self {
            text: TextBase::default(),
            dynamic_type: String::new(),
            velocity: -1,
            dyn_range: DynamicRange::Staff,
            change_in_velocity: 0,
            vel_change_speed: DynamicSpeed::Normal,
        }
    }
}

// ─── Harmony ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HDegreeType {
    Add,
    Alter,
    Subtract,
}

impl HDegreeType {
    pub fn from_xml(token: &str) -> Option<Self> {
        Some(match token.trim() {
            "add" => Self::Add,
            "alter" => Self::Alter,
            "subtract" => Self::Subtract,
            _ => return None,
        })
    }
}

/// One chord-extension modifier: add, alter or remove a scale degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HDegree {
    /// 1..=13
    pub value: i32,
    /// -2..=2 semitones
    pub alter: i32,
    pub kind: HDegreeType,
}

impl HDegree {
    /// Validated constructor.
    pub fn new(value: i32, alter: i32, kind: HDegreeType) -> Option<Self> {
        if !(1..=13).contains(&value) || !(-2..=2).contains(&alter) {
            return None;
        }
        Some(Self { value, alter, kind })
    }

    /// Display form, e.g. "add9", "#11", "omit3".
    pub fn display(&self) -> String {
        let acc = match self.alter {
            -2 => "bb",
            -1 => "b",
            1 => "#",
            2 => "##",
            _ => "",
        };
        match self.kind {
            HDegreeType::Add => format!("add{acc}{}", self.value),
            HDegreeType::Alter => format!("{acc}{}", self.value),
            HDegreeType::Subtract => format!("omit{}", self.value),
        }
    }
}

/// Rendered piece of a chord symbol, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmonyToken {
    LeftParen,
    Root(String),
    Extension(String),
    Degree(String),
    Bass(String),
    RightParen,
}

impl HarmonyToken {
    pub fn as_str(&self) -> &str {
        match self {
            HarmonyToken::LeftParen => "(",
            HarmonyToken::RightParen => ")",
            HarmonyToken::Root(s)
            | HarmonyToken::Extension(s)
            | HarmonyToken::Degree(s)
            | HarmonyToken::Bass(s) => s,
        }
    }
}

/// Chord symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harmony {
    pub text: TextBase,
    pub root_tpc: i32,
    pub base_tpc: i32,
    pub root_case: NoteCaseType,
    pub base_case: NoteCaseType,
    /// Chord list id, -1 when the chord is identified by name
    pub id: i32,
    /// Extension text after the root, e.g. "m7b5"
    pub text_name: String,
    /// Harmonic function text, e.g. "V7"
    pub function: String,
    pub left_paren: bool,
    pub right_paren: bool,
    pub degrees: Vec<HDegree>,
    /// Derived after reading
    pub tokens: Vec<HarmonyToken>,
}

impl Default for Harmony {
    fn default() -> Self {
        Self {
            text: TextBase::default(),
            root_tpc: TPC_INVALID,
            base_tpc: TPC_INVALID,
            root_case: NoteCaseType::Capital,
            base_case: NoteCaseType::Capital,
            id: -1,
            text_name: String::new(),
            function: String::new(),
            left_paren: false,
            right_paren: false,
            degrees: Vec::new(),
            tokens: Vec::new(),
        }
    }
}

impl Harmony {
    pub fn add_degree(&mut self, degree: HDegree) {
        self.degrees.push(degree);
    }

    pub fn harmony_type(&self) -> HarmonyType {
        match self.property(Pid::HarmonyType) {
            Some(PropertyValue::HarmonyType(t)) => *t,
            _ => HarmonyType::Standard,
        }
    }

    /// Plain rendering of the derived tokens.
    pub fn harmony_name(&self) -> String {
        self.tokens.iter().map(HarmonyToken::as_str).collect()
    }
}

// ─── Fretboard diagrams ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FretDot {
    pub fret: i32,
    pub dot_type: FretDotType,
}

impl FretDot {
    pub fn exists(&self) -> bool {
        self.fret > 0
    }
}

/// A finger laid across strings `start_string..=end_string`; an end of -1
/// runs to the last string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FretBarre {
    pub start_string: i32,
    pub end_string: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FretDiagram {
    pub item: ItemBase,
    pub strings: i32,
    pub frets: i32,
    pub fret_offset: i32,
    pub show_nut: bool,
    pub orientation: Orientation,
    pub user_mag: f64,
    /// Dots per string index
    pub dots: BTreeMap<i32, Vec<FretDot>>,
    pub markers: BTreeMap<i32, FretMarkerType>,
    /// Barres by fret
    pub barres: BTreeMap<i32, FretBarre>,
    /// Chord symbol shown with the diagram
    pub harmony: Option<Box<Harmony>>,
}

impl Default for FretDiagram {
    fn default() -> Self {
        Self {
            item: ItemBase::default(),
            strings: 6,
            frets: 5,
            fret_offset: 0,
            show_nut: true,
            orientation: Orientation::Vertical,
            user_mag: 1.0,
            dots: BTreeMap::new(),
            markers: BTreeMap::new(),
            barres: BTreeMap::new(),
            harmony: None,
        }
    }
}

impl FretDiagram {
    fn has_string(&self, string: i32) -> bool {
        (0..self.strings).contains(&string)
    }

    pub fn dot(&self, string: i32) -> &[FretDot] {
        self.dots.get(&string).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Place a dot. With `add` the dot joins the string's existing dots
    /// (replacing the type of one already on that fret); without it the
    /// dot replaces everything on the string. Fret 0 clears the string.
    /// Returns false for a string outside the diagram.
    pub fn set_dot(&mut self, string: i32, fret: i32, add: bool, dot_type: FretDotType) -> bool {
        if !self.has_string(string) {
            return false;
        }
        if fret <= 0 {
            self.dots.remove(&string);
            return true;
        }
        let dots = self.dots.entry(string).or_default();
        if add {
            if let Some(existing) = dots.iter_mut().find(|d| d.fret == fret) {
                existing.dot_type = dot_type;
                return true;
            }
        } else {
            dots.clear();
            self.markers.remove(&string);
        }
        dots.push(FretDot { fret, dot_type });
        true
    }

    /// Set the open/mute marker of a string, which removes its dots.
    pub fn set_marker(&mut self, string: i32, marker: FretMarkerType) -> bool {
        if !self.has_string(string) {
            return false;
        }
        if marker == FretMarkerType::None {
            self.markers.remove(&string);
        } else {
            self.dots.remove(&string);
            self.markers.insert(string, marker);
        }
        true
    }

    pub fn set_barre(&mut self, start_string: i32, end_string: i32, fret: i32) -> bool {
        if fret < 1 || !self.has_string(start_string) {
            return false;
        }
        if end_string != -1 && (end_string <= start_string || end_string >= self.strings) {
            return false;
        }
        self.barres.insert(
            fret,
            FretBarre {
                start_string,
                end_string,
            },
        );
        true
    }
}

// ─── Tremolo bar ─────────────────────────────────────────────────────

/// One sample of a bend curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchValue {
    /// 0..=60, position along the note
    pub time: i32,
    /// Hundredths of a semitone
    pub pitch: i32,
    pub vibrato: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TremoloBar {
    pub item: ItemBase,
    /// Curve in playback order
    pub points: Vec<PitchValue>,
    pub user_mag: f64,
    pub play: bool,
}

impl Default for TremoloBar {
    fn default() -> Self {
        Self {
            item: ItemBase::default(),
            points: Vec::new(),
            user_mag: 1.0,
            play: true,
        }
    }
}

// ─── Instrument and staff state changes ──────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentChange {
    pub text: TextBase,
    pub instrument: Instrument,
    /// Set when the change has been applied to the part already
    pub init: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffState {
    pub item: ItemBase,
    pub state_type: StaffStateType,
    pub instrument: Instrument,
}

// ─── Figured bass ────────────────────────────────────────────────────

/// Accidental or slash drawn before or after a figure digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Modifier {
    #[default]
    None,
    DoubleFlat,
    Flat,
    Natural,
    Sharp,
    DoubleSharp,
    Plus,
    Backslash,
    Slash,
}

impl Modifier {
    pub fn from_int(v: i32) -> Option<Self> {
        Some(match v {
            0 => Self::None,
            1 => Self::DoubleFlat,
            2 => Self::Flat,
            3 => Self::Natural,
            4 => Self::Sharp,
            5 => Self::DoubleSharp,
            6 => Self::Plus,
            7 => Self::Backslash,
            8 => Self::Slash,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::DoubleFlat => "bb",
            Self::Flat => "b",
            Self::Natural => "h",
            Self::Sharp => "#",
            Self::DoubleSharp => "##",
            Self::Plus => "+",
            Self::Backslash => "\\",
            Self::Slash => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Parenthesis {
    #[default]
    None,
    RoundOpen,
    RoundClosed,
    SquaredOpen,
    SquaredClosed,
}

impl Parenthesis {
    pub fn from_int(v: i32) -> Option<Self> {
        Some(match v {
            0 => Self::None,
            1 => Self::RoundOpen,
            2 => Self::RoundClosed,
            3 => Self::SquaredOpen,
            4 => Self::SquaredClosed,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::RoundOpen => "(",
            Self::RoundClosed => ")",
            Self::SquaredOpen => "[",
            Self::SquaredClosed => "]",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContLine {
    #[default]
    None,
    Simple,
    Extended,
}

impl ContLine {
    pub fn from_int(v: i32) -> Option<Self> {
        Some(match v {
            0 => Self::None,
            1 => Self::Simple,
            2 => Self::Extended,
            _ => return None,
        })
    }
}

/// One line of a figured bass stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiguredBassItem {
    /// Line index within the parent
    pub ord: usize,
    pub track: i32,
    pub parenth: [Parenthesis; 5],
    pub prefix: Modifier,
    /// -1 for no digit
    pub digit: i32,
    pub suffix: Modifier,
    pub cont_line: ContLine,
}

impl FiguredBassItem {
    pub fn new(ord: usize) -> Self {
        Self {
            ord,
            track: 0,
            parenth: [Parenthesis::None; 5],
            prefix: Modifier::None,
            digit: -1,
            suffix: Modifier::None,
            cont_line: ContLine::None,
        }
    }

    /// Text form used while editing, e.g. "(#6)" or "b7_".
    pub fn normalized_text(&self) -> String {
        let mut s = String::new();
        s.push_str(self.parenth[0].as_str());
        s.push_str(self.prefix.as_str());
        s.push_str(self.parenth[1].as_str());
        if self.digit >= 0 {
            s.push_str(&self.digit.to_string());
        }
        s.push_str(self.parenth[2].as_str());
        s.push_str(self.suffix.as_str());
        s.push_str(self.parenth[3].as_str());
        match self.cont_line {
            ContLine::None => {}
            ContLine::Simple => s.push('_'),
            ContLine::Extended => s.push_str("__"),
        }
        s.push_str(self.parenth[4].as_str());
        s
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiguredBass {
    pub text: TextBase,
    pub ticks: Fraction,
    pub on_note: bool,
    pub items: Vec<FiguredBassItem>,
}

impl Default for FiguredBass {
    fn default() -> Self {
        Self {
            text: TextBase::default(),
            ticks: fraction_zero(),
            on_note: true,
            items: Vec::new(),
        }
    }
}

impl FiguredBass {
    /// New line at index `ord` on this figured bass's track.
    pub fn create_item(&self, ord: usize) -> FiguredBassItem {
        let mut item = FiguredBassItem::new(ord);
        item.track = self.text.item.track;
        item
    }

    pub fn append_item(&mut self, item: FiguredBassItem) {
        self.items.push(item);
    }
}

// ─── Trait wiring ────────────────────────────────────────────────────

macro_rules! text_item {
    ($ty:ident, $kind:ident, $($field:ident).+) => {
        impl EngravingItem for $ty {
            fn element_type(&self) -> ElementType {
                ElementType::$kind
            }
            fn item(&self) -> &ItemBase {
                &self.$($field).+.item
            }
            fn item_mut(&mut self) -> &mut ItemBase {
                &mut self.$($field).+.item
            }
            fn styled_pids(&self) -> &'static [Pid] {
                TEXT_STYLED_PIDS
            }
        }

        impl TextItem for $ty {
            fn text(&self) -> &TextBase {
                &self.$($field).+
            }
            fn text_mut(&mut self) -> &mut TextBase {
                &mut self.$($field).+
            }
        }
    };
}

macro_rules! staff_text_item {
    ($ty:ident, $kind:ident) => {
        text_item!($ty, $kind, base.text);

        impl StaffTextItem for $ty {
            fn staff_text(&self) -> &StaffTextBase {
                &self.base
            }
            fn staff_text_mut(&mut self) -> &mut StaffTextBase {
                &mut self.base
            }
        }
    };
}

staff_text_item!(StaffText, StaffText);
staff_text_item!(SystemText, SystemText);
staff_text_item!(PlayTechAnnotation, PlayTechAnnotation);
text_item!(Sticking, Sticking, text);
text_item!(RehearsalMark, RehearsalMark, text);
text_item!(TempoText, Tempo, text);
text_item!(Dynamic, Dynamic, text);
text_item!(Harmony, Harmony, text);
text_item!(InstrumentChange, InstrumentChange, text);
text_item!(FiguredBass, FiguredBass, text);

impl EngravingItem for FretDiagram {
    fn element_type(&self) -> ElementType {
        ElementType::FretDiagram
    }
    fn item(&self) -> &ItemBase {
        &self.item
    }
    fn item_mut(&mut self) -> &mut ItemBase {
        &mut self.item
    }
    fn styled_pids(&self) -> &'static [Pid] {
        &[
            Pid::Placement,
            Pid::FretStrings,
            Pid::FretFrets,
            Pid::Mag,
            Pid::MinDistance,
            Pid::Orientation,
        ]
    }

    /// Diagram geometry lives in typed fields; the slot keeps the flags.
    fn set_property(&mut self, pid: Pid, value: PropertyValue) -> bool {
        if !self.item.set_property(pid, value.clone()) {
            return false;
        }
        match (pid, value) {
            (Pid::FretStrings, PropertyValue::Int(v)) => {
                self.strings = v;
                self.dots.retain(|s, _| *s < v);
                self.markers.retain(|s, _| *s < v);
            }
            (Pid::FretFrets, PropertyValue::Int(v)) => self.frets = v,
            (Pid::FretOffset, PropertyValue::Int(v)) => self.fret_offset = v,
            (Pid::FretNut, PropertyValue::Bool(v)) => self.show_nut = v,
            (Pid::Orientation, PropertyValue::Orientation(v)) => self.orientation = v,
            (Pid::Mag, PropertyValue::Real(v)) => self.user_mag = v,
            _ => {}
        }
        true
    }
}

impl EngravingItem for TremoloBar {
    fn element_type(&self) -> ElementType {
        ElementType::TremoloBar
    }
    fn item(&self) -> &ItemBase {
        &self.item
    }
    fn item_mut(&mut self) -> &mut ItemBase {
        &mut self.item
    }
    fn styled_pids(&self) -> &'static [Pid] {
        &[Pid::Placement, Pid::MinDistance]
    }
}

impl EngravingItem for StaffState {
    fn element_type(&self) -> ElementType {
        ElementType::StaffState
    }
    fn item(&self) -> &ItemBase {
        &self.item
    }
    fn item_mut(&mut self) -> &mut ItemBase {
        &mut self.item
    }
}

// ─── Closed element set ──────────────────────────────────────────────

/// Any entity the readers can populate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    Tempo(TempoText),
    StaffText(StaffText),
    SystemText(SystemText),
    PlayTechAnnotation(PlayTechAnnotation),
    Sticking(Sticking),
    RehearsalMark(RehearsalMark),
    Dynamic(Dynamic),
    Harmony(Harmony),
    FretDiagram(FretDiagram),
    TremoloBar(TremoloBar),
    InstrumentChange(InstrumentChange),
    StaffState(StaffState),
    FiguredBass(FiguredBass),
}

impl Element {
    /// Empty entity of the given kind.
    pub fn new(kind: ElementType) -> Self {
        match kind {
            ElementType::Tempo => Element::Tempo(TempoText::default()),
            ElementType::StaffText => Element::StaffText(StaffText::default()),
            ElementType::SystemText => Element::SystemText(SystemText::default()),
            ElementType::PlayTechAnnotation => {
                Element::PlayTechAnnotation(PlayTechAnnotation::default())
            }
            ElementType::Sticking => Element::Sticking(Sticking::default()),
            ElementType::RehearsalMark => Element::RehearsalMark(RehearsalMark::default()),
            ElementType::Dynamic => Element::Dynamic(Dynamic::default()),
            ElementType::Harmony => Element::Harmony(Harmony::default()),
            ElementType::FretDiagram => Element::FretDiagram(FretDiagram::default()),
            ElementType::TremoloBar => Element::TremoloBar(TremoloBar::default()),
            ElementType::InstrumentChange => {
                Element::InstrumentChange(InstrumentChange::default())
            }
            ElementType::StaffState => Element::StaffState(StaffState::default()),
            ElementType::FiguredBass => Element::FiguredBass(FiguredBass::default()),
        }
    }

    pub fn as_item(&self) -> &dyn EngravingItem {
        match self {
            Element::Tempo(x) => x,
            Element::StaffText(x) => x,
            Element::SystemText(x) => x,
            Element::PlayTechAnnotation(x) => x,
            Element::Sticking(x) => x,
            Element::RehearsalMark(x) => x,
            Element::Dynamic(x) => x,
            Element::Harmony(x) => x,
            Element::FretDiagram(x) => x,
            Element::TremoloBar(x) => x,
            Element::InstrumentChange(x) => x,
            Element::StaffState(x) => x,
            Element::FiguredBass(x) => x,
        }
    }

    pub fn as_item_mut(&mut self) -> &mut dyn EngravingItem {
        match self {
            Element::Tempo(x) => x,
            Element::StaffText(x) => x,
            Element::SystemText(x) => x,
            Element::PlayTechAnnotation(x) => x,
            Element::Sticking(x) => x,
            Element::RehearsalMark(x) => x,
            Element::Dynamic(x) => x,
            Element::Harmony(x) => x,
            Element::FretDiagram(x) => x,
            Element::TremoloBar(x) => x,
            Element::InstrumentChange(x) => x,
            Element::StaffState(x) => x,
            Element::FiguredBass(x) => x,
        }
    }

    pub fn element_type(&self) -> ElementType {
        self.as_item().element_type()
    }

    pub fn track(&self) -> i32 {
        self.as_item().item().track
    }

    pub fn tick(&self) -> Fraction {
        self.as_item().item().tick
    }

    /// Place the entity before it is read.
    pub fn set_position(&mut self, track: i32, tick: Fraction) {
        let item = self.as_item_mut().item_mut();
        item.track = track;
        item.tick = tick;
    }
}
