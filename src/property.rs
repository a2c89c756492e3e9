//! Keyed properties: the closed set of property identifiers, their XML
//! names and value types, and the two generic ways a reader fills them in.

use serde::{Deserialize, Serialize};

use crate::model::EngravingItem;
use crate::types::*;
use crate::xml::XmlReader;

/// Property identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pid {
    Offset,
    Placement,
    Z,
    Autoplace,
    MinDistance,
    Color,
    TextStyle,
    FontFace,
    FontSize,
    FontStyle,
    Align,
    FrameType,
    FrameWidth,
    FramePadding,
    FrameRound,
    FrameFgColor,
    FrameBgColor,
    SizeSpatiumDependent,
    PosAbove,
    HarmonyType,
    Play,
    HarmonyVoiceLiteral,
    HarmonyVoicing,
    HarmonyDuration,
    FretStrings,
    FretFrets,
    FretOffset,
    FretNut,
    Orientation,
    Mag,
    LineWidth,
    PlayTechType,
}

/// How a property's body is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Int,
    Real,
    Spatium,
    String,
    Point,
    Color,
    Align,
    Placement,
    Orientation,
    FrameType,
    HarmonyType,
    HarmonyVoicing,
    HarmonyDuration,
    PlayTechType,
}

impl Pid {
    /// Tag name in the file format.
    pub fn xml_name(self) -> &'static str {
        match self {
            Pid::Offset => "offset",
            Pid::Placement => "placement",
            Pid::Z => "z",
            Pid::Autoplace => "autoplace",
            Pid::MinDistance => "minDistance",
            Pid::Color => "color",
            Pid::TextStyle => "style",
            Pid::FontFace => "family",
            Pid::FontSize => "size",
            Pid::FontStyle => "fontStyle",
            Pid::Align => "align",
            Pid::FrameType => "frameType",
            Pid::FrameWidth => "frameWidth",
            Pid::FramePadding => "framePadding",
            Pid::FrameRound => "frameRound",
            Pid::FrameFgColor => "frameFgColor",
            Pid::FrameBgColor => "frameBgColor",
            Pid::SizeSpatiumDependent => "sizeIsSpatiumDependent",
            Pid::PosAbove => "posAbove",
            Pid::HarmonyType => "harmonyType",
            Pid::Play => "play",
            Pid::HarmonyVoiceLiteral => "harmonyVoiceLiteral",
            Pid::HarmonyVoicing => "harmonyVoicing",
            Pid::HarmonyDuration => "harmonyDuration",
            Pid::FretStrings => "strings",
            Pid::FretFrets => "frets",
            Pid::FretOffset => "fretOffset",
            Pid::FretNut => "showNut",
            Pid::Orientation => "orientation",
            Pid::Mag => "mag",
            Pid::LineWidth => "lineWidth",
            Pid::PlayTechType => "playTechType",
        }
    }

    pub fn value_type(self) -> ValueType {
        match self {
            Pid::Offset => ValueType::Point,
            Pid::Placement => ValueType::Placement,
            Pid::Z | Pid::FontStyle | Pid::FretStrings | Pid::FretFrets | Pid::FretOffset => {
                ValueType::Int
            }
            Pid::Autoplace
            | Pid::SizeSpatiumDependent
            | Pid::Play
            | Pid::HarmonyVoiceLiteral
            | Pid::FretNut => ValueType::Bool,
            Pid::MinDistance
            | Pid::FrameWidth
            | Pid::FramePadding
            | Pid::LineWidth => ValueType::Spatium,
            Pid::Color | Pid::FrameFgColor | Pid::FrameBgColor => ValueType::Color,
            Pid::TextStyle | Pid::FontFace => ValueType::String,
            Pid::FontSize | Pid::PosAbove | Pid::Mag => ValueType::Real,
            Pid::FrameRound => ValueType::Int,
            Pid::Align => ValueType::Align,
            Pid::FrameType => ValueType::FrameType,
            Pid::HarmonyType => ValueType::HarmonyType,
            Pid::HarmonyVoicing => ValueType::HarmonyVoicing,
            Pid::HarmonyDuration => ValueType::HarmonyDuration,
            Pid::Orientation => ValueType::Orientation,
            Pid::PlayTechType => ValueType::PlayTechType,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Bool(bool),
    Int(i32),
    Real(f64),
    Spatium(f64),
    String(String),
    Point(Point),
    Color(Color),
    Align(Align),
    Placement(Placement),
    Orientation(Orientation),
    FrameType(FrameType),
    HarmonyType(HarmonyType),
    HarmonyVoicing(HarmonyVoicing),
    HarmonyDuration(HarmonyDurationType),
    PlayTechType(PlayingTechniqueType),
}

impl PropertyValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            PropertyValue::Real(v) | PropertyValue::Spatium(v) => Some(*v),
            _ => None,
        }
    }
}

/// Whether a value came from the document over a style default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyFlags {
    /// Not linked to the style sheet at all.
    NoStyle,
    /// Follows the style sheet.
    Styled,
    /// Linked to the style sheet but overridden by the document.
    Unstyled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySlot {
    pub value: PropertyValue,
    pub flags: PropertyFlags,
}

// ─── Reading ─────────────────────────────────────────────────────────

/// Decode the current element's body as a value of type `ty`. Consumes the
/// element. Undecodable bodies are diagnosed and give `None`.
pub fn read_value(e: &mut XmlReader, ty: ValueType) -> Option<PropertyValue> {
    match ty {
        ValueType::Bool => Some(PropertyValue::Bool(e.read_bool())),
        ValueType::Int => {
            let text = e.read_text();
            match text.trim().parse() {
                Ok(v) => Some(PropertyValue::Int(v)),
                Err(_) => {
                    e.invalid("integer", text.trim());
                    None
                }
            }
        }
        ValueType::Real => e.read_f64().map(PropertyValue::Real),
        ValueType::Spatium => e.read_f64().map(PropertyValue::Spatium),
        ValueType::String => Some(PropertyValue::String(e.read_text())),
        ValueType::Point => {
            let p = Point {
                x: e.double_attribute("x", 0.0),
                y: e.double_attribute("y", 0.0),
            };
            e.skip_current_element();
            Some(PropertyValue::Point(p))
        }
        ValueType::Color => {
            let c = Color {
                r: color_channel(e, "r", 0),
                g: color_channel(e, "g", 0),
                b: color_channel(e, "b", 0),
                a: color_channel(e, "a", 255),
            };
            e.skip_current_element();
            Some(PropertyValue::Color(c))
        }
        ValueType::Align => token(e, "align", Align::from_xml).map(PropertyValue::Align),
        ValueType::Placement => {
            token(e, "placement", Placement::from_xml).map(PropertyValue::Placement)
        }
        ValueType::Orientation => {
            token(e, "orientation", Orientation::from_xml).map(PropertyValue::Orientation)
        }
        ValueType::PlayTechType => token(e, "play technique", PlayingTechniqueType::from_xml)
            .map(PropertyValue::PlayTechType),
        ValueType::FrameType => {
            int_enum(e, "frame type", FrameType::from_int).map(PropertyValue::FrameType)
        }
        ValueType::HarmonyType => {
            int_enum(e, "harmony type", HarmonyType::from_int).map(PropertyValue::HarmonyType)
        }
        ValueType::HarmonyVoicing => int_enum(e, "harmony voicing", HarmonyVoicing::from_int)
            .map(PropertyValue::HarmonyVoicing),
        ValueType::HarmonyDuration => {
            int_enum(e, "harmony duration", HarmonyDurationType::from_int)
                .map(PropertyValue::HarmonyDuration)
        }
    }
}

fn color_channel(e: &XmlReader, name: &str, default: i32) -> u8 {
    e.int_attribute(name, default).clamp(0, 255) as u8
}

fn token<T>(e: &mut XmlReader, what: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
    let text = e.read_text();
    let v = parse(&text);
    if v.is_none() {
        e.invalid(what, text.trim());
    }
    v
}

fn int_enum<T>(e: &mut XmlReader, what: &str, from_int: fn(i32) -> Option<T>) -> Option<T> {
    let text = e.read_text();
    let v = text.trim().parse().ok().and_then(from_int);
    if v.is_none() {
        e.invalid(what, text.trim());
    }
    v
}

/// Read `pid` from the current element if `tag` is its name. Returns
/// whether the tag was consumed.
pub fn read_property<T: EngravingItem + ?Sized>(
    item: &mut T,
    tag: &str,
    e: &mut XmlReader,
    pid: Pid,
) -> bool {
    if tag != pid.xml_name() {
        return false;
    }
    read_property_value(item, e, pid);
    true
}

/// Read the current element as the value of `pid`, whatever its name.
pub fn read_property_value<T: EngravingItem + ?Sized>(item: &mut T, e: &mut XmlReader, pid: Pid) {
    let Some(value) = read_value(e, pid.value_type()) else {
        return;
    };
    let shown = format!("{value:?}");
    if !item.set_property(pid, value) {
        e.invalid(pid.xml_name(), shown);
        return;
    }
    if item.styled_pids().contains(&pid) {
        item.item_mut().set_flags(pid, PropertyFlags::Unstyled);
    }
}

/// Try every style-linked property of `item` against `tag`.
pub fn read_styled_property<T: EngravingItem + ?Sized>(
    item: &mut T,
    tag: &str,
    e: &mut XmlReader,
) -> bool {
    let styled = item.styled_pids();
    for &pid in styled {
        if read_property(item, tag, e, pid) {
            return true;
        }
    }
    false
}

impl Pid {
    /// Whether `value` has this property's type and lies in its domain.
    pub fn accepts(self, value: &PropertyValue) -> bool {
        use PropertyValue as V;
        match (self.value_type(), value) {
            (ValueType::Bool, V::Bool(_))
            | (ValueType::String, V::String(_))
            | (ValueType::Point, V::Point(_))
            | (ValueType::Color, V::Color(_))
            | (ValueType::Align, V::Align(_))
            | (ValueType::Placement, V::Placement(_))
            | (ValueType::Orientation, V::Orientation(_))
            | (ValueType::FrameType, V::FrameType(_))
            | (ValueType::HarmonyType, V::HarmonyType(_))
            | (ValueType::HarmonyVoicing, V::HarmonyVoicing(_))
            | (ValueType::HarmonyDuration, V::HarmonyDuration(_))
            | (ValueType::PlayTechType, V::PlayTechType(_)) => true,
            (ValueType::Int, V::Int(v)) => match self {
                Pid::FretStrings => (1..=MAX_FRET_STRINGS).contains(v),
                Pid::FretFrets => (1..=MAX_FRET_FRETS).contains(v),
                Pid::FretOffset | Pid::FrameRound => *v >= 0,
                Pid::FontStyle => (0..=font_style::ALL).contains(v),
                _ => true,
            },
            (ValueType::Real, V::Real(v)) => match self {
                Pid::FontSize => *v > 0.0,
                Pid::Mag => (0.1..=10.0).contains(v),
                _ => v.is_finite(),
            },
            (ValueType::Spatium, V::Spatium(v)) => match self {
                Pid::LineWidth | Pid::FrameWidth | Pid::FramePadding => *v >= 0.0,
                _ => v.is_finite(),
            },
            _ => false,
        }
    }
}

/// Upper bound on strings of a fretboard diagram.
pub const MAX_FRET_STRINGS: i32 = 24;
/// Upper bound on frets shown in a fretboard diagram.
pub const MAX_FRET_FRETS: i32 = 24;
