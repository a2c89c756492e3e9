use super::item::read_item_properties;
use crate::model::TextItem;
use crate::property::{read_property, read_styled_property, Pid, PropertyFlags, PropertyValue};
use crate::types::font_style;
use crate::xml::XmlReader;

/// Read a plain text entity (sticking, rehearsal mark).
pub fn read_text_base<T: TextItem + ?Sized>(t: &mut T, e: &mut XmlReader) {
    while e.read_next_start_element() {
        if !read_text_properties(t, e) {
            e.unknown();
        }
    }
}

/// Text layer: body, font and frame properties, then the item layer.
pub fn read_text_properties<T: TextItem + ?Sized>(t: &mut T, e: &mut XmlReader) -> bool {
    let tag = e.name();
    match tag {
        "text" => t.text_mut().xml_text = e.read_xml(),
        "bold" => set_font_style_bit(t, font_style::BOLD, e.read_bool()),
        "italic" => set_font_style_bit(t, font_style::ITALIC, e.read_bool()),
        "underline" => set_font_style_bit(t, font_style::UNDERLINE, e.read_bool()),
        "strike" => set_font_style_bit(t, font_style::STRIKE, e.read_bool()),
        _ => {
            return read_property(t, tag, e, Pid::TextStyle)
                || read_styled_property(t, tag, e)
                || read_item_properties(t, e);
        }
    }
    true
}

/// Older files wrote one boolean tag per font style bit.
fn set_font_style_bit<T: TextItem + ?Sized>(t: &mut T, bit: i32, on: bool) {
    let current = t
        .property(Pid::FontStyle)
        .and_then(PropertyValue::as_int)
        .unwrap_or(0);
    let mask = if on { current | bit } else { current & !bit };
    if t.set_property(Pid::FontStyle, PropertyValue::Int(mask)) {
        t.item_mut().set_flags(Pid::FontStyle, PropertyFlags::Unstyled);
    }
}
