use super::text::read_text_properties;
use crate::model::{ContLine, FiguredBass, FiguredBassItem, Modifier, Parenthesis};
use crate::xml::XmlReader;

pub fn read_figured_bass(b: &mut FiguredBass, e: &mut XmlReader) {
    let mut normalized = Vec::new();
    while e.read_next_start_element() {
        match e.name() {
            "ticks" => b.ticks = e.read_fraction(),
            "onNote" => b.on_note = e.read_int() != 0,
            "FiguredBassItem" => {
                let mut item = b.create_item(b.items.len());
                read_figured_bass_item(&mut item, e);
                normalized.push(item.normalized_text());
                b.append_item(item);
            }
            _ => {
                if !read_text_properties(b, e) {
                    e.unknown();
                }
            }
        }
    }

    // a figured bass without items keeps its authored text
    if !b.items.is_empty() {
        b.text.xml_text = normalized.join("\n");
    }
}

/// One `<FiguredBassItem>` line.
pub fn read_figured_bass_item(item: &mut FiguredBassItem, e: &mut XmlReader) {
    while e.read_next_start_element() {
        match e.name() {
            "brackets" => {
                for (i, slot) in item.parenth.iter_mut().enumerate() {
                    let v = e.int_attribute(&format!("b{i}"), 0);
                    match Parenthesis::from_int(v) {
                        Some(p) => *slot = p,
                        None => e.invalid("parenthesis", v),
                    }
                }
                e.skip_current_element();
            }
            "prefix" => item.prefix = read_modifier(e, item.prefix),
            "digit" => item.digit = e.read_int(),
            "suffix" => item.suffix = read_modifier(e, item.suffix),
            "continuationLine" => {
                let v = e.read_int();
                match ContLine::from_int(v) {
                    Some(c) => item.cont_line = c,
                    None => e.invalid("continuation line", v),
                }
            }
            _ => e.unknown(),
        }
    }
}

fn read_modifier(e: &mut XmlReader, current: Modifier) -> Modifier {
    let v = e.read_int();
    Modifier::from_int(v).unwrap_or_else(|| {
        e.invalid("figured bass modifier", v);
        current
    })
}
