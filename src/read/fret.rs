//! Fretboard diagrams come in two layouts. Files since 3.1 hold everything
//! in a `<fretDiagram>` container; older files spread flat tags over the
//! diagram element with one dot per string and a global barre flag. Once
//! the container has been read every later sibling is ignored.

use super::harmony::read_harmony;
use super::item::read_item_properties;
use crate::model::{FretDiagram, Harmony};
use crate::property::{read_property_value, Pid};
use crate::types::{FretDotType, FretMarkerType};
use crate::xml::XmlReader;

pub fn read_fret_diagram(d: &mut FretDiagram, e: &mut XmlReader) {
    let mut has_barre = false;
    let mut have_read_new = false;

    while e.read_next_start_element() {
        if have_read_new {
            e.skip_current_element();
            continue;
        }
        match e.name() {
            "fretDiagram" => {
                read_new_format(d, e);
                have_read_new = true;
            }
            "showNut" => read_property_value(d, e, Pid::FretNut),
            "orientation" => read_property_value(d, e, Pid::Orientation),
            "strings" => read_property_value(d, e, Pid::FretStrings),
            "frets" => read_property_value(d, e, Pid::FretFrets),
            "fretOffset" => read_property_value(d, e, Pid::FretOffset),
            "string" => read_legacy_string(d, e),
            "barre" => has_barre = e.read_bool(),
            "mag" => read_property_value(d, e, Pid::Mag),
            "Harmony" => {
                let mut h = Harmony::default();
                h.text.item.track = d.item.track;
                h.text.item.tick = d.item.tick;
                read_harmony(&mut h, e);
                d.harmony = Some(Box::new(h));
            }
            _ => {
                if !read_item_properties(d, e) {
                    e.unknown();
                }
            }
        }
    }

    if has_barre {
        infer_legacy_barre(d);
    }
}

fn read_new_format(d: &mut FretDiagram, e: &mut XmlReader) {
    while e.read_next_start_element() {
        match e.name() {
            "string" => {
                let no = e.int_attribute("no", 0);
                while e.read_next_start_element() {
                    match e.name() {
                        "dot" => {
                            let fret = e.int_attribute("fret", 0);
                            let dot_type = FretDotType::from_name(&e.read_text());
                            if !d.set_dot(no, fret, true, dot_type) {
                                e.invalid("fret dot", format!("string {no} fret {fret}"));
                            }
                        }
                        "marker" => {
                            let marker = FretMarkerType::from_name(&e.read_text());
                            if !d.set_marker(no, marker) {
                                e.invalid("fret marker", format!("string {no}"));
                            }
                        }
                        "fingering" => {
                            e.read_text();
                        }
                        _ => e.unknown(),
                    }
                }
            }
            "barre" => {
                let start = e.int_attribute("start", -1);
                let end = e.int_attribute("end", -1);
                let fret = e.read_int();
                if !d.set_barre(start, end, fret) {
                    e.invalid("barre", format!("strings {start}..{end} fret {fret}"));
                }
            }
            _ => {
                if !read_item_properties(d, e) {
                    e.unknown();
                }
            }
        }
    }
}

fn read_legacy_string(d: &mut FretDiagram, e: &mut XmlReader) {
    let no = e.int_attribute("no", 0);
    while e.read_next_start_element() {
        match e.name() {
            "dot" => {
                let fret = e.read_int();
                if !d.set_dot(no, fret, false, FretDotType::Normal) {
                    e.invalid("fret dot", format!("string {no} fret {fret}"));
                }
            }
            "marker" => {
                let marker = if is_cross_marker(e.read_text().trim()) {
                    FretMarkerType::Cross
                } else {
                    FretMarkerType::Circle
                };
                if !d.set_marker(no, marker) {
                    e.invalid("fret marker", format!("string {no}"));
                }
            }
            _ => e.unknown(),
        }
    }
}

/// Legacy markers are a character code ("88") or the character itself.
fn is_cross_marker(text: &str) -> bool {
    text == "X" || text.parse::<u32>().ok() == Some(u32::from('X'))
}

/// Turn the first dot found, scanning strings in order, into a barre from
/// that string to the last one.
fn infer_legacy_barre(d: &mut FretDiagram) {
    let first = (0..d.strings)
        .find_map(|s| d.dot(s).iter().find(|dot| dot.exists()).map(|dot| (s, dot.fret)));
    if let Some((string, fret)) = first {
        d.set_barre(string, -1, fret);
    }
}
