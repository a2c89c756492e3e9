use super::text::read_text_properties;
use crate::model::Dynamic;
use crate::types::{DynamicRange, DynamicSpeed};
use crate::xml::XmlReader;

pub fn read_dynamic(d: &mut Dynamic, e: &mut XmlReader) {
    while e.read_next_start_element() {
        match e.name() {
            "subtype" => d.dynamic_type = e.read_text(),
            "velocity" => d.velocity = e.read_int(),
            "dynType" => {
                let text = e.read_text();
                d.dyn_range = DynamicRange::from_xml(&text).unwrap_or_else(|| {
                    e.invalid("dynamic range", text.trim());
                    DynamicRange::Staff
                });
            }
            "veloChange" => d.change_in_velocity = e.read_int(),
            "veloChangeSpeed" => {
                let text = e.read_text();
                d.vel_change_speed = DynamicSpeed::from_xml(&text).unwrap_or_else(|| {
                    e.invalid("velocity change speed", text.trim());
                    DynamicSpeed::Normal
                });
            }
            _ => {
                if !read_text_properties(d, e) {
                    e.unknown();
                }
            }
        }
    }
}
