use crate::model::{PitchValue, TremoloBar};
use crate::property::{read_property, read_styled_property, Pid};
use crate::xml::XmlReader;

pub fn read_tremolo_bar(b: &mut TremoloBar, e: &mut XmlReader) {
    while e.read_next_start_element() {
        let tag = e.name();
        match tag {
            "point" => {
                for attr in ["time", "pitch", "vibrato"] {
                    if !e.has_attribute(attr) {
                        e.invalid("bend point", format!("missing {attr}"));
                    }
                }
                b.points.push(PitchValue {
                    time: e.int_attribute("time", 0),
                    pitch: e.int_attribute("pitch", 0),
                    vibrato: e.int_attribute("vibrato", 0) != 0,
                });
                e.skip_current_element();
            }
            "mag" => b.user_mag = e.read_double(0.1, 10.0),
            _ if read_styled_property(b, tag, e) => {}
            "play" => b.play = e.read_int() != 0,
            _ if read_property(b, tag, e, Pid::LineWidth) => {}
            _ => e.unknown(),
        }
    }
}
