use super::text::read_text_properties;
use crate::model::{PlayTechAnnotation, StaffTextItem, SwingParameters};
use crate::property::{read_property, Pid};
use crate::types::{DurationType, DIVISION, VOICES};
use crate::xml::XmlReader;

/// Read a staff or system text. Playback settings left over from an
/// earlier read are cleared first.
pub fn read_staff_text_base<T: StaffTextItem + ?Sized>(t: &mut T, e: &mut XmlReader) {
    t.staff_text_mut().clear();

    while e.read_next_start_element() {
        if !read_staff_text_properties(t, e) {
            e.unknown();
        }
    }
}

pub fn read_play_tech_annotation(a: &mut PlayTechAnnotation, e: &mut XmlReader) {
    while e.read_next_start_element() {
        let tag = e.name();
        if read_property(a, tag, e, Pid::PlayTechType) {
            continue;
        }
        if !read_staff_text_properties(a, e) {
            e.unknown();
        }
    }
}

/// Staff-text layer: MIDI actions, channel switches, organ stops, swing
/// and capo, then the text layer.
pub fn read_staff_text_properties<T: StaffTextItem + ?Sized>(t: &mut T, e: &mut XmlReader) -> bool {
    match e.name() {
        "MidiAction" => {
            let channel = e.int_attribute("channel", 0);
            let name = e.attribute("name").unwrap_or_default();
            t.staff_text_mut().add_midi_action(channel, name);
            e.skip_current_element();
        }
        "channelSwitch" | "articulationChange" => {
            let voice = e.int_attribute("voice", -1);
            let name = e.attribute("name").unwrap_or_default();
            let st = t.staff_text_mut();
            if voice == -1 {
                // no voice: every voice switches
                for v in 0..VOICES {
                    st.set_channel_name(v, name);
                }
            } else if let Ok(v) = usize::try_from(voice) {
                st.set_channel_name(v, name);
            }
            e.skip_current_element();
        }
        "aeolus" => {
            let group = e.int_attribute("group", -1);
            match usize::try_from(group) {
                Ok(g) if g < 4 => {
                    let stop = e.read_int();
                    t.staff_text_mut().aeolus_stops[g] = stop;
                }
                _ => e.skip_current_element(),
            }
            t.staff_text_mut().set_aeolus_stops = true;
        }
        "swing" => {
            let unit = match e.attribute("unit").and_then(DurationType::from_xml) {
                Some(DurationType::Eighth) => DIVISION / 2,
                Some(DurationType::D16th) => DIVISION / 4,
                _ => 0,
            };
            let ratio = e.int_attribute("ratio", 60);
            let st = t.staff_text_mut();
            st.swing = true;
            st.swing_parameters = SwingParameters { unit, ratio };
            e.skip_current_element();
        }
        "capo" => {
            t.staff_text_mut().capo = e.int_attribute("fretId", 0);
            e.skip_current_element();
        }
        _ => return read_text_properties(t, e),
    }
    true
}
