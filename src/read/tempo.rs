use super::text::read_text_properties;
use crate::model::TempoText;
use crate::types::DEFAULT_TEMPO;
use crate::xml::XmlReader;

pub fn read_tempo(t: &mut TempoText, e: &mut XmlReader) {
    while e.read_next_start_element() {
        match e.name() {
            "tempo" => {
                let text = e.read_text();
                t.tempo = match text.trim().parse::<f64>() {
                    Ok(bps) if bps.is_finite() && bps > 0.0 => bps,
                    _ => {
                        e.invalid("tempo", text.trim());
                        DEFAULT_TEMPO
                    }
                };
            }
            "followText" => t.follow_text = e.read_int() != 0,
            _ => {
                if !read_text_properties(t, e) {
                    e.unknown();
                }
            }
        }
    }

    // every marking needs something to draw
    if t.text.xml_text.is_empty() {
        t.text.xml_text = format!("<sym>metNoteQuarterUp</sym> = {}", t.bpm().round() as i32);
        t.text.item.visible = false;
    }
}
