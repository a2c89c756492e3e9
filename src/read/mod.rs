//! Entity readers.
//!
//! Each reader consumes the cursor from an entity's start tag to its end
//! tag. Tags a reader does not own fall through its base layers in order:
//! specialized reader, staff-text layer, text layer, generic item layer.
//! A tag no layer recognizes is diagnosed and skipped.

mod dynamic;
mod figured_bass;
mod fret;
mod harmony;
mod instrument_change;
mod item;
mod staff_state;
mod staff_text;
mod tempo;
mod text;
mod tremolo_bar;

pub use dynamic::read_dynamic;
pub use figured_bass::{read_figured_bass, read_figured_bass_item};
pub use fret::read_fret_diagram;
pub use harmony::{finalize_harmony, read_harmony};
pub use instrument_change::read_instrument_change;
pub use item::read_item_properties;
pub use staff_state::read_staff_state;
pub use staff_text::{read_play_tech_annotation, read_staff_text_base, read_staff_text_properties};
pub use tempo::read_tempo;
pub use text::{read_text_base, read_text_properties};
pub use tremolo_bar::read_tremolo_bar;

use crate::context::ReadContext;
use crate::model::Element;
use crate::xml::XmlReader;

/// Populate `el` from the element under the cursor with the reader of its
/// kind.
pub fn read_element(el: &mut Element, e: &mut XmlReader, ctx: &mut ReadContext) {
    match el {
        Element::Sticking(s) => read_text_base(s, e),
        Element::SystemText(t) => read_staff_text_base(t, e),
        Element::PlayTechAnnotation(a) => read_play_tech_annotation(a, e),
        Element::RehearsalMark(m) => read_text_base(m, e),
        Element::InstrumentChange(c) => read_instrument_change(c, e, ctx),
        Element::StaffState(s) => read_staff_state(s, e, ctx),
        Element::FiguredBass(b) => read_figured_bass(b, e),
        Element::StaffText(t) => read_staff_text_base(t, e),
        Element::Tempo(t) => read_tempo(t, e),
        Element::Dynamic(d) => read_dynamic(d, e),
        Element::Harmony(h) => read_harmony(h, e),
        Element::FretDiagram(d) => read_fret_diagram(d, e),
        Element::TremoloBar(b) => read_tremolo_bar(b, e),
    }
}
