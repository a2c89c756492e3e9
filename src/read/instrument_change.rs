use super::text::read_text_properties;
use crate::context::ReadContext;
use crate::instrument::{read_instrument, Instrument};
use crate::model::InstrumentChange;
use crate::xml::XmlReader;

pub fn read_instrument_change(c: &mut InstrumentChange, e: &mut XmlReader, ctx: &mut ReadContext) {
    let track = c.text.item.track;
    let tick = c.text.item.tick;
    let part_id = ctx.part_for_track(track).map(|p| p.id.clone());

    let mut inst = Instrument::default();
    while e.read_next_start_element() {
        match e.name() {
            "Instrument" => inst = read_instrument(e, ctx, part_id.as_deref()),
            "init" => c.init = e.read_bool(),
            _ => {
                if !read_text_properties(c, e) {
                    e.unknown();
                }
            }
        }
    }

    if ctx.compat.legacy_transposition() {
        // Old files applied the staff's transposition across the change.
        // Notes entered before and after the change were affected
        // differently, so this only approximates what those files showed.
        inst.transpose = ctx
            .instrument_at(track, tick)
            .map(|i| i.transpose)
            .unwrap_or_default();
    }

    c.instrument = inst;
}
