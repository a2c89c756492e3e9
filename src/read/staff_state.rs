use super::item::read_item_properties;
use crate::context::ReadContext;
use crate::instrument::read_instrument;
use crate::model::StaffState;
use crate::types::StaffStateType;
use crate::xml::XmlReader;

pub fn read_staff_state(s: &mut StaffState, e: &mut XmlReader, ctx: &mut ReadContext) {
    while e.read_next_start_element() {
        match e.name() {
            "subtype" => {
                let v = e.read_int();
                match StaffStateType::from_int(v) {
                    Some(t) => s.state_type = t,
                    None => e.invalid("staff state type", v),
                }
            }
            "Instrument" => s.instrument = read_instrument(e, ctx, None),
            _ => {
                if !read_item_properties(s, e) {
                    e.unknown();
                }
            }
        }
    }
}
