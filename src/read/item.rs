use crate::model::EngravingItem;
use crate::property::{read_property, Pid};
use crate::xml::XmlReader;

/// Keyed properties every entity understands.
const ITEM_PIDS: [Pid; 6] = [
    Pid::Offset,
    Pid::Placement,
    Pid::Z,
    Pid::Autoplace,
    Pid::MinDistance,
    Pid::Color,
];

/// Generic item layer, the last one of every fallback chain.
pub fn read_item_properties<T: EngravingItem + ?Sized>(item: &mut T, e: &mut XmlReader) -> bool {
    let tag = e.name();
    match tag {
        "track" => item.item_mut().track = e.read_int(),
        "visible" => item.item_mut().visible = e.read_bool(),
        "eid" => item.item_mut().eid = Some(e.read_text().trim().to_string()),
        _ => return ITEM_PIDS.iter().any(|&pid| read_property(item, tag, e, pid)),
    }
    true
}
