use super::text::read_text_properties;
use crate::model::{HDegree, HDegreeType, Harmony, HarmonyToken};
use crate::property::{read_property, Pid};
use crate::types::{step_alter_to_tpc, tpc_is_valid, tpc_spelling, HarmonyType, NoteCaseType};
use crate::xml::XmlReader;

/// Keyed harmony properties tried before the text layer.
const HARMONY_PIDS: [Pid; 6] = [
    Pid::PosAbove,
    Pid::HarmonyType,
    Pid::Play,
    Pid::HarmonyVoiceLiteral,
    Pid::HarmonyVoicing,
    Pid::HarmonyDuration,
];

pub fn read_harmony(h: &mut Harmony, e: &mut XmlReader) {
    while e.read_next_start_element() {
        let tag = e.name();
        match tag {
            "base" => h.base_tpc = e.read_int(),
            "baseCase" => h.base_case = read_case(e, h.base_case),
            "extension" => h.id = e.read_int(),
            "name" => h.text_name = e.read_text(),
            "root" => h.root_tpc = e.read_int(),
            "rootCase" => h.root_case = read_case(e, h.root_case),
            "function" => h.function = e.read_text(),
            "degree" => {
                if let Some(degree) = read_degree(e) {
                    h.add_degree(degree);
                }
            }
            "leftParen" => {
                h.left_paren = true;
                e.skip_current_element();
            }
            "rightParen" => {
                h.right_paren = true;
                e.skip_current_element();
            }
            _ => {
                let handled = HARMONY_PIDS.iter().any(|&pid| read_property(h, tag, e, pid))
                    || read_text_properties(h, e);
                if !handled {
                    e.unknown();
                }
            }
        }
    }

    finalize_harmony(h);
}

fn read_case(e: &mut XmlReader, current: NoteCaseType) -> NoteCaseType {
    let v = e.read_int();
    NoteCaseType::from_int(v).unwrap_or_else(|| {
        e.invalid("note case", v);
        current
    })
}

/// `<degree>` block. Out-of-range values and unknown types are diagnosed
/// and give `None`.
fn read_degree(e: &mut XmlReader) -> Option<HDegree> {
    let mut value = 0;
    let mut alter = 0;
    let mut kind = String::new();
    while e.read_next_start_element() {
        match e.name() {
            "degree-value" => value = e.read_int(),
            "degree-alter" => alter = e.read_int(),
            "degree-type" => kind = e.read_text(),
            _ => e.unknown(),
        }
    }

    let degree = HDegreeType::from_xml(&kind).and_then(|k| HDegree::new(value, alter, k));
    if degree.is_none() {
        e.invalid("degree", format!("value={value} alter={alter} type={kind}"));
    }
    degree
}

// ─── Finalization ────────────────────────────────────────────────────

/// Derive spelling and render tokens from the fields read, and set the
/// display text to the rendered symbol. Running it again changes nothing.
pub fn finalize_harmony(h: &mut Harmony) {
    if !tpc_is_valid(h.root_tpc) && h.text_name.is_empty() && h.harmony_type() == HarmonyType::Standard {
        // pre-2.0 files kept the whole symbol in the text body
        let plain = h.text.plain_text();
        if let Some(parsed) = parse_chord_text(plain.trim()) {
            h.root_tpc = parsed.root_tpc;
            h.root_case = parsed.root_case;
            h.text_name = parsed.name;
            if let Some((tpc, case)) = parsed.bass {
                h.base_tpc = tpc;
                h.base_case = case;
            }
        }
    }

    h.tokens = render_tokens(h);
    let renders_something = h
        .tokens
        .iter()
        .any(|t| !matches!(t, HarmonyToken::LeftParen | HarmonyToken::RightParen));
    if renders_something {
        h.text.xml_text = h.harmony_name();
    }
}

fn render_tokens(h: &Harmony) -> Vec<HarmonyToken> {
    let mut tokens = Vec::new();
    if h.left_paren {
        tokens.push(HarmonyToken::LeftParen);
    }
    if let Some(root) = tpc_spelling(h.root_tpc, h.root_case) {
        tokens.push(HarmonyToken::Root(root));
    }
    if !h.text_name.is_empty() {
        tokens.push(HarmonyToken::Extension(h.text_name.clone()));
    } else if tpc_is_valid(h.root_tpc) {
        tokens.extend(h.degrees.iter().map(|d| HarmonyToken::Degree(d.display())));
    }
    if let Some(bass) = tpc_spelling(h.base_tpc, h.base_case) {
        tokens.push(HarmonyToken::Bass(format!("/{bass}")));
    }
    if h.right_paren {
        tokens.push(HarmonyToken::RightParen);
    }
    tokens
}

#[derive(Debug, PartialEq)]
struct ParsedChord {
    root_tpc: i32,
    root_case: NoteCaseType,
    name: String,
    bass: Option<(i32, NoteCaseType)>,
}

/// Split "Bbm7/F" into root, name and bass.
fn parse_chord_text(s: &str) -> Option<ParsedChord> {
    let (root_tpc, root_case, rest) = parse_note(s)?;
    let (name, bass) = match rest.rsplit_once('/') {
        Some((name, tail)) => match parse_note(tail) {
            Some((tpc, case, "")) => (name, Some((tpc, case))),
            _ => (rest, None),
        },
        None => (rest, None),
    };
    Some(ParsedChord {
        root_tpc,
        root_case,
        name: name.to_string(),
        bass,
    })
}

/// Leading note letter with up to two accidentals of one kind.
fn parse_note(s: &str) -> Option<(i32, NoteCaseType, &str)> {
    let letter = s.chars().next().filter(|c| matches!(c.to_ascii_uppercase(), 'A'..='G'))?;
    let case = if letter.is_ascii_lowercase() {
        NoteCaseType::Lower
    } else {
        NoteCaseType::Capital
    };
    let rest = &s[1..];
    let (alter, rest) = if let Some(r) = rest.strip_prefix("##") {
        (2, r)
    } else if let Some(r) = rest.strip_prefix('#') {
        (1, r)
    } else if let Some(r) = rest.strip_prefix("bb") {
        (-2, r)
    } else if let Some(r) = rest.strip_prefix('b') {
        (-1, r)
    } else {
        (0, rest)
    };
    let tpc = step_alter_to_tpc(letter, alter)?;
    Some((tpc, case, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_legacy_chord_text() {
        assert_eq!(
            parse_chord_text("Bbm7/F"),
            Some(ParsedChord {
                root_tpc: 12,
                root_case: NoteCaseType::Capital,
                name: "m7".into(),
                bass: Some((13, NoteCaseType::Capital)),
            })
        );
        let minor = parse_chord_text("f#").unwrap();
        assert_eq!(minor.root_tpc, 20);
        assert_eq!(minor.root_case, NoteCaseType::Lower);
        assert_eq!(minor.name, "");
        assert_eq!(parse_chord_text("N.C."), None);
    }

    #[test]
    fn slash_without_note_stays_in_name() {
        let c = parse_chord_text("C6/9").unwrap();
        assert_eq!(c.name, "6/9");
        assert_eq!(c.bass, None);
    }

    #[test]
    fn finalize_is_idempotent() {
        let mut h = Harmony::default();
        h.text.xml_text = "<b>Eb</b>maj7/G".into();
        finalize_harmony(&mut h);
        let once = h.clone();
        finalize_harmony(&mut h);
        assert_eq!(h, once);
        assert_eq!(h.text.xml_text, "Ebmaj7/G");
        assert_eq!(h.root_tpc, 11);
    }

    #[test]
    fn degrees_render_without_name() {
        let mut h = Harmony {
            root_tpc: 14,
            ..Default::default()
        };
        h.add_degree(HDegree::new(9, 0, HDegreeType::Add).unwrap());
        h.add_degree(HDegree::new(5, -1, HDegreeType::Alter).unwrap());
        finalize_harmony(&mut h);
        assert_eq!(h.harmony_name(), "Cadd9b5");
    }
}
