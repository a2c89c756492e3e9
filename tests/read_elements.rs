//! Integration tests — read single annotation fragments.

use engraving_read::property::{Pid, PropertyFlags, PropertyValue};
use engraving_read::read::{read_staff_text_base, read_text_base};
use engraving_read::types::*;
use engraving_read::*;
use pretty_assertions::assert_eq;
use roxmltree::Document;

fn read(xml: &str) -> LoadedElement {
    read_element_str(xml, &LoadOptions::default())
        .unwrap_or_else(|e| panic!("Failed to read fragment: {e}"))
}

fn unknown_tags(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics
        .iter()
        .filter_map(|d| match &d.kind {
            DiagnosticKind::UnknownElement { tag } => Some(tag.clone()),
            _ => None,
        })
        .collect()
}

// ─── Dispatch and fallback ──────────────────────────────────────────

#[test]
fn root_tag_selects_reader() {
    for kind in ElementType::ALL {
        let xml = format!("<{0}></{0}>", kind.xml_name());
        let loaded = read(&xml);
        assert_eq!(loaded.element.element_type(), kind);
    }
}

#[test]
fn unreadable_root_is_an_error() {
    let err = read_element_str("<Chord/>", &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, ReadError::UnknownElementType(ref t) if t == "Chord"));
}

#[test]
fn unknown_tags_are_skipped_and_reading_continues() {
    let loaded = read(
        "<Sticking><glitter><deep>1</deep></glitter><text>RLRR</text><sparkle/></Sticking>",
    );
    let Element::Sticking(s) = &loaded.element else { panic!("expected sticking") };
    assert_eq!(s.text.xml_text, "RLRR");
    assert_eq!(unknown_tags(&loaded.diagnostics), vec!["glitter", "sparkle"]);
}

#[test]
fn item_layer_is_reached_from_every_text_entity() {
    let loaded = read(
        r#"<RehearsalMark>
             <eid>A_B</eid>
             <track>5</track>
             <visible>0</visible>
             <offset x="1.5" y="-2"/>
             <color r="255" g="0" b="0" a="128"/>
             <text>B</text>
           </RehearsalMark>"#,
    );
    assert!(loaded.diagnostics.is_empty());
    let Element::RehearsalMark(m) = &loaded.element else { panic!("expected rehearsal mark") };
    assert_eq!(m.text.item.track, 5);
    assert!(!m.text.item.visible);
    assert_eq!(m.text.item.eid.as_deref(), Some("A_B"));
    assert_eq!(
        m.property(Pid::Offset),
        Some(&PropertyValue::Point(Point { x: 1.5, y: -2.0 }))
    );
    assert_eq!(
        m.property(Pid::Color),
        Some(&PropertyValue::Color(Color { r: 255, g: 0, b: 0, a: 128 }))
    );
    assert_eq!(m.text.item.flags(Pid::Offset), Some(PropertyFlags::NoStyle));
}

#[test]
fn styled_text_properties_are_marked_unstyled() {
    let loaded = read(
        r#"<Sticking>
             <style>sticking</style>
             <family>Edwin</family>
             <size>12</size>
             <align>center,baseline</align>
             <frameType>1</frameType>
             <italic>1</italic>
             <text>L</text>
           </Sticking>"#,
    );
    assert!(loaded.diagnostics.is_empty(), "{:?}", loaded.diagnostics);
    let Element::Sticking(s) = &loaded.element else { panic!("expected sticking") };
    assert_eq!(s.property(Pid::FontSize), Some(&PropertyValue::Real(12.0)));
    assert_eq!(s.text.item.flags(Pid::FontSize), Some(PropertyFlags::Unstyled));
    assert_eq!(s.text.item.flags(Pid::TextStyle), Some(PropertyFlags::NoStyle));
    assert_eq!(s.property(Pid::FontStyle), Some(&PropertyValue::Int(font_style::ITALIC)));
    assert_eq!(
        s.property(Pid::Align),
        Some(&PropertyValue::Align(Align { h: AlignH::HCenter, v: AlignV::Baseline }))
    );
    assert_eq!(s.property(Pid::FrameType), Some(&PropertyValue::FrameType(FrameType::Square)));
}

#[test]
fn out_of_domain_values_are_diagnosed_not_stored() {
    let loaded = read("<Sticking><size>-3</size><fontStyle>99</fontStyle><text>R</text></Sticking>");
    let Element::Sticking(s) = &loaded.element else { panic!("expected sticking") };
    assert_eq!(s.property(Pid::FontSize), None);
    assert_eq!(s.property(Pid::FontStyle), None);
    assert_eq!(s.text.xml_text, "R");
    assert_eq!(loaded.diagnostics.len(), 2);
    assert!(loaded.diagnostics.iter().all(Diagnostic::is_invalid_value));
}

// ─── Tempo ──────────────────────────────────────────────────────────

#[test]
fn tempo_without_text_gets_invisible_default() {
    let loaded = read("<Tempo><tempo>1.33333</tempo></Tempo>");
    let Element::Tempo(t) = &loaded.element else { panic!("expected tempo") };
    assert_eq!(t.text.xml_text, "<sym>metNoteQuarterUp</sym> = 80");
    assert!(!t.text.item.visible);
}

#[test]
fn tempo_with_text_stays_visible() {
    let loaded = read("<Tempo><tempo>2.5</tempo><followText>1</followText><text>Presto</text></Tempo>");
    let Element::Tempo(t) = &loaded.element else { panic!("expected tempo") };
    assert_eq!(t.bpm(), 150.0);
    assert!(t.follow_text);
    assert!(t.text.item.visible);
    assert_eq!(t.text.xml_text, "Presto");
}

#[test]
fn unreadable_tempo_falls_back_to_default() {
    let loaded = read("<Tempo><tempo>fast</tempo></Tempo>");
    let Element::Tempo(t) = &loaded.element else { panic!("expected tempo") };
    assert_eq!(t.tempo, DEFAULT_TEMPO);
    assert_eq!(t.text.xml_text, "<sym>metNoteQuarterUp</sym> = 120");
    assert!(loaded.diagnostics[0].is_invalid_value());
}

#[test]
fn non_positive_tempo_falls_back_to_default() {
    for body in ["0", "-1", "-0.5", "inf"] {
        let loaded = read(&format!("<Tempo><tempo>{body}</tempo></Tempo>"));
        let Element::Tempo(t) = &loaded.element else { panic!("expected tempo") };
        assert_eq!(t.tempo, DEFAULT_TEMPO, "{body}");
        assert_eq!(loaded.diagnostics.len(), 1, "{body}");
        assert!(loaded.diagnostics[0].is_invalid_value());
    }
}

// ─── Dynamic ────────────────────────────────────────────────────────

#[test]
fn dynamic_fields() {
    let loaded = read(
        r#"<Dynamic>
             <subtype>sfz</subtype>
             <velocity>112</velocity>
             <dynType>system</dynType>
             <veloChange>-20</veloChange>
             <veloChangeSpeed>fast</veloChangeSpeed>
             <text><sym>dynamicSforzando</sym></text>
           </Dynamic>"#,
    );
    assert!(loaded.diagnostics.is_empty());
    let Element::Dynamic(d) = &loaded.element else { panic!("expected dynamic") };
    assert_eq!(d.dynamic_type, "sfz");
    assert_eq!(d.velocity, 112);
    assert_eq!(d.dyn_range, DynamicRange::System);
    assert_eq!(d.change_in_velocity, -20);
    assert_eq!(d.vel_change_speed, DynamicSpeed::Fast);
    assert_eq!(d.text.xml_text, "<sym>dynamicSforzando</sym>");
}

#[test]
fn dynamic_defaults_on_bad_tokens() {
    let loaded = read("<Dynamic><dynType>galaxy</dynType><veloChangeSpeed>warp</veloChangeSpeed></Dynamic>");
    let Element::Dynamic(d) = &loaded.element else { panic!("expected dynamic") };
    assert_eq!(d.dyn_range, DynamicRange::Staff);
    assert_eq!(d.vel_change_speed, DynamicSpeed::Normal);
    assert_eq!(d.velocity, -1);
    assert_eq!(loaded.diagnostics.len(), 2);
}

// ─── Staff text family ──────────────────────────────────────────────

#[test]
fn midi_actions_accumulate_by_channel() {
    let loaded = read(
        r#"<StaffText>
             <MidiAction channel="3" name="pizz"/>
             <MidiAction channel="1" name="arco"/>
             <MidiAction channel="3" name="mute"/>
             <MidiAction channel="3" name="open"/>
             <text>pizz.</text>
           </StaffText>"#,
    );
    let Element::StaffText(t) = &loaded.element else { panic!("expected staff text") };
    let channels: Vec<i32> = t.base.channel_actions.iter().map(|a| a.channel).collect();
    assert_eq!(channels, vec![3, 1]);
    assert_eq!(t.base.channel_actions[0].midi_action_names, vec!["pizz", "mute", "open"]);
}

#[test]
fn channel_switch_without_voice_applies_to_all() {
    let loaded = read(
        r#"<StaffText>
             <channelSwitch name="tremolo"/>
             <articulationChange voice="2" name="mute"/>
             <channelSwitch voice="7" name="ignored"/>
           </StaffText>"#,
    );
    let Element::StaffText(t) = &loaded.element else { panic!("expected staff text") };
    assert_eq!(t.base.channel_names, ["tremolo", "tremolo", "mute", "tremolo"].map(String::from));
}

#[test]
fn swing_defaults_ratio() {
    let loaded = read(r#"<SystemText><swing unit="eighth"/><text>Swing</text></SystemText>"#);
    let Element::SystemText(t) = &loaded.element else { panic!("expected system text") };
    assert!(t.base.swing);
    assert_eq!(t.base.swing_parameters.unit, DIVISION / 2);
    assert_eq!(t.base.swing_parameters.ratio, 60);

    let loaded = read(r#"<SystemText><swing unit="16th" ratio="70"/></SystemText>"#);
    let Element::SystemText(t) = &loaded.element else { panic!("expected system text") };
    assert_eq!(t.base.swing_parameters.unit, DIVISION / 4);
    assert_eq!(t.base.swing_parameters.ratio, 70);

    let loaded = read(r#"<SystemText><swing unit="zero"/></SystemText>"#);
    let Element::SystemText(t) = &loaded.element else { panic!("expected system text") };
    assert!(t.base.swing);
    assert_eq!(t.base.swing_parameters.unit, 0);
}

#[test]
fn aeolus_and_capo() {
    let loaded = read(
        r#"<StaffText>
             <aeolus group="0">5</aeolus>
             <aeolus group="3">9</aeolus>
             <aeolus group="4">1</aeolus>
             <capo fretId="3"/>
           </StaffText>"#,
    );
    assert!(loaded.diagnostics.is_empty());
    let Element::StaffText(t) = &loaded.element else { panic!("expected staff text") };
    assert_eq!(t.base.aeolus_stops, [5, 0, 0, 9]);
    assert!(t.base.set_aeolus_stops);
    assert_eq!(t.base.capo, 3);
}

#[test]
fn play_technique_annotation() {
    let loaded = read(
        r#"<PlayTechAnnotation>
             <playTechType>mute</playTechType>
             <MidiAction channel="0" name="mute"/>
             <text>con sord.</text>
           </PlayTechAnnotation>"#,
    );
    assert!(loaded.diagnostics.is_empty());
    let Element::PlayTechAnnotation(a) = &loaded.element else { panic!("expected annotation") };
    assert_eq!(a.technique(), PlayingTechniqueType::Mute);
    assert_eq!(a.base.channel_actions.len(), 1);
    assert_eq!(a.base.text.xml_text, "con sord.");
}

#[test]
fn staff_text_reread_replaces_previous_state() {
    let xml = r#"<StaffText>
                   <MidiAction channel="1" name="pizz"/>
                   <channelSwitch voice="0" name="pizzicato"/>
                   <swing unit="eighth"/>
                   <text>pizz.</text>
                 </StaffText>"#;
    let doc = Document::parse(xml).unwrap();

    let mut t = StaffText::default();
    let mut e = XmlReader::new(&doc);
    read_staff_text_base(&mut t, &mut e);
    let first = t.clone();

    let mut e = XmlReader::new(&doc);
    read_staff_text_base(&mut t, &mut e);
    assert_eq!(t, first);
    assert_eq!(t.base.channel_actions[0].midi_action_names, vec!["pizz"]);
}

#[test]
fn plain_text_reader_leaves_cursor_on_end_tag() {
    let doc = Document::parse("<Measure><Sticking><text>R</text></Sticking><next/></Measure>").unwrap();
    let mut e = XmlReader::new(&doc);
    assert!(e.read_next_start_element());
    let mut s = Sticking::default();
    read_text_base(&mut s, &mut e);
    assert!(e.is_end_element());
    assert_eq!(e.name(), "Sticking");
    assert!(e.read_next_start_element());
    assert_eq!(e.name(), "next");
}

// ─── Harmony ────────────────────────────────────────────────────────

#[test]
fn harmony_fields_and_keyed_properties() {
    let loaded = read(
        r#"<Harmony>
             <root>16</root>
             <rootCase>1</rootCase>
             <base>17</base>
             <extension>5</extension>
             <name>m7</name>
             <function>ii7</function>
             <leftParen/>
             <rightParen/>
             <harmonyType>0</harmonyType>
             <play>0</play>
             <harmonyVoicing>3</harmonyVoicing>
             <harmonyDuration>1</harmonyDuration>
             <harmonyVoiceLiteral>1</harmonyVoiceLiteral>
             <posAbove>-2.5</posAbove>
           </Harmony>"#,
    );
    assert!(loaded.diagnostics.is_empty(), "{:?}", loaded.diagnostics);
    let Element::Harmony(h) = &loaded.element else { panic!("expected harmony") };
    assert_eq!(h.id, 5);
    assert_eq!(h.function, "ii7");
    assert_eq!(h.root_case, NoteCaseType::Lower);
    assert_eq!(h.property(Pid::Play), Some(&PropertyValue::Bool(false)));
    assert_eq!(
        h.property(Pid::HarmonyVoicing),
        Some(&PropertyValue::HarmonyVoicing(HarmonyVoicing::DropTwo))
    );
    assert_eq!(
        h.property(Pid::HarmonyDuration),
        Some(&PropertyValue::HarmonyDuration(HarmonyDurationType::UntilMeasureEnd))
    );
    assert_eq!(h.property(Pid::PosAbove), Some(&PropertyValue::Real(-2.5)));
    assert_eq!(h.harmony_name(), "(dm7/A)");
    assert_eq!(h.text.xml_text, "(dm7/A)");
}

#[test]
fn invalid_degrees_are_dropped() {
    let loaded = read(
        r#"<Harmony>
             <root>14</root>
             <degree><degree-value>9</degree-value><degree-alter>0</degree-alter><degree-type>add</degree-type></degree>
             <degree><degree-value>0</degree-value><degree-alter>0</degree-alter><degree-type>add</degree-type></degree>
             <degree><degree-value>14</degree-value><degree-alter>0</degree-alter><degree-type>add</degree-type></degree>
             <degree><degree-value>5</degree-value><degree-alter>3</degree-alter><degree-type>alter</degree-type></degree>
             <degree><degree-value>3</degree-value><degree-alter>0</degree-alter><degree-type>remove</degree-type></degree>
             <degree><degree-value>3</degree-value><degree-alter>0</degree-alter><degree-type>subtract</degree-type></degree>
             <leftParen/>
           </Harmony>"#,
    );
    let Element::Harmony(h) = &loaded.element else { panic!("expected harmony") };
    assert_eq!(
        h.degrees,
        vec![
            HDegree { value: 9, alter: 0, kind: HDegreeType::Add },
            HDegree { value: 3, alter: 0, kind: HDegreeType::Subtract },
        ]
    );
    assert_eq!(loaded.diagnostics.len(), 4);
    assert!(loaded.diagnostics.iter().all(Diagnostic::is_invalid_value));
    // rest of the entity is intact
    assert!(h.left_paren);
    assert_eq!(h.root_tpc, 14);
    assert_eq!(h.harmony_name(), "(Cadd9omit3");
}

// ─── Fretboard diagrams ─────────────────────────────────────────────

#[test]
fn new_format_wins_over_trailing_legacy_tags() {
    let loaded = read(
        r#"<FretDiagram>
             <fretDiagram>
               <string no="1"><dot fret="2">triangle</dot><dot fret="4">normal</dot></string>
               <string no="5"><marker>cross</marker></string>
               <barre start="0" end="5">1</barre>
             </fretDiagram>
             <strings>4</strings>
             <string no="2"><dot>7</dot></string>
             <barre>1</barre>
             <bogus/>
           </FretDiagram>"#,
    );
    assert!(loaded.diagnostics.is_empty(), "{:?}", loaded.diagnostics);
    let Element::FretDiagram(d) = &loaded.element else { panic!("expected diagram") };
    assert_eq!(d.strings, 6);
    assert!(d.dot(2).is_empty());
    assert_eq!(
        d.dot(1),
        &[
            FretDot { fret: 2, dot_type: FretDotType::Triangle },
            FretDot { fret: 4, dot_type: FretDotType::Normal },
        ]
    );
    assert_eq!(d.markers.get(&5), Some(&FretMarkerType::Cross));
    assert_eq!(d.barres.get(&1), Some(&FretBarre { start_string: 0, end_string: 5 }));
    assert_eq!(d.barres.len(), 1);
}

#[test]
fn legacy_barre_uses_first_dotted_string() {
    let loaded = read(
        r#"<FretDiagram>
             <strings>6</strings>
             <frets>5</frets>
             <string no="3"><dot>2</dot></string>
             <string no="1"><dot>4</dot></string>
             <string no="0"><marker>79</marker></string>
             <barre>1</barre>
           </FretDiagram>"#,
    );
    let Element::FretDiagram(d) = &loaded.element else { panic!("expected diagram") };
    assert_eq!(d.barres.len(), 1);
    assert_eq!(d.barres.get(&4), Some(&FretBarre { start_string: 1, end_string: -1 }));
    assert_eq!(d.markers.get(&0), Some(&FretMarkerType::Circle));
}

#[test]
fn legacy_barre_flag_without_dots_adds_nothing() {
    let loaded = read("<FretDiagram><barre>1</barre></FretDiagram>");
    let Element::FretDiagram(d) = &loaded.element else { panic!("expected diagram") };
    assert!(d.barres.is_empty());
}

#[test]
fn fret_geometry_properties() {
    let loaded = read(
        r#"<FretDiagram>
             <strings>4</strings>
             <frets>7</frets>
             <fretOffset>2</fretOffset>
             <showNut>0</showNut>
             <orientation>horizontal</orientation>
             <mag>1.25</mag>
             <strings>0</strings>
             <string no="9"><dot>1</dot></string>
           </FretDiagram>"#,
    );
    let Element::FretDiagram(d) = &loaded.element else { panic!("expected diagram") };
    assert_eq!((d.strings, d.frets, d.fret_offset), (4, 7, 2));
    assert!(!d.show_nut);
    assert_eq!(d.orientation, Orientation::Horizontal);
    assert_eq!(d.user_mag, 1.25);
    assert_eq!(d.item.flags(Pid::FretStrings), Some(PropertyFlags::Unstyled));
    // zero strings and a dot on a missing string
    assert_eq!(loaded.diagnostics.len(), 2);
    assert!(d.dots.is_empty());
}

#[test]
fn diagram_owns_its_chord_symbol() {
    let loaded = read(
        r#"<FretDiagram>
             <track>8</track>
             <Harmony><root>13</root><name>maj7</name></Harmony>
             <string no="0"><dot>1</dot></string>
           </FretDiagram>"#,
    );
    let Element::FretDiagram(d) = &loaded.element else { panic!("expected diagram") };
    let h = d.harmony.as_ref().expect("chord symbol");
    assert_eq!(h.harmony_name(), "Fmaj7");
    assert_eq!(h.text.item.track, 8);
    assert_eq!(d.dot(0)[0].fret, 1);
}

// ─── Tremolo bar ────────────────────────────────────────────────────

#[test]
fn bend_curve_keeps_point_order() {
    let loaded = read(
        r#"<TremoloBar>
             <point time="0" pitch="0" vibrato="0"/>
             <point time="15" pitch="-50" vibrato="0"/>
             <point time="60" pitch="-50" vibrato="1"/>
             <point time="30" pitch="-100" vibrato="0"/>
             <mag>25</mag>
             <play>0</play>
             <placement>below</placement>
             <lineWidth>0.2</lineWidth>
           </TremoloBar>"#,
    );
    assert!(loaded.diagnostics.is_empty(), "{:?}", loaded.diagnostics);
    let Element::TremoloBar(b) = &loaded.element else { panic!("expected tremolo bar") };
    let times: Vec<i32> = b.points.iter().map(|p| p.time).collect();
    assert_eq!(times, vec![0, 15, 60, 30]);
    assert_eq!(b.user_mag, 10.0);
    assert!(!b.play);
    assert_eq!(b.item.flags(Pid::Placement), Some(PropertyFlags::Unstyled));
    assert_eq!(b.property(Pid::LineWidth), Some(&PropertyValue::Spatium(0.2)));
}

#[test]
fn bend_point_missing_attribute_is_diagnosed() {
    let loaded = read(r#"<TremoloBar><point time="10" pitch="25"/><visible>0</visible></TremoloBar>"#);
    let Element::TremoloBar(b) = &loaded.element else { panic!("expected tremolo bar") };
    assert_eq!(b.points, vec![PitchValue { time: 10, pitch: 25, vibrato: false }]);
    assert!(loaded.diagnostics[0].is_invalid_value());
    // the bend reader has no item layer
    assert!(loaded.diagnostics[1].is_unknown_element("visible"));
}

// ─── Instrument change and staff state ──────────────────────────────

#[test]
fn instrument_change_fragment() {
    let loaded = read(
        r#"<InstrumentChange>
             <Instrument id="trumpet">
               <longName>Trumpet in B♭</longName>
               <transposeDiatonic>-1</transposeDiatonic>
               <transposeChromatic>-2</transposeChromatic>
             </Instrument>
             <init>1</init>
             <text>To Trumpet</text>
           </InstrumentChange>"#,
    );
    let Element::InstrumentChange(c) = &loaded.element else { panic!("expected change") };
    assert!(c.init);
    assert_eq!(c.instrument.id, "trumpet");
    assert_eq!(c.instrument.transpose, Interval { diatonic: -1, chromatic: -2 });
    assert_eq!(c.instrument.channels.len(), 1);
    assert_eq!(c.text.xml_text, "To Trumpet");
}

#[test]
fn legacy_instrument_change_without_staff_gets_no_transposition() {
    let options = LoadOptions { msc_version: Some(114), strict: false };
    let loaded = read_element_str(
        r#"<InstrumentChange>
             <Instrument><transposeChromatic>-2</transposeChromatic></Instrument>
           </InstrumentChange>"#,
        &options,
    )
    .unwrap();
    let Element::InstrumentChange(c) = &loaded.element else { panic!("expected change") };
    assert_eq!(c.instrument.transpose, Interval::default());
}

#[test]
fn staff_state_fields() {
    let loaded = read(
        r#"<StaffState>
             <subtype>3</subtype>
             <Instrument><longName>Piano</longName></Instrument>
             <visible>0</visible>
           </StaffState>"#,
    );
    assert!(loaded.diagnostics.is_empty());
    let Element::StaffState(s) = &loaded.element else { panic!("expected staff state") };
    assert_eq!(s.state_type, StaffStateType::Invisible);
    assert_eq!(s.instrument.long_name, "Piano");
    assert!(!s.item.visible);
}

#[test]
fn staff_state_rejects_unknown_subtype() {
    let loaded = read("<StaffState><subtype>12</subtype></StaffState>");
    let Element::StaffState(s) = &loaded.element else { panic!("expected staff state") };
    assert_eq!(s.state_type, StaffStateType::Instrument);
    assert!(loaded.diagnostics[0].is_invalid_value());
}

// ─── Figured bass ───────────────────────────────────────────────────

#[test]
fn figured_bass_joins_item_texts() {
    let loaded = read(
        r#"<FiguredBass>
             <ticks>1/2</ticks>
             <onNote>0</onNote>
             <text>ignored</text>
             <FiguredBassItem>
               <brackets b0="0" b1="0" b2="0" b3="0" b4="0"/>
               <prefix>2</prefix>
               <digit>7</digit>
               <continuationLine>1</continuationLine>
             </FiguredBassItem>
             <FiguredBassItem>
               <brackets b0="3" b1="0" b2="0" b3="0" b4="4"/>
               <digit>5</digit>
               <suffix>8</suffix>
             </FiguredBassItem>
           </FiguredBass>"#,
    );
    assert!(loaded.diagnostics.is_empty(), "{:?}", loaded.diagnostics);
    let Element::FiguredBass(b) = &loaded.element else { panic!("expected figured bass") };
    assert_eq!(b.ticks, Fraction::new(1, 2));
    assert!(!b.on_note);
    let ords: Vec<usize> = b.items.iter().map(|i| i.ord).collect();
    assert_eq!(ords, vec![0, 1]);
    assert_eq!(b.text.xml_text, "b7_\n[5/]");
}

#[test]
fn figured_bass_without_items_keeps_text() {
    let loaded = read("<FiguredBass><text>6\n4</text><ticks>1/4</ticks></FiguredBass>");
    let Element::FiguredBass(b) = &loaded.element else { panic!("expected figured bass") };
    assert!(b.items.is_empty());
    assert_eq!(b.text.xml_text, "6\n4");
}

#[test]
fn figured_bass_item_bad_codes() {
    let loaded = read(
        r#"<FiguredBass>
             <FiguredBassItem><brackets b0="9"/><prefix>12</prefix><digit>3</digit></FiguredBassItem>
           </FiguredBass>"#,
    );
    let Element::FiguredBass(b) = &loaded.element else { panic!("expected figured bass") };
    assert_eq!(b.items[0].normalized_text(), "3");
    assert_eq!(loaded.diagnostics.len(), 2);
}

#[test]
fn figured_bass_overflowing_duration_reads_as_zero() {
    let loaded = read(
        r#"<FiguredBass><ticks>-2147483648/-1</ticks><FiguredBassItem><digit>6</digit></FiguredBassItem></FiguredBass>"#,
    );
    let Element::FiguredBass(b) = &loaded.element else { panic!("expected figured bass") };
    assert_eq!(b.ticks, Fraction::from_integer(0));
    assert_eq!(b.items.len(), 1);
    assert_eq!(b.text.xml_text, "6");
    assert_eq!(loaded.diagnostics.len(), 1);
    assert!(loaded.diagnostics[0].is_invalid_value());
}

// ─── Serialization ──────────────────────────────────────────────────

#[test]
fn entities_survive_json_round_trip() {
    let fragments = [
        r#"<StaffText><MidiAction channel="1" name="pizz"/><swing unit="eighth"/><text>x</text></StaffText>"#,
        r#"<Harmony><root>14</root><name>7</name><play>0</play></Harmony>"#,
        r#"<FretDiagram><fretDiagram><string no="2"><dot fret="3">cross</dot></string><barre start="1" end="-1">3</barre></fretDiagram></FretDiagram>"#,
        r#"<FiguredBass><ticks>1/4</ticks><FiguredBassItem><digit>6</digit></FiguredBassItem></FiguredBass>"#,
        r#"<Dynamic><subtype>ff</subtype><size>14</size><color r="1" g="2" b="3" a="4"/></Dynamic>"#,
    ];
    for xml in fragments {
        let loaded = read(xml);
        let json = serde_json::to_string(&loaded.element).unwrap();
        let back: Element = serde_json::from_str(&json).unwrap();
        assert_eq!(back, loaded.element, "{xml}");
    }
}
