use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use xforms_render::{
    parse_template, render_document, render_subtree, render_to_string, Attributes, ControlSnapshot,
    EventRecorder, Item, LiveControl, MarkupEvent, QName, RenderConfig, RenderError, StaticIndex,
};

const XHTML: &str = "http://www.w3.org/1999/xhtml";

fn get_fixture_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("fixtures");
    path.push(filename);
    path
}

fn read_fixture(filename: &str) -> String {
    fs::read_to_string(get_fixture_path(filename)).unwrap()
}

fn render(template: &str, snapshot: &ControlSnapshot, config: &RenderConfig) -> Vec<MarkupEvent> {
    let doc = parse_template(template).unwrap();
    let index = StaticIndex::analyze(&doc, config).unwrap();
    let mut recorder = EventRecorder::new();
    render_document(&doc, &index, snapshot, config, &mut recorder).unwrap();
    recorder.into_events()
}

fn render_target(template: &str, snapshot: &ControlSnapshot, config: &RenderConfig, target: &str) -> Vec<MarkupEvent> {
    let doc = parse_template(template).unwrap();
    let index = StaticIndex::analyze(&doc, config).unwrap();
    let mut recorder = EventRecorder::new();
    render_subtree(&doc, &index, snapshot, config, target, &mut recorder).unwrap();
    recorder.into_events()
}

/// Start elements as `(local name, attributes)`.
fn starts(events: &[MarkupEvent]) -> Vec<(&str, &Attributes)> {
    events
        .iter()
        .filter_map(|e| match e {
            MarkupEvent::StartElement { name, attributes } => Some((name.name.as_str(), attributes)),
            _ => None,
        })
        .collect()
}

fn has_class(attributes: &Attributes, class: &str) -> bool {
    attributes
        .get("class")
        .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
}

fn count_class(events: &[MarkupEvent], class: &str) -> usize {
    starts(events)
        .iter()
        .filter(|(_, attributes)| has_class(attributes, class))
        .count()
}

fn find_id<'e>(events: &'e [MarkupEvent], id: &str) -> Option<(&'e str, &'e Attributes)> {
    starts(events)
        .into_iter()
        .find(|(_, attributes)| attributes.get("id") == Some(id))
}

fn order_form() -> (String, ControlSnapshot) {
    let template = read_fixture("order-form.xhtml");
    let snapshot = ControlSnapshot::from_yaml(&read_fixture("order-state.yaml")).unwrap();
    (template, snapshot)
}

// ─── Fixtures ─────────────────────────────────────────────────────────────────

#[test]
fn test_order_form_is_deterministic() {
    let (template, snapshot) = order_form();
    let config = RenderConfig::default();
    assert_eq!(
        render(&template, &snapshot, &config),
        render(&template, &snapshot, &config)
    );
}

#[test]
fn test_order_form_repeat_rows() {
    let (template, snapshot) = order_form();
    let events = render(&template, &snapshot, &RenderConfig::default());

    let (name, begin) = find_id(&events, "repeat-begin-lines").unwrap();
    assert_eq!(name, "tr");
    assert_eq!(begin.get("class"), Some("xforms-repeat-begin-end line"));
    assert_eq!(find_id(&events, "repeat-end-lines").unwrap().0, "tr");

    let rows: Vec<&str> = starts(&events)
        .into_iter()
        .filter(|(name, attributes)| *name == "tr" && attributes.get("id").is_none())
        .filter_map(|(_, attributes)| attributes.get("class"))
        .collect();
    assert_eq!(
        rows,
        vec![
            "line xforms-dnd xforms-dnd-vertical",
            "xforms-repeat-delimiter",
            "xforms-repeat-selected-item-1 line xforms-dnd xforms-dnd-vertical",
            "xforms-repeat-delimiter",
            "xforms-repeat-template xforms-dnd xforms-dnd-vertical",
        ]
    );
    assert_eq!(count_class(&events, "xforms-repeat-selected-item-1"), 1);
}

#[test]
fn test_order_form_iteration_ids() {
    let (template, snapshot) = order_form();
    let events = render(&template, &snapshot, &RenderConfig::default());

    for id in ["product⊙1", "quantity⊙1", "product⊙2", "quantity⊙2", "quantity≡≡c⊙2"] {
        assert!(find_id(&events, id).is_some(), "missing {}", id);
    }

    let (_, alert) = find_id(&events, "quantity≡≡a⊙2").unwrap();
    assert!(has_class(alert, "xforms-active"));
    let (_, alert) = find_id(&events, "quantity≡≡a⊙1").unwrap();
    assert!(!has_class(alert, "xforms-active"));

    // The template row uses static ids and is not disabled
    let (_, quantity) = find_id(&events, "quantity").unwrap();
    assert!(!has_class(quantity, "xforms-disabled"));
    assert!(find_id(&events, "quantity≡≡c").is_some());
}

#[test]
fn test_order_form_cases() {
    let (template, snapshot) = order_form();
    let events = render(&template, &snapshot, &RenderConfig::default());

    let (name, button) = find_id(&events, "review-button").unwrap();
    assert_eq!(name, "button");
    assert!(has_class(button, "xforms-case-selected"));
    assert_eq!(button.get("style"), Some("display:block"));

    let (_, paragraph) = starts(&events)
        .into_iter()
        .find(|(name, attributes)| *name == "p" && has_class(attributes, "xforms-case-deselected"))
        .unwrap();
    assert_eq!(paragraph.get("style"), Some("display:none"));

    // Every first-level element of a case is annotated
    let (_, send) = find_id(&events, "send").unwrap();
    assert!(has_class(send, "xforms-case-deselected"));

    assert_eq!(find_id(&events, "xforms-case-begin-edit").unwrap().0, "button");
    assert_eq!(find_id(&events, "xforms-case-end-review").unwrap().0, "p");
}

#[test]
fn test_order_form_noscript() {
    let (template, snapshot) = order_form();
    let config = RenderConfig::from_yaml(&read_fixture("noscript.yaml")).unwrap();
    let events = render(&template, &snapshot, &config);

    assert_eq!(count_class(&events, "xforms-repeat-begin-end"), 0);
    assert_eq!(count_class(&events, "xforms-repeat-delimiter"), 0);
    assert_eq!(count_class(&events, "xforms-repeat-template"), 0);
    assert_eq!(count_class(&events, "xforms-case-begin-end"), 0);
    assert!(find_id(&events, "quantity⊙2").is_some());
    assert!(find_id(&events, "quantity").is_none());

    // Deselected case content is dropped
    assert!(find_id(&events, "review-button").is_some());
    assert!(find_id(&events, "send").is_none());
    assert!(starts(&events).iter().all(|(name, _)| *name != "p"));
}

#[test]
fn test_order_form_shipping_radios() {
    let (template, snapshot) = order_form();
    let events = render(&template, &snapshot, &RenderConfig::default());

    let (_, shipping) = find_id(&events, "shipping").unwrap();
    assert!(has_class(shipping, "xforms-select1-appearance-full"));
    let (name, standard) = find_id(&events, "shipping≡≡e0").unwrap();
    assert_eq!(name, "input");
    assert_eq!(standard.get("type"), Some("radio"));
    assert_eq!(standard.get("checked"), None);
    let (_, express) = find_id(&events, "shipping≡≡e1").unwrap();
    assert_eq!(express.get("checked"), Some("checked"));
    assert_eq!(express.get("name"), Some("shipping"));
}

// ─── Repeats ──────────────────────────────────────────────────────────────────

const LIST: &str = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:repeat xmlns:xf="http://www.w3.org/2002/xforms" id="r" ref="i"><p><xf:output id="o" ref="."/></p></xf:repeat></div>"#;

fn list_snapshot(size: u32, index: u32) -> ControlSnapshot {
    let mut snapshot = ControlSnapshot::new().with("r", LiveControl::new("repeat").with_repeat(size, index));
    for i in 1..=size {
        snapshot.insert(
            &format!("o⊙{}", i),
            LiveControl::new("output").with_parent("r").with_value(&format!("item {}", i)),
        );
    }
    snapshot
}

fn no_templates() -> RenderConfig {
    RenderConfig {
        generate_templates: false,
        ..RenderConfig::default()
    }
}

#[test]
fn test_repeat_cardinality() {
    let events = render(LIST, &list_snapshot(3, 2), &no_templates());

    assert_eq!(count_class(&events, "xforms-repeat-begin-end"), 2);
    assert_eq!(count_class(&events, "xforms-repeat-delimiter"), 2);
    assert_eq!(count_class(&events, "xforms-repeat-template"), 0);
    assert_eq!(count_class(&events, "xforms-repeat-selected-item-1"), 1);

    let outputs: Vec<&str> = starts(&events)
        .into_iter()
        .filter(|(_, attributes)| has_class(attributes, "xforms-output"))
        .filter_map(|(_, attributes)| attributes.get("id"))
        .collect();
    assert_eq!(outputs, vec!["o⊙1", "o⊙2", "o⊙3"]);
}

#[test]
fn test_repeat_with_template() {
    let events = render(LIST, &list_snapshot(3, 2), &RenderConfig::default());

    assert_eq!(count_class(&events, "xforms-repeat-delimiter"), 3);
    assert_eq!(count_class(&events, "xforms-repeat-template"), 1);
    let (name, output) = find_id(&events, "o").unwrap();
    assert_eq!(name, "span");
    assert!(!has_class(output, "xforms-disabled"));
}

#[test]
fn test_empty_repeat_without_template() {
    let events = render(LIST, &list_snapshot(0, 0), &no_templates());

    let elements: Vec<(&str, Option<&str>, Option<&str>)> = starts(&events)
        .into_iter()
        .map(|(name, attributes)| (name, attributes.get("id"), attributes.get("class")))
        .collect();
    assert_eq!(
        elements,
        vec![
            ("div", None, None),
            ("p", Some("repeat-begin-r"), Some("xforms-repeat-begin-end")),
            ("p", Some("repeat-end-r"), Some("xforms-repeat-begin-end")),
        ]
    );
}

#[test]
fn test_bare_text_iterations_are_wrapped() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:repeat xmlns:xf="http://www.w3.org/2002/xforms" id="r" ref="i">Item</xf:repeat></div>"#;
    let snapshot = ControlSnapshot::new().with("r", LiveControl::new("repeat").with_repeat(2, 1));
    let xhtml = render_to_string(template, &snapshot, &no_templates()).unwrap();
    assert_eq!(
        xhtml,
        concat!(
            r#"<div xmlns="http://www.w3.org/1999/xhtml">"#,
            r#"<span id="repeat-begin-r" class="xforms-repeat-begin-end"/>"#,
            r#"<span class="xforms-repeat-selected-item-1">Item</span>"#,
            r#"<span class="xforms-repeat-delimiter"/>"#,
            r#"<span>Item</span>"#,
            r#"<span id="repeat-end-r" class="xforms-repeat-begin-end"/>"#,
            r#"</div>"#
        )
    );
}

#[test]
fn test_wrapped_text_keeps_its_spaces() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:repeat xmlns:xf="http://www.w3.org/2002/xforms" id="r" ref="i"> Total:  <b>1</b></xf:repeat></div>"#;
    let snapshot = ControlSnapshot::new().with("r", LiveControl::new("repeat").with_repeat(1, 1));
    let xhtml = render_to_string(template, &snapshot, &no_templates()).unwrap();
    assert_eq!(
        xhtml,
        concat!(
            r#"<div xmlns="http://www.w3.org/1999/xhtml">"#,
            r#"<span id="repeat-begin-r" class="xforms-repeat-begin-end"/>"#,
            r#"<span class="xforms-repeat-selected-item-1"> Total:  </span>"#,
            r#"<b class="xforms-repeat-selected-item-1">1</b>"#,
            r#"<span id="repeat-end-r" class="xforms-repeat-begin-end"/>"#,
            r#"</div>"#
        )
    );
}

#[test]
fn test_dnd_without_direction() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:repeat xmlns:xf="http://www.w3.org/2002/xforms" xmlns:xxf="http://orbeon.org/oxf/xml/xforms" id="r" ref="i" xxf:dnd="true" xxf:dnd-over="none"><p>x</p></xf:repeat></div>"#;
    let snapshot = ControlSnapshot::new().with("r", LiveControl::new("repeat").with_repeat(2, 1));
    let events = render(template, &snapshot, &no_templates());

    let classes: Vec<&str> = starts(&events)
        .into_iter()
        .filter(|(name, attributes)| *name == "p" && attributes.get("id").is_none())
        .filter_map(|(_, attributes)| attributes.get("class"))
        .collect();
    assert_eq!(
        classes,
        vec![
            "xforms-repeat-selected-item-1 xforms-dnd xforms-dnd-over",
            "xforms-repeat-delimiter",
            "xforms-dnd xforms-dnd-over",
        ]
    );
    assert_eq!(count_class(&events, "xforms-dnd-horizontal"), 0);
}

#[test]
fn test_irrelevant_iteration_is_disabled() {
    let mut snapshot = list_snapshot(2, 1);
    let mut repeat = LiveControl::new("repeat").with_repeat(2, 1);
    if let Some(state) = repeat.repeat.as_mut() {
        state.relevant = vec![true, false];
    }
    snapshot.insert("r", repeat);
    let events = render(LIST, &snapshot, &no_templates());

    let classes: Vec<&str> = starts(&events)
        .into_iter()
        .filter(|(name, attributes)| *name == "p" && attributes.get("id").is_none())
        .filter_map(|(_, attributes)| attributes.get("class"))
        .collect();
    assert_eq!(
        classes,
        vec!["xforms-repeat-selected-item-1", "xforms-repeat-delimiter", "xforms-disabled"]
    );
}

const NESTED: &str = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:repeat xmlns:xf="http://www.w3.org/2002/xforms" id="outer" ref="o"><section><xf:repeat id="inner" ref="i"><p><xf:output id="v" ref="."/></p></xf:repeat></section></xf:repeat></div>"#;

fn nested_snapshot() -> ControlSnapshot {
    ControlSnapshot::new()
        .with("outer", LiveControl::new("repeat").with_repeat(2, 1))
        .with("inner⊙1", LiveControl::new("repeat").with_parent("outer").with_repeat(2, 2))
        .with("inner⊙2", LiveControl::new("repeat").with_parent("outer").with_repeat(1, 1))
        .with("v⊙1-1", LiveControl::new("output").with_parent("inner⊙1").with_value("a"))
        .with("v⊙1-2", LiveControl::new("output").with_parent("inner⊙1").with_value("b"))
        .with("v⊙2-1", LiveControl::new("output").with_parent("inner⊙2").with_value("c"))
}

#[test]
fn test_nested_repeats() {
    let events = render(NESTED, &nested_snapshot(), &no_templates());

    let outputs: Vec<&str> = starts(&events)
        .into_iter()
        .filter(|(_, attributes)| has_class(attributes, "xforms-output"))
        .filter_map(|(_, attributes)| attributes.get("id"))
        .collect();
    assert_eq!(outputs, vec!["v⊙1-1", "v⊙1-2", "v⊙2-1"]);

    // Only the selected path is marked: inner⊙2 has index 1 but sits in an
    // unselected outer iteration
    assert_eq!(count_class(&events, "xforms-repeat-selected-item-1"), 1);
    assert_eq!(count_class(&events, "xforms-repeat-selected-item-2"), 1);
    assert!(find_id(&events, "repeat-begin-inner⊙1").is_some());
    assert!(find_id(&events, "repeat-end-inner⊙2").is_some());
}

#[test]
fn test_nested_template_has_no_postfix() {
    let events = render(NESTED, &nested_snapshot(), &RenderConfig::default());
    assert!(find_id(&events, "repeat-begin-inner").is_some());
    assert!(find_id(&events, "v").is_some());
    assert_eq!(count_class(&events, "xforms-repeat-template"), 1);
}

// ─── Full updates ─────────────────────────────────────────────────────────────

#[test]
fn test_subtree_matches_full_render() {
    let snapshot = nested_snapshot();
    let config = no_templates();
    let full = render(NESTED, &snapshot, &config);
    let subtree = render_target(NESTED, &snapshot, &config, "v⊙1-2");

    let start = full
        .iter()
        .position(|e| matches!(e, MarkupEvent::StartElement { attributes, .. } if attributes.get("id") == Some("v⊙1-2")))
        .unwrap();
    assert_eq!(&full[start..start + subtree.len()], subtree.as_slice());
}

#[test]
fn test_subtree_repeat_has_no_markers() {
    let events = render_target(NESTED, &nested_snapshot(), &RenderConfig::default(), "inner⊙1");

    assert_eq!(count_class(&events, "xforms-repeat-begin-end"), 0);
    assert_eq!(count_class(&events, "xforms-repeat-delimiter"), 1);
    assert_eq!(count_class(&events, "xforms-repeat-selected-item-2"), 1);
    assert_eq!(count_class(&events, "xforms-repeat-template"), 0);
}

#[test]
fn test_subtree_unknown_control() {
    let doc = parse_template(NESTED).unwrap();
    let config = RenderConfig::default();
    let index = StaticIndex::analyze(&doc, &config).unwrap();
    let result = render_subtree(&doc, &index, &nested_snapshot(), &config, "v⊙9-9", &mut EventRecorder::new());
    assert!(matches!(result, Err(RenderError::UnknownControl { .. })));
}

// ─── Controls ─────────────────────────────────────────────────────────────────

#[test]
fn test_input_serialisation() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:input xmlns:xf="http://www.w3.org/2002/xforms" id="name" ref="name"><xf:label>Name</xf:label></xf:input></div>"#;
    let snapshot = ControlSnapshot::new().with("name", LiveControl::new("input").with_value("Ada"));
    let xhtml = render_to_string(template, &snapshot, &RenderConfig::default()).unwrap();
    assert_eq!(
        xhtml,
        concat!(
            r#"<div xmlns="http://www.w3.org/1999/xhtml">"#,
            r#"<label id="name≡≡l" class="xforms-label" for="name≡≡c">Name</label>"#,
            r#"<span id="name" class="xforms-control xforms-input">"#,
            r#"<input id="name≡≡c" name="name" type="text" value="Ada" class="xforms-input-input"/>"#,
            r#"</span></div>"#
        )
    );
}

#[test]
fn test_switch_serialisation() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:switch xmlns:xf="http://www.w3.org/2002/xforms" id="s"><xf:case id="c1"><p>one</p></xf:case><xf:case id="c2"><p>two</p></xf:case></xf:switch></div>"#;
    let snapshot = ControlSnapshot::new()
        .with("s", LiveControl::new("switch"))
        .with("c1", LiveControl::new("case").with_parent("s").with_selected(true))
        .with("c2", LiveControl::new("case").with_parent("s"));

    let xhtml = render_to_string(template, &snapshot, &RenderConfig::default()).unwrap();
    assert_eq!(
        xhtml,
        concat!(
            r#"<div xmlns="http://www.w3.org/1999/xhtml"><span id="s" class="xforms-switch">"#,
            r#"<p id="xforms-case-begin-c1" class="xforms-case-begin-end"/>"#,
            r#"<p class="xforms-case-selected" style="display:block">one</p>"#,
            r#"<p id="xforms-case-end-c1" class="xforms-case-begin-end"/>"#,
            r#"<p id="xforms-case-begin-c2" class="xforms-case-begin-end"/>"#,
            r#"<p class="xforms-case-deselected" style="display:none">two</p>"#,
            r#"<p id="xforms-case-end-c2" class="xforms-case-begin-end"/>"#,
            r#"</span></div>"#
        )
    );

    let noscript = RenderConfig {
        noscript: true,
        ..RenderConfig::default()
    };
    let xhtml = render_to_string(template, &snapshot, &noscript).unwrap();
    assert_eq!(
        xhtml,
        r#"<div xmlns="http://www.w3.org/1999/xhtml"><span id="s" class="xforms-switch"><p>one</p></span></div>"#
    );
}

#[test]
fn test_group_in_table() {
    let template = r#"<table xmlns="http://www.w3.org/1999/xhtml"><xf:group xmlns:xf="http://www.w3.org/2002/xforms" id="g" ref="g"><tr><td>a</td></tr><tr><td>b</td></tr></xf:group></table>"#;
    let snapshot = ControlSnapshot::new().with("g", LiveControl::new("group"));
    let xhtml = render_to_string(template, &snapshot, &RenderConfig::default()).unwrap();
    assert_eq!(
        xhtml,
        concat!(
            r#"<table xmlns="http://www.w3.org/1999/xhtml">"#,
            r#"<tr id="group-begin-g" class="xforms-group-begin-end"/>"#,
            r#"<tr class="xforms-group"><td>a</td></tr>"#,
            r#"<tr class="xforms-group"><td>b</td></tr>"#,
            r#"<tr id="group-end-g" class="xforms-group-begin-end"/>"#,
            r#"</table>"#
        )
    );
}

#[test]
fn test_component_prefixes_ids() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml" xmlns:xf="http://www.w3.org/2002/xforms" xmlns:acme="urn:acme"><acme:card id="card"><xf:input id="name" ref="n"/></acme:card></div>"#;
    let config = RenderConfig {
        components: vec![QName::new("urn:acme", "acme", "card")],
        ..RenderConfig::default()
    };
    let snapshot = ControlSnapshot::new()
        .with("card", LiveControl::new("component"))
        .with("card≡name", LiveControl::new("input").with_parent("card").with_value("x"));
    let events = render(template, &snapshot, &config);

    let (name, card) = find_id(&events, "card").unwrap();
    assert_eq!(name, "span");
    assert_eq!(card.get("class"), Some("xbl-component xbl-acme-card"));
    let (_, input) = find_id(&events, "card≡name≡≡c").unwrap();
    assert_eq!(input.get("value"), Some("x"));
}

#[test]
fn test_missing_trigger_label_in_repeat() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:repeat xmlns:xf="http://www.w3.org/2002/xforms" id="r" ref="i"><xf:trigger id="t"/></xf:repeat></div>"#;
    let snapshot = ControlSnapshot::new()
        .with("r", LiveControl::new("repeat").with_repeat(1, 1))
        .with("t⊙1", LiveControl::new("trigger").with_parent("r"));

    let err = render_to_string(template, &snapshot, &RenderConfig::default()).unwrap_err();
    match &err {
        RenderError::Located { location, .. } => {
            assert_eq!(location.description.as_deref(), Some("unrolling repeat control"))
        }
        other => panic!("expected a located error, got {:?}", other),
    }
    assert!(matches!(err.root_cause(), RenderError::MissingLabel { id, .. } if id == "t⊙1"));
}

#[test]
fn test_static_readonly_trigger_is_not_rendered() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:trigger xmlns:xf="http://www.w3.org/2002/xforms" id="t"><xf:label>Go</xf:label></xf:trigger></div>"#;
    let mut trigger = LiveControl::new("trigger");
    trigger.readonly = true;
    let snapshot = ControlSnapshot::new().with("t", trigger);
    let config = RenderConfig {
        static_readonly: true,
        ..RenderConfig::default()
    };
    let xhtml = render_to_string(template, &snapshot, &config).unwrap();
    assert_eq!(xhtml, r#"<div xmlns="http://www.w3.org/1999/xhtml"/>"#);
}

#[test]
fn test_type_mismatch_is_fatal() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:input xmlns:xf="http://www.w3.org/2002/xforms" id="name" ref="name"/></div>"#;
    let snapshot = ControlSnapshot::new().with("name", LiveControl::new("select1"));
    let err = render_to_string(template, &snapshot, &RenderConfig::default()).unwrap_err();
    assert!(matches!(err, RenderError::ControlTypeMismatch { .. }));
}

#[test]
fn test_xhtml_prefix_is_reused() {
    let (template, snapshot) = order_form();
    let events = render(&template, &snapshot, &RenderConfig::default());
    let (_, label) = find_id(&events, "customer≡≡l").unwrap();
    assert_eq!(label.get("for"), Some("customer≡≡c"));

    let prefixes: Vec<&QName> = events
        .iter()
        .filter_map(|e| match e {
            MarkupEvent::StartElement { name, .. } if name.namespace == XHTML => Some(name),
            _ => None,
        })
        .collect();
    assert!(prefixes.iter().all(|name| name.prefix == "xh"));
}

// ─── Control kinds ────────────────────────────────────────────────────────────

fn items(pairs: &[(&str, &str)]) -> Vec<Item> {
    pairs
        .iter()
        .map(|(label, value)| Item {
            label: label.to_string(),
            value: value.to_string(),
        })
        .collect()
}

fn noscript() -> RenderConfig {
    RenderConfig {
        noscript: true,
        ..RenderConfig::default()
    }
}

#[test]
fn test_select1_dropdown() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:select1 xmlns:xf="http://www.w3.org/2002/xforms" id="s" ref="s"><xf:label>Size</xf:label></xf:select1></div>"#;
    let mut size = LiveControl::new("select1").with_value("m");
    size.items = items(&[("S", "s"), ("M", "m")]);
    let snapshot = ControlSnapshot::new().with("s", size);

    let xhtml = render_to_string(template, &snapshot, &RenderConfig::default()).unwrap();
    assert_eq!(
        xhtml,
        concat!(
            r#"<div xmlns="http://www.w3.org/1999/xhtml">"#,
            r#"<label id="s≡≡l" class="xforms-label" for="s≡≡c">Size</label>"#,
            r#"<span id="s" class="xforms-control xforms-select1 xforms-incremental">"#,
            r#"<select id="s≡≡c" name="s">"#,
            r#"<option value="s">S</option>"#,
            r#"<option value="m" selected="selected">M</option>"#,
            r#"</select></span></div>"#
        )
    );
}

#[test]
fn test_select_full_checkboxes() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:select xmlns:xf="http://www.w3.org/2002/xforms" id="s" ref="s" appearance="full"/></div>"#;
    let mut colours = LiveControl::new("select").with_value("a c");
    colours.items = items(&[("A", "a"), ("B", "b"), ("C", "c")]);
    let snapshot = ControlSnapshot::new().with("s", colours);

    let xhtml = render_to_string(template, &snapshot, &RenderConfig::default()).unwrap();
    assert_eq!(
        xhtml,
        concat!(
            r#"<div xmlns="http://www.w3.org/1999/xhtml">"#,
            r#"<span id="s" class="xforms-control xforms-select xforms-incremental xforms-select-appearance-full">"#,
            r#"<span class="xforms-selected"><input id="s≡≡e0" type="checkbox" name="s" value="a" checked="checked"/><label for="s≡≡e0">A</label></span>"#,
            r#"<span class="xforms-deselected"><input id="s≡≡e1" type="checkbox" name="s" value="b"/><label for="s≡≡e1">B</label></span>"#,
            r#"<span class="xforms-selected"><input id="s≡≡e2" type="checkbox" name="s" value="c" checked="checked"/><label for="s≡≡e2">C</label></span>"#,
            r#"</span></div>"#
        )
    );
}

#[test]
fn test_select_static_readonly() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:select xmlns:xf="http://www.w3.org/2002/xforms" id="s" ref="s"><xf:label>Colours</xf:label></xf:select></div>"#;
    let mut colours = LiveControl::new("select").with_value("a c");
    colours.items = items(&[("A", "a"), ("B", "b"), ("C", "c")]);
    colours.readonly = true;
    let snapshot = ControlSnapshot::new().with("s", colours);
    let config = RenderConfig {
        static_readonly: true,
        ..RenderConfig::default()
    };

    let xhtml = render_to_string(template, &snapshot, &config).unwrap();
    assert_eq!(
        xhtml,
        concat!(
            r#"<div xmlns="http://www.w3.org/1999/xhtml">"#,
            r#"<span id="s≡≡l" class="xforms-label">Colours</span>"#,
            r#"<span id="s" class="xforms-control xforms-select xforms-incremental xforms-static xforms-readonly">"#,
            r#"<span class="xforms-field">A, C</span>"#,
            r#"</span></div>"#
        )
    );
}

#[test]
fn test_internal_select_renders_nothing() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:select1 xmlns:xf="http://www.w3.org/2002/xforms" id="s" ref="s" appearance="xxf:internal"><xf:label>Hidden</xf:label></xf:select1><p>after</p></div>"#;
    let mut hidden = LiveControl::new("select1").with_value("a");
    hidden.items = items(&[("A", "a")]);
    let snapshot = ControlSnapshot::new().with("s", hidden);

    let xhtml = render_to_string(template, &snapshot, &RenderConfig::default()).unwrap();
    assert_eq!(xhtml, r#"<div xmlns="http://www.w3.org/1999/xhtml"><p>after</p></div>"#);
}

#[test]
fn test_text_inputs() {
    let template = concat!(
        r#"<div xmlns="http://www.w3.org/1999/xhtml">"#,
        r#"<xf:textarea xmlns:xf="http://www.w3.org/2002/xforms" id="notes" ref="n"/>"#,
        r#"<xf:secret xmlns:xf="http://www.w3.org/2002/xforms" id="pin" ref="p"/>"#,
        r#"<xf:upload xmlns:xf="http://www.w3.org/2002/xforms" id="file" ref="f"/>"#,
        r#"</div>"#
    );
    let mut pin = LiveControl::new("secret").with_value("1234");
    pin.readonly = true;
    let snapshot = ControlSnapshot::new()
        .with("notes", LiveControl::new("textarea").with_value("hello"))
        .with("pin", pin)
        .with("file", LiveControl::new("upload").with_value("report.txt"));

    let xhtml = render_to_string(template, &snapshot, &RenderConfig::default()).unwrap();
    assert_eq!(
        xhtml,
        concat!(
            r#"<div xmlns="http://www.w3.org/1999/xhtml">"#,
            r#"<span id="notes" class="xforms-control xforms-textarea"><textarea id="notes≡≡c" name="notes">hello</textarea></span>"#,
            r#"<span id="pin" class="xforms-control xforms-secret xforms-readonly"><input id="pin≡≡c" name="pin" disabled="disabled" type="password" value="1234" class="xforms-input-input"/></span>"#,
            r#"<span id="file" class="xforms-control xforms-upload"><input id="file≡≡c" name="file" type="file" class="xforms-input-input"/></span>"#,
            r#"</div>"#
        )
    );
}

#[test]
fn test_range() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:range xmlns:xf="http://www.w3.org/2002/xforms" id="r" ref="r"/></div>"#;
    let snapshot = ControlSnapshot::new().with("r", LiveControl::new("range").with_value("5"));
    let xhtml = render_to_string(template, &snapshot, &RenderConfig::default()).unwrap();
    assert_eq!(
        xhtml,
        concat!(
            r#"<div xmlns="http://www.w3.org/1999/xhtml">"#,
            r#"<span id="r" class="xforms-control xforms-range">"#,
            r#"<div class="xforms-range-track"><div class="xforms-range-slider"/></div>"#,
            r#"</span></div>"#
        )
    );
}

#[test]
fn test_image_and_download_outputs() {
    let template = concat!(
        r#"<div xmlns="http://www.w3.org/1999/xhtml">"#,
        r#"<xf:output xmlns:xf="http://www.w3.org/2002/xforms" id="logo" ref="l" mediatype="image/png"/>"#,
        r#"<xf:output xmlns:xf="http://www.w3.org/2002/xforms" id="doc" ref="d" appearance="xxf:download"><xf:label>Get the file</xf:label></xf:output>"#,
        r#"</div>"#
    );
    let snapshot = ControlSnapshot::new()
        .with("logo", LiveControl::new("output").with_value("/img/logo.png"))
        .with("doc", LiveControl::new("output").with_value("/files/a.pdf"));

    let xhtml = render_to_string(template, &snapshot, &RenderConfig::default()).unwrap();
    assert_eq!(
        xhtml,
        concat!(
            r#"<div xmlns="http://www.w3.org/1999/xhtml">"#,
            r#"<span id="logo" class="xforms-control xforms-output xforms-mediatype-image-png xforms-mediatype-image">"#,
            r#"<img id="logo≡≡c" src="/img/logo.png" alt=""/></span>"#,
            r#"<span id="doc" class="xforms-control xforms-output xforms-output-appearance-xxforms-download">"#,
            r#"<a id="doc≡≡c" href="/files/a.pdf">Get the file</a></span>"#,
            r#"</div>"#
        )
    );
}

#[test]
fn test_html_output_is_copied_as_markup() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:output xmlns:xf="http://www.w3.org/2002/xforms" id="h" ref="h" mediatype="text/html"/></div>"#;
    let snapshot = ControlSnapshot::new().with("h", LiveControl::new("output").with_value("<b>bold</b> text"));

    let xhtml = render_to_string(template, &snapshot, &RenderConfig::default()).unwrap();
    assert_eq!(
        xhtml,
        concat!(
            r#"<div xmlns="http://www.w3.org/1999/xhtml">"#,
            r#"<div id="h" class="xforms-control xforms-output xforms-mediatype-text-html xforms-mediatype-text">"#,
            r#"<div id="h≡≡c" class="xforms-output-output"><b>bold</b> text</div>"#,
            r#"</div></div>"#
        )
    );

    let events = render(template, &snapshot, &RenderConfig::default());
    let (_, bold) = starts(&events).into_iter().find(|(name, _)| *name == "b").unwrap();
    assert!(bold.is_empty());
    assert!(events
        .iter()
        .any(|e| matches!(e, MarkupEvent::StartElement { name, .. } if name.name == "b" && name.namespace == XHTML)));
}

#[test]
fn test_malformed_html_output_falls_back_to_text() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:output xmlns:xf="http://www.w3.org/2002/xforms" id="h" ref="h" mediatype="text/html"/></div>"#;
    let snapshot = ControlSnapshot::new().with("h", LiveControl::new("output").with_value("a < b"));
    let xhtml = render_to_string(template, &snapshot, &RenderConfig::default()).unwrap();
    assert!(xhtml.contains(r#"<div id="h≡≡c" class="xforms-output-output">a &lt; b</div>"#));
}

#[test]
fn test_text_output_is_bare_value() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><title><xf:output xmlns:xf="http://www.w3.org/2002/xforms" id="t" ref="t" appearance="xxf:text"><xf:label>Ignored</xf:label></xf:output></title></div>"#;
    let snapshot = ControlSnapshot::new().with("t", LiveControl::new("output").with_value("Order 42"));
    let xhtml = render_to_string(template, &snapshot, &RenderConfig::default()).unwrap();
    assert_eq!(xhtml, r#"<div xmlns="http://www.w3.org/1999/xhtml"><title>Order 42</title></div>"#);
}

#[test]
fn test_fieldset_group() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:group xmlns:xf="http://www.w3.org/2002/xforms" id="g" appearance="xxf:fieldset"><xf:label>Address</xf:label><p>x</p></xf:group></div>"#;
    let snapshot = ControlSnapshot::new().with("g", LiveControl::new("group").with_label("Postal address"));
    let xhtml = render_to_string(template, &snapshot, &RenderConfig::default()).unwrap();
    assert_eq!(
        xhtml,
        concat!(
            r#"<div xmlns="http://www.w3.org/1999/xhtml">"#,
            r#"<fieldset id="g" class="xforms-group xforms-group-appearance-xxforms-fieldset">"#,
            r#"<legend id="g≡≡l">Postal address</legend><p>x</p>"#,
            r#"</fieldset></div>"#
        )
    );
}

#[test]
fn test_internal_group_has_no_markup() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:group xmlns:xf="http://www.w3.org/2002/xforms" id="g" appearance="xxf:internal"><xf:label>L</xf:label><p>x</p></xf:group></div>"#;
    let snapshot = ControlSnapshot::new().with("g", LiveControl::new("group"));
    let xhtml = render_to_string(template, &snapshot, &RenderConfig::default()).unwrap();
    assert_eq!(xhtml, r#"<div xmlns="http://www.w3.org/1999/xhtml"><p>x</p></div>"#);
}

#[test]
fn test_minimal_trigger_is_a_link_only_with_script() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:trigger xmlns:xf="http://www.w3.org/2002/xforms" id="t" appearance="minimal"><xf:label>Go</xf:label><xf:hint>Start</xf:hint></xf:trigger></div>"#;
    let snapshot = ControlSnapshot::new().with("t", LiveControl::new("trigger"));

    let xhtml = render_to_string(template, &snapshot, &RenderConfig::default()).unwrap();
    assert_eq!(
        xhtml,
        concat!(
            r#"<div xmlns="http://www.w3.org/1999/xhtml">"#,
            r##"<a id="t" class="xforms-control xforms-trigger xforms-trigger-appearance-minimal" title="Start" href="#">Go</a>"##,
            r#"</div>"#
        )
    );

    let xhtml = render_to_string(template, &snapshot, &noscript()).unwrap();
    assert_eq!(
        xhtml,
        concat!(
            r#"<div xmlns="http://www.w3.org/1999/xhtml">"#,
            r#"<button id="t" class="xforms-control xforms-trigger xforms-trigger-appearance-xxforms-minimal" title="Start" type="button">Go</button>"#,
            r#"</div>"#
        )
    );
}

#[test]
fn test_legacy_link_trigger() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:trigger xmlns:xf="http://www.w3.org/2002/xforms" id="t" appearance="xxf:link"><xf:label>Go</xf:label></xf:trigger></div>"#;
    let snapshot = ControlSnapshot::new().with("t", LiveControl::new("trigger"));

    let events = render(template, &snapshot, &RenderConfig::default());
    let (name, link) = find_id(&events, "t").unwrap();
    assert_eq!(name, "a");
    assert_eq!(link.get("href"), Some("#"));
    assert!(has_class(link, "xforms-trigger-appearance-xxforms-link"));

    let events = render(template, &snapshot, &noscript());
    let (name, button) = find_id(&events, "t").unwrap();
    assert_eq!(name, "button");
    assert!(has_class(button, "xforms-trigger-appearance-xxforms-minimal"));
}

#[test]
fn test_modal_submit() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:submit xmlns:xf="http://www.w3.org/2002/xforms" xmlns:xxf="http://orbeon.org/oxf/xml/xforms" id="s" xxf:modal="true"><xf:label>Send</xf:label></xf:submit></div>"#;
    let snapshot = ControlSnapshot::new().with("s", LiveControl::new("submit"));
    let events = render(template, &snapshot, &RenderConfig::default());

    let (name, button) = find_id(&events, "s").unwrap();
    assert_eq!(name, "button");
    assert_eq!(button.get("type"), Some("submit"));
    assert!(has_class(button, "xforms-trigger-appearance-modal"));
}

#[test]
fn test_help_anchor_without_script() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:input xmlns:xf="http://www.w3.org/2002/xforms" id="name" ref="n"><xf:label>Name</xf:label><xf:help>Your full name</xf:help></xf:input></div>"#;
    let snapshot = ControlSnapshot::new().with("name", LiveControl::new("input"));

    let events = render(template, &snapshot, &noscript());
    let (_, anchor) = starts(&events).into_iter().find(|(name, _)| *name == "a").unwrap();
    assert_eq!(anchor.get("href"), Some("#name≡≡p"));
    assert_eq!(anchor.get("class"), Some("xforms-help-anchor"));
    assert_eq!(count_class(&events, "xforms-help-image"), 1);
    assert!(find_id(&events, "name≡≡p").is_none());

    let events = render(template, &snapshot, &RenderConfig::default());
    assert!(starts(&events).iter().all(|(name, _)| *name != "a"));
    let (name, help) = find_id(&events, "name≡≡p").unwrap();
    assert_eq!(name, "span");
    assert_eq!(help.get("class"), Some("xforms-help"));
    assert_eq!(count_class(&events, "xforms-help-image"), 1);
}

#[test]
fn test_bound_control_missing_from_tree_is_disabled() {
    let template = concat!(
        r#"<div xmlns="http://www.w3.org/1999/xhtml">"#,
        r#"<xf:input xmlns:xf="http://www.w3.org/2002/xforms" id="name" ref="n"><xf:label>Name</xf:label></xf:input>"#,
        r#"<xf:group xmlns:xf="http://www.w3.org/2002/xforms" id="g"><p>x</p></xf:group>"#,
        r#"</div>"#
    );
    let events = render(template, &ControlSnapshot::new(), &RenderConfig::default());

    let (_, input) = find_id(&events, "name").unwrap();
    assert!(has_class(input, "xforms-disabled"));
    let (_, label) = find_id(&events, "name≡≡l").unwrap();
    assert!(has_class(label, "xforms-disabled"));

    let (_, group) = find_id(&events, "g").unwrap();
    assert!(!has_class(group, "xforms-disabled"));
}

#[test]
fn test_selected_case_inside_deselected_case_is_hidden() {
    let template = concat!(
        r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:switch xmlns:xf="http://www.w3.org/2002/xforms" id="outer">"#,
        r#"<xf:case id="a"><xf:switch id="inner"><xf:case id="b"><p id="deep">inner</p></xf:case></xf:switch></xf:case>"#,
        r#"<xf:case id="z"><p id="other">other</p></xf:case>"#,
        r#"</xf:switch></div>"#
    );
    let snapshot = |a_selected: bool| {
        ControlSnapshot::new()
            .with("outer", LiveControl::new("switch"))
            .with("a", LiveControl::new("case").with_parent("outer").with_selected(a_selected))
            .with("z", LiveControl::new("case").with_parent("outer").with_selected(!a_selected))
            .with("inner", LiveControl::new("switch").with_parent("a"))
            .with("b", LiveControl::new("case").with_parent("inner").with_selected(true))
    };

    let events = render(template, &snapshot(false), &RenderConfig::default());
    let (_, deep) = find_id(&events, "deep").unwrap();
    assert_eq!(deep.get("class"), Some("xforms-case-deselected"));
    assert_eq!(deep.get("style"), Some("display:none"));
    let (_, other) = find_id(&events, "other").unwrap();
    assert_eq!(other.get("style"), Some("display:block"));

    let events = render(template, &snapshot(true), &RenderConfig::default());
    let (_, deep) = find_id(&events, "deep").unwrap();
    assert_eq!(deep.get("class"), Some("xforms-case-selected"));
    assert_eq!(deep.get("style"), Some("display:block"));

    let events = render(template, &snapshot(false), &noscript());
    assert!(find_id(&events, "deep").is_none());
    assert!(find_id(&events, "other").is_some());
}

#[test]
fn test_actions_do_not_abort_rendering() {
    let template = r#"<div xmlns="http://www.w3.org/1999/xhtml" xmlns:ev="http://www.w3.org/2001/xml-events"><xf:group xmlns:xf="http://www.w3.org/2002/xforms" id="g"><xf:setvalue ev:event="DOMActivate" ref="a" value="1"/><xf:insert ev:event="DOMActivate" ref="b"/><p>x</p></xf:group></div>"#;
    let snapshot = ControlSnapshot::new().with("g", LiveControl::new("group"));
    let events = render(template, &snapshot, &RenderConfig::default());
    let names: Vec<&str> = starts(&events).into_iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["div", "span", "p"]);

    let unknown = r#"<div xmlns="http://www.w3.org/1999/xhtml"><xf:dialog xmlns:xf="http://www.w3.org/2002/xforms" id="d"/></div>"#;
    let err = render_to_string(unknown, &ControlSnapshot::new(), &RenderConfig::default()).unwrap_err();
    assert!(matches!(err, RenderError::NoHandler { element, .. } if element == "xf:dialog"));
}
