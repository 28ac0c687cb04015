//! Markup output, the structural JSON form, and parsing, exercised together.

#![allow(clippy::unwrap_used)]

use elemtree::parser::{parse_str, parse_str_with_options, ParseOptions};
use elemtree::serial::structural::{from_structural, to_structural};
use elemtree::serial::{serialize_with_options, SerializeOptions};
use elemtree::{AttrValue, Child, StructuralChild, StructuralElement, Tree};
use pretty_assertions::assert_eq;
use serde_json::json;

// ---------------------------------------------------------------------------
// Markup
// ---------------------------------------------------------------------------

#[test]
fn test_escaping() {
    let mut tree = Tree::new();
    let e = tree.element_with("e", [("a1", "\"well\"")]);
    assert_eq!(tree.to_xml(e), r#"<e a1="&quot;well&quot;"/>"#);

    let e = tree.element("e");
    tree.t(e, "1 < 2");
    assert_eq!(tree.to_xml(e), "<e>1 &lt; 2</e>");
}

#[test]
fn test_null_and_undefined_attributes_omitted() {
    let mut tree = Tree::new();
    let e = tree.element_with("e", [("foo", AttrValue::Null)]);
    assert_eq!(tree.to_xml(e), "<e/>");
    let e = tree.element_with("e", [("foo", AttrValue::Undefined)]);
    assert_eq!(tree.to_xml(e), "<e/>");
    let e = tree.element_with("e", [("foo", None::<&str>)]);
    assert_eq!(tree.to_xml(e), "<e/>");
}

#[test]
fn test_zero_values_are_rendered() {
    let mut tree = Tree::new();
    let e = tree.element_with("e", [("foo", 23), ("bar", 0)]);
    tree.build(e).c("n").t(0);
    assert_eq!(tree.to_xml(e), r#"<e foo="23" bar="0"><n>0</n></e>"#);
}

#[test]
fn test_null_child_forces_long_form() {
    let mut tree = Tree::new();
    let e = tree.element("e");
    tree.children_mut(e).push(Child::Null);
    assert_eq!(tree.to_xml(e), "<e></e>");

    tree.t(e, "x");
    tree.children_mut(e).push(Child::Null);
    assert_eq!(tree.to_xml(e), "<e>x</e>");
}

#[test]
fn test_display_formatting() {
    let mut tree = Tree::new();
    let e = tree.element_with("presence", [("type", "unavailable")]);
    assert_eq!(
        format!("sending {}", tree.display(e)),
        r#"sending <presence type="unavailable"/>"#
    );
}

#[test]
fn test_pretty_output() {
    let mut tree = Tree::new();
    let root = tree.element("stream");
    tree.build(root).c("features").c("mechanism").t("PLAIN");
    let options = SerializeOptions::default().indent(true).declaration(true);
    assert_eq!(
        serialize_with_options(&tree, root, &options),
        "<?xml version=\"1.0\"?>\n<stream>\n  <features>\n    <mechanism>PLAIN</mechanism>\n  </features>\n</stream>"
    );
}

// ---------------------------------------------------------------------------
// Structural form
// ---------------------------------------------------------------------------

#[test]
fn test_to_json_shape() {
    let mut tree = Tree::new();
    let e = tree.element_with(
        "e",
        [
            ("foo", AttrValue::from(23)),
            ("bar", AttrValue::from(0)),
            ("nil", AttrValue::Null),
        ],
    );
    tree.build(e).c("f").t(1000).up();

    assert_eq!(
        tree.to_json(e),
        json!({
            "name": "e",
            "attrs": {"foo": 23, "bar": 0, "nil": null},
            "children": [{"name": "f", "attrs": {}, "children": [1000]}]
        })
    );
}

#[test]
fn test_structural_round_trip_reproduces_markup() {
    let mut tree = Tree::new();
    let root = tree.element_with("iq", [("type", AttrValue::from("result")), ("id", AttrValue::from(7))]);
    tree.build(root)
        .c_with("query", "jabber:iq:version")
        .c("name").t("elemtree").up()
        .c("version").t("0.1 <beta> & \"rc\"").up()
        .t(3)
        .c_with("os", [("skip", AttrValue::Null)]);

    let structural = to_structural(&tree, root);
    let mut rebuilt = Tree::new();
    let copy = from_structural(&mut rebuilt, &structural).unwrap();
    assert_eq!(rebuilt.to_xml(copy), tree.to_xml(root));

    let through_text = serde_json::to_string(&structural).unwrap();
    let decoded: StructuralElement = serde_json::from_str(&through_text).unwrap();
    assert_eq!(decoded, structural);
}

#[test]
fn test_structural_value_is_plain_data() {
    let structural = StructuralElement {
        name: "e".to_string(),
        attrs: [("a", "1")].into_iter().collect(),
        children: vec![
            StructuralChild::Text("x".into()),
            StructuralChild::Element(StructuralElement {
                name: "f".to_string(),
                attrs: Default::default(),
                children: Vec::new(),
            }),
            StructuralChild::Null,
        ],
    };
    let mut tree = Tree::new();
    let e = from_structural(&mut tree, &structural).unwrap();
    assert_eq!(tree.to_xml(e), r#"<e a="1">x<f/></e>"#);
    assert_eq!(to_structural(&tree, e), structural);
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[test]
fn test_parse_serialize_round_trip() {
    let input = r#"<message to="romeo@example.net" type="chat"><body>Wherefore art thou, Romeo? &lt;3</body><thread>e0ffe42b</thread></message>"#;
    let (tree, root) = parse_str(input).unwrap();
    assert_eq!(tree.to_xml(root), input);
    assert_eq!(
        tree.get_child_text(root, "body", None).as_deref(),
        Some("Wherefore art thou, Romeo? <3")
    );
}

#[test]
fn test_parse_attribute_quotes_normalized() {
    let (tree, root) = parse_str("<e a='say \"hi\"' b=\"it's\"/>").unwrap();
    assert_eq!(
        tree.to_xml(root),
        r#"<e a="say &quot;hi&quot;" b="it&apos;s"/>"#
    );
}

#[test]
fn test_parse_into_existing_tree() {
    let mut tree = Tree::new();
    let stream = tree.element("stream");
    let stanza = tree.parse_str("<presence><show>away</show></presence>").unwrap();
    tree.append(stream, stanza);

    assert_eq!(tree.up(stanza), Some(stream));
    assert_eq!(
        tree.to_xml(stream),
        "<stream><presence><show>away</show></presence></stream>"
    );
}

#[test]
fn test_parse_depth_limit() {
    let open: String = (0..300).map(|_| "<a>").collect();
    let close: String = (0..300).map(|_| "</a>").collect();
    let err = parse_str(&format!("{open}{close}")).unwrap_err();
    assert!(err.message.contains("depth"), "{err}");

    let opts = ParseOptions::default().max_depth(3);
    assert!(parse_str_with_options("<a><a><a/></a></a>", &opts).is_ok());
    assert!(parse_str_with_options("<a><a><a><a/></a></a></a>", &opts).is_err());
}

#[test]
fn test_parse_error_reports_location() {
    let err = parse_str("<a>\n<b attr=nope/></a>").unwrap_err();
    assert_eq!(err.location.line, 2);
    assert!(err.to_string().starts_with("parse error at 2:"));
}

#[test]
fn test_parsed_tree_to_json() {
    let (tree, root) = parse_str("<e n='1'>text<f/></e>").unwrap();
    // Parsed attribute values and text are always strings.
    assert_eq!(
        tree.to_json(root),
        json!({
            "name": "e",
            "attrs": {"n": "1"},
            "children": ["text", {"name": "f", "attrs": {}, "children": []}]
        })
    );
}
