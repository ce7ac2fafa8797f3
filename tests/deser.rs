//! AST JSON (de)serialization shape: the derived `#[serde(tag = "type")]`
//! convention, exercised round-trip through `serde_json`.

use pcrelab_core::core::ast::{
    Flags, GroupKind, Node, NamedGroupStyle, QuantifierStyle, Span,
};
use pretty_assertions::assert_eq;

#[test]
fn literal_round_trips_through_json() {
    let node = Node::Literal(pcrelab_core::core::ast::Literal {
        span: Span::new(0, 1),
        value: "a".to_string(),
        quoted: false,
    });
    let json = serde_json::to_string(&node).unwrap();
    assert!(json.contains("\"type\":\"Literal\""));
    let back: Node = serde_json::from_str(&json).unwrap();
    assert_eq!(back, node);
}

#[test]
fn group_tag_and_kind_are_present() {
    use pcrelab_core::core::ast::{Group, Sequence};
    let node = Node::Group(Group {
        span: Span::new(0, 3),
        kind: GroupKind::Named,
        child: Box::new(Node::Sequence(Sequence {
            span: Span::new(0, 0),
            children: vec![],
        })),
        name: Some("year".to_string()),
        capture_index: Some(1),
        flags: None,
        name_style: Some(NamedGroupStyle::Angle),
    });
    let json = serde_json::to_value(&node).unwrap();
    assert_eq!(json["type"], "Group");
    assert_eq!(json["kind"], "Named");
    assert_eq!(json["name"], "year");
}

#[test]
fn quantifier_style_deserializes_from_its_tag() {
    let json = r#""Lazy""#;
    let style: QuantifierStyle = serde_json::from_str(json).unwrap();
    assert_eq!(style, QuantifierStyle::Lazy);
}

#[test]
fn flags_json_round_trips() {
    let flags = Flags::from_letters("imsu").unwrap();
    let json = serde_json::to_string(&flags).unwrap();
    let back: Flags = serde_json::from_str(&json).unwrap();
    assert_eq!(back, flags);
}

#[test]
fn unknown_node_type_tag_fails_to_deserialize() {
    let json = r#"{"type":"NotARealNode"}"#;
    let result: Result<Node, _> = serde_json::from_str(json);
    assert!(result.is_err());
}
