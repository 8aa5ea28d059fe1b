use crate::*;
use serde_json::json;

#[test]
fn detects_each_dialect_from_its_header() {
    let cases = [
        ("graph LR\nA-->B", DiagramKind::Flowchart),
        ("flowchart TD\nA-->B", DiagramKind::Flowchart),
        ("sequenceDiagram\nA->>B: hi", DiagramKind::Sequence),
        ("classDiagram\nclass A", DiagramKind::Class),
        ("classDiagram-v2\nclass A", DiagramKind::Class),
        ("state\nA --> B", DiagramKind::State),
        ("stateDiagram-v2\nA --> B", DiagramKind::State),
        ("pie title Pets\n\"Dogs\" : 386", DiagramKind::Generic),
    ];
    for (source, kind) in cases {
        assert_eq!(detect_type(source).unwrap(), kind, "{source}");
    }
}

#[test]
fn unknown_header_falls_back_to_generic() {
    let source = "gantt\n  title A Gantt Diagram\n  section A\n  Task :a1, 2014-01-01, 30d";
    let diagram = parse(source).unwrap();
    assert_eq!(diagram.kind(), DiagramKind::Generic);
    assert_eq!(diagram.dialect(), "gantt");
    assert_eq!(diagram.source(), source);
    assert_eq!(diagram.position(), Position::new(1, 1));
}

#[test]
fn header_skips_front_matter_comments_and_blank_lines() {
    let source = "---\ntitle: Demo\n---\n\n%% leading comment\n%%{init: {\"theme\": \"dark\"}}%%\n  graph TD\nA-->B";
    let diagram = parse(source).unwrap();
    assert_eq!(diagram.dialect(), "graph");
    assert_eq!(diagram.position(), Position::new(7, 3));
}

#[test]
fn empty_sources_are_rejected() {
    assert_eq!(parse("").unwrap_err(), ParseError::EmptySource);
    assert_eq!(parse("\n   \n%% only a comment\n").unwrap_err(), ParseError::EmptySource);

    let err = parse("---\ntitle: never closed\n").unwrap_err();
    assert_eq!(err.position(), Position::new(1, 1));
    assert!(err.to_string().contains("front matter"));
}

#[test]
fn dialect_tags() {
    let tag = |source: &str| parse(source).unwrap().dialect().to_string();
    assert_eq!(tag("graph LR"), "graph");
    assert_eq!(tag("flowchart LR"), "flowchart");
    assert_eq!(tag("sequenceDiagram"), "sequence");
    assert_eq!(tag("classDiagram"), "class");
    assert_eq!(tag("state"), "state");
    assert_eq!(tag("stateDiagram"), "state");
    assert_eq!(tag("stateDiagram-v2"), "stateDiagram-v2");
}

#[test]
fn custom_registry_routes_extra_keywords() {
    let mut registry = DetectorRegistry::new();
    registry.add_fn(DiagramKind::Flowchart, |kw| kw == "flow");
    assert_eq!(registry.detect_keyword("flow"), DiagramKind::Flowchart);
    assert_eq!(registry.detect_keyword("graph"), DiagramKind::Generic);

    let diagram = registry.parse("flow LR\nA-->B").unwrap();
    assert_eq!(diagram.kind(), DiagramKind::Flowchart);
}

#[test]
fn diagrams_serialize_with_statement_tags() {
    let diagram = parse("graph LR\nA-->B").unwrap();
    let value = serde_json::to_value(&diagram).unwrap();
    assert_eq!(value["flowchart"]["keyword"], json!("graph"));
    assert_eq!(value["flowchart"]["direction"]["text"], json!("LR"));
    assert_eq!(value["flowchart"]["statements"][0]["type"], json!("link"));
    assert_eq!(
        value["flowchart"]["statements"][0]["pos"],
        json!({"line": 2, "column": 1})
    );
}

#[test]
fn public_types_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Diagram>();
    assert_send_sync::<ParseError>();
    assert_send_sync::<Diagnostic>();
    assert_send_sync::<DetectorRegistry>();
}
