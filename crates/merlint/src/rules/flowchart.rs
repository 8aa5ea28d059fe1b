use super::{Catalog, Rule};
use merlint_core::diagrams::flowchart::{DIRECTIONS, DirectionToken, FlowStmt, Flowchart, walk_nodes};
use merlint_core::{Diagnostic, Position};
use rustc_hash::{FxHashMap, FxHashSet};

pub const VALID_DIRECTION: Rule<Flowchart> = Rule::new("valid-direction", valid_direction);
pub const NO_UNDEFINED_NODES: Rule<Flowchart> = Rule::new("no-undefined-nodes", no_undefined_nodes);
pub const NO_PARENTHESES_IN_LABELS: Rule<Flowchart> =
    Rule::new("no-parentheses-in-labels", no_parentheses_in_labels);
pub const NO_DUPLICATE_NODE_IDS: Rule<Flowchart> =
    Rule::new("no-duplicate-node-ids", no_duplicate_node_ids);

pub fn default_rules() -> Vec<Rule<Flowchart>> {
    vec![VALID_DIRECTION, NO_UNDEFINED_NODES, NO_DUPLICATE_NODE_IDS]
}

/// The default rules plus `no-parentheses-in-labels`.
pub fn strict_rules() -> Vec<Rule<Flowchart>> {
    vec![
        VALID_DIRECTION,
        NO_UNDEFINED_NODES,
        NO_PARENTHESES_IN_LABELS,
        NO_DUPLICATE_NODE_IDS,
    ]
}

pub fn rules(catalog: Catalog) -> Vec<Rule<Flowchart>> {
    match catalog {
        Catalog::Default => default_rules(),
        Catalog::Strict => strict_rules(),
    }
}

fn check_direction(token: &DirectionToken, out: &mut Vec<Diagnostic>) {
    if !token.is_valid() {
        out.push(Diagnostic::error(
            token.pos,
            format!(
                "invalid direction {:?} (expected one of {})",
                token.text,
                DIRECTIONS.join(", ")
            ),
        ));
    }
}

fn walk_directions(statements: &[FlowStmt], out: &mut Vec<Diagnostic>) {
    for stmt in statements {
        match stmt {
            FlowStmt::Direction(token) => check_direction(token, out),
            FlowStmt::Subgraph(sub) => walk_directions(&sub.statements, out),
            _ => {}
        }
    }
}

/// Checks the header direction and every `direction` statement inside subgraphs. A header
/// without a direction is accepted.
fn valid_direction(chart: &Flowchart) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    if let Some(token) = &chart.direction {
        check_direction(token, &mut out);
    }
    walk_directions(&chart.statements, &mut out);
    out
}

fn collect_link_endpoints<'a>(statements: &'a [FlowStmt], ids: &mut FxHashSet<&'a str>) {
    for stmt in statements {
        match stmt {
            FlowStmt::Node(node) => {
                ids.insert(node.id.as_str());
            }
            FlowStmt::Link(link) => {
                ids.insert(link.from.as_str());
                ids.insert(link.to.as_str());
            }
            FlowStmt::Subgraph(sub) => collect_link_endpoints(&sub.statements, ids),
            _ => {}
        }
    }
}

/// Link endpoints implicitly define their nodes, so every reference resolves and this rule
/// never reports anything.
fn no_undefined_nodes(chart: &Flowchart) -> Vec<Diagnostic> {
    let mut known = FxHashSet::default();
    collect_link_endpoints(&chart.statements, &mut known);
    tracing::trace!(nodes = known.len(), "collected flowchart node ids");
    Vec::new()
}

fn no_parentheses_in_labels(chart: &Flowchart) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    walk_nodes(&chart.statements, &mut |node| {
        if node.label.contains(['(', ')']) {
            out.push(Diagnostic::error(
                node.pos,
                format!(
                    "label {:?} of node {:?} contains parentheses",
                    node.label, node.id
                ),
            ));
        }
    });
    out
}

/// Node ids share one namespace across the whole diagram, subgraphs included.
fn no_duplicate_node_ids(chart: &Flowchart) -> Vec<Diagnostic> {
    let mut first: FxHashMap<&str, Position> = FxHashMap::default();
    let mut out = Vec::new();
    walk_nodes(&chart.statements, &mut |node| {
        match first.get(node.id.as_str()) {
            Some(pos) => out.push(Diagnostic::error(
                node.pos,
                format!(
                    "duplicate node ID {:?} (first defined at line {})",
                    node.id, pos.line
                ),
            )),
            None => {
                first.insert(node.id.as_str(), node.pos);
            }
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use merlint_core::diagrams::flowchart::{NodeDef, NodeShape, Subgraph};
    use merlint_core::{Diagram, Severity, parse};

    fn chart(source: &str) -> Flowchart {
        match parse(source).unwrap() {
            Diagram::Flowchart(chart) => chart,
            other => panic!("expected a flowchart, got {:?}", other.kind()),
        }
    }

    fn node(id: &str, label: &str, line: usize) -> FlowStmt {
        FlowStmt::Node(NodeDef {
            id: id.to_string(),
            label: label.to_string(),
            shape: NodeShape::Rectangle,
            pos: Position::new(line, 1),
        })
    }

    fn with_statements(statements: Vec<FlowStmt>) -> Flowchart {
        Flowchart {
            keyword: "flowchart".to_string(),
            direction: None,
            source: String::new(),
            pos: Position::start(),
            statements,
        }
    }

    #[test]
    fn direction_tokens() {
        for dir in DIRECTIONS {
            let found = valid_direction(&chart(&format!("graph {dir}\nA-->B")));
            assert!(found.is_empty(), "{dir}: {found:?}");
        }

        let found = valid_direction(&chart("graph XY\nA-->B"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity(), Severity::Error);
        assert_eq!(found[0].position(), Position::new(1, 7));
        assert_eq!(
            found[0].message(),
            r#"invalid direction "XY" (expected one of TB, TD, BT, RL, LR)"#
        );

        assert!(valid_direction(&chart("flowchart\nA-->B")).is_empty());

        let nested = chart("graph TD\nsubgraph s\n  direction UP\n  A\nend");
        let found = valid_direction(&nested);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line(), 3);
    }

    #[test]
    fn undefined_nodes_are_accepted() {
        assert!(no_undefined_nodes(&chart("graph TD\nA[Node A]\nB[Node B]\nA --> B")).is_empty());
        assert!(no_undefined_nodes(&chart("graph TD\nA[Node A]\nA --> C")).is_empty());
    }

    #[test]
    fn parentheses_in_labels() {
        let cases = [
            ("Simple Label", 0),
            ("Label (with note)", 1),
            ("Label (incomplete", 1),
            ("Label incomplete)", 1),
            ("", 0),
        ];
        for (label, expected) in cases {
            let found = no_parentheses_in_labels(&with_statements(vec![node("A", label, 2)]));
            assert_eq!(found.len(), expected, "{label:?}");
        }

        let nested = with_statements(vec![FlowStmt::Subgraph(Subgraph {
            id: "Test".to_string(),
            title: "Test Subgraph".to_string(),
            statements: vec![node("A", "Label (with paren)", 3)],
            pos: Position::new(2, 1),
        })]);
        let found = no_parentheses_in_labels(&nested);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line(), 3);

        let parsed = chart("graph TD\n  A[\"Call (sync)\"] --> B");
        assert_eq!(no_parentheses_in_labels(&parsed).len(), 1);
    }

    #[test]
    fn duplicate_node_ids() {
        let unique = with_statements(vec![node("A", "Node A", 2), node("B", "Node B", 3)]);
        assert!(no_duplicate_node_ids(&unique).is_empty());

        let twice = with_statements(vec![
            node("A", "First A", 2),
            node("B", "Node B", 3),
            node("A", "Second A", 4),
        ]);
        let found = no_duplicate_node_ids(&twice);
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].message(),
            r#"duplicate node ID "A" (first defined at line 2)"#
        );
        assert_eq!(found[0].line(), 4);

        let across_subgraph = chart("graph TD\nA[Outer A]\nsubgraph Test\n  A[Inner A]\nend\nA[Third]");
        assert_eq!(no_duplicate_node_ids(&across_subgraph).len(), 2);

        let declared_then_labeled = chart("graph LR\n  A\n  A[Label]\n  node-1 --> node-2");
        assert!(no_duplicate_node_ids(&declared_then_labeled).is_empty());
    }

    #[test]
    fn strict_adds_the_label_rule() {
        let names = |rules: Vec<Rule<Flowchart>>| rules.iter().map(|r| r.name).collect::<Vec<_>>();
        assert_eq!(
            names(default_rules()),
            ["valid-direction", "no-undefined-nodes", "no-duplicate-node-ids"]
        );
        assert_eq!(
            names(strict_rules()),
            [
                "valid-direction",
                "no-undefined-nodes",
                "no-parentheses-in-labels",
                "no-duplicate-node-ids"
            ]
        );
        assert_eq!(names(rules(Catalog::Strict)), names(strict_rules()));
    }
}
