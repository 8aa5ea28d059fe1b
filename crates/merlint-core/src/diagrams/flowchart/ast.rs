use crate::{HasPosition, Position};
use serde::Serialize;

/// Direction tokens accepted by `graph`/`flowchart` headers and `direction` statements.
pub const DIRECTIONS: [&str; 5] = ["TB", "TD", "BT", "RL", "LR"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flowchart {
    /// `graph` or `flowchart`, as written.
    pub keyword: String,
    pub direction: Option<DirectionToken>,
    pub source: String,
    pub pos: Position,
    pub statements: Vec<FlowStmt>,
}

/// A direction token kept verbatim; validity is checked by rules, not by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectionToken {
    pub text: String,
    pub pos: Position,
}

impl DirectionToken {
    pub fn is_valid(&self) -> bool {
        DIRECTIONS.contains(&self.text.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeShape {
    Rectangle,
    Rounded,
    Diamond,
    Subroutine,
    Stadium,
    Circle,
    Hexagon,
    Cylinder,
    Asymmetric,
}

impl NodeShape {
    /// Openers ordered so that two-character delimiters win over their one-character prefixes.
    pub(crate) const OPENERS: [(&'static str, NodeShape); 9] = [
        ("[[", NodeShape::Subroutine),
        ("[(", NodeShape::Cylinder),
        ("([", NodeShape::Stadium),
        ("((", NodeShape::Circle),
        ("{{", NodeShape::Hexagon),
        ("[", NodeShape::Rectangle),
        ("(", NodeShape::Rounded),
        ("{", NodeShape::Diamond),
        (">", NodeShape::Asymmetric),
    ];

    pub fn delimiters(self) -> (&'static str, &'static str) {
        match self {
            Self::Rectangle => ("[", "]"),
            Self::Rounded => ("(", ")"),
            Self::Diamond => ("{", "}"),
            Self::Subroutine => ("[[", "]]"),
            Self::Stadium => ("([", "])"),
            Self::Circle => ("((", "))"),
            Self::Hexagon => ("{{", "}}"),
            Self::Cylinder => ("[(", ")]"),
            Self::Asymmetric => (">", "]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDef {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
    pub pos: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stroke {
    Normal,
    Thick,
    Dotted,
    Invisible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrowHead {
    Point,
    Cross,
    Circle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub from: String,
    pub to: String,
    /// The connector glyph, e.g. `-->`, `<-->`, `-.->`, `==>`.
    pub arrow: String,
    pub stroke: Stroke,
    pub start: Option<ArrowHead>,
    pub end: Option<ArrowHead>,
    pub bidirectional: bool,
    pub label: Option<String>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subgraph {
    pub id: String,
    pub title: String,
    pub statements: Vec<FlowStmt>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FlowStmt {
    Node(NodeDef),
    Link(Link),
    Subgraph(Subgraph),
    Direction(DirectionToken),
    ClassDef { pos: Position },
    ClassAssign { pos: Position },
    Style { pos: Position },
    LinkStyle { pos: Position },
    Click { pos: Position },
    Comment { pos: Position },
    Unknown { text: String, pos: Position },
}

impl HasPosition for FlowStmt {
    fn position(&self) -> Position {
        match self {
            Self::Node(node) => node.pos,
            Self::Link(link) => link.pos,
            Self::Subgraph(sub) => sub.pos,
            Self::Direction(dir) => dir.pos,
            Self::ClassDef { pos }
            | Self::ClassAssign { pos }
            | Self::Style { pos }
            | Self::LinkStyle { pos }
            | Self::Click { pos }
            | Self::Comment { pos }
            | Self::Unknown { pos, .. } => *pos,
        }
    }
}

impl HasPosition for Flowchart {
    fn position(&self) -> Position {
        self.pos
    }
}

/// Visits every node definition in source order, descending into subgraphs.
pub fn walk_nodes<'a>(statements: &'a [FlowStmt], visit: &mut impl FnMut(&'a NodeDef)) {
    for stmt in statements {
        match stmt {
            FlowStmt::Node(node) => visit(node),
            FlowStmt::Subgraph(sub) => walk_nodes(&sub.statements, visit),
            _ => {}
        }
    }
}
