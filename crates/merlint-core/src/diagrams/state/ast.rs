use crate::{HasPosition, Position};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateDiagram {
    /// `state`, `stateDiagram` or `stateDiagram-v2`, as written.
    pub keyword: String,
    pub source: String,
    pub pos: Position,
    pub statements: Vec<StateStmt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct State {
    pub id: String,
    pub description: Option<String>,
    /// The nested statements of a composite state.
    pub body: Option<Vec<StateStmt>>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub pos: Position,
}

/// `[*] --> X`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Start {
    pub to: String,
    pub label: Option<String>,
    pub pos: Position,
}

/// `X --> [*]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct End {
    pub from: String,
    pub label: Option<String>,
    pub pos: Position,
}

/// A fork, join or choice declared with `state X <<fork>>` and friends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pseudostate {
    pub id: String,
    pub pos: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoteSide {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateNote {
    pub side: NoteSide,
    pub state: String,
    /// Multi-line notes keep their lines joined with `\n`.
    pub text: String,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StateStmt {
    State(State),
    Description {
        id: String,
        text: String,
        pos: Position,
    },
    Transition(Transition),
    Start(Start),
    End(End),
    Fork(Pseudostate),
    Join(Pseudostate),
    Choice(Pseudostate),
    Note(StateNote),
    /// `--` between concurrent regions of a composite state.
    Divider {
        pos: Position,
    },
    Direction {
        text: String,
        pos: Position,
    },
    Style {
        pos: Position,
    },
    Comment {
        pos: Position,
    },
    Unknown {
        text: String,
        pos: Position,
    },
}

impl HasPosition for StateStmt {
    fn position(&self) -> Position {
        match self {
            Self::State(s) => s.pos,
            Self::Transition(t) => t.pos,
            Self::Start(s) => s.pos,
            Self::End(e) => e.pos,
            Self::Fork(p) | Self::Join(p) | Self::Choice(p) => p.pos,
            Self::Note(n) => n.pos,
            Self::Description { pos, .. }
            | Self::Divider { pos }
            | Self::Direction { pos, .. }
            | Self::Style { pos }
            | Self::Comment { pos }
            | Self::Unknown { pos, .. } => *pos,
        }
    }
}

impl HasPosition for StateDiagram {
    fn position(&self) -> Position {
        self.pos
    }
}

/// Visits every statement in source order, descending into composite states.
pub fn walk<'a>(statements: &'a [StateStmt], visit: &mut impl FnMut(&'a StateStmt)) {
    for stmt in statements {
        visit(stmt);
        if let StateStmt::State(State {
            body: Some(body), ..
        }) = stmt
        {
            walk(body, visit);
        }
    }
}
