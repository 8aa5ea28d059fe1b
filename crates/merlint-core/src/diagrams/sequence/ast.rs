use crate::{HasPosition, Position};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceDiagram {
    pub source: String,
    pub pos: Position,
    pub statements: Vec<SeqStmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParticipantKind {
    Participant,
    Actor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: String,
    pub alias: Option<String>,
    pub kind: ParticipantKind,
    /// Declared with `create participant` / `create actor`.
    pub created: bool,
    pub pos: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageArrow {
    /// `->`
    SolidOpen,
    /// `-->`
    DottedOpen,
    /// `->>`
    Solid,
    /// `-->>`
    Dotted,
    /// `-x`
    SolidCross,
    /// `--x`
    DottedCross,
    /// `-)`
    SolidAsync,
    /// `--)`
    DottedAsync,
    /// `<<->>`
    BidirectionalSolid,
    /// `<<-->>`
    BidirectionalDotted,
}

impl MessageArrow {
    /// Longest tokens first so prefixes never shadow them.
    pub(crate) const TOKENS: [(&'static str, MessageArrow); 10] = [
        ("<<-->>", MessageArrow::BidirectionalDotted),
        ("<<->>", MessageArrow::BidirectionalSolid),
        ("-->>", MessageArrow::Dotted),
        ("->>", MessageArrow::Solid),
        ("-->", MessageArrow::DottedOpen),
        ("->", MessageArrow::SolidOpen),
        ("--x", MessageArrow::DottedCross),
        ("-x", MessageArrow::SolidCross),
        ("--)", MessageArrow::DottedAsync),
        ("-)", MessageArrow::SolidAsync),
    ];

    pub fn from_token(token: &str) -> Option<Self> {
        Self::TOKENS
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, arrow)| *arrow)
    }

    pub fn token(self) -> &'static str {
        Self::TOKENS
            .iter()
            .find(|(_, arrow)| *arrow == self)
            .map(|(t, _)| *t)
            .unwrap_or("->")
    }

    pub fn is_dotted(self) -> bool {
        self.token().contains("--")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivationKind {
    Activate,
    Deactivate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub arrow: MessageArrow,
    /// `+` (activate the receiver) or `-` (deactivate the sender) written after the arrow.
    pub activation: Option<ActivationKind>,
    pub text: Option<String>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activation {
    pub participant: String,
    pub kind: ActivationKind,
    pub pos: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    Loop,
    Alt,
    Opt,
    Par,
    Critical,
    Break,
    Rect,
}

impl BlockKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "loop" => Self::Loop,
            "alt" => Self::Alt,
            "opt" => Self::Opt,
            "par" => Self::Par,
            "critical" => Self::Critical,
            "break" => Self::Break,
            "rect" => Self::Rect,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Loop => "loop",
            Self::Alt => "alt",
            Self::Opt => "opt",
            Self::Par => "par",
            Self::Critical => "critical",
            Self::Break => "break",
            Self::Rect => "rect",
        }
    }

    /// The keyword that starts another branch of this block, if it has branches.
    pub fn branch_keyword(self) -> Option<&'static str> {
        match self {
            Self::Alt => Some("else"),
            Self::Par => Some("and"),
            Self::Critical => Some("option"),
            _ => None,
        }
    }
}

/// An `else` / `and` / `option` section of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub label: Option<String>,
    pub statements: Vec<SeqStmt>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    pub label: Option<String>,
    /// Statements before the first branch keyword.
    pub statements: Vec<SeqStmt>,
    pub branches: Vec<Branch>,
    pub pos: Position,
}

impl Block {
    /// Every statement of the block in source order, branch by branch.
    pub fn all_statements(&self) -> impl Iterator<Item = &SeqStmt> {
        self.statements
            .iter()
            .chain(self.branches.iter().flat_map(|b| b.statements.iter()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotePlacement {
    LeftOf,
    RightOf,
    Over,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub placement: NotePlacement,
    pub participants: Vec<String>,
    pub text: String,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoxGroup {
    pub label: Option<String>,
    pub statements: Vec<SeqStmt>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SeqStmt {
    Participant(Participant),
    Message(Message),
    Activation(Activation),
    Block(Block),
    Note(Note),
    Box(BoxGroup),
    Autonumber { pos: Position },
    Comment { pos: Position },
    Unknown { text: String, pos: Position },
}

impl HasPosition for SeqStmt {
    fn position(&self) -> Position {
        match self {
            Self::Participant(p) => p.pos,
            Self::Message(m) => m.pos,
            Self::Activation(a) => a.pos,
            Self::Block(b) => b.pos,
            Self::Note(n) => n.pos,
            Self::Box(b) => b.pos,
            Self::Autonumber { pos } | Self::Comment { pos } | Self::Unknown { pos, .. } => *pos,
        }
    }
}

impl HasPosition for SequenceDiagram {
    fn position(&self) -> Position {
        self.pos
    }
}
