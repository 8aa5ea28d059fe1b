use crate::Position;
use crate::diagrams::class::ClassDiagram;
use crate::diagrams::flowchart::Flowchart;
use crate::diagrams::generic::GenericDiagram;
use crate::diagrams::sequence::SequenceDiagram;
use crate::diagrams::state::StateDiagram;
use serde::Serialize;

/// Anything that can be located in the source it was parsed from.
pub trait HasPosition {
    fn position(&self) -> Position;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    Flowchart,
    Sequence,
    Class,
    State,
    Generic,
}

/// A parsed diagram of one dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Diagram {
    Flowchart(Flowchart),
    Sequence(SequenceDiagram),
    Class(ClassDiagram),
    State(StateDiagram),
    Generic(GenericDiagram),
}

impl Diagram {
    pub fn kind(&self) -> DiagramKind {
        match self {
            Self::Flowchart(_) => DiagramKind::Flowchart,
            Self::Sequence(_) => DiagramKind::Sequence,
            Self::Class(_) => DiagramKind::Class,
            Self::State(_) => DiagramKind::State,
            Self::Generic(_) => DiagramKind::Generic,
        }
    }

    /// The dialect tag: `flowchart`, `graph`, `sequence`, `class`, `state`, `stateDiagram-v2`, or
    /// the raw header keyword of an unrecognized diagram.
    pub fn dialect(&self) -> &str {
        match self {
            Self::Flowchart(d) => d.dialect(),
            Self::Sequence(_) => "sequence",
            Self::Class(_) => "class",
            Self::State(d) => d.dialect(),
            Self::Generic(d) => &d.tag,
        }
    }

    pub fn source(&self) -> &str {
        match self {
            Self::Flowchart(d) => &d.source,
            Self::Sequence(d) => &d.source,
            Self::Class(d) => &d.source,
            Self::State(d) => &d.source,
            Self::Generic(d) => &d.source,
        }
    }
}

impl HasPosition for Diagram {
    fn position(&self) -> Position {
        match self {
            Self::Flowchart(d) => d.pos,
            Self::Sequence(d) => d.pos,
            Self::Class(d) => d.pos,
            Self::State(d) => d.pos,
            Self::Generic(d) => d.pos,
        }
    }
}
