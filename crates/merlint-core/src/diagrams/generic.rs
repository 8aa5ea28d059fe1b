use crate::detect::Header;
use crate::{HasPosition, Position};
use serde::Serialize;

/// An unrecognized dialect, kept verbatim and never parsed further.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenericDiagram {
    /// The header keyword, e.g. `pie` or `gantt`.
    pub tag: String,
    pub source: String,
    pub pos: Position,
}

impl HasPosition for GenericDiagram {
    fn position(&self) -> Position {
        self.pos
    }
}

pub(crate) fn parse_with_header(source: &str, header: &Header<'_>) -> GenericDiagram {
    GenericDiagram {
        tag: header.keyword.to_string(),
        source: source.to_string(),
        pos: header.line.pos(),
    }
}
