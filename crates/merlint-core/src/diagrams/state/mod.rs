//! `stateDiagram` / `stateDiagram-v2` diagrams.

mod ast;
mod parse;

pub use ast::{
    End, NoteSide, Pseudostate, Start, State, StateDiagram, StateNote, StateStmt, Transition,
    walk,
};
pub(crate) use parse::parse_with_header;

use crate::Result;
use crate::detect::locate_header;

impl StateDiagram {
    /// `stateDiagram-v2` for v2 sources, `state` otherwise.
    pub fn dialect(&self) -> &'static str {
        if self.keyword == "stateDiagram-v2" {
            "stateDiagram-v2"
        } else {
            "state"
        }
    }
}

/// Parses a diagram already known to be a state diagram.
pub fn parse_state(source: &str) -> Result<StateDiagram> {
    let header = locate_header(source)?;
    header.expect(&["state", "stateDiagram", "stateDiagram-v2"])?;
    parse_with_header(source, &header)
}
