//! `sequenceDiagram` diagrams.

mod ast;
mod parse;

pub use ast::{
    Activation, ActivationKind, Block, BlockKind, BoxGroup, Branch, Message, MessageArrow, Note,
    NotePlacement, Participant, ParticipantKind, SeqStmt, SequenceDiagram,
};
pub(crate) use parse::parse_with_header;

use crate::Result;
use crate::detect::locate_header;

/// Parses a diagram already known to be a sequence diagram.
pub fn parse_sequence(source: &str) -> Result<SequenceDiagram> {
    let header = locate_header(source)?;
    header.expect(&["sequenceDiagram"])?;
    parse_with_header(source, &header)
}

/// Visits every statement in source order, descending into blocks, branches and boxes.
pub fn walk<'a>(statements: &'a [SeqStmt], visit: &mut impl FnMut(&'a SeqStmt)) {
    for stmt in statements {
        visit(stmt);
        match stmt {
            SeqStmt::Block(block) => {
                walk(&block.statements, visit);
                for branch in &block.branches {
                    walk(&branch.statements, visit);
                }
            }
            SeqStmt::Box(group) => walk(&group.statements, visit),
            _ => {}
        }
    }
}
