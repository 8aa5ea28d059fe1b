//! `classDiagram` diagrams.

mod ast;
mod parse;

pub use ast::{
    Annotation, Class, ClassDiagram, ClassMember, ClassNote, ClassStmt, MemberLine, Namespace,
    Relationship, RelationshipKind, VISIBILITIES, walk,
};
pub(crate) use parse::parse_with_header;

use crate::Result;
use crate::detect::locate_header;

/// Parses a diagram already known to be a class diagram.
pub fn parse_class(source: &str) -> Result<ClassDiagram> {
    let header = locate_header(source)?;
    header.expect(&["classDiagram", "classDiagram-v2"])?;
    parse_with_header(source, &header)
}
