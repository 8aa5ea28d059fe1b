//! `graph` / `flowchart` diagrams.

mod ast;
mod link;
mod parse;

pub use ast::{
    ArrowHead, DIRECTIONS, DirectionToken, FlowStmt, Flowchart, Link, NodeDef, NodeShape, Stroke,
    Subgraph, walk_nodes,
};
pub(crate) use parse::parse_with_header;

use crate::Result;
use crate::detect::locate_header;

impl Flowchart {
    pub fn dialect(&self) -> &str {
        if self.keyword == "graph" { "graph" } else { "flowchart" }
    }
}

/// Parses a diagram already known to be a flowchart.
pub fn parse_flowchart(source: &str) -> Result<Flowchart> {
    let header = locate_header(source)?;
    header.expect(&["graph", "flowchart"])?;
    parse_with_header(source, &header)
}
