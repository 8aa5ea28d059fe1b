#![forbid(unsafe_code)]

//! Mermaid-style diagram parser (headless).
//!
//! Turns the text of one diagram into a typed, position-located syntax tree. Four dialects are
//! understood (flowchart, sequence, class, state); any other header parses to an opaque
//! [`GenericDiagram`] so unknown diagram types never fail.
//!
//! Parsing is a pure function of the input text: no I/O, no shared state, and every call builds a
//! fresh tree, so independent diagrams may be parsed concurrently.

pub mod detect;
pub mod diagnostic;
pub mod diagram;
pub mod diagrams;
pub mod error;
pub(crate) mod utils;

pub use detect::{Detector, DetectorRegistry};
pub use diagnostic::{Diagnostic, Position, Severity};
pub use diagram::{Diagram, DiagramKind, HasPosition};
pub use diagrams::class::ClassDiagram;
pub use diagrams::flowchart::Flowchart;
pub use diagrams::generic::GenericDiagram;
pub use diagrams::sequence::SequenceDiagram;
pub use diagrams::state::StateDiagram;
pub use error::{ParseError, Result};

fn default_registry() -> &'static DetectorRegistry {
    static REGISTRY: std::sync::OnceLock<DetectorRegistry> = std::sync::OnceLock::new();
    REGISTRY.get_or_init(DetectorRegistry::default)
}

/// Parses the text of exactly one diagram, starting at (or before) its header keyword.
///
/// Returns the most specific dialect tree, or [`Diagram::Generic`] for unrecognized headers.
/// Grammar violations in a recognized dialect fail with a [`ParseError`]; no partial tree is
/// returned.
pub fn parse(source: &str) -> Result<Diagram> {
    default_registry().parse(source)
}

/// Detects the dialect of `source` without parsing its body.
pub fn detect_type(source: &str) -> Result<DiagramKind> {
    default_registry().detect_type(source)
}

#[cfg(test)]
mod tests;
