use crate::diagrams::{class, flowchart, generic, sequence, state};
use crate::utils::{Line, source_lines};
use crate::{Diagram, DiagramKind, ParseError, Position, Result};

pub type DetectorFn = fn(keyword: &str) -> bool;

#[derive(Debug, Clone, Copy)]
pub struct Detector {
    pub kind: DiagramKind,
    pub detector: DetectorFn,
}

/// Maps header keywords to dialects. The first matching detector wins; keywords no detector
/// claims are parsed as [`DiagramKind::Generic`].
#[derive(Debug, Clone)]
pub struct DetectorRegistry {
    detectors: Vec<Detector>,
}

/// The header line of a diagram, found after front matter, directives and comments.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Header<'a> {
    pub keyword: &'a str,
    pub line: Line<'a>,
    /// The rest of the header line after the keyword.
    pub rest: Line<'a>,
}

impl Header<'_> {
    /// Fails unless the header keyword is one of `keywords`.
    pub fn expect(&self, keywords: &[&str]) -> Result<()> {
        if keywords.contains(&self.keyword) {
            return Ok(());
        }
        Err(ParseError::syntax(
            self.line.pos(),
            format!(
                "expected a `{}` header, found `{}`",
                keywords.join("` or `"),
                self.keyword
            ),
        ))
    }
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    pub fn add(&mut self, detector: Detector) {
        self.detectors.push(detector);
    }

    pub fn add_fn(&mut self, kind: DiagramKind, detector: DetectorFn) {
        self.add(Detector { kind, detector });
    }

    pub fn detect_keyword(&self, keyword: &str) -> DiagramKind {
        self.detectors
            .iter()
            .find(|det| (det.detector)(keyword))
            .map(|det| det.kind)
            .unwrap_or(DiagramKind::Generic)
    }

    /// Detects the dialect of `source` from its header keyword.
    pub fn detect_type(&self, source: &str) -> Result<DiagramKind> {
        let header = locate_header(source)?;
        Ok(self.detect_keyword(header.keyword))
    }

    /// Parses `source` with the dialect parser its header selects.
    pub fn parse(&self, source: &str) -> Result<Diagram> {
        let header = locate_header(source)?;
        let kind = self.detect_keyword(header.keyword);
        tracing::debug!(
            dialect = ?kind,
            keyword = header.keyword,
            line = header.line.number,
            "detected diagram dialect"
        );

        Ok(match kind {
            DiagramKind::Flowchart => {
                Diagram::Flowchart(flowchart::parse_with_header(source, &header)?)
            }
            DiagramKind::Sequence => {
                Diagram::Sequence(sequence::parse_with_header(source, &header)?)
            }
            DiagramKind::Class => Diagram::Class(class::parse_with_header(source, &header)?),
            DiagramKind::State => Diagram::State(state::parse_with_header(source, &header)?),
            DiagramKind::Generic => Diagram::Generic(generic::parse_with_header(source, &header)),
        })
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        let mut reg = Self::new();

        // Order matters only for overlapping keywords; none of the built-ins overlap.
        reg.add_fn(DiagramKind::Flowchart, detector_flowchart);
        reg.add_fn(DiagramKind::Sequence, detector_sequence);
        reg.add_fn(DiagramKind::Class, detector_class);
        reg.add_fn(DiagramKind::State, detector_state);

        reg
    }
}

fn detector_flowchart(keyword: &str) -> bool {
    matches!(keyword, "graph" | "flowchart")
}

fn detector_sequence(keyword: &str) -> bool {
    keyword == "sequenceDiagram"
}

fn detector_class(keyword: &str) -> bool {
    matches!(keyword, "classDiagram" | "classDiagram-v2")
}

fn detector_state(keyword: &str) -> bool {
    matches!(keyword, "state" | "stateDiagram" | "stateDiagram-v2")
}

/// Finds the header line, skipping blank lines, `%%` comments and directives, and one leading
/// `---` front-matter block.
pub(crate) fn locate_header(source: &str) -> Result<Header<'_>> {
    let mut front_matter: Option<Position> = None;
    let mut first = true;

    for line in source_lines(source) {
        if front_matter.is_some() {
            if line.text == "---" {
                front_matter = None;
            }
            continue;
        }
        if line.is_blank() {
            continue;
        }
        if first && line.text == "---" {
            front_matter = Some(line.pos());
            first = false;
            continue;
        }
        first = false;
        if line.is_comment() {
            continue;
        }

        let end = line
            .text
            .find(|ch: char| ch.is_whitespace() || ch == ';')
            .unwrap_or(line.text.len());
        return Ok(Header {
            keyword: &line.text[..end],
            line,
            rest: line.tail(end),
        });
    }

    match front_matter {
        Some(pos) => Err(ParseError::syntax(pos, "unclosed front matter (missing `---`)")),
        None => Err(ParseError::EmptySource),
    }
}
