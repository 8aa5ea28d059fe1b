use super::ast::{DirectionToken, FlowStmt, Flowchart, Link, NodeDef, NodeShape, Subgraph};
use super::link::scan_link;
use crate::detect::Header;
use crate::utils::{
    Line, find_unquoted, is_ident_char, name_len, node_id_len, source_lines, split_statements,
    strip_quotes,
};
use crate::{ParseError, Position, Result};
use regex::Regex;
use rustc_hash::FxHashSet;

fn subgraph_id_title_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([\w-]+)\s*\[(.*)\]$").expect("valid regex"))
}

/// A node reference at a point of use, with its bracketed label if one was given there.
#[derive(Debug, Clone)]
struct NodeRef {
    id: String,
    shape: Option<(String, NodeShape)>,
    pos: Position,
}

#[derive(Debug, Default)]
struct Frame {
    opener: Option<(String, String, Position)>,
    statements: Vec<FlowStmt>,
    /// Identifiers that already have a definition in this scope.
    defined: FxHashSet<String>,
}

#[derive(Debug, Default)]
struct FlowParser {
    root: Frame,
    open: Vec<Frame>,
}

fn skip_ws(text: &str, mut idx: usize) -> usize {
    while let Some(ch) = text[idx..].chars().next() {
        if !ch.is_whitespace() {
            break;
        }
        idx += ch.len_utf8();
    }
    idx
}

/// Finds `closer` at nesting depth zero, skipping double-quoted spans.
fn find_shape_close(s: &str, closer: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let close_first = closer.as_bytes()[0];
    let open = match close_first {
        b']' => b'[',
        b')' => b'(',
        b'}' => b'{',
        _ => 0,
    };
    let mut depth = 0usize;
    let mut idx = 0usize;
    while idx < bytes.len() {
        let b = bytes[idx];
        if b == b'"' {
            idx += 1;
            while idx < bytes.len() && bytes[idx] != b'"' {
                idx += 1;
            }
            if idx == bytes.len() {
                return None;
            }
        } else if depth == 0 && bytes[idx..].starts_with(closer.as_bytes()) {
            return Some(idx);
        } else if b == open {
            depth += 1;
        } else if b == close_first {
            depth = depth.saturating_sub(1);
        }
        idx += 1;
    }
    None
}

fn parse_node(line: &Line<'_>, start: usize) -> Result<(NodeRef, usize)> {
    let text = line.text;
    let id_len = node_id_len(&text[start..]);
    if id_len == 0 {
        let found = text[start..].split_whitespace().next().unwrap_or_default();
        return Err(ParseError::syntax(
            line.pos_at(start),
            format!("expected a node identifier, found `{found}`"),
        ));
    }
    let mut idx = start + id_len;
    let mut node = NodeRef {
        id: text[start..idx].to_string(),
        shape: None,
        pos: line.pos_at(start),
    };

    let rest = &text[idx..];
    if let Some((opener, shape)) = NodeShape::OPENERS
        .iter()
        .find(|(opener, _)| rest.starts_with(opener))
    {
        let (_, closer) = shape.delimiters();
        let body = &rest[opener.len()..];
        let Some(close) = find_shape_close(body, closer) else {
            return Err(ParseError::syntax(
                line.pos_at(idx),
                format!("unclosed `{opener}` in definition of node `{}`", node.id),
            ));
        };
        node.shape = Some((strip_quotes(&body[..close]).to_string(), *shape));
        idx += opener.len() + close + closer.len();
    }

    if let Some(class) = text[idx..].strip_prefix(":::") {
        idx += 3 + name_len(class);
    }

    Ok((node, idx))
}

/// Parses `A`, `A[label]` or an `&`-joined group of them.
fn parse_group(line: &Line<'_>, start: usize) -> Result<(Vec<NodeRef>, usize)> {
    let mut nodes = Vec::new();
    let mut idx = start;
    loop {
        let (node, next) = parse_node(line, idx)?;
        nodes.push(node);
        idx = skip_ws(line.text, next);
        match line.text[idx..].strip_prefix('&') {
            Some(_) => idx = skip_ws(line.text, idx + 1),
            None => return Ok((nodes, next)),
        }
    }
}

impl FlowParser {
    fn frame(&mut self) -> &mut Frame {
        match self.open.last_mut() {
            Some(frame) => frame,
            None => &mut self.root,
        }
    }

    fn push(&mut self, stmt: FlowStmt) {
        self.frame().statements.push(stmt);
    }

    /// Standalone labeled definitions are always recorded; inline ones only when the scope has no
    /// definition yet, so the first label wins. A bare id defines nothing.
    fn define(&mut self, node: &NodeRef, standalone: bool) {
        let frame = self.frame();
        let Some((label, shape)) = &node.shape else {
            return;
        };
        let fresh = frame.defined.insert(node.id.clone());
        if !fresh && !standalone {
            return;
        }
        frame.statements.push(FlowStmt::Node(NodeDef {
            id: node.id.clone(),
            label: label.clone(),
            shape: *shape,
            pos: node.pos,
        }));
    }

    fn statement(&mut self, line: Line<'_>) -> Result<()> {
        if line.is_blank() {
            return Ok(());
        }
        let pos = line.pos();
        let (word, rest) = line.first_word();
        let leaf = match word {
            "end" if rest.is_blank() => return self.close_subgraph(pos),
            "subgraph" => return self.open_subgraph(pos, rest),
            "direction" => {
                let (token, _) = rest.first_word();
                if token.is_empty() {
                    return Err(ParseError::syntax(pos, "`direction` requires a value"));
                }
                FlowStmt::Direction(DirectionToken {
                    text: token.to_string(),
                    pos: rest.pos(),
                })
            }
            "classDef" => FlowStmt::ClassDef { pos },
            "class" => FlowStmt::ClassAssign { pos },
            "style" => FlowStmt::Style { pos },
            "linkStyle" => FlowStmt::LinkStyle { pos },
            "click" => FlowStmt::Click { pos },
            // `A@{ shape: rect }` node metadata has no grammar here.
            _ if word.starts_with("accTitle")
                || word.starts_with("accDescr")
                || !line.text.starts_with(is_ident_char)
                || find_unquoted(line.text, 0, "@{").is_some() =>
            {
                FlowStmt::Unknown {
                    text: line.text.to_string(),
                    pos,
                }
            }
            _ => return self.node_statement(&line),
        };
        self.push(leaf);
        Ok(())
    }

    fn node_statement(&mut self, line: &Line<'_>) -> Result<()> {
        let text = line.text;
        let (mut from, next) = parse_group(line, 0)?;
        let mut idx = skip_ws(text, next);
        if idx == text.len() {
            for node in &from {
                self.define(node, true);
            }
            return Ok(());
        }

        for node in &from {
            self.define(node, false);
        }
        while idx < text.len() {
            let link_at = idx;
            let (token, used) =
                scan_link(&text[idx..]).map_err(|msg| ParseError::syntax(line.pos_at(idx), msg))?;
            idx = skip_ws(text, idx + used);
            if idx == text.len() {
                return Err(ParseError::syntax(
                    line.pos_at(link_at),
                    format!("link `{}` is missing its target node", token.arrow),
                ));
            }
            let (to, next) = parse_group(line, idx)?;
            for source in &from {
                for target in &to {
                    self.push(FlowStmt::Link(Link {
                        from: source.id.clone(),
                        to: target.id.clone(),
                        arrow: token.arrow.clone(),
                        stroke: token.stroke,
                        start: token.start,
                        end: token.end,
                        bidirectional: token.start.is_some() && token.end.is_some(),
                        label: token.label.clone(),
                        pos: source.pos,
                    }));
                }
            }
            for node in &to {
                self.define(node, false);
            }
            from = to;
            idx = skip_ws(text, next);
        }
        Ok(())
    }

    fn open_subgraph(&mut self, pos: Position, rest: Line<'_>) -> Result<()> {
        let (id, title) = match subgraph_id_title_regex().captures(rest.text) {
            Some(caps) => (caps[1].to_string(), strip_quotes(&caps[2]).to_string()),
            None => {
                let title = strip_quotes(rest.text).to_string();
                (title.clone(), title)
            }
        };
        if title.is_empty() {
            return Err(ParseError::syntax(pos, "`subgraph` requires a title"));
        }
        tracing::trace!(%id, depth = self.open.len() + 1, "open subgraph");
        self.open.push(Frame {
            opener: Some((id, title, pos)),
            ..Frame::default()
        });
        Ok(())
    }

    fn close_subgraph(&mut self, pos: Position) -> Result<()> {
        let Some(frame) = self.open.pop() else {
            return Err(ParseError::unexpected("end", pos));
        };
        let Some((id, title, opened_at)) = frame.opener else {
            return Err(ParseError::unexpected("end", pos));
        };
        tracing::trace!(%id, depth = self.open.len(), "close subgraph");
        self.push(FlowStmt::Subgraph(Subgraph {
            id,
            title,
            statements: frame.statements,
            pos: opened_at,
        }));
        Ok(())
    }

    fn finish(self) -> Result<Vec<FlowStmt>> {
        if let Some((_, _, pos)) = self.open.last().and_then(|f| f.opener.as_ref()) {
            return Err(ParseError::unclosed("subgraph", *pos));
        }
        Ok(self.root.statements)
    }
}

pub(crate) fn parse_with_header(source: &str, header: &Header<'_>) -> Result<Flowchart> {
    let mut parser = FlowParser::default();
    let mut direction = None;

    // `graph TD;A-->B` carries statements on the header line.
    let rest = header.rest;
    for (idx, (start, end)) in split_statements(rest.text).into_iter().enumerate() {
        let segment = rest.slice(start, end);
        if idx > 0 {
            parser.statement(segment)?;
            continue;
        }
        let (token, extra) = segment.first_word();
        if !token.is_empty() {
            direction = Some(DirectionToken {
                text: token.to_string(),
                pos: segment.pos(),
            });
        }
        parser.statement(extra)?;
    }

    for line in source_lines(source).skip(header.line.number) {
        if line.is_comment() {
            parser.push(FlowStmt::Comment { pos: line.pos() });
            continue;
        }
        for (start, end) in split_statements(line.text) {
            parser.statement(line.slice(start, end))?;
        }
    }

    Ok(Flowchart {
        keyword: header.keyword.to_string(),
        direction,
        source: source.to_string(),
        pos: header.line.pos(),
        statements: parser.finish()?,
    })
}
