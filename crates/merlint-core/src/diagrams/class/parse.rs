use super::ast::{
    Annotation, Class, ClassDiagram, ClassMember, ClassNote, ClassStmt, MemberLine, Namespace,
    Relationship, RelationshipKind,
};
use crate::detect::Header;
use crate::utils::{Line, source_lines};
use crate::{ParseError, Position, Result};
use regex::Regex;

fn note_for_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^note\s+(?:for\s+(\S+)\s+)?"(.*)"$"#).expect("valid regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Head {
    None,
    Extension,
    Composition,
    Aggregation,
    Arrow,
    Lollipop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineStyle {
    Solid,
    Dotted,
}

fn relationship_kind(left: Head, right: Head, line: LineStyle) -> RelationshipKind {
    let head = match (left, right) {
        (Head::None, head) | (head, Head::None) => head,
        (a, b) if a == b => a,
        _ => return RelationshipKind::Unrecognized,
    };
    match (head, line) {
        (Head::None, LineStyle::Solid) | (Head::Arrow, LineStyle::Solid) => {
            RelationshipKind::Association
        }
        (Head::None, LineStyle::Dotted) | (Head::Arrow, LineStyle::Dotted) => {
            RelationshipKind::Dependency
        }
        (Head::Extension, LineStyle::Solid) => RelationshipKind::Inheritance,
        (Head::Extension, LineStyle::Dotted) => RelationshipKind::Realization,
        (Head::Composition, _) => RelationshipKind::Composition,
        (Head::Aggregation, _) => RelationshipKind::Aggregation,
        (Head::Lollipop, _) => RelationshipKind::Unrecognized,
    }
}

fn parse_quoted_str(rest: &str) -> Option<(String, &str)> {
    let rest = rest.trim_start();
    let inner = rest.strip_prefix('"')?;
    let end = inner.find('"')?;
    Some((inner[..end].to_string(), &inner[end + 1..]))
}

fn parse_name(rest: &str) -> Option<(String, &str)> {
    let rest = rest.trim_start();
    if let Some(inner) = rest.strip_prefix('`') {
        let (name, after) = match inner.find('`') {
            Some(end) => (&inner[..end], &inner[end + 1..]),
            None => (inner, ""),
        };
        return Some((name.to_string(), after));
    }

    let bytes = rest.as_bytes();
    let mut end = 0usize;
    while end < rest.len() {
        let b = bytes[end];
        if b.is_ascii_whitespace()
            || matches!(
                b,
                b'{' | b'}' | b'[' | b']' | b'"' | b',' | b':' | b'<' | b'>' | b'~' | b'*' | b'|'
                    | b'(' | b')'
            )
        {
            break;
        }
        if (b == b'.' || b == b'-') && bytes.get(end + 1) == Some(&b) {
            break;
        }
        end += 1;
    }
    if end == 0 {
        return None;
    }
    Some((rest[..end].to_string(), &rest[end..]))
}

fn parse_left_head(rest: &str) -> (Head, &str) {
    let rest = rest.trim_start();
    if let Some(after) = rest.strip_prefix("<|") {
        return (Head::Extension, after);
    }
    if let Some(after) = rest.strip_prefix("()") {
        return (Head::Lollipop, after);
    }
    if let Some(after) = rest.strip_prefix('*') {
        return (Head::Composition, after);
    }
    if let Some(after) = rest.strip_prefix('o') {
        if after.starts_with("--") || after.starts_with("..") {
            return (Head::Aggregation, after);
        }
    }
    if let Some(after) = rest.strip_prefix('<') {
        return (Head::Arrow, after);
    }
    (Head::None, rest)
}

/// The right-hand head must follow the line directly.
fn parse_right_head(rest: &str) -> (Head, &str) {
    if let Some(after) = rest.strip_prefix("|>") {
        return (Head::Extension, after);
    }
    if let Some(after) = rest.strip_prefix("()") {
        return (Head::Lollipop, after);
    }
    if let Some(after) = rest.strip_prefix('*') {
        return (Head::Composition, after);
    }
    if let Some(after) = rest.strip_prefix('o') {
        if !after.starts_with(|ch: char| ch.is_alphanumeric() || ch == '_') {
            return (Head::Aggregation, after);
        }
    }
    if let Some(after) = rest.strip_prefix('>') {
        return (Head::Arrow, after);
    }
    (Head::None, rest)
}

/// Parses `<|--`, `*--`, `..>` and friends. Returns the glyph, its kind and the remaining text.
fn parse_relation(rest: &str) -> Option<(String, RelationshipKind, &str)> {
    let rest = rest.trim_start();
    let (left, after_left) = parse_left_head(rest);
    let (line, after_line) = if let Some(after) = after_left.strip_prefix("--") {
        (LineStyle::Solid, after)
    } else if let Some(after) = after_left.strip_prefix("..") {
        (LineStyle::Dotted, after)
    } else {
        return None;
    };
    let (right, after_right) = parse_right_head(after_line);
    let glyph = rest[..rest.len() - after_right.len()].to_string();
    Some((glyph, relationship_kind(left, right, line), after_right))
}

/// Drops a `~T~` generic suffix written directly after a class name.
fn skip_generic(rest: &str) -> &str {
    rest.strip_prefix('~')
        .and_then(|inner| inner.find('~').map(|end| &inner[end + 1..]))
        .unwrap_or(rest)
}

fn is_visibility_char(ch: char) -> bool {
    ch.is_ascii_punctuation() && !matches!(ch, '_' | '`' | '"' | '(' | '[' | '{' | '<' | '$')
}

fn parse_member(text: &str, pos: Position) -> ClassMember {
    let text = text.trim();
    let split = text
        .char_indices()
        .find(|&(_, ch)| !is_visibility_char(ch))
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let name = text[split..].trim().to_string();
    ClassMember {
        visibility: text[..split].to_string(),
        is_method: name.contains('('),
        name,
        pos,
    }
}

fn annotation_text(text: &str) -> Option<(&str, &str)> {
    let inner = text.strip_prefix("<<")?;
    let end = inner.find(">>")?;
    Some((inner[..end].trim(), inner[end + 2..].trim()))
}

#[derive(Debug)]
enum Frame {
    Body(Class),
    Namespace(Namespace),
}

#[derive(Debug, Default)]
struct ClassParser {
    root: Vec<ClassStmt>,
    open: Vec<Frame>,
}

impl ClassParser {
    fn push(&mut self, stmt: ClassStmt) {
        match self.open.last_mut() {
            Some(Frame::Namespace(ns)) => ns.statements.push(stmt),
            Some(Frame::Body(_)) | None => self.root.push(stmt),
        }
    }

    fn line(&mut self, line: Line<'_>) -> Result<()> {
        if line.is_blank() {
            return Ok(());
        }
        if let Some(Frame::Body(class)) = self.open.last_mut() {
            // Comments inside a body are dropped.
            if line.is_comment() {
                return Ok(());
            }
            if line.text == "}" {
                return self.close(line.pos());
            }
            match annotation_text(line.text) {
                Some((annotation, "")) => class.annotations.push(annotation.to_string()),
                _ => class.members.push(parse_member(line.text, line.pos())),
            }
            return Ok(());
        }

        let pos = line.pos();
        if line.is_comment() {
            self.push(ClassStmt::Comment { pos });
            return Ok(());
        }
        let (word, rest) = line.first_word();
        let stmt = match word {
            "}" => return self.close(pos),
            "class" => return self.class(pos, rest),
            "namespace" => {
                let Some((name, after)) = parse_name(rest.text) else {
                    return Err(ParseError::syntax(pos, "`namespace` requires a name"));
                };
                if after.trim() != "{" {
                    return Err(ParseError::syntax(
                        rest.pos(),
                        format!("expected `{{` after namespace `{name}`"),
                    ));
                }
                tracing::trace!(%name, "open namespace");
                self.open.push(Frame::Namespace(Namespace {
                    name,
                    statements: Vec::new(),
                    pos,
                }));
                return Ok(());
            }
            "note" => {
                let Some(caps) = note_for_regex().captures(line.text) else {
                    return Err(ParseError::syntax(
                        pos,
                        "malformed note; expected `note for <class> \"text\"` or `note \"text\"`",
                    ));
                };
                ClassStmt::Note(ClassNote {
                    class_name: caps.get(1).map(|m| m.as_str().to_string()),
                    text: caps[2].to_string(),
                    pos,
                })
            }
            "direction" => {
                let (token, _) = rest.first_word();
                if token.is_empty() {
                    return Err(ParseError::syntax(pos, "`direction` requires a value"));
                }
                ClassStmt::Direction {
                    text: token.to_string(),
                    pos: rest.pos(),
                }
            }
            "classDef" | "cssClass" | "style" | "click" | "link" | "callback" => {
                ClassStmt::Style { pos }
            }
            _ if word.starts_with("<<") => match annotation_text(line.text) {
                Some((annotation, class_name)) if !class_name.is_empty() => {
                    ClassStmt::Annotation(Annotation {
                        class_name: class_name.to_string(),
                        annotation: annotation.to_string(),
                        pos,
                    })
                }
                _ => {
                    return Err(ParseError::syntax(
                        pos,
                        "malformed annotation; expected `<<annotation>> ClassName`",
                    ));
                }
            },
            _ => self.relationship_or_member(&line)?,
        };
        self.push(stmt);
        Ok(())
    }

    fn class(&mut self, pos: Position, rest: Line<'_>) -> Result<()> {
        let Some((name, after)) = parse_name(rest.text) else {
            return Err(ParseError::syntax(pos, "`class` requires a name"));
        };
        let mut class = Class {
            name,
            generic: None,
            label: None,
            annotations: Vec::new(),
            members: Vec::new(),
            pos,
        };

        let mut after = after;
        if let Some(inner) = after.strip_prefix('~') {
            let Some(end) = inner.find('~') else {
                return Err(ParseError::syntax(pos, "unclosed `~` in generic class name"));
            };
            class.generic = Some(inner[..end].to_string());
            after = &inner[end + 1..];
        }
        after = after.trim_start();
        if let Some(inner) = after.strip_prefix('[') {
            let Some((label, after_label)) = parse_quoted_str(inner) else {
                return Err(ParseError::syntax(pos, "class label must be quoted: `[\"label\"]`"));
            };
            let Some(after_label) = after_label.trim_start().strip_prefix(']') else {
                return Err(ParseError::syntax(pos, "unclosed `[` in class label"));
            };
            class.label = Some(label);
            after = after_label.trim_start();
        }
        if let Some(css) = after.strip_prefix(":::") {
            let end = css.find(char::is_whitespace).unwrap_or(css.len());
            after = css[end..].trim_start();
        }

        let Some(body) = after.strip_prefix('{') else {
            if !after.is_empty() {
                return Err(ParseError::syntax(
                    pos,
                    format!("unexpected `{after}` after class `{}`", class.name),
                ));
            }
            self.push(ClassStmt::Class(class));
            return Ok(());
        };

        let body = body.trim();
        if body == "}" {
            self.push(ClassStmt::Class(class));
            return Ok(());
        }
        if let Some(member) = body.strip_suffix('}') {
            class.members.push(parse_member(member, pos));
            self.push(ClassStmt::Class(class));
            return Ok(());
        }
        if !body.is_empty() {
            class.members.push(parse_member(body, pos));
        }
        tracing::trace!(name = %class.name, "open class body");
        self.open.push(Frame::Body(class));
        Ok(())
    }

    fn close(&mut self, pos: Position) -> Result<()> {
        let stmt = match self.open.pop() {
            Some(Frame::Body(class)) => ClassStmt::Class(class),
            Some(Frame::Namespace(ns)) => ClassStmt::Namespace(ns),
            None => return Err(ParseError::unexpected("}", pos)),
        };
        self.push(stmt);
        Ok(())
    }

    fn relationship_or_member(&self, line: &Line<'_>) -> Result<ClassStmt> {
        let pos = line.pos();
        let unknown = || ClassStmt::Unknown {
            text: line.text.to_string(),
            pos,
        };
        let Some((from, after_from)) = parse_name(line.text) else {
            return Ok(unknown());
        };
        let after_from = skip_generic(after_from);

        let (from_cardinality, after_card) = match parse_quoted_str(after_from) {
            Some((card, rest)) => (Some(card), rest),
            None => (None, after_from),
        };
        if let Some((glyph, kind, after_glyph)) = parse_relation(after_card) {
            let (to_cardinality, after_card) = match parse_quoted_str(after_glyph) {
                Some((card, rest)) => (Some(card), rest),
                None => (None, after_glyph),
            };
            let Some((to, after_to)) = parse_name(after_card) else {
                return Err(ParseError::syntax(
                    pos,
                    format!("relationship `{glyph}` is missing its target class"),
                ));
            };
            let after_to = skip_generic(after_to).trim();
            let label = match after_to.strip_prefix(':') {
                Some(label) => Some(label.trim().to_string()),
                None if after_to.is_empty() => None,
                None => {
                    return Err(ParseError::syntax(
                        pos,
                        format!("unexpected `{after_to}` after relationship"),
                    ));
                }
            };
            return Ok(ClassStmt::Relationship(Relationship {
                from,
                to,
                glyph,
                kind,
                from_cardinality,
                to_cardinality,
                label,
                pos,
            }));
        }

        let Some(member) = after_from.trim_start().strip_prefix(':') else {
            return Ok(unknown());
        };
        let member_at = line.text.len() - member.trim_start().len();
        Ok(ClassStmt::Member(MemberLine {
            class_name: from,
            member: parse_member(member, line.pos_at(member_at)),
            pos,
        }))
    }

    fn finish(self) -> Result<Vec<ClassStmt>> {
        match self.open.last() {
            Some(Frame::Body(class)) => Err(ParseError::unclosed("class", class.pos)),
            Some(Frame::Namespace(ns)) => Err(ParseError::unclosed("namespace", ns.pos)),
            None => Ok(self.root),
        }
    }
}

pub(crate) fn parse_with_header(source: &str, header: &Header<'_>) -> Result<ClassDiagram> {
    let mut parser = ClassParser::default();
    parser.line(header.rest)?;
    for line in source_lines(source).skip(header.line.number) {
        parser.line(line)?;
    }

    Ok(ClassDiagram {
        source: source.to_string(),
        pos: header.line.pos(),
        statements: parser.finish()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_kinds_follow_heads_and_line_style() {
        let kind = |glyph: &str| parse_relation(glyph).map(|(_, kind, _)| kind);
        assert_eq!(kind("<|-- B"), Some(RelationshipKind::Inheritance));
        assert_eq!(kind("--|> B"), Some(RelationshipKind::Inheritance));
        assert_eq!(kind("..|> B"), Some(RelationshipKind::Realization));
        assert_eq!(kind("*-- B"), Some(RelationshipKind::Composition));
        assert_eq!(kind("o-- B"), Some(RelationshipKind::Aggregation));
        assert_eq!(kind("--o B"), Some(RelationshipKind::Aggregation));
        assert_eq!(kind("--> B"), Some(RelationshipKind::Association));
        assert_eq!(kind("-- B"), Some(RelationshipKind::Association));
        assert_eq!(kind("..> B"), Some(RelationshipKind::Dependency));
        assert_eq!(kind(".. B"), Some(RelationshipKind::Dependency));
        assert_eq!(kind("<|--|> B"), Some(RelationshipKind::Inheritance));
        assert_eq!(kind("*--o B"), Some(RelationshipKind::Unrecognized));
        assert_eq!(kind("()-- B"), Some(RelationshipKind::Unrecognized));
        assert_eq!(kind(": x"), None);
    }

    #[test]
    fn members_keep_the_raw_visibility_token() {
        let member = parse_member("+getName() String", Position::start());
        assert_eq!(member.visibility, "+");
        assert_eq!(member.name, "getName() String");
        assert!(member.is_method);

        assert_eq!(parse_member("*name", Position::start()).visibility, "*");
        assert_eq!(parse_member("++x", Position::start()).visibility, "++");
        assert_eq!(parse_member("String name", Position::start()).visibility, "");
        assert_eq!(parse_member("$count", Position::start()).visibility, "");
    }
}
