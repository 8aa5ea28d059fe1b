use super::ast::{
    End, NoteSide, Pseudostate, Start, State, StateDiagram, StateNote, StateStmt, Transition,
};
use crate::detect::Header;
use crate::utils::{Line, name_len, source_lines, split_statements};
use crate::{ParseError, Position, Result};
use regex::Regex;

const PSEUDO: &str = "[*]";

fn note_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^note\s+(?P<side>left|right)\s+of\s+(?P<state>[^\s:]+)\s*(?::(?P<text>.*))?$")
            .expect("valid regex")
    })
}

/// A composite state whose `}` has not been seen yet.
#[derive(Debug)]
struct Frame {
    id: String,
    description: Option<String>,
    pos: Position,
    statements: Vec<StateStmt>,
}

/// A multi-line note waiting for `end note`.
#[derive(Debug)]
struct PendingNote {
    side: NoteSide,
    state: String,
    lines: Vec<String>,
    pos: Position,
}

#[derive(Debug, Default)]
struct StateParser {
    root: Vec<StateStmt>,
    open: Vec<Frame>,
    note: Option<PendingNote>,
}

fn is_name(s: &str) -> bool {
    !s.is_empty() && name_len(s) == s.len()
}

fn label_of(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

impl StateParser {
    fn push(&mut self, stmt: StateStmt) {
        match self.open.last_mut() {
            Some(frame) => frame.statements.push(stmt),
            None => self.root.push(stmt),
        }
    }

    /// Feeds one physical line. Returns `false` if the line is not part of a pending note.
    fn note_line(&mut self, line: &Line<'_>) -> bool {
        let Some(note) = self.note.as_mut() else {
            return false;
        };
        if line.text == "end note" {
            if let Some(note) = self.note.take() {
                self.push(StateStmt::Note(StateNote {
                    side: note.side,
                    state: note.state,
                    text: note.lines.join("\n"),
                    pos: note.pos,
                }));
            }
        } else {
            note.lines.push(line.text.to_string());
        }
        true
    }

    fn statement(&mut self, line: Line<'_>) -> Result<()> {
        if line.is_blank() {
            return Ok(());
        }
        let pos = line.pos();
        match line.text {
            "}" => return self.close(pos),
            "--" => {
                self.push(StateStmt::Divider { pos });
                return Ok(());
            }
            "end note" => return Err(ParseError::unexpected("end note", pos)),
            _ => {}
        }

        let (word, rest) = line.first_word();
        let leaf = match word {
            "state" => return self.state(&rest, pos),
            "note" => return self.note(&line),
            "direction" => StateStmt::Direction {
                text: rest.text.to_string(),
                pos,
            },
            "classDef" | "class" | "style" => StateStmt::Style { pos },
            _ => match line.text.find("-->") {
                Some(idx) => self.transition(&line, idx)?,
                None => self.declaration(&line),
            },
        };
        self.push(leaf);
        Ok(())
    }

    fn transition(&self, line: &Line<'_>, idx: usize) -> Result<StateStmt> {
        let pos = line.pos();
        let from = line.text[..idx].trim();
        let tail = &line.text[idx + 3..];
        let (to, label) = match tail.find(':') {
            Some(colon) => (tail[..colon].trim(), label_of(&tail[colon + 1..])),
            None => (tail.trim(), None),
        };
        if from.is_empty() {
            return Err(ParseError::syntax(pos, "transition is missing its source state"));
        }
        if to.is_empty() {
            return Err(ParseError::syntax(
                line.pos_at(idx),
                format!("transition from `{from}` is missing its target state"),
            ));
        }

        let (from, to) = (from.to_string(), to.to_string());
        Ok(if from == PSEUDO {
            StateStmt::Start(Start { to, label, pos })
        } else if to == PSEUDO {
            StateStmt::End(End { from, label, pos })
        } else {
            StateStmt::Transition(Transition {
                from,
                to,
                label,
                pos,
            })
        })
    }

    /// `Id`, `Id : description`, or anything this parser has no grammar for.
    fn declaration(&self, line: &Line<'_>) -> StateStmt {
        let pos = line.pos();
        if is_name(line.text) {
            return StateStmt::State(State {
                id: line.text.to_string(),
                description: None,
                body: None,
                pos,
            });
        }
        if let Some(colon) = line.text.find(':') {
            let id = line.text[..colon].trim();
            if is_name(id) {
                return StateStmt::Description {
                    id: id.to_string(),
                    text: line.text[colon + 1..].trim().to_string(),
                    pos,
                };
            }
        }
        StateStmt::Unknown {
            text: line.text.to_string(),
            pos,
        }
    }

    /// Everything after the `state` keyword.
    fn state(&mut self, rest: &Line<'_>, pos: Position) -> Result<()> {
        let (id, description, tail) = if rest.text.starts_with('"') {
            let Some(close) = rest.text[1..].find('"').map(|i| i + 1) else {
                return Err(ParseError::syntax(pos, "unclosed state description"));
            };
            let description = rest.text[1..close].to_string();
            let (kw, after) = rest.tail(close + 1).first_word();
            if kw != "as" {
                return Err(ParseError::syntax(
                    pos,
                    "expected `state \"description\" as <id>`",
                ));
            }
            let len = name_len(after.text);
            if len == 0 {
                return Err(ParseError::syntax(after.pos(), "expected a state id after `as`"));
            }
            (&after.text[..len], Some(description), after.tail(len))
        } else {
            let len = name_len(rest.text);
            if len == 0 {
                return Err(ParseError::syntax(pos, "expected a state id after `state`"));
            }
            (&rest.text[..len], None, rest.tail(len))
        };
        let id = id.to_string();

        match tail.text {
            "" => self.push(StateStmt::State(State {
                id,
                description,
                body: None,
                pos,
            })),
            "{" => {
                tracing::trace!(depth = self.open.len() + 1, id = %id, "open composite state");
                self.open.push(Frame {
                    id,
                    description,
                    pos,
                    statements: Vec::new(),
                });
            }
            "<<fork>>" => self.push(StateStmt::Fork(Pseudostate { id, pos })),
            "<<join>>" => self.push(StateStmt::Join(Pseudostate { id, pos })),
            "<<choice>>" => self.push(StateStmt::Choice(Pseudostate { id, pos })),
            marker if marker.starts_with("<<") => {
                return Err(ParseError::syntax(
                    tail.pos(),
                    format!("unknown state marker `{marker}`"),
                ));
            }
            text if text.starts_with(':') && description.is_none() => {
                self.push(StateStmt::State(State {
                    id,
                    description: label_of(&text[1..]),
                    body: None,
                    pos,
                }));
            }
            text => {
                return Err(ParseError::syntax(
                    tail.pos(),
                    format!("unexpected `{text}` after state `{id}`"),
                ));
            }
        }
        Ok(())
    }

    fn note(&mut self, line: &Line<'_>) -> Result<()> {
        let Some(caps) = note_regex().captures(line.text) else {
            return Err(ParseError::syntax(
                line.pos(),
                "malformed note; expected `note left of|right of <state>`",
            ));
        };
        let side = if &caps["side"] == "left" {
            NoteSide::Left
        } else {
            NoteSide::Right
        };
        let state = caps["state"].to_string();
        match caps.name("text") {
            Some(text) => self.push(StateStmt::Note(StateNote {
                side,
                state,
                text: text.as_str().trim().to_string(),
                pos: line.pos(),
            })),
            None => {
                self.note = Some(PendingNote {
                    side,
                    state,
                    lines: Vec::new(),
                    pos: line.pos(),
                });
            }
        }
        Ok(())
    }

    fn close(&mut self, pos: Position) -> Result<()> {
        let Some(frame) = self.open.pop() else {
            return Err(ParseError::unexpected("}", pos));
        };
        tracing::trace!(depth = self.open.len(), id = %frame.id, "close composite state");
        self.push(StateStmt::State(State {
            id: frame.id,
            description: frame.description,
            body: Some(frame.statements),
            pos: frame.pos,
        }));
        Ok(())
    }

    fn finish(self) -> Result<Vec<StateStmt>> {
        if let Some(note) = &self.note {
            return Err(ParseError::unclosed("note", note.pos));
        }
        if let Some(frame) = self.open.last() {
            return Err(ParseError::unclosed("state", frame.pos));
        }
        Ok(self.root)
    }
}

pub(crate) fn parse_with_header(source: &str, header: &Header<'_>) -> Result<StateDiagram> {
    let mut parser = StateParser::default();

    for (start, end) in split_statements(header.rest.text) {
        parser.statement(header.rest.slice(start, end))?;
    }
    for line in source_lines(source).skip(header.line.number) {
        if parser.note_line(&line) {
            continue;
        }
        if line.is_comment() {
            parser.push(StateStmt::Comment { pos: line.pos() });
            continue;
        }
        for (start, end) in split_statements(line.text) {
            parser.statement(line.slice(start, end))?;
        }
    }

    Ok(StateDiagram {
        keyword: header.keyword.to_string(),
        source: source.to_string(),
        pos: header.line.pos(),
        statements: parser.finish()?,
    })
}
