use super::ast::{
    Activation, ActivationKind, Block, BlockKind, BoxGroup, Branch, Message, MessageArrow, Note,
    NotePlacement, Participant, ParticipantKind, SeqStmt, SequenceDiagram,
};
use crate::detect::Header;
use crate::utils::{Line, source_lines, split_statements};
use crate::{ParseError, Position, Result};
use regex::Regex;

fn message_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<from>.+?)\s*(?P<arrow><<-->>|<<->>|-->>|->>|-->|->|--x|-x|--\)|-\))\s*(?P<act>[+-])?\s*(?P<to>[^:<>+\-\s][^:]*?)\s*(?::(?P<text>.*))?$",
        )
        .expect("valid regex")
    })
}

fn participant_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<create>create\s+)?(?P<kind>participant|actor)\s+(?P<id>.+?)(?:\s+as\s+(?P<alias>.+))?$",
        )
        .expect("valid regex")
    })
}

fn note_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^note\s+(?P<place>left\s+of|right\s+of|over)\s+(?P<who>[^:]+?)\s*:(?P<text>.*)$",
        )
        .expect("valid regex")
    })
}

#[derive(Debug)]
enum Opener {
    Block {
        kind: BlockKind,
        label: Option<String>,
        pos: Position,
    },
    Box {
        label: Option<String>,
        pos: Position,
    },
}

#[derive(Debug)]
struct Frame {
    opener: Opener,
    statements: Vec<SeqStmt>,
    branches: Vec<Branch>,
}

impl Frame {
    fn new(opener: Opener) -> Self {
        Self {
            opener,
            statements: Vec::new(),
            branches: Vec::new(),
        }
    }

    /// Statements land in the latest branch once one has been opened.
    fn target(&mut self) -> &mut Vec<SeqStmt> {
        match self.branches.last_mut() {
            Some(branch) => &mut branch.statements,
            None => &mut self.statements,
        }
    }

    fn keyword(&self) -> &'static str {
        match &self.opener {
            Opener::Block { kind, .. } => kind.keyword(),
            Opener::Box { .. } => "box",
        }
    }

    fn pos(&self) -> Position {
        match &self.opener {
            Opener::Block { pos, .. } | Opener::Box { pos, .. } => *pos,
        }
    }
}

#[derive(Debug, Default)]
struct SeqParser {
    root: Vec<SeqStmt>,
    open: Vec<Frame>,
}

fn optional_text(line: &Line<'_>) -> Option<String> {
    (!line.is_blank()).then(|| line.text.to_string())
}

impl SeqParser {
    fn push(&mut self, stmt: SeqStmt) {
        match self.open.last_mut() {
            Some(frame) => frame.target().push(stmt),
            None => self.root.push(stmt),
        }
    }

    fn open_frame(&mut self, opener: Opener) {
        tracing::trace!(depth = self.open.len() + 1, ?opener, "open sequence block");
        self.open.push(Frame::new(opener));
    }

    fn statement(&mut self, line: Line<'_>) -> Result<()> {
        if line.is_blank() {
            return Ok(());
        }
        let pos = line.pos();
        let (word, rest) = line.first_word();

        if let Some(kind) = BlockKind::from_keyword(word) {
            self.open_frame(Opener::Block {
                kind,
                label: optional_text(&rest),
                pos,
            });
            return Ok(());
        }

        match word {
            "end" => self.close(pos),
            "else" | "and" | "option" => self.branch(word, optional_text(&rest), pos),
            "box" => {
                self.open_frame(Opener::Box {
                    label: optional_text(&rest),
                    pos,
                });
                Ok(())
            }
            "participant" | "actor" | "create" => self.participant(&line),
            "activate" | "deactivate" => {
                let (participant, _) = rest.first_word();
                if participant.is_empty() {
                    return Err(ParseError::syntax(
                        pos,
                        format!("`{word}` requires a participant"),
                    ));
                }
                let kind = if word == "activate" {
                    ActivationKind::Activate
                } else {
                    ActivationKind::Deactivate
                };
                self.push(SeqStmt::Activation(Activation {
                    participant: participant.to_string(),
                    kind,
                    pos,
                }));
                Ok(())
            }
            "autonumber" => {
                self.push(SeqStmt::Autonumber { pos });
                Ok(())
            }
            _ if word.eq_ignore_ascii_case("note") => self.note(&line),
            _ => self.message(&line),
        }
    }

    fn close(&mut self, pos: Position) -> Result<()> {
        let Some(frame) = self.open.pop() else {
            return Err(ParseError::unexpected("end", pos));
        };
        tracing::trace!(depth = self.open.len(), keyword = frame.keyword(), "close sequence block");
        let stmt = match frame.opener {
            Opener::Block { kind, label, pos } => SeqStmt::Block(Block {
                kind,
                label,
                statements: frame.statements,
                branches: frame.branches,
                pos,
            }),
            Opener::Box { label, pos } => SeqStmt::Box(BoxGroup {
                label,
                statements: frame.statements,
                pos,
            }),
        };
        self.push(stmt);
        Ok(())
    }

    fn branch(&mut self, keyword: &str, label: Option<String>, pos: Position) -> Result<()> {
        let Some(frame) = self.open.last_mut() else {
            return Err(ParseError::unexpected(keyword, pos));
        };
        match &frame.opener {
            Opener::Block { kind, .. } if kind.branch_keyword() == Some(keyword) => {
                frame.branches.push(Branch {
                    label,
                    statements: Vec::new(),
                    pos,
                });
                Ok(())
            }
            _ => Err(ParseError::unexpected(keyword, pos)),
        }
    }

    fn participant(&mut self, line: &Line<'_>) -> Result<()> {
        let Some(caps) = participant_regex().captures(line.text) else {
            return Err(ParseError::syntax(
                line.pos(),
                "expected `participant <id> [as <alias>]` or `actor <id> [as <alias>]`",
            ));
        };
        let kind = if &caps["kind"] == "actor" {
            ParticipantKind::Actor
        } else {
            ParticipantKind::Participant
        };
        self.push(SeqStmt::Participant(Participant {
            id: caps["id"].trim().to_string(),
            alias: caps.name("alias").map(|m| m.as_str().trim().to_string()),
            kind,
            created: caps.name("create").is_some(),
            pos: line.pos(),
        }));
        Ok(())
    }

    fn note(&mut self, line: &Line<'_>) -> Result<()> {
        let Some(caps) = note_regex().captures(line.text) else {
            return Err(ParseError::syntax(
                line.pos(),
                "malformed note; expected `note left of|right of|over <participant>: <text>`",
            ));
        };
        let place = caps["place"].to_ascii_lowercase();
        let placement = if place.starts_with("left") {
            NotePlacement::LeftOf
        } else if place.starts_with("right") {
            NotePlacement::RightOf
        } else {
            NotePlacement::Over
        };
        let participants: Vec<String> = caps["who"]
            .split(',')
            .map(|p| p.trim().to_string())
            .collect();
        if participants.iter().any(String::is_empty) {
            return Err(ParseError::syntax(line.pos(), "note names an empty participant"));
        }
        self.push(SeqStmt::Note(Note {
            placement,
            participants,
            text: caps["text"].trim().to_string(),
            pos: line.pos(),
        }));
        Ok(())
    }

    fn message(&mut self, line: &Line<'_>) -> Result<()> {
        let Some(caps) = message_regex().captures(line.text) else {
            if line.text.contains("->") || line.text.contains("-)") {
                return Err(ParseError::syntax(
                    line.pos(),
                    format!("malformed message `{}`", line.text),
                ));
            }
            self.push(SeqStmt::Unknown {
                text: line.text.to_string(),
                pos: line.pos(),
            });
            return Ok(());
        };
        let Some(arrow) = MessageArrow::from_token(&caps["arrow"]) else {
            return Err(ParseError::syntax(line.pos(), "unrecognized message arrow"));
        };
        let activation = caps.name("act").map(|m| {
            if m.as_str() == "+" {
                ActivationKind::Activate
            } else {
                ActivationKind::Deactivate
            }
        });
        self.push(SeqStmt::Message(Message {
            from: caps["from"].trim().to_string(),
            to: caps["to"].trim().to_string(),
            arrow,
            activation,
            text: caps.name("text").map(|m| m.as_str().trim().to_string()),
            pos: line.pos(),
        }));
        Ok(())
    }

    fn finish(self) -> Result<Vec<SeqStmt>> {
        if let Some(frame) = self.open.last() {
            return Err(ParseError::unclosed(frame.keyword(), frame.pos()));
        }
        Ok(self.root)
    }
}

pub(crate) fn parse_with_header(source: &str, header: &Header<'_>) -> Result<SequenceDiagram> {
    let mut parser = SeqParser::default();

    for (start, end) in split_statements(header.rest.text) {
        parser.statement(header.rest.slice(start, end))?;
    }
    for line in source_lines(source).skip(header.line.number) {
        if line.is_comment() {
            parser.push(SeqStmt::Comment { pos: line.pos() });
            continue;
        }
        for (start, end) in split_statements(line.text) {
            parser.statement(line.slice(start, end))?;
        }
    }

    Ok(SequenceDiagram {
        source: source.to_string(),
        pos: header.line.pos(),
        statements: parser.finish()?,
    })
}
