use crate::Position;

pub type Result<T> = std::result::Result<T, ParseError>;

/// A grammar violation. Parsing aborts on the first one; no partial tree is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line 1, col 1: empty diagram source")]
    EmptySource,

    /// A block opener without its terminator, located at the opener.
    #[error("{pos}: unclosed `{keyword}` block")]
    UnclosedBlock { keyword: String, pos: Position },

    /// A terminator or branch keyword with no matching opener.
    #[error("{pos}: unexpected `{keyword}`")]
    UnexpectedTerminator { keyword: String, pos: Position },

    #[error("{pos}: {message}")]
    Syntax { message: String, pos: Position },
}

impl ParseError {
    pub fn syntax(pos: Position, message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
            pos,
        }
    }

    pub fn unclosed(keyword: impl Into<String>, pos: Position) -> Self {
        Self::UnclosedBlock {
            keyword: keyword.into(),
            pos,
        }
    }

    pub fn unexpected(keyword: impl Into<String>, pos: Position) -> Self {
        Self::UnexpectedTerminator {
            keyword: keyword.into(),
            pos,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Self::EmptySource => Position::start(),
            Self::UnclosedBlock { pos, .. }
            | Self::UnexpectedTerminator { pos, .. }
            | Self::Syntax { pos, .. } => *pos,
        }
    }
}
