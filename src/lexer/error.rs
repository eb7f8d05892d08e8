use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unexpected character '{character}'")]
    UnexpectedCharacter {
        character: char,
        line: usize,
        column: usize,
    },
    #[error("Unterminated string literal")]
    UnterminatedString { line: usize, column: usize },
    #[error("Invalid escape sequence '\\{escape}' in string literal")]
    InvalidEscape {
        escape: char,
        line: usize,
        column: usize,
    },
    #[error("Unknown operator '!'. Only '!=' is supported")]
    LoneBang { line: usize, column: usize },
}

impl LexError {
    /// Line and column of the offending character.
    pub fn position(&self) -> (usize, usize) {
        match *self {
            LexError::UnexpectedCharacter { line, column, .. }
            | LexError::UnterminatedString { line, column }
            | LexError::InvalidEscape { line, column, .. }
            | LexError::LoneBang { line, column } => (line, column),
        }
    }
}

pub type LexResult<T> = Result<T, LexError>;
