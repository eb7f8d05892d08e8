use thiserror::Error;

use crate::token::Span;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected token: '{found}'. Expected: {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        span: Span,
    },
    #[error("Invalid assignment target")]
    InvalidAssignmentTarget { span: Span },
    #[error("Invalid number literal '{literal}'")]
    InvalidNumber { literal: String, span: Span },
    #[error("Nesting exceeds the limit of {limit} levels")]
    NestingTooDeep { limit: usize, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::InvalidAssignmentTarget { span }
            | ParseError::InvalidNumber { span, .. }
            | ParseError::NestingTooDeep { span, .. } => *span,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
