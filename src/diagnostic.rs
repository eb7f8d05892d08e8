use std::fmt;

use thiserror::Error;

use crate::lexer::LexError;
use crate::parser::ParseError;
use crate::runtime::error::RuntimeError;
use crate::token::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lex,
    Parse,
    Runtime,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticKind::Lex => "Lexer",
            DiagnosticKind::Parse => "Parser",
            DiagnosticKind::Runtime => "Runtime",
        })
    }
}

/// A reportable failure with the position it was raised at.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("ERROR [{kind}] Line {line}, Column {column}: {message}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            line: span.line,
            column: span.column,
        }
    }

    pub fn runtime(error: RuntimeError, span: Span) -> Self {
        Self::new(DiagnosticKind::Runtime, error.to_string(), span)
    }
}

impl From<LexError> for Diagnostic {
    fn from(error: LexError) -> Self {
        let (line, column) = error.position();
        Self {
            kind: DiagnosticKind::Lex,
            message: error.to_string(),
            line,
            column,
        }
    }
}

impl From<ParseError> for Diagnostic {
    fn from(error: ParseError) -> Self {
        Self::new(DiagnosticKind::Parse, error.to_string(), error.span())
    }
}
