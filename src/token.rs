use std::borrow::Cow;
use std::fmt;

/// Source location of a token or syntax node.
///
/// `start`/`end` are byte offsets into the source; `line` and `column` are
/// 1-based and point at the first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    Identifier(&'a str),
    /// Raw digits-and-dots text; validated by the parser.
    Number(&'a str),
    /// String contents with escapes already resolved.
    String(Cow<'a, str>),

    // Keywords
    If,
    Else,
    While,
    For,
    In,
    That,
    Case,
    Class,
    This,
    New,
    Function,
    Return,
    Try,
    Catch,
    Null,
    True,
    False,

    // Operators
    Equal,      // =
    EqualEqual, // ==
    BangEqual,  // !=
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    Less,       // <
    Greater,    // >

    // Delimiters
    Comma,     // ,
    Dot,       // .
    Semicolon, // ;
    LParen,    // (
    RParen,    // )
    LBracket,  // [
    RBracket,  // ]
    LBrace,    // {
    RBrace,    // }

    EOF,
}

impl TokenKind<'_> {
    pub(crate) fn keyword(ident: &str) -> Option<TokenKind<'static>> {
        let kind = match ident {
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "in" => TokenKind::In,
            "that" => TokenKind::That,
            "case" => TokenKind::Case,
            "class" => TokenKind::Class,
            "this" => TokenKind::This,
            "new" => TokenKind::New,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            "try" => TokenKind::Try,
            "catch" => TokenKind::Catch,
            "null" => TokenKind::Null,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    /// Exact source slice the token was read from (quotes included for strings).
    pub lexeme: &'a str,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind<'a>, lexeme: &'a str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if matches!(self.kind, TokenKind::EOF) {
            f.write_str("end of input")
        } else {
            f.write_str(self.lexeme)
        }
    }
}
