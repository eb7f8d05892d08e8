use std::borrow::Cow;
use std::{iter::Peekable, str::CharIndices};

use log::debug;

use crate::token::{Span, Token, TokenKind};

mod error;

pub use error::{LexError, LexResult};

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    eof_reached: bool,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            eof_reached: false,
            line: 1,
            column: 1,
        }
    }

    pub fn next_token(&mut self) -> LexResult<Token<'a>> {
        self.skip_trivia();

        let Some(&(start_idx, ch)) = self.chars.peek() else {
            self.eof_reached = true;
            let index = self.input.len();
            return Ok(Token::new(
                TokenKind::EOF,
                "",
                Span::new(index, index, self.line, self.column),
            ));
        };

        let start_line = self.line;
        let start_column = self.column;
        let kind = match ch {
            '"' => return self.read_string(start_idx, start_line, start_column),
            c if c.is_ascii_alphabetic() || c == '_' => {
                return Ok(self.read_identifier(start_idx, start_line, start_column));
            }
            c if c.is_ascii_digit() => {
                return Ok(self.read_number(start_idx, start_line, start_column));
            }
            '=' => {
                self.advance_char();
                if self.advance_if('=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                }
            }
            '!' => {
                self.advance_char();
                if !self.advance_if('=') {
                    return Err(LexError::LoneBang {
                        line: start_line,
                        column: start_column,
                    });
                }
                TokenKind::BangEqual
            }
            other => {
                let Some(kind) = single_char_kind(other) else {
                    return Err(LexError::UnexpectedCharacter {
                        character: other,
                        line: start_line,
                        column: start_column,
                    });
                };
                self.advance_char();
                kind
            }
        };

        let end_idx = self.current_index();
        Ok(Token::new(
            kind,
            &self.input[start_idx..end_idx],
            Span::new(start_idx, end_idx, start_line, start_column),
        ))
    }

    /// Skips whitespace and `//` / `->` line comments.
    fn skip_trivia(&mut self) {
        while let Some(&(idx, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.advance_char();
                continue;
            }
            let rest = &self.input[idx..];
            if rest.starts_with("//") || rest.starts_with("->") {
                while let Some(&(_, c)) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance_char();
                }
                continue;
            }
            break;
        }
    }

    fn read_identifier(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_char(); // Consume first char
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance_char();
            } else {
                break;
            }
        }

        let end_idx = self.current_index();
        let ident = &self.input[start..end_idx];
        let kind = TokenKind::keyword(ident).unwrap_or(TokenKind::Identifier(ident));
        Token::new(kind, ident, Span::new(start, end_idx, line, column))
    }

    fn read_number(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_char(); // Consume first digit
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() || c == '.' {
                self.advance_char();
            } else {
                break;
            }
        }

        let end_idx = self.current_index();
        let text = &self.input[start..end_idx];
        Token::new(
            TokenKind::Number(text),
            text,
            Span::new(start, end_idx, line, column),
        )
    }

    fn read_string(&mut self, start: usize, line: usize, column: usize) -> LexResult<Token<'a>> {
        self.advance_char(); // Consume opening quote
        let content_start = start + 1;
        // Stays borrowed until the first escape forces an owned copy.
        let mut owned: Option<String> = None;

        while let Some((idx, c)) = self.advance_char() {
            match c {
                '"' => {
                    let end_idx = idx + 1;
                    let value = match owned {
                        Some(value) => Cow::Owned(value),
                        None => Cow::Borrowed(&self.input[content_start..idx]),
                    };
                    return Ok(Token::new(
                        TokenKind::String(value),
                        &self.input[start..end_idx],
                        Span::new(start, end_idx, line, column),
                    ));
                }
                '\\' => {
                    let escape_line = self.line;
                    let escape_column = self.column - 1;
                    let buffer =
                        owned.get_or_insert_with(|| self.input[content_start..idx].to_string());
                    let Some((_, escaped)) = self.chars.next() else {
                        break;
                    };
                    let resolved = match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '\\' => '\\',
                        '"' => '"',
                        other => {
                            return Err(LexError::InvalidEscape {
                                escape: other,
                                line: escape_line,
                                column: escape_column,
                            });
                        }
                    };
                    self.column += 1;
                    buffer.push(resolved);
                }
                other => {
                    if let Some(buffer) = owned.as_mut() {
                        buffer.push(other);
                    }
                }
            }
        }

        Err(LexError::UnterminatedString { line, column })
    }
}

fn single_char_kind(c: char) -> Option<TokenKind<'static>> {
    let kind = match c {
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Star,
        '/' => TokenKind::Slash,
        '%' => TokenKind::Percent,
        '<' => TokenKind::Less,
        '>' => TokenKind::Greater,
        ',' => TokenKind::Comma,
        '.' => TokenKind::Dot,
        ';' => TokenKind::Semicolon,
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        '[' => TokenKind::LBracket,
        ']' => TokenKind::RBracket,
        '{' => TokenKind::LBrace,
        '}' => TokenKind::RBrace,
        _ => return None,
    };
    Some(kind)
}

impl<'a> Iterator for Lexer<'a> {
    type Item = LexResult<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.eof_reached {
            return None;
        }
        Some(self.next_token())
    }
}

impl<'a> Lexer<'a> {
    fn advance_char(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((_, c)) = next {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        next
    }

    fn advance_if(&mut self, expected: char) -> bool {
        if matches!(self.chars.peek(), Some(&(_, c)) if c == expected) {
            self.advance_char();
            true
        } else {
            false
        }
    }

    fn current_index(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }
}

pub fn tokenize(input: &str) -> LexResult<Vec<Token<'_>>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = matches!(token.kind, TokenKind::EOF);
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    debug!("tokenized {} bytes into {} tokens", input.len(), tokens.len());
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn kinds(input: &str) -> Vec<TokenKind<'_>> {
        tokenize(input)
            .expect("tokenize should succeed")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_simple_program() {
        let input = indoc! {r#"
            function greet(name) {
                output("hi " + name);
            }
            greet("bob")
        "#};
        let expected_tokens = vec![
            TokenKind::Function,
            TokenKind::Identifier("greet"),
            TokenKind::LParen,
            TokenKind::Identifier("name"),
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::Identifier("output"),
            TokenKind::LParen,
            TokenKind::String(Cow::Borrowed("hi ")),
            TokenKind::Plus,
            TokenKind::Identifier("name"),
            TokenKind::RParen,
            TokenKind::Semicolon,
            TokenKind::RBrace,
            TokenKind::Identifier("greet"),
            TokenKind::LParen,
            TokenKind::String(Cow::Borrowed("bob")),
            TokenKind::RParen,
            TokenKind::EOF,
        ];
        assert_eq!(kinds(input), expected_tokens);
    }

    #[test]
    fn classifies_keywords_and_two_char_operators() {
        assert_eq!(
            kinds("if (a != b) in that case { } else x == y"),
            vec![
                TokenKind::If,
                TokenKind::LParen,
                TokenKind::Identifier("a"),
                TokenKind::BangEqual,
                TokenKind::Identifier("b"),
                TokenKind::RParen,
                TokenKind::In,
                TokenKind::That,
                TokenKind::Case,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Else,
                TokenKind::Identifier("x"),
                TokenKind::EqualEqual,
                TokenKind::Identifier("y"),
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn tracks_line_and_column_of_each_token() {
        let input = "x = 1\n  foo(\"a\nb\") y";
        let tokens = tokenize(input).expect("tokenize should succeed");
        let positions = tokens
            .iter()
            .map(|token| (token.lexeme, token.span.line, token.span.column))
            .collect::<Vec<_>>();
        assert_eq!(
            positions,
            vec![
                ("x", 1, 1),
                ("=", 1, 3),
                ("1", 1, 5),
                ("foo", 2, 3),
                ("(", 2, 6),
                ("\"a\nb\"", 2, 7),
                (")", 3, 3),
                ("y", 3, 5),
                ("", 3, 6),
            ]
        );
    }

    #[test]
    fn skips_both_comment_forms() {
        let input = indoc! {"
            // leading comment
            a -> trailing arrow comment
            b - c // minus survives
        "};
        assert_eq!(
            kinds(input),
            vec![
                TokenKind::Identifier("a"),
                TokenKind::Identifier("b"),
                TokenKind::Minus,
                TokenKind::Identifier("c"),
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn resolves_string_escapes() {
        let tokens = tokenize(r#""tab\tquote\"slash\\nl\n""#).expect("tokenize should succeed");
        assert_eq!(
            tokens[0].kind,
            TokenKind::String(Cow::Owned("tab\tquote\"slash\\nl\n".to_string()))
        );
    }

    #[test]
    fn keeps_malformed_number_text_for_the_parser() {
        assert_eq!(
            kinds("1.2.3 42"),
            vec![
                TokenKind::Number("1.2.3"),
                TokenKind::Number("42"),
                TokenKind::EOF
            ]
        );
    }

    #[test]
    fn carriage_returns_are_whitespace() {
        assert_eq!(
            kinds("a\r\nb"),
            vec![
                TokenKind::Identifier("a"),
                TokenKind::Identifier("b"),
                TokenKind::EOF
            ]
        );
    }

    #[test]
    fn errors_on_invalid_character() {
        let err = tokenize("x = 1 @ 2\n").expect_err("expected lexing failure");
        assert_eq!(
            err,
            LexError::UnexpectedCharacter {
                character: '@',
                line: 1,
                column: 7
            }
        );
        assert!(err.to_string().contains("Unexpected character '@'"));
    }

    #[test]
    fn errors_on_lone_bang() {
        let err = tokenize("\n  !x").expect_err("expected lexing failure");
        assert_eq!(err, LexError::LoneBang { line: 2, column: 3 });
    }

    #[test]
    fn errors_on_unterminated_string() {
        let err = tokenize("a = \"open\nstill open").expect_err("expected lexing failure");
        assert_eq!(err, LexError::UnterminatedString { line: 1, column: 5 });
    }

    #[test]
    fn errors_on_invalid_escape() {
        let err = tokenize(r#"s = "bad\q""#).expect_err("expected lexing failure");
        assert_eq!(
            err,
            LexError::InvalidEscape {
                escape: 'q',
                line: 1,
                column: 9
            }
        );
    }
}
