use std::rc::Rc;

use log::debug;

use crate::ast::{
    BinaryOperator, Expression, ExpressionKind, FunctionDecl, Program, Statement, StatementKind,
};
use crate::token::{Span, Token, TokenKind};

mod error;

pub use error::{ParseError, ParseResult};

/// Expression and block nesting allowed before [`ParseError::NestingTooDeep`].
pub const MAX_NESTING_DEPTH: usize = 256;

/// Recursive-descent parser with one token of lookahead.
///
/// Precedence, lowest first: assignment, equality, comparison, term, factor,
/// then postfix call/property chains over primaries.
pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    position: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(mut tokens: Vec<Token<'a>>) -> Self {
        if !matches!(tokens.last(), Some(token) if token.kind == TokenKind::EOF) {
            let span = tokens.last().map(|token| token.span).unwrap_or_default();
            tokens.push(Token::new(TokenKind::EOF, "", span));
        }
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    pub fn parse_program(mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::EOF) {
            statements.push(self.parse_declaration()?);
        }
        debug!("parsed {} top-level statements", statements.len());
        Ok(Program { statements })
    }

    fn parse_declaration(&mut self) -> ParseResult<Statement> {
        match self.current().kind {
            TokenKind::Function => self.parse_function_def(),
            TokenKind::Class => self.parse_class_def(),
            _ => self.parse_statement(),
        }
    }

    fn parse_function_def(&mut self) -> ParseResult<Statement> {
        let span = self.expect(TokenKind::Function, "'function'")?;
        let name = self.expect_identifier("function name")?;
        let decl = self.parse_function_rest(name, span)?;
        Ok(Statement::new(
            StatementKind::FunctionDef(Rc::new(decl)),
            span,
        ))
    }

    fn parse_class_def(&mut self) -> ParseResult<Statement> {
        let span = self.expect(TokenKind::Class, "'class'")?;
        let name = self.expect_identifier("class name")?;
        self.expect(TokenKind::LBrace, "'{'")?;

        let mut methods = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::EOF) {
            let method_span = self.current().span;
            let method_name = self.expect_identifier("method name")?;
            methods.push(Rc::new(self.parse_function_rest(method_name, method_span)?));
        }
        self.expect(TokenKind::RBrace, "'}'")?;

        Ok(Statement::new(StatementKind::ClassDef { name, methods }, span))
    }

    /// Parses `"(" params? ")" block` shared by functions and methods.
    fn parse_function_rest(&mut self, name: String, span: Span) -> ParseResult<FunctionDecl> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                params.push(self.expect_identifier("parameter name")?);
                if !self.advance_if(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.parse_block()?;
        Ok(FunctionDecl {
            name,
            params,
            body,
            span,
        })
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        let statement = match self.current().kind {
            TokenKind::If => self.parse_if()?,
            TokenKind::While => self.parse_while()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::Return => self.parse_return()?,
            TokenKind::Try => self.parse_try()?,
            TokenKind::LBrace => {
                let span = self.current().span;
                let body = self.parse_block()?;
                Statement::new(StatementKind::Block(body), span)
            }
            _ => {
                let expr = self.parse_expression()?;
                let span = expr.span;
                Statement::new(StatementKind::Expr(expr), span)
            }
        };
        // A trailing ';' is accepted after any statement, including blocks.
        self.advance_if(TokenKind::Semicolon);
        Ok(statement)
    }

    fn parse_if(&mut self) -> ParseResult<Statement> {
        let span = self.expect(TokenKind::If, "'if'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "')'")?;
        // Optional "in that case" phrase; purely cosmetic.
        if self.advance_if(TokenKind::In) {
            self.expect(TokenKind::That, "'that'")?;
            self.expect(TokenKind::Case, "'case'")?;
        }
        let then_body = self.parse_block()?;

        let else_branch = if self.advance_if(TokenKind::Else) {
            if self.check(TokenKind::If) {
                Some(Box::new(crate::grow_stack(|| self.parse_if())?))
            } else {
                let block_span = self.current().span;
                let body = self.parse_block()?;
                Some(Box::new(Statement::new(
                    StatementKind::Block(body),
                    block_span,
                )))
            }
        } else {
            None
        };

        Ok(Statement::new(
            StatementKind::If {
                condition,
                then_body,
                else_branch,
            },
            span,
        ))
    }

    fn parse_while(&mut self) -> ParseResult<Statement> {
        let span = self.expect(TokenKind::While, "'while'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.parse_block()?;
        Ok(Statement::new(
            StatementKind::While { condition, body },
            span,
        ))
    }

    fn parse_for(&mut self) -> ParseResult<Statement> {
        let span = self.expect(TokenKind::For, "'for'")?;
        let variable = self.expect_identifier("loop variable name")?;
        self.expect(TokenKind::In, "'in'")?;
        let iterable = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Statement::new(
            StatementKind::For {
                variable,
                iterable,
                body,
            },
            span,
        ))
    }

    fn parse_return(&mut self) -> ParseResult<Statement> {
        let span = self.expect(TokenKind::Return, "'return'")?;
        let value = if self.check(TokenKind::Semicolon)
            || self.check(TokenKind::RBrace)
            || self.check(TokenKind::EOF)
        {
            None
        } else {
            Some(self.parse_expression()?)
        };
        Ok(Statement::new(StatementKind::Return(value), span))
    }

    fn parse_try(&mut self) -> ParseResult<Statement> {
        let span = self.expect(TokenKind::Try, "'try'")?;
        let body = self.parse_block()?;
        self.expect(TokenKind::Catch, "'catch'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let catch_name = self.expect_identifier("catch variable name")?;
        self.expect(TokenKind::RParen, "')'")?;
        let catch_body = self.parse_block()?;
        Ok(Statement::new(
            StatementKind::Try {
                body,
                catch_name,
                catch_body,
            },
            span,
        ))
    }

    fn parse_block(&mut self) -> ParseResult<Vec<Statement>> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let statements = self.nested(|parser| {
            let mut statements = Vec::new();
            while !parser.check(TokenKind::RBrace) && !parser.check(TokenKind::EOF) {
                statements.push(parser.parse_declaration()?);
            }
            Ok(statements)
        })?;
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(statements)
    }

    pub(crate) fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.nested(Self::parse_assignment)
    }

    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                span: self.current().span,
            });
        }
        self.depth += 1;
        let result = crate::grow_stack(|| parse(self));
        self.depth -= 1;
        result
    }

    fn parse_assignment(&mut self) -> ParseResult<Expression> {
        let target = self.parse_equality()?;
        if !self.check(TokenKind::Equal) {
            return Ok(target);
        }

        let equal_span = self.advance().span;
        let value = Box::new(self.parse_expression()?);
        let span = target.span;
        let kind = match target.kind {
            ExpressionKind::Variable(name) => ExpressionKind::Assign { name, value },
            ExpressionKind::GetProperty { object, name } => ExpressionKind::SetProperty {
                object,
                name,
                value,
            },
            _ => return Err(ParseError::InvalidAssignmentTarget { span: equal_span }),
        };
        Ok(Expression::new(kind, span))
    }

    fn parse_equality(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_comparison()?;
        while let Some((op, span)) =
            self.match_operator(&[BinaryOperator::Equal, BinaryOperator::NotEqual])
        {
            let right = self.parse_comparison()?;
            expr = binary(expr, op, right, span);
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_term()?;
        while let Some((op, span)) =
            self.match_operator(&[BinaryOperator::Less, BinaryOperator::Greater])
        {
            let right = self.parse_term()?;
            expr = binary(expr, op, right, span);
        }
        Ok(expr)
    }

    fn parse_term(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_factor()?;
        while let Some((op, span)) =
            self.match_operator(&[BinaryOperator::Add, BinaryOperator::Sub])
        {
            let right = self.parse_factor()?;
            expr = binary(expr, op, right, span);
        }
        Ok(expr)
    }

    fn parse_factor(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_unary()?;
        while let Some((op, span)) = self.match_operator(&[
            BinaryOperator::Mul,
            BinaryOperator::Div,
            BinaryOperator::Rem,
        ]) {
            let right = self.parse_unary()?;
            expr = binary(expr, op, right, span);
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        self.parse_call()
    }

    fn parse_call(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.check(TokenKind::LParen) {
                let span = self.advance().span;
                let args = self.parse_arguments(TokenKind::RParen)?;
                self.expect(TokenKind::RParen, "')'")?;
                expr = Expression::new(
                    ExpressionKind::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    span,
                );
            } else if self.advance_if(TokenKind::Dot) {
                let span = self.current().span;
                let name = self.expect_identifier("property name after '.'")?;
                expr = Expression::new(
                    ExpressionKind::GetProperty {
                        object: Box::new(expr),
                        name,
                    },
                    span,
                );
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let span = self.current().span;
        let kind = match &self.current().kind {
            TokenKind::Number(text) => {
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ParseError::InvalidNumber {
                        literal: text.to_string(),
                        span,
                    })?;
                self.advance();
                ExpressionKind::Number(value)
            }
            TokenKind::String(value) => {
                let value = value.to_string();
                self.advance();
                ExpressionKind::String(value)
            }
            // Literal keywords desugar to plain values at parse time.
            TokenKind::True => {
                self.advance();
                ExpressionKind::Number(1.0)
            }
            TokenKind::False => {
                self.advance();
                ExpressionKind::Number(0.0)
            }
            TokenKind::Null => {
                self.advance();
                ExpressionKind::String("null".to_string())
            }
            TokenKind::This => {
                self.advance();
                ExpressionKind::This
            }
            TokenKind::Identifier(name) => {
                let name = name.to_string();
                self.advance();
                ExpressionKind::Variable(name)
            }
            TokenKind::New => {
                self.advance();
                let class_name = self.expect_identifier("class name after 'new'")?;
                self.expect(TokenKind::LParen, "'('")?;
                let args = self.parse_arguments(TokenKind::RParen)?;
                self.expect(TokenKind::RParen, "')'")?;
                ExpressionKind::New { class_name, args }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                return Ok(expr);
            }
            TokenKind::LBracket => {
                self.advance();
                let elements = self.parse_arguments(TokenKind::RBracket)?;
                self.expect(TokenKind::RBracket, "']'")?;
                ExpressionKind::List(elements)
            }
            _ => return Err(self.error("expression")),
        };
        Ok(Expression::new(kind, span))
    }

    fn parse_arguments(&mut self, closing: TokenKind<'static>) -> ParseResult<Vec<Expression>> {
        let mut args = Vec::new();
        if self.check(closing) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if !self.advance_if(TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }

    fn match_operator(&mut self, allowed: &[BinaryOperator]) -> Option<(BinaryOperator, Span)> {
        let op = match self.current().kind {
            TokenKind::Plus => BinaryOperator::Add,
            TokenKind::Minus => BinaryOperator::Sub,
            TokenKind::Star => BinaryOperator::Mul,
            TokenKind::Slash => BinaryOperator::Div,
            TokenKind::Percent => BinaryOperator::Rem,
            TokenKind::Less => BinaryOperator::Less,
            TokenKind::Greater => BinaryOperator::Greater,
            TokenKind::EqualEqual => BinaryOperator::Equal,
            TokenKind::BangEqual => BinaryOperator::NotEqual,
            _ => return None,
        };
        if !allowed.contains(&op) {
            return None;
        }
        let span = self.advance().span;
        Some((op, span))
    }

    fn expect_identifier(&mut self, expected: &str) -> ParseResult<String> {
        if let TokenKind::Identifier(name) = self.current().kind {
            let name = name.to_string();
            self.advance();
            Ok(name)
        } else {
            Err(self.error(expected))
        }
    }

    fn expect(&mut self, kind: TokenKind<'static>, expected: &str) -> ParseResult<Span> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(self.error(expected))
        }
    }

    fn check(&self, kind: TokenKind<'static>) -> bool {
        self.current().kind == kind
    }

    fn advance_if(&mut self, kind: TokenKind<'static>) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn current(&self) -> &Token<'a> {
        &self.tokens[self.position]
    }

    /// Moves past the current token; the trailing EOF is never consumed.
    fn advance(&mut self) -> &Token<'a> {
        let index = self.position;
        if index + 1 < self.tokens.len() {
            self.position += 1;
        }
        &self.tokens[index]
    }

    fn error(&self, expected: &str) -> ParseError {
        let token = self.current();
        ParseError::UnexpectedToken {
            found: token.to_string(),
            expected: expected.to_string(),
            span: token.span,
        }
    }
}

fn binary(left: Expression, op: BinaryOperator, right: Expression, span: Span) -> Expression {
    Expression::new(
        ExpressionKind::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}

pub fn parse_tokens(tokens: Vec<Token<'_>>) -> ParseResult<Program> {
    Parser::new(tokens).parse_program()
}
