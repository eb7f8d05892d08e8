//! A tree-walking interpreter for the ulang scripting language.
//!
//! Source text flows through [`lexer::tokenize`], [`parser::parse_tokens`]
//! and finally [`interpreter::Interpreter`]. Failures at every stage are
//! reported as a [`diagnostic::Diagnostic`] carrying the line and column
//! of the construct that failed.

pub mod ast;
pub mod builtins;
pub mod diagnostic;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod token;

use diagnostic::Diagnostic;
use interpreter::Interpreter;
use runtime::Value;

const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Runs `f`, switching to a fresh stack segment when the current one is
/// nearly exhausted. Wraps every recursive step of the parser and evaluator.
pub(crate) fn grow_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, f)
}

pub fn parse_source(source: &str) -> Result<ast::Program, Diagnostic> {
    let tokens = lexer::tokenize(source)?;
    Ok(parser::parse_tokens(tokens)?)
}

/// Runs a script against stdin and stdout.
pub fn run_source(source: &str) -> Result<Value, Diagnostic> {
    let program = parse_source(source)?;
    Interpreter::new().run(&program)
}

/// Runs a script with captured output, returning whatever was printed
/// before the run finished or failed.
pub fn run_source_captured(source: &str, stdin: &str) -> (String, Result<Value, Diagnostic>) {
    let program = match parse_source(source) {
        Ok(program) => program,
        Err(diagnostic) => return (String::new(), Err(diagnostic)),
    };
    let mut interpreter =
        Interpreter::capturing().with_input(std::io::Cursor::new(stdin.to_string()));
    let result = interpreter.run(&program);
    (interpreter.take_output(), result)
}
