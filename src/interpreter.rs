use std::io::{self, BufRead, Write};
use std::time::Duration;

use log::debug;

use crate::ast::Program;
use crate::builtins::{self, BuiltinFunction, NativeFn};
use crate::diagnostic::Diagnostic;
use crate::runtime::{CallContext, RuntimeError, Value};

mod environment;
mod eval;

pub use environment::Environment;

use eval::Signal;

/// Nested user-function calls allowed before [`RuntimeError::RecursionLimit`].
pub const DEFAULT_RECURSION_LIMIT: usize = 256;

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const HTTP_TOTAL_TIMEOUT: Duration = Duration::from_secs(30);

/// How evaluation of a program ended.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// The last top-level statement's value.
    Value(Value),
    /// A top-level `return` ended the program early.
    Return(Value),
    /// An error reached the top level uncaught.
    Error(Diagnostic),
}

enum Output {
    Stdout,
    Captured(String),
}

/// AST-walking evaluator with a persistent global scope.
///
/// Builtins from [`builtins::standard_library`] are registered on
/// construction; more can be added with [`Interpreter::register_builtin`].
pub struct Interpreter {
    environment: Environment,
    output: Output,
    input: Box<dyn BufRead>,
    http: Option<ureq::Agent>,
    call_depth: usize,
    recursion_limit: usize,
}

impl Interpreter {
    /// Interpreter writing to stdout and reading from stdin.
    pub fn new() -> Self {
        Self::with_output(Output::Stdout)
    }

    /// Interpreter that buffers script output; see [`Interpreter::take_output`].
    pub fn capturing() -> Self {
        Self::with_output(Output::Captured(String::new()))
    }

    fn with_output(output: Output) -> Self {
        let mut interpreter = Self {
            environment: Environment::new(),
            output,
            input: Box::new(io::BufReader::new(io::stdin())),
            http: None,
            call_depth: 0,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        };
        for builtin in builtins::standard_library() {
            interpreter.install(builtin);
        }
        interpreter
    }

    pub fn with_input(mut self, input: impl BufRead + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Binds a host function under `name` in the global scope.
    pub fn register_builtin(&mut self, name: &str, function: NativeFn) {
        self.install(BuiltinFunction::new(name, function));
    }

    fn install(&mut self, builtin: BuiltinFunction) {
        let name = builtin.name().to_string();
        self.environment.define(name, Value::Builtin(builtin));
    }

    /// Looks up a global binding, e.g. to inspect state after a run.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.environment.lookup(name).ok()
    }

    /// Evaluates `program` in the global scope. State persists across calls.
    pub fn evaluate(&mut self, program: &Program) -> Outcome {
        debug!("evaluating {} top-level statements", program.statements.len());
        match self.execute_sequence(&program.statements) {
            Ok(value) => Outcome::Value(value),
            Err(Signal::Return(value)) => Outcome::Return(value),
            Err(Signal::Error(diagnostic)) => Outcome::Error(diagnostic),
        }
    }

    /// Like [`Interpreter::evaluate`], treating a top-level `return` as the result.
    pub fn run(&mut self, program: &Program) -> Result<Value, Diagnostic> {
        match self.evaluate(program) {
            Outcome::Value(value) | Outcome::Return(value) => Ok(value),
            Outcome::Error(diagnostic) => Err(diagnostic),
        }
    }

    /// Drains captured output. Always empty for a stdout interpreter.
    pub fn take_output(&mut self) -> String {
        match &mut self.output {
            Output::Stdout => String::new(),
            Output::Captured(buffer) => std::mem::take(buffer),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn console_error(error: io::Error) -> RuntimeError {
    RuntimeError::builtin("output", error)
}

impl CallContext for Interpreter {
    fn write_line(&mut self, text: &str) -> Result<(), RuntimeError> {
        match &mut self.output {
            Output::Stdout => writeln!(io::stdout().lock(), "{text}").map_err(console_error),
            Output::Captured(buffer) => {
                buffer.push_str(text);
                buffer.push('\n');
                Ok(())
            }
        }
    }

    fn write(&mut self, text: &str) -> Result<(), RuntimeError> {
        match &mut self.output {
            Output::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(text.as_bytes()).map_err(console_error)?;
                stdout.flush().map_err(console_error)
            }
            Output::Captured(buffer) => {
                buffer.push_str(text);
                Ok(())
            }
        }
    }

    fn read_line(&mut self) -> Result<Option<String>, RuntimeError> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|error| RuntimeError::builtin("input", error))?;
        if read == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn http_agent(&mut self) -> &ureq::Agent {
        self.http.get_or_insert_with(|| {
            ureq::AgentBuilder::new()
                .timeout_connect(HTTP_CONNECT_TIMEOUT)
                .timeout(HTTP_TOTAL_TIMEOUT)
                .build()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::diagnostic::DiagnosticKind;
    use crate::lexer::tokenize;
    use crate::parser::parse_tokens;

    fn parse(source: &str) -> Program {
        parse_tokens(tokenize(source).expect("tokenize failed")).expect("parse failed")
    }

    #[test]
    fn captures_output_until_taken() {
        let mut interpreter = Interpreter::capturing();
        interpreter
            .run(&parse("output(\"a\"); print(1, 2);"))
            .expect("run failed");
        assert_eq!(interpreter.take_output(), "a\n1 2\n");
        assert_eq!(interpreter.take_output(), "");
    }

    #[test]
    fn globals_persist_between_runs() {
        let mut interpreter = Interpreter::capturing();
        interpreter.run(&parse("x = 41")).expect("run failed");
        let value = interpreter.run(&parse("x + 1")).expect("run failed");
        assert_eq!(value, Value::Number(42.0));
        assert_eq!(interpreter.global("x"), Some(Value::Number(41.0)));
    }

    #[test]
    fn reads_input_from_the_configured_reader() {
        let mut interpreter =
            Interpreter::capturing().with_input(Cursor::new("first\r\nsecond\n"));
        interpreter
            .run(&parse("a = input(\"> \"); b = input(); c = input(); output(a, b, len(c))"))
            .expect("run failed");
        assert_eq!(interpreter.take_output(), "> first second 0\n");
    }

    #[test]
    fn registered_builtins_are_callable_from_scripts() {
        fn double(_: &mut dyn CallContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
            RuntimeError::expect_arity("double", 1, args.len())?;
            let value = builtins::number_arg("double", &args, 0)?;
            Ok(Value::Number(value * 2.0))
        }

        let mut interpreter = Interpreter::capturing();
        interpreter.register_builtin("double", double);
        let value = interpreter.run(&parse("double(21)")).expect("run failed");
        assert_eq!(value, Value::Number(42.0));

        let err = interpreter
            .run(&parse("\n  double(\"x\")"))
            .expect_err("type error");
        assert_eq!(err.kind, DiagnosticKind::Runtime);
        assert_eq!(
            err.message,
            "Function 'double' expects a number at argument 1, got string"
        );
        assert_eq!((err.line, err.column), (2, 9));
    }

    #[test]
    fn outcome_distinguishes_top_level_return() {
        let mut interpreter = Interpreter::capturing();
        assert_eq!(
            interpreter.evaluate(&parse("1; 2")),
            Outcome::Value(Value::Number(2.0))
        );
        assert_eq!(
            interpreter.evaluate(&parse("return 3; output(\"unreached\")")),
            Outcome::Return(Value::Number(3.0))
        );
        assert_eq!(interpreter.take_output(), "");
        assert!(matches!(
            interpreter.evaluate(&parse("missing")),
            Outcome::Error(Diagnostic { kind: DiagnosticKind::Runtime, .. })
        ));
    }
}
