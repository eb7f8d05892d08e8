use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },
    #[error("Undefined property '{property}' for type {type_name}")]
    UndefinedProperty {
        property: String,
        type_name: String,
    },
    #[error("Cannot set property '{property}' on value of type {type_name}")]
    PropertyOnNonInstance {
        property: String,
        type_name: String,
    },
    #[error("Object of type {type_name} is not callable")]
    NotCallable { type_name: String },
    #[error("'{name}' is not a class")]
    NotAClass { name: String },
    #[error("'this' used outside of a method")]
    ThisOutsideMethod,
    #[error("Invalid binary operation: {left} {op} {right}")]
    InvalidBinaryOperation {
        op: &'static str,
        left: String,
        right: String,
    },
    #[error("Cannot iterate over value of type {type_name}")]
    NotIterable { type_name: String },
    #[error("Function '{name}' expected {expected} arguments, got {found}")]
    ArityMismatch {
        name: String,
        expected: String,
        found: usize,
    },
    #[error("Function '{name}' expects {expected} at argument {position}, got {got}")]
    InvalidArgumentType {
        name: String,
        position: usize,
        expected: &'static str,
        got: String,
    },
    #[error("Function '{name}': cannot pop from an empty list")]
    PopFromEmptyList { name: String },
    #[error("Maximum call depth of {limit} exceeded")]
    RecursionLimit { limit: usize },
    #[error("Function '{name}' failed: {message}")]
    Builtin { name: String, message: String },
}

impl RuntimeError {
    pub fn expect_arity(name: &str, expected: usize, found: usize) -> Result<(), RuntimeError> {
        if expected != found {
            return Err(RuntimeError::ArityMismatch {
                name: name.to_string(),
                expected: expected.to_string(),
                found,
            });
        }
        Ok(())
    }

    pub fn expect_arity_range(
        name: &str,
        min: usize,
        max: usize,
        found: usize,
    ) -> Result<(), RuntimeError> {
        if found < min || found > max {
            return Err(RuntimeError::ArityMismatch {
                name: name.to_string(),
                expected: format!("{min} to {max}"),
                found,
            });
        }
        Ok(())
    }

    pub fn builtin(name: &str, message: impl ToString) -> Self {
        RuntimeError::Builtin {
            name: name.to_string(),
            message: message.to_string(),
        }
    }
}
