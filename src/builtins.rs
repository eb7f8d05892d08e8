//! Host functions installed into the global scope before a script runs.
//!
//! Each builtin is a plain function pointer over [`CallContext`], so the
//! library never depends on the concrete interpreter. Argument helpers in
//! this module produce the uniform arity and type messages every builtin
//! reports.

use std::fmt;
use std::rc::Rc;

use crate::runtime::{CallContext, ListRef, RuntimeError, Value};

mod console;
mod list;
mod math;
mod net;
mod string;

pub type NativeFn = fn(&mut dyn CallContext, Vec<Value>) -> Result<Value, RuntimeError>;

/// A named host function callable from scripts.
#[derive(Clone)]
pub struct BuiltinFunction {
    name: Rc<str>,
    function: NativeFn,
}

impl BuiltinFunction {
    pub fn new(name: impl Into<Rc<str>>, function: NativeFn) -> Self {
        Self {
            name: name.into(),
            function,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(
        &self,
        context: &mut dyn CallContext,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        (self.function)(context, args)
    }
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BuiltinFunction").field(&self.name).finish()
    }
}

/// Every builtin shipped with the interpreter, in registration order.
pub fn standard_library() -> Vec<BuiltinFunction> {
    [
        console::FUNCTIONS,
        string::FUNCTIONS,
        math::FUNCTIONS,
        list::FUNCTIONS,
        net::FUNCTIONS,
    ]
    .into_iter()
    .flatten()
    .map(|(name, function)| BuiltinFunction::new(*name, *function))
    .collect()
}

fn argument<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a Value, RuntimeError> {
    args.get(index).ok_or_else(|| RuntimeError::ArityMismatch {
        name: name.to_string(),
        expected: format!("at least {}", index + 1),
        found: args.len(),
    })
}

fn type_mismatch(name: &str, index: usize, expected: &'static str, got: &Value) -> RuntimeError {
    RuntimeError::InvalidArgumentType {
        name: name.to_string(),
        position: index + 1,
        expected,
        got: got.type_name().to_string(),
    }
}

pub fn number_arg(name: &str, args: &[Value], index: usize) -> Result<f64, RuntimeError> {
    let value = argument(name, args, index)?;
    value
        .as_number()
        .ok_or_else(|| type_mismatch(name, index, "a number", value))
}

pub fn string_arg<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a str, RuntimeError> {
    let value = argument(name, args, index)?;
    value
        .as_str()
        .ok_or_else(|| type_mismatch(name, index, "a string", value))
}

pub fn list_arg(name: &str, args: &[Value], index: usize) -> Result<ListRef, RuntimeError> {
    let value = argument(name, args, index)?;
    value
        .as_list()
        .cloned()
        .ok_or_else(|| type_mismatch(name, index, "a list", value))
}

/// Converts a script number into a character index: rounded, negatives clamp to zero.
fn index_arg(name: &str, args: &[Value], index: usize) -> Result<usize, RuntimeError> {
    let value = number_arg(name, args, index)?.round();
    if value.is_nan() || value <= 0.0 {
        return Ok(0);
    }
    Ok(value as usize)
}
