//! Text builtins. Positions and lengths count Unicode scalar values, not bytes.

use crate::runtime::{CallContext, RuntimeError, Value};

use super::{NativeFn, index_arg, string_arg};

pub(super) const FUNCTIONS: &[(&str, NativeFn)] = &[
    ("to_number", to_number),
    ("to_string", to_string),
    ("concat", concat),
    ("len", len),
    ("substr", substr),
    ("find", find),
    ("replace", replace),
];

/// Parses a whole string as a number; text that is not entirely numeric gives 0.
fn to_number(_: &mut dyn CallContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    RuntimeError::expect_arity("to_number", 1, args.len())?;
    if let Value::Number(value) = args[0] {
        return Ok(Value::Number(value));
    }
    let text = string_arg("to_number", &args, 0)?;
    Ok(Value::Number(text.trim_start().parse().unwrap_or(0.0)))
}

fn to_string(_: &mut dyn CallContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    RuntimeError::expect_arity("to_string", 1, args.len())?;
    Ok(Value::string(args[0].to_output()))
}

fn concat(_: &mut dyn CallContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let joined = args.iter().map(Value::to_output).collect::<String>();
    Ok(Value::string(joined))
}

fn len(_: &mut dyn CallContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    RuntimeError::expect_arity("len", 1, args.len())?;
    let length = match &args[0] {
        Value::String(text) => text.chars().count(),
        Value::List(list) => list.borrow().len(),
        other => {
            return Err(RuntimeError::InvalidArgumentType {
                name: "len".to_string(),
                position: 1,
                expected: "a string or list",
                got: other.type_name().to_string(),
            });
        }
    };
    Ok(Value::Number(length as f64))
}

fn substr(_: &mut dyn CallContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    RuntimeError::expect_arity("substr", 3, args.len())?;
    let text = string_arg("substr", &args, 0)?;
    let start = index_arg("substr", &args, 1)?;
    let count = index_arg("substr", &args, 2)?;
    let slice = text.chars().skip(start).take(count).collect::<String>();
    Ok(Value::string(slice))
}

fn find(_: &mut dyn CallContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    RuntimeError::expect_arity("find", 2, args.len())?;
    let text = string_arg("find", &args, 0)?;
    let needle = string_arg("find", &args, 1)?;
    let position = match text.find(needle) {
        Some(byte_index) => text[..byte_index].chars().count() as f64,
        None => -1.0,
    };
    Ok(Value::Number(position))
}

/// Replaces `count` characters starting at `start`, both clamped to the string.
fn replace(_: &mut dyn CallContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    RuntimeError::expect_arity("replace", 4, args.len())?;
    let text = string_arg("replace", &args, 0)?;
    let start = index_arg("replace", &args, 1)?;
    let count = index_arg("replace", &args, 2)?;
    let replacement = string_arg("replace", &args, 3)?;

    let chars = text.chars().collect::<Vec<_>>();
    let start = start.min(chars.len());
    let end = start.saturating_add(count).min(chars.len());

    let mut result = chars[..start].iter().collect::<String>();
    result.push_str(replacement);
    result.extend(&chars[end..]);
    Ok(Value::string(result))
}
