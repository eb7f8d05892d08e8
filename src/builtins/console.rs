use crate::runtime::{CallContext, RuntimeError, Value};

use super::NativeFn;

pub(super) const FUNCTIONS: &[(&str, NativeFn)] = &[
    ("output", output),
    ("print", output),
    ("input", input),
];

/// Writes the display forms of all arguments separated by spaces, then a newline.
fn output(context: &mut dyn CallContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let line = args
        .iter()
        .map(Value::to_output)
        .collect::<Vec<_>>()
        .join(" ");
    context.write_line(&line)?;
    Ok(Value::Void)
}

fn input(context: &mut dyn CallContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    RuntimeError::expect_arity_range("input", 0, 1, args.len())?;
    if let Some(prompt) = args.first() {
        context.write(&prompt.to_output())?;
    }
    let line = context.read_line()?.unwrap_or_default();
    Ok(Value::string(line))
}
