use crate::runtime::{CallContext, RuntimeError, Value};

use super::{NativeFn, list_arg};

pub(super) const FUNCTIONS: &[(&str, NativeFn)] = &[("append", append), ("pop", pop)];

/// Appends in place; every holder of the list observes the new element.
fn append(_: &mut dyn CallContext, mut args: Vec<Value>) -> Result<Value, RuntimeError> {
    RuntimeError::expect_arity("append", 2, args.len())?;
    let list = list_arg("append", &args, 0)?;
    let value = args.pop().unwrap_or(Value::Void);
    list.borrow_mut().append(value);
    Ok(Value::Void)
}

fn pop(_: &mut dyn CallContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    RuntimeError::expect_arity("pop", 1, args.len())?;
    let list = list_arg("pop", &args, 0)?;
    let popped = list.borrow_mut().pop();
    popped.ok_or_else(|| RuntimeError::PopFromEmptyList {
        name: "pop".to_string(),
    })
}
