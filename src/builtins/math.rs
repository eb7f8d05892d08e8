use crate::runtime::{RuntimeError, Value};

use super::{NativeFn, number_arg};

pub(super) const FUNCTIONS: &[(&str, NativeFn)] = &[
    ("abs", |_, args| unary("abs", &args, f64::abs)),
    ("ceil", |_, args| unary("ceil", &args, f64::ceil)),
    ("floor", |_, args| unary("floor", &args, f64::floor)),
    ("trunc", |_, args| unary("trunc", &args, f64::trunc)),
    ("round", |_, args| unary("round", &args, f64::round)),
    ("sqrt", |_, args| unary("sqrt", &args, f64::sqrt)),
    ("log", |_, args| unary("log", &args, f64::ln)),
    ("log10", |_, args| unary("log10", &args, f64::log10)),
    ("sin", |_, args| unary("sin", &args, f64::sin)),
    ("cos", |_, args| unary("cos", &args, f64::cos)),
    ("tan", |_, args| unary("tan", &args, f64::tan)),
    ("asin", |_, args| unary("asin", &args, f64::asin)),
    ("acos", |_, args| unary("acos", &args, f64::acos)),
    ("atan", |_, args| unary("atan", &args, f64::atan)),
    ("pow", |_, args| binary("pow", &args, f64::powf)),
    ("fmod", |_, args| binary("fmod", &args, |x, y| x % y)),
];

fn unary(name: &str, args: &[Value], apply: fn(f64) -> f64) -> Result<Value, RuntimeError> {
    RuntimeError::expect_arity(name, 1, args.len())?;
    Ok(Value::Number(apply(number_arg(name, args, 0)?)))
}

fn binary(
    name: &str,
    args: &[Value],
    apply: fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    RuntimeError::expect_arity(name, 2, args.len())?;
    let x = number_arg(name, args, 0)?;
    let y = number_arg(name, args, 1)?;
    Ok(Value::Number(apply(x, y)))
}
