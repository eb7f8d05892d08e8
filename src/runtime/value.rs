use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::ast::BinaryOperator;
use crate::builtins::BuiltinFunction;
use crate::runtime::callable::FunctionObject;
use crate::runtime::class::{ClassObject, InstanceRef};
use crate::runtime::error::RuntimeError;
use crate::runtime::list::{ListObject, ListRef};

/// Nesting depth past which list rendering stops descending.
const MAX_RENDER_DEPTH: usize = 32;

/// Lists on the current rendering path; a repeat is a cycle.
type RenderPath = FxHashSet<*const RefCell<ListObject>>;

/// Runtime value. Lists, instances and classes are `Rc`-shared, so a
/// reference cycle between them is never freed.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    String(Rc<str>),
    Boolean(bool),
    Void,
    List(ListRef),
    Function(Rc<FunctionObject>),
    Builtin(BuiltinFunction),
    Class(Rc<ClassObject>),
    Instance(InstanceRef),
}

impl Value {
    pub fn string(value: impl Into<Rc<str>>) -> Self {
        Value::String(value.into())
    }

    pub fn list(values: Vec<Value>) -> Self {
        Value::List(ListObject::new(values).into_ref())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Void => "void",
            Value::List(_) => "list",
            Value::Function(_) => "function",
            Value::Builtin(_) => "builtin",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(value) => *value != 0.0,
            Value::String(value) => !value.is_empty(),
            Value::Boolean(value) => *value,
            Value::Void => false,
            Value::List(_)
            | Value::Function(_)
            | Value::Builtin(_)
            | Value::Class(_)
            | Value::Instance(_) => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(&**value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Display form used by output, string concatenation and equality.
    pub fn to_output(&self) -> String {
        self.render(&mut RenderPath::default())
    }

    fn render(&self, path: &mut RenderPath) -> String {
        match self {
            Value::Number(value) => format_number(*value),
            Value::String(value) => value.to_string(),
            Value::Boolean(value) => value.to_string(),
            Value::Void => "void".to_string(),
            Value::List(list) => {
                let id = Rc::as_ptr(list);
                if path.len() >= MAX_RENDER_DEPTH || !path.insert(id) {
                    return "[...]".to_string();
                }
                let mut parts = Vec::with_capacity(list.borrow().len());
                for value in list.borrow().iter() {
                    parts.push(value.render(path));
                }
                path.remove(&id);
                format!("[{}]", parts.join(", "))
            }
            Value::Function(function) => format!("<function {}>", function.name()),
            Value::Builtin(builtin) => format!("<builtin {}>", builtin.name()),
            Value::Class(class) => format!("<class {}>", class.name()),
            Value::Instance(instance) => {
                format!("<{} instance>", instance.borrow().class().name())
            }
        }
    }

    pub fn binary(&self, op: BinaryOperator, rhs: &Value) -> Result<Value, RuntimeError> {
        match op {
            BinaryOperator::Add => self.add(rhs),
            BinaryOperator::Sub => self.arithmetic(op, rhs, |a, b| a - b),
            BinaryOperator::Mul => self.arithmetic(op, rhs, |a, b| a * b),
            BinaryOperator::Div => self.arithmetic(op, rhs, |a, b| a / b),
            BinaryOperator::Rem => self.arithmetic(op, rhs, |a, b| a % b),
            BinaryOperator::Less => self.compare(op, rhs, |a, b| a < b),
            BinaryOperator::Greater => self.compare(op, rhs, |a, b| a > b),
            BinaryOperator::Equal => Ok(Value::Boolean(self.to_output() == rhs.to_output())),
            BinaryOperator::NotEqual => Ok(Value::Boolean(self.to_output() != rhs.to_output())),
        }
    }

    /// Numeric addition, falling back to concatenating display forms.
    pub fn add(&self, rhs: &Value) -> Result<Value, RuntimeError> {
        if let (Value::Number(a), Value::Number(b)) = (self, rhs) {
            return Ok(Value::Number(a + b));
        }
        let mut joined = self.to_output();
        joined.push_str(&rhs.to_output());
        Ok(Value::string(joined))
    }

    fn arithmetic(
        &self,
        op: BinaryOperator,
        rhs: &Value,
        apply: fn(f64, f64) -> f64,
    ) -> Result<Value, RuntimeError> {
        let (a, b) = self.numeric_operands(op, rhs)?;
        Ok(Value::Number(apply(a, b)))
    }

    fn compare(
        &self,
        op: BinaryOperator,
        rhs: &Value,
        apply: fn(f64, f64) -> bool,
    ) -> Result<Value, RuntimeError> {
        let (a, b) = self.numeric_operands(op, rhs)?;
        Ok(Value::Boolean(apply(a, b)))
    }

    fn numeric_operands(&self, op: BinaryOperator, rhs: &Value) -> Result<(f64, f64), RuntimeError> {
        match (self, rhs) {
            (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
            _ => Err(RuntimeError::InvalidBinaryOperation {
                op: op.symbol(),
                left: self.type_name().to_string(),
                right: rhs.type_name().to_string(),
            }),
        }
    }
}

/// Identity for reference kinds, value equality for scalars.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Void, Value::Void) => true,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a.name() == b.name(),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

fn format_number(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        let rendered = if value > 0.0 { "inf" } else { "-inf" };
        rendered.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(value: f64) -> Value {
        Value::Number(value)
    }

    #[test]
    fn formats_numbers_without_trailing_zeros() {
        assert_eq!(num(3.0).to_output(), "3");
        assert_eq!(num(2.5).to_output(), "2.5");
        assert_eq!(num(-0.125).to_output(), "-0.125");
        assert_eq!(num(f64::NAN).to_output(), "nan");
        assert_eq!(num(f64::NEG_INFINITY).to_output(), "-inf");
    }

    #[test]
    fn renders_nested_lists() {
        let inner = Value::list(vec![Value::string("a"), Value::Boolean(true)]);
        let outer = Value::list(vec![num(1.0), inner, Value::Void]);
        assert_eq!(outer.to_output(), "[1, [a, true], void]");
    }

    #[test]
    fn self_containing_list_renders_without_overflow() {
        let list = Value::list(Vec::new());
        if let Value::List(inner) = &list {
            inner.borrow_mut().append(list.clone());
        }
        assert_eq!(list.to_output(), "[[...]]");
    }

    #[test]
    fn repeated_self_references_render_once_each() {
        let list = Value::list(vec![num(1.0)]);
        if let Value::List(inner) = &list {
            inner.borrow_mut().append(list.clone());
            inner.borrow_mut().append(list.clone());
        }
        assert_eq!(list.to_output(), "[1, [...], [...]]");
        assert_eq!(
            list.binary(BinaryOperator::Equal, &list),
            Ok(Value::Boolean(true))
        );
    }

    #[test]
    fn shared_sublists_are_not_mistaken_for_cycles() {
        let shared = Value::list(vec![num(2.0)]);
        let outer = Value::list(vec![shared.clone(), shared]);
        assert_eq!(outer.to_output(), "[[2], [2]]");
    }

    #[test]
    fn truthiness_follows_value_kind() {
        assert!(num(2.0).is_truthy());
        assert!(num(f64::NAN).is_truthy());
        assert!(!num(0.0).is_truthy());
        assert!(!Value::string("").is_truthy());
        assert!(Value::string("x").is_truthy());
        assert!(!Value::Void.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(Value::list(Vec::new()).is_truthy());
    }

    #[test]
    fn plus_concatenates_when_either_side_is_not_a_number() {
        assert_eq!(num(1.0).add(&num(2.0)), Ok(num(3.0)));
        assert_eq!(
            Value::string("n=").add(&num(4.0)),
            Ok(Value::string("n=4"))
        );
        assert_eq!(
            num(1.5).add(&Value::list(vec![num(2.0)])),
            Ok(Value::string("1.5[2]"))
        );
    }

    #[test]
    fn equality_compares_display_forms_across_kinds() {
        assert_eq!(
            num(1.0).binary(BinaryOperator::Equal, &Value::string("1")),
            Ok(Value::Boolean(true))
        );
        assert_eq!(
            Value::Void.binary(BinaryOperator::NotEqual, &Value::string("void")),
            Ok(Value::Boolean(false))
        );
    }

    #[test]
    fn arithmetic_follows_ieee_754() {
        assert_eq!(
            num(1.0).binary(BinaryOperator::Div, &num(0.0)),
            Ok(num(f64::INFINITY))
        );
        let Ok(Value::Number(rem)) = num(5.0).binary(BinaryOperator::Rem, &num(0.0)) else {
            panic!("expected number");
        };
        assert!(rem.is_nan());
        assert_eq!(
            num(-7.0).binary(BinaryOperator::Rem, &num(3.0)),
            Ok(num(-1.0))
        );
    }

    #[test]
    fn non_numeric_operands_are_rejected() {
        let err = Value::string("a")
            .binary(BinaryOperator::Mul, &num(2.0))
            .expect_err("expected failure");
        assert_eq!(err.to_string(), "Invalid binary operation: string * number");
        assert!(
            Value::Void
                .binary(BinaryOperator::Less, &num(1.0))
                .is_err()
        );
    }
}
