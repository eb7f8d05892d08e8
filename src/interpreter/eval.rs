use std::rc::Rc;

use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::ast::{Expression, ExpressionKind, FunctionDecl, Statement, StatementKind};
use crate::diagnostic::Diagnostic;
use crate::runtime::{ClassObject, FunctionObject, InstanceObject, RuntimeError, Value};
use crate::token::Span;

use super::Interpreter;

/// Non-local exit unwinding through the evaluator.
///
/// Only a call boundary turns `Return` back into a value; only `try` stops
/// an `Error`.
#[derive(Debug)]
pub(super) enum Signal {
    Return(Value),
    Error(Diagnostic),
}

type EvalResult = Result<Value, Signal>;

trait At<T> {
    /// Attaches the position of the node being evaluated to a runtime failure.
    fn at(self, span: Span) -> Result<T, Signal>;
}

impl<T> At<T> for Result<T, RuntimeError> {
    fn at(self, span: Span) -> Result<T, Signal> {
        self.map_err(|error| Signal::Error(Diagnostic::runtime(error, span)))
    }
}

const INIT_METHOD: &str = "__init__";
const THIS: &str = "this";

impl Interpreter {
    /// Runs statements in the current scope; the result is the last statement's value.
    pub(super) fn execute_sequence(&mut self, statements: &[Statement]) -> EvalResult {
        let mut last = Value::Void;
        for statement in statements {
            last = self.execute(statement)?;
        }
        Ok(last)
    }

    fn execute_scoped(&mut self, statements: &[Statement]) -> EvalResult {
        self.environment.push_scope();
        let result = self.execute_sequence(statements);
        self.environment.pop_scope();
        result
    }

    fn execute(&mut self, statement: &Statement) -> EvalResult {
        crate::grow_stack(|| self.execute_statement(statement))
    }

    fn execute_statement(&mut self, statement: &Statement) -> EvalResult {
        match &statement.kind {
            StatementKind::Expr(expr) => self.evaluate_expression(expr),
            StatementKind::Block(statements) => self.execute_scoped(statements),
            StatementKind::If {
                condition,
                then_body,
                else_branch,
            } => {
                if self.evaluate_expression(condition)?.is_truthy() {
                    self.execute_scoped(then_body)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Value::Void)
                }
            }
            StatementKind::While { condition, body } => {
                while self.evaluate_expression(condition)?.is_truthy() {
                    self.execute_scoped(body)?;
                }
                Ok(Value::Void)
            }
            StatementKind::For {
                variable,
                iterable,
                body,
            } => self.execute_for(variable, iterable, body),
            StatementKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.evaluate_expression(expr)?,
                    None => Value::Void,
                };
                Err(Signal::Return(value))
            }
            StatementKind::FunctionDef(decl) => {
                debug!("defining function '{}'", decl.name);
                let function = FunctionObject::new(Rc::clone(decl));
                self.environment
                    .define(decl.name.as_str(), Value::Function(Rc::new(function)));
                Ok(Value::Void)
            }
            StatementKind::ClassDef { name, methods } => {
                self.define_class(name, methods);
                Ok(Value::Void)
            }
            StatementKind::Try {
                body,
                catch_name,
                catch_body,
            } => match self.execute_scoped(body) {
                Err(Signal::Error(diagnostic)) => {
                    debug!("caught: {diagnostic}");
                    self.environment.push_scope();
                    self.environment
                        .define(catch_name.as_str(), Value::string(diagnostic.message));
                    let result = self.execute_sequence(catch_body);
                    self.environment.pop_scope();
                    result
                }
                other => other,
            },
        }
    }

    fn execute_for(
        &mut self,
        variable: &str,
        iterable: &Expression,
        body: &[Statement],
    ) -> EvalResult {
        let items = match self.evaluate_expression(iterable)? {
            Value::List(list) => list.borrow().snapshot(),
            other => {
                return Err(RuntimeError::NotIterable {
                    type_name: other.type_name().to_string(),
                })
                .at(iterable.span);
            }
        };

        self.environment.push_scope();
        let result = items.into_iter().try_for_each(|item| {
            self.environment.define(variable, item);
            self.execute_sequence(body).map(drop)
        });
        self.environment.pop_scope();
        result.map(|()| Value::Void)
    }

    fn define_class(&mut self, name: &str, methods: &[Rc<FunctionDecl>]) {
        debug!("defining class '{name}' with {} methods", methods.len());
        let table = methods
            .iter()
            .map(|decl| (decl.name.clone(), FunctionObject::new(Rc::clone(decl))))
            .collect::<FxHashMap<_, _>>();
        let class = ClassObject::new(name.to_string(), table);
        self.environment.define(name, Value::Class(Rc::new(class)));
    }

    fn evaluate_expression(&mut self, expr: &Expression) -> EvalResult {
        crate::grow_stack(|| self.evaluate_node(expr))
    }

    fn evaluate_node(&mut self, expr: &Expression) -> EvalResult {
        let span = expr.span;
        match &expr.kind {
            ExpressionKind::Number(value) => Ok(Value::Number(*value)),
            ExpressionKind::String(value) => Ok(Value::string(value.as_str())),
            ExpressionKind::Variable(name) => self.environment.lookup(name).at(span),
            ExpressionKind::List(elements) => {
                let values = self.evaluate_all(elements)?;
                Ok(Value::list(values))
            }
            ExpressionKind::This => self
                .environment
                .lookup(THIS)
                .map_err(|_| RuntimeError::ThisOutsideMethod)
                .at(span),
            ExpressionKind::BinaryOp { left, op, right } => {
                let left = self.evaluate_expression(left)?;
                let right = self.evaluate_expression(right)?;
                left.binary(*op, &right).at(span)
            }
            ExpressionKind::Assign { name, value } => {
                let value = self.evaluate_expression(value)?;
                self.environment.assign_or_define(name, value.clone());
                Ok(value)
            }
            ExpressionKind::GetProperty { object, name } => {
                match self.evaluate_expression(object)? {
                    Value::Instance(instance) => {
                        instance.borrow().get_attribute(&instance, name).at(span)
                    }
                    other => Err(RuntimeError::UndefinedProperty {
                        property: name.clone(),
                        type_name: other.type_name().to_string(),
                    })
                    .at(span),
                }
            }
            ExpressionKind::SetProperty {
                object,
                name,
                value,
            } => {
                let target = self.evaluate_expression(object)?;
                let value = self.evaluate_expression(value)?;
                match target {
                    Value::Instance(instance) => {
                        instance.borrow_mut().set_attribute(name, value.clone());
                        Ok(value)
                    }
                    other => Err(RuntimeError::PropertyOnNonInstance {
                        property: name.clone(),
                        type_name: other.type_name().to_string(),
                    })
                    .at(span),
                }
            }
            ExpressionKind::Call { callee, args } => {
                let callee = self.evaluate_expression(callee)?;
                let args = self.evaluate_all(args)?;
                self.call_value(callee, args, span)
            }
            ExpressionKind::New { class_name, args } => {
                let class = match self.environment.lookup(class_name).at(span)? {
                    Value::Class(class) => class,
                    _ => {
                        return Err(RuntimeError::NotAClass {
                            name: class_name.clone(),
                        })
                        .at(span);
                    }
                };
                let args = self.evaluate_all(args)?;
                self.instantiate(class, args, span)
            }
        }
    }

    fn evaluate_all(&mut self, exprs: &[Expression]) -> Result<Vec<Value>, Signal> {
        exprs
            .iter()
            .map(|expr| self.evaluate_expression(expr))
            .collect()
    }

    fn call_value(&mut self, callee: Value, args: Vec<Value>, span: Span) -> EvalResult {
        match callee {
            Value::Function(function) => self.call_function(&function, args, span),
            Value::Builtin(builtin) => {
                trace!("calling builtin '{}'", builtin.name());
                builtin.call(self, args).at(span)
            }
            Value::Class(class) => self.instantiate(class, args, span),
            other => Err(RuntimeError::NotCallable {
                type_name: other.type_name().to_string(),
            })
            .at(span),
        }
    }

    fn instantiate(&mut self, class: Rc<ClassObject>, args: Vec<Value>, span: Span) -> EvalResult {
        trace!("instantiating '{}'", class.name());
        let initializer = class.method(INIT_METHOD).cloned();
        let instance = InstanceObject::new(class).into_ref();
        if let Some(initializer) = initializer {
            let bound = initializer.bind(Rc::clone(&instance));
            self.call_function(&bound, args, span)?;
        }
        Ok(Value::Instance(instance))
    }

    /// Runs a user function in a fresh scope that sees only globals.
    fn call_function(&mut self, function: &FunctionObject, args: Vec<Value>, span: Span) -> EvalResult {
        if self.call_depth >= self.recursion_limit {
            return Err(RuntimeError::RecursionLimit {
                limit: self.recursion_limit,
            })
            .at(span);
        }
        trace!("calling '{}' with {} arguments", function.name(), args.len());

        let saved = self.environment.enter_call();
        if let Some(receiver) = function.receiver() {
            self.environment
                .define(THIS, Value::Instance(Rc::clone(receiver)));
        }
        // Extra arguments are dropped; unmatched parameters stay undefined.
        for (param, arg) in function.params().iter().zip(args) {
            self.environment.define(param.as_str(), arg);
        }

        self.call_depth += 1;
        let result = self.execute_sequence(function.body());
        self.call_depth -= 1;
        self.environment.exit_call(saved);

        match result {
            Err(Signal::Return(value)) => Ok(value),
            other => other,
        }
    }
}
