use rustc_hash::FxHashMap;

use crate::runtime::{RuntimeError, Value};

type Scope = FxHashMap<String, Value>;

/// Stack of lexical scopes. Index 0 is the global scope and is never popped.
#[derive(Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
}

/// Caller scopes set aside while a function body runs.
#[derive(Debug)]
pub struct SavedScopes(Vec<Scope>);

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Binds `name` in the innermost scope, shadowing any outer binding.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.innermost().insert(name.into(), value);
    }

    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        match self.find_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RuntimeError::UndefinedVariable {
                name: name.to_string(),
            }),
        }
    }

    /// Updates the nearest existing binding, or defines `name` in the innermost scope.
    pub fn assign_or_define(&mut self, name: &str, value: Value) {
        match self.find_mut(name) {
            Some(slot) => *slot = value,
            None => self.define(name, value),
        }
    }

    pub fn lookup(&self, name: &str) -> Result<Value, RuntimeError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Hides every non-global scope and opens a fresh one for a call.
    pub fn enter_call(&mut self) -> SavedScopes {
        let saved = self.scopes.split_off(1);
        self.scopes.push(Scope::default());
        SavedScopes(saved)
    }

    /// Discards the call's scopes and reinstates the caller's.
    pub fn exit_call(&mut self, saved: SavedScopes) {
        self.scopes.truncate(1);
        self.scopes.extend(saved.0);
    }

    fn innermost(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(value: f64) -> Value {
        Value::Number(value)
    }

    #[test]
    fn inner_definitions_shadow_and_disappear_on_pop() {
        let mut env = Environment::new();
        env.define("x", n(1.0));
        env.push_scope();
        env.define("x", n(2.0));
        assert_eq!(env.lookup("x"), Ok(n(2.0)));
        env.pop_scope();
        assert_eq!(env.lookup("x"), Ok(n(1.0)));
    }

    #[test]
    fn assign_updates_the_nearest_binding() {
        let mut env = Environment::new();
        env.define("x", n(1.0));
        env.push_scope();
        env.assign("x", n(5.0)).expect("x is defined");
        env.pop_scope();
        assert_eq!(env.lookup("x"), Ok(n(5.0)));
    }

    #[test]
    fn assign_to_unknown_name_fails() {
        let mut env = Environment::new();
        assert_eq!(
            env.assign("ghost", n(1.0)),
            Err(RuntimeError::UndefinedVariable {
                name: "ghost".to_string()
            })
        );
        assert!(env.lookup("ghost").is_err());
    }

    #[test]
    fn assign_or_define_creates_in_the_innermost_scope() {
        let mut env = Environment::new();
        env.push_scope();
        env.assign_or_define("y", n(1.0));
        env.pop_scope();
        assert!(env.lookup("y").is_err());

        env.assign_or_define("z", n(1.0));
        env.push_scope();
        env.assign_or_define("z", n(2.0));
        env.pop_scope();
        assert_eq!(env.lookup("z"), Ok(n(2.0)));
    }

    #[test]
    fn global_scope_survives_extra_pops() {
        let mut env = Environment::new();
        env.define("g", n(1.0));
        env.pop_scope();
        env.pop_scope();
        assert_eq!(env.depth(), 1);
        assert_eq!(env.lookup("g"), Ok(n(1.0)));
    }

    #[test]
    fn calls_see_globals_but_not_caller_locals() {
        let mut env = Environment::new();
        env.define("g", n(1.0));
        env.push_scope();
        env.define("local", n(2.0));

        let saved = env.enter_call();
        assert_eq!(env.lookup("g"), Ok(n(1.0)));
        assert!(env.lookup("local").is_err());
        env.define("param", n(3.0));
        env.exit_call(saved);

        assert_eq!(env.lookup("local"), Ok(n(2.0)));
        assert!(env.lookup("param").is_err());
        assert_eq!(env.depth(), 2);
    }
}
