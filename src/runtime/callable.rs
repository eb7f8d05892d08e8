use std::fmt;
use std::rc::Rc;

use crate::ast::{FunctionDecl, Statement};
use crate::runtime::class::InstanceRef;
use crate::runtime::error::RuntimeError;

/// Services the interpreter offers to host builtins.
///
/// Builtins receive this instead of the concrete interpreter so they can be
/// exercised against captured console output in tests.
pub trait CallContext {
    /// Writes `text` followed by a newline to the script's output.
    fn write_line(&mut self, text: &str) -> Result<(), RuntimeError>;

    /// Writes `text` without a trailing newline (used for input prompts).
    fn write(&mut self, text: &str) -> Result<(), RuntimeError>;

    /// Reads one line of input without its line terminator; `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>, RuntimeError>;

    /// Shared HTTP agent with connect and total timeouts applied.
    fn http_agent(&mut self) -> &ureq::Agent;
}

/// A user-defined function, optionally bound to a receiver instance.
///
/// Methods live unbound in their class; property lookup on an instance
/// produces a bound copy via [`FunctionObject::bind`].
#[derive(Clone)]
pub struct FunctionObject {
    decl: Rc<FunctionDecl>,
    receiver: Option<InstanceRef>,
}

impl FunctionObject {
    pub fn new(decl: Rc<FunctionDecl>) -> Self {
        Self {
            decl,
            receiver: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }

    pub fn params(&self) -> &[String] {
        &self.decl.params
    }

    pub fn body(&self) -> &[Statement] {
        &self.decl.body
    }

    pub fn receiver(&self) -> Option<&InstanceRef> {
        self.receiver.as_ref()
    }

    /// Returns a new function sharing this one's body with `receiver` as `this`.
    pub fn bind(&self, receiver: InstanceRef) -> Self {
        Self {
            decl: Rc::clone(&self.decl),
            receiver: Some(receiver),
        }
    }
}

impl fmt::Debug for FunctionObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionObject")
            .field("name", &self.decl.name)
            .field("params", &self.decl.params)
            .field("bound", &self.receiver.is_some())
            .finish()
    }
}
