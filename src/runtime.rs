//! Runtime object model shared by the interpreter and the builtin library.
//!
//! Values are reference counted. Lists and instances sit behind
//! `Rc<RefCell<_>>` so every holder observes in-place mutation; classes and
//! functions are immutable once created and shared through plain `Rc`.
pub mod callable;
pub mod class;
pub mod error;
pub mod list;
pub mod value;

pub use callable::{CallContext, FunctionObject};
pub use class::{ClassObject, InstanceObject, InstanceRef};
pub use error::RuntimeError;
pub use list::{ListObject, ListRef};
pub use value::Value;
