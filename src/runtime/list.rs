use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::runtime::value::Value;

pub type ListRef = Rc<RefCell<ListObject>>;

/// Ordered, growable sequence of values with reference semantics.
#[derive(Clone, Default)]
pub struct ListObject {
    values: Vec<Value>,
}

impl ListObject {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn into_ref(self) -> ListRef {
        Rc::new(RefCell::new(self))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn append(&mut self, value: Value) {
        self.values.push(value);
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.values.pop()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Copies the current elements; later mutation of the list does not affect it.
    pub fn snapshot(&self) -> Vec<Value> {
        self.values.clone()
    }
}

// Elements may refer back to the list itself, so only the length is shown.
impl fmt::Debug for ListObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListObject")
            .field("len", &self.values.len())
            .finish()
    }
}
