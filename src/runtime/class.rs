use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::runtime::callable::FunctionObject;
use crate::runtime::error::RuntimeError;
use crate::runtime::value::Value;

pub type InstanceRef = Rc<RefCell<InstanceObject>>;

/// A class: a name plus a method table fixed at declaration time.
#[derive(Debug)]
pub struct ClassObject {
    name: String,
    methods: FxHashMap<String, FunctionObject>,
}

impl ClassObject {
    pub fn new(name: String, methods: FxHashMap<String, FunctionObject>) -> Self {
        Self { name, methods }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self, name: &str) -> Option<&FunctionObject> {
        self.methods.get(name)
    }
}

/// Runtime representation of a class instance with per-instance fields.
pub struct InstanceObject {
    class: Rc<ClassObject>,
    fields: FxHashMap<String, Value>,
}

impl InstanceObject {
    pub fn new(class: Rc<ClassObject>) -> Self {
        Self {
            class,
            fields: FxHashMap::default(),
        }
    }

    pub fn into_ref(self) -> InstanceRef {
        Rc::new(RefCell::new(self))
    }

    pub fn class(&self) -> &Rc<ClassObject> {
        &self.class
    }

    /// Looks up `name` on the instance behind `receiver`.
    ///
    /// Fields shadow methods; a method hit is returned bound to `receiver`.
    pub fn get_attribute(&self, receiver: &InstanceRef, name: &str) -> Result<Value, RuntimeError> {
        if let Some(value) = self.fields.get(name) {
            return Ok(value.clone());
        }

        if let Some(method) = self.class.method(name) {
            return Ok(Value::Function(Rc::new(method.bind(Rc::clone(receiver)))));
        }

        Err(RuntimeError::UndefinedProperty {
            property: name.to_string(),
            type_name: format!("{} instance", self.class.name()),
        })
    }

    pub fn set_attribute(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }
}

// Fields can hold the instance itself, so only their names are printed.
impl fmt::Debug for InstanceObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields = self.fields.keys().collect::<Vec<_>>();
        fields.sort();
        f.debug_struct("InstanceObject")
            .field("class", &self.class.name())
            .field("fields", &fields)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::FunctionDecl;
    use crate::token::Span;

    fn class_with_method(method: &str) -> Rc<ClassObject> {
        let decl = Rc::new(FunctionDecl {
            name: method.to_string(),
            params: Vec::new(),
            body: Vec::new(),
            span: Span::default(),
        });
        let mut methods = FxHashMap::default();
        methods.insert(method.to_string(), FunctionObject::new(decl));
        Rc::new(ClassObject::new("Pt".to_string(), methods))
    }

    #[test]
    fn method_lookup_binds_the_receiver() {
        let instance = InstanceObject::new(class_with_method("norm")).into_ref();
        let value = instance
            .borrow()
            .get_attribute(&instance, "norm")
            .expect("method should resolve");
        let Value::Function(function) = value else {
            panic!("expected function, got {value:?}");
        };
        assert!(Rc::ptr_eq(function.receiver().expect("bound"), &instance));
    }

    #[test]
    fn fields_shadow_methods() {
        let instance = InstanceObject::new(class_with_method("norm")).into_ref();
        instance
            .borrow_mut()
            .set_attribute("norm", Value::Number(3.0));
        let value = instance
            .borrow()
            .get_attribute(&instance, "norm")
            .expect("field should resolve");
        assert_eq!(value, Value::Number(3.0));
    }

    #[test]
    fn instances_share_their_class() {
        let class = class_with_method("norm");
        let a = InstanceObject::new(Rc::clone(&class));
        let b = InstanceObject::new(Rc::clone(&class));
        assert!(Rc::ptr_eq(a.class(), b.class()));
    }

    #[test]
    fn missing_attribute_is_an_error() {
        let instance = InstanceObject::new(class_with_method("norm")).into_ref();
        let err = instance
            .borrow()
            .get_attribute(&instance, "missing")
            .expect_err("lookup should fail");
        assert_eq!(
            err,
            RuntimeError::UndefinedProperty {
                property: "missing".to_string(),
                type_name: "Pt instance".to_string()
            }
        );
    }
}
