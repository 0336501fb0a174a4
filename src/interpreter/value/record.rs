use std::rc::Rc;

use crate::{
    ast::FunctionDef,
    interpreter::{
        evaluator::{environment::Environment, object::class::ClassRecord},
        value::object_map::ObjectMap,
    },
};

/// A callable value.
///
/// Functions declared in the current program carry no closure and see the
/// caller's bindings when called. Functions imported from a module carry the
/// module's environment, which replaces the caller's bindings for the
/// duration of the call.
#[derive(Debug, Clone)]
pub struct Function {
    /// The declaration.
    pub def:         Rc<FunctionDef>,
    /// The captured module environment, for imported functions.
    pub closure:     Option<Rc<Environment>>,
    /// Annotation values, evaluated when the declaration ran.
    pub annotations: Rc<ObjectMap>,
}

impl Function {
    /// Wraps a declaration without a closure or annotations.
    #[must_use]
    pub fn new(def: Rc<FunctionDef>) -> Self {
        Self { def,
               closure: None,
               annotations: Rc::default() }
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.def, &other.def)
    }
}

/// A struct value, `Point{x: 1, y: 2}`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    /// The struct name.
    pub name:   String,
    /// Field values in declaration order.
    pub fields: ObjectMap,
}

/// A live class instance.
///
/// Shared through `Rc<RefCell<_>>` so that the instance registry, variables
/// and `this` all observe the same field values. The class record supplies
/// methods and the declared type of every field.
#[derive(Debug, Clone)]
pub struct Instance {
    /// The class the instance was created from.
    pub class:  Rc<ClassRecord>,
    /// Current field values.
    pub fields: ObjectMap,
}

impl Instance {
    /// The name of the originating class.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class.name
    }
}
