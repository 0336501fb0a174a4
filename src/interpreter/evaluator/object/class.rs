use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    rc::Rc,
};

use tracing::debug;

use crate::{
    ast::{ClassDef, FunctionDef},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::object_map::ObjectMap,
    },
    util::is_public,
};

/// A declared class.
///
/// Built once when the `class` statement runs. Field initialisers are
/// evaluated at that point and copied into every new instance. Public members
/// of the parent class that the class does not redefine are copied in as
/// well, so lookups never have to walk the parent chain.
#[derive(Debug)]
pub struct ClassRecord {
    /// The class name.
    pub name:               String,
    /// The parent class named by `extends`.
    pub parent:             Option<Rc<Self>>,
    /// Initial values of the instance fields.
    pub fields:             ObjectMap,
    /// Type tag of every field, instance and static.
    pub field_types:        HashMap<String, String>,
    /// Current values of the static fields.
    pub static_fields:      RefCell<ObjectMap>,
    /// Instance and static methods by name.
    pub methods:            HashMap<String, Rc<FunctionDef>>,
    /// Constructors keyed by parameter count.
    pub inits:              BTreeMap<usize, Rc<FunctionDef>>,
    /// Implemented interfaces, including those of the parent class.
    pub interfaces:         Vec<String>,
    /// Evaluated annotations of annotated fields.
    pub field_annotations:  HashMap<String, ObjectMap>,
    /// Evaluated annotations of annotated methods.
    pub method_annotations: HashMap<String, ObjectMap>,
}

impl ClassRecord {
    /// Tests whether the class is `class_name` or inherits from it.
    #[must_use]
    pub fn inherits_from(&self, class_name: &str) -> bool {
        self.name == class_name
        || self.parent
               .as_ref()
               .is_some_and(|parent| parent.inherits_from(class_name))
    }

    /// Tests whether the class (or an ancestor) implements `interface`.
    #[must_use]
    pub fn implements(&self, interface: &str) -> bool {
        self.interfaces.iter().any(|name| name == interface)
    }

    /// Names of the public instance fields, in declaration order.
    pub fn public_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().filter(|name| is_public(name))
    }

    /// Names of the public instance methods, sorted.
    #[must_use]
    pub fn public_methods(&self) -> Vec<&str> {
        let mut names = self.methods
                            .iter()
                            .filter(|(name, def)| is_public(name) && !def.is_static)
                            .map(|(name, _)| name.as_str())
                            .collect::<Vec<_>>();
        names.sort_unstable();
        names
    }
}

impl Context {
    /// Declares a class.
    ///
    /// Evaluates the field initialisers, records field types (declared, or
    /// inferred from the initial value), collects methods and constructors,
    /// merges public members inherited from the parent, and finally checks
    /// every claimed interface.
    ///
    /// # Errors
    /// - `NameError` for an unknown parent, a non-public static member, or
    ///   an unknown interface.
    /// - `TypeError` when a field initialiser does not match its declared
    ///   type, or a method does not match its interface signature.
    /// - `ValueError` when two constructors take the same number of
    ///   arguments.
    /// - `NotImplementedError` when an interface method is missing.
    #[tracing::instrument(level = "debug", skip_all, fields(class = %def.name))]
    pub(crate) fn declare_class(&mut self, def: &Rc<ClassDef>) -> EvalResult<()> {
        let parent = match &def.parent {
            Some(name) => Some(self.env.classes.get(name).cloned().ok_or_else(|| {
                                   RuntimeError::name(format!("Parent class '{name}' of '{}' not defined",
                                                              def.name),
                                                      def.line)
                               })?),
            None => None,
        };

        let mut fields = ObjectMap::new();
        let mut static_fields = ObjectMap::new();
        let mut field_types = HashMap::new();
        let mut field_annotations = HashMap::new();
        for field in &def.fields {
            if field.is_static && !is_public(&field.name) {
                return Err(RuntimeError::name(format!("Static field '{}' must start with an uppercase letter",
                                                      field.name),
                                              field.line));
            }
            let value = self.eval(&field.value)?;
            let (value, tag) = match &field.type_name {
                Some(declared) => {
                    let value = self.coerce_to_declared(declared, value, field.line)?;
                    self.check_binding_type(&field.name, declared, &value, field.line)?;
                    (value, declared.clone())
                },
                None => {
                    let tag = self.get_value_type(&value);
                    (value, tag)
                },
            };
            field_types.insert(field.name.clone(), tag);
            if !field.annotations.is_empty() {
                field_annotations.insert(field.name.clone(), self.eval_annotations(&field.annotations)?);
            }
            if field.is_static {
                static_fields.insert(field.name.clone(), value);
            } else {
                fields.insert(field.name.clone(), value);
            }
        }

        let mut methods = HashMap::new();
        let mut method_annotations = HashMap::new();
        for method in &def.methods {
            if method.is_static && !is_public(&method.name) {
                return Err(RuntimeError::name(format!("Static method '{}' must start with an uppercase letter",
                                                      method.name),
                                              method.line));
            }
            if !method.annotations.is_empty() {
                method_annotations.insert(method.name.clone(), self.eval_annotations(&method.annotations)?);
            }
            methods.insert(method.name.clone(), method.clone());
        }

        let mut inits = BTreeMap::new();
        for init in &def.inits {
            if inits.insert(init.params.len(), init.clone()).is_some() {
                return Err(RuntimeError::value(format!("Class '{}' declares more than one init taking {} argument(s)",
                                                       def.name,
                                                       init.params.len()),
                                               init.line));
            }
        }

        let mut interfaces = def.interfaces.clone();
        if let Some(parent) = &parent {
            for (name, value) in parent.fields.iter() {
                if is_public(name) && !fields.contains_key(name) {
                    fields.insert(name, value.clone());
                    inherit_type(&mut field_types, parent, name);
                    inherit_annotations(&mut field_annotations, &parent.field_annotations, name);
                }
            }
            for (name, value) in parent.static_fields.borrow().iter() {
                if !static_fields.contains_key(name) {
                    static_fields.insert(name, value.clone());
                    inherit_type(&mut field_types, parent, name);
                    inherit_annotations(&mut field_annotations, &parent.field_annotations, name);
                }
            }
            for (name, method) in &parent.methods {
                if is_public(name) && !methods.contains_key(name) {
                    methods.insert(name.clone(), method.clone());
                    inherit_annotations(&mut method_annotations, &parent.method_annotations, name);
                }
            }
            for interface in &parent.interfaces {
                if !interfaces.contains(interface) {
                    interfaces.push(interface.clone());
                }
            }
        }

        let record = ClassRecord { name: def.name.clone(),
                                   parent,
                                   fields,
                                   field_types,
                                   static_fields: RefCell::new(static_fields),
                                   methods,
                                   inits,
                                   interfaces,
                                   field_annotations,
                                   method_annotations };

        for interface in &def.interfaces {
            self.check_interface(&record, interface, def.line)?;
        }

        debug!(fields = record.fields.len(),
               methods = record.methods.len(),
               inits = record.inits.len(),
               "class declared");
        self.env.classes.insert(def.name.clone(), Rc::new(record));
        Ok(())
    }
}

fn inherit_type(types: &mut HashMap<String, String>, parent: &ClassRecord, name: &str) {
    if let Some(tag) = parent.field_types.get(name) {
        types.insert(name.to_string(), tag.clone());
    }
}

fn inherit_annotations(own: &mut HashMap<String, ObjectMap>,
                       inherited: &HashMap<String, ObjectMap>,
                       name: &str) {
    if let Some(annotations) = inherited.get(name) {
        own.insert(name.to_string(), annotations.clone());
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::interpreter::{
        evaluator::core::{Context, EvalResult},
        lexer::tokenize,
        parser::core::parse_program,
    };

    fn declare(source: &str) -> EvalResult<Context> {
        let tokens = tokenize(source).unwrap();
        let program = parse_program(&mut tokens.iter().peekable()).unwrap();
        let mut ctx = Context::new();
        ctx.run_program(&program)?;
        Ok(ctx)
    }

    #[test]
    fn public_members_are_inherited() {
        let ctx = declare("class Animal { fields { Name = \"a\"; secret = 1; } \
                           methods { def Speak() string { return Name; } def hidden() { } } } \
                           class Dog extends Animal { fields { Breed = \"x\"; } }")
            .unwrap();
        let dog = &ctx.env.classes["Dog"];
        assert_eq!(dog.fields.keys().collect::<Vec<_>>(), vec!["Breed", "Name"]);
        assert!(dog.methods.contains_key("Speak"));
        assert!(!dog.methods.contains_key("hidden"));
        assert!(dog.inherits_from("Animal"));
        assert_eq!(dog.field_types["Name"], "string");
    }

    #[test]
    fn unknown_parent_is_a_name_error() {
        let err = declare("class A extends Missing { }").err().unwrap();
        assert_eq!(err.kind_name(), "NameError");
    }

    #[test]
    fn static_fields_must_be_public() {
        let err = declare("class A { fields { static count = 0; } }").err().unwrap();
        assert_eq!(err.kind_name(), "NameError");
    }

    #[test]
    fn duplicate_constructor_arity_is_rejected() {
        let err = declare("class A { init(a) { } init(b) { } }").err().unwrap();
        assert_eq!(err.kind_name(), "ValueError");
    }

    #[test]
    fn declared_field_types_are_checked() {
        let err = declare("class A { fields { X: int = \"s\"; } }").err().unwrap();
        assert_eq!(err.kind_name(), "TypeError");
    }
}
