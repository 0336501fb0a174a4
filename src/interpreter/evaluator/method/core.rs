use std::{cell::RefCell, rc::Rc};

use tracing::trace;

use crate::{
    ast::{CallArgs, Expr, Member},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{Context, EvalResult},
            method::{object, set, string},
            object::class::ClassRecord,
        },
        value::{core::Value, record::Instance},
    },
    util::is_public,
};

/// The receiver of a `->` segment.
pub(crate) enum Receiver {
    /// A class name: `C->Static()` and `C->FIELD`.
    Class(Rc<ClassRecord>),
    /// Any value.
    Value {
        value:    Value,
        /// The variable the value was read from; mutating methods write
        /// their result back to it.
        var:      Option<String>,
        /// Whether non-public members may be reached (`this->...`).
        internal: bool,
    },
}

/// The outcome of a method on a builtin value.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodOutcome {
    /// The value the call produces.
    pub result:  Value,
    /// The new receiver, when the method mutates it.
    pub updated: Option<Value>,
}

impl MethodOutcome {
    /// A call that leaves the receiver untouched.
    #[must_use]
    pub const fn value(result: Value) -> Self {
        Self { result,
               updated: None }
    }

    /// A call that replaces the receiver with `updated`.
    #[must_use]
    pub const fn mutated(result: Value, updated: Value) -> Self {
        Self { result,
               updated: Some(updated) }
    }
}

impl Context {
    /// Evaluates a member chain `receiver->a->B(...)->C(...)`.
    ///
    /// Segments are applied left to right. A call returning `void` keeps the
    /// same receiver for the next segment; any other result becomes the new
    /// receiver.
    ///
    /// # Returns
    /// The value of the last segment.
    pub(crate) fn eval_member_chain(&mut self,
                                    receiver: &Expr,
                                    segments: &[Member],
                                    line: usize)
                                    -> EvalResult<Value> {
        let mut receiver = self.resolve_receiver(receiver, line)?;
        let mut last = Value::Void;

        for segment in segments {
            last = match segment {
                Member::Call { name, args } => {
                    let result = self.call_member(&mut receiver, name, args, line)?;
                    if result.is_void() {
                        continue;
                    }
                    result
                },
                Member::Field { name } => self.member_field(&receiver, name, line)?,
            };
            receiver = Receiver::Value { value:    last.clone(),
                                         var:      None,
                                         internal: false, };
        }
        Ok(last)
    }

    fn resolve_receiver(&mut self, receiver: &Expr, line: usize) -> EvalResult<Receiver> {
        match receiver {
            Expr::Variable { name, line } => {
                if self.lookup(name).is_none()
                   && !self.instances.contains_key(name)
                   && let Some(class) = self.env.classes.get(name)
                {
                    return Ok(Receiver::Class(class.clone()));
                }
                let value = self.eval_variable(name, *line)?;
                Ok(Receiver::Value { value,
                                     var: Some(name.clone()),
                                     internal: false })
            },
            Expr::This { .. } => {
                let instance = self.current_this(line)?;
                Ok(Receiver::Value { value:    Value::Instance(instance),
                                     var:      None,
                                     internal: true, })
            },
            other => {
                let value = self.eval(other)?;
                Ok(Receiver::Value { value,
                                     var: None,
                                     internal: false })
            },
        }
    }

    fn call_member(&mut self,
                   receiver: &mut Receiver,
                   name: &str,
                   args: &CallArgs,
                   line: usize)
                   -> EvalResult<Value> {
        let (positional, named) = self.eval_args(args)?;
        match receiver {
            Receiver::Class(class) => {
                let class = class.clone();
                self.call_static(&class, name, positional, named, line)
            },
            Receiver::Value { value: Value::Instance(instance),
                              internal,
                              .. } => {
                let instance = instance.clone();
                let internal = *internal;
                self.call_method(&instance, name, positional, named, internal, line)
            },
            Receiver::Value { value, var, .. } => {
                if let Some((arg, _)) = named.first() {
                    return Err(RuntimeError::type_error(format!("{name}() does not accept named argument '{arg}'"),
                                                        line));
                }
                let outcome = self.call_type_method(value, name, positional, line)?;
                if let Some(updated) = outcome.updated {
                    if let Some(var) = var {
                        self.assign_name(var, updated.clone(), line)?;
                    }
                    *value = updated;
                }
                Ok(outcome.result)
            },
        }
    }

    /// Calls a method of an instance.
    ///
    /// With `internal` unset the method must be public. Static methods run
    /// without a receiver.
    ///
    /// # Errors
    /// `NameError` for a missing or non-public method, plus every error the
    /// call raises.
    pub(crate) fn call_method(&mut self,
                              instance: &Rc<RefCell<Instance>>,
                              name: &str,
                              positional: Vec<Value>,
                              named: Vec<(String, Value)>,
                              internal: bool,
                              line: usize)
                              -> EvalResult<Value> {
        let (def, class_name) = {
            let instance = instance.borrow();
            let def = instance.class.methods.get(name).cloned().ok_or_else(|| {
                          RuntimeError::name(format!("Method '{name}' not found in class '{}'",
                                                     instance.class_name()),
                                             line)
                      })?;
            (def, instance.class_name().to_string())
        };
        if !internal && !is_public(name) {
            return Err(RuntimeError::name(format!("Method '{name}' of class '{class_name}' is not public"),
                                          line));
        }

        trace!(class = %class_name, method = name, "method call");
        let this = (!def.is_static).then(|| instance.clone());
        self.invoke(&def, None, this, positional, named, line)
    }

    /// Calls `Class->Method(...)`.
    ///
    /// # Errors
    /// `NameError` when the class has no static method of that name.
    fn call_static(&mut self,
                   class: &ClassRecord,
                   name: &str,
                   positional: Vec<Value>,
                   named: Vec<(String, Value)>,
                   line: usize)
                   -> EvalResult<Value> {
        let def = class.methods
                       .get(name)
                       .filter(|def| def.is_static && is_public(name))
                       .cloned()
                       .ok_or_else(|| {
                           RuntimeError::name(format!("Static method '{name}' not found in class '{}'",
                                                      class.name),
                                              line)
                       })?;
        trace!(class = %class.name, method = name, "static call");
        self.invoke(&def, None, None, positional, named, line)
    }

    fn member_field(&self, receiver: &Receiver, name: &str, line: usize) -> EvalResult<Value> {
        match receiver {
            Receiver::Class(class) => read_static(class, name, line),
            Receiver::Value { value: Value::Instance(instance),
                              internal,
                              .. } => self.read_field(instance, name, *internal, line),
            Receiver::Value { value, .. } => {
                Err(RuntimeError::type_error(format!("Cannot read field '{name}' of {}",
                                                     value.type_name()),
                                             line))
            },
        }
    }

    /// Reads `receiver->field` where `receiver` is a bare name.
    pub(crate) fn read_member(&mut self, receiver: &str, field: &str, line: usize) -> EvalResult<Value> {
        let expr = Expr::Variable { name: receiver.to_string(),
                                    line };
        let receiver = self.resolve_receiver(&expr, line)?;
        self.member_field(&receiver, field, line)
    }

    /// Writes `receiver->field = value` where `receiver` is a bare name.
    ///
    /// # Errors
    /// - `NameError` for a missing or non-public field.
    /// - `TypeError` when the receiver has no fields or the value does not
    ///   match the field type.
    pub(crate) fn write_member(&mut self,
                               receiver: &str,
                               field: &str,
                               value: Value,
                               line: usize)
                               -> EvalResult<()> {
        let expr = Expr::Variable { name: receiver.to_string(),
                                    line };
        match self.resolve_receiver(&expr, line)? {
            Receiver::Class(class) => {
                read_static(&class, field, line)?;
                if let Some(declared) = class.field_types.get(field) {
                    self.check_binding_type(field, declared, &value, line)?;
                }
                class.static_fields.borrow_mut().insert(field, value);
                Ok(())
            },
            Receiver::Value { value: Value::Instance(instance),
                              .. } => {
                if !is_public(field) {
                    return Err(RuntimeError::name(format!("Field '{field}' of class '{}' is not public",
                                                          instance.borrow().class_name()),
                                                  line));
                }
                self.write_field(&instance, field, value, line)
            },
            Receiver::Value { value: other, .. } => {
                Err(RuntimeError::type_error(format!("Cannot set field '{field}' of {}",
                                                     other.type_name()),
                                             line))
            },
        }
    }

    /// Calls a method on a string, list, object or set.
    ///
    /// # Errors
    /// `NameError` when the value's type has no such method.
    ///
    /// # Example
    /// ```
    /// use fight::interpreter::{evaluator::core::Context, value::core::Value};
    ///
    /// let mut ctx = Context::new();
    /// let list = Value::from(vec![Value::Integer(1)]);
    ///
    /// let outcome = ctx.call_type_method(&list, "append", vec![Value::Integer(2)], 1).unwrap();
    /// assert_eq!(outcome.result, Value::Void);
    /// assert_eq!(outcome.updated.unwrap().to_string(), "[1, 2]");
    /// ```
    pub fn call_type_method(&mut self,
                            value: &Value,
                            name: &str,
                            args: Vec<Value>,
                            line: usize)
                            -> EvalResult<MethodOutcome> {
        let outcome = match value {
            Value::Str(s) => string::call(s, name, &args, line)?,
            Value::List(items) => self.call_list_method(items, name, args, line)?,
            Value::Object(map) => object::call(map, name, &args, line)?,
            Value::Set(members) => set::call(members, name, &args, line)?,
            _ => None,
        };
        outcome.ok_or_else(|| {
                   RuntimeError::name(format!("Method '{name}' not found for type {}",
                                              value.type_name()),
                                      line)
               })
    }
}

fn read_static(class: &ClassRecord, name: &str, line: usize) -> EvalResult<Value> {
    class.static_fields.borrow().get(name).cloned().ok_or_else(|| {
                                                        RuntimeError::name(format!("Static field '{name}' not found in class '{}'",
                                                                                   class.name),
                                                                           line)
                                                    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::interpreter::{
        evaluator::core::{Context, EvalResult},
        lexer::tokenize,
        parser::core::parse_program,
        value::core::Value,
    };

    fn run(source: &str) -> EvalResult<(Context, Option<Value>)> {
        let tokens = tokenize(source).unwrap();
        let program = parse_program(&mut tokens.iter().peekable()).unwrap();
        let mut ctx = Context::new();
        let out = ctx.run_program(&program)?;
        Ok((ctx, out))
    }

    fn kind(source: &str) -> &'static str {
        run(source).err().map_or("ok", |e| e.kind_name())
    }

    const COUNTER: &str = "class A { fields { X: int = 10; secret = 1; static Made = 0; } \
                           methods { def Inc(n: int = 1) void { X += n; } \
                           def Get() int { return X; } def hidden() { } \
                           static def Make() int { return 7; } } init() { } }";

    #[test]
    fn methods_update_fields() {
        let (ctx, _) = run(&format!("{COUNTER} let a: A = new A(); a->Inc(n = 5);")).unwrap();
        assert_eq!(ctx.instances["a"].borrow().fields.get("X"), Some(&Value::Integer(15)));
    }

    #[test]
    fn lowercase_members_are_private() {
        assert_eq!(kind(&format!("{COUNTER} let a = new A(); a->hidden();")), "NameError");
        assert_eq!(kind(&format!("{COUNTER} let a = new A(); a->secret;")), "NameError");
        assert_eq!(kind(&format!("{COUNTER} let a = new A(); a->secret = 2;")), "NameError");
    }

    #[test]
    fn static_members_are_reached_through_the_class() {
        let (_, out) = run(&format!("{COUNTER} A->Made = A->Made + 2; A->Make() + A->Made;")).unwrap();
        assert_eq!(out, Some(Value::Integer(9)));
        assert_eq!(kind(&format!("{COUNTER} A->Get();")), "NameError");
    }

    #[test]
    fn void_calls_keep_the_receiver_in_a_chain() {
        let (_, out) = run(&format!("{COUNTER} let a = new A(); a->Inc()->Inc(2)->Get();")).unwrap();
        assert_eq!(out, Some(Value::Integer(13)));
    }

    #[test]
    fn builtin_mutators_write_back_to_the_variable() {
        let (ctx, _) = run("let xs = [3]; xs->append(4)->append(5); let s = \"ab\"; s->upper();").unwrap();
        assert_eq!(ctx.env.get("xs").unwrap().to_string(), "[3, 4, 5]");
        assert_eq!(ctx.env.get("s"), Some(&Value::from("AB")));
    }

    #[test]
    fn field_types_hold_across_method_calls() {
        assert_eq!(kind("class B { fields { N: int = 0; } methods { def Set(v) void { N = v; } } } \
                         let b = new B(); b->Set(\"x\");"),
                   "TypeError");
    }

    #[test]
    fn unknown_methods_are_name_errors() {
        assert_eq!(kind("let n = 5; n->length();"), "NameError");
        assert_eq!(kind("let s = \"x\"; s->nothing();"), "NameError");
        assert_eq!(kind(&format!("{COUNTER} let a = new A(); a->Nothing();")), "NameError");
    }

    #[test]
    fn named_arguments_to_builtin_methods_are_rejected() {
        assert_eq!(kind("let xs = [1]; xs->append(v = 2);"), "TypeError");
    }
}
