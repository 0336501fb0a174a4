use std::{cell::RefCell, rc::Rc};

use tracing::{debug, trace};

use crate::{
    ast::{AssignTarget, CallArgs, Expr, FunctionDef, Member, Statement},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult, Flow, ThisFrame},
        value::{core::Value, record::Instance},
    },
    util::is_public,
};

/// A `this->Method(...)` call issued by a constructor.
///
/// The arguments are evaluated when the call is met; the call itself runs
/// once the new instance has been bound to its name.
#[derive(Debug, Clone)]
pub(crate) struct DeferredCall {
    pub method:     String,
    pub positional: Vec<Value>,
    pub named:      Vec<(String, Value)>,
    pub line:       usize,
}

impl Context {
    /// Evaluates `new Class(args)` outside of a `let` binding.
    ///
    /// Deferred constructor calls run straight away, since there is no name
    /// to register the instance under.
    pub(crate) fn eval_new(&mut self, class: &str, args: &CallArgs, line: usize) -> EvalResult<Value> {
        let (instance, deferred) = self.construct(class, args, line)?;
        self.replay_deferred(&instance, deferred, line)?;
        Ok(Value::Instance(instance))
    }

    /// Creates an instance of `class` and runs the matching constructor.
    ///
    /// The constructor is the `init` whose parameter count equals the number
    /// of arguments. A class without any `init` accepts zero arguments.
    ///
    /// # Returns
    /// The instance together with the `this->Method()` calls the constructor
    /// deferred.
    ///
    /// # Errors
    /// - `NameError` when the class is not declared.
    /// - `ValueError` when no constructor takes that many arguments.
    #[tracing::instrument(level = "debug", skip(self, args, line))]
    pub(crate) fn construct(&mut self,
                            class: &str,
                            args: &CallArgs,
                            line: usize)
                            -> EvalResult<(Rc<RefCell<Instance>>, Vec<DeferredCall>)> {
        let record = self.env
                         .classes
                         .get(class)
                         .cloned()
                         .ok_or_else(|| RuntimeError::name(format!("Class '{class}' not defined"), line))?;

        let (positional, named) = self.eval_args(args)?;
        let arity = positional.len() + named.len();
        let init = match record.inits.get(&arity) {
            Some(init) => Some(init.clone()),
            None if record.inits.is_empty() && arity == 0 => None,
            None => {
                return Err(RuntimeError::value(format!("No matching constructor found for {arity} argument(s) in class '{class}'"),
                                               line));
            },
        };

        let instance = Rc::new(RefCell::new(Instance { class:  record.clone(),
                                                       fields: record.fields.clone(), }));
        let deferred = match init {
            Some(init) => self.run_init(&instance, &init, positional, named, line)?,
            None => Vec::new(),
        };
        debug!(deferred = deferred.len(), "instance created");
        Ok((instance, deferred))
    }

    /// Runs a constructor body against a fresh instance.
    ///
    /// Top-level statements of the body are routed by shape: a bare
    /// `this->Method(...)` call is deferred, an assignment to a field name
    /// writes the field even when a parameter has the same name, and
    /// everything else runs normally.
    fn run_init(&mut self,
                instance: &Rc<RefCell<Instance>>,
                init: &FunctionDef,
                positional: Vec<Value>,
                named: Vec<(String, Value)>,
                line: usize)
                -> EvalResult<Vec<DeferredCall>> {
        let bindings = self.bind_arguments(init, positional, named, line)?;

        self.env.push_frame();
        for binding in bindings {
            self.env.define(&binding.name, binding.value, &binding.type_tag);
        }
        self.this_stack.push(ThisFrame { instance:    instance.clone(),
                                         frame:       self.env.frame_id(),
                                         constructor: true, });

        let result = self.run_init_body(instance, &init.body);

        self.this_stack.pop();
        self.env.pop_frame();
        result
    }

    fn run_init_body(&mut self,
                     instance: &Rc<RefCell<Instance>>,
                     body: &[Statement])
                     -> EvalResult<Vec<DeferredCall>> {
        let mut deferred = Vec::new();
        for statement in body {
            if let Some((method, args, line)) = this_call(statement) {
                let (positional, named) = self.eval_args(args)?;
                trace!(method, "deferred constructor call");
                deferred.push(DeferredCall { method: method.to_string(),
                                             positional,
                                             named,
                                             line });
                continue;
            }
            match statement {
                Statement::Assign { target: AssignTarget::Name(name),
                                    value,
                                    line, } if instance.borrow().fields.contains_key(name) => {
                    let value = self.eval(value)?;
                    self.write_field(instance, name, value, *line)?;
                },
                _ => {
                    if let Flow::Return(_) = self.eval_statement(statement)? {
                        break;
                    }
                },
            }
        }
        Ok(deferred)
    }

    /// Runs the calls a constructor deferred, in the order they were met.
    pub(crate) fn replay_deferred(&mut self,
                                  instance: &Rc<RefCell<Instance>>,
                                  deferred: Vec<DeferredCall>,
                                  line: usize)
                                  -> EvalResult<()> {
        if !deferred.is_empty() {
            trace!(calls = deferred.len(), line, "replaying deferred constructor calls");
        }
        for call in deferred {
            self.call_method(instance, &call.method, call.positional, call.named, true, call.line)?;
        }
        Ok(())
    }

    /// Executes `super(Field = value, ...);` inside a constructor.
    ///
    /// # Errors
    /// - `NameError` outside of an `init` body, or for an unknown field.
    /// - `TypeError` when a value does not match the field type.
    pub(crate) fn exec_super(&mut self, assignments: &[(String, Expr)], line: usize) -> EvalResult<()> {
        let instance = self.this_stack
                           .last()
                           .filter(|frame| frame.constructor && frame.frame == self.env.frame_id())
                           .map(|frame| frame.instance.clone())
                           .ok_or_else(|| RuntimeError::name("'super' is only allowed in an init body", line))?;

        for (field, expr) in assignments {
            let value = self.eval(expr)?;
            self.write_field(&instance, field, value, line)?;
        }
        Ok(())
    }

    /// Reads a field of an instance.
    ///
    /// With `internal` unset the field must be public.
    ///
    /// # Errors
    /// `NameError` for a missing or non-public field.
    pub(crate) fn read_field(&self,
                             instance: &Rc<RefCell<Instance>>,
                             field: &str,
                             internal: bool,
                             line: usize)
                             -> EvalResult<Value> {
        let instance = instance.borrow();
        if !internal && !is_public(field) {
            return Err(RuntimeError::name(format!("Field '{field}' of class '{}' is not public",
                                                  instance.class_name()),
                                          line));
        }
        instance.fields.get(field).cloned().ok_or_else(|| {
                                               RuntimeError::name(format!("Field '{field}' not found in class '{}'",
                                                                          instance.class_name()),
                                                                  line)
                                           })
    }

    /// Writes a field of an instance, checking the field's type.
    ///
    /// # Errors
    /// - `NameError` when the class has no such field.
    /// - `TypeError` for a `void` value or a type mismatch.
    pub(crate) fn write_field(&self,
                              instance: &Rc<RefCell<Instance>>,
                              field: &str,
                              value: Value,
                              line: usize)
                              -> EvalResult<()> {
        let class = instance.borrow().class.clone();
        if !instance.borrow().fields.contains_key(field) {
            return Err(RuntimeError::name(format!("Field '{field}' not found in class '{}'",
                                                  class.name),
                                          line));
        }
        if value.is_void() {
            return Err(RuntimeError::type_error(format!("Cannot assign a void value to field '{field}'"),
                                                line));
        }

        let value = match class.field_types.get(field) {
            Some(declared) => {
                let value = self.coerce_to_declared(declared, value, line)?;
                self.check_binding_type(field, declared, &value, line)?;
                value
            },
            None => value,
        };
        instance.borrow_mut().fields.insert(field, value);
        Ok(())
    }
}

/// Matches a statement of the form `this->Method(args);`.
fn this_call(statement: &Statement) -> Option<(&str, &CallArgs, usize)> {
    let Statement::Expression { expr: Expr::MemberChain { receiver, segments, line },
                                .. } = statement
    else {
        return None;
    };
    match (receiver.as_ref(), segments.as_slice()) {
        (Expr::This { .. }, [Member::Call { name, args }]) => Some((name, args, *line)),
        _ => None,
    }
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

    #[test]
    fn constructor_is_chosen_by_arity() {
        let source = "class Person { fields { Name = \"\"; Age = 0; } \
                      init(n) { Name = n; } init(n, a, x, y) { Name = n; Age = a; } }";
        let (_, out) = run(&format!("{source} let p = new Person(\"ann\"); p->Name;")).unwrap();
        assert_eq!(out, Some(Value::from("ann")));

        let err = run(&format!("{source} let p = new Person(1, 2, 3);")).err().unwrap();
        assert_eq!(err.kind_name(), "ValueError");
    }

    #[test]
    fn parameters_may_share_a_field_name() {
        let (_, out) = run("class Box { fields { Size = 0; } init(Size) { Size = Size; } } \
                            let b = new Box(4); b->Size;")
                       .unwrap();
        assert_eq!(out, Some(Value::Integer(4)));
    }

    #[test]
    fn deferred_calls_run_after_registration() {
        let (ctx, _) = run("class Counter { fields { N = 0; } \
                            methods { def Bump() void { N += 1; } } \
                            init() { this->Bump(); this->Bump(); } } \
                            let c = new Counter();")
                       .unwrap();
        let counter = &ctx.instances["c"];
        assert_eq!(counter.borrow().fields.get("N"), Some(&Value::Integer(2)));
    }

    #[test]
    fn super_initialises_inherited_fields() {
        let (_, out) = run("class Animal { fields { Name = \"\"; } } \
                            class Dog extends Animal { fields { Breed = \"\"; } \
                            init(n, b) { super(Name = n); Breed = b; } } \
                            let d = new Dog(\"rex\", \"lab\"); d->Name + \"/\" + d->Breed;")
                       .unwrap();
        assert_eq!(out, Some(Value::from("rex/lab")));
    }

    #[test]
    fn implicit_constructor_takes_no_arguments() {
        assert!(run("class Empty { } let e = new Empty();").is_ok());
        let err = run("class Empty { } let e = new Empty(1);").err().unwrap();
        assert_eq!(err.kind_name(), "ValueError");
    }

    #[test]
    fn field_writes_are_type_checked() {
        let err = run("class A { fields { X: int = 1; } init() { X = \"s\"; } } let a = new A();").err()
                                                                                                 .unwrap();
        assert_eq!(err.kind_name(), "TypeError");
    }

    #[test]
    fn unknown_class_is_a_name_error() {
        let err = run("let a = new Nope();").err().unwrap();
        assert_eq!(err.kind_name(), "NameError");
    }
}
