use std::{cell::RefCell, rc::Rc};

use tracing::trace;

use crate::{
    ast::{Annotations, CallArgs, Expr, FunctionDef},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{Context, EvalResult, Flow, ThisFrame},
            environment::Environment,
            types::VOID,
        },
        value::{
            core::Value,
            object_map::ObjectMap,
            record::{Function, Instance},
        },
    },
};

/// Evaluated call arguments: positional values and `name = value` pairs.
pub type Arguments = (Vec<Value>, Vec<(String, Value)>);

/// A parameter bound for a call: name, value and the type recorded for it.
pub(crate) struct Binding {
    pub name:     String,
    pub value:    Value,
    pub type_tag: String,
}

impl Context {
    /// Declares `def name(...) { }` in the current frame.
    ///
    /// # Errors
    /// `NameError` when a function of the same name already exists in the
    /// current frame.
    pub(crate) fn declare_function(&mut self, def: &Rc<FunctionDef>) -> EvalResult<()> {
        if matches!(self.env.get_local(&def.name), Some(Value::Function(_))) {
            return Err(RuntimeError::name(format!("Function '{}' already defined", def.name),
                                          def.line));
        }
        trace!(function = %def.name, line = def.line, "declare function");
        let annotations = Rc::new(self.eval_annotations(&def.annotations)?);
        let func = Function { annotations,
                              ..Function::new(def.clone()) };
        self.env.define(&def.name, Value::Function(Rc::new(func)), "function");
        Ok(())
    }

    /// Evaluates `@annotation(...)` values in the current scope, in
    /// declaration order.
    pub(crate) fn eval_annotations(&mut self, annotations: &Annotations) -> EvalResult<ObjectMap> {
        let mut map = ObjectMap::new();
        for (key, expr) in annotations {
            let value = self.eval(expr)?;
            map.insert(key.clone(), value);
        }
        Ok(map)
    }

    /// Evaluates a call expression `callee(args)`.
    ///
    /// A bare name that is bound nowhere is looked up in the builtin table;
    /// every other callee is evaluated and must produce a function.
    ///
    /// Arguments are evaluated left to right, positional ones first.
    pub(crate) fn eval_call(&mut self,
                            callee: &Expr,
                            args: &CallArgs,
                            line: usize)
                            -> EvalResult<Value> {
        if let Expr::Variable { name, .. } = callee
           && self.lookup(name).is_none()
           && !self.instances.contains_key(name)
        {
            return self.call_builtin(name, args, line);
        }

        let callee = self.eval(callee)?;
        let (positional, named) = self.eval_args(args)?;
        self.call_value(&callee, positional, named, line)
    }

    /// Evaluates call arguments in source order.
    pub(crate) fn eval_args(&mut self, args: &CallArgs) -> EvalResult<Arguments> {
        let positional = args.positional
                             .iter()
                             .map(|e| self.eval(e))
                             .collect::<EvalResult<Vec<_>>>()?;
        let mut named = Vec::with_capacity(args.named.len());
        for (name, expr) in &args.named {
            named.push((name.clone(), self.eval(expr)?));
        }
        Ok((positional, named))
    }

    /// Calls a function value with evaluated arguments.
    ///
    /// # Errors
    /// `TypeError` when `callee` is not a function, plus every error raised
    /// by parameter binding or by the function body.
    ///
    /// # Example
    /// ```
    /// use fight::interpreter::{
    ///     evaluator::core::Context, lexer::tokenize, parser::core::parse_program,
    ///     value::core::Value,
    /// };
    ///
    /// let tokens = tokenize("def add(a: int, b: int = 10) int { return a + b; }").unwrap();
    /// let program = parse_program(&mut tokens.iter().peekable()).unwrap();
    ///
    /// let mut ctx = Context::new();
    /// ctx.run_program(&program).unwrap();
    /// let add = ctx.lookup("add").unwrap();
    ///
    /// let sum = ctx.call_value(&add, vec![Value::Integer(1)], vec![], 1).unwrap();
    /// assert_eq!(sum, Value::Integer(11));
    /// ```
    pub fn call_value(&mut self,
                      callee: &Value,
                      positional: Vec<Value>,
                      named: Vec<(String, Value)>,
                      line: usize)
                      -> EvalResult<Value> {
        match callee {
            Value::Function(func) => {
                self.invoke(&func.def, func.closure.as_ref(), None, positional, named, line)
            },
            other => Err(RuntimeError::type_error(format!("'{}' object is not callable",
                                                          other.type_name()),
                                                  line)),
        }
    }

    /// Runs a function, method or constructor body.
    ///
    /// Arguments are bound in a new frame on top of the caller's frames, so
    /// the body sees the caller's bindings as well as its parameters. An
    /// imported function instead runs on top of its module's environment,
    /// which is swapped in for the duration of the call. When `this` is set
    /// the body runs as a method of that instance.
    ///
    /// The caller's frames, receiver and environment are restored whether the
    /// body succeeds or fails.
    pub(crate) fn invoke(&mut self,
                         def: &FunctionDef,
                         closure: Option<&Rc<Environment>>,
                         this: Option<Rc<RefCell<Instance>>>,
                         positional: Vec<Value>,
                         named: Vec<(String, Value)>,
                         line: usize)
                         -> EvalResult<Value> {
        trace!(function = %def.name, args = positional.len() + named.len(), "call");
        let bindings = self.bind_arguments(def, positional, named, line)?;

        let saved_env = closure.map(|env| std::mem::replace(&mut self.env, env.as_ref().clone()));
        self.env.push_frame();
        for binding in bindings {
            self.env.define(&binding.name, binding.value, &binding.type_tag);
        }
        let pushed_this = this.is_some();
        if let Some(instance) = this {
            self.this_stack.push(ThisFrame { instance,
                                             frame: self.env.frame_id(),
                                             constructor: false });
        }

        let flow = self.exec_block(&def.body);

        if pushed_this {
            self.this_stack.pop();
        }
        self.env.pop_frame();
        if let Some(env) = saved_env {
            self.env = env;
        }

        let value = match flow? {
            Flow::Return(value) => value,
            Flow::Normal(_) | Flow::Break => Value::Void,
        };
        self.check_return(def, value, line)
    }

    /// Binds call arguments to the parameters of `def`.
    ///
    /// Positional arguments fill parameters in order, then named arguments
    /// fill parameters by name, then defaults fill whatever remains. Default
    /// expressions are evaluated in the caller's scope.
    ///
    /// # Errors
    /// `TypeError` for too many positional arguments, an unknown or repeated
    /// parameter name, a missing required argument, or a positional argument
    /// whose type does not match the declared parameter type. Named arguments
    /// are not type-checked.
    pub(crate) fn bind_arguments(&mut self,
                                 def: &FunctionDef,
                                 positional: Vec<Value>,
                                 named: Vec<(String, Value)>,
                                 line: usize)
                                 -> EvalResult<Vec<Binding>> {
        if positional.len() > def.params.len() {
            return Err(RuntimeError::type_error(format!("{}() takes {} argument(s) but {} were given",
                                                        def.name,
                                                        def.params.len(),
                                                        positional.len()),
                                                line));
        }

        let given = positional.len();
        let mut slots: Vec<Option<Value>> = vec![None; def.params.len()];
        for (slot, value) in slots.iter_mut().zip(positional) {
            *slot = Some(value);
        }
        for (name, value) in named {
            let Some(index) = def.params.iter().position(|p| p.name == name) else {
                return Err(RuntimeError::type_error(format!("{}() got an unexpected keyword argument '{name}'",
                                                            def.name),
                                                    line));
            };
            if slots[index].is_some() {
                return Err(RuntimeError::type_error(format!("{}() got multiple values for argument '{name}'",
                                                            def.name),
                                                    line));
            }
            slots[index] = Some(value);
        }

        let mut bindings = Vec::with_capacity(def.params.len());
        for (index, (param, slot)) in def.params.iter().zip(slots).enumerate() {
            let value = match (slot, &param.default) {
                // Keyword arguments are bound as given.
                (Some(value), _) if index >= given => value,
                (Some(value), _) => {
                    if let Some(declared) = &param.type_name {
                        let value = self.coerce_to_declared(declared, value, line)?;
                        if !self.type_matches(declared, &value) {
                            return Err(RuntimeError::type_error(format!("Argument '{}' of {}() must be {declared}, got {}",
                                                                        param.name,
                                                                        def.name,
                                                                        self.get_value_type(&value)),
                                                                line));
                        }
                        value
                    } else {
                        value
                    }
                },
                (None, Some(default)) => self.eval(default)?,
                (None, None) => {
                    return Err(RuntimeError::type_error(format!("{}() missing required argument '{}'",
                                                                def.name, param.name),
                                                        line));
                },
            };
            let type_tag = match &param.type_name {
                Some(declared) if self.type_matches(declared, &value) => declared.clone(),
                _ => self.get_value_type(&value),
            };
            bindings.push(Binding { name: param.name.clone(),
                                    value,
                                    type_tag });
        }
        Ok(bindings)
    }

    /// Checks a returned value against the declared return type.
    ///
    /// Without a declared type any value is accepted. `void` requires that
    /// nothing was returned; any other type requires a value of that type.
    fn check_return(&self, def: &FunctionDef, value: Value, line: usize) -> EvalResult<Value> {
        let Some(declared) = def.return_type.as_deref() else {
            return Ok(value);
        };

        if declared == VOID {
            if value.is_void() {
                return Ok(value);
            }
            return Err(RuntimeError::type_error(format!("{}() is declared void but returned {}",
                                                        def.name,
                                                        self.get_value_type(&value)),
                                                line));
        }

        if value.is_void() {
            return Err(RuntimeError::type_error(format!("{}() must return {declared} but returned nothing",
                                                        def.name),
                                                line));
        }
        let value = self.coerce_to_declared(declared, value, line)?;
        if !self.type_matches(declared, &value) {
            return Err(RuntimeError::type_error(format!("{}() must return {declared}, got {}",
                                                        def.name,
                                                        self.get_value_type(&value)),
                                                line));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::{lexer::tokenize, parser::core::parse_program};

    fn run(source: &str) -> EvalResult<Option<Value>> {
        let tokens = tokenize(source).unwrap();
        let program = parse_program(&mut tokens.iter().peekable()).unwrap();
        Context::new().run_program(&program)
    }

    #[test]
    fn named_arguments_and_defaults() {
        let out = run("def f(a, b = 2, c = 3) { return [a, b, c]; } f(1, c = 9);").unwrap();
        assert_eq!(out.unwrap().to_string(), "[1, 2, 9]");
    }

    #[test]
    fn binding_errors_are_type_errors() {
        for source in ["def f(a) { } f(1, 2);",
                       "def f(a) { } f(b = 1);",
                       "def f(a) { } f(1, a = 2);",
                       "def f(a, b) { } f(1);",
                       "def f(a: int) { } f(\"x\");"]
        {
            assert_eq!(run(source).unwrap_err().kind_name(), "TypeError", "{source}");
        }
    }

    #[test]
    fn keyword_arguments_skip_the_parameter_type_check() {
        let out = run("def f(a: int) { return a; } f(a = \"x\");").unwrap();
        assert_eq!(out, Some(Value::from("x")));
    }

    #[test]
    fn return_types_are_enforced() {
        assert_eq!(run("def f() void { return 1; } f();").unwrap_err().kind_name(),
                   "TypeError");
        assert_eq!(run("def f() int { } f();").unwrap_err().kind_name(), "TypeError");
        assert_eq!(run("def f(x) int { if (x) { loop (true) { return \"s\"; } } return 0; } f(1);")
                       .unwrap_err()
                       .kind_name(),
                   "TypeError");
    }

    #[test]
    fn locals_do_not_leak_but_globals_are_visible() {
        let out = run("let g = 10; def f() { let local = g + 1; return local; } f();").unwrap();
        assert_eq!(out, Some(Value::Integer(11)));
        assert_eq!(run("def f() { let local = 1; } f(); local;").unwrap_err().kind_name(),
                   "NameError");
    }

    #[test]
    fn redefinition_in_the_same_scope_fails() {
        assert_eq!(run("def f() { } def f() { }").unwrap_err().kind_name(), "NameError");
    }

    #[test]
    fn curried_calls_apply_in_turn() {
        let out = run("def pick(f) { return f; } pick(lambda x: x * 2)(21);").unwrap();
        assert_eq!(out, Some(Value::Integer(42)));
    }

    #[test]
    fn calling_a_number_is_a_type_error() {
        assert_eq!(run("let n = 1; n();").unwrap_err().kind_name(), "TypeError");
    }
}
