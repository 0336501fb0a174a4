use crate::{
    ast::{AssignTarget, BinaryOperator, Expr},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{Context, EvalResult},
            index::{assign_into, index_value},
            types::ANY,
        },
        value::core::Value,
    },
};

impl Context {
    /// Executes `let name[: type] = value;`.
    ///
    /// The first binding of a name records its type tag: the declared type
    /// when one is given, the runtime type of the value otherwise. Binding
    /// `new Class(...)` also registers the instance under `name` and then
    /// runs the `this->Method()` calls its constructor deferred.
    ///
    /// # Errors
    /// - `TypeError` when the value does not match the declared type, when
    ///   the name is re-declared in the same frame with a different type, or
    ///   when the value is `void`.
    /// - `ValueError` when re-declaring a constant.
    pub(crate) fn exec_let(&mut self,
                           name: &str,
                           declared: Option<&str>,
                           value: &Expr,
                           line: usize)
                           -> EvalResult<()> {
        if let Expr::New { class,
                           args,
                           line: new_line, } = value
        {
            let (instance, deferred) = self.construct(class, args, *new_line)?;
            self.bind_new(name, declared, Value::Instance(instance.clone()), line)?;
            self.instances.insert(name.to_string(), instance.clone());
            return self.replay_deferred(&instance, deferred, line);
        }

        let value = self.eval(value)?;
        self.bind_new(name, declared, value, line)
    }

    /// Executes `const NAME = value;`.
    pub(crate) fn exec_const(&mut self, name: &str, value: &Expr, line: usize) -> EvalResult<()> {
        let value = self.eval(value)?;
        self.bind_new(name, None, value, line)?;
        self.env.mark_constant(name);
        Ok(())
    }

    /// Creates (or re-declares) a binding in the innermost frame.
    fn bind_new(&mut self,
                name: &str,
                declared: Option<&str>,
                value: Value,
                line: usize)
                -> EvalResult<()> {
        if value.is_void() {
            return Err(RuntimeError::type_error(format!("Cannot bind '{name}' to a void value"),
                                                line));
        }
        let redeclared = self.env.get_local(name).is_some();
        if redeclared && self.env.is_constant(name) {
            return Err(RuntimeError::value(format!("Constant '{name}' cannot be reassigned"), line));
        }

        let (value, tag) = match declared {
            Some(declared) => {
                let value = self.coerce_to_declared(declared, value, line)?;
                if !self.type_matches(declared, &value) {
                    return Err(RuntimeError::type_error(format!("The value of variable '{name}' is {}, not '{declared}'",
                                                                self.get_value_type(&value)),
                                                        line));
                }
                (value, declared.to_string())
            },
            None => {
                let tag = self.get_value_type(&value);
                (value, tag)
            },
        };

        if redeclared
           && let Some(previous) = self.env.declared_type(name).map(str::to_string)
           && !self.type_matches(&previous, &value)
        {
            return Err(RuntimeError::type_error(format!("Cannot reassign variable '{name}' with a different type: {}",
                                                        self.get_value_type(&value)),
                                                line));
        }

        self.env.define(name, value, &tag);
        Ok(())
    }

    /// Reassigns an existing name.
    ///
    /// Inside a method, a name that is not a local of the method but is a
    /// field of its instance writes the field. Otherwise the nearest binding
    /// is updated, subject to its recorded type.
    ///
    /// # Errors
    /// - `ValueError` for constants.
    /// - `TypeError` on a type mismatch or a `void` value.
    /// - `NameError` when the name is not bound.
    pub(crate) fn assign_name(&mut self, name: &str, value: Value, line: usize) -> EvalResult<()> {
        if self.env.is_constant(name) {
            return Err(RuntimeError::value(format!("Constant '{name}' cannot be reassigned"), line));
        }
        if value.is_void() {
            return Err(RuntimeError::type_error(format!("Cannot assign a void value to '{name}'"),
                                                line));
        }

        let field_owner = if self.env.get_local(name).is_none() {
            self.this_stack
                .last()
                .map(|frame| frame.instance.clone())
                .filter(|instance| instance.borrow().fields.contains_key(name))
        } else {
            None
        };

        if let Some(instance) = field_owner {
            if self.writable_this().is_some() {
                return self.write_field(&instance, name, value, line);
            }
            if self.env.get(name).is_none() {
                // A callee assigning a field name gets its own copy.
                let tag = instance.borrow()
                                  .class
                                  .field_types
                                  .get(name)
                                  .cloned()
                                  .unwrap_or_else(|| ANY.to_string());
                self.check_binding_type(name, &tag, &value, line)?;
                self.env.define(name, value, &tag);
                return Ok(());
            }
        }

        let Some(declared) = self.env.declared_type(name).map(str::to_string) else {
            return Err(RuntimeError::name(format!("Variable '{name}' not defined"), line));
        };
        if !self.type_matches(&declared, &value) {
            return Err(RuntimeError::type_error(format!("Cannot reassign variable '{name}' with a different type: {}",
                                                        self.get_value_type(&value)),
                                                line));
        }
        self.env.assign(name, value);
        Ok(())
    }

    /// Executes `target = value;`.
    pub(crate) fn exec_assign(&mut self,
                              target: &AssignTarget,
                              value: &Expr,
                              line: usize)
                              -> EvalResult<()> {
        let value = self.eval(value)?;
        self.write_target(target, value, line)
    }

    /// Executes `target op= value;`.
    ///
    /// The current value is read, combined with the right operand using the
    /// binary operator, and written back through the same target.
    pub(crate) fn exec_compound_assign(&mut self,
                                       target: &AssignTarget,
                                       op: BinaryOperator,
                                       value: &Expr,
                                       line: usize)
                                       -> EvalResult<()> {
        let current = self.read_target(target, line)?;
        let operand = self.eval(value)?;
        let result = Self::apply_binary(op, &current, &operand, line)?;
        self.write_target(target, result, line)
    }

    /// Executes `name++;` and `name--;`.
    ///
    /// # Errors
    /// `TypeError` unless the variable holds an integer; `Exception` on
    /// overflow.
    pub(crate) fn exec_increment(&mut self, name: &str, delta: i64, line: usize) -> EvalResult<()> {
        let current = self.eval_variable(name, line)?;
        let Value::Integer(n) = current else {
            let op = if delta > 0 { "++" } else { "--" };
            return Err(RuntimeError::type_error(format!("'{op}' requires an integer, found {}",
                                                        current.type_name()),
                                                line));
        };
        let next = n.checked_add(delta)
                    .ok_or_else(|| RuntimeError::exception("integer overflow", line))?;
        self.assign_name(name, Value::Integer(next), line)
    }

    /// Executes `let {a, b} = object;`.
    ///
    /// Every name becomes a new binding holding the same-named key of the
    /// object (or field of the struct).
    ///
    /// # Errors
    /// - `NameError` when a target name already exists or a key is missing.
    /// - `TypeError` when the value is neither an object nor a struct.
    pub(crate) fn exec_destructure_object(&mut self,
                                          names: &[String],
                                          value: &Expr,
                                          line: usize)
                                          -> EvalResult<()> {
        let source = match self.eval(value)? {
            Value::Object(map) => (*map).clone(),
            Value::Struct(s) => s.fields.clone(),
            other => {
                return Err(RuntimeError::type_error(format!("Cannot destructure {} as an object",
                                                            other.type_name()),
                                                    line));
            },
        };

        self.ensure_fresh(names.iter().map(String::as_str), line)?;
        for name in names {
            let value = source.get(name).cloned().ok_or_else(|| {
                            RuntimeError::name(format!("Key '{name}' not found in the right object."),
                                               line)
                        })?;
            let tag = self.get_value_type(&value);
            self.env.define(name, value, &tag);
        }
        Ok(())
    }

    /// Executes `let [a, _, b] = list;`.
    ///
    /// # Errors
    /// - `NameError` when a target name already exists.
    /// - `IndexError` when the list is shorter than the pattern.
    /// - `TypeError` when the value is not a list.
    pub(crate) fn exec_destructure_list(&mut self,
                                        names: &[Option<String>],
                                        value: &Expr,
                                        line: usize)
                                        -> EvalResult<()> {
        let value = self.eval(value)?;
        let items = value.as_list(line)?.clone();

        self.ensure_fresh(names.iter().flatten().map(String::as_str), line)?;
        for (index, name) in names.iter().enumerate() {
            let Some(name) = name else { continue };
            let value = items.get(index).cloned().ok_or_else(|| {
                            RuntimeError::index(format!("Index {index} out of range for list of length {}",
                                                        items.len()),
                                                line)
                        })?;
            let tag = self.get_value_type(&value);
            self.env.define(name, value, &tag);
        }
        Ok(())
    }

    fn ensure_fresh<'n>(&self, mut names: impl Iterator<Item = &'n str>, line: usize) -> EvalResult<()> {
        match names.find(|name| self.lookup(name).is_some()) {
            Some(name) => Err(RuntimeError::name(format!("Variable '{name}' already exists!"), line)),
            None => Ok(()),
        }
    }

    /// Reads the current value stored at an assignment target.
    pub(crate) fn read_target(&mut self, target: &AssignTarget, line: usize) -> EvalResult<Value> {
        match target {
            AssignTarget::Name(name) => self.eval_variable(name, line),
            AssignTarget::Index { name, indices } => {
                let mut current = self.eval_variable(name, line)?;
                for index in indices {
                    let index = self.eval(index)?;
                    current = index_value(&current, &index, line)?;
                }
                Ok(current)
            },
            AssignTarget::ObjectKey { name, key } => {
                let container = self.eval_variable(name, line)?;
                let key = self.eval(key)?;
                index_value(&container, &key, line)
            },
            AssignTarget::Member { receiver, field } => self.read_member(receiver, field, line),
            AssignTarget::ThisField(field) => {
                let instance = self.current_this(line)?;
                self.read_field(&instance, field, true, line)
            },
        }
    }

    /// Stores a value at an assignment target.
    pub(crate) fn write_target(&mut self,
                               target: &AssignTarget,
                               value: Value,
                               line: usize)
                               -> EvalResult<()> {
        match target {
            AssignTarget::Name(name) => self.assign_name(name, value, line),
            AssignTarget::Index { name, indices } => {
                let indices = indices.iter()
                                     .map(|index| self.eval(index))
                                     .collect::<EvalResult<Vec<_>>>()?;
                let container = self.eval_variable(name, line)?;
                let updated = assign_into(container, &indices, value, line)?;
                self.assign_name(name, updated, line)
            },
            AssignTarget::ObjectKey { name, key } => {
                let key = self.eval(key)?;
                let container = self.eval_variable(name, line)?;
                let updated = assign_into(container, &[key], value, line)?;
                self.assign_name(name, updated, line)
            },
            AssignTarget::Member { receiver, field } => {
                self.write_member(receiver, field, value, line)
            },
            AssignTarget::ThisField(field) => {
                let instance = self.current_this(line)?;
                if !instance.borrow().fields.contains_key(field) {
                    return Err(RuntimeError::name(format!("Field '{field}' not found in class '{}'",
                                                          instance.borrow().class_name()),
                                                  line));
                }
                self.write_field(&instance, field, value, line)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::{lexer::tokenize, parser::core::parse_program};

    fn run(source: &str) -> EvalResult<Context> {
        let tokens = tokenize(source).unwrap();
        let program = parse_program(&mut tokens.iter().peekable()).unwrap();
        let mut ctx = Context::new();
        ctx.run_program(&program)?;
        Ok(ctx)
    }

    fn kind(source: &str) -> &'static str {
        run(source).err().map_or("ok", |e| e.kind_name())
    }

    #[test]
    fn reassignment_keeps_the_first_type() {
        assert_eq!(kind("let x = 5; x = \"hi\";"), "TypeError");
        assert_eq!(kind("let x = 5; x = 6;"), "ok");
        assert_eq!(kind("let x: any = 5; x = \"hi\";"), "ok");
    }

    #[test]
    fn constants_cannot_change() {
        assert_eq!(kind("const PI = 3.14; PI = 3;"), "ValueError");
        assert_eq!(kind("const PI = 3.14; PI = 2.5;"), "ValueError");
        assert_eq!(kind("const PI = 3.14; let PI = 1.0;"), "ValueError");
    }

    #[test]
    fn calls_do_not_change_caller_bindings() {
        let ctx = run("let n = 1; def f() { n = 2; return n; } let m = f();").unwrap();
        assert_eq!(ctx.env.get("n"), Some(&Value::Integer(1)));
        assert_eq!(ctx.env.get("m"), Some(&Value::Integer(2)));
    }

    #[test]
    fn nested_index_assignment_updates_the_variable() {
        let ctx = run("let grid = [[1, 2], [3, 4]]; grid[1][0] = 9; \
                       let d = {a: 1}; d{\"b\"} = 2; d{\"a\"} += 5;").unwrap();
        assert_eq!(ctx.env.get("grid").unwrap().to_string(), "[[1, 2], [9, 4]]");
        assert_eq!(ctx.env.get("d").unwrap().to_string(), "{a: 6, b: 2}");
    }

    #[test]
    fn destructuring_checks_names_keys_and_bounds() {
        let ctx = run("let {a, b} = {a: 1, b: \"x\"}; let [p, _, q] = [1, 2, 3];").unwrap();
        assert_eq!(ctx.env.get("b"), Some(&Value::from("x")));
        assert_eq!(ctx.env.get("q"), Some(&Value::Integer(3)));

        assert_eq!(kind("let a = 0; let {a} = {a: 1};"), "NameError");
        assert_eq!(kind("let {z} = {a: 1};"), "NameError");
        assert_eq!(kind("let [x, y] = [1];"), "IndexError");
    }

    #[test]
    fn increments_require_integers() {
        let ctx = run("let i = 1; i++; i++; i--;").unwrap();
        assert_eq!(ctx.env.get("i"), Some(&Value::Integer(2)));
        assert_eq!(kind("let f = 1.5; f++;"), "TypeError");
    }

    #[test]
    fn void_values_cannot_be_bound() {
        assert_eq!(kind("def f() void { } let x = f();"), "TypeError");
    }
}
