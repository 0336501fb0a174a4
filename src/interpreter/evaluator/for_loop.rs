use crate::{
    ast::{Expr, Statement},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{Context, EvalResult, Flow},
            utils::chars_of,
        },
        value::core::Value,
    },
};

/// Returns the values a `for (x in v)` loop visits.
///
/// Lists yield their elements, strings their characters, sets their members
/// in order, and objects their keys.
///
/// # Errors
/// `TypeError` for every other value.
///
/// # Example
/// ```
/// use fight::interpreter::{evaluator::for_loop::iteration_items, value::core::Value};
///
/// let items = iteration_items(&Value::from("ab"), 1).unwrap();
/// assert_eq!(items, vec![Value::from("a"), Value::from("b")]);
/// assert!(iteration_items(&Value::Integer(3), 1).is_err());
/// ```
pub fn iteration_items(iterable: &Value, line: usize) -> EvalResult<Vec<Value>> {
    match iterable {
        Value::List(items) => Ok(items.as_ref().clone()),
        Value::Str(s) => Ok(chars_of(s)),
        Value::Set(set) => Ok(set.iter().cloned().map(Value::from).collect()),
        Value::Object(map) => Ok(map.keys().map(Value::from).collect()),
        other => Err(RuntimeError::type_error(format!("'{}' object is not iterable",
                                                      other.type_name()),
                                              line)),
    }
}

impl Context {
    /// Executes `for (var in iterable) { body }`.
    ///
    /// The iterable is evaluated once, before the first iteration. The loop
    /// variable keeps its last value after the loop.
    ///
    /// # Errors
    /// `ValueError` when the loop variable is a constant, `TypeError` when an
    /// item does not match the type already recorded for it.
    pub(crate) fn exec_for_in(&mut self,
                              var: &str,
                              iterable: &Expr,
                              body: &[Statement],
                              line: usize)
                              -> EvalResult<Flow> {
        let iterable = self.eval(iterable)?;
        let rebinds = self.lookup(var).is_some();
        for item in iteration_items(&iterable, line)? {
            self.bind_loop_var(var, item, rebinds, line)?;
            match self.exec_block(body)? {
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal(_) => {},
            }
        }
        Ok(Flow::Normal(Value::Void))
    }

    /// Executes `for (var : start to end) { body }`.
    ///
    /// Both bounds are inclusive. When `start` is greater than `end` the loop
    /// counts down; when they are equal the body runs once.
    ///
    /// # Errors
    /// `TypeError` when either bound is not an integer.
    pub(crate) fn exec_for_range(&mut self,
                                 var: &str,
                                 start: &Expr,
                                 end: &Expr,
                                 body: &[Statement],
                                 line: usize)
                                 -> EvalResult<Flow> {
        let start = self.eval(start)?.as_int(line)?;
        let end = self.eval(end)?.as_int(line)?;

        let values: Box<dyn Iterator<Item = i64>> = if start <= end {
            Box::new(start..=end)
        } else {
            Box::new((end..=start).rev())
        };

        let rebinds = self.lookup(var).is_some();
        for i in values {
            self.bind_loop_var(var, Value::Integer(i), rebinds, line)?;
            match self.exec_block(body)? {
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal(_) => {},
            }
        }
        Ok(Flow::Normal(Value::Void))
    }

    /// Binds the loop variable for one iteration.
    ///
    /// A name bound before the loop is reassigned, so constants and recorded
    /// types are enforced; a fresh name is defined in the current frame.
    fn bind_loop_var(&mut self, var: &str, item: Value, rebinds: bool, line: usize) -> EvalResult<()> {
        if rebinds {
            return self.assign_name(var, item, line);
        }
        let type_tag = self.get_value_type(&item);
        self.env.define(var, item, &type_tag);
        Ok(())
    }

    /// Evaluates a list generator `generator[body; var = start to end, step]`.
    ///
    /// The range is inclusive. A negative step counts down from `start` to
    /// `end`. The body is evaluated in a frame of its own, so the generator
    /// variable does not leak into the surrounding scope.
    ///
    /// # Errors
    /// - `TypeError` when a bound or the step is not an integer.
    /// - `ValueError` when the step is zero.
    pub(crate) fn eval_generator(&mut self,
                                 body: &Expr,
                                 var: &str,
                                 start: &Expr,
                                 end: &Expr,
                                 step: Option<&Expr>,
                                 line: usize)
                                 -> EvalResult<Value> {
        let start = self.eval(start)?.as_int(line)?;
        let end = self.eval(end)?.as_int(line)?;
        let step = match step {
            Some(step) => self.eval(step)?.as_int(line)?,
            None => 1,
        };
        if step == 0 {
            return Err(RuntimeError::value("Generator step cannot be zero", line));
        }

        self.env.push_frame();
        let result = self.generate(body, var, start, end, step);
        self.env.pop_frame();
        result.map(Value::from)
    }

    fn generate(&mut self,
                body: &Expr,
                var: &str,
                start: i64,
                end: i64,
                step: i64)
                -> EvalResult<Vec<Value>> {
        let mut out = Vec::new();
        let mut i = start;
        while (step > 0 && i <= end) || (step < 0 && i >= end) {
            self.env.define(var, Value::Integer(i), "int");
            out.push(self.eval(body)?);
            let Some(next) = i.checked_add(step) else {
                break;
            };
            i = next;
        }
        Ok(out)
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
    fn ranges_count_down_and_include_both_ends() {
        let out = run("let seen = []; for (i : 3 to 1) { seen = seen + [i]; } seen;").unwrap();
        assert_eq!(out.unwrap().to_string(), "[3, 2, 1]");

        let out = run("let n = 0; for (i : 4 to 4) { n++; } n;").unwrap();
        assert_eq!(out, Some(Value::Integer(1)));
    }

    #[test]
    fn existing_loop_variables_keep_their_rules() {
        let err = run("const K = 1; for (K in [\"a\", \"b\"]) { }").unwrap_err();
        assert_eq!(err.kind_name(), "ValueError");
        let err = run("let x = 5; for (x in [\"s\"]) { }").unwrap_err();
        assert_eq!(err.kind_name(), "TypeError");
        let err = run("const I = 0; for (I : 1 to 3) { }").unwrap_err();
        assert_eq!(err.kind_name(), "ValueError");

        let out = run("let x = 0; for (x in [4, 7]) { } x;").unwrap();
        assert_eq!(out, Some(Value::Integer(7)));
    }

    #[test]
    fn fresh_loop_variables_take_each_item() {
        let out = run("let seen = \"\"; for (v in [1, \"a\", true]) { seen = seen + ToString(v); } seen;")
            .unwrap();
        assert_eq!(out, Some(Value::from("1atrue")));
    }

    #[test]
    fn float_bounds_are_rejected() {
        let err = run("for (i : 1.5 to 3) { }").unwrap_err();
        assert_eq!(err.kind_name(), "TypeError");
    }

    #[test]
    fn objects_iterate_over_keys() {
        let out = run("let ks = \"\"; for (k in {a: 1, b: 2}) { ks = ks + k; } ks;").unwrap();
        assert_eq!(out, Some(Value::from("ab")));
    }

    #[test]
    fn generators_honour_negative_steps() {
        let out = run("generator[i * 2; i = 5 to 1, -2];").unwrap();
        assert_eq!(out.unwrap().to_string(), "[10, 6, 2]");
    }

    #[test]
    fn zero_step_is_a_value_error() {
        let err = run("generator[i; i = 1 to 3, 0];").unwrap_err();
        assert_eq!(err.kind_name(), "ValueError");
    }
}
