use crate::{
    ast::{CatchClause, Expr, MatchArm, Statement},
    interpreter::{
        evaluator::core::{Context, EvalResult, Flow},
        value::core::Value,
    },
};

impl Context {
    /// Executes an `if` / `elif` / `else` chain.
    ///
    /// Conditions are tested in order using truthiness; the first branch
    /// whose condition holds runs and the rest are skipped.
    ///
    /// # Returns
    /// The flow of the branch that ran, or `Flow::Normal(void)` when none
    /// did.
    pub(crate) fn exec_if(&mut self,
                          branches: &[(Expr, Vec<Statement>)],
                          else_branch: Option<&[Statement]>)
                          -> EvalResult<Flow> {
        for (condition, body) in branches {
            if self.eval(condition)?.is_truthy() {
                return self.exec_block(body);
            }
        }
        match else_branch {
            Some(body) => self.exec_block(body),
            None => Ok(Flow::Normal(Value::Void)),
        }
    }

    /// Executes `loop (condition) { body }`.
    ///
    /// The condition is re-evaluated before every iteration. `break` ends the
    /// loop; `return` propagates to the enclosing call.
    pub(crate) fn exec_loop(&mut self, condition: &Expr, body: &[Statement]) -> EvalResult<Flow> {
        while self.eval(condition)?.is_truthy() {
            match self.exec_block(body)? {
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal(_) => {},
            }
        }
        Ok(Flow::Normal(Value::Void))
    }

    /// Executes `do { body } while (condition);`.
    ///
    /// The body always runs at least once.
    pub(crate) fn exec_do_while(&mut self,
                                body: &[Statement],
                                condition: &Expr)
                                -> EvalResult<Flow> {
        loop {
            match self.exec_block(body)? {
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal(_) => {},
            }
            if !self.eval(condition)?.is_truthy() {
                break;
            }
        }
        Ok(Flow::Normal(Value::Void))
    }

    /// Executes a `switch` statement.
    ///
    /// Case values are evaluated in order and compared to the subject with
    /// `==`. Only the first matching case runs; there is no fall-through. The
    /// `default` body runs when no case matches. A switch is not a loop: a
    /// `break` inside the chosen body ends the enclosing loop.
    pub(crate) fn exec_switch(&mut self,
                              subject: &Expr,
                              cases: &[(Expr, Vec<Statement>)],
                              default: Option<&[Statement]>)
                              -> EvalResult<Flow> {
        let subject = self.eval(subject)?;

        let mut chosen = default;
        for (case, body) in cases {
            if self.eval(case)? == subject {
                chosen = Some(body);
                break;
            }
        }

        match chosen {
            Some(body) => self.exec_block(body),
            None => Ok(Flow::Normal(Value::Void)),
        }
    }

    /// Executes `try { } catch (Kind) { } finally { }`.
    ///
    /// When the body raises, the first handler whose kind matches the error
    /// runs (`Exception` matches every error). An error no handler matches is
    /// discarded. The `finally` body always runs last; a `return` or `break`
    /// in it replaces whatever the body or handler produced.
    ///
    /// Errors raised inside a handler propagate after `finally` has run.
    pub(crate) fn exec_try(&mut self,
                           body: &[Statement],
                           handlers: &[CatchClause],
                           finally: Option<&[Statement]>)
                           -> EvalResult<Flow> {
        let depth = self.env.depth();
        let this_len = self.this_stack.len();

        let outcome = match self.exec_block(body) {
            Ok(flow) => Ok(flow),
            Err(err) => {
                self.unwind_to(depth, this_len);
                tracing::debug!(kind = err.kind_name(), line = err.line(), "caught runtime error");
                match handlers.iter().find(|h| err.is_caught_by(&h.kind)) {
                    Some(handler) => self.exec_block(&handler.body),
                    None => Ok(Flow::Normal(Value::Void)),
                }
            },
        };

        if let Some(finally) = finally {
            self.unwind_to(depth, this_len);
            match self.exec_block(finally)? {
                Flow::Normal(_) => {},
                signal => return Ok(signal),
            }
        }
        outcome
    }

    /// Evaluates `if (condition) a : b`.
    ///
    /// # Errors
    /// `TypeError` when the condition is not a boolean.
    pub(crate) fn eval_if_expr(&mut self,
                               condition: &Expr,
                               then_branch: &Expr,
                               else_branch: &Expr,
                               line: usize)
                               -> EvalResult<Value> {
        if self.eval(condition)?.as_bool(line)? {
            self.eval(then_branch)
        } else {
            self.eval(else_branch)
        }
    }

    /// Evaluates a `match` expression.
    ///
    /// Arms are tried in order; the first whose pattern equals the subject,
    /// or the first catch-all arm, gives the result. With no matching arm the
    /// result is `void`.
    pub(crate) fn eval_match(&mut self, subject: &Expr, arms: &[MatchArm]) -> EvalResult<Value> {
        let subject = self.eval(subject)?;
        for arm in arms {
            let matched = match &arm.pattern {
                None => true,
                Some(pattern) => self.eval(pattern)? == subject,
            };
            if matched {
                return self.eval(&arm.value);
            }
        }
        Ok(Value::Void)
    }

    /// Drops call frames and method receivers left behind by an aborted
    /// evaluation.
    fn unwind_to(&mut self, depth: usize, this_len: usize) {
        while self.env.depth() > depth {
            self.env.pop_frame();
        }
        self.this_stack.truncate(this_len);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::interpreter::{
        evaluator::core::Context, lexer::tokenize, parser::core::parse_program, value::core::Value,
    };

    fn run(source: &str) -> Option<Value> {
        let tokens = tokenize(source).unwrap();
        let program = parse_program(&mut tokens.iter().peekable()).unwrap();
        Context::new().run_program(&program).unwrap()
    }

    #[test]
    fn switch_runs_only_the_first_match() {
        let out = run("let r = \"\"; switch (2) { case (1) { r = \"one\"; } case (2) { r = \"two\"; } \
                       case (2) { r = \"again\"; } default { r = \"other\"; } } r;");
        assert_eq!(out, Some(Value::from("two")));
    }

    #[test]
    fn break_in_a_switch_ends_the_enclosing_loop() {
        let out = run("let n = 0; loop (n < 5) { n++; switch (n) { case (2) { break; } default { } } } n;");
        assert_eq!(out, Some(Value::Integer(2)));
    }

    #[test]
    fn finally_return_overrides_the_body() {
        let out = run("def f() int { try { return 1; } finally { return 2; } } f();");
        assert_eq!(out, Some(Value::Integer(2)));
    }

    #[test]
    fn unmatched_errors_are_discarded() {
        let out = run("let r = 0; try { let x = 1 / 0; } catch (KeyError) { r = 1; } r;");
        assert_eq!(out, Some(Value::Integer(0)));
    }

    #[test]
    fn errors_inside_calls_restore_the_frames() {
        let out = run("def f() int { return 1 / 0; } \
                       let r = 0; try { f(); } catch (ZeroDivisionError) { r = 5; } r;");
        assert_eq!(out, Some(Value::Integer(5)));
    }

    #[test]
    fn do_while_runs_once() {
        let out = run("let n = 0; do { n++; } while (false); n;");
        assert_eq!(out, Some(Value::Integer(1)));
    }

    #[test]
    fn match_falls_back_to_the_catch_all() {
        let out = run("let v = match (3) { 1 => \"one\", _ => \"many\" }; v;");
        assert_eq!(out, Some(Value::from("many")));
    }
}
