use std::{cell::RefCell, collections::HashMap, path::PathBuf, rc::Rc};

use crate::{
    ast::{Expr, LiteralValue, Statement},
    config::Config,
    error::RuntimeError,
    interpreter::{
        evaluator::{environment::Environment, utils::interpolate},
        value::{
            core::Value,
            object_map::ObjectMap,
            record::{Function, Instance},
            set_value::SetValue,
        },
    },
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// How a statement finished.
///
/// `return` and `break` are not errors: they travel outwards through every
/// block-executing function until a call boundary or a loop consumes them.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// The statement completed; expression statements carry their value.
    Normal(Value),
    /// A `return` is unwinding to the nearest call.
    Return(Value),
    /// A `break` is unwinding to the nearest loop.
    Break,
}

/// The instance a method body runs against.
#[derive(Debug, Clone)]
pub(crate) struct ThisFrame {
    /// The receiver of the running method or constructor.
    pub instance:    Rc<RefCell<Instance>>,
    /// The frame pushed for the method call; bare field names are writable
    /// only while it is the innermost frame.
    pub frame:       u64,
    /// Whether the frame belongs to an `init` body.
    pub constructor: bool,
}

/// Stores the runtime evaluation context.
///
/// This struct holds the interpreter state: the frames of variable bindings,
/// the declaration registries, the registry of named instances, and the
/// configuration used to locate modules.
///
/// ## Usage
///
/// `Context` is created once per program (and once per imported module) and
/// reused for every statement of that program. All evaluation methods
/// (`eval`, `eval_statement`, `exec_block`) access this state to resolve
/// names and to record new bindings.
pub struct Context {
    /// Variable frames and declaration registries.
    pub env:                 Environment,
    /// Instances created by `let name = new Class(...)`, keyed by the
    /// binding name.
    pub instances:           HashMap<String, Rc<RefCell<Instance>>>,
    /// Module resolution and output settings.
    pub config:              Config,
    pub(crate) this_stack:   Vec<ThisFrame>,
    pub(crate) exports:      Option<Vec<String>>,
    pub(crate) module_stack: Vec<PathBuf>,
}

#[allow(clippy::new_without_default)]
impl Context {
    /// Creates a new evaluation context with an empty global frame and the
    /// default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a new evaluation context using `config` for module lookup.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self { env: Environment::new(),
               instances: HashMap::new(),
               config,
               this_stack: Vec::new(),
               exports: None,
               module_stack: Vec::new() }
    }

    /// Runs a whole program.
    ///
    /// Statements run in order against the global frame. A top-level
    /// `return` ends the program early.
    ///
    /// # Returns
    /// The value of the last expression statement that produced something
    /// other than `void`.
    ///
    /// # Example
    /// ```
    /// use fight::interpreter::{
    ///     evaluator::core::Context, lexer::tokenize, parser::core::parse_program,
    ///     value::core::Value,
    /// };
    ///
    /// let tokens = tokenize("let x = 20; x + 22;").unwrap();
    /// let program = parse_program(&mut tokens.iter().peekable()).unwrap();
    ///
    /// let mut ctx = Context::new();
    /// assert_eq!(ctx.run_program(&program).unwrap(), Some(Value::Integer(42)));
    /// ```
    pub fn run_program(&mut self, program: &[Statement]) -> EvalResult<Option<Value>> {
        let mut last = None;
        for statement in program {
            match self.eval_statement(statement)? {
                Flow::Normal(value) => {
                    if !value.is_void() {
                        last = Some(value);
                    }
                },
                Flow::Return(_) | Flow::Break => break,
            }
        }
        Ok(last)
    }

    /// Evaluates an expression and returns the resulting value.
    ///
    /// This is the main entry point for expression evaluation. The evaluator
    /// dispatches on the expression variant; every variant either yields a
    /// value (possibly `void`) or raises a `RuntimeError`.
    ///
    /// # Parameters
    /// - `expr`: Expression to evaluate.
    ///
    /// # Returns
    /// The value of the expression.
    pub fn eval(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Literal { value, .. } => Ok(self.eval_literal(value)),
            Expr::Variable { name, line } => self.eval_variable(name, *line),
            Expr::List { elements, .. } => {
                let values = elements.iter()
                                     .map(|e| self.eval(e))
                                     .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::from(values))
            },
            Expr::Object { entries, .. } => {
                let mut map = ObjectMap::new();
                for (key, value) in entries {
                    let value = self.eval(value)?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::from(map))
            },
            Expr::SetLiteral { elements, line } => {
                let mut set = std::collections::BTreeSet::new();
                for element in elements {
                    let value = self.eval(element)?;
                    set.insert(SetValue::try_from_value(&value, *line)?);
                }
                Ok(Value::from(set))
            },
            Expr::UnaryOp { op, expr, line } => self.eval_unary_op(*op, expr, *line),
            Expr::BinaryOp { left,
                             op,
                             right,
                             line, } => self.eval_binary_op(left, *op, right, *line),
            Expr::Call { callee, args, line } => self.eval_call(callee, args, *line),
            Expr::Lambda { def, .. } => Ok(Value::Function(Rc::new(Function::new(def.clone())))),
            Expr::Index { target, index, line } => self.eval_index(target, index, *line),
            Expr::Slice { target,
                          start,
                          end,
                          line, } => self.eval_slice(target, start.as_deref(), end.as_deref(), *line),
            Expr::ObjectIndex { target, key, line } => self.eval_object_index(target, key, *line),
            Expr::IfExpr { condition,
                           then_branch,
                           else_branch,
                           line, } => self.eval_if_expr(condition, then_branch, else_branch, *line),
            Expr::Match { subject, arms, .. } => self.eval_match(subject, arms),
            Expr::New { class, args, line } => self.eval_new(class, args, *line),
            Expr::MemberChain { receiver,
                                segments,
                                line, } => self.eval_member_chain(receiver, segments, *line),
            Expr::StructLiteral { name, fields, line } => {
                self.eval_struct_literal(name, fields, *line)
            },
            Expr::StructAccess { base, path, line } => self.eval_struct_access(base, path, *line),
            Expr::EnumAccess { enum_name,
                               member,
                               line, } => self.eval_enum_access(enum_name, member, *line),
            Expr::Generator { body,
                              var,
                              start,
                              end,
                              step,
                              line, } => {
                self.eval_generator(body, var, start, end, step.as_deref(), *line)
            },
            Expr::This { line } => self.current_this(*line).map(Value::Instance),
        }
    }

    /// Evaluates a single statement.
    ///
    /// Handles declarations, assignments, control flow, and plain expression
    /// statements. Statements may modify the context; expression statements
    /// also yield their value.
    ///
    /// # Parameters
    /// - `statement`: Statement to evaluate.
    ///
    /// # Returns
    /// How the statement finished: normally, or with a pending `return` or
    /// `break`.
    pub fn eval_statement(&mut self, statement: &Statement) -> EvalResult<Flow> {
        match statement {
            Statement::Let { name,
                             type_name,
                             value,
                             line, } => {
                self.exec_let(name, type_name.as_deref(), value, *line)?;
            },
            Statement::Const { name, value, line } => self.exec_const(name, value, *line)?,
            Statement::Assign { target, value, line } => self.exec_assign(target, value, *line)?,
            Statement::CompoundAssign { target,
                                        op,
                                        value,
                                        line, } => {
                self.exec_compound_assign(target, *op, value, *line)?;
            },
            Statement::Increment { name, delta, line } => {
                self.exec_increment(name, *delta, *line)?;
            },
            Statement::DestructureObject { names, value, line } => {
                self.exec_destructure_object(names, value, *line)?;
            },
            Statement::DestructureList { names, value, line } => {
                self.exec_destructure_list(names, value, *line)?;
            },
            Statement::Function(def) => self.declare_function(def)?,
            Statement::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Void,
                };
                return Ok(Flow::Return(value));
            },
            Statement::Break { .. } => return Ok(Flow::Break),
            Statement::If { branches,
                            else_branch,
                            .. } => return self.exec_if(branches, else_branch.as_deref()),
            Statement::Loop { condition, body, .. } => return self.exec_loop(condition, body),
            Statement::DoWhile { body, condition, .. } => {
                return self.exec_do_while(body, condition);
            },
            Statement::ForIn { var,
                               iterable,
                               body,
                               line, } => return self.exec_for_in(var, iterable, body, *line),
            Statement::ForRange { var,
                                  start,
                                  end,
                                  body,
                                  line, } => return self.exec_for_range(var, start, end, body, *line),
            Statement::Switch { subject,
                                cases,
                                default,
                                .. } => return self.exec_switch(subject, cases, default.as_deref()),
            Statement::TryCatch { body,
                                  handlers,
                                  finally,
                                  .. } => return self.exec_try(body, handlers, finally.as_deref()),
            Statement::Class(def) => self.declare_class(def)?,
            Statement::Interface(def) => self.declare_interface(def)?,
            Statement::Struct(def) => self.declare_struct(def)?,
            Statement::Enum(def) => self.declare_enum(def)?,
            Statement::Use { names, path, line } => self.import_module(names, path, *line)?,
            Statement::Exports { names, .. } => self.record_exports(names),
            Statement::Super { assignments, line } => self.exec_super(assignments, *line)?,
            Statement::Expression { expr, .. } => return Ok(Flow::Normal(self.eval(expr)?)),
        }
        Ok(Flow::Normal(Value::Void))
    }

    /// Executes a sequence of statements.
    ///
    /// Stops at the first statement that finishes with `return` or `break`
    /// and hands that signal to the caller.
    ///
    /// # Returns
    /// `Flow::Normal` with the value of the last statement, or the pending
    /// control signal.
    pub fn exec_block(&mut self, statements: &[Statement]) -> EvalResult<Flow> {
        let mut last = Value::Void;
        for statement in statements {
            match self.eval_statement(statement)? {
                Flow::Normal(value) => last = value,
                signal => return Ok(signal),
            }
        }
        Ok(Flow::Normal(last))
    }

    /// Evaluates a literal.
    ///
    /// String literals are interpolated: every `${name}` is replaced by the
    /// current value of `name`, and left as written when `name` is unbound.
    ///
    /// # Example
    /// ```
    /// use fight::{
    ///     ast::LiteralValue,
    ///     interpreter::{evaluator::core::Context, value::core::Value},
    /// };
    ///
    /// let mut ctx = Context::new();
    /// ctx.env.define("who", Value::from("world"), "string");
    ///
    /// let value = ctx.eval_literal(&LiteralValue::from("hello ${who} ${nobody}"));
    /// assert_eq!(value, Value::from("hello world ${nobody}"));
    /// ```
    #[must_use]
    pub fn eval_literal(&self, value: &LiteralValue) -> Value {
        match value {
            LiteralValue::Integer(n) => Value::Integer(*n),
            LiteralValue::Float(f) => Value::Float(*f),
            LiteralValue::Bool(b) => Value::Bool(*b),
            LiteralValue::Str(s) => Value::Str(interpolate(s, |name| self.lookup(name))),
        }
    }

    /// Looks up a variable by name.
    ///
    /// Falls back to the instance registry, so that instances named in an
    /// importing program stay reachable from imported functions.
    ///
    /// # Errors
    /// `NameError` when the name is bound nowhere.
    pub fn eval_variable(&self, name: &str, line: usize) -> EvalResult<Value> {
        if let Some(value) = self.lookup(name) {
            return Ok(value);
        }
        if let Some(instance) = self.instances.get(name) {
            return Ok(Value::Instance(instance.clone()));
        }
        Err(RuntimeError::name(format!("Variable '{name}' not defined"), line))
    }

    /// Resolves a bare name.
    ///
    /// Order: the innermost frame, then the fields of the running method's
    /// instance, then the outer frames.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.env.get_local(name) {
            return Some(value.clone());
        }
        if let Some(frame) = self.this_stack.last()
           && let Some(value) = frame.instance.borrow().fields.get(name)
        {
            return Some(value.clone());
        }
        self.env.get(name).cloned()
    }

    /// The instance of the running method or constructor.
    ///
    /// # Errors
    /// `NameError` outside of a method body.
    pub(crate) fn current_this(&self, line: usize) -> EvalResult<Rc<RefCell<Instance>>> {
        self.this_stack
            .last()
            .map(|frame| frame.instance.clone())
            .ok_or_else(|| RuntimeError::name("'this' is only available inside methods", line))
    }

    /// The instance whose fields bare names may write to, if the innermost
    /// frame is a method frame.
    pub(crate) fn writable_this(&self) -> Option<Rc<RefCell<Instance>>> {
        self.this_stack
            .last()
            .filter(|frame| frame.frame == self.env.frame_id())
            .map(|frame| frame.instance.clone())
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
    fn last_expression_value_is_reported() {
        assert_eq!(run("let a = 1; a + 1; let b = 3;").unwrap(), Some(Value::Integer(2)));
        assert_eq!(run("let a = 1;").unwrap(), None);
    }

    #[test]
    fn top_level_return_stops_the_program() {
        assert_eq!(run("1; return; 2;").unwrap(), Some(Value::Integer(1)));
    }

    #[test]
    fn unknown_variable_is_a_name_error() {
        let err = run("missing + 1;").unwrap_err();
        assert_eq!(err.kind_name(), "NameError");
        assert_eq!(err.message(), "Variable 'missing' not defined");
    }

    #[test]
    fn string_literals_are_interpolated_each_time() {
        let value = run("let out = []; let i = 0; \
                         loop (i < 2) { out = out + [\"i=${i}\"]; i++; } out;").unwrap();
        assert_eq!(value,
                   Some(Value::from(vec![Value::from("i=0"), Value::from("i=1")])));
    }
}
