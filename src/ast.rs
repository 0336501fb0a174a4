use std::rc::Rc;

/// Represents a literal value in the language.
///
/// `LiteralValue` covers the constant values that can appear directly in
/// source code. String literals keep their raw text so that `${name}`
/// interpolation can be performed every time the literal is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// A 64-bit signed integer literal.
    Integer(i64),
    /// A 64-bit floating-point literal.
    Float(f64),
    /// A boolean literal value: `true` or `false`.
    Bool(bool),
    /// A string literal with escapes already resolved.
    Str(String),
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

/// Arguments supplied at a call site.
///
/// Positional arguments always precede named ones: `f(1, 2, scale = 3)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallArgs {
    /// Arguments bound by position.
    pub positional: Vec<Expr>,
    /// Arguments bound by parameter name, in source order.
    pub named:      Vec<(String, Expr)>,
}

impl CallArgs {
    /// Total number of supplied arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    /// Returns `true` when no argument was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

/// One segment of a `->` member chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    /// `->Name(args)`
    Call {
        /// The method name.
        name: String,
        /// The call arguments.
        args: CallArgs,
    },
    /// `->Name`
    Field {
        /// The field name.
        name: String,
    },
}

/// One arm of a `match` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    /// The value to compare against, or `None` for the `_`/`else` arm.
    pub pattern: Option<Expr>,
    /// The result of the arm.
    pub value:   Expr,
}

/// An abstract syntax tree (AST) node representing an expression.
///
/// `Expr` covers every construct that produces a value, from literals and
/// variables to calls, member chains, object construction, and conditional
/// forms. Every variant records the source line it started on.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value (number, string, boolean).
    Literal {
        /// The constant value.
        value: LiteralValue,
        /// Line number in the source code.
        line:  usize,
    },
    /// Reference to a variable by name.
    Variable {
        /// Name of the variable.
        name: String,
        /// Line number in the source code.
        line: usize,
    },
    /// A list literal such as `[1, 2, 3]`.
    List {
        /// The element expressions.
        elements: Vec<Self>,
        /// Line number in the source code.
        line:     usize,
    },
    /// An object literal such as `{name: "x", age: 3}`.
    Object {
        /// Key/value pairs in source order.
        entries: Vec<(String, Self)>,
        /// Line number in the source code.
        line:    usize,
    },
    /// A set literal such as `set<1, 2, 3>`.
    SetLiteral {
        /// The element expressions.
        elements: Vec<Self>,
        /// Line number in the source code.
        line:     usize,
    },
    /// A unary operation (e.g. negation).
    UnaryOp {
        /// The unary operator to apply.
        op:   UnaryOperator,
        /// The operand expression.
        expr: Box<Self>,
        /// Line number in the source code.
        line: usize,
    },
    /// A binary operation (addition, comparison, etc.).
    BinaryOp {
        /// Left operand.
        left:  Box<Self>,
        /// The operator.
        op:    BinaryOperator,
        /// Right operand.
        right: Box<Self>,
        /// Line number in the source code.
        line:  usize,
    },
    /// A call such as `f(1, b = 2)` or a curried call `f(1)(2)`.
    Call {
        /// The expression producing the function.
        callee: Box<Self>,
        /// The call arguments.
        args:   CallArgs,
        /// Line number in the source code.
        line:   usize,
    },
    /// An anonymous function, `def (x) { ... }` or `lambda x: x + 1`.
    Lambda {
        /// The function definition.
        def:  Rc<FunctionDef>,
        /// Line number in the source code.
        line: usize,
    },
    /// List or string indexing, `a[i]`.
    Index {
        /// The indexed expression.
        target: Box<Self>,
        /// The index expression.
        index:  Box<Self>,
        /// Line number in the source code.
        line:   usize,
    },
    /// List or string slicing, `a[i:j]`.
    Slice {
        /// The sliced expression.
        target: Box<Self>,
        /// Inclusive start bound, defaults to the beginning.
        start:  Option<Box<Self>>,
        /// Inclusive end bound, defaults to the last element.
        end:    Option<Box<Self>>,
        /// Line number in the source code.
        line:   usize,
    },
    /// Object key lookup, `d{key}`.
    ObjectIndex {
        /// The object expression.
        target: Box<Self>,
        /// The key expression.
        key:    Box<Self>,
        /// Line number in the source code.
        line:   usize,
    },
    /// A conditional expression, `if (c) a : b`.
    IfExpr {
        /// The condition; must evaluate to a boolean.
        condition:   Box<Self>,
        /// The value when the condition holds.
        then_branch: Box<Self>,
        /// The value otherwise.
        else_branch: Box<Self>,
        /// Line number in the source code.
        line:        usize,
    },
    /// A `match (x) { 1 => a, _ => b }` expression.
    Match {
        /// The value being matched.
        subject: Box<Self>,
        /// The arms in source order.
        arms:    Vec<MatchArm>,
        /// Line number in the source code.
        line:    usize,
    },
    /// Class instantiation, `new Person("x", 3)`.
    New {
        /// The class name.
        class: String,
        /// Constructor arguments.
        args:  CallArgs,
        /// Line number in the source code.
        line:  usize,
    },
    /// A member chain such as `a->F()->G()` or `a->Field`.
    MemberChain {
        /// The receiver of the first segment.
        receiver: Box<Self>,
        /// The chained members.
        segments: Vec<Member>,
        /// Line number in the source code.
        line:     usize,
    },
    /// A struct literal, `Point{x: 1, y: 2}`.
    StructLiteral {
        /// The struct name.
        name:   String,
        /// Field initialisers in source order.
        fields: Vec<(String, Self)>,
        /// Line number in the source code.
        line:   usize,
    },
    /// A struct field path, `p::a::b`.
    StructAccess {
        /// The struct value being accessed.
        base: Box<Self>,
        /// The field path.
        path: Vec<String>,
        /// Line number in the source code.
        line: usize,
    },
    /// An enum member, `enum::Color::Red`.
    EnumAccess {
        /// The enum name.
        enum_name: String,
        /// The member name.
        member:    String,
        /// Line number in the source code.
        line:      usize,
    },
    /// A list generator, `generator[i * i; i = 1 to 10, 2]`.
    Generator {
        /// The element expression.
        body:  Box<Self>,
        /// The loop variable.
        var:   String,
        /// Inclusive start of the range.
        start: Box<Self>,
        /// Inclusive end of the range.
        end:   Box<Self>,
        /// Optional step, defaults to `1`.
        step:  Option<Box<Self>>,
        /// Line number in the source code.
        line:  usize,
    },
    /// The current instance inside a method or constructor.
    This {
        /// Line number in the source code.
        line: usize,
    },
}

impl Expr {
    /// Returns the line number associated with this expression.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Literal { line, .. }
            | Self::Variable { line, .. }
            | Self::List { line, .. }
            | Self::Object { line, .. }
            | Self::SetLiteral { line, .. }
            | Self::UnaryOp { line, .. }
            | Self::BinaryOp { line, .. }
            | Self::Call { line, .. }
            | Self::Lambda { line, .. }
            | Self::Index { line, .. }
            | Self::Slice { line, .. }
            | Self::ObjectIndex { line, .. }
            | Self::IfExpr { line, .. }
            | Self::Match { line, .. }
            | Self::New { line, .. }
            | Self::MemberChain { line, .. }
            | Self::StructLiteral { line, .. }
            | Self::StructAccess { line, .. }
            | Self::EnumAccess { line, .. }
            | Self::Generator { line, .. }
            | Self::This { line } => *line,
        }
    }
}

/// A function or method parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// The parameter name.
    pub name:      String,
    /// Declared type, if any.
    pub type_name: Option<String>,
    /// Default value evaluated at call time when the argument is omitted.
    pub default:   Option<Expr>,
}

/// `key = value` pairs written in `@annotation(...)` before a function,
/// method or field. The values are evaluated once, when the declaration runs.
pub type Annotations = Vec<(String, Expr)>;

/// Represents a user-defined function, method, constructor, or lambda.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    /// The name of the function (`lambda` for anonymous functions, `init` for
    /// constructors).
    pub name:        String,
    /// The declared parameters.
    pub params:      Vec<Param>,
    /// Declared return type, if any. `void` means "returns nothing".
    pub return_type: Option<String>,
    /// The statements of the body.
    pub body:        Vec<Statement>,
    /// Whether the method was declared `static`.
    pub is_static:   bool,
    /// Annotations written before the declaration.
    pub annotations: Annotations,
    /// Line number in the source code.
    pub line:        usize,
}

/// A field declared in a class `fields { ... }` block.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// The field name.
    pub name:        String,
    /// Declared type, if any.
    pub type_name:   Option<String>,
    /// The initialiser.
    pub value:       Expr,
    /// Whether the field is a class-level `static` field.
    pub is_static:   bool,
    /// Annotations written before the field.
    pub annotations: Annotations,
    /// Line number in the source code.
    pub line:        usize,
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    /// The class name.
    pub name:       String,
    /// The parent class named by `extends`.
    pub parent:     Option<String>,
    /// The interfaces named by `implements`.
    pub interfaces: Vec<String>,
    /// Declared fields, instance and static.
    pub fields:     Vec<FieldDef>,
    /// Declared methods, instance and static.
    pub methods:    Vec<Rc<FunctionDef>>,
    /// Constructor overloads.
    pub inits:      Vec<Rc<FunctionDef>>,
    /// Line number in the source code.
    pub line:       usize,
}

/// A method contract inside an interface declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceMethod {
    /// The method name.
    pub name:        String,
    /// The declared parameters (never carry defaults).
    pub params:      Vec<Param>,
    /// Declared return type, if any.
    pub return_type: Option<String>,
}

/// An interface declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDef {
    /// The interface name.
    pub name:    String,
    /// The required methods.
    pub methods: Vec<InterfaceMethod>,
    /// Line number in the source code.
    pub line:    usize,
}

/// A struct declaration, `struct Point { x: int, y: int }`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    /// The struct name.
    pub name:   String,
    /// Field names with optional declared types.
    pub fields: Vec<(String, Option<String>)>,
    /// Line number in the source code.
    pub line:   usize,
}

/// An enum declaration, `enum Color { Red, Green }`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    /// The enum name.
    pub name:    String,
    /// Member names in declaration order.
    pub members: Vec<String>,
    /// Line number in the source code.
    pub line:    usize,
}

/// One `catch (Kind) { ... }` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    /// The symbolic error kind handled by this clause.
    pub kind: String,
    /// The handler body.
    pub body: Vec<Statement>,
}

/// The left-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    /// `x = ...`
    Name(String),
    /// `xs[i] = ...` and `grid[i][j] = ...`
    Index {
        /// The list variable.
        name:    String,
        /// One index per bracket pair.
        indices: Vec<Expr>,
    },
    /// `d{key} = ...`
    ObjectKey {
        /// The object variable.
        name: String,
        /// The key expression.
        key:  Expr,
    },
    /// `inst->Field = ...` or `Class->STATIC = ...`
    Member {
        /// The instance variable or class name.
        receiver: String,
        /// The field name.
        field:    String,
    },
    /// `this->Field = ...`
    ThisField(String),
}

/// Represents a statement.
///
/// Statements are the units executed by the evaluator. Blocks are plain
/// vectors of statements.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `let x[: T] = value;`
    Let {
        /// The variable name.
        name:      String,
        /// The declared type, if any.
        type_name: Option<String>,
        /// The initial value.
        value:     Expr,
        /// Line number in the source code.
        line:      usize,
    },
    /// `const X = value;`
    Const {
        /// The constant name.
        name:  String,
        /// The value.
        value: Expr,
        /// Line number in the source code.
        line:  usize,
    },
    /// A plain assignment to an existing binding or location.
    Assign {
        /// The assigned location.
        target: AssignTarget,
        /// The new value.
        value:  Expr,
        /// Line number in the source code.
        line:   usize,
    },
    /// `x += value;` and friends.
    CompoundAssign {
        /// The assigned location.
        target: AssignTarget,
        /// The operator combining old and new value.
        op:     BinaryOperator,
        /// The right operand.
        value:  Expr,
        /// Line number in the source code.
        line:   usize,
    },
    /// `x++;` (delta `1`) or `x--;` (delta `-1`).
    Increment {
        /// The variable name.
        name:  String,
        /// The amount added.
        delta: i64,
        /// Line number in the source code.
        line:  usize,
    },
    /// `let {a, b} = obj;`
    DestructureObject {
        /// The keys to extract, bound to same-named variables.
        names: Vec<String>,
        /// The object expression.
        value: Expr,
        /// Line number in the source code.
        line:  usize,
    },
    /// `let [a, _, b] = list;`
    DestructureList {
        /// Target names by position; `None` skips the element.
        names: Vec<Option<String>>,
        /// The list expression.
        value: Expr,
        /// Line number in the source code.
        line:  usize,
    },
    /// A named function declaration.
    Function(Rc<FunctionDef>),
    /// `return [value];`
    Return {
        /// The returned value, if any.
        value: Option<Expr>,
        /// Line number in the source code.
        line:  usize,
    },
    /// `break;`
    Break {
        /// Line number in the source code.
        line: usize,
    },
    /// `if (c) { } elif (c) { } else { }`
    If {
        /// Condition/body pairs for `if` and every `elif`.
        branches:    Vec<(Expr, Vec<Self>)>,
        /// The `else` body.
        else_branch: Option<Vec<Self>>,
        /// Line number in the source code.
        line:        usize,
    },
    /// `loop (c) { }`
    Loop {
        /// The loop condition.
        condition: Expr,
        /// The loop body.
        body:      Vec<Self>,
        /// Line number in the source code.
        line:      usize,
    },
    /// `do { } while (c);`
    DoWhile {
        /// The loop body.
        body:      Vec<Self>,
        /// The condition checked after each iteration.
        condition: Expr,
        /// Line number in the source code.
        line:      usize,
    },
    /// `for (x in iterable) { }`
    ForIn {
        /// The loop variable.
        var:      String,
        /// The iterated expression.
        iterable: Expr,
        /// The loop body.
        body:     Vec<Self>,
        /// Line number in the source code.
        line:     usize,
    },
    /// `for (i : start to end) { }`
    ForRange {
        /// The loop variable.
        var:   String,
        /// Inclusive start.
        start: Expr,
        /// Inclusive end.
        end:   Expr,
        /// The loop body.
        body:  Vec<Self>,
        /// Line number in the source code.
        line:  usize,
    },
    /// `switch (x) { case (v) { } default { } }`
    Switch {
        /// The switched value.
        subject: Expr,
        /// Case values and bodies in source order.
        cases:   Vec<(Expr, Vec<Self>)>,
        /// The `default` body.
        default: Option<Vec<Self>>,
        /// Line number in the source code.
        line:    usize,
    },
    /// `try { } catch (Kind) { } finally { }`
    TryCatch {
        /// The guarded body.
        body:     Vec<Self>,
        /// Handlers in source order.
        handlers: Vec<CatchClause>,
        /// The body that always runs last.
        finally:  Option<Vec<Self>>,
        /// Line number in the source code.
        line:     usize,
    },
    /// A class declaration.
    Class(Rc<ClassDef>),
    /// An interface declaration.
    Interface(InterfaceDef),
    /// A struct declaration.
    Struct(StructDef),
    /// An enum declaration.
    Enum(EnumDef),
    /// `use (a, b) from "path";`
    Use {
        /// The imported names.
        names: Vec<String>,
        /// The module path as written.
        path:  String,
        /// Line number in the source code.
        line:  usize,
    },
    /// `exports (a, b);`
    Exports {
        /// The exported names.
        names: Vec<String>,
        /// Line number in the source code.
        line:  usize,
    },
    /// `super(Field = value, ...);` inside a constructor.
    Super {
        /// Field initialisers.
        assignments: Vec<(String, Expr)>,
        /// Line number in the source code.
        line:        usize,
    },
    /// A standalone expression evaluated for its result.
    Expression {
        /// The expression to evaluate.
        expr: Expr,
        /// Line number in the source code.
        line: usize,
    },
}

/// Represents a binary operator.
///
/// Binary operators include arithmetic, comparisons, and logical connectives.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication (`*`)
    Mul,
    /// True division (`/`)
    Div,
    /// Floor division (`//`)
    FloorDiv,
    /// Modulo (`%`)
    Mod,
    /// Exponentiation (`^`)
    Pow,
    /// Less than (`<`)
    Less,
    /// Greater than (`>`)
    Greater,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Equal to (`==`)
    Equal,
    /// Not equal to (`!=`)
    NotEqual,
    /// Logical and (`and`)
    And,
    /// Logical or (`or`)
    Or,
}

/// Represents a unary operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Arithmetic negation (e.g. `-x`).
    Negate,
    /// Logical NOT (e.g. `!x` or `not x`).
    Not,
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use BinaryOperator::{
            Add, And, Div, Equal, FloorDiv, Greater, GreaterEqual, Less, LessEqual, Mod, Mul,
            NotEqual, Or, Pow, Sub,
        };
        let operator = match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            FloorDiv => "//",
            Mod => "%",
            Pow => "^",
            Less => "<",
            Greater => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",
            Equal => "==",
            NotEqual => "!=",
            And => "and",
            Or => "or",
        };
        write!(f, "{operator}")
    }
}
