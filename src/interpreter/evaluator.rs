/// Binary operator evaluation logic.
///
/// Handles arithmetic, comparison, equality, and the short-circuiting logical
/// operators.
pub mod binary;

/// Unary operator evaluation logic.
///
/// Implements negation, logical not, and the increment and decrement forms.
pub mod unary;

/// Core evaluation logic and context management.
///
/// Contains the evaluation context, statement and expression dispatch, and
/// name lookup.
pub mod core;

/// Evaluation of `for` loops and list generators.
pub mod for_loop;

/// Utility functions for evaluation.
///
/// Provides helpers shared by evaluation logic: arity checks, object keys,
/// string interpolation, and character splitting.
pub mod utils;

/// Builtin functions.
///
/// The name-indexed builtin table and its implementations.
pub mod function;

/// Scoped variable storage.
///
/// Defines the frame stack that holds bindings, their type tags, and the
/// declared classes, interfaces, structs, and enums.
pub mod environment;

/// Runtime type tags, declared-type matching, and numeric coercion.
pub mod types;

/// Variable declaration and assignment.
pub mod assignment;

/// Indexing and inclusive slicing.
pub mod index;

/// Control flow: conditionals, loops, `switch`, `try`, and `match`.
pub mod control;

/// Function declaration, argument binding, and invocation.
pub mod call;

/// The object model.
///
/// Classes, instances, interfaces, structs, and enums.
pub mod object;

/// Member access and method dispatch.
///
/// Resolves `a->b()->c` chains on instances and classes, and the builtin
/// methods of strings, lists, objects, and sets.
pub mod method;

/// Module imports through `use` and `exports`.
pub mod module;
