/// Binary operator dispatch.
///
/// Evaluates both operands left to right and routes the operation to the
/// arithmetic, comparison, or logic handlers.
pub mod core;

/// Arithmetic operators.
///
/// Checked integer arithmetic, float promotion, true and floor division,
/// modulo, power, and the string and list concatenation and repetition forms.
pub mod arithmetic;

/// Equality and ordering operators.
pub mod comparison;

/// Logical `and` / `or`.
pub mod logic;
