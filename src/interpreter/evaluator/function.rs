/// The builtin table and dispatch.
///
/// Builtins are reached only when a called name is bound nowhere in scope.
pub mod core;
/// Output builtins: `print`, `println`, the colored and radix variants, and
/// `assert`.
pub mod print;
/// Type predicates and conversions.
pub mod common;
/// `Str*` builtins and character codes.
pub mod string;
/// `List*` builtins.
pub mod list;
/// `Object*` builtins.
pub mod object;
/// `Set*` builtins.
pub mod set;
/// Numeric builtins.
pub mod math;
/// Clock and sleep builtins.
pub mod time;
/// Seedable random numbers.
pub mod random;
/// Filesystem and environment builtins.
pub mod file;
/// Reflection over functions, classes and instances.
pub mod reflect;
