/// Runtime values.
///
/// Defines the `Value` enum with its conversions, truthiness, structural
/// equality, runtime type tags, and display formatting.
pub mod core;
/// Insertion-ordered object storage.
///
/// Defines `ObjectMap`, the string-keyed map used for object literals, struct
/// values, and instance fields. Iteration follows insertion order so that
/// printing and `for (k in obj)` are deterministic.
pub mod object_map;
/// Heap records shared between bindings.
///
/// Defines the function, struct, and instance records referenced from
/// `Value`. Instances are shared and mutable so that every binding naming the
/// same object observes field updates.
pub mod record;
/// Set value representation.
///
/// Defines the `SetValue` type used for the elements of a `Value::Set`. Only
/// hashable scalars may be stored in a set.
pub mod set_value;
