/// Member chains, instance and static dispatch.
pub mod core;

/// Methods of string receivers.
pub mod string;

/// Methods of list receivers.
///
/// `filter` and `map` call back into the evaluator.
pub mod list;

/// Methods of object receivers.
pub mod object;

/// Methods of set receivers.
pub mod set;
