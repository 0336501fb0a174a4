/// Class declarations and the class record.
///
/// Collects fields, methods and constructors, merges public members of the
/// parent class, and checks claimed interfaces.
pub mod class;

/// Instance creation, constructors, and field access.
pub mod instance;

/// Interface declarations and conformance checks.
pub mod interface;

/// Struct declarations, literals and `a::b` field paths.
pub mod structure;

/// Enum declarations and `enum::Name::Member` access.
pub mod enumeration;
