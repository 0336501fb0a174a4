/// Numeric conversion helpers.
///
/// This module provides the conversions the evaluator needs between `i64`,
/// `usize`, and `f64`: truncating float-to-int conversion that refuses
/// non-finite or out-of-range values, and Python-style index and slice bound
/// resolution for negative indices.
pub mod num;

/// Tests whether a member name is public.
///
/// Visibility follows the naming convention of the language: a field, method,
/// or static member is public exactly when its first character is an
/// uppercase letter. Every visibility check in the evaluator goes through this
/// function.
///
/// # Example
/// ```
/// use fight::util::is_public;
///
/// assert!(is_public("Name"));
/// assert!(!is_public("secret"));
/// assert!(!is_public("_Hidden"));
/// assert!(!is_public(""));
/// ```
#[must_use]
pub fn is_public(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
