use crate::{error::RuntimeError, interpreter::evaluator::core::EvalResult};

/// Converts an integer to a float.
///
/// Integers beyond `2^53` lose precision, matching the behavior of mixed
/// integer/float arithmetic in the language.
///
/// ## Example
/// ```
/// use fight::util::num::int_to_float;
///
/// assert_eq!(int_to_float(42), 42.0);
/// ```
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub const fn int_to_float(value: i64) -> f64 {
    value as f64
}

/// Converts a float to an integer by truncating toward zero.
///
/// ## Errors
/// Returns a `ValueError` for `NaN`, infinities, and values outside the `i64`
/// range.
///
/// ## Example
/// ```
/// use fight::util::num::float_to_int;
///
/// assert_eq!(float_to_int(3.9, 1).unwrap(), 3);
/// assert_eq!(float_to_int(-3.9, 1).unwrap(), -3);
/// assert!(float_to_int(f64::NAN, 1).is_err());
/// ```
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn float_to_int(value: f64, line: usize) -> EvalResult<i64> {
    if !value.is_finite() {
        return Err(RuntimeError::value(format!("Cannot convert {value} to an integer"), line));
    }
    let truncated = value.trunc();
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(RuntimeError::value(format!("{value} is out of the integer range"), line));
    }
    Ok(truncated as i64)
}

/// Converts a length or position to an integer value.
///
/// Saturates at `i64::MAX`, which no in-memory collection can reach.
#[must_use]
pub fn usize_to_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Resolves a possibly negative index against a collection length.
///
/// Negative indices count from the end, so `-1` is the last element.
///
/// ## Errors
/// Returns an `IndexError` if the resolved position is outside `0..len`.
///
/// ## Example
/// ```
/// use fight::util::num::resolve_index;
///
/// assert_eq!(resolve_index(1, 3, 1).unwrap(), 1);
/// assert_eq!(resolve_index(-1, 3, 1).unwrap(), 2);
/// assert!(resolve_index(3, 3, 1).is_err());
/// assert!(resolve_index(-4, 3, 1).is_err());
/// ```
pub fn resolve_index(index: i64, len: usize, line: usize) -> EvalResult<usize> {
    let signed_len = usize_to_int(len);
    let resolved = if index < 0 { index + signed_len } else { index };

    if resolved < 0 || resolved >= signed_len {
        return Err(RuntimeError::index(format!("Index {index} out of range for length {len}"),
                                       line));
    }
    usize::try_from(resolved).map_err(|_| RuntimeError::index(format!("Index {index} out of range"), line))
}

/// Clamps a slice bound into `0..=len`, counting negative bounds from the end.
///
/// Slices never fail on out-of-range bounds; they are clamped instead.
///
/// ## Example
/// ```
/// use fight::util::num::clamp_slice_bound;
///
/// assert_eq!(clamp_slice_bound(-2, 5), 3);
/// assert_eq!(clamp_slice_bound(10, 5), 5);
/// assert_eq!(clamp_slice_bound(-10, 5), 0);
/// ```
#[must_use]
pub fn clamp_slice_bound(bound: i64, len: usize) -> usize {
    let signed_len = usize_to_int(len);
    let resolved = if bound < 0 { bound + signed_len } else { bound };
    usize::try_from(resolved.clamp(0, signed_len)).unwrap_or(len)
}
