use std::{cell::RefCell, f64::consts::TAU};

use rand::{
    Rng, SeedableRng,
    distributions::{Distribution, WeightedIndex},
    rngs::{OsRng, StdRng},
    seq::SliceRandom,
};

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{core::EvalResult, method::core::MethodOutcome, utils::chars_of},
        value::core::Value,
    },
};

thread_local! {
    static RNG: RefCell<StdRng> = RefCell::new(StdRng::from_entropy());
}

fn with_rng<T>(f: impl FnOnce(&mut StdRng) -> T) -> T {
    RNG.with(|rng| f(&mut rng.borrow_mut()))
}

/// The elements of a list, or the characters of a string.
fn sequence(value: &Value, line: usize) -> EvalResult<Vec<Value>> {
    match value {
        Value::List(items) => Ok(items.as_ref().clone()),
        Value::Str(s) => Ok(chars_of(s)),
        other => Err(RuntimeError::type_error(format!("expected a list or string, got {}", other.type_name()),
                                              line)),
    }
}

fn count_arg(value: &Value, line: usize) -> EvalResult<usize> {
    let n = value.as_int(line)?;
    usize::try_from(n).map_err(|_| RuntimeError::value(format!("count must not be negative, got {n}"), line))
}

fn empty_sequence(line: usize) -> RuntimeError {
    RuntimeError::index("cannot choose from an empty sequence", line)
}

/// `SetSeed(seed)`: reseeds the generator so later draws repeat.
pub fn set_seed(args: &[Value], line: usize) -> EvalResult<Value> {
    let seed = args[0].as_int(line)?;
    with_rng(|rng| *rng = StdRng::seed_from_u64(u64::from_ne_bytes(seed.to_ne_bytes())));
    Ok(Value::Void)
}

/// `GetInt(a, b)`: an integer in `a..=b`.
///
/// # Errors
/// `ValueError` when `a > b`.
pub fn int(args: &[Value], line: usize) -> EvalResult<Value> {
    let (low, high) = (args[0].as_int(line)?, args[1].as_int(line)?);
    if low > high {
        return Err(RuntimeError::value(format!("empty range {low} to {high}"), line));
    }
    Ok(Value::Integer(with_rng(|rng| rng.gen_range(low..=high))))
}

/// `GetFloat01()`: a float in `[0, 1)`.
pub fn float01(_args: &[Value], _line: usize) -> EvalResult<Value> {
    Ok(Value::Float(with_rng(|rng| rng.r#gen::<f64>())))
}

/// `GetFloatRange(a, b)`: a float between `a` and `b`, in either order.
pub fn float_range(args: &[Value], line: usize) -> EvalResult<Value> {
    let (a, b) = (args[0].as_float(line)?, args[1].as_float(line)?);
    let u = with_rng(|rng| rng.r#gen::<f64>());
    Ok(Value::Float(a + (b - a) * u))
}

/// `GetChoice(seq)`: one element of a list or one character of a string.
///
/// # Errors
/// `IndexError` for an empty sequence.
pub fn choice(args: &[Value], line: usize) -> EvalResult<Value> {
    let items = sequence(&args[0], line)?;
    with_rng(|rng| items.choose(rng).cloned()).ok_or_else(|| empty_sequence(line))
}

/// `GetChoices(seq, k)`: `k` draws with replacement.
pub fn choices(args: &[Value], line: usize) -> EvalResult<Value> {
    let items = sequence(&args[0], line)?;
    let k = count_arg(&args[1], line)?;
    if items.is_empty() && k > 0 {
        return Err(empty_sequence(line));
    }
    let out = with_rng(|rng| {
                  (0..k).filter_map(|_| items.choose(rng).cloned())
                        .collect::<Vec<_>>()
              });
    Ok(Value::from(out))
}

/// `GetSample(seq, k)`: `k` distinct positions drawn without replacement.
///
/// # Errors
/// `ValueError` when `k` exceeds the sequence length.
pub fn sample(args: &[Value], line: usize) -> EvalResult<Value> {
    let items = sequence(&args[0], line)?;
    let k = count_arg(&args[1], line)?;
    if k > items.len() {
        return Err(RuntimeError::value(format!("sample of {k} is larger than the sequence ({})", items.len()),
                                       line));
    }
    let out = with_rng(|rng| items.choose_multiple(rng, k).cloned().collect::<Vec<_>>());
    Ok(Value::from(out))
}

/// `Shuffle(xs)` and `ShuffleInPlace(xs)`: reorders the list and writes it
/// back to the variable passed in.
pub fn shuffle(args: &[Value], line: usize) -> EvalResult<MethodOutcome> {
    let mut items = args[0].as_list(line)?.as_ref().clone();
    with_rng(|rng| items.shuffle(rng));
    Ok(MethodOutcome::mutated(Value::Void, Value::from(items)))
}

/// `GetBool()`.
pub fn boolean(_args: &[Value], _line: usize) -> EvalResult<Value> {
    Ok(Value::Bool(with_rng(|rng| rng.gen_bool(0.5))))
}

/// `GetWeightedChoice(seq, weights)`.
///
/// # Errors
/// `ValueError` when the weights do not pair up with the elements, or are
/// negative or all zero.
pub fn weighted_choice(args: &[Value], line: usize) -> EvalResult<Value> {
    let items = sequence(&args[0], line)?;
    let weights = args[1].as_list(line)?
                         .iter()
                         .map(|w| w.as_float(line))
                         .collect::<EvalResult<Vec<_>>>()?;
    if weights.len() != items.len() {
        return Err(RuntimeError::value(format!("{} weights given for {} elements", weights.len(), items.len()),
                                       line));
    }
    let dist = WeightedIndex::new(&weights).map_err(|err| RuntimeError::value(format!("invalid weights: {err}"),
                                                                              line))?;
    let pick = with_rng(|rng| dist.sample(rng));
    Ok(items[pick].clone())
}

/// `GetGaussian([mu[, sigma]])`: a normally distributed float, drawn with
/// the Box-Muller transform.
pub fn gaussian(args: &[Value], line: usize) -> EvalResult<Value> {
    let mu = args.first().map_or(Ok(0.0), |v| v.as_float(line))?;
    let sigma = args.get(1).map_or(Ok(1.0), |v| v.as_float(line))?;
    let (u1, u2) = with_rng(|rng| (1.0 - rng.r#gen::<f64>(), rng.r#gen::<f64>()));
    let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
    Ok(Value::Float(mu + sigma * z))
}

/// `GetExponential([lambda])`.
///
/// # Errors
/// `ZeroDivisionError` for a zero rate.
pub fn exponential(args: &[Value], line: usize) -> EvalResult<Value> {
    let lambda = args.first().map_or(Ok(1.0), |v| v.as_float(line))?;
    if lambda == 0.0 {
        return Err(RuntimeError::zero_division("exponential rate must not be zero", line));
    }
    let u = with_rng(|rng| rng.r#gen::<f64>());
    Ok(Value::Float(-(1.0 - u).ln() / lambda))
}

/// `GetByte()`: an integer in `0..=255`.
pub fn byte(_args: &[Value], _line: usize) -> EvalResult<Value> {
    Ok(Value::Integer(i64::from(with_rng(|rng| rng.r#gen::<u8>()))))
}

/// `GetBytes(n)`: a list of `n` random bytes.
pub fn bytes(args: &[Value], line: usize) -> EvalResult<Value> {
    let n = count_arg(&args[0], line)?;
    let out = with_rng(|rng| {
                  (0..n).map(|_| Value::Integer(i64::from(rng.r#gen::<u8>())))
                        .collect::<Vec<_>>()
              });
    Ok(Value::from(out))
}

/// `GetBits(k)`: a non-negative integer of at most `k` random bits.
///
/// # Errors
/// `ValueError` unless `0 <= k <= 63`.
pub fn bits(args: &[Value], line: usize) -> EvalResult<Value> {
    let k = args[0].as_int(line)?;
    if !(0..=63).contains(&k) {
        return Err(RuntimeError::value(format!("bit count must be between 0 and 63, got {k}"), line));
    }
    let raw = with_rng(|rng| rng.r#gen::<u64>());
    let masked = if k == 0 { 0 } else { raw >> (64 - k) };
    i64::try_from(masked).map(Value::Integer)
                         .map_err(|_| RuntimeError::exception("random bits out of range", line))
}

/// `GetSystemFloat()`: a float in `[0, 1)` from the operating system's
/// generator. `SetSeed` has no effect on it.
pub fn system_float(_args: &[Value], _line: usize) -> EvalResult<Value> {
    Ok(Value::Float(OsRng.r#gen::<f64>()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn list_len(value: &Value) -> usize {
        value.as_list(1).map_or(0, |items| items.len())
    }

    fn ints(values: &[i64]) -> Value {
        Value::from(values.iter().copied().map(Value::Integer).collect::<Vec<_>>())
    }

    fn draw_five() -> Vec<Value> {
        (0..5).map(|_| int(&[Value::Integer(1), Value::Integer(1000)], 1).unwrap())
              .collect()
    }

    #[test]
    fn seeding_repeats_the_sequence() {
        set_seed(&[Value::Integer(42)], 1).unwrap();
        let first = draw_five();
        set_seed(&[Value::Integer(42)], 1).unwrap();
        assert_eq!(draw_five(), first);
    }

    #[test]
    fn draws_stay_in_range() {
        set_seed(&[Value::Integer(7)], 1).unwrap();
        for _ in 0..200 {
            let Value::Integer(n) = int(&[Value::Integer(-3), Value::Integer(3)], 1).unwrap() else {
                panic!("expected an integer")
            };
            assert!((-3..=3).contains(&n));
            let Value::Float(f) = float_range(&[Value::Integer(2), Value::Integer(4)], 1).unwrap() else {
                panic!("expected a float")
            };
            assert!((2.0..=4.0).contains(&f));
            let Value::Integer(b) = bits(&[Value::Integer(4)], 1).unwrap() else { panic!("expected an integer") };
            assert!((0..16).contains(&b));
        }
        assert_eq!(int(&[Value::Integer(5), Value::Integer(1)], 1).unwrap_err().kind_name(),
                   "ValueError");
    }

    #[test]
    fn samples_are_distinct_members() {
        set_seed(&[Value::Integer(3)], 1).unwrap();
        let xs = ints(&[1, 2, 3, 4, 5]);
        let Value::List(picked) = sample(&[xs.clone(), Value::Integer(5)], 1).unwrap() else {
            panic!("expected a list")
        };
        let mut sorted = picked.iter()
                               .map(|v| v.as_int(1).unwrap())
                               .collect::<Vec<_>>();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3, 4, 5]);
        assert_eq!(sample(&[xs, Value::Integer(6)], 1).unwrap_err().kind_name(), "ValueError");
    }

    #[test]
    fn choices_draw_from_strings_and_lists() {
        set_seed(&[Value::Integer(11)], 1).unwrap();
        let c = choice(&[Value::from("abc")], 1).unwrap();
        assert!(["a", "b", "c"].iter().any(|s| c == Value::from(*s)));
        assert_eq!(list_len(&choices(&[ints(&[1, 2]), Value::Integer(4)], 1).unwrap()), 4);
        assert_eq!(choice(&[ints(&[])], 1).unwrap_err().kind_name(), "IndexError");
    }

    #[test]
    fn weights_decide_the_choice() {
        let picked = weighted_choice(&[ints(&[1, 2, 3]), ints(&[0, 0, 5])], 1).unwrap();
        assert_eq!(picked, Value::Integer(3));
        assert_eq!(weighted_choice(&[ints(&[1, 2]), ints(&[1])], 1).unwrap_err().kind_name(),
                   "ValueError");
        assert_eq!(weighted_choice(&[ints(&[1]), ints(&[0])], 1).unwrap_err().kind_name(),
                   "ValueError");
    }

    #[test]
    fn shuffle_keeps_the_elements() {
        set_seed(&[Value::Integer(5)], 1).unwrap();
        let outcome = shuffle(&[ints(&[1, 2, 3, 4])], 1).unwrap();
        assert_eq!(outcome.result, Value::Void);
        let Some(Value::List(items)) = outcome.updated else { panic!("expected a list") };
        let sum: i64 = items.iter().map(|v| v.as_int(1).unwrap()).sum();
        assert_eq!(sum, 10);
    }

    #[test]
    fn distributions_take_parameters() {
        set_seed(&[Value::Integer(9)], 1).unwrap();
        let Value::Float(g) = gaussian(&[Value::Float(100.0), Value::Float(0.0)], 1).unwrap() else {
            panic!("expected a float")
        };
        assert_eq!(g, 100.0);
        assert!(matches!(exponential(&[], 1).unwrap(), Value::Float(x) if x >= 0.0));
        assert_eq!(exponential(&[Value::Integer(0)], 1).unwrap_err().kind_name(),
                   "ZeroDivisionError");
        assert_eq!(list_len(&bytes(&[Value::Integer(3)], 1).unwrap()), 3);
        assert!(matches!(system_float(&[], 1).unwrap(), Value::Float(x) if (0.0..1.0).contains(&x)));
    }
}
