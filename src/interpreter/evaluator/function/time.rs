use std::{
    thread,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::{core::Value, object_map::ObjectMap},
    },
};

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MONTHS: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

/// A calendar date and time of day, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CivilTime {
    year:   i64,
    month:  i64,
    day:    i64,
    hour:   i64,
    minute: i64,
    second: i64,
}

/// Days since 1970-01-01 for a proleptic Gregorian date.
const fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = y - era * 400;
    let mp = if month > 2 { month - 3 } else { month + 9 };
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`].
const fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}

const fn days_in_month(year: i64, month: i64) -> i64 {
    match month {
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

impl CivilTime {
    const fn from_unix(secs: i64) -> Self {
        let (year, month, day) = civil_from_days(secs.div_euclid(86_400));
        let rem = secs.rem_euclid(86_400);
        Self { year,
               month,
               day,
               hour: rem / 3600,
               minute: rem % 3600 / 60,
               second: rem % 60 }
    }

    const fn days(&self) -> i64 {
        days_from_civil(self.year, self.month, self.day)
    }

    /// Monday is 0.
    const fn weekday(&self) -> i64 {
        (self.days() + 3).rem_euclid(7)
    }

    /// January 1st is 1.
    const fn yearday(&self) -> i64 {
        self.days() - days_from_civil(self.year, 1, 1) + 1
    }

    fn to_value(self) -> Value {
        let mut map = ObjectMap::new();
        for (key, value) in [("year", self.year),
                             ("month", self.month),
                             ("day", self.day),
                             ("hour", self.hour),
                             ("minute", self.minute),
                             ("second", self.second),
                             ("weekday", self.weekday()),
                             ("yearday", self.yearday())]
        {
            map.insert(key, Value::Integer(value));
        }
        Value::from(map)
    }

    /// Renders `%Y %y %m %d %H %M %S %j %a %b %%`.
    fn format(&self, pattern: &str, line: usize) -> EvalResult<String> {
        let mut out = String::new();
        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('Y') => out.push_str(&format!("{:04}", self.year)),
                Some('y') => out.push_str(&format!("{:02}", self.year.rem_euclid(100))),
                Some('m') => out.push_str(&format!("{:02}", self.month)),
                Some('d') => out.push_str(&format!("{:02}", self.day)),
                Some('H') => out.push_str(&format!("{:02}", self.hour)),
                Some('M') => out.push_str(&format!("{:02}", self.minute)),
                Some('S') => out.push_str(&format!("{:02}", self.second)),
                Some('j') => out.push_str(&format!("{:03}", self.yearday())),
                Some('a') => out.push_str(WEEKDAYS.get(usize::try_from(self.weekday()).unwrap_or(0)).unwrap_or(&"")),
                Some('b') => out.push_str(MONTHS.get(usize::try_from(self.month - 1).unwrap_or(0)).unwrap_or(&"")),
                Some('%') => out.push('%'),
                other => {
                    return Err(RuntimeError::value(format!("unsupported time directive '%{}'",
                                                           other.map(String::from).unwrap_or_default()),
                                                   line));
                },
            }
        }
        Ok(out)
    }

    /// Reads `text` against `%Y %m %d %H %M %S %%`. Fields the pattern
    /// leaves out default to 1900-01-01 00:00:00.
    fn parse(text: &str, pattern: &str, line: usize) -> EvalResult<Self> {
        let mismatch = || RuntimeError::value(format!("time data '{text}' does not match format '{pattern}'"), line);
        let mut time = Self { year:   1900,
                              month:  1,
                              day:    1,
                              hour:   0,
                              minute: 0,
                              second: 0, };
        let mut input = text.chars().peekable();
        let mut directives = pattern.chars();

        while let Some(c) = directives.next() {
            if c != '%' {
                if input.next() != Some(c) {
                    return Err(mismatch());
                }
                continue;
            }
            let (field, width) = match directives.next() {
                Some('Y') => (&mut time.year, 4),
                Some('m') => (&mut time.month, 2),
                Some('d') => (&mut time.day, 2),
                Some('H') => (&mut time.hour, 2),
                Some('M') => (&mut time.minute, 2),
                Some('S') => (&mut time.second, 2),
                Some('%') => {
                    if input.next() != Some('%') {
                        return Err(mismatch());
                    }
                    continue;
                },
                other => {
                    return Err(RuntimeError::value(format!("unsupported time directive '%{}'",
                                                           other.map(String::from).unwrap_or_default()),
                                                   line));
                },
            };
            let mut digits = String::new();
            while digits.len() < width
                  && let Some(d) = input.next_if(char::is_ascii_digit)
            {
                digits.push(d);
            }
            *field = digits.parse().map_err(|_| mismatch())?;
        }
        if input.next().is_some() {
            return Err(RuntimeError::value(format!("unconverted data remains in '{text}'"), line));
        }

        let valid = (1..=12).contains(&time.month)
                    && (1..=days_in_month(time.year, time.month)).contains(&time.day)
                    && (0..24).contains(&time.hour)
                    && (0..60).contains(&time.minute)
                    && (0..=61).contains(&time.second);
        if valid { Ok(time) } else { Err(mismatch()) }
    }
}

fn now(line: usize) -> EvalResult<CivilTime> {
    let secs = i64::try_from(since_epoch(line)?.as_secs())
        .map_err(|_| RuntimeError::exception("timestamp out of range", line))?;
    Ok(CivilTime::from_unix(secs))
}

fn since_epoch(line: usize) -> EvalResult<Duration> {
    SystemTime::now().duration_since(UNIX_EPOCH)
                     .map_err(|err| RuntimeError::io(format!("system clock error: {err}"), line))
}

/// `GetCurrentTimestamp()`: seconds since the Unix epoch, as a float.
pub fn timestamp(_args: &[Value], line: usize) -> EvalResult<Value> {
    Ok(Value::Float(since_epoch(line)?.as_secs_f64()))
}

/// `TimeNs()`: nanoseconds since the Unix epoch, as an integer.
pub fn time_ns(_args: &[Value], line: usize) -> EvalResult<Value> {
    let nanos = since_epoch(line)?.as_nanos();
    i64::try_from(nanos).map(Value::Integer)
                        .map_err(|_| RuntimeError::exception("timestamp out of range", line))
}

/// `Sleep(seconds)`: blocks the interpreter for a number of seconds.
///
/// # Errors
/// `ValueError` for a negative or non-finite duration.
pub fn sleep(args: &[Value], line: usize) -> EvalResult<Value> {
    let seconds = args[0].as_float(line)?;
    let duration = Duration::try_from_secs_f64(seconds).map_err(|_| {
                                                           RuntimeError::value(format!("invalid sleep duration {seconds}"),
                                                                               line)
                                                       })?;
    thread::sleep(duration);
    Ok(Value::Void)
}

/// `GetCurrentTimeObj()`: the current UTC time as an object with `year`,
/// `month`, `day`, `hour`, `minute`, `second`, `weekday` (Monday is 0) and
/// `yearday` (January 1st is 1).
pub fn current_time_obj(_args: &[Value], line: usize) -> EvalResult<Value> {
    Ok(now(line)?.to_value())
}

/// `FormatTime(pattern)`: the current UTC time rendered with `%` directives.
///
/// # Errors
/// `ValueError` for an unsupported directive.
pub fn format_time(args: &[Value], line: usize) -> EvalResult<Value> {
    let pattern = args[0].as_str(line)?;
    Ok(Value::from(now(line)?.format(pattern, line)?))
}

/// `ParseTime(text, pattern)`: the same object as `GetCurrentTimeObj`, read
/// from `text`.
///
/// # Errors
/// `ValueError` when the text does not match the pattern or names an
/// impossible date.
pub fn parse_time(args: &[Value], line: usize) -> EvalResult<Value> {
    let (text, pattern) = (args[0].as_str(line)?, args[1].as_str(line)?);
    Ok(CivilTime::parse(text, pattern, line)?.to_value())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn calendar_conversion_matches_known_dates() {
        let t = CivilTime::from_unix(0);
        assert_eq!((t.year, t.month, t.day, t.weekday(), t.yearday()), (1970, 1, 1, 3, 1));
        let t = CivilTime::from_unix(951_782_400);
        assert_eq!((t.year, t.month, t.day, t.weekday()), (2000, 2, 29, 1));
        let t = CivilTime::from_unix(1_682_951_400);
        assert_eq!(t.format("%Y-%m-%d %H:%M:%S %a %b %j", 1).unwrap(),
                   "2023-05-01 14:30:00 Mon May 121");
    }

    #[test]
    fn parsed_times_become_objects() {
        let parsed = parse_time(&[Value::from("2023-05-01 14:30:00"), Value::from("%Y-%m-%d %H:%M:%S")], 1).unwrap();
        assert_eq!(parsed.to_string(),
                   "{year: 2023, month: 5, day: 1, hour: 14, minute: 30, second: 0, weekday: 0, yearday: 121}");
        let parsed = parse_time(&[Value::from("12:05"), Value::from("%H:%M")], 1).unwrap();
        assert!(parsed.to_string().starts_with("{year: 1900, month: 1, day: 1, hour: 12, minute: 5"));
    }

    #[test]
    fn bad_times_are_value_errors() {
        for (text, pattern) in [("2023-02-30", "%Y-%m-%d"),
                                ("2023/05/01", "%Y-%m-%d"),
                                ("2023-05-01x", "%Y-%m-%d"),
                                ("12", "%Q")]
        {
            let err = parse_time(&[Value::from(text), Value::from(pattern)], 1).unwrap_err();
            assert_eq!(err.kind_name(), "ValueError", "{text} {pattern}");
        }
        assert_eq!(format_time(&[Value::from("%Q")], 1).unwrap_err().kind_name(), "ValueError");
    }

    #[test]
    fn current_time_is_a_full_object() {
        let now = current_time_obj(&[], 1).unwrap();
        let map = now.as_object(1).unwrap();
        assert_eq!(map.len(), 8);
        assert!(matches!(map.get("month"), Some(Value::Integer(m)) if (1..=12).contains(m)));
    }

    #[test]
    fn clocks_move_forward() {
        let Value::Integer(first) = time_ns(&[], 1).unwrap() else { panic!("expected an integer") };
        sleep(&[Value::Float(0.001)], 1).unwrap();
        let Value::Integer(second) = time_ns(&[], 1).unwrap() else { panic!("expected an integer") };
        assert!(second > first);
        assert!(matches!(timestamp(&[], 1).unwrap(), Value::Float(s) if s > 0.0));
    }

    #[test]
    fn negative_sleep_is_rejected() {
        assert_eq!(sleep(&[Value::Integer(-1)], 1).unwrap_err().kind_name(), "ValueError");
    }
}
