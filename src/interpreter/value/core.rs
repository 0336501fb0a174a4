use std::{cell::RefCell, collections::BTreeSet, fmt, rc::Rc};

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::{
            object_map::ObjectMap,
            record::{Function, Instance, StructValue},
            set_value::SetValue,
        },
    },
    util::num::int_to_float,
};

/// Represents a runtime value in the interpreter.
///
/// This enum models every value that can be bound to a name, passed to a
/// function, stored in a container or field, or returned. Containers are
/// reference counted and copied on write; instances are shared and mutable.
#[derive(Debug, Clone)]
pub enum Value {
    /// A 64-bit signed integer.
    Integer(i64),
    /// A double precision floating-point number.
    Float(f64),
    /// A boolean value (`true` or `false`).
    Bool(bool),
    /// A string.
    Str(String),
    /// An ordered list of values.
    List(Rc<Vec<Self>>),
    /// A string-keyed object (dictionary) in insertion order.
    Object(Rc<ObjectMap>),
    /// A set of unique hashable values.
    Set(Rc<BTreeSet<SetValue>>),
    /// A value of a declared struct type.
    Struct(Rc<StructValue>),
    /// A user function or lambda.
    Function(Rc<Function>),
    /// A class instance created by `new`.
    Instance(Rc<RefCell<Instance>>),
    /// The absence of a value, produced by statements and `void` functions.
    Void,
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::List(Rc::new(v))
    }
}

impl From<ObjectMap> for Value {
    fn from(v: ObjectMap) -> Self {
        Self::Object(Rc::new(v))
    }
}

impl From<BTreeSet<SetValue>> for Value {
    fn from(v: BTreeSet<SetValue>) -> Self {
        Self::Set(Rc::new(v))
    }
}

impl PartialEq for Value {
    /// Structural equality.
    ///
    /// Integers and floats compare numerically; values of unrelated types are
    /// never equal. Instances compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Integer(a), Self::Float(b)) | (Self::Float(b), Self::Integer(a)) => {
                int_to_float(*a) == *b
            },
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
            },
            (Self::Set(a), Self::Set(b)) => a == b,
            (Self::Struct(a), Self::Struct(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => a == b,
            (Self::Instance(a), Self::Instance(b)) => Rc::ptr_eq(a, b),
            (Self::Void, Self::Void) => true,
            _ => false,
        }
    }
}

impl Value {
    /// Returns the runtime type tag of the value.
    ///
    /// Structs report their struct name and instances their class name. Enum
    /// membership is not visible from a bare value; the evaluator refines
    /// string tags to enum names where needed.
    ///
    /// # Example
    /// ```
    /// use fight::interpreter::value::core::Value;
    ///
    /// assert_eq!(Value::Integer(1).type_name(), "int");
    /// assert_eq!(Value::from("x").type_name(), "string");
    /// assert_eq!(Value::Void.type_name(), "void");
    /// ```
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::Integer(_) => "int".to_string(),
            Self::Float(_) => "float".to_string(),
            Self::Bool(_) => "bool".to_string(),
            Self::Str(_) => "string".to_string(),
            Self::List(_) => "list".to_string(),
            Self::Object(_) => "object".to_string(),
            Self::Set(_) => "set".to_string(),
            Self::Function(_) => "function".to_string(),
            Self::Struct(s) => s.name.clone(),
            Self::Instance(i) => i.borrow().class_name().to_string(),
            Self::Void => "void".to_string(),
        }
    }

    /// Truthiness used by `if`, `loop`, `or` and `!`.
    ///
    /// `false`, zero, empty strings and containers, and `void` are falsy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Integer(n) => *n != 0,
            Self::Float(f) => *f != 0.0,
            Self::Bool(b) => *b,
            Self::Str(s) => !s.is_empty(),
            Self::List(l) => !l.is_empty(),
            Self::Object(o) => !o.is_empty(),
            Self::Set(s) => !s.is_empty(),
            Self::Struct(_) | Self::Function(_) | Self::Instance(_) => true,
            Self::Void => false,
        }
    }

    /// Converts the value to `bool`, or returns an error if not boolean.
    ///
    /// Used where the language demands a real boolean, such as the condition
    /// of an `if (c) a : b` expression.
    pub fn as_bool(&self, line: usize) -> EvalResult<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(RuntimeError::type_error(format!("Expected bool, found {}",
                                                          other.type_name()),
                                                  line)),
        }
    }

    /// Converts the value to `i64`, or returns an error if not an integer.
    pub fn as_int(&self, line: usize) -> EvalResult<i64> {
        match self {
            Self::Integer(n) => Ok(*n),
            other => Err(RuntimeError::type_error(format!("Expected int, found {}",
                                                          other.type_name()),
                                                  line)),
        }
    }

    /// Converts a numeric value to `f64`, promoting integers.
    ///
    /// # Example
    /// ```
    /// use fight::interpreter::value::core::Value;
    ///
    /// assert_eq!(Value::Integer(2).as_float(1).unwrap(), 2.0);
    /// assert!(Value::from("2").as_float(1).is_err());
    /// ```
    pub fn as_float(&self, line: usize) -> EvalResult<f64> {
        match self {
            Self::Integer(n) => Ok(int_to_float(*n)),
            Self::Float(f) => Ok(*f),
            other => Err(RuntimeError::type_error(format!("Expected number, found {}",
                                                          other.type_name()),
                                                  line)),
        }
    }

    /// Borrows the string payload, or returns an error if not a string.
    pub fn as_str(&self, line: usize) -> EvalResult<&str> {
        match self {
            Self::Str(s) => Ok(s),
            other => Err(RuntimeError::type_error(format!("Expected string, found {}",
                                                          other.type_name()),
                                                  line)),
        }
    }

    /// Borrows the list payload, or returns an error if not a list.
    pub fn as_list(&self, line: usize) -> EvalResult<&Rc<Vec<Self>>> {
        match self {
            Self::List(l) => Ok(l),
            other => Err(RuntimeError::type_error(format!("Expected list, found {}",
                                                          other.type_name()),
                                                  line)),
        }
    }

    /// Borrows the object payload, or returns an error if not an object.
    pub fn as_object(&self, line: usize) -> EvalResult<&Rc<ObjectMap>> {
        match self {
            Self::Object(o) => Ok(o),
            other => Err(RuntimeError::type_error(format!("Expected object, found {}",
                                                          other.type_name()),
                                                  line)),
        }
    }

    /// Borrows the set payload, or returns an error if not a set.
    pub fn as_set(&self, line: usize) -> EvalResult<&Rc<BTreeSet<SetValue>>> {
        match self {
            Self::Set(s) => Ok(s),
            other => Err(RuntimeError::type_error(format!("Expected set, found {}",
                                                          other.type_name()),
                                                  line)),
        }
    }

    /// Returns `true` for `void`.
    #[must_use]
    pub const fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// Formats the value as it appears inside a container.
    ///
    /// Identical to `Display` except that strings are quoted.
    ///
    /// # Example
    /// ```
    /// use fight::interpreter::value::core::Value;
    ///
    /// assert_eq!(Value::from("hi").repr(), "\"hi\"");
    /// assert_eq!(Value::from("hi").to_string(), "hi");
    /// ```
    #[must_use]
    pub fn repr(&self) -> String {
        match self {
            Self::Str(s) => format!("\"{s}\""),
            other => other.to_string(),
        }
    }
}

/// Formats a float so that integral values keep a trailing `.0`.
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

fn join_repr<'a>(values: impl Iterator<Item = &'a Value>) -> String {
    values.map(Value::repr).collect::<Vec<_>>().join(", ")
}

fn join_fields(map: &ObjectMap) -> String {
    map.iter()
       .map(|(k, v)| format!("{k}: {}", v.repr()))
       .collect::<Vec<_>>()
       .join(", ")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{}", format_float(*x)),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::List(items) => write!(f, "[{}]", join_repr(items.iter())),
            Self::Object(map) => write!(f, "{{{}}}", join_fields(map)),
            Self::Set(set) => {
                let items = set.iter().map(ToString::to_string).collect::<Vec<_>>();
                write!(f, "set<{}>", items.join(", "))
            },
            Self::Struct(s) => write!(f, "{}{{{}}}", s.name, join_fields(&s.fields)),
            Self::Function(func) => write!(f, "<function {}>", func.def.name),
            Self::Instance(inst) => write!(f, "<{} instance>", inst.borrow().class_name()),
            Self::Void => write!(f, "void"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn floats_keep_their_fraction() {
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
    }

    #[test]
    fn containers_quote_strings() {
        let list = Value::from(vec![Value::Integer(1), Value::from("a")]);
        assert_eq!(list.to_string(), "[1, \"a\"]");

        let mut map = ObjectMap::new();
        map.insert("name", Value::from("x"));
        map.insert("age", Value::Integer(3));
        assert_eq!(Value::from(map).to_string(), "{name: \"x\", age: 3}");
    }

    #[test]
    fn sets_print_in_order() {
        let set: BTreeSet<SetValue> = [3, 1, 2].into_iter().map(SetValue::Integer).collect();
        assert_eq!(Value::from(set).to_string(), "set<1, 2, 3>");
    }

    #[test]
    fn numeric_equality_crosses_int_and_float() {
        assert_eq!(Value::Integer(1), Value::Float(1.0));
        assert_ne!(Value::Integer(1), Value::from("1"));
    }

    #[test]
    fn object_equality_ignores_order() {
        let a: ObjectMap = [("x".to_string(), Value::Integer(1)),
                            ("y".to_string(), Value::Integer(2))].into_iter()
                                                                 .collect();
        let b: ObjectMap = [("y".to_string(), Value::Integer(2)),
                            ("x".to_string(), Value::Integer(1))].into_iter()
                                                                 .collect();
        assert_eq!(Value::from(a), Value::from(b));
    }
}
