use std::fmt;

use crate::callable::Callable;

/// A runtime value.  Strings are immutable and copied on clone; callables
/// share their state through `Rc`.
#[derive(Debug, Clone)]
pub enum Value {
    Callable(Callable),
    Number(f64),
    String(String),
    Bool(bool),
    Nil,
}

impl Value {
    /// Only `nil` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Name used in type errors and debug logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Callable(_) => "function",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Nil => "nil",
        }
    }
}

impl PartialEq for Value {
    /// Structural equality without coercion; callables compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Callable(a), Value::Callable(b)) => a.same_as(b),
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Callable(c) => write!(f, "{}", c),

            Value::Number(n) => write_number(f, *n),

            Value::String(s) => write!(f, "{}", s),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Nil => write!(f, "nil"),
        }
    }
}

/// 3.0 → "3", 2.5 → "2.5", 1e21 → "1.0E21", 0.0001 → "1.0E-4".
///
/// Magnitudes outside `[1e-3, 1e7)` switch to `<mantissa>E<exponent>` with at
/// least one fractional digit in the mantissa.
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        return write!(f, "NaN");
    }

    if n.is_infinite() {
        return write!(f, "{}", if n > 0.0 { "Infinity" } else { "-Infinity" });
    }

    let magnitude: f64 = n.abs();

    if magnitude != 0.0 && !(1e-3..1e7).contains(&magnitude) {
        let scientific: String = format!("{:e}", n);

        if let Some((mantissa, exponent)) = scientific.split_once('e') {
            return if mantissa.contains('.') {
                write!(f, "{}E{}", mantissa, exponent)
            } else {
                write!(f, "{}.0E{}", mantissa, exponent)
            };
        }
    }

    // `Display` for f64 already drops a zero fraction.
    write!(f, "{}", n)
}
