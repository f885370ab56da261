//! Context values and indirection cells.
//!
//! A render context is a tree of [`Value`]s. Any node may be a
//! [`Value::Ref`]: an opaque cell owned by the host (typically a reactive
//! store) that is only ever read through [`Cell::deref`]. "Undefined" has no
//! variant of its own; APIs that can fail to find something return
//! `Option<Value>` and use `None` for it.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{Error, Result};

/// Object properties, in insertion order.
pub type Object = IndexMap<String, Value>;

/// Opaque indirection capability.
///
/// The engine never inspects a cell other than through `deref`, and calls it
/// at every step of a path walk.
pub trait Cell: fmt::Debug + Send + Sync {
    fn deref(&self) -> Value;
}

/// A shared, mutable cell the host can update between renders.
#[derive(Debug, Default)]
pub struct Ref {
    inner: RwLock<Value>,
}

impl Ref {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            inner: RwLock::new(value.into()),
        }
    }

    /// Convenience for building a `Value::Ref` and keeping a handle to it.
    pub fn shared(value: impl Into<Value>) -> Arc<Self> {
        Arc::new(Self::new(value))
    }

    pub fn get(&self) -> Value {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, value: impl Into<Value>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = value.into();
    }
}

impl Cell for Ref {
    fn deref(&self) -> Value {
        self.get()
    }
}

#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Object),
    Ref(Arc<dyn Cell>),
}

impl Value {
    /// Wrap a host cell.
    pub fn cell(cell: Arc<dyn Cell>) -> Self {
        Value::Ref(cell)
    }

    /// Parse a JSON document into a context value.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let parsed: serde_json::Value = serde_json::from_str(json).map_err(Error::Context)?;
        Ok(parsed.into())
    }

    /// Follow indirection cells until a plain value is reached.
    pub fn unwrapped(&self) -> Cow<'_, Value> {
        match self {
            Value::Ref(cell) => Cow::Owned(cell.as_ref().deref().into_unwrapped()),
            other => Cow::Borrowed(other),
        }
    }

    pub fn into_unwrapped(self) -> Value {
        let mut current = self;
        while let Value::Ref(cell) = current {
            current = cell.as_ref().deref();
        }
        current
    }

    /// Objects and arrays have properties; everything else does not.
    pub fn is_container(&self) -> bool {
        matches!(
            self.unwrapped().as_ref(),
            Value::Object(_) | Value::Array(_)
        )
    }

    /// Standard falsy set: `""`, `0`, `NaN`, `null` and `false`.
    /// Empty containers are truthy.
    pub fn is_truthy(&self) -> bool {
        match self.unwrapped().as_ref() {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
            Value::Ref(_) => false,
        }
    }

    /// String form used when a value is written into the output.
    ///
    /// `null` renders as nothing, arrays join their elements with `,`, and
    /// objects render as `[object Object]`.
    pub fn to_display(&self) -> String {
        match self.unwrapped().as_ref() {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(Value::to_display)
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Ref(_) => String::new(),
        }
    }
}

/// Loose, coercing equality. `None` stands for an unresolved operand.
///
/// `null` and undefined equal each other and nothing else. Booleans compare
/// as `0`/`1`, strings compared with numbers are converted to numbers, and
/// containers compared with primitives use their string form. So `0 == false`,
/// `'1' == 1` and `'' == 0` all hold.
pub fn loose_eq(left: Option<&Value>, right: Option<&Value>) -> bool {
    let left = left.map(Value::unwrapped);
    let right = right.map(Value::unwrapped);
    match (left.as_deref(), right.as_deref()) {
        (None | Some(Value::Null), None | Some(Value::Null)) => true,
        (None | Some(Value::Null), _) | (_, None | Some(Value::Null)) => false,
        (Some(a), Some(b)) => abstract_eq(a, b),
    }
}

fn abstract_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            *n == string_to_number(s)
        }
        (Value::Bool(flag), other) | (other, Value::Bool(flag)) => {
            abstract_eq(&Value::Number(if *flag { 1.0 } else { 0.0 }), other)
        }
        (Value::Array(_) | Value::Object(_), Value::Array(_) | Value::Object(_)) => a == b,
        (container @ (Value::Array(_) | Value::Object(_)), primitive)
        | (primitive, container @ (Value::Array(_) | Value::Object(_))) => {
            abstract_eq(&Value::String(container.to_display()), primitive)
        }
        _ => false,
    }
}

/// Numeric conversion of a string operand: surrounding whitespace is ignored,
/// blank means `0`, and anything unparseable is `NaN`.
pub fn string_to_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64);
        }
    }
    // Rust also accepts "inf"/"nan" spellings; those are not numbers here.
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // Exponent form, with an explicit sign on positive powers: 1e+21, 1.5e-7.
        let exp = format!("{n:e}");
        if exp.contains("e-") {
            exp
        } else {
            exp.replacen('e', "e+", 1)
        }
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i128)
    } else {
        n.to_string()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self.unwrapped().as_ref(), other.unwrapped().as_ref()) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() <= i64::MAX as f64 => {
                serializer.serialize_i64(*n as i64)
            }
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => serializer.collect_seq(items),
            Value::Object(map) => serializer.collect_map(map),
            Value::Ref(cell) => cell.as_ref().deref().serialize(serializer),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        json.clone().into()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Object> for Value {
    fn from(map: Object) -> Self {
        Value::Object(map)
    }
}

impl From<Arc<Ref>> for Value {
    fn from(cell: Arc<Ref>) -> Self {
        Value::Ref(cell)
    }
}
