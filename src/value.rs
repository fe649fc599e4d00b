//! Typed option values and their string encoding.

use crate::error::MarshalError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Implemented by types that render themselves as a flag value.
pub trait MarshalFlag: fmt::Debug + Send + Sync {
    fn marshal_flag(&self) -> Result<String, MarshalError>;
}

/// The value held by a declared option.
#[derive(Debug, Clone)]
pub enum FlagValue {
    /// No value at all (an unset optional field). Renders nothing.
    Unset,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Duration(Duration),
    Text(String),
    /// A value behind an optional field. It counts as set even when it
    /// holds the zero value of its kind.
    Present(Box<FlagValue>),
    Custom(Arc<dyn MarshalFlag>),
    List(Vec<FlagValue>),
    /// Entries are kept sorted by key so the rendering is reproducible.
    Map(BTreeMap<String, FlagValue>),
}

impl FlagValue {
    pub fn custom<M: MarshalFlag + 'static>(value: M) -> Self {
        Self::Custom(Arc::new(value))
    }

    /// Encodes the value as the list of strings an `Arg` exposes.
    ///
    /// Lists give one entry per element and maps one `key:value` entry per
    /// key. A scalar that encodes to the empty string gives no entry.
    pub fn to_strings(&self) -> Result<Vec<String>, MarshalError> {
        match self {
            FlagValue::Unset => Ok(Vec::new()),
            FlagValue::Present(inner) => inner.to_strings(),
            FlagValue::List(items) => items.iter().map(FlagValue::to_scalar).collect(),
            FlagValue::Map(entries) => entries
                .iter()
                .map(|(k, v)| Ok(format!("{}:{}", k, v.to_scalar()?)))
                .collect(),
            scalar => {
                let s = scalar.to_scalar()?;
                Ok(if s.is_empty() { Vec::new() } else { vec![s] })
            }
        }
    }

    /// Encodes a single element. Composite values nested inside a list or
    /// map have no flag syntax and encode as the empty string.
    pub fn to_scalar(&self) -> Result<String, MarshalError> {
        Ok(match self {
            FlagValue::Unset | FlagValue::List(_) | FlagValue::Map(_) => String::new(),
            FlagValue::Bool(b) => b.to_string(),
            FlagValue::Int(i) => i.to_string(),
            FlagValue::Uint(u) => u.to_string(),
            FlagValue::Float(f) => format_float(*f),
            FlagValue::Duration(d) => format_duration(*d),
            FlagValue::Text(s) => s.clone(),
            FlagValue::Present(inner) => inner.to_scalar()?,
            FlagValue::Custom(m) => m.marshal_flag()?,
        })
    }

    /// The kind this value would be declared with, inferred from its shape.
    ///
    /// Empty lists and maps cannot reveal their element kind and are
    /// reported as holding strings.
    pub fn infer_kind(&self) -> ValueKind {
        match self {
            FlagValue::Unset | FlagValue::Text(_) => ValueKind::Text,
            FlagValue::Bool(_) => ValueKind::Bool,
            FlagValue::Int(_) => ValueKind::Int,
            FlagValue::Uint(_) => ValueKind::Uint,
            FlagValue::Float(_) => ValueKind::Float,
            FlagValue::Duration(_) => ValueKind::Duration,
            FlagValue::Custom(_) => ValueKind::Custom,
            FlagValue::Present(inner) => inner.infer_kind(),
            FlagValue::List(items) => ValueKind::List(Box::new(
                items.first().map_or(ValueKind::Text, FlagValue::infer_kind),
            )),
            FlagValue::Map(entries) => ValueKind::Map(Box::new(
                entries
                    .values()
                    .next()
                    .map_or(ValueKind::Text, FlagValue::infer_kind),
            )),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(v: bool) -> Self {
        FlagValue::Bool(v)
    }
}

impl From<i64> for FlagValue {
    fn from(v: i64) -> Self {
        FlagValue::Int(v)
    }
}

impl From<i32> for FlagValue {
    fn from(v: i32) -> Self {
        FlagValue::Int(v.into())
    }
}

impl From<u64> for FlagValue {
    fn from(v: u64) -> Self {
        FlagValue::Uint(v)
    }
}

impl From<f64> for FlagValue {
    fn from(v: f64) -> Self {
        FlagValue::Float(v)
    }
}

impl From<Duration> for FlagValue {
    fn from(v: Duration) -> Self {
        FlagValue::Duration(v)
    }
}

impl From<&str> for FlagValue {
    fn from(v: &str) -> Self {
        FlagValue::Text(v.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(v: String) -> Self {
        FlagValue::Text(v)
    }
}

impl<T: Into<FlagValue>> From<Option<T>> for FlagValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FlagValue::Unset, |v| FlagValue::Present(Box::new(v.into())))
    }
}

impl<T: Into<FlagValue>> From<Vec<T>> for FlagValue {
    fn from(v: Vec<T>) -> Self {
        FlagValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<FlagValue>> FromIterator<(K, V)> for FlagValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FlagValue::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// The declared type of an option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Uint,
    Float,
    Duration,
    Text,
    Custom,
    List(Box<ValueKind>),
    Map(Box<ValueKind>),
}

impl ValueKind {
    /// Booleans and lists of booleans may be written without a value.
    pub fn is_boolean(&self) -> bool {
        match self {
            ValueKind::Bool => true,
            ValueKind::List(inner) => **inner == ValueKind::Bool,
            _ => false,
        }
    }

    /// The encoded zero value, used as the default when none is declared.
    pub fn zero_strings(&self) -> Vec<String> {
        match self {
            ValueKind::Bool => vec!["false".to_string()],
            ValueKind::Int | ValueKind::Uint | ValueKind::Float => vec!["0".to_string()],
            ValueKind::Duration => vec!["0s".to_string()],
            ValueKind::Text | ValueKind::Custom | ValueKind::List(_) | ValueKind::Map(_) => {
                Vec::new()
            }
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Bool => f.write_str("bool"),
            ValueKind::Int => f.write_str("int"),
            ValueKind::Uint => f.write_str("uint"),
            ValueKind::Float => f.write_str("float"),
            ValueKind::Duration => f.write_str("duration"),
            ValueKind::Text => f.write_str("string"),
            ValueKind::Custom => f.write_str("custom"),
            ValueKind::List(inner) => write!(f, "list<{}>", inner),
            ValueKind::Map(inner) => write!(f, "map<{}>", inner),
        }
    }
}

impl FromStr for ValueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(inner) = s.strip_prefix("list<").and_then(|r| r.strip_suffix('>')) {
            return Ok(ValueKind::List(Box::new(inner.parse()?)));
        }
        if let Some(inner) = s.strip_prefix("map<").and_then(|r| r.strip_suffix('>')) {
            return Ok(ValueKind::Map(Box::new(inner.parse()?)));
        }
        match s {
            "bool" => Ok(ValueKind::Bool),
            "int" => Ok(ValueKind::Int),
            "uint" => Ok(ValueKind::Uint),
            "float" => Ok(ValueKind::Float),
            "duration" => Ok(ValueKind::Duration),
            "string" => Ok(ValueKind::Text),
            "custom" => Ok(ValueKind::Custom),
            other => Err(format!("unknown value kind '{}'", other)),
        }
    }
}

/// Shortest representation that round-trips, switching to exponent form for
/// very large or very small magnitudes (`1e+06`, `1e-05`).
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    if f == 0.0 {
        return if f.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "1.2345e3".
    let sci = format!("{:e}", f);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => return sci,
    };

    if !(-4..6).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", mantissa, sign, exp.abs());
    }
    f.to_string()
}

/// Formats like `1h2m3.5s`, `1.5s`, `250ms`, `10µs`, `0s`.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{}ns", nanos);
    }
    if nanos < 1_000_000 {
        return format!("{}µs", with_fraction(nanos, 3));
    }
    if nanos < 1_000_000_000 {
        return format!("{}ms", with_fraction(nanos, 6));
    }

    let secs = nanos / 1_000_000_000;
    let frac = nanos % 1_000_000_000;
    let hours = secs / 3600;
    let minutes = (secs / 60) % 60;
    let seconds = (secs % 60) * 1_000_000_000 + frac;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    out.push_str(&with_fraction(seconds, 9));
    out.push('s');
    out
}

/// Renders `value / 10^digits` with trailing fractional zeros removed.
fn with_fraction(value: u128, digits: u32) -> String {
    let scale = 10u128.pow(digits);
    let whole = value / scale;
    let frac = value % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", frac, width = digits as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
