//! JSON manifests describing options and their current values.
//!
//! ```json
//! {
//!   "options": [
//!     {"short": "v", "long": "verbose", "value": [true, true]},
//!     {"long": "name", "optional": true, "value": "Sergey"},
//!     {"long": "timeout", "kind": "duration", "value": "1m30s"}
//!   ],
//!   "positional": ["input.txt"]
//! }
//! ```

use crate::declare::{OptionDecl, OptionSet, PositionalDecl};
use crate::error::{BuildError, FieldError};
use crate::value::{FlagValue, ValueKind};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// A string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// Declaration of a single option.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionEntry {
    /// Name reported in errors (defaults to `options[N]`)
    pub field: Option<String>,
    /// Short option character (e.g., "v" for -v)
    pub short: Option<String>,
    /// Long option name (e.g., "verbose" for --verbose)
    pub long: Option<String>,
    /// Value kind like "int" or "list<bool>"; inferred when omitted
    pub kind: Option<String>,
    /// Whether the value may be omitted
    #[serde(default)]
    pub optional: bool,
    /// Implicit value(s) when written without one
    pub optional_value: Option<OneOrMany>,
    /// Default value(s); the zero value of the kind when omitted
    pub default: Option<OneOrMany>,
    /// Skip this option
    #[serde(default)]
    pub no_flag: bool,
    /// Current value
    #[serde(default)]
    pub value: Value,
}

/// Top-level manifest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub options: Vec<OptionEntry>,
    #[serde(default)]
    pub positional: Vec<Value>,
}

impl Manifest {
    /// Parse a JSON string into a Manifest.
    pub fn from_json(json: &str) -> Result<Manifest, BuildError> {
        let raw: Value = serde_json::from_str(json)?;
        if !raw.is_object() {
            return Err(BuildError::invalid_source("object", json_type(&raw)));
        }
        Ok(serde_json::from_value(raw)?)
    }

    /// Converts every entry into a declaration, validating names, kinds and
    /// defaults along the way.
    pub fn to_option_set(&self) -> Result<OptionSet, BuildError> {
        let mut set = OptionSet::new();

        for (i, entry) in self.options.iter().enumerate() {
            let path = entry
                .field
                .clone()
                .unwrap_or_else(|| format!("options[{}]", i));
            set = set.option(entry_to_decl(entry, path)?);
        }

        for (i, value) in self.positional.iter().enumerate() {
            let path = format!("positional[{}]", i);
            let value = to_flag_value(value, None)
                .map_err(|msg| FieldError::new(&path, json_type(value), msg))?;
            set = set.positional(PositionalDecl::new(path, value));
        }

        Ok(set)
    }
}

fn entry_to_decl(entry: &OptionEntry, path: String) -> Result<OptionDecl, BuildError> {
    let kind = match entry.kind.as_deref() {
        Some(name) => Some(
            name.parse::<ValueKind>()
                .map_err(|msg| FieldError::new(&path, name, msg))?,
        ),
        None => None,
    };
    let kind_name = kind
        .as_ref()
        .map_or_else(|| json_type(&entry.value).to_string(), ToString::to_string);

    let value = to_flag_value(&entry.value, kind.as_ref())
        .map_err(|msg| FieldError::new(&path, &kind_name, msg))?;

    let mut decl = OptionDecl::new(path.clone(), value);
    decl.short = entry.short.clone().unwrap_or_default();
    decl.long = entry.long.clone().unwrap_or_default();
    decl.kind = kind;
    decl.optional = entry.optional;
    decl.no_flag = entry.no_flag;
    decl.optional_values = entry
        .optional_value
        .clone()
        .map(OneOrMany::into_vec)
        .unwrap_or_default();
    decl.defaults = entry
        .default
        .clone()
        .map(OneOrMany::into_vec)
        .unwrap_or_default();

    let effective = decl.effective_kind();
    for default in &decl.defaults {
        check_scalar(default, &effective)
            .map_err(|msg| FieldError::new(&path, effective.to_string(), msg))?;
    }
    decl.validate()?;
    Ok(decl)
}

/// Checks that an encoded default can belong to `kind`.
fn check_scalar(s: &str, kind: &ValueKind) -> Result<(), String> {
    let ok = match kind {
        ValueKind::Bool => s == "true" || s == "false",
        ValueKind::Int => s.parse::<i64>().is_ok(),
        ValueKind::Uint => s.parse::<u64>().is_ok(),
        ValueKind::Float => s.parse::<f64>().is_ok(),
        ValueKind::List(inner) => return check_scalar(s, inner),
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(format!("default {:?} is not a valid {}", s, kind))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Converts a JSON value to a flag value, following `kind` when declared
/// and the JSON shape otherwise.
fn to_flag_value(value: &Value, kind: Option<&ValueKind>) -> Result<FlagValue, String> {
    if value.is_null() {
        return Ok(FlagValue::Unset);
    }
    let Some(kind) = kind else {
        return Ok(infer_flag_value(value));
    };

    let mismatch = || format!("expected {}, got {}", kind, json_type(value));
    match (kind, value) {
        (ValueKind::Bool, Value::Bool(b)) => Ok(FlagValue::Bool(*b)),
        (ValueKind::Bool, Value::String(s)) => match s.as_str() {
            "true" => Ok(FlagValue::Bool(true)),
            "false" => Ok(FlagValue::Bool(false)),
            _ => Err(mismatch()),
        },
        (ValueKind::Int, Value::Number(n)) => n.as_i64().map(FlagValue::Int).ok_or_else(mismatch),
        (ValueKind::Int, Value::String(s)) => s.parse().map(FlagValue::Int).map_err(|_| mismatch()),
        (ValueKind::Uint, Value::Number(n)) => {
            n.as_u64().map(FlagValue::Uint).ok_or_else(mismatch)
        }
        (ValueKind::Uint, Value::String(s)) => {
            s.parse().map(FlagValue::Uint).map_err(|_| mismatch())
        }
        (ValueKind::Float, Value::Number(n)) => {
            n.as_f64().map(FlagValue::Float).ok_or_else(mismatch)
        }
        (ValueKind::Float, Value::String(s)) => {
            s.parse().map(FlagValue::Float).map_err(|_| mismatch())
        }
        (ValueKind::Duration, Value::Number(n)) => n
            .as_f64()
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .map(FlagValue::Duration)
            .ok_or_else(mismatch),
        (ValueKind::Duration, Value::String(s)) => parse_duration(s).map(FlagValue::Duration),
        (ValueKind::Text, Value::String(s)) => Ok(FlagValue::Text(s.clone())),
        (ValueKind::Text, Value::Bool(_) | Value::Number(_)) => {
            Ok(FlagValue::Text(value.to_string()))
        }
        (ValueKind::Custom, _) => Err("custom values cannot be declared in a manifest".to_string()),
        (ValueKind::List(inner), Value::Array(items)) => items
            .iter()
            .map(|item| to_element(item, inner))
            .collect::<Result<Vec<_>, _>>()
            .map(FlagValue::List),
        (ValueKind::List(inner), single) => Ok(FlagValue::List(vec![to_element(single, inner)?])),
        (ValueKind::Map(inner), Value::Object(entries)) => entries
            .iter()
            .map(|(k, v)| -> Result<(String, FlagValue), String> {
                Ok((k.clone(), to_element(v, inner)?))
            })
            .collect::<Result<BTreeMap<_, _>, String>>()
            .map(FlagValue::Map),
        _ => Err(mismatch()),
    }
}

/// List and map elements must be present scalars.
fn to_element(value: &Value, kind: &ValueKind) -> Result<FlagValue, String> {
    if value.is_null() {
        return Err("list and map elements must not be null".to_string());
    }
    if matches!(kind, ValueKind::List(_) | ValueKind::Map(_)) {
        return Err(format!("nested {} elements are not supported", kind));
    }
    to_flag_value(value, Some(kind))
}

fn infer_flag_value(value: &Value) -> FlagValue {
    match value {
        Value::Null => FlagValue::Unset,
        Value::Bool(b) => FlagValue::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                FlagValue::Int(i)
            } else if let Some(u) = n.as_u64() {
                FlagValue::Uint(u)
            } else {
                FlagValue::Float(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => FlagValue::Text(s.clone()),
        Value::Array(items) => FlagValue::List(items.iter().map(infer_flag_value).collect()),
        Value::Object(entries) => FlagValue::Map(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), infer_flag_value(v)))
                .collect(),
        ),
    }
}

/// Parses durations like `1h2m3.5s`, `250ms` or `10us`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let invalid = || format!("invalid duration {:?}", s);
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(invalid)?;
        if number_len == 0 {
            return Err(invalid());
        }
        let number: f64 = rest[..number_len].parse().map_err(|_| invalid())?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return Err(invalid()),
        };
        total += number * nanos_per_unit;
        rest = &rest[unit_len..];
    }
    if total > u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(Duration::from_nanos(total.round() as u64))
}
