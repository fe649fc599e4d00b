//! Declarative option sets: the typed source most callers describe their
//! arguments with.
//!
//! An [`OptionDecl`] carries what a struct field with flag annotations
//! would: names, defaults, whether the value is optional, and the current
//! value. Resolving a set turns every declaration into an [`ArgState`].

use crate::arg::ArgState;
use crate::config::Config;
use crate::error::{BuildError, FieldError};
use crate::value::{FlagValue, ValueKind};
use log::trace;

/// One declared option.
#[derive(Debug, Clone)]
pub struct OptionDecl {
    /// Field path used in errors.
    pub field: String,
    pub short: String,
    pub long: String,
    /// Declared kind; inferred from `value` when absent.
    pub kind: Option<ValueKind>,
    /// The value may be omitted on the command line.
    pub optional: bool,
    /// The value an option takes when written without one.
    pub optional_values: Vec<String>,
    /// Encoded defaults; the zero value of the kind when empty.
    pub defaults: Vec<String>,
    /// Skip this declaration entirely.
    pub no_flag: bool,
    pub value: FlagValue,
}

impl OptionDecl {
    pub fn new(field: impl Into<String>, value: impl Into<FlagValue>) -> Self {
        Self {
            field: field.into(),
            short: String::new(),
            long: String::new(),
            kind: None,
            optional: false,
            optional_values: Vec::new(),
            defaults: Vec::new(),
            no_flag: false,
            value: value.into(),
        }
    }

    pub fn short(mut self, short: impl Into<String>) -> Self {
        self.short = short.into();
        self
    }

    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = long.into();
        self
    }

    pub fn kind(mut self, kind: ValueKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Adds an implicit value; call repeatedly for lists and maps.
    pub fn optional_value(mut self, value: impl Into<String>) -> Self {
        self.optional_values.push(value.into());
        self
    }

    /// Adds a default value; call repeatedly for lists and maps.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.defaults.push(value.into());
        self
    }

    pub fn no_flag(mut self) -> Self {
        self.no_flag = true;
        self
    }

    pub fn effective_kind(&self) -> ValueKind {
        self.kind.clone().unwrap_or_else(|| self.value.infer_kind())
    }

    /// Checks the declaration itself, independent of its value.
    pub fn validate(&self) -> Result<(), FieldError> {
        let error = |msg: &str| FieldError::new(&self.field, self.effective_kind().to_string(), msg);

        if self.short.is_empty() && self.long.is_empty() {
            return Err(error("option has neither a short nor a long name"));
        }
        if self.short.chars().count() > 1 {
            return Err(error("short name must be a single character"));
        }
        if self.short.chars().any(|c| c.is_whitespace() || c == '-') {
            return Err(error("short name must not be whitespace or '-'"));
        }
        if self.long.chars().any(char::is_whitespace) {
            return Err(error("long name must not contain whitespace"));
        }
        Ok(())
    }

    /// Encodes the current value and derives the presence flags from it.
    pub fn resolve(&self) -> Result<ArgState, BuildError> {
        self.validate()?;

        let kind = self.effective_kind();
        let value = self
            .value
            .to_strings()
            .map_err(|source| BuildError::Marshal {
                path: self.field.clone(),
                source,
            })?;

        // The zero value of an optional field is `Unset`, so a present value
        // is provided unless defaults were declared for it.
        let is_provided = match (&self.value, declared(&self.defaults)) {
            (FlagValue::Unset, _) => false,
            (FlagValue::Present(_), None) => true,
            (_, Some(defaults)) => value != defaults,
            (_, None) => value != kind.zero_strings(),
        };
        let is_value_optional = self.optional || kind.is_boolean();
        let is_value_provided = is_provided
            && (!is_value_optional
                || (declared(&self.optional_values).as_ref() != Some(&value)
                    && !(kind.is_boolean() && value.iter().all(|v| v == "true"))));

        trace!(
            "resolved {} ({}): provided={} optional={} explicit={}",
            self.field,
            kind,
            is_provided,
            is_value_optional,
            is_value_provided
        );
        Ok(ArgState {
            is_option: true,
            is_provided,
            is_value_optional,
            is_value_provided,
            name: self.long.clone(),
            short_name: self.short.clone(),
            value,
            field: Some(self.field.clone()),
            kind: Some(kind.to_string()),
        })
    }
}

/// A list of declared strings, where a single empty entry means "none".
fn declared(values: &[String]) -> Option<Vec<String>> {
    match values {
        [] => None,
        [only] if only.is_empty() => None,
        _ => Some(values.to_vec()),
    }
}

/// One declared positional argument.
#[derive(Debug, Clone)]
pub struct PositionalDecl {
    pub name: String,
    pub value: FlagValue,
}

impl PositionalDecl {
    pub fn new(name: impl Into<String>, value: impl Into<FlagValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn resolve(&self) -> Result<ArgState, BuildError> {
        let value = self
            .value
            .to_strings()
            .map_err(|source| BuildError::Marshal {
                path: self.name.clone(),
                source,
            })?;
        Ok(ArgState::positional(value).with_field(&self.name, self.value.infer_kind().to_string()))
    }
}

/// An ordered set of declared options followed by positionals.
#[derive(Debug, Clone, Default)]
pub struct OptionSet {
    pub options: Vec<OptionDecl>,
    pub positionals: Vec<PositionalDecl>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn option(mut self, decl: OptionDecl) -> Self {
        self.options.push(decl);
        self
    }

    pub fn positional(mut self, decl: PositionalDecl) -> Self {
        self.positionals.push(decl);
        self
    }

    /// Appends every declaration of `inner`, prefixing field paths with
    /// `name.` the way nested groups are reported.
    pub fn group(mut self, name: &str, inner: OptionSet) -> Self {
        for mut decl in inner.options {
            decl.field = format!("{}.{}", name, decl.field);
            self.options.push(decl);
        }
        for mut decl in inner.positionals {
            decl.name = format!("{}.{}", name, decl.name);
            self.positionals.push(decl);
        }
        self
    }

    /// Resolves every declaration, skipping `no_flag` ones. The first
    /// failure aborts the whole set.
    pub fn resolve(&self) -> Result<Vec<ArgState>, BuildError> {
        let mut args = Vec::with_capacity(self.options.len() + self.positionals.len());
        for decl in self.options.iter().filter(|d| !d.no_flag) {
            args.push(decl.resolve()?);
        }
        for decl in &self.positionals {
            args.push(decl.resolve()?);
        }
        Ok(args)
    }

    /// Shorthand for resolving and building tokens with `config`.
    pub fn args(&self, config: &Config) -> Result<Vec<String>, BuildError> {
        config.args(&self.resolve()?)
    }

    /// Shorthand for resolving and building a command line with `config`.
    pub fn command_line(&self, config: &Config) -> Result<String, BuildError> {
        config.command_line(&self.resolve()?)
    }
}
