//! Builder policy: delimiters, quoting and the per-platform defaults.

use crate::quote::{QuoteStyle, Quoter};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while loading configuration overrides.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse JSON config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("option delimiter must not contain whitespace: {0:?}")]
    WhitespaceDelimiter(String),
}

/// The command-line convention a configuration targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// `-a`, `--name value`, `--name=optional`.
    Posix,
    /// `/a`, `/name value`, `/name:optional`.
    Windows,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    fn short_option_delimiter(self) -> &'static str {
        match self {
            Platform::Posix => "-",
            Platform::Windows => "/",
        }
    }

    fn long_option_delimiter(self) -> &'static str {
        match self {
            Platform::Posix => "--",
            Platform::Windows => "/",
        }
    }

    fn option_argument_delimiter(self) -> &'static str {
        " "
    }

    fn option_optional_argument_delimiter(self) -> &'static str {
        match self {
            Platform::Posix => "=",
            Platform::Windows => ":",
        }
    }

    fn quoter(self) -> Quoter {
        match self {
            Platform::Posix => Quoter::posix(),
            Platform::Windows => Quoter::windows(),
        }
    }
}

/// Controls how arguments are rendered by [`Config::args`] and
/// [`Config::command_line`].
///
/// Empty delimiter fields fall back to the platform default, so a config
/// only needs to set what it changes.
#[derive(Debug, Clone)]
pub struct Config {
    /// Platform supplying the defaults for empty delimiter fields.
    pub platform: Platform,
    /// Write options by long name even when a short name exists.
    pub disable_short_name: bool,
    /// Keep short boolean options apart: `-a -b -c` instead of `-abc`.
    pub disable_combining_short_options: bool,
    /// Written before a short option name.
    pub short_option_delimiter: String,
    /// Written before a long option name.
    pub long_option_delimiter: String,
    /// Written between an option and its required value in a command line.
    pub option_argument_delimiter: String,
    /// Written between an option and its attached optional value.
    pub option_optional_argument_delimiter: String,
    /// Written between options and positionals when a positional could be
    /// mistaken for an option. Empty disables it.
    pub options_terminator: String,
    /// Applied to values in command-line mode only.
    pub argument_quoter: Option<Quoter>,
}

impl Config {
    /// The full default configuration for `platform`.
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            disable_short_name: false,
            disable_combining_short_options: platform == Platform::Windows,
            short_option_delimiter: platform.short_option_delimiter().to_string(),
            long_option_delimiter: platform.long_option_delimiter().to_string(),
            option_argument_delimiter: platform.option_argument_delimiter().to_string(),
            option_optional_argument_delimiter: platform
                .option_optional_argument_delimiter()
                .to_string(),
            options_terminator: String::new(),
            argument_quoter: Some(platform.quoter()),
        }
    }

    pub fn posix() -> Self {
        Self::for_platform(Platform::Posix)
    }

    pub fn windows() -> Self {
        Self::for_platform(Platform::Windows)
    }

    /// Every string field empty so the platform defaults apply, combining
    /// enabled and no quoting.
    pub fn bare(platform: Platform) -> Self {
        Self {
            platform,
            disable_short_name: false,
            disable_combining_short_options: false,
            short_option_delimiter: String::new(),
            long_option_delimiter: String::new(),
            option_argument_delimiter: String::new(),
            option_optional_argument_delimiter: String::new(),
            options_terminator: String::new(),
            argument_quoter: None,
        }
    }

    pub fn short_delimiter(&self) -> &str {
        or_default(
            &self.short_option_delimiter,
            self.platform.short_option_delimiter(),
        )
    }

    pub fn long_delimiter(&self) -> &str {
        or_default(
            &self.long_option_delimiter,
            self.platform.long_option_delimiter(),
        )
    }

    pub fn argument_delimiter(&self) -> &str {
        or_default(
            &self.option_argument_delimiter,
            self.platform.option_argument_delimiter(),
        )
    }

    pub fn optional_argument_delimiter(&self) -> &str {
        or_default(
            &self.option_optional_argument_delimiter,
            self.platform.option_optional_argument_delimiter(),
        )
    }

    /// Whether short boolean options are merged into one token.
    pub fn combines_short_options(&self) -> bool {
        !self.disable_combining_short_options && !self.disable_short_name
    }

    /// Applies every field set in `overrides`, leaving the rest untouched.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(platform) = overrides.platform {
            self = Self::for_platform(platform);
        }
        if let Some(v) = overrides.disable_short_name {
            self.disable_short_name = v;
        }
        if let Some(v) = overrides.disable_combining_short_options {
            self.disable_combining_short_options = v;
        }
        if let Some(ref v) = overrides.short_option_delimiter {
            self.short_option_delimiter = v.clone();
        }
        if let Some(ref v) = overrides.long_option_delimiter {
            self.long_option_delimiter = v.clone();
        }
        if let Some(ref v) = overrides.option_argument_delimiter {
            self.option_argument_delimiter = v.clone();
        }
        if let Some(ref v) = overrides.option_optional_argument_delimiter {
            self.option_optional_argument_delimiter = v.clone();
        }
        if let Some(ref v) = overrides.options_terminator {
            self.options_terminator = v.clone();
        }
        if let Some(style) = overrides.quoting {
            self.argument_quoter = style.quoter();
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::for_platform(Platform::current())
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

/// Partial configuration read from JSON. Unset fields keep their current
/// value; `platform` resets everything to that platform first.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    pub platform: Option<Platform>,
    #[serde(alias = "disable_short_option")]
    pub disable_short_name: Option<bool>,
    pub disable_combining_short_options: Option<bool>,
    pub short_option_delimiter: Option<String>,
    pub long_option_delimiter: Option<String>,
    pub option_argument_delimiter: Option<String>,
    #[serde(alias = "name_value_delimiter")]
    pub option_optional_argument_delimiter: Option<String>,
    pub options_terminator: Option<String>,
    pub quoting: Option<QuoteStyle>,
}

impl ConfigOverrides {
    /// Parse a JSON string into overrides.
    pub fn from_json(json: &str) -> Result<ConfigOverrides, ConfigError> {
        let overrides: ConfigOverrides = serde_json::from_str(json)?;
        Ok(overrides)
    }

    /// Validate the overrides.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for delimiter in [&self.short_option_delimiter, &self.long_option_delimiter]
            .into_iter()
            .flatten()
        {
            if delimiter.chars().any(char::is_whitespace) {
                return Err(ConfigError::WhitespaceDelimiter(delimiter.clone()));
            }
        }
        Ok(())
    }
}
