//! unclap - turn parsed options back into command-line arguments.
//!
//! This library takes a description of options and their current values,
//! decides which of them differ from their defaults, and renders them as
//! argv tokens or as a quoted command line for POSIX or Windows.

pub mod arg;
pub mod builder;
pub mod config;
pub mod declare;
pub mod error;
pub mod manifest;
pub mod matches;
pub mod quote;
pub mod value;

pub use arg::{Arg, ArgState};
pub use builder::{args, command_line};
pub use config::{Config, ConfigError, ConfigOverrides, Platform};
pub use declare::{OptionDecl, OptionSet, PositionalDecl};
pub use error::{BuildError, FieldError, MarshalError};
pub use manifest::Manifest;
pub use matches::from_matches;
pub use quote::{QuoteStyle, Quoter};
pub use value::{FlagValue, MarshalFlag, ValueKind};
