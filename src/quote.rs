//! Platform quoting rules for values written into a shell-ready command line.

use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Maps a raw value to a form that reads back as exactly one argument.
#[derive(Clone)]
pub struct Quoter {
    name: &'static str,
    quote: Arc<dyn Fn(&str) -> String + Send + Sync>,
}

impl Quoter {
    /// Wraps a custom quoting function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            name: "custom",
            quote: Arc::new(f),
        }
    }

    /// POSIX shell double quotes, applied only when the value needs them.
    pub fn posix() -> Self {
        Self {
            name: "posix",
            quote: Arc::new(|s: &str| {
                if posix_must_quote(s) {
                    posix_quote(s)
                } else {
                    s.to_string()
                }
            }),
        }
    }

    /// Windows argv escaping, applied only when the value needs it.
    pub fn windows() -> Self {
        Self {
            name: "windows",
            quote: Arc::new(|s: &str| {
                if windows_must_quote(s) {
                    windows_quote(s)
                } else {
                    s.to_string()
                }
            }),
        }
    }

    pub fn quote(&self, s: &str) -> String {
        (self.quote)(s)
    }

    pub fn name(&self) -> &str {
        self.name
    }
}

impl fmt::Debug for Quoter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Quoter").field(&self.name).finish()
    }
}

/// Quoting selected by name in JSON overrides and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    Posix,
    Windows,
    /// Values are written as-is.
    None,
}

impl QuoteStyle {
    pub fn quoter(self) -> Option<Quoter> {
        match self {
            QuoteStyle::Posix => Some(Quoter::posix()),
            QuoteStyle::Windows => Some(Quoter::windows()),
            QuoteStyle::None => None,
        }
    }
}

/// Characters that never need quoting in a POSIX shell word.
fn is_posix_safe(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '_' | '-' | '.' | '/' | ':' | '@' | '%' | '+' | '=' | ',')
}

/// Whether `s` would be split, expanded or lost without quoting.
pub fn posix_must_quote(s: &str) -> bool {
    s.is_empty() || !s.chars().all(is_posix_safe)
}

/// Wraps `s` in double quotes, escaping the characters that stay special
/// inside them: `$`, `` ` ``, `"` and `\`.
pub fn posix_quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '$' | '`' | '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Whether `s` would not survive `CommandLineToArgvW` as a single argument.
pub fn windows_must_quote(s: &str) -> bool {
    s.is_empty() || s.contains([' ', '\t', '\n', '\x0b', '"'])
}

/// Quotes `s` following the Windows argv convention: backslashes are
/// literal unless they precede a double quote, in which case they are
/// doubled along with the escaped quote.
pub fn windows_quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    let mut backslashes = 0usize;
    for c in s.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                quoted.extend(std::iter::repeat('\\').take(backslashes * 2 + 1));
                quoted.push('"');
                backslashes = 0;
            }
            _ => {
                quoted.extend(std::iter::repeat('\\').take(backslashes));
                quoted.push(c);
                backslashes = 0;
            }
        }
    }
    quoted.extend(std::iter::repeat('\\').take(backslashes * 2));
    quoted.push('"');
    quoted
}
