//! Turns resolved arguments back into command-line tokens.

use crate::arg::Arg;
use crate::config::Config;
use crate::error::{BuildError, FieldError};
use log::{debug, trace};

/// Whether output is a list of argv entries or a shell-ready string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Raw tokens, never quoted.
    Tokens,
    /// Tokens destined to be joined with spaces; values are quoted.
    CommandLine,
}

impl Config {
    /// Converts `args` to command-line arguments, one token per argv entry.
    ///
    /// Values are never quoted in this form; every token can be handed to a
    /// process-spawning API as is.
    pub fn args<A: Arg>(&self, args: &[A]) -> Result<Vec<String>, BuildError> {
        self.build(args, Mode::Tokens)
    }

    /// Converts `args` to a single command line with values quoted by the
    /// configured quoter.
    pub fn command_line<A: Arg>(&self, args: &[A]) -> Result<String, BuildError> {
        Ok(self.build(args, Mode::CommandLine)?.join(" "))
    }

    fn build<A: Arg>(&self, args: &[A], mode: Mode) -> Result<Vec<String>, BuildError> {
        let (remaining, mut tokens) = self.combine_shorts(args);

        for arg in remaining.iter().filter(|a| a.is_option() && a.is_provided()) {
            self.render_option(*arg, mode, &mut tokens)?;
        }

        let positionals: Vec<String> = remaining
            .iter()
            .filter(|a| !a.is_option() && a.is_provided())
            .flat_map(|a| a.value())
            .collect();
        if self.needs_terminator(&positionals) {
            tokens.push(self.options_terminator.clone());
        }
        for value in &positionals {
            tokens.push(self.render_value(value, mode));
        }

        debug!(
            "built {} tokens from {} arguments ({:?})",
            tokens.len(),
            args.len(),
            mode
        );
        Ok(tokens)
    }

    /// Splits off the provided short booleans without an explicit value and
    /// merges them into one token. Every value of a list-of-bool option
    /// repeats its short name, so `[true, true]` on `v` gives `-vv`.
    fn combine_shorts<'a, A: Arg>(&self, args: &'a [A]) -> (Vec<&'a A>, Vec<String>) {
        if !self.combines_short_options() {
            return (args.iter().collect(), Vec::new());
        }

        let mut remaining = Vec::with_capacity(args.len());
        let mut shorts = String::new();
        for arg in args {
            if is_combinable(arg) {
                for _ in arg.value() {
                    shorts.push_str(arg.short_name());
                }
            } else {
                remaining.push(arg);
            }
        }

        let mut tokens = Vec::new();
        if !shorts.is_empty() {
            let token = format!("{}{}", self.short_delimiter(), shorts);
            trace!("combined short options into {}", token);
            tokens.push(token);
        }
        (remaining, tokens)
    }

    fn render_option<A: Arg>(
        &self,
        arg: &A,
        mode: Mode,
        tokens: &mut Vec<String>,
    ) -> Result<(), BuildError> {
        let value_optional = arg.is_value_optional();
        // An explicit optional value can only be attached to a long name.
        let explicit = value_optional && arg.is_value_provided();
        let optional_delimiter = self.optional_argument_delimiter();

        let mut name = if self.disable_short_name || arg.short_name().is_empty() || explicit {
            if arg.name().is_empty() {
                return Err(FieldError::new(
                    arg.field(),
                    arg.kind(),
                    "option does not have long name",
                )
                .into());
            }
            format!("{}{}", self.long_delimiter(), arg.name())
        } else {
            format!("{}{}", self.short_delimiter(), arg.short_name())
        };
        if explicit && optional_delimiter != " " {
            name.push_str(optional_delimiter);
        }

        for value in arg.value() {
            if !value_optional {
                self.push_required(&name, &value, mode, tokens);
            } else if explicit {
                if optional_delimiter == " " {
                    tokens.push(name.clone());
                    tokens.push(self.render_value(&value, mode));
                } else {
                    tokens.push(format!("{}{}", name, self.render_value(&value, mode)));
                }
            } else {
                tokens.push(name.clone());
                if !self.disable_combining_short_options {
                    break;
                }
            }
        }
        trace!("rendered option {}", arg.field());
        Ok(())
    }

    /// An option followed by its required value. Separate tokens in token
    /// mode; in a command line the value follows the argument delimiter.
    fn push_required(&self, name: &str, value: &str, mode: Mode, tokens: &mut Vec<String>) {
        let delimiter = self.argument_delimiter();
        if mode == Mode::Tokens || delimiter == " " {
            tokens.push(name.to_string());
            tokens.push(self.render_value(value, mode));
        } else {
            tokens.push(format!("{}{}{}", name, delimiter, self.render_value(value, mode)));
        }
    }

    fn render_value(&self, value: &str, mode: Mode) -> String {
        match (&self.argument_quoter, mode) {
            (Some(quoter), Mode::CommandLine) => quoter.quote(value),
            _ => value.to_string(),
        }
    }

    /// The terminator is only written when a positional would otherwise be
    /// read back as an option.
    fn needs_terminator(&self, positionals: &[String]) -> bool {
        if self.options_terminator.is_empty() {
            return false;
        }
        let short = self.short_delimiter();
        let long = self.long_delimiter();
        positionals
            .iter()
            .any(|v| v.starts_with(short) || v.starts_with(long))
    }
}

fn is_combinable<A: Arg>(arg: &A) -> bool {
    arg.is_option()
        && arg.is_provided()
        && arg.is_value_optional()
        && !arg.is_value_provided()
        && !arg.short_name().is_empty()
}

/// Converts `args` to tokens using the current platform's defaults.
pub fn args<A: Arg>(args: &[A]) -> Result<Vec<String>, BuildError> {
    Config::default().args(args)
}

/// Converts `args` to a command line using the current platform's defaults.
pub fn command_line<A: Arg>(args: &[A]) -> Result<String, BuildError> {
    Config::default().command_line(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arg::ArgState;
    use crate::config::Platform;
    use crate::quote::Quoter;

    fn sample_args() -> Vec<ArgState> {
        vec![
            ArgState::option("unprovided", "u", Vec::<String>::new()).unprovided(),
            ArgState::switch("bool-true", "b"),
            ArgState::optional("bool-false", "B", ["false"]),
            ArgState::option("int", "i", ["1"]),
            ArgState {
                value: vec!["foo bar".to_string()],
                ..ArgState::switch("string-value-unprovided", "f")
            },
            ArgState::optional("string-value-provided", "q", ["baz qux"]),
            ArgState::optional("string-optional", "", ["foo", "bar"]),
            ArgState::positional(["foo bar"]),
        ]
    }

    fn tokens(config: &Config, args: &[ArgState]) -> Vec<String> {
        config.args(args).unwrap()
    }

    #[test]
    fn test_empty() {
        let config = Config::posix();
        assert!(tokens(&config, &[]).is_empty());
        assert_eq!(config.command_line::<ArgState>(&[]).unwrap(), "");
    }

    #[test]
    fn test_unprovided_renders_nothing() {
        let args = vec![ArgState::option("unprovided", "u", ["x"]).unprovided()];
        assert!(tokens(&Config::posix(), &args).is_empty());
    }

    #[test]
    fn test_default_posix() {
        assert_eq!(
            tokens(&Config::posix(), &sample_args()),
            vec![
                "-bf",
                "--bool-false=false",
                "-i",
                "1",
                "--string-value-provided=baz qux",
                "--string-optional=foo",
                "--string-optional=bar",
                "foo bar",
            ]
        );
    }

    #[test]
    fn test_default_posix_command_line() {
        assert_eq!(
            Config::posix().command_line(&sample_args()).unwrap(),
            r#"-bf --bool-false=false -i 1 --string-value-provided="baz qux" --string-optional=foo --string-optional=bar "foo bar""#
        );
    }

    #[test]
    fn test_disable_short_name() {
        let config = Config {
            disable_short_name: true,
            ..Config::posix()
        };
        assert_eq!(
            tokens(&config, &sample_args()),
            vec![
                "--bool-true",
                "--bool-false=false",
                "--int",
                "1",
                "--string-value-unprovided",
                "--string-value-provided=baz qux",
                "--string-optional=foo",
                "--string-optional=bar",
                "foo bar",
            ]
        );
    }

    #[test]
    fn test_disable_combining_short_options() {
        let config = Config {
            disable_combining_short_options: true,
            ..Config::posix()
        };
        assert_eq!(
            tokens(&config, &sample_args()),
            vec![
                "-b",
                "--bool-false=false",
                "-i",
                "1",
                "-f",
                "--string-value-provided=baz qux",
                "--string-optional=foo",
                "--string-optional=bar",
                "foo bar",
            ]
        );
    }

    #[test]
    fn test_short_option_delimiter() {
        let config = Config {
            short_option_delimiter: "/".to_string(),
            ..Config::posix()
        };
        let out = tokens(&config, &sample_args());
        assert_eq!(out[0], "/bf");
        assert_eq!(out[2], "/i");
        assert_eq!(out[1], "--bool-false=false");
    }

    #[test]
    fn test_long_option_delimiter() {
        let config = Config {
            long_option_delimiter: "/".to_string(),
            ..Config::posix()
        };
        let out = tokens(&config, &sample_args());
        assert_eq!(out[0], "-bf");
        assert_eq!(out[1], "/bool-false=false");
        assert_eq!(out[5], "/string-optional=foo");
    }

    #[test]
    fn test_optional_argument_delimiter_colon() {
        let config = Config {
            option_optional_argument_delimiter: ":".to_string(),
            ..Config::posix()
        };
        assert_eq!(
            tokens(&config, &sample_args()),
            vec![
                "-bf",
                "--bool-false:false",
                "-i",
                "1",
                "--string-value-provided:baz qux",
                "--string-optional:foo",
                "--string-optional:bar",
                "foo bar",
            ]
        );
    }

    #[test]
    fn test_optional_argument_delimiter_space() {
        let config = Config {
            option_optional_argument_delimiter: " ".to_string(),
            ..Config::posix()
        };
        assert_eq!(
            tokens(&config, &sample_args()),
            vec![
                "-bf",
                "--bool-false",
                "false",
                "-i",
                "1",
                "--string-value-provided",
                "baz qux",
                "--string-optional",
                "foo",
                "--string-optional",
                "bar",
                "foo bar",
            ]
        );
        assert_eq!(
            config.command_line(&sample_args()).unwrap(),
            r#"-bf --bool-false false -i 1 --string-value-provided "baz qux" --string-optional foo --string-optional bar "foo bar""#
        );
    }

    #[test]
    fn test_custom_quoter_only_touches_values() {
        let config = Config {
            argument_quoter: Some(Quoter::new(|s| format!("\"{}\"", s))),
            ..Config::posix()
        };
        assert_eq!(
            config.command_line(&sample_args()).unwrap(),
            r#"-bf --bool-false="false" -i "1" --string-value-provided="baz qux" --string-optional="foo" --string-optional="bar" "foo bar""#
        );
        // Token mode never quotes.
        assert_eq!(tokens(&config, &sample_args())[1], "--bool-false=false");
    }

    #[test]
    fn test_windows_defaults() {
        let config = Config::windows();
        assert_eq!(
            tokens(&config, &sample_args()),
            vec![
                "/b",
                "/bool-false:false",
                "/i",
                "1",
                "/f",
                "/string-value-provided:baz qux",
                "/string-optional:foo",
                "/string-optional:bar",
                "foo bar",
            ]
        );
        assert_eq!(
            config.command_line(&sample_args()).unwrap(),
            r#"/b /bool-false:false /i 1 /f /string-value-provided:"baz qux" /string-optional:foo /string-optional:bar "foo bar""#
        );
    }

    #[test]
    fn test_empty_delimiters_use_platform_defaults() {
        let config = Config::bare(Platform::Windows);
        assert_eq!(tokens(&config, &sample_args())[0], "/bf");
        assert_eq!(tokens(&config, &sample_args())[1], "/bool-false:false");
    }

    #[test]
    fn test_combines_three_booleans() {
        let args = vec![
            ArgState::switch("alpha", "a"),
            ArgState::option("name", "n", ["x"]),
            ArgState::switch("beta", "b"),
            ArgState::switch("gamma", "c"),
        ];
        let out = tokens(&Config::posix(), &args);
        assert_eq!(out, vec!["-abc", "-n", "x"]);
        assert!(!out.iter().any(|t| t == "-a" || t == "-b" || t == "-c"));
    }

    #[test]
    fn test_bool_list_repeats_short_name() {
        let verbose = ArgState {
            value: vec!["true".to_string(); 3],
            ..ArgState::switch("verbose", "v")
        };
        assert_eq!(tokens(&Config::posix(), &[verbose.clone()]), vec!["-vvv"]);

        let config = Config {
            disable_combining_short_options: true,
            ..Config::posix()
        };
        assert_eq!(tokens(&config, &[verbose]), vec!["-v", "-v", "-v"]);
    }

    #[test]
    fn test_bare_flag_written_once_when_combining() {
        let verbose = ArgState {
            value: vec!["true".to_string(); 2],
            ..ArgState::switch("verbose", "")
        };
        assert_eq!(tokens(&Config::posix(), &[verbose]), vec!["--verbose"]);
    }

    #[test]
    fn test_optional_value_elided() {
        let args = vec![ArgState {
            value: vec!["implicit".to_string()],
            ..ArgState::switch("color", "")
        }];
        assert_eq!(tokens(&Config::posix(), &args), vec!["--color"]);
    }

    #[test]
    fn test_explicit_optional_value_forces_long_form() {
        let args = vec![ArgState::optional("color", "c", ["always"])];
        assert_eq!(tokens(&Config::posix(), &args), vec!["--color=always"]);
    }

    #[test]
    fn test_multi_valued_option_repeats_name() {
        let args = vec![ArgState::option("string", "s", ["foo", "bar"])];
        assert_eq!(tokens(&Config::posix(), &args), vec!["-s", "foo", "-s", "bar"]);
        assert_eq!(
            Config::posix().command_line(&args).unwrap(),
            "-s foo -s bar"
        );
    }

    #[test]
    fn test_positionals_trail_options() {
        let args = vec![
            ArgState::positional(["foo", "bar"]),
            ArgState::switch("verbose", "v"),
        ];
        assert_eq!(tokens(&Config::posix(), &args), vec!["-v", "foo", "bar"]);
    }

    #[test]
    fn test_missing_long_name_with_short_names_disabled() {
        let config = Config {
            disable_short_name: true,
            ..Config::posix()
        };
        let args = vec![ArgState::switch("", "b")];
        let err = config.args(&args).unwrap_err();
        assert!(err.to_string().contains("option does not have long name"));
        assert!(matches!(err, BuildError::Field(ref f) if f.path == "b"));
        assert!(config.command_line(&args).is_err());
    }

    #[test]
    fn test_missing_long_name_for_explicit_optional_value() {
        let args = vec![ArgState::optional("", "q", ["x"]).with_field("Options.Query", "string")];
        let err = Config::posix().args(&args).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to convert field Options.Query of type string: option does not have long name"
        );
    }

    #[test]
    fn test_argument_delimiter_in_command_line() {
        let config = Config {
            option_argument_delimiter: "=".to_string(),
            ..Config::posix()
        };
        let args = vec![ArgState::option("name", "", ["Sergey Makinen"])];
        assert_eq!(
            config.command_line(&args).unwrap(),
            r#"--name="Sergey Makinen""#
        );
        assert_eq!(tokens(&config, &args), vec!["--name", "Sergey Makinen"]);
    }

    #[test]
    fn test_terminator_written_only_when_needed() {
        let config = Config {
            options_terminator: "--".to_string(),
            ..Config::posix()
        };
        let args = vec![
            ArgState::switch("verbose", "v"),
            ArgState::positional(["-x", "y"]),
        ];
        assert_eq!(tokens(&config, &args), vec!["-v", "--", "-x", "y"]);

        let args = vec![
            ArgState::switch("verbose", "v"),
            ArgState::positional(["x", "y"]),
        ];
        assert_eq!(tokens(&config, &args), vec!["-v", "x", "y"]);
    }

    #[test]
    fn test_build_is_repeatable() {
        let config = Config::posix();
        let first = tokens(&config, &sample_args());
        let second = tokens(&config, &sample_args());
        assert_eq!(first, second);
    }

    #[test]
    fn test_dyn_args() {
        let args: Vec<Box<dyn Arg>> = vec![
            Box::new(ArgState::switch("verbose", "v")),
            Box::new(ArgState::positional(["in.txt"])),
        ];
        assert_eq!(Config::posix().args(&args).unwrap(), vec!["-v", "in.txt"]);
    }
}
