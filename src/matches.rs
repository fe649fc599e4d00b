//! Reconstructs arguments from clap's parse results.

use crate::arg::ArgState;
use clap::parser::ValueSource;
use clap::{ArgAction, ArgMatches, Command};
use log::{debug, warn};

/// Converts the matches of `cmd` into one [`ArgState`] per user-facing
/// argument, options first and positionals in index order.
///
/// Help and version actions are skipped, as are subcommands. Options whose
/// value may be omitted (`num_args(0..=1)` and friends) are written with
/// their value attached whenever clap recorded one, since the matches do not
/// say whether it came from `default_missing_value`.
pub fn from_matches(cmd: &Command, matches: &ArgMatches) -> Vec<ArgState> {
    let mut cmd = cmd.clone();
    cmd.build();

    if let Some((name, _)) = matches.subcommand() {
        warn!("arguments of subcommand '{}' are not reconstructed", name);
    }

    let mut options = Vec::new();
    let mut positionals = Vec::new();
    for arg in cmd.get_arguments() {
        if arg.is_positional() {
            positionals.push(arg);
        } else if let Some(state) = option_state(arg, matches) {
            options.push(state);
        }
    }

    positionals.sort_by_key(|arg| arg.get_index());
    let positionals = positionals
        .into_iter()
        .filter(|arg| supplied(arg, matches))
        .map(|arg| {
            ArgState::positional(raw_values(arg, matches))
                .with_field(arg.get_id().as_str(), "positional")
        });

    let states: Vec<ArgState> = options.into_iter().chain(positionals).collect();
    debug!(
        "reconstructed {} argument(s) from matches of '{}'",
        states.len(),
        cmd.get_name()
    );
    states
}

fn option_state(arg: &clap::Arg, matches: &ArgMatches) -> Option<ArgState> {
    let id = arg.get_id().as_str();
    let name = arg.get_long().unwrap_or_default();
    let short = arg.get_short().map(String::from).unwrap_or_default();

    let mut state = match arg.get_action() {
        ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong | ArgAction::Version => {
            return None;
        }
        ArgAction::SetTrue | ArgAction::SetFalse => {
            // an environment variable can supply the unset state as well
            let set = matches!(arg.get_action(), ArgAction::SetTrue);
            let flag = matches.try_get_one::<bool>(id).ok().flatten().copied();
            let mut state = ArgState::switch(name, &short);
            state.is_provided = supplied(arg, matches) && flag == Some(set);
            state
        }
        ArgAction::Count => {
            let count = matches
                .try_get_one::<u8>(id)
                .ok()
                .flatten()
                .copied()
                .unwrap_or_default();
            let mut state = ArgState::switch(name, &short);
            state.value = vec!["true".to_string(); usize::from(count)];
            state.is_provided = count > 0 && supplied(arg, matches);
            state
        }
        ArgAction::Set | ArgAction::Append => {
            let values = raw_values(arg, matches);
            let takes_no_value = arg
                .get_num_args()
                .map_or(false, |range| range.min_values() == 0);
            let defaults: Vec<String> = arg
                .get_default_values()
                .iter()
                .map(|v| v.to_string_lossy().into_owned())
                .collect();

            let mut state = ArgState::option(name, &short, values);
            let bare = takes_no_value && state.value.is_empty();
            state.is_provided = supplied(arg, matches) && (bare || state.value != defaults);
            state.is_value_optional = takes_no_value;
            state.is_value_provided =
                state.is_provided && (!takes_no_value || !state.value.is_empty());
            if state.is_provided && !state.is_value_provided {
                // the bare form is written once per entry
                state.value = vec!["true".to_string()];
            }
            state
        }
        other => {
            warn!("skipping argument '{}' with unsupported action {:?}", id, other);
            return None;
        }
    };

    if !state.is_provided {
        state.is_value_provided = false;
    }
    Some(state.with_field(id, "clap"))
}

/// Whether the user supplied the argument, on the command line or through
/// its environment variable.
fn supplied(arg: &clap::Arg, matches: &ArgMatches) -> bool {
    matches!(
        matches.value_source(arg.get_id().as_str()),
        Some(source) if source != ValueSource::DefaultValue
    )
}

fn raw_values(arg: &clap::Arg, matches: &ArgMatches) -> Vec<String> {
    matches
        .try_get_raw(arg.get_id().as_str())
        .ok()
        .flatten()
        .map(|values| {
            values
                .map(|v| v.to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}
