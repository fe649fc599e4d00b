//! unclap - render a manifest of options as command-line arguments.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::debug;
use std::fs;
use unclap::{Config, ConfigOverrides, Manifest, Platform};

/// Turn parsed options back into command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "unclap", version, about, disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the manifest as a single quoted command line
    Line {
        #[command(flatten)]
        render: RenderArgs,
    },

    /// Print the manifest as a JSON array of argv tokens
    Tokens {
        #[command(flatten)]
        render: RenderArgs,
    },
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// JSON manifest of options, or @path to read it from a file
    #[arg(long)]
    manifest: String,

    /// Target platform (defaults to the current one)
    #[arg(long, value_enum)]
    platform: Option<Platform>,

    /// JSON configuration overrides
    #[arg(long)]
    config: Option<String>,

    /// Always write options by their long name
    #[arg(long)]
    disable_short_names: bool,

    /// Never merge short boolean options into one token
    #[arg(long)]
    no_combine: bool,
}

impl RenderArgs {
    /// Platform defaults, then JSON overrides, then flags.
    fn resolve_config(&self) -> Result<Config> {
        let mut overrides = match self.config {
            Some(ref json) => {
                let overrides =
                    ConfigOverrides::from_json(json).context("failed to parse config JSON")?;
                overrides.validate().context("invalid config")?;
                overrides
            }
            None => ConfigOverrides::default(),
        };
        if self.platform.is_some() {
            overrides.platform = self.platform;
        }

        let mut config = Config::default().with_overrides(&overrides);
        if self.disable_short_names {
            config.disable_short_name = true;
        }
        if self.no_combine {
            config.disable_combining_short_options = true;
        }
        debug!("resolved config: {:?}", config);
        Ok(config)
    }
}

/// Returns the manifest text, reading it from disk for the `@path` form.
fn load_manifest(manifest: &str) -> Result<String> {
    match manifest.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest file {}", path)),
        None => Ok(manifest.to_string()),
    }
}

fn load_options(render: &RenderArgs) -> Result<(Config, unclap::OptionSet)> {
    let config = render.resolve_config()?;
    let text = load_manifest(&render.manifest)?;
    let manifest = Manifest::from_json(&text).context("failed to parse manifest JSON")?;
    let options = manifest.to_option_set().context("invalid manifest")?;
    Ok((config, options))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Line { render } => {
            let (config, options) = load_options(&render)?;
            let line = options
                .command_line(&config)
                .context("failed to build command line")?;
            println!("{}", line);
        }
        Commands::Tokens { render } => {
            let (config, options) = load_options(&render)?;
            let tokens = options.args(&config).context("failed to build arguments")?;
            let json = serde_json::to_string(&tokens).context("failed to encode tokens")?;
            println!("{}", json);
        }
    }

    Ok(())
}
