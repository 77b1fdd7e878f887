//! The `iris config` command for configuration management.
//!
//! `set-mode` and `set-key` edit the file in place with `toml_edit`, so
//! comments and unrelated settings survive.

use std::path::Path;

use clap::{Args, Subcommand};
use iris_core::{Config, Mode};

use super::types::{KeyProvider, ModeArg};

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration (literal API keys masked)
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Set the active analysis backend
    SetMode {
        #[arg(value_enum)]
        mode: ModeArg,
    },

    /// Store an API key for a provider
    SetKey {
        #[arg(value_enum)]
        provider: KeyProvider,

        /// The key, or a `${ENV_VAR}` reference
        key: String,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    let path = Config::default_path();

    match args.command {
        ConfigCommand::Show => {
            let mut config = Config::load()?;
            config.openai.api_key = mask_key(&config.openai.api_key);
            config.google.api_key = mask_key(&config.google.api_key);
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", path.display());
        }

        ConfigCommand::Init { force } => {
            init_config(&path, force)?;
            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }

        ConfigCommand::SetMode { mode } => {
            let mode = Mode::from(mode);
            set_mode(&path, mode)?;
            println!("Mode set to {mode} in {}", path.display());
        }

        ConfigCommand::SetKey { provider, key } => {
            set_key(&path, provider, &key)?;
            println!(
                "{} API key saved to {}",
                provider.section(),
                path.display()
            );
        }
    }

    Ok(())
}

/// Write a default config file at `path`.
fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }
    Config::default().save_to(path)?;
    Ok(())
}

fn set_mode(path: &Path, mode: Mode) -> anyhow::Result<()> {
    edit_config(path, |doc| {
        doc.insert("mode", toml_edit::value(mode.as_str()));
        Ok(())
    })
}

fn set_key(path: &Path, provider: KeyProvider, key: &str) -> anyhow::Result<()> {
    let section = provider.section();
    edit_config(path, |doc| {
        let table = doc
            .entry(section)
            .or_insert(toml_edit::Item::Table(toml_edit::Table::new()))
            .as_table_like_mut()
            .ok_or_else(|| anyhow::anyhow!("`{section}` in the config file is not a table"))?;
        table.insert("api_key", toml_edit::value(key));
        Ok(())
    })
}

/// Apply `edit` to the config document at `path`, creating the file if
/// needed. Nothing is written unless the edited document is a valid config.
fn edit_config(
    path: &Path,
    edit: impl FnOnce(&mut toml_edit::DocumentMut) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let content = if path.exists() {
        std::fs::read_to_string(path)?
    } else {
        String::new()
    };
    let mut doc: toml_edit::DocumentMut = content.parse()?;
    edit(&mut doc)?;

    let edited = doc.to_string();
    Config::from_toml_str(&edited)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, edited)?;
    Ok(())
}

/// Hide literal keys; `${ENV_VAR}` references are shown as-is.
fn mask_key(key: &str) -> String {
    if key.is_empty() || key.starts_with("${") {
        key.to_string()
    } else {
        let visible: String = key.chars().take(4).collect();
        format!("{visible}****")
    }
}
