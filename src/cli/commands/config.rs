//! `mentorhub config`

use crate::args::ConfigSubcommand;
use anyhow::{anyhow, Context};
use mentorhub::config::Config;
use std::io::{self, Write};

/// Keys whose change moves the API base
const ENDPOINT_KEYS: [&str; 4] = ["api_base", "profile", "origin", "base_path"];

/// Dispatch config subcommands
///
/// # Errors
/// Returns an error for unknown keys, bad values or a config file that cannot be written
pub fn run(
    subcommand: Option<ConfigSubcommand>,
    config: &mut Config,
    defaults: &Config,
) -> anyhow::Result<()> {
    match subcommand.unwrap_or(ConfigSubcommand::Get { key: None }) {
        ConfigSubcommand::Get { key: Some(key) } => {
            let value = config
                .get(&key)
                .ok_or_else(|| anyhow!("Unknown config key: '{key}'"))?;
            println!("{value}");
        }
        ConfigSubcommand::Get { key: None } => show(config),
        ConfigSubcommand::Set { key, value } => {
            config.set(&key, &value).map_err(|e| anyhow!(e))?;
            persist(config)?;
            if ENDPOINT_KEYS.contains(&key.as_str()) {
                println!("✓ {key} = {value} (API base is now {})", config.api_base());
            } else {
                println!("✓ {key} = {value}");
            }
        }
        ConfigSubcommand::Unset { key } => {
            config.unset(&key, defaults).map_err(|e| anyhow!(e))?;
            persist(config)?;
            println!("✓ {key} restored to default");
        }
        ConfigSubcommand::Reset => reset()?,
    }
    Ok(())
}

fn show(config: &Config) {
    println!("\n=== Configuration ===\n");
    print!("{config}");
    println!("\n[files]");
    println!("  config  = {}", Config::get_config_file_path().display());
    println!("  token   = {}", Config::get_token_file_path().display());
    println!("  storage = {}", Config::get_storage_file_path().display());
}

fn persist(config: &Config) -> anyhow::Result<()> {
    config
        .save()
        .map_err(|e| anyhow!("failed to save {}: {e}", Config::get_config_file_path().display()))
}

fn reset() -> anyhow::Result<()> {
    if !Config::get_config_file_path().exists() {
        println!("✓ Nothing to reset");
        return Ok(());
    }
    if !confirm("Reset config to defaults? Your stored token is kept.")? {
        println!("✗ Reset cancelled");
        return Ok(());
    }
    Config::reset().context("failed to remove config file")?;
    println!("✓ Config reset to defaults");
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} (y/n): ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
