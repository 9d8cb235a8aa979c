//! Command-line interface entry point for `mentorhub`

mod args;
mod commands;

use args::{Cli, Command};
use clap::Parser;
use mentorhub::config::Config;
use mentorhub::core::{AppState, HttpTransport};
use mentorhub::logger::{enable_debug, enable_verbose, init_file_logging, set_level, Level};
use mentorhub::{debug, info};

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // Load configuration once at startup and apply CLI overrides to it
    let mut config = Config::load();
    let defaults = Config::from_defaults();
    config.apply_overrides(&args.to_config_overrides());

    // CLI flag overrides config; otherwise use config logging.level; fallback warn
    let effective_level = args
        .log_level
        .map(std::convert::Into::into)
        .or_else(|| config.logging.level.parse::<Level>().ok())
        .unwrap_or(Level::Warn);

    let mut level = effective_level;
    if args.debug_flag || level == Level::Debug {
        level = Level::Debug;
        enable_debug();
    }

    let verbose = args.verbose || config.logging.verbose;
    if verbose {
        enable_verbose();
    }
    set_level(level);

    let config_log_path: Option<std::path::PathBuf> = if config.logging.file.is_empty() {
        None
    } else {
        Some(std::path::PathBuf::from(&config.logging.file))
    };

    if let Some(log_path) = args.log_file.as_ref().or(config_log_path.as_ref()) {
        let display_path = log_path.to_string_lossy();
        if init_file_logging(log_path) {
            info!("File logging initialized at: {display_path}");
        } else {
            eprintln!("✗ Failed to initialize file logging at: {display_path}");
        }
    }

    if let Command::Config { subcommand } = args.command {
        if let Err(e) = commands::config::run(subcommand, &mut config, &defaults) {
            eprintln!("✗ {e:#}");
            std::process::exit(1);
        }
        return;
    }

    let api_base = config.api_base();
    debug!("API base: {api_base}");
    let transport = match HttpTransport::new(&api_base) {
        Ok(transport) => transport,
        Err(e) => {
            eprintln!("✗ {e}");
            std::process::exit(1);
        }
    };
    let app = AppState::from_config(&config, transport);

    let result = match args.command {
        Command::Config { .. } => Ok(()),
        Command::Auth { subcommand } => commands::account::auth(&app, subcommand).await,
        Command::Me => commands::account::me(&app).await,
        Command::Plan { group, subcommand } => commands::plan::run(&app, group, subcommand).await,
        Command::Submission { group, subcommand } => {
            commands::plan::submission(&app, group, subcommand).await
        }
        Command::Activity { group, subcommand } => {
            commands::activity::run(&app, group, subcommand).await
        }
        Command::Group { group, subcommand } => commands::group::run(&app, group, subcommand).await,
        Command::Announcement { subcommand } => {
            commands::account::announcement(&app, subcommand).await
        }
        Command::Approval { subcommand } => commands::account::approval(&app, subcommand).await,
        Command::Theme { action } => {
            commands::account::theme(&app, action);
            Ok(())
        }
    };

    if let Err(e) = result {
        let alerts = app.take_alerts();
        if alerts.is_empty() {
            eprintln!("✗ {e:#}");
        } else {
            for alert in alerts {
                eprintln!("✗ {alert}");
            }
        }
        std::process::exit(1);
    }
}
