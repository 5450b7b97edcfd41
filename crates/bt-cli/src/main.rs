use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use bt_core::Tracker;
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bt_cli::commands::{act, log, status, users, util};
use bt_cli::{Cli, Commands, Config, UsersAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(bt_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = bt_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

/// Open the database and wrap it in a tracker configured from `config`.
fn open_tracker(config_path: Option<&Path>) -> Result<(Tracker<bt_db::Database>, Config)> {
    let (db, config) = open_database(config_path)?;
    let tracker = Tracker::new(db, config.policy()?, config.offset()?);
    Ok((tracker, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so stdout stays parseable with --json.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Some(Commands::Users(action)) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            match action {
                UsersAction::Add { name, role, id } => {
                    users::add(&mut out, &mut db, name, (*role).into(), id.as_deref())?;
                }
                UsersAction::List { json } => users::list(&mut out, &db, *json)?,
            }
        }
        Some(Commands::Act { user, action, at }) => {
            let (mut tracker, config) = open_tracker(cli.config.as_deref())?;
            let at = util::resolve_at(at.as_deref(), Utc::now())?;
            act::run(
                &mut out,
                &mut tracker,
                user,
                (*action).into(),
                at,
                config.offset()?,
            )?;
        }
        Some(Commands::Status { json }) => {
            let (tracker, _config) = open_tracker(cli.config.as_deref())?;
            status::run(&mut out, &tracker, Utc::now(), *json)?;
        }
        Some(Commands::Log { user, json }) => {
            let (tracker, config) = open_tracker(cli.config.as_deref())?;
            log::run(
                &mut out,
                &tracker,
                user,
                Utc::now(),
                config.offset()?,
                *json,
            )?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            writeln!(out)?;
        }
    }

    Ok(())
}
