//! Command-line argument definitions.

use std::path::PathBuf;

use bt_core::{Action, Role};
use clap::{Parser, Subcommand, ValueEnum};

/// Work and break tracker.
///
/// Records when people start and stop working and taking breaks, and keeps
/// daily break time under a configured cap.
#[derive(Debug, Parser)]
#[command(name = "bt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Register and list users.
    #[command(subcommand)]
    Users(UsersAction),

    /// Apply a status action for a user.
    Act {
        /// User ID.
        user: String,

        /// The action to apply.
        #[arg(value_enum)]
        action: ActionArg,

        /// When the action happened: ISO 8601 or relative ("10 minutes ago").
        #[arg(long)]
        at: Option<String>,
    },

    /// Show status counts and today's break time for everyone.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show a user's activity log for today.
    Log {
        /// User ID.
        user: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// User management subcommands.
#[derive(Debug, Subcommand)]
pub enum UsersAction {
    /// Register a new user (starts offline).
    Add {
        /// Display name.
        name: String,

        /// Dashboard role.
        #[arg(long, value_enum, default_value_t = RoleArg::Employee)]
        role: RoleArg,

        /// Explicit user ID (default: generated UUID).
        #[arg(long)]
        id: Option<String>,
    },

    /// List registered users.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Actions as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    StartWork,
    StartBreak,
    EndBreak,
    EndWork,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::StartWork => Self::StartWork,
            ActionArg::StartBreak => Self::StartBreak,
            ActionArg::EndBreak => Self::EndBreak,
            ActionArg::EndWork => Self::EndWork,
        }
    }
}

/// Roles as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Employee,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Employee => Self::Employee,
            RoleArg::Admin => Self::Admin,
        }
    }
}
