//! CLI subcommand implementations.

pub mod act;
pub mod log;
pub mod status;
pub mod users;
pub mod util;
