//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use bt_core::BreakPolicy;
use bt_core::policy::DEFAULT_BREAK_CAP_SECS;
use bt_core::window::{DEFAULT_UTC_OFFSET_MINUTES, fixed_offset};
use chrono::FixedOffset;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Daily break allowance in seconds.
    pub break_cap_secs: i64,

    /// Offset of the local day from UTC, in minutes east.
    pub utc_offset_minutes: i32,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("break_cap_secs", &self.break_cap_secs)
            .field("utc_offset_minutes", &self.utc_offset_minutes)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("bt.db"),
            break_cap_secs: DEFAULT_BREAK_CAP_SECS,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // BT_DATABASE_PATH, BT_BREAK_CAP_SECS, BT_UTC_OFFSET_MINUTES
        figment = figment.merge(Env::prefixed("BT_"));

        figment.extract()
    }

    /// The break policy described by this config.
    pub fn policy(&self) -> Result<BreakPolicy> {
        if self.break_cap_secs < 0 {
            return Err(anyhow!(
                "break_cap_secs must not be negative, got {}",
                self.break_cap_secs
            ));
        }
        Ok(BreakPolicy::new(self.break_cap_secs))
    }

    /// The fixed offset local days are measured in.
    pub fn offset(&self) -> Result<FixedOffset> {
        fixed_offset(self.utc_offset_minutes).ok_or_else(|| {
            anyhow!(
                "utc_offset_minutes must be within a day, got {}",
                self.utc_offset_minutes
            )
        })
    }
}

/// Returns the platform-specific config directory for bt.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("bt"))
}

/// Returns the platform-specific data directory for bt.
///
/// On Linux: `~/.local/share/bt`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("bt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_bt() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "bt");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("bt.db"));
        assert_eq!(config.policy().unwrap().cap_seconds, 3_600);
        assert_eq!(config.offset().unwrap().local_minus_utc(), 5 * 3_600);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "break_cap_secs = 1800\nutc_offset_minutes = -300\ndatabase_path = \"/tmp/x.db\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.break_cap_secs, 1_800);
        assert_eq!(config.offset().unwrap().local_minus_utc(), -5 * 3_600);
        assert_eq!(config.database_path, PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let config = Config {
            utc_offset_minutes: 24 * 60,
            break_cap_secs: -1,
            ..Config::default()
        };
        assert!(config.offset().is_err());
        assert!(config.policy().is_err());
    }
}
