//! Work status and action enums as the single source of truth for their strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// A user's current work status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Offline,
    Working,
    OnBreak,
}

impl Status {
    pub const ALL: [Self; 3] = [Self::Offline, Self::Working, Self::OnBreak];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Working => "working",
            Self::OnBreak => "on_break",
        }
    }

    /// Actions the state machine accepts from this status.
    #[must_use]
    pub const fn allowed_actions(self) -> &'static [Action] {
        match self {
            Self::Offline => &[Action::StartWork],
            Self::Working => &[Action::StartBreak, Action::EndWork],
            Self::OnBreak => &[Action::EndBreak],
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offline" => Ok(Self::Offline),
            "working" => Ok(Self::Working),
            "on_break" => Ok(Self::OnBreak),
            _ => Err(ValidationError::UnknownStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// A user-initiated status change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    StartWork,
    StartBreak,
    EndBreak,
    EndWork,
}

impl Action {
    pub const ALL: [Self; 4] = [
        Self::StartWork,
        Self::StartBreak,
        Self::EndBreak,
        Self::EndWork,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StartWork => "start_work",
            Self::StartBreak => "start_break",
            Self::EndBreak => "end_break",
            Self::EndWork => "end_work",
        }
    }

    /// The status a user ends up in after this action is accepted.
    #[must_use]
    pub const fn target_status(self) -> Status {
        match self {
            Self::StartWork | Self::EndBreak => Status::Working,
            Self::StartBreak => Status::OnBreak,
            Self::EndWork => Status::Offline,
        }
    }

    /// The only status this action may be issued from.
    #[must_use]
    pub const fn required_status(self) -> Status {
        match self {
            Self::StartWork => Status::Offline,
            Self::StartBreak | Self::EndWork => Status::Working,
            Self::EndBreak => Status::OnBreak,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start_work" => Ok(Self::StartWork),
            "start_break" => Ok(Self::StartBreak),
            "end_break" => Ok(Self::EndBreak),
            "end_work" => Ok(Self::EndWork),
            _ => Err(ValidationError::UnknownAction {
                value: s.to_string(),
            }),
        }
    }
}
