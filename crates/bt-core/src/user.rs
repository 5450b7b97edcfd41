//! User snapshots as read from the user store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::status::Status;
use crate::types::{Role, UserId};

/// A snapshot whose break start does not agree with its status.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("user {user_id} is {status} but break_start_time is {}", presence(.has_break_start))]
pub struct InconsistentSnapshot {
    pub user_id: UserId,
    pub status: Status,
    pub has_break_start: bool,
}

const fn presence(set: &bool) -> &'static str {
    if *set { "set" } else { "missing" }
}

/// An immutable read of a user's persisted fields.
///
/// `break_start_time` is set if and only if `status` is [`Status::OnBreak`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_start_time: Option<DateTime<Utc>>,
}

impl UserSnapshot {
    /// A freshly registered user, offline.
    pub fn new(id: UserId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            status: Status::Offline,
            break_start_time: None,
        }
    }

    /// Checks the status / break start invariant.
    pub fn check_consistency(&self) -> Result<(), InconsistentSnapshot> {
        let on_break = self.status == Status::OnBreak;
        if on_break == self.break_start_time.is_some() {
            Ok(())
        } else {
            Err(InconsistentSnapshot {
                user_id: self.id.clone(),
                status: self.status,
                has_break_start: self.break_start_time.is_some(),
            })
        }
    }
}

/// The fields a transition changes, with the values it expects to replace.
///
/// Stores apply the patch only if the row still holds `expected_status`
/// and `expected_break_start`, which gives compare-and-swap semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPatch {
    pub expected_status: Status,
    pub expected_break_start: Option<DateTime<Utc>>,
    pub status: Status,
    pub break_start_time: Option<DateTime<Utc>>,
}

impl UserPatch {
    /// Builds the patch that moves `current` to `next`.
    pub const fn between(current: &UserSnapshot, next: &UserSnapshot) -> Self {
        Self {
            expected_status: current.status,
            expected_break_start: current.break_start_time,
            status: next.status,
            break_start_time: next.break_start_time,
        }
    }
}
