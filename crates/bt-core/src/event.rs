//! Immutable time log events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::Action;
use crate::types::UserId;

/// A record of one accepted action.
///
/// Events are append-only: once written they are never modified or deleted.
/// Logs are ordered by `timestamp` ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLogEvent {
    pub user_id: UserId,
    pub action: Action,
    pub timestamp: DateTime<Utc>,
}

impl TimeLogEvent {
    pub const fn new(user_id: UserId, action: Action, timestamp: DateTime<Utc>) -> Self {
        Self {
            user_id,
            action,
            timestamp,
        }
    }
}
