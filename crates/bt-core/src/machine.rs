//! Status state machine.
//!
//! Pure over `(current user, action, now)`: validates the action against the
//! user's status and produces the next snapshot plus the event to append.
//! It never reads or writes storage; break-cap approval for `start_break`
//! is layered on by the caller (see [`crate::policy`]).

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::event::TimeLogEvent;
use crate::status::{Action, Status};
use crate::user::UserSnapshot;

/// Why an action was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The action is not allowed from the user's current status.
    #[error("cannot {action} while {status}")]
    InvalidTransition { status: Status, action: Action },

    /// The daily break cap has been reached.
    #[error("daily break cap reached: {used}s used of {cap}s")]
    BreakCapExceeded { used: i64, cap: i64 },

    /// The action is stamped before the user's latest logged event.
    #[error("{at} is earlier than the last logged event at {last}")]
    OutOfOrder {
        at: DateTime<Utc>,
        last: DateTime<Utc>,
    },
}

/// An accepted action: the proposed next snapshot and its log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: UserSnapshot,
    pub event: TimeLogEvent,
}

/// Applies `action` to `user` at `now`.
pub fn apply_action(
    user: &UserSnapshot,
    action: Action,
    now: DateTime<Utc>,
) -> Result<Transition, ActionError> {
    let (status, break_start_time) = match (user.status, action) {
        (Status::Offline, Action::StartWork) | (Status::OnBreak, Action::EndBreak) => {
            (Status::Working, None)
        }
        (Status::Working, Action::StartBreak) => (Status::OnBreak, Some(now)),
        (Status::Working, Action::EndWork) => (Status::Offline, None),
        (status, action) => return Err(ActionError::InvalidTransition { status, action }),
    };

    let next = UserSnapshot {
        status,
        break_start_time,
        ..user.clone()
    };
    let event = TimeLogEvent::new(user.id.clone(), action, now);
    Ok(Transition { next, event })
}
