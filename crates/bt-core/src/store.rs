//! Storage seams consumed by the tracker.
//!
//! The core never touches storage directly; these traits let the tracker
//! work with `bt-db`'s `Database` or with test fixtures.

use thiserror::Error;

use crate::event::TimeLogEvent;
use crate::types::UserId;
use crate::user::{UserPatch, UserSnapshot};
use crate::window::DayWindow;

/// Errors surfaced by a store. Propagated as-is; the core never retries.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The user row changed between read and write.
    #[error("user {user_id} was modified concurrently")]
    Conflict { user_id: UserId },

    /// The user does not exist in the store.
    #[error("user {user_id} not found in store")]
    MissingUser { user_id: UserId },

    /// Any other backend failure.
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StorageError {
    /// Wraps a backend-specific error.
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }
}

/// Append-only log of action events.
pub trait EventLogStore {
    /// Returns a user's events inside `window`, ordered by timestamp ascending.
    fn fetch_events(
        &self,
        user_id: &UserId,
        window: &DayWindow,
    ) -> Result<Vec<TimeLogEvent>, StorageError>;

    /// The user's most recent event, by timestamp then insertion order.
    fn last_event(&self, user_id: &UserId) -> Result<Option<TimeLogEvent>, StorageError>;

    /// Appends one event. Existing events are never modified.
    fn append_event(&mut self, event: &TimeLogEvent) -> Result<(), StorageError>;
}

/// Persisted user rows.
pub trait UserStore {
    fn get_user(&self, id: &UserId) -> Result<Option<UserSnapshot>, StorageError>;

    /// Applies `patch` only if the row still matches its expected values,
    /// failing with [`StorageError::Conflict`] otherwise.
    fn update_user(&mut self, id: &UserId, patch: &UserPatch) -> Result<(), StorageError>;

    fn list_users(&self) -> Result<Vec<UserSnapshot>, StorageError>;
}

/// A store holding both users and their event log.
pub trait Store: UserStore + EventLogStore {
    /// Persists an accepted transition.
    ///
    /// The default updates the user first so a lost compare-and-swap never
    /// leaves an orphan event. Backends with transactions should override
    /// this to make both writes atomic.
    fn commit_transition(
        &mut self,
        patch: &UserPatch,
        event: &TimeLogEvent,
    ) -> Result<(), StorageError> {
        self.update_user(&event.user_id, patch)?;
        self.append_event(event)
    }
}
