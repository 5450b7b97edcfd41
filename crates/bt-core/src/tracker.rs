//! Orchestration of the pure core against a store.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::aggregate::{DayTotals, aggregate_day_from};
use crate::event::TimeLogEvent;
use crate::machine::{ActionError, Transition, apply_action};
use crate::policy::BreakPolicy;
use crate::stats::{StatsCounts, reduce_stats};
use crate::status::Action;
use crate::store::{StorageError, Store};
use crate::types::UserId;
use crate::user::{UserPatch, UserSnapshot};
use crate::window::DayWindow;

/// Errors from tracker operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("unknown user: {0}")]
    UnknownUser(UserId),
}

/// A user's day so far: the log and what it adds up to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub user: UserSnapshot,
    pub window_start: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub events: Vec<TimeLogEvent>,
    pub totals: DayTotals,
    pub break_cap_seconds: i64,
    pub break_remaining_seconds: i64,
    pub break_cap_exceeded: bool,
}

/// Applies actions and reads daily totals through a [`Store`].
#[derive(Debug)]
pub struct Tracker<S> {
    store: S,
    policy: BreakPolicy,
    offset: FixedOffset,
}

impl<S: Store> Tracker<S> {
    pub const fn new(store: S, policy: BreakPolicy, offset: FixedOffset) -> Self {
        Self {
            store,
            policy,
            offset,
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Validates and persists `action` for a user.
    ///
    /// `now` must not be earlier than the user's last logged event, and
    /// `start_break` is additionally checked against today's accumulated
    /// break time. Nothing is written when the action is rejected.
    pub fn perform(
        &mut self,
        user_id: &UserId,
        action: Action,
        now: DateTime<Utc>,
    ) -> Result<Transition, TrackerError> {
        let user = self.load(user_id)?;
        let transition = apply_action(&user, action, now).inspect_err(|err| {
            tracing::debug!(user = %user_id, %action, error = %err, "action rejected");
        })?;

        if let Some(last) = self.store.last_event(user_id)? {
            if now < last.timestamp {
                tracing::debug!(
                    user = %user_id,
                    %action,
                    at = %now,
                    last = %last.timestamp,
                    "action out of order"
                );
                return Err(ActionError::OutOfOrder {
                    at: now,
                    last: last.timestamp,
                }
                .into());
            }
        }

        if action == Action::StartBreak {
            let (_, totals) = self.today(&user, now)?;
            if !self.policy.allows_break(user.status, totals.daily_break_seconds) {
                tracing::debug!(
                    user = %user_id,
                    used = totals.daily_break_seconds,
                    cap = self.policy.cap_seconds,
                    "break cap reached"
                );
                return Err(ActionError::BreakCapExceeded {
                    used: totals.daily_break_seconds,
                    cap: self.policy.cap_seconds,
                }
                .into());
            }
        }

        let patch = UserPatch::between(&user, &transition.next);
        self.store.commit_transition(&patch, &transition.event)?;
        tracing::info!(
            user = %user_id,
            %action,
            from = %user.status,
            to = %transition.next.status,
            "transition applied"
        );
        Ok(transition)
    }

    /// Today's log and totals for a user.
    pub fn day_summary(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<DaySummary, TrackerError> {
        let user = self.load(user_id)?;
        let window = DayWindow::containing(now, self.offset);
        let (events, totals) = self.today(&user, now)?;
        Ok(DaySummary {
            window_start: window.start,
            generated_at: now,
            events,
            break_cap_seconds: self.policy.cap_seconds,
            break_remaining_seconds: self.policy.remaining(totals.daily_break_seconds),
            break_cap_exceeded: self.policy.is_exceeded(totals.daily_break_seconds),
            totals,
            user,
        })
    }

    /// Status counts across all users.
    pub fn stats(&self) -> Result<StatsCounts, TrackerError> {
        let users = self.store.list_users()?;
        Ok(reduce_stats(&users))
    }

    fn load(&self, user_id: &UserId) -> Result<UserSnapshot, TrackerError> {
        self.store
            .get_user(user_id)?
            .ok_or_else(|| TrackerError::UnknownUser(user_id.clone()))
    }

    fn today(
        &self,
        user: &UserSnapshot,
        now: DateTime<Utc>,
    ) -> Result<(Vec<TimeLogEvent>, DayTotals), StorageError> {
        let window = DayWindow::containing(now, self.offset);
        let events = self.store.fetch_events(&user.id, &window)?;
        let live_break_start = user.break_start_time.map(|start| window.clamp_start(start));
        let carried_break = opened_on_break(&events).then_some(window.start);
        let totals =
            aggregate_day_from(carried_break, &events, user.status, live_break_start, now);
        if totals.unmatched_events > 0 {
            tracing::warn!(
                user = %user.id,
                unmatched = totals.unmatched_events,
                "ignored events that do not fit the status sequence"
            );
        }
        Ok((events, totals))
    }
}

/// Whether the day's first break event is an `end_break`, meaning the
/// break began before the window opened.
fn opened_on_break(events: &[TimeLogEvent]) -> bool {
    events
        .iter()
        .find(|e| matches!(e.action, Action::StartBreak | Action::EndBreak))
        .is_some_and(|e| e.action == Action::EndBreak)
}
