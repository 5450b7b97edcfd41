//! Daily break cap.

use serde::{Deserialize, Serialize};

use crate::status::Status;

/// Default daily break allowance: one hour.
pub const DEFAULT_BREAK_CAP_SECS: i64 = 3_600;

/// Whether a new break may start.
///
/// Only a working user under the cap may go on break.
pub fn can_start_break(status: Status, daily_break_seconds: i64, cap: i64) -> bool {
    status == Status::Working && daily_break_seconds < cap
}

/// Whether the cap has been reached. Used for warnings only; ending a break
/// is always allowed.
pub const fn is_exceeded(daily_break_seconds: i64, cap: i64) -> bool {
    daily_break_seconds >= cap
}

/// Break time left today, never negative.
pub fn remaining(daily_break_seconds: i64, cap: i64) -> i64 {
    cap.saturating_sub(daily_break_seconds).max(0)
}

/// Configured break policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakPolicy {
    pub cap_seconds: i64,
}

impl Default for BreakPolicy {
    fn default() -> Self {
        Self {
            cap_seconds: DEFAULT_BREAK_CAP_SECS,
        }
    }
}

impl BreakPolicy {
    pub const fn new(cap_seconds: i64) -> Self {
        Self { cap_seconds }
    }

    pub fn allows_break(&self, status: Status, daily_break_seconds: i64) -> bool {
        can_start_break(status, daily_break_seconds, self.cap_seconds)
    }

    pub const fn is_exceeded(&self, daily_break_seconds: i64) -> bool {
        is_exceeded(daily_break_seconds, self.cap_seconds)
    }

    pub fn remaining(&self, daily_break_seconds: i64) -> i64 {
        remaining(daily_break_seconds, self.cap_seconds)
    }
}
