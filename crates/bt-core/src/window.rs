//! Local-day windows at a single fixed UTC offset.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};

/// Default offset for local days: UTC+5.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 5 * 60;

/// Builds a fixed offset from minutes east of UTC.
///
/// Returns `None` if the offset is a day or more.
pub fn fixed_offset(minutes_east: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(minutes_east.checked_mul(60)?)
}

/// The range `[start_of_local_day, now]`.
///
/// Daily break accumulation resets at `start`. The end is inclusive: an
/// event stamped exactly `now` has already happened and belongs to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// The window for the local day containing `now`, ending at `now`.
    pub fn containing(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local_midnight = now
            .with_timezone(&offset)
            .date_naive()
            .and_time(NaiveTime::MIN);
        let start = Utc.from_utc_datetime(
            &(local_midnight - Duration::seconds(i64::from(offset.local_minus_utc()))),
        );
        Self { start, end: now }
    }

    /// Whether `timestamp` falls inside the window.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    /// Clamps a timestamp that began before the window to the window start.
    pub fn clamp_start(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        timestamp.max(self.start)
    }
}
