//! Daily duration aggregation.
//!
//! Replays one user's events for a local day to compute accumulated break
//! time and the current work span.
//!
//! # Algorithm Summary
//!
//! 1. Scan events in timestamp order keeping one optional open-break cursor
//! 2. `start_break` sets the cursor; `end_break` closes it and adds the gap
//! 3. After the scan, a live `on_break` status adds `now - break_start_time`
//! 4. Work time is the most recent `start_work` span, closed by the first
//!    `end_work` after it or still running
//!
//! A break already running when the day began is carried in by
//! [`aggregate_day_from`] and counts from the window start.
//!
//! Malformed logs never fail aggregation. Unmatched `end_break` / `end_work`
//! events are skipped and counted in [`DayTotals::unmatched_events`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::event::TimeLogEvent;
use crate::status::{Action, Status};

/// Accumulated durations for one user and one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayTotals {
    /// Total break time today, including a break still in progress.
    pub daily_break_seconds: i64,

    /// Length of the most recent work span.
    pub work_seconds: i64,

    /// Events the scan ignored because they did not fit the state machine.
    pub unmatched_events: usize,
}

/// Aggregates a day of events.
///
/// Events must be sorted by timestamp ascending and already restricted to
/// the day window. `live_break_start` should be clamped to the window start
/// by the caller if the break began on a previous day.
pub fn aggregate_day(
    events: &[TimeLogEvent],
    live_status: Status,
    live_break_start: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DayTotals {
    aggregate_day_from(None, events, live_status, live_break_start, now)
}

/// Aggregates a day that opened with a break in progress since `carried_break`.
///
/// `carried_break` seeds the open-break cursor, so a first `end_break` with
/// no `start_break` before it closes that break instead of being ignored.
pub fn aggregate_day_from(
    carried_break: Option<DateTime<Utc>>,
    events: &[TimeLogEvent],
    live_status: Status,
    live_break_start: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DayTotals {
    let mut totals = DayTotals::default();
    let mut open_break = carried_break;
    let mut work_start: Option<DateTime<Utc>> = None;
    let mut work_end: Option<DateTime<Utc>> = None;
    let mut last_seen_in_span: Option<DateTime<Utc>> = None;

    for event in events {
        let at = event.timestamp;
        match event.action {
            Action::StartBreak => {
                if open_break.replace(at).is_some() {
                    totals.unmatched_events += 1;
                }
            }
            Action::EndBreak => match open_break.take() {
                Some(start) => totals.daily_break_seconds += seconds_between(start, at),
                None => totals.unmatched_events += 1,
            },
            Action::StartWork => {
                if work_start.is_some() && work_end.is_none() {
                    totals.unmatched_events += 1;
                }
                work_start = Some(at);
                work_end = None;
            }
            Action::EndWork => {
                if work_start.is_some() && work_end.is_none() {
                    work_end = Some(at);
                } else {
                    totals.unmatched_events += 1;
                }
            }
        }
        if work_start.is_some() {
            last_seen_in_span = Some(at);
        }
    }

    if live_status == Status::OnBreak {
        if let Some(start) = live_break_start.or(open_break) {
            totals.daily_break_seconds += seconds_between(start, now);
        }
    }

    totals.work_seconds = match (work_start, work_end) {
        (None, _) => 0,
        (Some(start), Some(end)) => seconds_between(start, end),
        (Some(start), None) if live_status != Status::Offline => seconds_between(start, now),
        // Lost end_work: close the span at the last thing we saw.
        (Some(start), None) => last_seen_in_span.map_or(0, |last| seconds_between(start, last)),
    };

    totals
}

/// Whole seconds from `start` to `end`; clock skew yields 0.
fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_seconds().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserId;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap()
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        t0() + Duration::seconds(seconds)
    }

    fn ev(action: Action, seconds: i64) -> TimeLogEvent {
        TimeLogEvent::new(UserId::new("u1").unwrap(), action, at(seconds))
    }

    #[test]
    fn closed_break_counts_its_length() {
        let events = vec![ev(Action::StartBreak, 0), ev(Action::EndBreak, 300)];
        let totals = aggregate_day(&events, Status::Working, None, at(1_000));
        assert_eq!(totals.daily_break_seconds, 300);
        assert_eq!(totals.unmatched_events, 0);
    }

    #[test]
    fn dangling_break_counts_until_now() {
        let events = vec![ev(Action::StartBreak, 0)];
        let totals = aggregate_day(&events, Status::OnBreak, Some(t0()), at(120));
        assert_eq!(totals.daily_break_seconds, 120);
    }

    #[test]
    fn lone_end_break_is_ignored() {
        let events = vec![ev(Action::EndBreak, 0)];
        let totals = aggregate_day(&events, Status::Working, None, at(600));
        assert_eq!(totals.daily_break_seconds, 0);
        assert_eq!(totals.unmatched_events, 1);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let events = vec![
            ev(Action::StartWork, 0),
            ev(Action::StartBreak, 60),
            ev(Action::EndBreak, 360),
            ev(Action::StartBreak, 900),
        ];
        let first = aggregate_day(&events, Status::OnBreak, Some(at(900)), at(1_200));
        let second = aggregate_day(&events, Status::OnBreak, Some(at(900)), at(1_200));
        assert_eq!(first, second);
        assert_eq!(first.daily_break_seconds, 300 + 300);
        assert_eq!(first.work_seconds, 1_200);
    }

    #[test]
    fn repeated_start_break_restarts_cursor() {
        let events = vec![
            ev(Action::StartBreak, 0),
            ev(Action::StartBreak, 100),
            ev(Action::EndBreak, 160),
        ];
        let totals = aggregate_day(&events, Status::Working, None, at(200));
        assert_eq!(totals.daily_break_seconds, 60);
        assert_eq!(totals.unmatched_events, 1);
    }

    #[test]
    fn duplicate_end_break_counts_once() {
        let events = vec![
            ev(Action::StartBreak, 0),
            ev(Action::EndBreak, 50),
            ev(Action::EndBreak, 90),
        ];
        let totals = aggregate_day(&events, Status::Working, None, at(200));
        assert_eq!(totals.daily_break_seconds, 50);
        assert_eq!(totals.unmatched_events, 1);
    }

    #[test]
    fn live_break_without_start_time_falls_back_to_cursor() {
        let events = vec![ev(Action::StartBreak, 30)];
        let totals = aggregate_day(&events, Status::OnBreak, None, at(90));
        assert_eq!(totals.daily_break_seconds, 60);
    }

    #[test]
    fn dangling_break_while_working_is_not_counted() {
        let events = vec![ev(Action::StartBreak, 0)];
        let totals = aggregate_day(&events, Status::Working, None, at(500));
        assert_eq!(totals.daily_break_seconds, 0);
    }

    #[test]
    fn clock_skew_never_goes_negative() {
        let events = vec![ev(Action::StartBreak, 100), ev(Action::EndBreak, 40)];
        let totals = aggregate_day(&events, Status::OnBreak, Some(at(500)), at(400));
        assert_eq!(totals.daily_break_seconds, 0);
    }

    #[test]
    fn work_without_start_is_zero() {
        let events = vec![ev(Action::StartBreak, 0), ev(Action::EndBreak, 10)];
        let totals = aggregate_day(&events, Status::Working, None, at(100));
        assert_eq!(totals.work_seconds, 0);
    }

    #[test]
    fn closed_work_span() {
        let events = vec![ev(Action::StartWork, 0), ev(Action::EndWork, 3_600)];
        let totals = aggregate_day(&events, Status::Offline, None, at(7_200));
        assert_eq!(totals.work_seconds, 3_600);
    }

    #[test]
    fn ongoing_work_span_runs_to_now() {
        let events = vec![ev(Action::StartWork, 0)];
        let totals = aggregate_day(&events, Status::Working, None, at(1_800));
        assert_eq!(totals.work_seconds, 1_800);
    }

    #[test]
    fn most_recent_span_wins() {
        let events = vec![
            ev(Action::StartWork, 0),
            ev(Action::EndWork, 3_600),
            ev(Action::StartWork, 4_000),
            ev(Action::EndWork, 4_600),
        ];
        let totals = aggregate_day(&events, Status::Offline, None, at(5_000));
        assert_eq!(totals.work_seconds, 600);
        assert_eq!(totals.unmatched_events, 0);
    }

    #[test]
    fn lost_end_work_closes_at_last_event() {
        let events = vec![
            ev(Action::StartWork, 0),
            ev(Action::StartBreak, 1_000),
            ev(Action::EndBreak, 1_300),
        ];
        let totals = aggregate_day(&events, Status::Offline, None, at(9_000));
        assert_eq!(totals.work_seconds, 1_300);
    }

    #[test]
    fn stray_end_work_is_unmatched() {
        let events = vec![ev(Action::EndWork, 0), ev(Action::StartWork, 10)];
        let totals = aggregate_day(&events, Status::Working, None, at(70));
        assert_eq!(totals.unmatched_events, 1);
        assert_eq!(totals.work_seconds, 60);
    }

    #[test]
    fn empty_log() {
        let totals = aggregate_day(&[], Status::Offline, None, t0());
        assert_eq!(totals, DayTotals::default());
    }

    #[test]
    fn carried_break_is_closed_by_first_end_break() {
        let events = vec![ev(Action::EndBreak, 600), ev(Action::EndWork, 900)];
        let totals = aggregate_day_from(Some(t0()), &events, Status::Offline, None, at(1_000));
        assert_eq!(totals.daily_break_seconds, 600);
        assert_eq!(totals.unmatched_events, 1);
    }

    #[test]
    fn carried_break_still_live_counts_once() {
        let totals = aggregate_day_from(Some(t0()), &[], Status::OnBreak, Some(t0()), at(300));
        assert_eq!(totals.daily_break_seconds, 300);
        assert_eq!(totals.unmatched_events, 0);
    }
}
