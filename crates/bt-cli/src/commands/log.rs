//! Log command for a user's activity today.

use std::io::Write;

use anyhow::Result;
use bt_core::{DaySummary, Tracker, UserId};
use bt_db::Database;
use chrono::{DateTime, FixedOffset, Utc};

use super::util::format_duration;

/// Prints today's events and totals for `user`.
pub fn run<W: Write>(
    writer: &mut W,
    tracker: &Tracker<Database>,
    user: &str,
    now: DateTime<Utc>,
    offset: FixedOffset,
    json: bool,
) -> Result<()> {
    let user_id = UserId::new(user)?;
    let summary = tracker.day_summary(&user_id, now)?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&summary)?)?;
        return Ok(());
    }
    render(writer, &summary, offset)
}

fn render<W: Write>(writer: &mut W, summary: &DaySummary, offset: FixedOffset) -> Result<()> {
    let user = &summary.user;
    writeln!(writer, "{} ({}): {}", user.name, user.id, user.status)?;

    if summary.events.is_empty() {
        writeln!(writer, "No activity today.")?;
    }
    for event in &summary.events {
        let local = event.timestamp.with_timezone(&offset).format("%H:%M");
        writeln!(writer, "{local}  {}", event.action)?;
    }

    let totals = &summary.totals;
    writeln!(writer, "Work: {}", format_duration(totals.work_seconds))?;
    writeln!(
        writer,
        "Break: {} of {} ({} left)",
        format_duration(totals.daily_break_seconds),
        format_duration(summary.break_cap_seconds),
        format_duration(summary.break_remaining_seconds)
    )?;
    if summary.break_cap_exceeded {
        writeln!(writer, "Daily break cap reached.")?;
    }
    if totals.unmatched_events > 0 {
        writeln!(
            writer,
            "Ignored {} event(s) out of sequence.",
            totals.unmatched_events
        )?;
    }
    Ok(())
}
