//! Act command for applying a status action to a user.

use std::io::Write;

use anyhow::{Context, Result};
use bt_core::{Action, Tracker, UserId};
use bt_db::Database;
use chrono::{DateTime, FixedOffset, Utc};

use super::util::format_duration;

/// Applies `action` for `user` at `at` and reports the new status.
pub fn run<W: Write>(
    writer: &mut W,
    tracker: &mut Tracker<Database>,
    user: &str,
    action: Action,
    at: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<()> {
    let user_id = UserId::new(user)?;
    let transition = tracker
        .perform(&user_id, action, at)
        .with_context(|| format!("{action} rejected for {user_id}"))?;

    let local = at.with_timezone(&offset).format("%H:%M");
    writeln!(
        writer,
        "{} is now {} ({action} at {local})",
        transition.next.name, transition.next.status
    )?;

    if action == Action::EndBreak {
        let summary = tracker.day_summary(&user_id, at)?;
        writeln!(
            writer,
            "Break today: {} of {}",
            format_duration(summary.totals.daily_break_seconds),
            format_duration(summary.break_cap_seconds)
        )?;
        if summary.break_cap_exceeded {
            writeln!(writer, "Daily break cap reached.")?;
        }
    }
    Ok(())
}
