//! Status command: the admin view of who is working, on break, or offline.

use std::io::Write;

use anyhow::Result;
use bt_core::{DaySummary, Role, StatsCounts, Status, Tracker, UserId, reduce_stats};
use bt_db::Database;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::util::format_duration;

#[derive(Debug, Serialize)]
struct StatusReport {
    stats: StatsCounts,
    users: Vec<UserLine>,
}

#[derive(Debug, Serialize)]
struct UserLine {
    id: UserId,
    name: String,
    role: Role,
    status: Status,
    break_seconds: i64,
    break_cap_exceeded: bool,
}

/// Counts and rows come from the same snapshots.
fn build_report(tracker: &Tracker<Database>, now: DateTime<Utc>) -> Result<StatusReport> {
    let summaries = tracker
        .store()
        .list_all_users()?
        .iter()
        .map(|user| tracker.day_summary(&user.id, now))
        .collect::<Result<Vec<DaySummary>, _>>()?;

    let stats = reduce_stats(summaries.iter().map(|s| &s.user));
    let users = summaries
        .into_iter()
        .map(|summary| UserLine {
            break_seconds: summary.totals.daily_break_seconds,
            break_cap_exceeded: summary.break_cap_exceeded,
            id: summary.user.id,
            name: summary.user.name,
            role: summary.user.role,
            status: summary.user.status,
        })
        .collect();
    Ok(StatusReport { stats, users })
}

/// Prints status counts and each user's break time today.
pub fn run<W: Write>(
    writer: &mut W,
    tracker: &Tracker<Database>,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let report = build_report(tracker, now)?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    writeln!(writer, "{}", report.stats)?;
    if report.users.is_empty() {
        return Ok(());
    }

    let name_width = report
        .users
        .iter()
        .map(|u| u.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    writeln!(
        writer,
        "{:<name_width$}  {:<8}  {:<8}  BREAK TODAY",
        "NAME", "ROLE", "STATUS"
    )?;
    for user in &report.users {
        let flag = if user.break_cap_exceeded { " (cap)" } else { "" };
        writeln!(
            writer,
            "{:<name_width$}  {:<8}  {:<8}  {}{flag}",
            user.name,
            user.role.as_str(),
            user.status.as_str(),
            format_duration(user.break_seconds),
        )?;
    }
    Ok(())
}
