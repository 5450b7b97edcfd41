//! Storage layer for break tracking.
//!
//! Provides persistence for users and their action log using `rusqlite`,
//! and implements the `bt-core` store traits on top of it.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` can be moved between threads but not shared without external
//! synchronization (e.g. a `Mutex<Database>` or one instance per thread).
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in ISO 8601 format with millisecond
//! precision (e.g., `2025-03-03T09:00:00.000Z`). Every write goes through
//! [`format_timestamp`], so lexicographic ordering matches chronological
//! ordering.
//!
//! ## Append-only Events
//!
//! `events` rows are never updated or deleted; triggers abort any attempt.
//! Ties on `timestamp` are ordered by insertion (`seq`).
//!
//! ## Status Updates
//!
//! User status changes are compare-and-swap: the update only applies if the
//! row still holds the status and break start the caller read. A status
//! change and its event are written in one transaction.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

use bt_core::{
    Action, DayWindow, EventLogStore, InconsistentSnapshot, Role, Status, StorageError, Store,
    TimeLogEvent, UserId, UserPatch, UserSnapshot, UserStore, ValidationError,
};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for {record}: {timestamp}")]
    TimestampParse {
        record: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored enum or ID failed validation.
    #[error("invalid stored value for {record}")]
    InvalidValue {
        record: String,
        #[source]
        source: ValidationError,
    },
    /// A user row whose break start disagrees with its status.
    #[error(transparent)]
    Inconsistent(#[from] InconsistentSnapshot),
    /// The user row changed since it was read.
    #[error("user {user_id} was modified concurrently")]
    Conflict { user_id: UserId },
    /// No such user.
    #[error("user not found: {user_id}")]
    UserNotFound { user_id: UserId },
}

impl From<DbError> for StorageError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict { user_id } => Self::Conflict { user_id },
            DbError::UserNotFound { user_id } => Self::MissingUser { user_id },
            other => Self::backend(other),
        }
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'employee',
                status TEXT NOT NULL DEFAULT 'offline',
                break_start_time TEXT,
                updated_at TEXT NOT NULL,
                CHECK ((status = 'on_break') = (break_start_time IS NOT NULL))
            );

            -- Events table: append-only action log
            -- timestamp: ISO 8601 format (e.g., '2025-03-03T09:00:00.000Z')
            -- action: start_work | start_break | end_break | end_work
            CREATE TABLE IF NOT EXISTS events (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                action TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id)
            );

            CREATE INDEX IF NOT EXISTS idx_events_user_timestamp ON events(user_id, timestamp);

            CREATE TRIGGER IF NOT EXISTS events_no_update
            BEFORE UPDATE ON events
            BEGIN
                SELECT RAISE(ABORT, 'events are append-only');
            END;

            CREATE TRIGGER IF NOT EXISTS events_no_delete
            BEFORE DELETE ON events
            BEGIN
                SELECT RAISE(ABORT, 'events are append-only');
            END;
            ",
        )?;
        Ok(())
    }

    /// Registers a user. Returns `false` if the ID is already taken.
    pub fn insert_user(&mut self, user: &UserSnapshot) -> Result<bool, DbError> {
        user.check_consistency()?;
        let inserted = self.conn.execute(
            "
            INSERT OR IGNORE INTO users (id, name, role, status, break_start_time, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
            params![
                user.id.as_str(),
                user.name,
                user.role.as_str(),
                user.status.as_str(),
                user.break_start_time.map(format_timestamp),
                format_timestamp(Utc::now()),
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Looks up one user.
    pub fn find_user(&self, id: &UserId) -> Result<Option<UserSnapshot>, DbError> {
        let row = self
            .conn
            .query_row(
                "
                SELECT id, name, role, status, break_start_time
                FROM users
                WHERE id = ?
                ",
                [id.as_str()],
                UserRow::from_row,
            )
            .optional()?;
        row.map(UserRow::into_snapshot).transpose()
    }

    /// Lists users ordered by name then ID.
    pub fn list_all_users(&self) -> Result<Vec<UserSnapshot>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, role, status, break_start_time
            FROM users
            ORDER BY name ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], UserRow::from_row)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?.into_snapshot()?);
        }
        Ok(users)
    }

    /// Applies a status patch if the row still matches what the caller read.
    pub fn update_status(&mut self, id: &UserId, patch: &UserPatch) -> Result<(), DbError> {
        compare_and_swap(&self.conn, id, patch)
    }

    /// Appends one event to the log.
    pub fn insert_event(&mut self, event: &TimeLogEvent) -> Result<(), DbError> {
        insert_event_row(&self.conn, event)
    }

    /// Applies a status patch and appends its event in one transaction.
    pub fn record_transition(
        &mut self,
        patch: &UserPatch,
        event: &TimeLogEvent,
    ) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        compare_and_swap(&tx, &event.user_id, patch)?;
        insert_event_row(&tx, event)?;
        tx.commit()?;
        tracing::debug!(user = %event.user_id, action = %event.action, "transition recorded");
        Ok(())
    }

    /// Lists a user's events within a time range, inclusive of both ends.
    pub fn list_events_between(
        &self,
        user_id: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeLogEvent>, DbError> {
        if end < start {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(
            "
            SELECT seq, user_id, action, timestamp
            FROM events
            WHERE user_id = ? AND timestamp >= ? AND timestamp <= ?
            ORDER BY timestamp ASC, seq ASC
            ",
        )?;
        let rows = stmt.query_map(
            params![user_id.as_str(), format_timestamp(start), format_timestamp(end)],
            EventRow::from_row,
        )?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?.into_event()?);
        }
        Ok(events)
    }

    /// The user's most recent event; insertion order breaks timestamp ties.
    pub fn latest_event(&self, user_id: &UserId) -> Result<Option<TimeLogEvent>, DbError> {
        let row = self
            .conn
            .query_row(
                "
                SELECT seq, user_id, action, timestamp
                FROM events
                WHERE user_id = ?
                ORDER BY timestamp DESC, seq DESC
                LIMIT 1
                ",
                [user_id.as_str()],
                EventRow::from_row,
            )
            .optional()?;
        row.map(EventRow::into_event).transpose()
    }
}

impl UserStore for Database {
    fn get_user(&self, id: &UserId) -> Result<Option<UserSnapshot>, StorageError> {
        Ok(self.find_user(id)?)
    }

    fn update_user(&mut self, id: &UserId, patch: &UserPatch) -> Result<(), StorageError> {
        Ok(self.update_status(id, patch)?)
    }

    fn list_users(&self) -> Result<Vec<UserSnapshot>, StorageError> {
        Ok(self.list_all_users()?)
    }
}

impl EventLogStore for Database {
    fn fetch_events(
        &self,
        user_id: &UserId,
        window: &DayWindow,
    ) -> Result<Vec<TimeLogEvent>, StorageError> {
        Ok(self.list_events_between(user_id, window.start, window.end)?)
    }

    fn last_event(&self, user_id: &UserId) -> Result<Option<TimeLogEvent>, StorageError> {
        Ok(self.latest_event(user_id)?)
    }

    fn append_event(&mut self, event: &TimeLogEvent) -> Result<(), StorageError> {
        Ok(self.insert_event(event)?)
    }
}

impl Store for Database {
    fn commit_transition(
        &mut self,
        patch: &UserPatch,
        event: &TimeLogEvent,
    ) -> Result<(), StorageError> {
        Ok(self.record_transition(patch, event)?)
    }
}

fn compare_and_swap(conn: &Connection, id: &UserId, patch: &UserPatch) -> Result<(), DbError> {
    let updated = conn.execute(
        "
        UPDATE users
        SET status = ?, break_start_time = ?, updated_at = ?
        WHERE id = ? AND status = ? AND break_start_time IS ?
        ",
        params![
            patch.status.as_str(),
            patch.break_start_time.map(format_timestamp),
            format_timestamp(Utc::now()),
            id.as_str(),
            patch.expected_status.as_str(),
            patch.expected_break_start.map(format_timestamp),
        ],
    )?;
    if updated > 0 {
        return Ok(());
    }

    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)",
        [id.as_str()],
        |row| row.get(0),
    )?;
    if exists {
        tracing::warn!(user = %id, "status update lost a concurrent race");
        Err(DbError::Conflict {
            user_id: id.clone(),
        })
    } else {
        Err(DbError::UserNotFound {
            user_id: id.clone(),
        })
    }
}

fn insert_event_row(conn: &Connection, event: &TimeLogEvent) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO events (user_id, action, timestamp) VALUES (?, ?, ?)",
        params![
            event.user_id.as_str(),
            event.action.as_str(),
            format_timestamp(event.timestamp),
        ],
    )?;
    Ok(())
}

/// Raw `users` columns before validation.
struct UserRow {
    id: String,
    name: String,
    role: String,
    status: String,
    break_start_time: Option<String>,
}

impl UserRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            role: row.get(2)?,
            status: row.get(3)?,
            break_start_time: row.get(4)?,
        })
    }

    fn into_snapshot(self) -> Result<UserSnapshot, DbError> {
        let record = format!("user {}", self.id);
        let invalid = |source| DbError::InvalidValue {
            record: record.clone(),
            source,
        };
        let role: Role = self.role.parse().map_err(invalid)?;
        let status: Status = self.status.parse().map_err(invalid)?;
        let break_start_time = self
            .break_start_time
            .as_deref()
            .map(|ts| parse_timestamp(ts, &record))
            .transpose()?;
        let id = UserId::new(self.id).map_err(invalid)?;

        let user = UserSnapshot {
            id,
            name: self.name,
            role,
            status,
            break_start_time,
        };
        user.check_consistency()?;
        Ok(user)
    }
}

/// Raw `events` columns before validation.
struct EventRow {
    seq: i64,
    user_id: String,
    action: String,
    timestamp: String,
}

impl EventRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            seq: row.get(0)?,
            user_id: row.get(1)?,
            action: row.get(2)?,
            timestamp: row.get(3)?,
        })
    }

    fn into_event(self) -> Result<TimeLogEvent, DbError> {
        let record = format!("event {}", self.seq);
        let invalid = |source| DbError::InvalidValue {
            record: record.clone(),
            source,
        };
        let action: Action = self.action.parse().map_err(invalid)?;
        let user_id = UserId::new(self.user_id).map_err(invalid)?;
        let timestamp = parse_timestamp(&self.timestamp, &record)?;
        Ok(TimeLogEvent::new(user_id, action, timestamp))
    }
}

fn parse_timestamp(timestamp: &str, record: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            record: record.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

/// Formats a timestamp the way every column stores it.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
