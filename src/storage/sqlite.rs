/// SQLite implementation of the event store
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving users, habits and the three event logs. It handles all
/// SQL queries and data conversion.

use std::path::Path;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite::types::Type;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{
    DateRange, FocusSession, Frequency, Habit, HabitId, HabitLog, MoodEntry, RecordId, User,
    UserId, DATE_FORMAT,
};
use crate::storage::{migrations, EventLog, EventStore, StorageError};

const HABIT_COLUMNS: &str =
    "id, user_id, name, description, frequency, target_per_week, color, icon, created_at, archived";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// both the read contract used by the engine and the write side used by
/// the tools.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (or create) the database file and bring its schema up to date
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StorageError> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::with_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// Open a private in-memory database (useful for tests)
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn })
    }

    fn user_exists(&self, user_id: &UserId) -> Result<bool, StorageError> {
        let found = self.conn
            .query_row(
                "SELECT 1 FROM users WHERE id = ?1",
                params![user_id.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn get_habit_log(&self, habit_id: &HabitId, date: NaiveDate) -> Result<HabitLog, StorageError> {
        let log = self.conn.query_row(
            "SELECT id, habit_id, date, completed, notes, logged_at
             FROM habit_logs WHERE habit_id = ?1 AND date = ?2",
            params![habit_id.to_string(), date.to_string()],
            habit_log_from_row,
        )?;
        Ok(log)
    }

    fn get_mood_entry(&self, user_id: &UserId, date: NaiveDate) -> Result<MoodEntry, StorageError> {
        let entry = self.conn.query_row(
            "SELECT id, user_id, date, mood_level, energy_level, sleep_hours, notes, logged_at
             FROM mood_entries WHERE user_id = ?1 AND date = ?2",
            params![user_id.to_string(), date.to_string()],
            mood_entry_from_row,
        )?;
        Ok(entry)
    }
}

impl EventStore for SqliteStorage {
    fn get_habits(&self, user_id: &UserId) -> Result<Vec<Habit>, StorageError> {
        if !self.user_exists(user_id)? {
            return Err(StorageError::UserNotFound { user_id: user_id.to_string() });
        }

        let sql = format!(
            "SELECT {} FROM habits WHERE user_id = ?1 AND archived = 0 ORDER BY created_at, name",
            HABIT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let habit_iter = stmt.query_map(params![user_id.to_string()], habit_from_row)?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            habits.push(habit?);
        }

        Ok(habits)
    }

    fn get_habit_logs(&self, user_id: &UserId, range: DateRange) -> Result<Vec<HabitLog>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT l.id, l.habit_id, l.date, l.completed, l.notes, l.logged_at
             FROM habit_logs l JOIN habits h ON h.id = l.habit_id
             WHERE h.user_id = ?1 AND l.date BETWEEN ?2 AND ?3
             ORDER BY l.date DESC"
        )?;

        let log_iter = stmt.query_map(
            params![user_id.to_string(), range.start().to_string(), range.end().to_string()],
            habit_log_from_row,
        )?;

        let mut logs = Vec::new();
        for log in log_iter {
            logs.push(log?);
        }

        Ok(logs)
    }

    fn get_mood_entries(&self, user_id: &UserId, range: DateRange) -> Result<Vec<MoodEntry>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, date, mood_level, energy_level, sleep_hours, notes, logged_at
             FROM mood_entries
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
             ORDER BY date"
        )?;

        let entry_iter = stmt.query_map(
            params![user_id.to_string(), range.start().to_string(), range.end().to_string()],
            mood_entry_from_row,
        )?;

        let mut entries = Vec::new();
        for entry in entry_iter {
            entries.push(entry?);
        }

        Ok(entries)
    }

    fn get_focus_sessions(&self, user_id: &UserId, range: DateRange) -> Result<Vec<FocusSession>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, task_name, date, duration_minutes, completed
             FROM focus_sessions
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
             ORDER BY date"
        )?;

        let session_iter = stmt.query_map(
            params![user_id.to_string(), range.start().to_string(), range.end().to_string()],
            focus_session_from_row,
        )?;

        let mut sessions = Vec::new();
        for session in session_iter {
            sessions.push(session?);
        }

        Ok(sessions)
    }

    fn get_previous_window_focus_total(&self, user_id: &UserId, range: DateRange) -> Result<u64, StorageError> {
        let total: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(duration_minutes), 0) FROM focus_sessions
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3",
            params![user_id.to_string(), range.start().to_string(), range.end().to_string()],
            |row| row.get(0),
        )?;

        Ok(total.max(0) as u64)
    }
}

impl EventLog for SqliteStorage {
    fn create_user(&self, user: &User) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO users (id, name, created_at) VALUES (?1, ?2, ?3)",
            params![user.id.to_string(), user.name, user.created_at.to_rfc3339()],
        )?;

        tracing::debug!("Created user: {} ({})", user.name, user.id);
        Ok(())
    }

    fn get_user(&self, user_id: &UserId) -> Result<User, StorageError> {
        let result = self.conn.query_row(
            "SELECT id, name, created_at FROM users WHERE id = ?1",
            params![user_id.to_string()],
            |row| {
                Ok(User::from_existing(
                    parse_id(row, 0, UserId::from_string)?,
                    row.get(1)?,
                    parse_datetime(row, 2)?,
                ))
            },
        );

        match result {
            Ok(user) => Ok(user),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(StorageError::UserNotFound { user_id: user_id.to_string() })
            }
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        if !self.user_exists(&habit.user_id)? {
            return Err(StorageError::UserNotFound { user_id: habit.user_id.to_string() });
        }

        self.conn.execute(
            "INSERT INTO habits (
                id, user_id, name, description, frequency, target_per_week,
                color, icon, created_at, archived
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                habit.id.to_string(),
                habit.user_id.to_string(),
                habit.name,
                habit.description,
                habit.frequency.as_str(),
                habit.target_per_week,
                habit.color,
                habit.icon,
                habit.created_at.to_rfc3339(),
                habit.archived
            ],
        )?;

        tracing::debug!("Created habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let sql = format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS);
        let result = self.conn.query_row(&sql, params![habit_id.to_string()], habit_from_row);

        match result {
            Ok(habit) => Ok(habit),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(StorageError::HabitNotFound { habit_id: habit_id.to_string() })
            }
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    fn list_habits(&self, user_id: &UserId, include_archived: bool) -> Result<Vec<Habit>, StorageError> {
        if !self.user_exists(user_id)? {
            return Err(StorageError::UserNotFound { user_id: user_id.to_string() });
        }

        let sql = format!(
            "SELECT {} FROM habits WHERE user_id = ?1 AND (?2 OR archived = 0) ORDER BY created_at, name",
            HABIT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let habit_iter = stmt.query_map(params![user_id.to_string(), include_archived], habit_from_row)?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            habits.push(habit?);
        }

        Ok(habits)
    }

    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE habits SET
                name = ?2,
                description = ?3,
                color = ?4,
                icon = ?5,
                archived = ?6
             WHERE id = ?1",
            params![
                habit.id.to_string(),
                habit.name,
                habit.description,
                habit.color,
                habit.icon,
                habit.archived
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound { habit_id: habit.id.to_string() });
        }

        tracing::debug!("Updated habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    fn upsert_habit_log(&self, log: &HabitLog) -> Result<HabitLog, StorageError> {
        self.conn.execute(
            "INSERT INTO habit_logs (id, habit_id, date, completed, notes, logged_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (habit_id, date) DO UPDATE SET
                completed = excluded.completed,
                notes = excluded.notes,
                logged_at = excluded.logged_at",
            params![
                log.id.to_string(),
                log.habit_id.to_string(),
                log.date.to_string(),
                log.completed,
                log.notes,
                log.logged_at.to_rfc3339()
            ],
        )?;

        tracing::debug!("Upserted log for habit {} on {}", log.habit_id, log.date);
        self.get_habit_log(&log.habit_id, log.date)
    }

    fn upsert_mood_entry(&self, entry: &MoodEntry) -> Result<MoodEntry, StorageError> {
        if !self.user_exists(&entry.user_id)? {
            return Err(StorageError::UserNotFound { user_id: entry.user_id.to_string() });
        }

        self.conn.execute(
            "INSERT INTO mood_entries (
                id, user_id, date, mood_level, energy_level, sleep_hours, notes, logged_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT (user_id, date) DO UPDATE SET
                mood_level = excluded.mood_level,
                energy_level = excluded.energy_level,
                sleep_hours = excluded.sleep_hours,
                notes = excluded.notes,
                logged_at = excluded.logged_at",
            params![
                entry.id.to_string(),
                entry.user_id.to_string(),
                entry.date.to_string(),
                entry.mood_level,
                entry.energy_level,
                entry.sleep_hours,
                entry.notes,
                entry.logged_at.to_rfc3339()
            ],
        )?;

        tracing::debug!("Upserted mood entry for user {} on {}", entry.user_id, entry.date);
        self.get_mood_entry(&entry.user_id, entry.date)
    }

    fn append_focus_session(&self, session: &FocusSession) -> Result<(), StorageError> {
        if !self.user_exists(&session.user_id)? {
            return Err(StorageError::UserNotFound { user_id: session.user_id.to_string() });
        }

        self.conn.execute(
            "INSERT INTO focus_sessions (id, user_id, task_name, date, duration_minutes, completed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session.id.to_string(),
                session.user_id.to_string(),
                session.task_name,
                session.date.to_string(),
                session.duration_minutes,
                session.completed
            ],
        )?;

        tracing::debug!("Recorded {} minute focus session for user {}", session.duration_minutes, session.user_id);
        Ok(())
    }
}

// Row conversion helpers

fn invalid_column(idx: usize, what: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(idx, what.to_string(), Type::Text)
}

fn parse_id<T>(row: &Row<'_>, idx: usize, parse: fn(&str) -> Result<T, uuid::Error>) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).map_err(|_| invalid_column(idx, "Invalid UUID"))
}

fn parse_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|_| invalid_column(idx, "Invalid date"))
}

fn parse_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| invalid_column(idx, "Invalid datetime"))
}

fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
    let frequency_str: String = row.get(4)?;
    let frequency = Frequency::parse(&frequency_str)
        .map_err(|_| invalid_column(4, "Invalid frequency"))?;

    Ok(Habit::from_existing(
        parse_id(row, 0, HabitId::from_string)?,
        parse_id(row, 1, UserId::from_string)?,
        row.get(2)?, // name
        row.get(3)?, // description
        frequency,
        row.get(5)?, // target_per_week
        row.get(6)?, // color
        row.get(7)?, // icon
        parse_datetime(row, 8)?,
        row.get(9)?, // archived
    ))
}

fn habit_log_from_row(row: &Row<'_>) -> rusqlite::Result<HabitLog> {
    Ok(HabitLog::from_existing(
        parse_id(row, 0, RecordId::from_string)?,
        parse_id(row, 1, HabitId::from_string)?,
        parse_date(row, 2)?,
        row.get(3)?, // completed
        row.get(4)?, // notes
        parse_datetime(row, 5)?,
    ))
}

fn mood_entry_from_row(row: &Row<'_>) -> rusqlite::Result<MoodEntry> {
    Ok(MoodEntry::from_existing(
        parse_id(row, 0, RecordId::from_string)?,
        parse_id(row, 1, UserId::from_string)?,
        parse_date(row, 2)?,
        row.get(3)?, // mood_level
        row.get(4)?, // energy_level
        row.get(5)?, // sleep_hours
        row.get(6)?, // notes
        parse_datetime(row, 7)?,
    ))
}

fn focus_session_from_row(row: &Row<'_>) -> rusqlite::Result<FocusSession> {
    Ok(FocusSession::from_existing(
        parse_id(row, 0, RecordId::from_string)?,
        parse_id(row, 1, UserId::from_string)?,
        row.get(2)?, // task_name
        parse_date(row, 3)?,
        row.get(4)?, // duration_minutes
        row.get(5)?, // completed
    ))
}
