/// Storage layer for persisting and reading event logs
///
/// The analytics engine only ever sees the narrow read contract in
/// `EventStore`. The tool server additionally writes through `EventLog`.
/// `SqliteStorage` implements both; `MemoryStore` is an in-memory fake for
/// tests and for embedding the engine without a database.

pub mod sqlite;
pub mod memory;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;
pub use memory::*;

use thiserror::Error;
use crate::domain::{
    DateRange, FocusSession, Habit, HabitId, HabitLog, MoodEntry, User, UserId,
};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: String },

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Migration error: {0}")]
    Migration(String),
}

impl From<crate::domain::DomainError> for StorageError {
    fn from(err: crate::domain::DomainError) -> Self {
        match err {
            crate::domain::DomainError::InvalidRange { start, end } => {
                StorageError::InvalidRange(format!("{} is after {}", start, end))
            }
            other => StorageError::InvalidInput(other.to_string()),
        }
    }
}

/// Read-only accessor the analytics engine depends on
///
/// All reads return owned values. `get_habits` is the call that resolves the
/// user: it fails with `UserNotFound` for an unknown id and never returns
/// archived habits.
pub trait EventStore {
    /// Active (non-archived) habits owned by the user
    fn get_habits(&self, user_id: &UserId) -> Result<Vec<Habit>, StorageError>;

    /// Logs for the user's habits with dates inside `range`
    fn get_habit_logs(&self, user_id: &UserId, range: DateRange) -> Result<Vec<HabitLog>, StorageError>;

    /// Mood entries with dates inside `range`
    fn get_mood_entries(&self, user_id: &UserId, range: DateRange) -> Result<Vec<MoodEntry>, StorageError>;

    /// Focus sessions with dates inside `range`
    fn get_focus_sessions(&self, user_id: &UserId, range: DateRange) -> Result<Vec<FocusSession>, StorageError>;

    /// Total focus minutes inside `range`, used for the prior-window comparison
    fn get_previous_window_focus_total(&self, user_id: &UserId, range: DateRange) -> Result<u64, StorageError>;
}

/// Write side used by the tool server
///
/// Habit logs and mood entries are upserts keyed by day; focus sessions are
/// appended.
pub trait EventLog {
    fn create_user(&self, user: &User) -> Result<(), StorageError>;

    fn get_user(&self, user_id: &UserId) -> Result<User, StorageError>;

    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Get a habit by ID, archived or not
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError>;

    /// Habits owned by the user, oldest first; archived ones only on request
    fn list_habits(&self, user_id: &UserId, include_archived: bool) -> Result<Vec<Habit>, StorageError>;

    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Insert or replace the log for `(habit_id, date)`; returns the stored log
    fn upsert_habit_log(&self, log: &HabitLog) -> Result<HabitLog, StorageError>;

    /// Insert or replace the entry for `(user_id, date)`; returns the stored entry
    fn upsert_mood_entry(&self, entry: &MoodEntry) -> Result<MoodEntry, StorageError>;

    fn append_focus_session(&self, session: &FocusSession) -> Result<(), StorageError>;
}
