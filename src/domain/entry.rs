/// Logged records: habit completions, mood check-ins and focus sessions
///
/// These are the raw per-day events the analytics engine reduces. Habit logs
/// and mood entries are unique per day (a later write replaces the earlier
/// one); focus sessions are append-only.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::{validate_notes, DomainError, HabitId, RecordId, UserId};

/// Whether a habit was done on a given calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitLog {
    pub id: RecordId,
    /// Which habit this log is for
    pub habit_id: HabitId,
    /// Which day the log is for (can be different from logged_at)
    pub date: NaiveDate,
    pub completed: bool,
    pub notes: Option<String>,
    /// When this log was written
    pub logged_at: DateTime<Utc>,
}

impl HabitLog {
    /// Create a new habit log with validation
    pub fn new(
        habit_id: HabitId,
        date: NaiveDate,
        completed: bool,
        notes: Option<String>,
    ) -> Result<Self, DomainError> {
        validate_notes(&notes)?;

        Ok(Self {
            id: RecordId::new(),
            habit_id,
            date,
            completed,
            notes,
            logged_at: Utc::now(),
        })
    }

    /// Create a log from existing data (used when loading from database)
    pub fn from_existing(
        id: RecordId,
        habit_id: HabitId,
        date: NaiveDate,
        completed: bool,
        notes: Option<String>,
        logged_at: DateTime<Utc>,
    ) -> Self {
        Self { id, habit_id, date, completed, notes, logged_at }
    }
}

/// A daily mood check-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: RecordId,
    pub user_id: UserId,
    pub date: NaiveDate,
    /// Mood rating from 1 (low) to 5 (great)
    pub mood_level: u8,
    /// Energy rating from 1 to 5
    pub energy_level: u8,
    /// Hours slept the night before
    pub sleep_hours: f64,
    pub notes: Option<String>,
    pub logged_at: DateTime<Utc>,
}

impl MoodEntry {
    /// Create a new mood entry with validation
    pub fn new(
        user_id: UserId,
        date: NaiveDate,
        mood_level: u8,
        energy_level: u8,
        sleep_hours: f64,
        notes: Option<String>,
    ) -> Result<Self, DomainError> {
        Self::validate_level("Mood level", mood_level)?;
        Self::validate_level("Energy level", energy_level)?;
        Self::validate_sleep(sleep_hours)?;
        validate_notes(&notes)?;

        Ok(Self {
            id: RecordId::new(),
            user_id,
            date,
            mood_level,
            energy_level,
            sleep_hours,
            notes,
            logged_at: Utc::now(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: RecordId,
        user_id: UserId,
        date: NaiveDate,
        mood_level: u8,
        energy_level: u8,
        sleep_hours: f64,
        notes: Option<String>,
        logged_at: DateTime<Utc>,
    ) -> Self {
        Self { id, user_id, date, mood_level, energy_level, sleep_hours, notes, logged_at }
    }

    fn validate_level(label: &str, level: u8) -> Result<(), DomainError> {
        if !(1..=5).contains(&level) {
            return Err(DomainError::InvalidValue {
                message: format!("{} must be between 1 and 5, got {}", label, level)
            });
        }
        Ok(())
    }

    fn validate_sleep(hours: f64) -> Result<(), DomainError> {
        if !hours.is_finite() || !(0.0..=24.0).contains(&hours) {
            return Err(DomainError::InvalidValue {
                message: format!("Sleep hours must be between 0 and 24, got {}", hours)
            });
        }
        Ok(())
    }
}

/// One block of focused work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusSession {
    pub id: RecordId,
    pub user_id: UserId,
    pub task_name: String,
    pub date: NaiveDate,
    pub duration_minutes: u32,
    pub completed: bool,
}

impl FocusSession {
    /// Create a new focus session with validation
    pub fn new(
        user_id: UserId,
        task_name: String,
        date: NaiveDate,
        duration_minutes: u32,
        completed: bool,
    ) -> Result<Self, DomainError> {
        let trimmed = task_name.trim();
        if trimmed.is_empty() || trimmed.len() > 100 {
            return Err(DomainError::Validation {
                message: "Task name must be 1-100 characters".to_string()
            });
        }
        // A day only has 1440 minutes
        if duration_minutes == 0 || duration_minutes > 1440 {
            return Err(DomainError::InvalidValue {
                message: format!("Duration must be 1-1440 minutes, got {}", duration_minutes)
            });
        }

        Ok(Self {
            id: RecordId::new(),
            user_id,
            task_name: trimmed.to_string(),
            date,
            duration_minutes,
            completed,
        })
    }

    pub fn from_existing(
        id: RecordId,
        user_id: UserId,
        task_name: String,
        date: NaiveDate,
        duration_minutes: u32,
        completed: bool,
    ) -> Self {
        Self { id, user_id, task_name, date, duration_minutes, completed }
    }
}
