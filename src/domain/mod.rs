/// Domain module containing core business logic and data types
///
/// This module defines the core entities (User, Habit, HabitLog, MoodEntry,
/// FocusSession), their validation rules, and the streak calculation that
/// every view shares.

pub mod user;
pub mod habit;
pub mod entry;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use user::*;
pub use habit::*;
pub use entry::*;
pub use streak::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },
}

/// Shared check for free-text notes attached to logs and entries
pub(crate) fn validate_notes(notes: &Option<String>) -> Result<(), DomainError> {
    if let Some(note_text) = notes {
        if note_text.len() > 500 {
            return Err(DomainError::InvalidValue {
                message: "Notes cannot be longer than 500 characters".to_string()
            });
        }
    }
    Ok(())
}
