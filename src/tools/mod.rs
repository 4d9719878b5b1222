/// MCP tools for logging events and reading insights
///
/// This module contains all the MCP tools that external clients can call.
/// Each tool takes a deserializable params struct and returns a serializable
/// response; the MCP server only routes and formats.
///
/// Write tools never accept dates after "today". The current date is passed
/// in by the caller so the tools stay deterministic under test.

pub mod user;
pub mod create;
pub mod update;
pub mod log;
pub mod mood;
pub mod focus;
pub mod insights;
pub mod list;
pub mod history;

// Re-export tool functions for easy access
pub use user::*;
pub use create::*;
pub use update::*;
pub use log::*;
pub use mood::*;
pub use focus::*;
pub use insights::*;
pub use list::*;
pub use history::*;

use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::analytics::EngineError;
use crate::domain::{parse_date, DateRange, DomainError, HabitId, UserId};
use crate::storage::StorageError;

/// Errors returned by tool calls
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl From<DomainError> for ToolError {
    fn from(err: DomainError) -> Self {
        ToolError::InvalidParams(err.to_string())
    }
}

pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, ToolError> {
    UserId::from_string(raw.trim())
        .map_err(|_| ToolError::InvalidParams(format!("Invalid user ID format: '{}'", raw)))
}

pub(crate) fn parse_habit_id(raw: &str) -> Result<HabitId, ToolError> {
    HabitId::from_string(raw.trim())
        .map_err(|_| ToolError::InvalidParams(format!("Invalid habit ID format: '{}'", raw)))
}

/// Resolve an optional `YYYY-MM-DD` parameter, defaulting to `today`
///
/// Dates after `today` are rejected.
pub(crate) fn resolve_log_date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, ToolError> {
    let date = match raw {
        Some(s) => parse_date(s)?,
        None => today,
    };

    if date > today {
        return Err(ToolError::InvalidParams(format!(
            "Cannot log for {} because it is in the future (today is {})",
            date, today
        )));
    }
    Ok(date)
}

/// Days covered by a history read when no start date is given
pub const DEFAULT_HISTORY_DAYS: i64 = 30;

/// Resolve optional `start_date`/`end_date` parameters into a range
///
/// The end defaults to `today`, the start to `DEFAULT_HISTORY_DAYS` days
/// ending on the end date.
pub(crate) fn resolve_history_range(
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
) -> Result<DateRange, ToolError> {
    let end = match end {
        Some(s) => parse_date(s)?,
        None => today,
    };
    let start = match start {
        Some(s) => parse_date(s)?,
        None => end - Duration::days(DEFAULT_HISTORY_DAYS - 1),
    };
    Ok(DateRange::new(start, end)?)
}
