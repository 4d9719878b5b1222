/// Tool for the daily mood check-in
///
/// This module implements the mood_log MCP tool. One check-in per day;
/// checking in again replaces the day's entry.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::domain::MoodEntry;
use crate::storage::EventLog;
use crate::tools::{parse_user_id, resolve_log_date, ToolError};

/// Parameters for a mood check-in
#[derive(Debug, Deserialize)]
pub struct LogMoodParams {
    pub user_id: String,
    pub mood_level: u8,
    pub energy_level: u8,
    pub sleep_hours: f64,
    pub date: Option<String>,
    pub notes: Option<String>,
}

/// Response from a mood check-in
#[derive(Debug, Serialize)]
pub struct LogMoodResponse {
    pub success: bool,
    pub entry_id: String,
    pub message: String,
}

/// Record or replace the mood entry for a day
pub fn log_mood<S: EventLog + ?Sized>(
    storage: &S,
    params: LogMoodParams,
    today: NaiveDate,
) -> Result<LogMoodResponse, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    let date = resolve_log_date(params.date.as_deref(), today)?;

    let entry = MoodEntry::new(
        user_id,
        date,
        params.mood_level,
        params.energy_level,
        params.sleep_hours,
        params.notes,
    )?;
    let stored = storage.upsert_mood_entry(&entry)?;

    tracing::debug!("Recorded mood {} for user {} on {}", stored.mood_level, stored.user_id, stored.date);

    Ok(LogMoodResponse {
        success: true,
        entry_id: stored.id.to_string(),
        message: format!(
            "🌤️ Checked in for {}: mood {}/5, energy {}/5, {} hours of sleep",
            stored.date, stored.mood_level, stored.energy_level, stored.sleep_hours
        ),
    })
}
