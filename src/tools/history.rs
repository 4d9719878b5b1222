/// Tools for reading logged records back
///
/// This module implements habit_log_list, mood_list and focus_list. Each
/// returns the user's records over a date range, newest first. Without
/// explicit dates the range is the 30 days ending today.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::domain::{DateRange, FocusSession, HabitLog, MoodEntry};
use crate::storage::{EventLog, EventStore, StorageError};
use crate::tools::{parse_habit_id, parse_user_id, resolve_history_range, ToolError};

/// Parameters shared by the mood and focus history reads
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub user_id: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Parameters for reading habit logs
#[derive(Debug, Deserialize)]
pub struct ListHabitLogsParams {
    pub user_id: String,
    pub habit_id: Option<String>, // Only this habit's logs when set
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Records found in a range
#[derive(Debug, Serialize)]
pub struct HistoryResponse<T> {
    pub range: DateRange,
    pub count: usize,
    pub records: Vec<T>,
}

impl<T> HistoryResponse<T> {
    fn new(range: DateRange, records: Vec<T>) -> Self {
        Self {
            range,
            count: records.len(),
            records,
        }
    }
}

/// Habit logs for the user, optionally for one habit
pub fn list_habit_logs<S: EventStore + EventLog + ?Sized>(
    storage: &S,
    params: ListHabitLogsParams,
    today: NaiveDate,
) -> Result<HistoryResponse<HabitLog>, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    let range = resolve_history_range(params.start_date.as_deref(), params.end_date.as_deref(), today)?;
    storage.get_user(&user_id)?;

    let habit_id = match params.habit_id.as_deref() {
        Some(raw) => {
            let habit_id = parse_habit_id(raw)?;
            let habit = storage.get_habit(&habit_id)?;
            // Someone else's habit looks the same as a missing one
            if habit.user_id != user_id {
                return Err(ToolError::Storage(StorageError::HabitNotFound {
                    habit_id: habit_id.to_string(),
                }));
            }
            Some(habit_id)
        }
        None => None,
    };

    let mut logs = storage.get_habit_logs(&user_id, range)?;
    if let Some(habit_id) = &habit_id {
        logs.retain(|log| &log.habit_id == habit_id);
    }
    logs.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.habit_id.cmp(&b.habit_id)));

    tracing::debug!("Read {} habit logs for user {} over {}", logs.len(), user_id, range);
    Ok(HistoryResponse::new(range, logs))
}

/// Mood check-ins for the user
pub fn list_mood_entries<S: EventStore + EventLog + ?Sized>(
    storage: &S,
    params: HistoryParams,
    today: NaiveDate,
) -> Result<HistoryResponse<MoodEntry>, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    let range = resolve_history_range(params.start_date.as_deref(), params.end_date.as_deref(), today)?;
    storage.get_user(&user_id)?;

    let mut entries = storage.get_mood_entries(&user_id, range)?;
    entries.sort_by(|a, b| b.date.cmp(&a.date));

    tracing::debug!("Read {} mood entries for user {} over {}", entries.len(), user_id, range);
    Ok(HistoryResponse::new(range, entries))
}

/// Focus sessions for the user
pub fn list_focus_sessions<S: EventStore + EventLog + ?Sized>(
    storage: &S,
    params: HistoryParams,
    today: NaiveDate,
) -> Result<HistoryResponse<FocusSession>, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    let range = resolve_history_range(params.start_date.as_deref(), params.end_date.as_deref(), today)?;
    storage.get_user(&user_id)?;

    let mut sessions = storage.get_focus_sessions(&user_id, range)?;
    sessions.sort_by(|a, b| b.date.cmp(&a.date));

    tracing::debug!("Read {} focus sessions for user {} over {}", sessions.len(), user_id, range);
    Ok(HistoryResponse::new(range, sessions))
}
