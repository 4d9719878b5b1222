/// Tool for recording focus sessions
///
/// This module implements the focus_log MCP tool. Sessions are appended;
/// several sessions on the same day all count.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::domain::FocusSession;
use crate::storage::EventLog;
use crate::tools::{parse_user_id, resolve_log_date, ToolError};

/// Parameters for recording a focus session
#[derive(Debug, Deserialize)]
pub struct LogFocusParams {
    pub user_id: String,
    pub task_name: String,
    pub duration_minutes: u32,
    pub date: Option<String>,
    pub completed: Option<bool>, // Defaults to true
}

/// Response from recording a focus session
#[derive(Debug, Serialize)]
pub struct LogFocusResponse {
    pub success: bool,
    pub session_id: String,
    pub message: String,
}

/// Append a focus session
pub fn log_focus<S: EventLog + ?Sized>(
    storage: &S,
    params: LogFocusParams,
    today: NaiveDate,
) -> Result<LogFocusResponse, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    let date = resolve_log_date(params.date.as_deref(), today)?;

    let session = FocusSession::new(
        user_id,
        params.task_name,
        date,
        params.duration_minutes,
        params.completed.unwrap_or(true),
    )?;
    storage.append_focus_session(&session)?;

    tracing::debug!(
        "Recorded {} focus minutes for user {} on {}",
        session.duration_minutes,
        session.user_id,
        session.date
    );

    Ok(LogFocusResponse {
        success: true,
        session_id: session.id.to_string(),
        message: format!(
            "⏱️ Logged {} minutes on '{}' for {}",
            session.duration_minutes, session.task_name, session.date
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DateRange, User, UserId};
    use crate::storage::{EventStore, MemoryStore};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn params(user_id: &UserId, minutes: u32) -> LogFocusParams {
        LogFocusParams {
            user_id: user_id.to_string(),
            task_name: "Write report".to_string(),
            duration_minutes: minutes,
            date: None,
            completed: None,
        }
    }

    #[test]
    fn test_sessions_accumulate() {
        let store = MemoryStore::new();
        let user = User::new("Sam".to_string()).unwrap();
        store.create_user(&user).unwrap();

        log_focus(&store, params(&user.id, 25), today()).unwrap();
        log_focus(&store, params(&user.id, 50), today()).unwrap();

        let range = DateRange::spanning(today(), today());
        assert_eq!(store.get_focus_sessions(&user.id, range).unwrap().len(), 2);
        assert_eq!(store.get_previous_window_focus_total(&user.id, range).unwrap(), 75);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let store = MemoryStore::new();
        let result = log_focus(&store, params(&UserId::new(), 0), today());

        assert!(matches!(result, Err(ToolError::InvalidParams(_))));
    }
}
