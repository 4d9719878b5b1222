/// Tool for logging habit completions
///
/// This module implements the habit_log MCP tool. A habit has at most one
/// log per day; logging the same day again replaces it. The streak in the
/// response comes from the same calculator the analytics engine uses.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::analytics::aggregate::latest_habit_logs;
use crate::analytics::streak_history;
use crate::domain::{Habit, HabitLog, Streak};
use crate::storage::{EventLog, EventStore, StorageError};
use crate::tools::{parse_habit_id, resolve_log_date, ToolError};

/// Parameters for logging a habit
#[derive(Debug, Deserialize)]
pub struct LogHabitParams {
    pub habit_id: String,
    pub date: Option<String>, // Optional date, defaults to today
    pub completed: Option<bool>, // Defaults to true
    pub notes: Option<String>,
}

/// Response from logging a habit
#[derive(Debug, Serialize)]
pub struct LogHabitResponse {
    pub success: bool,
    pub message: String,
    pub current_streak: Option<u32>,
}

/// Current streak for one habit as of `today`
fn current_streak<S: EventStore + ?Sized>(
    storage: &S,
    habit: &Habit,
    today: NaiveDate,
) -> Result<Streak, StorageError> {
    let logs = streak_history(storage, &habit.user_id, std::slice::from_ref(habit), today)?;
    Ok(Streak::calculate(habit.id.clone(), latest_habit_logs(&logs), today))
}

/// Log a habit for a day using the provided storage
pub fn log_habit<S: EventStore + EventLog + ?Sized>(
    storage: &S,
    params: LogHabitParams,
    today: NaiveDate,
) -> Result<LogHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = storage.get_habit(&habit_id)?;

    if habit.archived {
        return Err(ToolError::InvalidParams(format!(
            "Habit '{}' is archived; restore it before logging",
            habit.name
        )));
    }

    let date = resolve_log_date(params.date.as_deref(), today)?;
    let completed = params.completed.unwrap_or(true);

    let log = HabitLog::new(habit_id, date, completed, params.notes)?;
    let stored = storage.upsert_habit_log(&log)?;

    let streak = current_streak(storage, &habit, today)?;

    tracing::debug!(
        "Logged habit {} on {} (completed: {}), streak now {}",
        habit.id,
        stored.date,
        stored.completed,
        streak.current_streak
    );

    let message = if stored.completed {
        format!(
            "🔥 Logged '{}' for {}! Current streak: {} day{}\n{}",
            habit.name,
            stored.date,
            streak.current_streak,
            if streak.current_streak == 1 { "" } else { "s" },
            streak.motivational_message()
        )
    } else {
        format!(
            "📝 Marked '{}' as not done for {}. Current streak: {} day{}",
            habit.name,
            stored.date,
            streak.current_streak,
            if streak.current_streak == 1 { "" } else { "s" }
        )
    };

    Ok(LogHabitResponse {
        success: true,
        message,
        current_streak: Some(streak.current_streak),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use crate::analytics::AnalyticsEngine;
    use crate::domain::{DateRange, Frequency, User};
    use crate::storage::MemoryStore;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn setup() -> (MemoryStore, Habit) {
        let store = MemoryStore::new();
        let user = User::new("Sam".to_string()).unwrap();
        store.create_user(&user).unwrap();
        let mut habit =
            Habit::new(user.id, "Stretch".to_string(), None, Frequency::Daily, None, None, None).unwrap();
        habit.created_at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        store.create_habit(&habit).unwrap();
        (store, habit)
    }

    fn params(habit: &Habit, date: Option<NaiveDate>, completed: Option<bool>) -> LogHabitParams {
        LogHabitParams {
            habit_id: habit.id.to_string(),
            date: date.map(|d| d.to_string()),
            completed,
            notes: None,
        }
    }

    #[test]
    fn test_streak_grows_with_consecutive_days() {
        let (store, habit) = setup();
        for days_ago in (0..3).rev() {
            log_habit(&store, params(&habit, Some(today() - Duration::days(days_ago)), None), today()).unwrap();
        }

        let response = log_habit(&store, params(&habit, None, None), today()).unwrap();
        assert_eq!(response.current_streak, Some(3));
        assert!(response.message.contains("3 days"));
    }

    #[test]
    fn test_backfill_before_creation_matches_engine() {
        let (store, mut habit) = setup();
        habit.created_at = Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap();
        store.update_habit(&habit).unwrap();

        let mut response = None;
        for days_ago in (0..10).rev() {
            let date = today() - Duration::days(days_ago);
            response = Some(log_habit(&store, params(&habit, Some(date), None), today()).unwrap());
        }

        let report = AnalyticsEngine::new().compute(&store, &habit.user_id, today()).unwrap();
        assert_eq!(response.unwrap().current_streak, Some(10));
        assert_eq!(report.habit_streaks["Stretch"], 10);
    }

    #[test]
    fn test_relog_same_day_replaces() {
        let (store, habit) = setup();
        log_habit(&store, params(&habit, None, None), today()).unwrap();
        let response = log_habit(&store, params(&habit, None, Some(false)), today()).unwrap();

        assert_eq!(response.current_streak, Some(0));
        let range = DateRange::spanning(today(), today());
        assert_eq!(store.get_habit_logs(&habit.user_id, range).unwrap().len(), 1);
    }

    #[test]
    fn test_future_date_rejected() {
        let (store, habit) = setup();
        let tomorrow = today() + Duration::days(1);
        let result = log_habit(&store, params(&habit, Some(tomorrow), None), today());

        assert!(matches!(result, Err(ToolError::InvalidParams(_))));
    }

    #[test]
    fn test_archived_habit_rejected() {
        let (store, mut habit) = setup();
        habit.archived = true;
        store.update_habit(&habit).unwrap();

        assert!(log_habit(&store, params(&habit, None, None), today()).is_err());
    }
}
