/// Tool for listing a user's habits
///
/// This module implements the habit_list MCP tool. It is also how clients
/// get habit IDs back after `habit_create`.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::analytics::aggregate::latest_habit_logs;
use crate::analytics::streak_history;
use crate::domain::{Habit, Streak};
use crate::storage::{EventLog, EventStore};
use crate::tools::{parse_user_id, ToolError};

/// Parameters for listing habits
#[derive(Debug, Deserialize)]
pub struct ListHabitsParams {
    pub user_id: String,
    pub include_archived: Option<bool>, // Defaults to false
}

/// Information about a habit in the list
#[derive(Debug, Serialize)]
pub struct HabitSummary {
    pub habit_id: String,
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub target_per_week: u8,
    pub color: String,
    pub icon: String,
    pub created_at: String,
    pub archived: bool,
    pub current_streak: u32,
}

/// Summary counts for the listed habits
#[derive(Debug, Serialize)]
pub struct HabitListSummary {
    pub total_habits: u32,
    pub active_habits: u32,
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitSummary>,
    pub summary: HabitListSummary,
}

/// List a user's habits, oldest first, with their current streaks
pub fn list_habits<S: EventStore + EventLog + ?Sized>(
    storage: &S,
    params: ListHabitsParams,
    today: NaiveDate,
) -> Result<ListHabitsResponse, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    let include_archived = params.include_archived.unwrap_or(false);

    let habits = storage.list_habits(&user_id, include_archived)?;

    // Archived habits report no streak, as in the weekly report
    let active: Vec<Habit> = habits.iter().filter(|h| !h.archived).cloned().collect();
    let history = streak_history(storage, &user_id, &active, today)?;
    let latest = latest_habit_logs(&history);

    let summaries: Vec<HabitSummary> = habits
        .into_iter()
        .map(|habit| {
            let current_streak = if habit.archived {
                0
            } else {
                Streak::calculate(habit.id.clone(), latest.iter().copied(), today).current_streak
            };
            HabitSummary {
                habit_id: habit.id.to_string(),
                frequency: habit.frequency.as_str().to_string(),
                created_at: habit.created_at.to_rfc3339(),
                name: habit.name,
                description: habit.description,
                target_per_week: habit.target_per_week,
                color: habit.color,
                icon: habit.icon,
                archived: habit.archived,
                current_streak,
            }
        })
        .collect();

    tracing::debug!("Listed {} habits for user {}", summaries.len(), user_id);

    Ok(ListHabitsResponse {
        summary: HabitListSummary {
            total_habits: summaries.len() as u32,
            active_habits: active.len() as u32,
        },
        habits: summaries,
    })
}
