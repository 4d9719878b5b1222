/// Tool for creating new habits
///
/// This module implements the habit_create MCP tool.

use serde::{Deserialize, Serialize};
use crate::domain::{Frequency, Habit};
use crate::storage::EventLog;
use crate::tools::{parse_user_id, ToolError};

/// Parameters for creating a new habit
#[derive(Debug, Deserialize)]
pub struct CreateHabitParams {
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub frequency: Option<String>, // Parsed to Frequency, defaults to daily
    pub color: Option<String>,
    pub icon: Option<String>,
    pub target_per_week: Option<u8>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub success: bool,
    pub habit_id: Option<String>,
    pub message: String,
}

/// Create a new habit using the provided storage
pub fn create_habit<S: EventLog + ?Sized>(
    storage: &S,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;

    let frequency = match params.frequency.as_deref() {
        Some(raw) => Frequency::parse(raw)?,
        None => Frequency::Daily,
    };

    let habit = Habit::new(
        user_id,
        params.name,
        params.description,
        frequency,
        params.target_per_week,
        params.color,
        params.icon,
    )?;

    // Fails with UserNotFound for an unknown owner
    storage.create_habit(&habit)?;

    tracing::info!("Created habit {} ({}) for user {}", habit.id, habit.name, habit.user_id);

    Ok(CreateHabitResponse {
        success: true,
        habit_id: Some(habit.id.to_string()),
        message: format!("✅ Created habit '{}'! Ready to start your streak!", habit.name),
    })
}
