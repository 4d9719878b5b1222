/// Tool for updating existing habits
///
/// This module implements the habit_update MCP tool. Archiving a habit is a
/// soft delete: its logs stay in storage but it drops out of every insight.

use serde::{Deserialize, Serialize};
use crate::storage::EventLog;
use crate::tools::{parse_habit_id, ToolError};

/// Parameters for updating an existing habit
#[derive(Debug, Deserialize)]
pub struct UpdateHabitParams {
    pub habit_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub archived: Option<bool>,
}

/// Response from updating a habit
#[derive(Debug, Serialize)]
pub struct UpdateHabitResponse {
    pub success: bool,
    pub message: String,
}

/// Update an existing habit using the provided storage
pub fn update_habit<S: EventLog + ?Sized>(
    storage: &S,
    params: UpdateHabitParams,
) -> Result<UpdateHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let mut habit = storage.get_habit(&habit_id)?;

    habit.update(
        params.name,
        params.description.map(Some), // Wrap in Option for the method signature
        params.color,
        params.icon,
        params.archived,
    )?;

    storage.update_habit(&habit)?;

    let message = match params.archived {
        Some(true) => format!("🗄️ Archived habit '{}'", habit.name),
        Some(false) => format!("▶️ Restored habit '{}'", habit.name),
        None => format!("✅ Updated habit '{}'", habit.name),
    };

    Ok(UpdateHabitResponse {
        success: true,
        message,
    })
}
