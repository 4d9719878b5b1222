/// Tool for registering users
///
/// This module implements the user_register MCP tool.

use serde::{Deserialize, Serialize};
use crate::domain::User;
use crate::storage::EventLog;
use crate::tools::ToolError;

/// Parameters for registering a user
#[derive(Debug, Deserialize)]
pub struct RegisterUserParams {
    pub name: String,
}

/// Response from registering a user
#[derive(Debug, Serialize)]
pub struct RegisterUserResponse {
    pub success: bool,
    pub user_id: String,
    pub message: String,
}

/// Register a new user using the provided storage
pub fn register_user<S: EventLog + ?Sized>(
    storage: &S,
    params: RegisterUserParams,
) -> Result<RegisterUserResponse, ToolError> {
    let user = User::new(params.name)?;
    storage.create_user(&user)?;

    tracing::info!("Registered user {}", user.id);

    Ok(RegisterUserResponse {
        success: true,
        user_id: user.id.to_string(),
        message: format!("👋 Welcome, {}!", user.name),
    })
}
