/// User entity
///
/// Authentication lives outside this crate; a user here is only an owner
/// that habits and logs hang off, and the identity the engine resolves.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{UserId, DomainError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Display name shown by clients
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a validated display name
    pub fn new(name: String) -> Result<Self, DomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.len() > 100 {
            return Err(DomainError::Validation {
                message: "User name must be 1-100 characters".to_string(),
            });
        }

        Ok(Self {
            id: UserId::new(),
            name: trimmed.to_string(),
            created_at: Utc::now(),
        })
    }

    /// Rebuild a user loaded from storage
    pub fn from_existing(id: UserId, name: String, created_at: DateTime<Utc>) -> Self {
        Self { id, name, created_at }
    }
}
