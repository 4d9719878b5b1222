/// Habit entity and related functionality
///
/// This module defines the Habit struct that represents something a user
/// wants to do regularly, along with its validation rules. Habits are never
/// hard-deleted: archiving one removes it from every aggregation.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{Frequency, HabitId, UserId, DomainError};

/// Default color tag for new habits
pub const DEFAULT_COLOR: &str = "#3f8cff";
/// Default icon tag for new habits
pub const DEFAULT_ICON: &str = "checkmark-circle";

/// A habit the user wants to track
///
/// Only the owner-facing presentation fields (name, description, color,
/// icon) and the archived flag change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Owning user
    pub user_id: UserId,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// How often this habit should be performed
    pub frequency: Frequency,
    /// Intended completions per week (1-7)
    pub target_per_week: u8,
    /// Color tag used by clients
    pub color: String,
    /// Icon tag used by clients
    pub icon: String,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
    /// Soft-delete marker; archived habits are excluded from analytics
    pub archived: bool,
}

impl Habit {
    /// Create a new habit with validation
    ///
    /// Color and icon fall back to the defaults when not given.
    pub fn new(
        user_id: UserId,
        name: String,
        description: Option<String>,
        frequency: Frequency,
        target_per_week: Option<u8>,
        color: Option<String>,
        icon: Option<String>,
    ) -> Result<Self, DomainError> {
        let target_per_week = target_per_week.unwrap_or(7);
        let color = color.unwrap_or_else(|| DEFAULT_COLOR.to_string());
        let icon = icon.unwrap_or_else(|| DEFAULT_ICON.to_string());

        Self::validate_name(&name)?;
        Self::validate_description(&description)?;
        Self::validate_target(target_per_week)?;
        Self::validate_tag("Color", &color)?;
        Self::validate_tag("Icon", &icon)?;

        Ok(Self {
            id: HabitId::new(),
            user_id,
            name: name.trim().to_string(),
            description,
            frequency,
            target_per_week,
            color,
            icon,
            created_at: Utc::now(),
            archived: false,
        })
    }

    /// Create a habit from existing data (used when loading from database)
    ///
    /// This constructor assumes data is already validated.
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: HabitId,
        user_id: UserId,
        name: String,
        description: Option<String>,
        frequency: Frequency,
        target_per_week: u8,
        color: String,
        icon: String,
        created_at: DateTime<Utc>,
        archived: bool,
    ) -> Self {
        Self {
            id,
            user_id,
            name,
            description,
            frequency,
            target_per_week,
            color,
            icon,
            created_at,
            archived,
        }
    }

    /// Apply owner edits with validation
    ///
    /// Nothing is applied unless every supplied value is valid.
    pub fn update(
        &mut self,
        name: Option<String>,
        description: Option<Option<String>>,
        color: Option<String>,
        icon: Option<String>,
        archived: Option<bool>,
    ) -> Result<(), DomainError> {
        if let Some(ref new_name) = name {
            Self::validate_name(new_name)?;
        }
        if let Some(ref new_desc) = description {
            Self::validate_description(new_desc)?;
        }
        if let Some(ref new_color) = color {
            Self::validate_tag("Color", new_color)?;
        }
        if let Some(ref new_icon) = icon {
            Self::validate_tag("Icon", new_icon)?;
        }

        if let Some(new_name) = name {
            self.name = new_name.trim().to_string();
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        if let Some(new_color) = color {
            self.color = new_color;
        }
        if let Some(new_icon) = icon {
            self.icon = new_icon;
        }
        if let Some(new_archived) = archived {
            self.archived = new_archived;
        }

        Ok(())
    }

    // Validation helper methods

    fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if trimmed.len() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(())
    }

    fn validate_description(description: &Option<String>) -> Result<(), DomainError> {
        if let Some(desc) = description {
            if desc.len() > 500 {
                return Err(DomainError::Validation {
                    message: "Description cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }

    fn validate_target(target_per_week: u8) -> Result<(), DomainError> {
        if target_per_week == 0 || target_per_week > 7 {
            return Err(DomainError::InvalidValue {
                message: format!("Target per week must be 1-7, got {}", target_per_week)
            });
        }
        Ok(())
    }

    fn validate_tag(label: &str, value: &str) -> Result<(), DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.len() > 50 {
            return Err(DomainError::InvalidValue {
                message: format!("{} must be 1-50 characters", label)
            });
        }
        Ok(())
    }
}
