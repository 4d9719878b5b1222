/// Tool for the weekly insights report
///
/// This module implements the weekly_insights MCP tool, a thin wrapper
/// around `AnalyticsEngine::compute`.

use serde::Deserialize;
use chrono::NaiveDate;
use crate::analytics::{AnalyticsEngine, InsightReport};
use crate::domain::parse_date;
use crate::storage::EventStore;
use crate::tools::{parse_user_id, ToolError};

/// Parameters for the weekly report
#[derive(Debug, Deserialize)]
pub struct WeeklyInsightsParams {
    pub user_id: String,
    /// Last day of the window (YYYY-MM-DD), defaults to the current date
    pub today: Option<String>,
}

/// Compute the weekly report for a user
pub fn weekly_insights<S: EventStore + ?Sized>(
    storage: &S,
    engine: &AnalyticsEngine,
    params: WeeklyInsightsParams,
    current_date: NaiveDate,
) -> Result<InsightReport, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    let today = match params.today.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => current_date,
    };

    Ok(engine.compute(storage, &user_id, today)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::EngineError;
    use crate::domain::{User, UserId};
    use crate::storage::{EventLog, MemoryStore};

    fn current_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_explicit_today_overrides_current_date() {
        let store = MemoryStore::new();
        let user = User::new("Sam".to_string()).unwrap();
        store.create_user(&user).unwrap();

        let params = WeeklyInsightsParams {
            user_id: user.id.to_string(),
            today: Some("2024-02-01".to_string()),
        };
        let report = weekly_insights(&store, &AnalyticsEngine::new(), params, current_date()).unwrap();
        assert!(report.insights.is_empty());
    }

    #[test]
    fn test_unknown_user_surfaces_not_found() {
        let store = MemoryStore::new();
        let params = WeeklyInsightsParams {
            user_id: UserId::new().to_string(),
            today: None,
        };
        let result = weekly_insights(&store, &AnalyticsEngine::new(), params, current_date());

        assert!(matches!(result, Err(ToolError::Engine(EngineError::NotFound { .. }))));
    }

    #[test]
    fn test_bad_today_is_invalid_params() {
        let store = MemoryStore::new();
        let params = WeeklyInsightsParams {
            user_id: UserId::new().to_string(),
            today: Some("15/03/2024".to_string()),
        };
        let result = weekly_insights(&store, &AnalyticsEngine::new(), params, current_date());

        assert!(matches!(result, Err(ToolError::InvalidParams(_))));
    }
}
