/// SQLite-backed workflows through the tool functions
use chrono::{Duration, NaiveDate};
use habit_insights_mcp::tools::*;
use habit_insights_mcp::*;
use tempfile::{NamedTempFile, TempDir};

#[cfg(test)]
mod basic_integration_tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 20).unwrap()
    }

    fn register(storage: &SqliteStorage) -> String {
        register_user(storage, RegisterUserParams { name: "Robin".to_string() })
            .expect("user registered")
            .user_id
    }

    fn habit(storage: &SqliteStorage, user_id: &str, name: &str) -> String {
        let params = CreateHabitParams {
            user_id: user_id.to_string(),
            name: name.to_string(),
            description: None,
            frequency: None,
            color: None,
            icon: None,
            target_per_week: None,
        };
        create_habit(storage, params).unwrap().habit_id.unwrap()
    }

    fn log(storage: &SqliteStorage, habit_id: &str, date: NaiveDate) -> LogHabitResponse {
        let params = LogHabitParams {
            habit_id: habit_id.to_string(),
            date: Some(date.to_string()),
            completed: None,
            notes: None,
        };
        log_habit(storage, params, today()).unwrap()
    }

    #[tokio::test]
    async fn test_server_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let server = InsightServer::new(temp_file.path().to_path_buf()).await;
        assert!(server.is_ok());
    }

    #[test]
    fn test_week_of_logging_produces_report() {
        let dir = TempDir::new().unwrap();
        let storage = SqliteStorage::new(dir.path().join("insights.db")).unwrap();
        let user_id = register(&storage);
        let habit_id = habit(&storage, &user_id, "Read");

        for d in 0..3 {
            log(&storage, &habit_id, today() - Duration::days(d));
        }

        for (d, mood, sleep) in [(0, 4, 7.5), (1, 4, 6.0), (2, 3, 8.0), (3, 4, 7.0)] {
            let params = LogMoodParams {
                user_id: user_id.clone(),
                mood_level: mood,
                energy_level: 3,
                sleep_hours: sleep,
                date: Some((today() - Duration::days(d)).to_string()),
                notes: None,
            };
            log_mood(&storage, params, today()).unwrap();
        }

        let params = WeeklyInsightsParams {
            user_id: user_id.clone(),
            today: Some(today().to_string()),
        };
        let report = weekly_insights(&storage, &AnalyticsEngine::new(), params, today()).unwrap();

        assert_eq!(report.weekly_stats.total_habits_completed, 3);
        assert_eq!(report.weekly_stats.average_mood, 3.75);
        assert_eq!(report.mood_chart_data.len(), 4);
        assert!(report.insights.iter().any(|i| i.kind == InsightKind::MoodTrend));
    }

    #[test]
    fn test_backfilled_streak_agrees_across_views() {
        // Habits created now, logs dated in the past
        let storage = SqliteStorage::open_in_memory().unwrap();
        let user_id = register(&storage);
        let habit_id = habit(&storage, &user_id, "Sketch");

        let mut last = None;
        for d in (0..10).rev() {
            last = Some(log(&storage, &habit_id, today() - Duration::days(d)));
        }
        assert_eq!(last.unwrap().current_streak, Some(10));

        let user = UserId::from_string(&user_id).unwrap();
        let report = AnalyticsEngine::new().compute(&storage, &user, today()).unwrap();
        assert_eq!(report.habit_streaks["Sketch"], 10);

        let params = ListHabitsParams { user_id: user_id.clone(), include_archived: None };
        let listed = list_habits(&storage, params, today()).unwrap();
        assert_eq!(listed.habits[0].current_streak, 10);
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("insights.db");

        let user_id = {
            let storage = SqliteStorage::new(&db_path).unwrap();
            let user_id = register(&storage);
            let params = LogFocusParams {
                user_id: user_id.clone(),
                task_name: "Taxes".to_string(),
                duration_minutes: 45,
                date: Some(today().to_string()),
                completed: Some(false),
            };
            log_focus(&storage, params, today()).unwrap();
            user_id
        };

        let storage = SqliteStorage::new(&db_path).unwrap();
        let user_id = UserId::from_string(&user_id).unwrap();
        let report = AnalyticsEngine::new().compute(&storage, &user_id, today()).unwrap();

        assert_eq!(report.weekly_stats.total_focus_minutes, 45);
        assert_eq!(report.focus_chart_data[0].minutes, 45);
    }

    #[test]
    fn test_archiving_removes_habit_from_report() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let user_id = register(&storage);
        let keep = habit(&storage, &user_id, "Keep");
        let archived = habit(&storage, &user_id, "Drop");
        log(&storage, &keep, today());
        log(&storage, &archived, today());

        let params = UpdateHabitParams {
            habit_id: archived.clone(),
            name: None,
            description: None,
            color: None,
            icon: None,
            archived: Some(true),
        };
        update_habit(&storage, params).unwrap();

        let user_id = UserId::from_string(&user_id).unwrap();
        let report = AnalyticsEngine::new().compute(&storage, &user_id, today()).unwrap();

        assert_eq!(report.habit_streaks.keys().collect::<Vec<_>>(), vec!["Keep"]);
        assert_eq!(report.weekly_stats.total_habits_completed, 1);
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let result = AnalyticsEngine::new().compute(&storage, &UserId::new(), today());

        assert!(matches!(result, Err(EngineError::NotFound { .. })));
    }
}
