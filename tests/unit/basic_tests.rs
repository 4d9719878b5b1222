/// Engine behaviour through the public API, against the in-memory store
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use habit_insights_mcp::*;

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 20).unwrap()
    }

    fn day(days_ago: i64) -> NaiveDate {
        today() - Duration::days(days_ago)
    }

    fn new_user(store: &MemoryStore) -> UserId {
        let user = User::new("Jordan".to_string()).expect("valid user");
        store.create_user(&user).expect("user stored");
        user.id
    }

    fn new_habit(store: &MemoryStore, user_id: &UserId, name: &str) -> Habit {
        let mut habit = Habit::new(user_id.clone(), name.to_string(), None, Frequency::Daily, None, None, None)
            .expect("valid habit");
        habit.created_at = Utc.with_ymd_and_hms(2024, 5, 1, 7, 30, 0).unwrap();
        store.create_habit(&habit).expect("habit stored");
        habit
    }

    fn mark(store: &MemoryStore, habit: &Habit, days_ago: i64, completed: bool) {
        let log = HabitLog::new(habit.id.clone(), day(days_ago), completed, None).unwrap();
        store.upsert_habit_log(&log).unwrap();
    }

    #[test]
    fn test_empty_account_scenario() {
        let store = MemoryStore::new();
        let user_id = new_user(&store);

        let report = AnalyticsEngine::new().compute(&store, &user_id, today()).unwrap();

        assert_eq!(report.weekly_stats.total_habits_completed, 0);
        assert_eq!(report.weekly_stats.total_focus_minutes, 0);
        assert_eq!(report.weekly_stats.average_mood, 0.0);
        assert_eq!(report.weekly_stats.average_sleep, 0.0);
        assert_eq!(report.weekly_stats.habit_completion_rate, 0.0);
        assert!(report.insights.is_empty());
        assert!(report.habit_streaks.is_empty());
    }

    #[test]
    fn test_habit_without_logs_has_zero_streak() {
        let store = MemoryStore::new();
        let user_id = new_user(&store);
        new_habit(&store, &user_id, "Floss");

        let report = AnalyticsEngine::new().compute(&store, &user_id, today()).unwrap();
        assert_eq!(report.habit_streaks["Floss"], 0);
        assert_eq!(report.weekly_stats.habit_completion_rate, 0.0);
    }

    #[test]
    fn test_streak_stops_at_missed_day() {
        let store = MemoryStore::new();
        let user_id = new_user(&store);
        let habit = new_habit(&store, &user_id, "Journal");
        mark(&store, &habit, 0, true);
        mark(&store, &habit, 1, true);
        mark(&store, &habit, 2, true);
        mark(&store, &habit, 3, false);
        mark(&store, &habit, 4, true);

        let report = AnalyticsEngine::new().compute(&store, &user_id, today()).unwrap();
        assert_eq!(report.habit_streaks["Journal"], 3);
        assert_eq!(report.weekly_stats.total_habits_completed, 4);
    }

    #[test]
    fn test_yesterday_only_is_not_a_current_streak() {
        let store = MemoryStore::new();
        let user_id = new_user(&store);
        let habit = new_habit(&store, &user_id, "Walk");
        mark(&store, &habit, 1, true);

        let report = AnalyticsEngine::new().compute(&store, &user_id, today()).unwrap();
        assert_eq!(report.habit_streaks["Walk"], 0);
    }

    #[test]
    fn test_rates_and_averages_stay_in_range() {
        let store = MemoryStore::new();
        let user_id = new_user(&store);
        let habit = new_habit(&store, &user_id, "Water");
        for d in 0..10 {
            mark(&store, &habit, d, true);
        }
        for (d, level, sleep) in [(0, 5, 24.0), (1, 1, 0.0)] {
            let entry = MoodEntry::new(user_id.clone(), day(d), level, level, sleep, None).unwrap();
            store.upsert_mood_entry(&entry).unwrap();
        }

        let stats = AnalyticsEngine::new().compute(&store, &user_id, today()).unwrap().weekly_stats;
        assert!((0.0..=100.0).contains(&stats.habit_completion_rate));
        assert!((1.0..=5.0).contains(&stats.average_mood));
        assert!((0.0..=24.0).contains(&stats.average_sleep));
        assert_eq!(stats.habit_completion_rate, 100.0);
        assert_eq!(stats.average_energy, 3.0);
    }

    #[test]
    fn test_full_report_insight_order() {
        let store = MemoryStore::new();
        let user_id = new_user(&store);
        let habit = new_habit(&store, &user_id, "Yoga");
        for d in 0..5 {
            mark(&store, &habit, d, true);
        }
        for (d, mood, sleep, minutes) in [(0, 5, 8.0, 120), (1, 4, 8.0, 100), (2, 3, 5.5, 30), (3, 2, 6.0, 40)] {
            let entry = MoodEntry::new(user_id.clone(), day(d), mood, 3, sleep, None).unwrap();
            store.upsert_mood_entry(&entry).unwrap();
            let session = FocusSession::new(user_id.clone(), "Study".to_string(), day(d), minutes, true).unwrap();
            store.append_focus_session(&session).unwrap();
        }

        let report = AnalyticsEngine::new().compute(&store, &user_id, today()).unwrap();
        let kinds: Vec<InsightKind> = report.insights.iter().map(|i| i.kind).collect();

        assert_eq!(
            kinds,
            vec![
                InsightKind::SleepFocus,
                InsightKind::HabitStreak,
                InsightKind::MoodTrend,
                InsightKind::FocusProductivity,
            ]
        );
        // rested days average 110 minutes, short nights 35
        assert_eq!(report.insights[0].value, 75.0);
        assert_eq!(report.insights[0].trend, Trend::Up);
        // earlier half [2, 3] vs later half [4, 5]
        assert_eq!(report.insights[2].value, 2.0);
        // no focus in the previous week
        assert_eq!(report.insights[3].value, 100.0);
        assert_eq!(report.focus_chart_data.len(), 4);
    }

    #[test]
    fn test_window_excludes_older_mood_entries() {
        let store = MemoryStore::new();
        let user_id = new_user(&store);
        for (d, level) in [(7, 1), (6, 5)] {
            let entry = MoodEntry::new(user_id.clone(), day(d), level, 3, 7.0, None).unwrap();
            store.upsert_mood_entry(&entry).unwrap();
        }

        let report = AnalyticsEngine::new().compute(&store, &user_id, today()).unwrap();
        assert_eq!(report.weekly_stats.average_mood, 5.0);
        assert_eq!(report.mood_chart_data.len(), 1);
        assert_eq!(report.mood_chart_data[0].date, day(6));
    }

    #[test]
    fn test_date_range_validation() {
        assert!(DateRange::new(day(0), day(1)).is_err());
        assert_eq!(DateRange::new(day(6), day(0)).unwrap().num_days(), 7);
    }
}
