/// Analytics engine for streaks, weekly statistics and insights
///
/// `AnalyticsEngine::compute` is the single entry point. It fetches one
/// immutable snapshot from an `EventStore` and derives everything else from
/// it without further I/O:
///
/// 1. Per-habit streaks (`domain::Streak`)
/// 2. Weekly statistics (`aggregate`)
/// 3. Chart series (`aggregate`)
/// 4. Insights (`insights`)

pub mod aggregate;
pub mod config;
pub mod insights;
pub mod window;

pub use aggregate::{FocusPoint, MoodPoint, WeeklyStats};
pub use config::EngineConfig;
pub use insights::Insight;
pub use window::DateWindow;

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analytics::aggregate::{latest_habit_logs, WindowedLogs};
use crate::analytics::insights::{generate_insights, InsightInputs};
use crate::domain::{FocusSession, Habit, HabitId, HabitLog, MoodEntry, Streak, UserId};
use crate::storage::{EventStore, StorageError};

/// Errors surfaced by `AnalyticsEngine::compute`
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("User not found: {user_id}")]
    NotFound { user_id: String },

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Event store unavailable: {0}")]
    AdapterUnavailable(String),
}

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UserNotFound { user_id } => EngineError::NotFound { user_id },
            StorageError::InvalidRange(message) => EngineError::InvalidRange(message),
            other => EngineError::AdapterUnavailable(other.to_string()),
        }
    }
}

/// Everything a screen needs for one user and one "today"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    pub weekly_stats: WeeklyStats,
    pub insights: Vec<Insight>,
    /// Current streak per active habit, keyed by habit name
    pub habit_streaks: BTreeMap<String, u32>,
    pub mood_chart_data: Vec<MoodPoint>,
    pub focus_chart_data: Vec<FocusPoint>,
}

/// Data fetched from the store for one computation
///
/// Habit logs reach back as far as the longest current streak needs;
/// everything else covers the window only.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub window: DateWindow,
    pub habits: Vec<Habit>,
    pub habit_logs: Vec<HabitLog>,
    pub mood_entries: Vec<MoodEntry>,
    pub focus_sessions: Vec<FocusSession>,
    pub previous_focus_total: u64,
}

impl Snapshot {
    /// Perform the one round of reads a computation needs
    pub fn fetch<S>(store: &S, user_id: &UserId, today: NaiveDate) -> Result<Self, StorageError>
    where
        S: EventStore + ?Sized,
    {
        let window = DateWindow::ending(today);

        // Resolves the user; unknown ids fail here
        let habits = store.get_habits(user_id)?;

        let habit_logs = streak_history(store, user_id, &habits, today)?;
        let mood_entries = store.get_mood_entries(user_id, window.range())?;
        let focus_sessions = store.get_focus_sessions(user_id, window.range())?;
        let previous_focus_total =
            store.get_previous_window_focus_total(user_id, window.previous().range())?;

        tracing::debug!(
            "Fetched snapshot for user {}: {} habits, {} logs, {} mood entries, {} focus sessions",
            user_id,
            habits.len(),
            habit_logs.len(),
            mood_entries.len(),
            focus_sessions.len()
        );

        Ok(Self {
            window,
            habits,
            habit_logs,
            mood_entries,
            focus_sessions,
            previous_focus_total,
        })
    }
}

/// Stateless engine; one instance can serve any number of requests
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    config: EngineConfig,
}

impl AnalyticsEngine {
    /// Create an engine with the default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute the report for `user_id` with the window ending on `today`
    pub fn compute<S>(&self, store: &S, user_id: &UserId, today: NaiveDate) -> Result<InsightReport, EngineError>
    where
        S: EventStore + ?Sized,
    {
        let snapshot = Snapshot::fetch(store, user_id, today)?;
        Ok(self.analyze(&snapshot))
    }

    /// Derive the report from an already fetched snapshot
    pub fn analyze(&self, snapshot: &Snapshot) -> InsightReport {
        let today = snapshot.window.today();
        let data = WindowedLogs::new(
            snapshot.window,
            &snapshot.habits,
            &snapshot.habit_logs,
            &snapshot.mood_entries,
            &snapshot.focus_sessions,
        );

        let habit_streaks = habit_streaks(&data.habits, &snapshot.habit_logs, today);
        let weekly_stats = aggregate::weekly_stats(&data);
        let mood_chart_data = aggregate::mood_chart(&data);
        let focus_chart_data = aggregate::focus_chart(&data);

        let streaks: Vec<(String, u32)> = habit_streaks
            .iter()
            .map(|(name, streak)| (name.clone(), *streak))
            .collect();
        let insights = generate_insights(
            &InsightInputs {
                data: &data,
                stats: &weekly_stats,
                streaks: &streaks,
                previous_focus_total: snapshot.previous_focus_total,
            },
            &self.config,
        );

        tracing::debug!(
            "Computed report for {}: {} completions, {:.1}% rate, {} insights",
            snapshot.window.range(),
            weekly_stats.total_habits_completed,
            weekly_stats.habit_completion_rate,
            insights.len()
        );

        InsightReport {
            weekly_stats,
            insights,
            habit_streaks,
            mood_chart_data,
            focus_chart_data,
        }
    }
}

/// Habit logs deep enough to count every current streak of `habits`
///
/// Starts with the window ending `today` and steps back one week at a time
/// while some habit has been completed on every fetched day. Reads grow with
/// the longest streak, not with the account's history, and ignore when a
/// habit was created so backfilled days count.
pub fn streak_history<S>(
    store: &S,
    user_id: &UserId,
    habits: &[Habit],
    today: NaiveDate,
) -> Result<Vec<HabitLog>, StorageError>
where
    S: EventStore + ?Sized,
{
    let mut chunk = DateWindow::ending(today);
    let mut logs = store.get_habit_logs(user_id, chunk.range())?;

    while runs_reach(habits, &logs, today, chunk.start()) {
        chunk = chunk.previous();
        let older = store.get_habit_logs(user_id, chunk.range())?;
        if older.is_empty() {
            break;
        }
        logs.extend(older);
    }
    Ok(logs)
}

/// Whether any habit was completed on every day from `earliest` to `today`
fn runs_reach(habits: &[Habit], logs: &[HabitLog], today: NaiveDate, earliest: NaiveDate) -> bool {
    let span = (today - earliest).num_days() + 1;
    let latest = latest_habit_logs(logs);
    habits.iter().any(|habit| {
        let streak = Streak::calculate(habit.id.clone(), latest.iter().copied(), today);
        i64::from(streak.current_streak) >= span
    })
}

/// Current streak per habit name
///
/// Logs are grouped by habit in one pass. Two habits sharing a name report
/// the larger streak.
fn habit_streaks(habits: &[&Habit], logs: &[HabitLog], today: NaiveDate) -> BTreeMap<String, u32> {
    let mut by_habit: HashMap<&HabitId, Vec<&HabitLog>> = HashMap::new();
    for log in latest_habit_logs(logs) {
        by_habit.entry(&log.habit_id).or_default().push(log);
    }

    let mut streaks = BTreeMap::new();
    for habit in habits {
        let logs = by_habit.get(&habit.id).map(Vec::as_slice).unwrap_or(&[]);
        let streak = Streak::calculate(habit.id.clone(), logs.iter().copied(), today);

        let entry = streaks.entry(habit.name.clone()).or_insert(0);
        *entry = (*entry).max(streak.current_streak);
    }
    streaks
}
