/// Weekly aggregation and chart series
///
/// `WindowedLogs` restricts the raw snapshot to the rolling window once:
/// out-of-window rows are dropped, same-day duplicates of upserted records
/// collapse to the latest write, and logs for archived or unknown habits are
/// ignored. Every statistic and chart below is computed from that view, so
/// the results do not depend on input order.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::window::{bucket_by_date, DateWindow, WINDOW_DAYS};
use crate::domain::{FocusSession, Habit, HabitId, HabitLog, MoodEntry};

/// Scalar summary of the rolling window
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeeklyStats {
    /// Completed habit-days in the window
    pub total_habits_completed: u32,
    pub total_focus_minutes: u64,
    /// Mean mood level, 0 when there are no entries
    pub average_mood: f64,
    /// Mean sleep hours, 0 when there are no entries
    pub average_sleep: f64,
    /// Completed habit-days as a percentage of all possible habit-days
    pub habit_completion_rate: f64,
    /// Mean energy level, 0 when there are no entries
    pub average_energy: f64,
}

/// One mood chart point; days without an entry have no point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodPoint {
    pub date: NaiveDate,
    pub mood: u8,
    pub energy: u8,
}

/// Focus minutes on one day; days without sessions have no point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusPoint {
    pub date: NaiveDate,
    pub minutes: u64,
}

/// The snapshot restricted to the window
#[derive(Debug)]
pub struct WindowedLogs<'a> {
    pub window: DateWindow,
    /// Non-archived habits, one per id
    pub habits: Vec<&'a Habit>,
    /// Completed logs of those habits, one per (habit, day)
    pub completed_logs: Vec<&'a HabitLog>,
    /// One entry per day, ascending by date
    pub mood_entries: Vec<&'a MoodEntry>,
    /// Every session in the window
    pub focus_sessions: Vec<&'a FocusSession>,
}

impl<'a> WindowedLogs<'a> {
    pub fn new(
        window: DateWindow,
        habits: &'a [Habit],
        habit_logs: &'a [HabitLog],
        mood_entries: &'a [MoodEntry],
        focus_sessions: &'a [FocusSession],
    ) -> Self {
        let mut seen = HashSet::new();
        let habits: Vec<&Habit> = habits
            .iter()
            .filter(|h| !h.archived && seen.insert(&h.id))
            .collect();
        let active: HashSet<&HabitId> = habits.iter().map(|h| &h.id).collect();

        let in_scope = habit_logs
            .iter()
            .filter(|l| window.contains(l.date) && active.contains(&l.habit_id));
        let mut completed_logs: Vec<&HabitLog> = latest_habit_logs(in_scope)
            .into_iter()
            .filter(|l| l.completed)
            .collect();
        completed_logs.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.habit_id.cmp(&b.habit_id)));

        let mut latest_moods: HashMap<NaiveDate, &MoodEntry> = HashMap::new();
        for entry in mood_entries.iter().filter(|e| window.contains(e.date)) {
            let slot = latest_moods.entry(entry.date).or_insert(entry);
            if entry.logged_at >= slot.logged_at {
                *slot = entry;
            }
        }
        let mut mood_entries: Vec<&MoodEntry> = latest_moods.into_values().collect();
        mood_entries.sort_by_key(|e| e.date);

        let focus_sessions: Vec<&FocusSession> = focus_sessions
            .iter()
            .filter(|s| window.contains(s.date))
            .collect();

        Self {
            window,
            habits,
            completed_logs,
            mood_entries,
            focus_sessions,
        }
    }

    /// Summed focus minutes for each window day that has sessions
    pub fn daily_focus_minutes(&self) -> HashMap<NaiveDate, u64> {
        let mut daily = HashMap::new();
        for session in &self.focus_sessions {
            *daily.entry(session.date).or_insert(0) += u64::from(session.duration_minutes);
        }
        daily
    }
}

/// Collapse habit logs to one per (habit, day)
///
/// The latest `logged_at` wins, matching the store's upsert rule. Output
/// order is unspecified.
pub fn latest_habit_logs<'a, I>(logs: I) -> Vec<&'a HabitLog>
where
    I: IntoIterator<Item = &'a HabitLog>,
{
    let mut latest: HashMap<(&HabitId, NaiveDate), &HabitLog> = HashMap::new();
    for log in logs {
        let slot = latest.entry((&log.habit_id, log.date)).or_insert(log);
        if log.logged_at >= slot.logged_at {
            *slot = log;
        }
    }
    latest.into_values().collect()
}

/// Arithmetic mean, `None` for an empty set
pub(crate) fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Reduce the windowed logs to `WeeklyStats`
pub fn weekly_stats(data: &WindowedLogs<'_>) -> WeeklyStats {
    let total_habits_completed = data.completed_logs.len() as u32;
    let total_focus_minutes = data
        .focus_sessions
        .iter()
        .map(|s| u64::from(s.duration_minutes))
        .sum();

    let average_mood = mean(data.mood_entries.iter().map(|e| f64::from(e.mood_level))).unwrap_or(0.0);
    let average_energy = mean(data.mood_entries.iter().map(|e| f64::from(e.energy_level))).unwrap_or(0.0);
    let average_sleep = mean(data.mood_entries.iter().map(|e| e.sleep_hours)).unwrap_or(0.0);

    let possible = data.habits.len() * WINDOW_DAYS;
    let habit_completion_rate = if possible == 0 {
        0.0
    } else {
        (f64::from(total_habits_completed) / possible as f64 * 100.0).clamp(0.0, 100.0)
    };

    WeeklyStats {
        total_habits_completed,
        total_focus_minutes,
        average_mood,
        average_sleep,
        habit_completion_rate,
        average_energy,
    }
}

/// Per-day mood series for the window, ascending
pub fn mood_chart(data: &WindowedLogs<'_>) -> Vec<MoodPoint> {
    data.mood_entries
        .iter()
        .map(|e| MoodPoint {
            date: e.date,
            mood: e.mood_level,
            energy: e.energy_level,
        })
        .collect()
}

/// Per-day focus totals for the window, ascending
pub fn focus_chart(data: &WindowedLogs<'_>) -> Vec<FocusPoint> {
    let buckets = bucket_by_date(&data.focus_sessions, |s| s.date);

    data.window
        .days()
        .iter()
        .filter_map(|day| {
            buckets.get(day).map(|sessions| FocusPoint {
                date: *day,
                minutes: sessions.iter().map(|s| u64::from(s.duration_minutes)).sum(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use crate::domain::{Frequency, UserId};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn day(days_ago: i64) -> NaiveDate {
        today() - Duration::days(days_ago)
    }

    fn habit(user_id: &UserId, name: &str) -> Habit {
        Habit::new(user_id.clone(), name.to_string(), None, Frequency::Daily, None, None, None).unwrap()
    }

    fn mood(user_id: &UserId, days_ago: i64, level: u8, sleep: f64) -> MoodEntry {
        MoodEntry::new(user_id.clone(), day(days_ago), level, 3, sleep, None).unwrap()
    }

    fn focus(user_id: &UserId, days_ago: i64, minutes: u32) -> FocusSession {
        FocusSession::new(user_id.clone(), "Deep work".to_string(), day(days_ago), minutes, true).unwrap()
    }

    fn stats_for(
        habits: &[Habit],
        logs: &[HabitLog],
        moods: &[MoodEntry],
        sessions: &[FocusSession],
    ) -> WeeklyStats {
        let data = WindowedLogs::new(DateWindow::ending(today()), habits, logs, moods, sessions);
        weekly_stats(&data)
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let stats = stats_for(&[], &[], &[], &[]);
        assert_eq!(stats, WeeklyStats::default());
    }

    #[test]
    fn test_average_mood_over_four_days() {
        let user = UserId::new();
        let moods = vec![
            mood(&user, 0, 3, 6.0),
            mood(&user, 2, 3, 7.0),
            mood(&user, 4, 4, 8.0),
            mood(&user, 6, 5, 9.0),
        ];
        let stats = stats_for(&[], &[], &moods, &[]);

        assert_eq!(stats.average_mood, 3.75);
        assert_eq!(stats.average_sleep, 7.5);
        assert_eq!(stats.average_energy, 3.0);
    }

    #[test]
    fn test_full_week_is_one_hundred_percent() {
        let user = UserId::new();
        let habits = vec![habit(&user, "Read"), habit(&user, "Run")];
        let logs: Vec<HabitLog> = habits
            .iter()
            .flat_map(|h| (0..7).map(move |d| HabitLog::new(h.id.clone(), day(d), true, None).unwrap()))
            .collect();

        let stats = stats_for(&habits, &logs, &[], &[]);
        assert_eq!(stats.total_habits_completed, 14);
        assert_eq!(stats.habit_completion_rate, 100.0);
    }

    #[test]
    fn test_filters_out_of_window_duplicate_and_archived() {
        let user = UserId::new();
        let read = habit(&user, "Read");
        let mut old = habit(&user, "Old");
        old.archived = true;
        let habits = vec![read.clone(), old.clone()];

        let mut earlier = HabitLog::new(read.id.clone(), day(0), true, None).unwrap();
        earlier.logged_at = Utc::now() - Duration::hours(2);
        let mut later = HabitLog::new(read.id.clone(), day(0), false, None).unwrap();
        later.logged_at = Utc::now();

        let logs = vec![
            later,
            earlier,
            HabitLog::new(read.id.clone(), day(1), true, None).unwrap(),
            HabitLog::new(read.id.clone(), day(1), true, None).unwrap(),
            HabitLog::new(read.id.clone(), day(7), true, None).unwrap(),
            HabitLog::new(old.id.clone(), day(2), true, None).unwrap(),
        ];

        let stats = stats_for(&habits, &logs, &[], &[]);
        // Only day 1 survives: day 0 was overwritten as not completed
        assert_eq!(stats.total_habits_completed, 1);
        let expected_rate = 1.0 / 7.0 * 100.0;
        assert!((stats.habit_completion_rate - expected_rate).abs() < 1e-9);
    }

    #[test]
    fn test_focus_sessions_are_summed_not_deduplicated() {
        let user = UserId::new();
        let sessions = vec![
            focus(&user, 0, 25),
            focus(&user, 0, 25),
            focus(&user, 3, 50),
            focus(&user, 8, 500),
        ];
        let stats = stats_for(&[], &[], &[], &sessions);
        assert_eq!(stats.total_focus_minutes, 100);
    }

    #[test]
    fn test_charts_omit_empty_days() {
        let user = UserId::new();
        let moods = vec![mood(&user, 1, 4, 7.0), mood(&user, 5, 2, 5.0)];
        let sessions = vec![focus(&user, 0, 30), focus(&user, 0, 15), focus(&user, 6, 45)];
        let data = WindowedLogs::new(DateWindow::ending(today()), &[], &[], &moods, &sessions);

        let moods = mood_chart(&data);
        assert_eq!(moods.len(), 2);
        assert_eq!(moods[0].date, day(5));
        assert_eq!(moods[1].mood, 4);

        let focus = focus_chart(&data);
        assert_eq!(focus, vec![
            FocusPoint { date: day(6), minutes: 45 },
            FocusPoint { date: day(0), minutes: 45 },
        ]);
    }

    #[test]
    fn test_mean_of_nothing_is_none() {
        assert_eq!(mean(Vec::<f64>::new()), None);
        assert_eq!(mean(vec![1.0, 2.0]), Some(1.5));
    }
}
