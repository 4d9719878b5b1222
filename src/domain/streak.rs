/// Streak calculation
///
/// The single shared implementation of "how many days in a row has this
/// habit been completed, counting back from today". Every caller (the
/// analytics engine, the logging tool) goes through `Streak::calculate` so
/// all views report the same number.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::domain::{HabitId, HabitLog};

/// Calculated streak information for a habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Streak {
    /// Which habit this streak data is for
    pub habit_id: HabitId,
    /// Consecutive completed days ending today
    pub current_streak: u32,
    /// Most recent completed day on or before today
    pub last_completed: Option<NaiveDate>,
    /// Completed days seen in the supplied logs (on or before today)
    pub total_completions: u32,
}

impl Streak {
    /// Create an empty streak record for a habit with no completions
    pub fn new(habit_id: HabitId) -> Self {
        Self {
            habit_id,
            current_streak: 0,
            last_completed: None,
            total_completions: 0,
        }
    }

    /// Calculate streak information for one habit
    ///
    /// Logs for other habits, incomplete logs and logs dated after `today`
    /// are ignored, so callers can pass an unfiltered collection.
    pub fn calculate<'a, I>(habit_id: HabitId, logs: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a HabitLog>,
    {
        let mut dates: Vec<NaiveDate> = logs
            .into_iter()
            .filter(|log| log.habit_id == habit_id && log.completed && log.date <= today)
            .map(|log| log.date)
            .collect();

        // Newest first; a repeated day counts once
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates.dedup();

        Self {
            current_streak: current_streak(&dates, today),
            last_completed: dates.first().copied(),
            total_completions: dates.len() as u32,
            habit_id,
        }
    }

    /// Get a motivational message based on current streak status
    pub fn motivational_message(&self) -> String {
        match self.current_streak {
            0 => "Ready to start your streak! Every journey begins with a single step.".to_string(),
            1 => "Great start! One day down, keep the momentum going.".to_string(),
            2..=6 => format!("Nice work! {} days in a row. You're building a strong habit.", self.current_streak),
            7..=13 => format!("Excellent! {} days strong. You're in the groove now!", self.current_streak),
            14..=29 => format!("Amazing! {} days straight. This is becoming second nature.", self.current_streak),
            30..=99 => format!("Incredible! {} days of consistency. You're a habit master!", self.current_streak),
            _ => format!("Legendary! {} days of unwavering commitment. You're an inspiration!", self.current_streak),
        }
    }
}

/// Count the run of completions ending today
///
/// `dates` must be distinct, sorted newest first, and none after `today`.
/// The i-th most recent completion has to sit exactly `i` days before today;
/// the first mismatch ends the run. A habit not yet done today therefore has
/// a current streak of 0 even if yesterday was completed.
pub fn current_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut streak = 0;

    for (i, date) in dates.iter().enumerate() {
        let days_since_today = (today - *date).num_days();
        if days_since_today != i as i64 {
            break;
        }
        streak += 1;
    }

    streak
}
