/// Rule-based insight detectors
///
/// Each detector looks at the windowed data and either returns one insight
/// or nothing. Detectors never fail: an unmet precondition just means no
/// insight. Results always come out in `DETECTORS` order.

use serde::{Deserialize, Serialize};

use crate::analytics::aggregate::{mean, WeeklyStats, WindowedLogs};
use crate::analytics::config::EngineConfig;
use crate::domain::{InsightKind, Trend};

/// A derived, displayable observation about the window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub trend: Trend,
    /// Headline number shown next to the insight
    pub value: f64,
}

/// Everything the detectors may look at
pub struct InsightInputs<'a> {
    pub data: &'a WindowedLogs<'a>,
    pub stats: &'a WeeklyStats,
    /// (habit name, current streak) for every active habit
    pub streaks: &'a [(String, u32)],
    /// Focus minutes in the 7 days before the window
    pub previous_focus_total: u64,
}

type Detector = fn(&InsightInputs<'_>, &EngineConfig) -> Option<Insight>;

/// Detectors in emission order
const DETECTORS: [Detector; 4] = [sleep_focus, habit_streak, mood_trend, focus_productivity];

/// Run every detector and collect the ones that fired
pub fn generate_insights(inputs: &InsightInputs<'_>, config: &EngineConfig) -> Vec<Insight> {
    DETECTORS
        .iter()
        .filter_map(|detect| detect(inputs, config))
        .collect()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compare focus on days after a rested night with focus on other days
fn sleep_focus(inputs: &InsightInputs<'_>, config: &EngineConfig) -> Option<Insight> {
    let data = inputs.data;
    if data.mood_entries.len() < config.min_sleep_focus_entries
        || data.focus_sessions.len() < config.min_sleep_focus_entries
    {
        return None;
    }

    let daily = data.daily_focus_minutes();
    let (rested, other): (Vec<_>, Vec<_>) = data
        .mood_entries
        .iter()
        .map(|e| (e.sleep_hours >= config.rested_sleep_hours, daily.get(&e.date).copied().unwrap_or(0) as f64))
        .partition(|(rested, _)| *rested);

    let rested_avg = mean(rested.into_iter().map(|(_, minutes)| minutes))?;
    let other_avg = mean(other.into_iter().map(|(_, minutes)| minutes))?;

    let diff = rested_avg - other_avg;
    let band = rested_avg.max(other_avg) * config.flat_band_pct / 100.0;
    let trend = Trend::from_delta(diff, band);

    let hours = config.rested_sleep_hours;
    let (title, description) = match trend {
        Trend::Up => (
            "Sleep Boosts Focus",
            format!("After nights with {}+ hours of sleep you focus {:.0} more minutes a day", hours, diff),
        ),
        Trend::Down => (
            "Focus Despite Short Sleep",
            format!("After nights with {}+ hours of sleep you focus {:.0} fewer minutes a day", hours, -diff),
        ),
        Trend::Flat => (
            "Steady Focus",
            format!("Your focus time is about the same whether or not you sleep {}+ hours", hours),
        ),
    };

    Some(Insight {
        kind: InsightKind::SleepFocus,
        title: title.to_string(),
        description,
        trend,
        value: round1(diff),
    })
}

/// Celebrate the longest running streak
fn habit_streak(inputs: &InsightInputs<'_>, config: &EngineConfig) -> Option<Insight> {
    let (name, streak) = inputs
        .streaks
        .iter()
        .filter(|(_, streak)| *streak >= config.min_streak_for_insight)
        // Longest wins; equal streaks go to the alphabetically first name
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))?;

    Some(Insight {
        kind: InsightKind::HabitStreak,
        title: "Habit Streak".to_string(),
        description: format!("You're on a {}-day streak with {}!", streak, name),
        trend: Trend::Up,
        value: f64::from(*streak),
    })
}

/// Compare the earlier and later halves of the week's mood check-ins
///
/// The halves split the date-sorted check-ins by count, not the window by
/// calendar days, so sparse weeks still compare equal-sized groups.
fn mood_trend(inputs: &InsightInputs<'_>, config: &EngineConfig) -> Option<Insight> {
    let entries = &inputs.data.mood_entries;
    if entries.len() < config.min_mood_trend_entries {
        return None;
    }

    // With an odd count the middle check-in belongs to neither half
    let half = entries.len() / 2;
    let first = mean(entries[..half].iter().map(|e| f64::from(e.mood_level)))?;
    let second = mean(entries[entries.len() - half..].iter().map(|e| f64::from(e.mood_level)))?;

    let delta = second - first;
    let trend = Trend::from_delta(delta, config.mood_epsilon);
    let (title, description) = match trend {
        Trend::Up => (
            "Mood Improving",
            format!("Your mood rose by {:.1} points over the week", delta),
        ),
        Trend::Down => (
            "Mood Dipping",
            format!("Your mood fell by {:.1} points over the week", -delta),
        ),
        Trend::Flat => (
            "Mood Steady",
            format!("Your mood held steady around {:.1}/5 this week", inputs.stats.average_mood),
        ),
    };

    Some(Insight {
        kind: InsightKind::MoodTrend,
        title: title.to_string(),
        description,
        trend,
        value: round1(delta),
    })
}

/// Week-over-week change in total focus time
fn focus_productivity(inputs: &InsightInputs<'_>, config: &EngineConfig) -> Option<Insight> {
    if inputs.data.focus_sessions.len() < config.min_focus_sessions {
        return None;
    }

    let current = inputs.stats.total_focus_minutes as f64;
    let previous = inputs.previous_focus_total as f64;
    let change_pct = if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    };

    let trend = Trend::from_delta(change_pct, 0.0);
    let description = match trend {
        Trend::Up if previous == 0.0 => {
            format!("You logged {:.0} focus minutes this week, up from none last week", current)
        }
        Trend::Up => format!("Focus time is up {:.0}% on last week ({:.0} min)", change_pct, current),
        Trend::Down => format!("Focus time is down {:.0}% on last week ({:.0} min)", -change_pct, current),
        Trend::Flat => format!("Focus time matched last week at {:.0} minutes", current),
    };

    Some(Insight {
        kind: InsightKind::FocusProductivity,
        title: "Focus Time".to_string(),
        description,
        trend,
        value: round1(change_pct),
    })
}
