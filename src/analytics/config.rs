/// Tunable thresholds for the insight detectors

use serde::{Deserialize, Serialize};

/// Thresholds used by the insight detectors
///
/// The defaults are the documented behaviour; deployments may override any
/// of them (see the CLI flags in `main.rs`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Relative band (percent of the larger value) treated as "no change"
    pub flat_band_pct: f64,
    /// Mood point difference below which the mood trend is flat
    pub mood_epsilon: f64,
    /// Nights with at least this much sleep count as rested
    pub rested_sleep_hours: f64,
    /// Shortest streak worth reporting
    pub min_streak_for_insight: u32,
    /// Mood entries and focus sessions each needed for the sleep/focus comparison
    pub min_sleep_focus_entries: usize,
    /// Mood entries needed for a mood trend
    pub min_mood_trend_entries: usize,
    /// Focus sessions needed for the week-over-week comparison
    pub min_focus_sessions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            flat_band_pct: 5.0,
            mood_epsilon: 0.1,
            rested_sleep_hours: 7.0,
            min_streak_for_insight: 3,
            min_sleep_focus_entries: 3,
            min_mood_trend_entries: 4,
            min_focus_sessions: 2,
        }
    }
}
