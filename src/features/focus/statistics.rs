//! Aggregate statistics over completed sessions.

use serde::{Deserialize, Serialize};

use super::session::{round2, Session};

/// Summary metrics across all completed sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStatistics {
    pub total_sessions: usize,
    /// Seconds of active time, fractional.
    #[serde(rename = "totalTime")]
    pub total_time_seconds: f64,
    pub total_distractions: usize,
    /// Rounded mean of per-session focus rates; 100 with no sessions.
    pub average_focus_rate: u8,
}

impl Default for AggregateStatistics {
    fn default() -> Self {
        Self {
            total_sessions: 0,
            total_time_seconds: 0.0,
            total_distractions: 0,
            average_focus_rate: 100,
        }
    }
}

impl AggregateStatistics {
    /// Full recompute from history. Sessions not marked completed are skipped.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn from_sessions(sessions: &[Session]) -> Self {
        let completed: Vec<&Session> = sessions.iter().filter(|s| s.is_completed).collect();

        if completed.is_empty() {
            return Self::default();
        }

        let total_time_ms: i64 = completed.iter().map(|s| s.duration_ms).sum();
        let total_distractions = completed.iter().map(|s| s.distraction_count).sum();
        let rate_sum: u64 = completed.iter().map(|s| u64::from(s.focus_rate)).sum();
        let average = (rate_sum as f64 / completed.len() as f64).round();

        Self {
            total_sessions: completed.len(),
            total_time_seconds: total_time_ms as f64 / 1_000.0,
            total_distractions,
            average_focus_rate: average.clamp(0.0, 100.0) as u8,
        }
    }

    /// Total active time in hours, two decimals.
    #[must_use]
    pub fn total_time_hours(&self) -> f64 {
        round2(self.total_time_seconds / 3_600.0)
    }

    /// Mean session length in minutes, two decimals.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_session_minutes(&self) -> f64 {
        if self.total_sessions == 0 {
            return 0.0;
        }
        round2(self.total_time_seconds / self.total_sessions as f64 / 60.0)
    }

    /// Mean distractions per session, two decimals.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_distractions_per_session(&self) -> f64 {
        if self.total_sessions == 0 {
            return 0.0;
        }
        round2(self.total_distractions as f64 / self.total_sessions as f64)
    }
}
