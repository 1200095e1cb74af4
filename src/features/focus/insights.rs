//! Qualitative insights over aggregate statistics.

use serde::Serialize;

use super::statistics::AggregateStatistics;

/// Shown instead of insights when no session has completed.
pub const NO_SESSIONS_MESSAGE: &str =
    "No completed sessions yet. Start your first session to see insights!";

/// How an insight reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightLevel {
    /// Doing well.
    Positive,
    /// Worth a look.
    Neutral,
    /// Needs work.
    Negative,
}

impl InsightLevel {
    /// Get icon for this level.
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::Positive => "+",
            Self::Neutral => "*",
            Self::Negative => "!",
        }
    }
}

/// What an insight is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    FocusRate,
    SessionLength,
    Distractions,
    Empty,
}

/// One generated insight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub category: InsightCategory,
    pub level: InsightLevel,
    pub message: &'static str,
}

impl Insight {
    const fn new(category: InsightCategory, level: InsightLevel, message: &'static str) -> Self {
        Self {
            category,
            level,
            message,
        }
    }
}

/// Generate insights from statistics.
///
/// Returns a single placeholder when there is no completed session.
#[must_use]
pub fn generate_insights(stats: &AggregateStatistics) -> Vec<Insight> {
    if stats.total_sessions == 0 {
        return vec![Insight::new(
            InsightCategory::Empty,
            InsightLevel::Neutral,
            NO_SESSIONS_MESSAGE,
        )];
    }

    // Bands compare unrounded averages.
    #[allow(clippy::cast_precision_loss)]
    let sessions = stats.total_sessions as f64;
    #[allow(clippy::cast_precision_loss)]
    let distractions = stats.total_distractions as f64;

    vec![
        focus_rate_insight(stats.average_focus_rate),
        session_length_insight(stats.total_time_seconds / sessions / 60.0),
        distraction_insight(distractions / sessions),
    ]
}

fn focus_rate_insight(rate: u8) -> Insight {
    let (level, message) = if rate >= 90 {
        (
            InsightLevel::Positive,
            "Excellent! Your focus rate is outstanding.",
        )
    } else if rate >= 70 {
        (
            InsightLevel::Neutral,
            "Good focus rate! Room for improvement.",
        )
    } else {
        (
            InsightLevel::Negative,
            "Focus rate could be improved. Try reducing distractions.",
        )
    };
    Insight::new(InsightCategory::FocusRate, level, message)
}

fn session_length_insight(minutes: f64) -> Insight {
    let (level, message) = if minutes >= 25.0 {
        (
            InsightLevel::Positive,
            "Great session lengths! You're building good focus habits.",
        )
    } else if minutes >= 15.0 {
        (
            InsightLevel::Neutral,
            "Consider longer sessions for deeper focus (25+ minutes).",
        )
    } else {
        (
            InsightLevel::Negative,
            "Try gradually increasing your session length.",
        )
    };
    Insight::new(InsightCategory::SessionLength, level, message)
}

fn distraction_insight(per_session: f64) -> Insight {
    let (level, message) = if per_session <= 2.0 {
        (InsightLevel::Positive, "Excellent distraction control!")
    } else if per_session <= 5.0 {
        (
            InsightLevel::Neutral,
            "Moderate distractions. Consider removing potential interruptions.",
        )
    } else {
        (
            InsightLevel::Negative,
            "High distraction rate. Try turning off notifications.",
        )
    };
    Insight::new(InsightCategory::Distractions, level, message)
}
