//! Export report.
//!
//! The read-only document handed out on `data.requested`: ISO timestamps,
//! minute-based derived fields, statistics ratios and insight strings.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::oneshot;
use tracing::warn;

use super::insights::generate_insights;
use super::session::{round2, DistractionEvent, DistractionKind, Session};
use super::statistics::AggregateStatistics;
use crate::core::millis_to_datetime;

/// Schema version stamped into persisted blobs and exports.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Source name stamped into export metadata.
pub const EXPORT_SOURCE: &str = "Focus Bubble - Distraction Tracker";

/// Export header.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub export_date: String,
    pub version: String,
    pub source: String,
    pub total_sessions: usize,
}

impl ExportMetadata {
    fn new(now_ms: i64, total_sessions: usize) -> Self {
        Self {
            export_date: iso(now_ms),
            version: SCHEMA_VERSION.to_string(),
            source: EXPORT_SOURCE.to_string(),
            total_sessions,
        }
    }
}

/// A distraction with a human-readable timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedDistraction {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: DistractionKind,
    pub session_time_ms: i64,
    pub session_time_minutes: f64,
}

impl From<&DistractionEvent> for ExportedDistraction {
    #[allow(clippy::cast_precision_loss)]
    fn from(event: &DistractionEvent) -> Self {
        Self {
            timestamp: iso(event.timestamp),
            kind: event.kind,
            session_time_ms: event.session_time_ms,
            session_time_minutes: round2(event.session_time_ms as f64 / 60_000.0),
        }
    }
}

/// A history entry with ISO times and derived minutes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedSession {
    pub id: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub duration_ms: i64,
    pub duration_minutes: f64,
    pub distractions: Vec<ExportedDistraction>,
    pub distraction_count: usize,
    pub focus_rate: u8,
    pub is_completed: bool,
}

impl From<&Session> for ExportedSession {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            start_time: iso(session.start_time),
            end_time: session.end_time.map(iso),
            duration_ms: session.duration_ms,
            duration_minutes: round2(session.duration_minutes()),
            distractions: session.distractions.iter().map(Into::into).collect(),
            distraction_count: session.distraction_count,
            focus_rate: session.focus_rate,
            is_completed: session.is_completed,
        }
    }
}

/// Statistics plus derived ratios.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportStatistics {
    #[serde(flatten)]
    pub base: AggregateStatistics,
    pub total_time_hours: f64,
    /// Minutes.
    pub average_session_length: f64,
    pub average_distractions_per_session: f64,
}

impl From<&AggregateStatistics> for ExportStatistics {
    fn from(stats: &AggregateStatistics) -> Self {
        Self {
            base: stats.clone(),
            total_time_hours: stats.total_time_hours(),
            average_session_length: stats.average_session_minutes(),
            average_distractions_per_session: stats.average_distractions_per_session(),
        }
    }
}

/// What the presentation layer knows without the Store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveState {
    pub is_active: bool,
    pub is_paused: bool,
    /// Elapsed whole seconds.
    pub current_time: i64,
    pub distraction_count: usize,
}

/// The `currentSession` slot: the Store's record, or live state on fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExportCurrent {
    Session(Session),
    Live(LiveState),
}

/// Full export document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    pub metadata: ExportMetadata,
    pub current_session: Option<ExportCurrent>,
    pub sessions: Vec<ExportedSession>,
    pub statistics: ExportStatistics,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub insights: Vec<String>,
}

impl ExportReport {
    /// Build the report from the Store's state.
    #[must_use]
    pub fn build(
        sessions: &[Session],
        current: Option<&Session>,
        stats: &AggregateStatistics,
        now_ms: i64,
    ) -> Self {
        let insights = if sessions.is_empty() {
            generate_insights(&AggregateStatistics::default())
        } else {
            generate_insights(stats)
        };

        Self {
            metadata: ExportMetadata::new(now_ms, stats.total_sessions),
            current_session: current.cloned().map(ExportCurrent::Session),
            sessions: sessions.iter().map(Into::into).collect(),
            statistics: stats.into(),
            insights: insights.into_iter().map(|i| i.message.to_string()).collect(),
        }
    }

    /// Report for an empty store.
    #[must_use]
    pub fn empty(now_ms: i64) -> Self {
        Self::build(&[], None, &AggregateStatistics::default(), now_ms)
    }

    /// Report built from live presentation state when no Store answered.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fallback(live: LiveState, now_ms: i64) -> Self {
        let stats = AggregateStatistics {
            total_sessions: 0,
            total_time_seconds: live.current_time as f64,
            total_distractions: live.distraction_count,
            average_focus_rate: 100,
        };

        Self {
            metadata: ExportMetadata::new(now_ms, 0),
            current_session: Some(ExportCurrent::Live(live)),
            sessions: Vec::new(),
            statistics: (&stats).into(),
            insights: Vec::new(),
        }
    }

    /// Whether this report came from the fallback path.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self.current_session, Some(ExportCurrent::Live(_)))
    }
}

/// Wait for a Store to answer a data request, falling back after `timeout`.
pub async fn await_export(
    rx: oneshot::Receiver<ExportReport>,
    timeout: Duration,
    live: LiveState,
    now_ms: i64,
) -> ExportReport {
    match tokio::time::timeout(timeout, rx).await {
        Ok(Ok(report)) => report,
        Ok(Err(_)) => {
            warn!("data request dropped without a reply, using live state");
            ExportReport::fallback(live, now_ms)
        }
        Err(_) => {
            warn!(?timeout, "data request timed out, using live state");
            ExportReport::fallback(live, now_ms)
        }
    }
}

fn iso(ms: i64) -> String {
    millis_to_datetime(ms).to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::focus::insights::NO_SESSIONS_MESSAGE;

    fn finished_session() -> Session {
        let mut session = Session::with_id("session_0_abcdefghi".to_string(), 0);
        session.update_duration(90_000);
        session.record_distraction(DistractionEvent {
            timestamp: 45_000,
            kind: DistractionKind::WindowBlur,
            session_time_ms: 45_000,
        });
        session.complete(90_000);
        session
    }

    #[test]
    fn test_empty_report() {
        let report = ExportReport::empty(0);

        assert_eq!(report.metadata.export_date, "1970-01-01T00:00:00.000Z");
        assert_eq!(report.metadata.source, EXPORT_SOURCE);
        assert_eq!(report.metadata.version, "1.0.0");
        assert_eq!(report.insights, vec![NO_SESSIONS_MESSAGE.to_string()]);
        assert!(report.current_session.is_none());
        assert!(!report.is_fallback());
    }

    #[test]
    fn test_build_derives_minutes() {
        let sessions = vec![finished_session()];
        let stats = AggregateStatistics::from_sessions(&sessions);
        let report = ExportReport::build(&sessions, None, &stats, 120_000);

        let exported = &report.sessions[0];
        assert_eq!(exported.start_time, "1970-01-01T00:00:00.000Z");
        assert_eq!(exported.end_time.as_deref(), Some("1970-01-01T00:01:30.000Z"));
        assert!((exported.duration_minutes - 1.5).abs() < f64::EPSILON);
        assert!((exported.distractions[0].session_time_minutes - 0.75).abs() < f64::EPSILON);

        assert_eq!(report.metadata.total_sessions, 1);
        assert!((report.statistics.average_session_length - 1.5).abs() < f64::EPSILON);
        assert_eq!(report.insights.len(), 3);
    }

    #[test]
    fn test_report_json_shape() {
        let sessions = vec![finished_session()];
        let stats = AggregateStatistics::from_sessions(&sessions);
        let report = ExportReport::build(&sessions, None, &stats, 0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["statistics"]["totalSessions"], 1);
        assert_eq!(json["statistics"]["totalTime"], 90.0);
        assert_eq!(json["statistics"]["averageDistractionsPerSession"], 1.0);
        assert_eq!(json["sessions"][0]["distractions"][0]["type"], "window_blur");
        assert!(json["currentSession"].is_null());
    }

    #[test]
    fn test_fallback_uses_live_state() {
        let live = LiveState {
            is_active: true,
            is_paused: false,
            current_time: 42,
            distraction_count: 3,
        };
        let report = ExportReport::fallback(live, 0);

        assert!(report.is_fallback());
        assert!(report.sessions.is_empty());
        assert!((report.statistics.base.total_time_seconds - 42.0).abs() < f64::EPSILON);
        assert_eq!(report.statistics.base.total_distractions, 3);
        assert_eq!(report.statistics.base.average_focus_rate, 100);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["currentSession"]["currentTime"], 42);
        assert!(json.get("insights").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_export_times_out_to_fallback() {
        let (_tx, rx) = oneshot::channel::<ExportReport>();
        let live = LiveState {
            is_active: false,
            is_paused: false,
            current_time: 0,
            distraction_count: 0,
        };

        let report = await_export(rx, Duration::from_secs(1), live, 0).await;
        assert!(report.is_fallback());
    }

    #[tokio::test]
    async fn test_await_export_returns_reply() {
        let (tx, rx) = oneshot::channel();
        tx.send(ExportReport::empty(0)).unwrap();
        let live = LiveState {
            is_active: false,
            is_paused: false,
            current_time: 0,
            distraction_count: 0,
        };

        let report = await_export(rx, Duration::from_secs(1), live, 0).await;
        assert!(!report.is_fallback());
    }
}
