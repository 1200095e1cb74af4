//! Topics and payloads carried on the notification bus.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::oneshot;

use crate::features::focus::{
    AggregateStatistics, DistractionEvent, DistractionKind, ExportReport, Session,
};

/// Enumerated topic names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    SessionStart,
    SessionPause,
    SessionResume,
    SessionReset,
    SessionClearAllData,
    SessionRestored,
    TimerTick,
    DistractionDetected,
    DistractionRecorded,
    DataRequested,
    StatisticsUpdated,
}

impl Topic {
    /// Dotted topic name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SessionStart => "session.start",
            Self::SessionPause => "session.pause",
            Self::SessionResume => "session.resume",
            Self::SessionReset => "session.reset",
            Self::SessionClearAllData => "session.clearAllData",
            Self::SessionRestored => "session.restored",
            Self::TimerTick => "timer.tick",
            Self::DistractionDetected => "distraction.detected",
            Self::DistractionRecorded => "distraction.recorded",
            Self::DataRequested => "data.requested",
            Self::StatisticsUpdated => "statistics.updated",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of `timer.tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickPayload {
    /// Whole elapsed seconds.
    pub seconds: i64,
    pub elapsed_ms: i64,
}

/// Payload of `statistics.updated`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsUpdate {
    /// Totals over completed sessions.
    pub statistics: AggregateStatistics,
    /// Focus rate of the in-progress session, if any.
    pub current_focus_rate: Option<u8>,
    /// Completed time plus the in-progress session's duration.
    pub live_total_time_seconds: f64,
    /// Completed sessions plus one if a session is in progress.
    pub live_session_count: usize,
}

/// Reply handle carried by `data.requested`.
///
/// Clones share one sender; the first responder wins.
#[derive(Debug, Clone)]
pub struct DataReply {
    slot: Arc<Mutex<Option<oneshot::Sender<ExportReport>>>>,
}

impl DataReply {
    /// Create a reply handle and the receiver the requester awaits.
    #[must_use]
    pub fn channel() -> (Self, oneshot::Receiver<ExportReport>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                slot: Arc::new(Mutex::new(Some(tx))),
            },
            rx,
        )
    }

    /// Deliver the report. Returns false if another responder already did,
    /// or the requester went away.
    pub fn fulfil(&self, report: ExportReport) -> bool {
        let sender = match self.slot.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        sender.is_some_and(|tx| tx.send(report).is_ok())
    }
}

/// A message on the bus.
#[derive(Debug, Clone)]
pub enum Notification {
    SessionStart,
    SessionPause,
    SessionResume,
    SessionReset,
    SessionClearAllData,
    /// An in-progress session came back from storage, paused.
    SessionRestored(Session),
    TimerTick(TickPayload),
    DistractionDetected { kind: DistractionKind },
    DistractionRecorded(DistractionEvent),
    DataRequested(DataReply),
    StatisticsUpdated(StatisticsUpdate),
}

impl Notification {
    /// Topic this notification is published under.
    #[must_use]
    pub const fn topic(&self) -> Topic {
        match self {
            Self::SessionStart => Topic::SessionStart,
            Self::SessionPause => Topic::SessionPause,
            Self::SessionResume => Topic::SessionResume,
            Self::SessionReset => Topic::SessionReset,
            Self::SessionClearAllData => Topic::SessionClearAllData,
            Self::SessionRestored(_) => Topic::SessionRestored,
            Self::TimerTick(_) => Topic::TimerTick,
            Self::DistractionDetected { .. } => Topic::DistractionDetected,
            Self::DistractionRecorded(_) => Topic::DistractionRecorded,
            Self::DataRequested(_) => Topic::DataRequested,
            Self::StatisticsUpdated(_) => Topic::StatisticsUpdated,
        }
    }
}
