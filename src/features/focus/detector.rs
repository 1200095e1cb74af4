//! Distraction detector.
//!
//! While a session is active, environment signals and explicit reports become
//! candidate distractions. A candidate within the debounce window of the last
//! accepted one is dropped, so one alt-tab that fires both a blur and a
//! visibility change counts once.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::session::{focus_rate, DistractionEvent, DistractionKind, Session};
use crate::bus::{Notification, Outbox, Subscriber, Topic};
use crate::core::Clock;

/// Raw attention signal from the environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvironmentSignal {
    /// The page became hidden.
    PageHidden,
    /// The window lost focus.
    WindowBlur,
    /// The pointer left the viewport at vertical position `client_y`.
    PointerLeave { client_y: f64 },
}

impl EnvironmentSignal {
    /// Map the signal to a distraction kind; `None` if it isn't one.
    #[must_use]
    pub fn distraction_kind(&self) -> Option<DistractionKind> {
        match self {
            Self::PageHidden => Some(DistractionKind::TabSwitch),
            Self::WindowBlur => Some(DistractionKind::WindowBlur),
            // Only an exit through the top edge suggests switching away.
            Self::PointerLeave { client_y } if *client_y < 0.0 => Some(DistractionKind::TabSwitch),
            Self::PointerLeave { .. } => None,
        }
    }
}

/// Detector lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorState {
    Inactive,
    Active,
}

/// Point-in-time view of the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectorSnapshot {
    pub distraction_count: usize,
    pub is_active: bool,
    pub session_start_ms: Option<i64>,
    pub focus_rate: u8,
}

/// Per-session distraction summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectorStatistics {
    pub total_distractions: usize,
    pub focus_rate: u8,
    pub session_duration_ms: i64,
}

/// Debouncing distraction counter.
#[derive(Debug)]
pub struct DistractionDetector {
    clock: Arc<dyn Clock>,
    debounce_ms: i64,
    state: DetectorState,
    distraction_count: usize,
    session_start_ms: Option<i64>,
    last_distraction_ms: Option<i64>,
}

impl DistractionDetector {
    /// Create an inactive detector.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, debounce_ms: i64) -> Self {
        Self {
            clock,
            debounce_ms,
            state: DetectorState::Inactive,
            distraction_count: 0,
            session_start_ms: None,
            last_distraction_ms: None,
        }
    }

    /// Begin tracking a fresh session.
    pub fn start_tracking(&mut self) {
        self.state = DetectorState::Active;
        self.session_start_ms = Some(self.clock.now_ms());
        self.distraction_count = 0;
        self.last_distraction_ms = None;
        info!("Distraction tracking started");
    }

    /// Pick up a session restored from storage. Tracking stays paused until
    /// the session is resumed.
    pub fn restore_tracking(&mut self, session: &Session) {
        self.state = DetectorState::Inactive;
        self.session_start_ms = Some(session.start_time);
        self.distraction_count = session.distraction_count;
        self.last_distraction_ms = session.distractions.last().map(|d| d.timestamp);
        info!(
            count = self.distraction_count,
            "Distraction tracking restored paused"
        );
    }

    /// Stop accepting environment signals.
    pub fn pause_tracking(&mut self) {
        self.state = DetectorState::Inactive;
        info!("Distraction tracking paused");
    }

    /// Accept environment signals again. Ignored without a started session.
    pub fn resume_tracking(&mut self) {
        if self.session_start_ms.is_none() {
            debug!("resume ignored, no session started");
            return;
        }
        self.state = DetectorState::Active;
        info!("Distraction tracking resumed");
    }

    /// Deactivate and clear all counters.
    pub fn reset_tracking(&mut self) {
        self.state = DetectorState::Inactive;
        self.distraction_count = 0;
        self.session_start_ms = None;
        self.last_distraction_ms = None;
        info!("Distraction tracking reset");
    }

    /// Feed a raw environment signal.
    pub fn observe(
        &mut self,
        signal: EnvironmentSignal,
        out: &mut Outbox<'_>,
    ) -> Option<DistractionEvent> {
        if !self.is_active() {
            return None;
        }
        let kind = signal.distraction_kind()?;
        self.record(kind, out)
    }

    /// Handle a `distraction.detected` report.
    pub fn handle_detected(
        &mut self,
        kind: DistractionKind,
        out: &mut Outbox<'_>,
    ) -> Option<DistractionEvent> {
        if !self.is_active() {
            return None;
        }
        self.record(kind, out)
    }

    /// Record an explicit, user-reported distraction.
    ///
    /// Allowed while paused, but only once a session has been started.
    pub fn record_manual(&mut self, out: &mut Outbox<'_>) -> Option<DistractionEvent> {
        if self.session_start_ms.is_none() {
            debug!("manual distraction ignored, no session started");
            return None;
        }
        self.record(DistractionKind::Manual, out)
    }

    fn record(&mut self, kind: DistractionKind, out: &mut Outbox<'_>) -> Option<DistractionEvent> {
        let now = self.clock.now_ms();

        if let Some(last) = self.last_distraction_ms {
            if now - last < self.debounce_ms {
                debug!(%kind, since_last_ms = now - last, "distraction debounced");
                return None;
            }
        }

        self.last_distraction_ms = Some(now);
        self.distraction_count += 1;

        let event = DistractionEvent {
            timestamp: now,
            kind,
            session_time_ms: self.session_start_ms.map_or(0, |start| now - start),
        };

        info!(%kind, total = self.distraction_count, "Distraction recorded");
        out.publish(Notification::DistractionRecorded(event.clone()));
        Some(event)
    }

    /// Whether environment signals are currently accepted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == DetectorState::Active
    }

    /// Accepted distractions this session.
    #[must_use]
    pub const fn distraction_count(&self) -> usize {
        self.distraction_count
    }

    /// Focus estimate against wall time since the session started.
    #[must_use]
    pub fn focus_rate(&self) -> u8 {
        self.session_start_ms.map_or(100, |start| {
            focus_rate(self.distraction_count, self.clock.now_ms() - start)
        })
    }

    /// Snapshot for the presentation layer.
    #[must_use]
    pub fn snapshot(&self) -> DetectorSnapshot {
        DetectorSnapshot {
            distraction_count: self.distraction_count,
            is_active: self.is_active(),
            session_start_ms: self.session_start_ms,
            focus_rate: self.focus_rate(),
        }
    }

    /// Summary of the current session.
    #[must_use]
    pub fn session_statistics(&self) -> DetectorStatistics {
        DetectorStatistics {
            total_distractions: self.distraction_count,
            focus_rate: self.focus_rate(),
            session_duration_ms: self
                .session_start_ms
                .map_or(0, |start| self.clock.now_ms() - start),
        }
    }
}

impl Subscriber for DistractionDetector {
    fn name(&self) -> &'static str {
        "detector"
    }

    fn topics(&self) -> &'static [Topic] {
        &[
            Topic::SessionStart,
            Topic::SessionPause,
            Topic::SessionResume,
            Topic::SessionReset,
            Topic::SessionRestored,
            Topic::DistractionDetected,
        ]
    }

    fn on_notification(&mut self, notification: &Notification, out: &mut Outbox<'_>) {
        match notification {
            Notification::SessionStart => self.start_tracking(),
            Notification::SessionPause => self.pause_tracking(),
            Notification::SessionResume => self.resume_tracking(),
            Notification::SessionReset => self.reset_tracking(),
            Notification::SessionRestored(session) => self.restore_tracking(session),
            Notification::DistractionDetected { kind } => {
                self.handle_detected(*kind, out);
            }
            _ => {}
        }
    }
}
