//! Composition root.
//!
//! [`FocusTracker`] owns the bus and the three components and is the only
//! thing the presentation layer talks to. Every operation publishes onto the
//! bus and drains it before returning, so callers always observe a settled
//! state.
//!
//! An in-progress session restored from storage is announced with
//! `session.restored`, which brings the timer and detector back paused at the
//! session's saved duration. Lifecycle operations first let the timer publish
//! its exact elapsed time, so the store never decides on a stale tick.

use std::sync::Arc;

use tracing::debug;

use super::detector::{DistractionDetector, EnvironmentSignal};
use super::report::{await_export, ExportReport, LiveState};
use super::session::{DistractionEvent, DistractionKind};
use super::store::SessionStore;
use super::timer::{SessionTimer, TimerState};
use crate::bus::{DataReply, Notification, NotificationBus, Topic};
use crate::config::FocusConfig;
use crate::core::Clock;
use crate::storage::BlobStore;

/// Focus session tracker.
pub struct FocusTracker {
    clock: Arc<dyn Clock>,
    config: FocusConfig,
    bus: NotificationBus,
    timer: SessionTimer,
    detector: DistractionDetector,
    store: SessionStore,
}

impl std::fmt::Debug for FocusTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusTracker")
            .field("timer", &self.timer)
            .field("detector", &self.detector)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl FocusTracker {
    /// Wire up the components over `storage`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, storage: Box<dyn BlobStore>, config: FocusConfig) -> Self {
        let timer = SessionTimer::new(Arc::clone(&clock), config.tick_ms());
        let detector = DistractionDetector::new(Arc::clone(&clock), config.debounce_window_ms());
        let store = SessionStore::open(Arc::clone(&clock), storage, config.clone());

        let mut tracker = Self {
            clock,
            config,
            bus: NotificationBus::new(),
            timer,
            detector,
            store,
        };
        if let Some(session) = tracker.store.current_session() {
            tracker.publish(Notification::SessionRestored(session));
        }
        tracker
    }

    /// Register a presentation callback for `topic`.
    pub fn listen(&mut self, topic: Topic, listener: impl FnMut(&Notification) + 'static) {
        self.bus.listen(topic, listener);
    }

    /// Publish a notification and drain the bus.
    pub fn publish(&mut self, notification: Notification) -> usize {
        self.bus.publish(notification);
        self.dispatch()
    }

    fn dispatch(&mut self) -> usize {
        let delivered = self.bus.dispatch(&mut [
            &mut self.timer,
            &mut self.detector,
            &mut self.store,
        ]);
        if delivered > 0 {
            debug!(delivered, "bus drained");
        }
        delivered
    }

    /// Publish the timer's exact elapsed time ahead of a lifecycle change.
    fn sync_timer(&mut self) {
        self.timer.sync(&mut self.bus.outbox());
    }

    /// Begin a session.
    pub fn start(&mut self) {
        self.sync_timer();
        self.publish(Notification::SessionStart);
    }

    /// Pause the running session.
    pub fn pause(&mut self) {
        self.sync_timer();
        self.publish(Notification::SessionPause);
    }

    /// Resume a paused session.
    pub fn resume(&mut self) {
        self.publish(Notification::SessionResume);
    }

    /// End the session, keeping it in history if it ran long enough.
    pub fn reset(&mut self) {
        self.sync_timer();
        self.publish(Notification::SessionReset);
    }

    /// Erase all history. Safe to call repeatedly.
    pub fn clear_all_data(&mut self) {
        self.publish(Notification::SessionClearAllData);
    }

    /// Feed an environment signal to the detector.
    pub fn signal(&mut self, signal: EnvironmentSignal) -> Option<DistractionEvent> {
        let event = self.detector.observe(signal, &mut self.bus.outbox());
        self.dispatch();
        event
    }

    /// Report a distraction through the bus, as an environment watcher would.
    pub fn report_distraction(&mut self, kind: DistractionKind) {
        self.publish(Notification::DistractionDetected { kind });
    }

    /// Record an explicit distraction.
    pub fn record_manual(&mut self) -> Option<DistractionEvent> {
        let event = self.detector.record_manual(&mut self.bus.outbox());
        self.dispatch();
        event
    }

    /// Drive time-based work: due ticks and autosave.
    ///
    /// Returns whether a tick fired.
    pub fn pump(&mut self) -> bool {
        let ticked = self.timer.poll(&mut self.bus.outbox());
        self.store.autosave_if_due();
        self.dispatch();
        ticked
    }

    /// Ask for the export document.
    ///
    /// Falls back to a report built from live state if no store answers within
    /// the configured timeout.
    pub async fn request_export(&mut self) -> ExportReport {
        let (reply, rx) = DataReply::channel();
        self.publish(Notification::DataRequested(reply));
        await_export(
            rx,
            self.config.request_timeout(),
            self.live_state(),
            self.clock.now_ms(),
        )
        .await
    }

    /// What the presentation layer shows without asking the store.
    #[must_use]
    pub fn live_state(&self) -> LiveState {
        let state = self.timer.state();
        LiveState {
            is_active: state != TimerState::Idle,
            is_paused: state == TimerState::Paused,
            current_time: self.timer.current_seconds(),
            distraction_count: self.detector.distraction_count(),
        }
    }

    /// Teardown: persist everything, leaving the open session restorable.
    pub fn shutdown(&mut self) -> bool {
        self.sync_timer();
        self.dispatch();
        self.store.flush()
    }

    /// The session timer.
    #[must_use]
    pub const fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    /// The distraction detector.
    #[must_use]
    pub const fn detector(&self) -> &DistractionDetector {
        &self.detector
    }

    /// The session store.
    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Active policy.
    #[must_use]
    pub const fn config(&self) -> &FocusConfig {
        &self.config
    }
}
