//! Session store.
//!
//! The only writer of durable history. Keeps the completed sessions, the
//! in-progress session and the aggregate statistics, and persists all of it
//! as one JSON blob under [`STORAGE_KEY`].
//!
//! Storage failures are logged and swallowed: the session keeps running in
//! memory until the next successful write. Autosave and teardown only write
//! when something changed since the last successful write, so an in-progress
//! session nobody touches keeps its earlier `lastSaved` and eventually goes
//! stale.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::report::{ExportReport, SCHEMA_VERSION};
use super::session::{DistractionEvent, Session};
use super::statistics::AggregateStatistics;
use crate::bus::{Notification, Outbox, StatisticsUpdate, Subscriber, TickPayload, Topic};
use crate::config::FocusConfig;
use crate::core::Clock;
use crate::error::FocusError;
use crate::storage::BlobStore;

/// Key of the persisted blob.
pub const STORAGE_KEY: &str = "focusBubble";

/// The persisted blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub statistics: AggregateStatistics,
    #[serde(default)]
    pub current_session: Option<Session>,
    /// Epoch milliseconds of the write.
    #[serde(default)]
    pub last_saved: i64,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    SCHEMA_VERSION.to_string()
}

impl PersistedState {
    /// Parse a stored blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is not valid JSON of this shape.
    pub fn from_json(raw: &str) -> Result<Self, FocusError> {
        serde_json::from_str(raw)
            .map_err(|e| FocusError::Parse(format!("Failed to parse stored state: {e}")))
    }
}

/// History, statistics and the in-progress session.
pub struct SessionStore {
    clock: Arc<dyn Clock>,
    storage: Box<dyn BlobStore>,
    policy: FocusConfig,
    sessions: Vec<Session>,
    statistics: AggregateStatistics,
    current: Option<Session>,
    next_autosave_ms: i64,
    last_saved_ms: Option<i64>,
    /// Unwritten changes since the last successful write.
    dirty: bool,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.sessions.len())
            .field("statistics", &self.statistics)
            .field("current", &self.current.as_ref().map(|s| &s.id))
            .field("last_saved_ms", &self.last_saved_ms)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Open the store, loading whatever the medium holds.
    ///
    /// Missing or corrupt data loads as empty history. A persisted
    /// in-progress session is dropped if it was saved longer ago than the
    /// staleness threshold.
    #[must_use]
    pub fn open(clock: Arc<dyn Clock>, storage: Box<dyn BlobStore>, policy: FocusConfig) -> Self {
        let now = clock.now_ms();
        let mut store = Self {
            next_autosave_ms: now.saturating_add(policy.autosave_interval_ms()),
            clock,
            storage,
            policy,
            sessions: Vec::new(),
            statistics: AggregateStatistics::default(),
            current: None,
            last_saved_ms: None,
            dirty: false,
        };
        store.load();
        store
    }

    fn load(&mut self) {
        let raw = match self.storage.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no stored state, starting with empty history");
                return;
            }
            Err(e) => {
                warn!(error = %e, "failed to read stored state, starting with empty history");
                return;
            }
        };

        let state = match PersistedState::from_json(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "stored state is corrupt, starting with empty history");
                return;
            }
        };

        if state.version != SCHEMA_VERSION {
            warn!(version = %state.version, "stored state has an unexpected version");
        }

        let age_ms = self.clock.now_ms() - state.last_saved;
        self.current = match state.current_session {
            Some(session) if age_ms < self.policy.stale_after_ms() => {
                info!(id = %session.id, "Restored in-progress session");
                Some(session)
            }
            Some(session) => {
                info!(id = %session.id, age_ms, "Discarded stale in-progress session");
                self.dirty = true;
                None
            }
            None => None,
        };

        self.sessions = state.sessions;
        self.last_saved_ms = Some(state.last_saved);
        // Stored statistics are never trusted.
        self.statistics = AggregateStatistics::from_sessions(&self.sessions);

        info!(sessions = self.sessions.len(), "Loaded focus history");
    }

    /// Open a fresh session, saving any session already open.
    pub fn start_session(&mut self, out: &mut Outbox<'_>) {
        if self.current.is_some() {
            self.save_current_session(out);
        }

        let session = Session::start(self.clock.now_ms());
        info!(id = %session.id, "Session started");
        self.current = Some(session);
        self.dirty = true;
        self.publish_statistics(out);
    }

    /// Follow the timer. Never persists.
    pub fn on_tick(&mut self, tick: TickPayload, out: &mut Outbox<'_>) {
        let Some(session) = self.current.as_mut() else {
            return;
        };
        session.update_duration(tick.elapsed_ms);
        self.dirty = true;
        self.publish_statistics(out);
    }

    /// Append a distraction to the open session.
    pub fn on_distraction(&mut self, event: &DistractionEvent, out: &mut Outbox<'_>) {
        let Some(session) = self.current.as_mut() else {
            debug!("distraction with no open session ignored");
            return;
        };
        session.record_distraction(event.clone());
        debug!(
            id = %session.id,
            count = session.distraction_count,
            focus_rate = session.focus_rate,
            "Distraction added to session"
        );
        self.dirty = true;
        self.publish_statistics(out);
    }

    /// Move the open session into history.
    ///
    /// Sessions with no duration stay open. Returns whether a session was saved.
    pub fn save_current_session(&mut self, out: &mut Outbox<'_>) -> bool {
        match &self.current {
            Some(session) if session.duration_ms > 0 => {}
            Some(_) => {
                debug!("session has no duration, not saved");
                return false;
            }
            None => return false,
        }

        let Some(mut session) = self.current.take() else {
            return false;
        };
        session.complete(self.clock.now_ms());
        info!(
            id = %session.id,
            duration_ms = session.duration_ms,
            distractions = session.distraction_count,
            focus_rate = session.focus_rate,
            "Session saved"
        );
        self.sessions.push(session);
        self.dirty = true;

        self.recompute_statistics(out);
        self.persist();
        true
    }

    /// Close the open session, keeping it only if it ran long enough.
    pub fn reset_current_session(&mut self, out: &mut Outbox<'_>) {
        let Some(duration_ms) = self.current.as_ref().map(|s| s.duration_ms) else {
            return;
        };

        let saved = duration_ms >= self.policy.min_save_ms() && self.save_current_session(out);

        if !saved {
            if let Some(session) = self.current.take() {
                info!(id = %session.id, duration_ms, "Session discarded");
            }
            self.dirty = true;
            self.persist();
            self.publish_statistics(out);
        }
    }

    /// Recompute statistics from completed sessions and announce them.
    pub fn recompute_statistics(&mut self, out: &mut Outbox<'_>) {
        self.statistics = AggregateStatistics::from_sessions(&self.sessions);
        self.publish_statistics(out);
    }

    fn publish_statistics(&self, out: &mut Outbox<'_>) {
        out.publish(Notification::StatisticsUpdated(self.statistics_update()));
    }

    /// Statistics with the open session folded in.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn statistics_update(&self) -> StatisticsUpdate {
        let current_ms = self.current.as_ref().map_or(0, |s| s.duration_ms);
        StatisticsUpdate {
            statistics: self.statistics.clone(),
            current_focus_rate: self.current.as_ref().map(|s| s.focus_rate),
            live_total_time_seconds: self.statistics.total_time_seconds
                + current_ms as f64 / 1_000.0,
            live_session_count: self.statistics.total_sessions + usize::from(self.current.is_some()),
        }
    }

    /// Serialize and write the full state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized or written.
    pub fn save_data(&mut self) -> Result<(), FocusError> {
        let now = self.clock.now_ms();
        let state = PersistedState {
            sessions: self.sessions.clone(),
            statistics: self.statistics.clone(),
            current_session: self.current.clone(),
            last_saved: now,
            version: SCHEMA_VERSION.to_string(),
        };
        let raw = serde_json::to_string(&state)
            .map_err(|e| FocusError::Parse(format!("Failed to serialize state: {e}")))?;
        self.storage.set(STORAGE_KEY, &raw)?;
        self.last_saved_ms = Some(now);
        self.dirty = false;
        Ok(())
    }

    /// Write the full state, logging failures.
    pub fn persist(&mut self) -> bool {
        match self.save_data() {
            Ok(()) => {
                debug!("state persisted");
                true
            }
            Err(e) => {
                error!(error = %e, "failed to persist state, continuing in memory");
                false
            }
        }
    }

    /// Persist unwritten changes if the autosave interval has passed.
    pub fn autosave_if_due(&mut self) -> bool {
        let now = self.clock.now_ms();
        if now < self.next_autosave_ms {
            return false;
        }
        self.next_autosave_ms = now.saturating_add(self.policy.autosave_interval_ms());
        if !self.dirty {
            debug!("autosave skipped, nothing changed");
            return false;
        }
        debug!("autosave");
        self.persist()
    }

    /// Teardown write. The open session stays open so it can be restored.
    ///
    /// Returns whether the medium holds the current state.
    pub fn flush(&mut self) -> bool {
        if !self.dirty {
            debug!("nothing to flush");
            return true;
        }
        info!("Flushing state");
        self.persist()
    }

    /// Whether there are changes not yet written.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Drop all history and erase the persisted blob.
    pub fn clear_all_data(&mut self, out: &mut Outbox<'_>) {
        self.sessions.clear();
        self.current = None;
        self.statistics = AggregateStatistics::default();

        match self.storage.remove(STORAGE_KEY) {
            Ok(()) => {
                self.dirty = false;
                info!("All data cleared");
            }
            Err(e) => {
                self.dirty = true;
                error!(error = %e, "failed to erase stored state");
            }
        }
        self.publish_statistics(out);
    }

    /// Build the export document.
    #[must_use]
    pub fn export_snapshot(&self) -> ExportReport {
        ExportReport::build(
            &self.sessions,
            self.current.as_ref(),
            &self.statistics,
            self.clock.now_ms(),
        )
    }

    /// Aggregate statistics over completed sessions.
    #[must_use]
    pub fn statistics(&self) -> AggregateStatistics {
        self.statistics.clone()
    }

    /// Completed sessions, oldest first.
    #[must_use]
    pub fn sessions(&self) -> Vec<Session> {
        self.sessions.clone()
    }

    /// The open session, if any.
    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.current.clone()
    }

    /// Look up one completed session.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no session has this id.
    pub fn find_session(&self, id: &str) -> Result<Session, FocusError> {
        self.sessions
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| FocusError::NotFound(format!("session {id}")))
    }

    /// When the state was last written, epoch milliseconds.
    #[must_use]
    pub const fn last_saved_ms(&self) -> Option<i64> {
        self.last_saved_ms
    }
}

impl Subscriber for SessionStore {
    fn name(&self) -> &'static str {
        "store"
    }

    fn topics(&self) -> &'static [Topic] {
        &[
            Topic::SessionStart,
            Topic::SessionReset,
            Topic::SessionClearAllData,
            Topic::TimerTick,
            Topic::DistractionRecorded,
            Topic::DataRequested,
        ]
    }

    fn on_notification(&mut self, notification: &Notification, out: &mut Outbox<'_>) {
        match notification {
            Notification::SessionStart => self.start_session(out),
            Notification::SessionReset => self.reset_current_session(out),
            Notification::SessionClearAllData => self.clear_all_data(out),
            Notification::TimerTick(tick) => self.on_tick(*tick, out),
            Notification::DistractionRecorded(event) => self.on_distraction(event, out),
            Notification::DataRequested(reply) => {
                if !reply.fulfil(self.export_snapshot()) {
                    debug!("data request already answered");
                }
            }
            _ => {}
        }
    }
}
