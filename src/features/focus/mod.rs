//! Focus session tracking.
//!
//! Three components cooperate over the notification bus:
//! - [`SessionTimer`] measures active time and emits ticks
//! - [`DistractionDetector`] turns attention signals into debounced distractions
//! - [`SessionStore`] owns history, statistics and persistence
//!
//! [`FocusTracker`] wires them together.

pub mod detector;
pub mod insights;
pub mod report;
pub mod session;
pub mod statistics;
pub mod store;
pub mod timer;
pub mod tracker;

pub use detector::{DetectorSnapshot, DetectorState, DetectorStatistics, DistractionDetector, EnvironmentSignal};
pub use insights::{generate_insights, Insight, InsightCategory, InsightLevel};
pub use report::{await_export, ExportCurrent, ExportReport, ExportStatistics, ExportedSession, LiveState};
pub use session::{focus_rate, DistractionEvent, DistractionKind, Session};
pub use statistics::AggregateStatistics;
pub use store::{PersistedState, SessionStore, STORAGE_KEY};
pub use timer::{format_duration, format_duration_mmss, SessionTimer, TimerSnapshot, TimerState};
pub use tracker::FocusTracker;
