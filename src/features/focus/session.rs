//! Focus session and distraction event model.
//!
//! Field names serialize in camelCase because they form the persisted blob
//! schema and the export document.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Sessions shorter than this report a perfect focus rate.
const FOCUS_RATE_MIN_DURATION_MS: i64 = 60_000;

/// Each distraction per minute costs this many points.
const FOCUS_RATE_PENALTY_PER_DPM: f64 = 50.0;

/// Kind of attention loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistractionKind {
    /// Page hidden or pointer left through the top edge.
    TabSwitch,
    /// Window lost focus.
    WindowBlur,
    /// Reported explicitly by the user.
    Manual,
}

impl DistractionKind {
    /// Parse a distraction kind from user input.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "tab" | "tab_switch" | "tab-switch" | "t" => Some(Self::TabSwitch),
            "blur" | "window_blur" | "window-blur" | "b" => Some(Self::WindowBlur),
            "manual" | "m" => Some(Self::Manual),
            _ => None,
        }
    }

    /// Wire name, as stored in the blob.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TabSwitch => "tab_switch",
            Self::WindowBlur => "window_blur",
            Self::Manual => "manual",
        }
    }
}

impl std::fmt::Display for DistractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One accepted distraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistractionEvent {
    /// Wall-clock time of acceptance, epoch milliseconds.
    pub timestamp: i64,
    /// What kind of signal triggered it.
    #[serde(rename = "type")]
    pub kind: DistractionKind,
    /// Offset from the session start.
    pub session_time_ms: i64,
}

/// One focus-work attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// `session_<millis>_<suffix>`
    pub id: String,
    /// Epoch milliseconds.
    pub start_time: i64,
    /// Set when the session is saved to history.
    #[serde(default)]
    pub end_time: Option<i64>,
    /// Active time; never decreases while the session is open.
    #[serde(default)]
    pub duration_ms: i64,
    /// Chronological.
    #[serde(default)]
    pub distractions: Vec<DistractionEvent>,
    #[serde(default)]
    pub distraction_count: usize,
    #[serde(default = "perfect_focus_rate")]
    pub focus_rate: u8,
    #[serde(default)]
    pub is_completed: bool,
}

const fn perfect_focus_rate() -> u8 {
    100
}

impl Session {
    /// Open a session with a freshly generated id.
    #[must_use]
    pub fn start(now_ms: i64) -> Self {
        Self::with_id(generate_session_id(now_ms), now_ms)
    }

    /// Open a session with a known id.
    #[must_use]
    pub fn with_id(id: String, start_ms: i64) -> Self {
        Self {
            id,
            start_time: start_ms,
            end_time: None,
            duration_ms: 0,
            distractions: Vec::new(),
            distraction_count: 0,
            focus_rate: perfect_focus_rate(),
            is_completed: false,
        }
    }

    /// Update the active duration from a timer tick.
    ///
    /// Smaller values are ignored so the duration stays monotonic.
    pub fn update_duration(&mut self, elapsed_ms: i64) {
        if elapsed_ms > self.duration_ms {
            self.duration_ms = elapsed_ms;
            self.recompute_focus_rate();
        }
    }

    /// Append a distraction and rescore.
    pub fn record_distraction(&mut self, event: DistractionEvent) {
        self.distractions.push(event);
        self.distraction_count = self.distractions.len();
        self.recompute_focus_rate();
    }

    /// Rescore against this session's own duration.
    pub fn recompute_focus_rate(&mut self) {
        self.focus_rate = focus_rate(self.distraction_count, self.duration_ms);
    }

    /// Stamp the end time and mark the session completed.
    pub fn complete(&mut self, now_ms: i64) {
        self.end_time = Some(now_ms);
        self.is_completed = true;
    }

    /// Duration in fractional minutes.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_minutes(&self) -> f64 {
        self.duration_ms as f64 / 60_000.0
    }
}

/// Score attention as a percentage.
///
/// `clamp(100 - distractions_per_minute * 50, 0, 100)`, rounded. Durations
/// under one minute always score 100.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn focus_rate(distractions: usize, duration_ms: i64) -> u8 {
    if duration_ms < FOCUS_RATE_MIN_DURATION_MS {
        return 100;
    }

    let minutes = duration_ms as f64 / 60_000.0;
    let per_minute = distractions as f64 / minutes;
    let rate = (100.0 - per_minute * FOCUS_RATE_PENALTY_PER_DPM).clamp(0.0, 100.0);

    rate.round() as u8
}

/// Generate a session id from the start time and a random base-36 suffix.
#[must_use]
pub fn generate_session_id(now_ms: i64) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect();

    format!("session_{now_ms}_{suffix}")
}

/// Round to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
