//! Session timer.
//!
//! Tracks active time across pause/resume cycles and emits `timer.tick` at
//! most once per tick interval. The timer does not own a thread; the driver
//! calls [`SessionTimer::poll`] and the timer decides whether a tick is due.

use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use tracing::{debug, info};

use crate::bus::{Notification, Outbox, Subscriber, TickPayload, Topic};
use crate::core::Clock;

/// Timer lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Point-in-time view of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub status: TimerState,
    pub elapsed_ms: i64,
    pub current_seconds: i64,
}

/// Elapsed-time state machine.
#[derive(Debug)]
pub struct SessionTimer {
    clock: Arc<dyn Clock>,
    tick_interval_ms: i64,
    state: TimerState,
    /// `now - elapsed` at the last start/resume.
    anchor_ms: Option<i64>,
    /// Frozen value while paused or idle.
    elapsed_ms: i64,
    /// Pending tick; `None` means no callback is scheduled.
    next_tick_ms: Option<i64>,
}

impl SessionTimer {
    /// Create an idle timer.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, tick_interval_ms: i64) -> Self {
        Self {
            clock,
            tick_interval_ms: tick_interval_ms.max(1),
            state: TimerState::Idle,
            anchor_ms: None,
            elapsed_ms: 0,
            next_tick_ms: None,
        }
    }

    /// Begin timing a new session from zero.
    pub fn start(&mut self) {
        let now = self.clock.now_ms();
        self.elapsed_ms = 0;
        self.anchor_ms = Some(now);
        self.state = TimerState::Running;
        self.schedule(now);
        info!("Timer started");
    }

    /// Freeze elapsed time and cancel the pending tick.
    pub fn pause(&mut self) {
        if self.state != TimerState::Running {
            debug!(state = ?self.state, "pause ignored");
            return;
        }
        self.elapsed_ms = self.current_elapsed_ms();
        self.anchor_ms = None;
        self.state = TimerState::Paused;
        self.next_tick_ms = None;
        info!(elapsed_ms = self.elapsed_ms, "Timer paused");
    }

    /// Continue from the frozen elapsed value.
    pub fn resume(&mut self) {
        if self.state != TimerState::Paused {
            debug!(state = ?self.state, "resume ignored");
            return;
        }
        let now = self.clock.now_ms();
        self.anchor_ms = Some(now - self.elapsed_ms);
        self.state = TimerState::Running;
        self.schedule(now);
        info!(elapsed_ms = self.elapsed_ms, "Timer resumed");
    }

    /// Zero everything and cancel the pending tick.
    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
        self.anchor_ms = None;
        self.elapsed_ms = 0;
        self.next_tick_ms = None;
        info!("Timer reset");
    }

    /// Pick up a session restored from storage, paused at `elapsed_ms`.
    pub fn restore(&mut self, elapsed_ms: i64) {
        self.state = TimerState::Paused;
        self.anchor_ms = None;
        self.elapsed_ms = elapsed_ms.max(0);
        self.next_tick_ms = None;
        info!(elapsed_ms = self.elapsed_ms, "Timer restored paused");
    }

    /// Publish the exact elapsed time now, outside the tick schedule.
    ///
    /// Lets subscribers catch up before a lifecycle change. Only a running
    /// timer publishes; the pending tick is left where it is.
    pub fn sync(&mut self, out: &mut Outbox<'_>) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        let elapsed_ms = self.current_elapsed_ms();
        self.elapsed_ms = elapsed_ms;
        out.publish(Notification::TimerTick(TickPayload {
            seconds: elapsed_ms / 1_000,
            elapsed_ms,
        }));
        true
    }

    /// Emit a tick if one is due. Returns true if a tick was published.
    pub fn poll(&mut self, out: &mut Outbox<'_>) -> bool {
        let Some(due) = self.next_tick_ms else {
            return false;
        };
        if self.state != TimerState::Running {
            return false;
        }

        let now = self.clock.now_ms();
        if now < due {
            return false;
        }

        // A late poll produces one tick, not a burst of catch-up ticks.
        let next = due + self.tick_interval_ms;
        self.next_tick_ms = Some(if next > now {
            next
        } else {
            now + self.tick_interval_ms
        });

        let elapsed_ms = self.current_elapsed_ms();
        self.elapsed_ms = elapsed_ms;
        out.publish(Notification::TimerTick(TickPayload {
            seconds: elapsed_ms / 1_000,
            elapsed_ms,
        }));
        true
    }

    fn schedule(&mut self, now: i64) {
        self.next_tick_ms = Some(now + self.tick_interval_ms);
    }

    fn current_elapsed_ms(&self) -> i64 {
        match (self.state, self.anchor_ms) {
            (TimerState::Running, Some(anchor)) => (self.clock.now_ms() - anchor).max(0),
            _ => self.elapsed_ms,
        }
    }

    /// Active time so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Duration::milliseconds(self.current_elapsed_ms())
    }

    /// Whole elapsed seconds.
    #[must_use]
    pub fn current_seconds(&self) -> i64 {
        self.current_elapsed_ms() / 1_000
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> TimerState {
        self.state
    }

    /// Whether a tick callback is scheduled.
    #[must_use]
    pub const fn has_pending_tick(&self) -> bool {
        self.next_tick_ms.is_some()
    }

    /// Snapshot for the presentation layer.
    #[must_use]
    pub fn snapshot(&self) -> TimerSnapshot {
        let elapsed_ms = self.current_elapsed_ms();
        TimerSnapshot {
            status: self.state,
            elapsed_ms,
            current_seconds: elapsed_ms / 1_000,
        }
    }
}

impl Subscriber for SessionTimer {
    fn name(&self) -> &'static str {
        "timer"
    }

    fn topics(&self) -> &'static [Topic] {
        &[
            Topic::SessionStart,
            Topic::SessionPause,
            Topic::SessionResume,
            Topic::SessionReset,
            Topic::SessionRestored,
        ]
    }

    fn on_notification(&mut self, notification: &Notification, _out: &mut Outbox<'_>) {
        match notification {
            Notification::SessionRestored(session) => self.restore(session.duration_ms),
            Notification::SessionStart => self.start(),
            Notification::SessionPause => self.pause(),
            Notification::SessionResume => self.resume(),
            Notification::SessionReset => self.reset(),
            _ => {}
        }
    }
}

/// Format a duration as MM:SS.
#[must_use]
pub fn format_duration_mmss(d: Duration) -> String {
    let total_seconds = d.num_seconds().abs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

/// Format a duration as a human-readable string.
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let total_minutes = d.num_minutes();

    if total_minutes < 1 {
        let seconds = d.num_seconds();
        return format!("{} second{}", seconds, if seconds == 1 { "" } else { "s" });
    }

    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    let plural = |n: i64| if n == 1 { "" } else { "s" };

    match (hours, minutes) {
        (0, m) => format!("{m} minute{}", plural(m)),
        (h, 0) => format!("{h} hour{}", plural(h)),
        (h, m) => format!("{h} hour{}, {m} minute{}", plural(h), plural(m)),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::bus::NotificationBus;
    use crate::core::ManualClock;

    fn timer() -> (Arc<ManualClock>, SessionTimer) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let timer = SessionTimer::new(clock.clone(), 1_000);
        (clock, timer)
    }

    fn ticks(bus: &mut NotificationBus) -> Vec<TickPayload> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.listen(Topic::TimerTick, move |n| {
            if let Notification::TimerTick(p) = n {
                sink.borrow_mut().push(*p);
            }
        });
        bus.dispatch(&mut []);
        let collected = seen.borrow().clone();
        collected
    }

    #[test]
    fn test_timer_starts_idle() {
        let (_, timer) = timer();
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.current_seconds(), 0);
        assert!(!timer.has_pending_tick());
    }

    #[test]
    fn test_tick_once_per_interval() {
        let (clock, mut timer) = timer();
        let mut bus = NotificationBus::new();
        timer.start();

        clock.advance_ms(999);
        assert!(!timer.poll(&mut bus.outbox()));

        clock.advance_ms(1);
        assert!(timer.poll(&mut bus.outbox()));
        assert!(!timer.poll(&mut bus.outbox()));

        let seen = ticks(&mut bus);
        assert_eq!(seen, vec![TickPayload { seconds: 1, elapsed_ms: 1_000 }]);
    }

    #[test]
    fn test_late_poll_does_not_burst() {
        let (clock, mut timer) = timer();
        let mut bus = NotificationBus::new();
        timer.start();

        clock.advance_ms(5_500);
        assert!(timer.poll(&mut bus.outbox()));
        assert!(!timer.poll(&mut bus.outbox()));

        clock.advance_ms(1_000);
        assert!(timer.poll(&mut bus.outbox()));

        let seen = ticks(&mut bus);
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].seconds, 5);
        assert_eq!(seen[1].elapsed_ms, 6_500);
    }

    #[test]
    fn test_pause_freezes_and_resume_continues() {
        let (clock, mut timer) = timer();
        timer.start();

        clock.advance_ms(3_000);
        timer.pause();
        assert_eq!(timer.state(), TimerState::Paused);
        assert!(!timer.has_pending_tick());

        clock.advance_ms(60_000);
        assert_eq!(timer.elapsed().num_milliseconds(), 3_000);

        timer.resume();
        clock.advance_ms(2_000);
        assert_eq!(timer.elapsed().num_milliseconds(), 5_000);
    }

    #[test]
    fn test_elapsed_equals_running_time_across_many_cycles() {
        let (clock, mut timer) = timer();
        let mut bus = NotificationBus::new();
        timer.start();

        let mut running_ms = 0;
        for i in 0..50 {
            let run = 137 + i * 41;
            clock.advance_ms(run);
            running_ms += run;
            timer.poll(&mut bus.outbox());
            timer.pause();

            clock.advance_ms(10_000 + i);
            timer.poll(&mut bus.outbox());
            timer.resume();
        }

        assert_eq!(timer.elapsed().num_milliseconds(), running_ms);
    }

    #[test]
    fn test_rapid_cycling_never_ticks_faster_than_interval() {
        let (clock, mut timer) = timer();
        let mut bus = NotificationBus::new();
        timer.start();

        let mut tick_times = Vec::new();
        for _ in 0..200 {
            clock.advance_ms(150);
            if timer.poll(&mut bus.outbox()) {
                tick_times.push(clock.now_ms());
            }
            timer.pause();
            timer.resume();
        }

        for pair in tick_times.windows(2) {
            assert!(pair[1] - pair[0] >= 1_000);
        }
        assert_eq!(timer.elapsed().num_milliseconds(), 200 * 150);
    }

    #[test]
    fn test_restore_resumes_from_saved_elapsed() {
        let (clock, mut timer) = timer();
        let mut bus = NotificationBus::new();

        timer.restore(20_000);
        assert_eq!(timer.state(), TimerState::Paused);
        assert!(!timer.has_pending_tick());
        clock.advance_ms(5_000);
        assert_eq!(timer.current_seconds(), 20);

        timer.resume();
        clock.advance_ms(1_000);
        assert!(timer.poll(&mut bus.outbox()));

        let seen = ticks(&mut bus);
        assert_eq!(seen, vec![TickPayload { seconds: 21, elapsed_ms: 21_000 }]);
    }

    #[test]
    fn test_sync_publishes_between_ticks() {
        let (clock, mut timer) = timer();
        let mut bus = NotificationBus::new();

        assert!(!timer.sync(&mut bus.outbox()));
        timer.start();
        clock.advance_ms(1_700);
        assert!(timer.sync(&mut bus.outbox()));

        clock.advance_ms(300);
        assert!(timer.poll(&mut bus.outbox()));

        let seen = ticks(&mut bus);
        assert_eq!(seen[0].elapsed_ms, 1_700);
        assert_eq!(seen[1].elapsed_ms, 2_000);

        timer.pause();
        assert!(!timer.sync(&mut bus.outbox()));
    }

    #[test]
    fn test_reset_cancels_pending_tick() {
        let (clock, mut timer) = timer();
        let mut bus = NotificationBus::new();
        timer.start();
        clock.advance_ms(2_500);
        timer.reset();

        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.current_seconds(), 0);
        assert!(!timer.has_pending_tick());

        clock.advance_ms(5_000);
        assert!(!timer.poll(&mut bus.outbox()));
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn test_pause_and_resume_ignored_in_wrong_state() {
        let (clock, mut timer) = timer();
        timer.resume();
        assert_eq!(timer.state(), TimerState::Idle);

        timer.pause();
        assert_eq!(timer.state(), TimerState::Idle);

        timer.start();
        clock.advance_ms(1_000);
        timer.resume();
        assert_eq!(timer.state(), TimerState::Running);
        assert_eq!(timer.elapsed().num_milliseconds(), 1_000);
    }

    #[test]
    fn test_bus_lifecycle_drives_timer() {
        let (clock, mut timer) = timer();
        let mut bus = NotificationBus::new();

        bus.publish(Notification::SessionStart);
        bus.dispatch(&mut [&mut timer]);
        assert_eq!(timer.state(), TimerState::Running);

        clock.advance_ms(4_000);
        bus.publish(Notification::SessionPause);
        bus.dispatch(&mut [&mut timer]);
        assert_eq!(timer.snapshot().current_seconds, 4);

        bus.publish(Notification::SessionReset);
        bus.dispatch(&mut [&mut timer]);
        assert_eq!(timer.snapshot().status, TimerState::Idle);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::minutes(25)), "25 minutes");
        assert_eq!(format_duration(Duration::minutes(1)), "1 minute");
        assert_eq!(format_duration(Duration::hours(2)), "2 hours");
        assert_eq!(format_duration(Duration::minutes(90)), "1 hour, 30 minutes");
        assert_eq!(format_duration(Duration::seconds(42)), "42 seconds");
    }

    #[test]
    fn test_format_duration_mmss() {
        assert_eq!(format_duration_mmss(Duration::minutes(25)), "25:00");
        assert_eq!(format_duration_mmss(Duration::seconds(90)), "01:30");
        assert_eq!(format_duration_mmss(Duration::seconds(0)), "00:00");
    }
}
