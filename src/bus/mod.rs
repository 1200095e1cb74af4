//! Notification bus.
//!
//! Components never call each other. They publish [`Notification`]s into a
//! FIFO queue and the composition root drains it, handing each notification
//! to every [`Subscriber`] interested in its topic. A handler runs to
//! completion before the next notification is delivered; anything it
//! publishes is queued behind the notifications already pending.

mod notification;

use std::collections::VecDeque;

use tracing::{trace, warn};

pub use notification::{DataReply, Notification, StatisticsUpdate, TickPayload, Topic};

/// Deliveries allowed in one `dispatch` call before the queue is dropped.
const MAX_DELIVERIES_PER_DISPATCH: usize = 10_000;

/// Write side of the bus handed to subscribers.
pub struct Outbox<'a> {
    queue: &'a mut VecDeque<Notification>,
}

impl Outbox<'_> {
    /// Queue a notification for delivery after the current one.
    pub fn publish(&mut self, notification: Notification) {
        trace!(topic = %notification.topic(), "queued");
        self.queue.push_back(notification);
    }
}

/// A component reacting to bus traffic.
pub trait Subscriber {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Topics this subscriber wants.
    fn topics(&self) -> &'static [Topic];

    /// Handle one notification.
    fn on_notification(&mut self, notification: &Notification, out: &mut Outbox<'_>);
}

type Listener = Box<dyn FnMut(&Notification)>;

/// Typed publish/subscribe queue.
pub struct NotificationBus {
    queue: VecDeque<Notification>,
    listeners: Vec<(Topic, Listener)>,
    delivered: u64,
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            listeners: Vec::new(),
            delivered: 0,
        }
    }

    /// Queue a notification.
    pub fn publish(&mut self, notification: Notification) {
        self.outbox().publish(notification);
    }

    /// Borrow the write side, for components acting outside a dispatch.
    pub fn outbox(&mut self) -> Outbox<'_> {
        Outbox {
            queue: &mut self.queue,
        }
    }

    /// Register a read-only observer (the presentation layer).
    pub fn listen(&mut self, topic: Topic, listener: impl FnMut(&Notification) + 'static) {
        self.listeners.push((topic, Box::new(listener)));
    }

    /// Number of queued notifications.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Total notifications delivered over the bus's lifetime.
    #[must_use]
    pub const fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Deliver queued notifications until the queue is empty.
    ///
    /// Returns the number of notifications delivered.
    pub fn dispatch(&mut self, subscribers: &mut [&mut dyn Subscriber]) -> usize {
        let mut count = 0;

        while let Some(notification) = self.queue.pop_front() {
            if count >= MAX_DELIVERIES_PER_DISPATCH {
                warn!(
                    dropped = self.queue.len() + 1,
                    "notification cascade exceeded delivery limit, dropping queue"
                );
                self.queue.clear();
                break;
            }

            let topic = notification.topic();
            for subscriber in subscribers.iter_mut() {
                if subscriber.topics().contains(&topic) {
                    trace!(%topic, subscriber = subscriber.name(), "deliver");
                    let mut out = Outbox {
                        queue: &mut self.queue,
                    };
                    subscriber.on_notification(&notification, &mut out);
                }
            }

            for (wanted, listener) in &mut self.listeners {
                if *wanted == topic {
                    listener(&notification);
                }
            }

            count += 1;
            self.delivered += 1;
        }

        count
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Counts starts and answers each with a reset.
    struct Echo {
        starts: usize,
        resets: usize,
    }

    impl Subscriber for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn topics(&self) -> &'static [Topic] {
            &[Topic::SessionStart, Topic::SessionReset]
        }

        fn on_notification(&mut self, notification: &Notification, out: &mut Outbox<'_>) {
            match notification {
                Notification::SessionStart => {
                    self.starts += 1;
                    out.publish(Notification::SessionReset);
                }
                Notification::SessionReset => self.resets += 1,
                _ => {}
            }
        }
    }

    /// Republishes forever.
    struct Loop;

    impl Subscriber for Loop {
        fn name(&self) -> &'static str {
            "loop"
        }

        fn topics(&self) -> &'static [Topic] {
            &[Topic::SessionPause]
        }

        fn on_notification(&mut self, _: &Notification, out: &mut Outbox<'_>) {
            out.publish(Notification::SessionPause);
        }
    }

    #[test]
    fn test_topic_names() {
        assert_eq!(Topic::SessionStart.as_str(), "session.start");
        assert_eq!(Topic::TimerTick.as_str(), "timer.tick");
        assert_eq!(Topic::DistractionRecorded.as_str(), "distraction.recorded");
        assert_eq!(Notification::SessionClearAllData.topic(), Topic::SessionClearAllData);
    }

    #[test]
    fn test_dispatch_delivers_cascades_in_order() {
        let mut bus = NotificationBus::new();
        let mut echo = Echo { starts: 0, resets: 0 };

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_in = Rc::clone(&seen);
        bus.listen(Topic::SessionReset, move |n| {
            seen_in.borrow_mut().push(n.topic());
        });

        bus.publish(Notification::SessionStart);
        bus.publish(Notification::SessionPause);

        let delivered = bus.dispatch(&mut [&mut echo]);

        assert_eq!(delivered, 3);
        assert_eq!(echo.starts, 1);
        assert_eq!(echo.resets, 1);
        assert_eq!(*seen.borrow(), vec![Topic::SessionReset]);
        assert_eq!(bus.pending(), 0);
        assert_eq!(bus.delivered(), 3);
    }

    #[test]
    fn test_dispatch_ignores_unsubscribed_topics() {
        let mut bus = NotificationBus::new();
        let mut echo = Echo { starts: 0, resets: 0 };

        bus.publish(Notification::SessionResume);
        assert_eq!(bus.dispatch(&mut [&mut echo]), 1);
        assert_eq!(echo.starts, 0);
        assert_eq!(echo.resets, 0);
    }

    #[test]
    fn test_runaway_cascade_is_cut_off() {
        let mut bus = NotificationBus::new();
        let mut looper = Loop;

        bus.publish(Notification::SessionPause);
        let delivered = bus.dispatch(&mut [&mut looper]);

        assert_eq!(delivered, MAX_DELIVERIES_PER_DISPATCH);
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn test_data_reply_first_responder_wins() {
        let (reply, mut rx) = DataReply::channel();
        let clone = reply.clone();

        let report = crate::features::focus::ExportReport::empty(0);
        assert!(reply.fulfil(report.clone()));
        assert!(!clone.fulfil(report));
        assert!(rx.try_recv().is_ok());
    }
}
