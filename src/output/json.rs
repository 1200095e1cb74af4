//! JSON output formatting for focusbubble.

use serde::Serialize;
use serde_json::json;

use crate::bus::Notification;
use crate::error::FocusError;
use crate::features::focus::{generate_insights, AggregateStatistics, ExportStatistics, Session};

/// Format statistics with derived ratios and insights as JSON
///
/// # Errors
///
/// Returns `FocusError::Parse` if JSON serialization fails.
pub fn format_statistics_json(stats: &AggregateStatistics) -> Result<String, FocusError> {
    let insights: Vec<&str> = generate_insights(stats).iter().map(|i| i.message).collect();
    let output = json!({
        "statistics": ExportStatistics::from(stats),
        "insights": insights,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format sessions as JSON
///
/// # Errors
///
/// Returns `FocusError::Parse` if JSON serialization fails.
pub fn format_sessions_json(sessions: &[Session]) -> Result<String, FocusError> {
    let output = json!({
        "count": sessions.len(),
        "items": sessions
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// One bus notification as a `{topic, payload}` object.
///
/// Data requests carry a reply handle, not data, and are skipped.
pub fn notification_to_json(notification: &Notification) -> Option<serde_json::Value> {
    let payload = match notification {
        Notification::TimerTick(tick) => serde_json::to_value(tick).ok()?,
        Notification::DistractionDetected { kind } => json!({ "type": kind }),
        Notification::DistractionRecorded(event) => serde_json::to_value(event).ok()?,
        Notification::StatisticsUpdated(update) => serde_json::to_value(update).ok()?,
        Notification::SessionRestored(session) => serde_json::to_value(session).ok()?,
        Notification::DataRequested(_) => return None,
        Notification::SessionStart
        | Notification::SessionPause
        | Notification::SessionResume
        | Notification::SessionReset
        | Notification::SessionClearAllData => serde_json::Value::Null,
    };

    Some(json!({
        "topic": notification.topic().as_str(),
        "payload": payload,
    }))
}

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `FocusError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, FocusError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_json() {
        let out = format_statistics_json(&AggregateStatistics::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["statistics"]["averageFocusRate"], 100);
        assert_eq!(value["statistics"]["totalTimeHours"], 0.0);
        assert_eq!(value["insights"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_notification_json() {
        use crate::bus::TickPayload;

        let tick = Notification::TimerTick(TickPayload {
            seconds: 3,
            elapsed_ms: 3_250,
        });
        let value = notification_to_json(&tick).unwrap();
        assert_eq!(value["topic"], "timer.tick");
        assert_eq!(value["payload"]["elapsedMs"], 3_250);

        let start = notification_to_json(&Notification::SessionStart).unwrap();
        assert!(start["payload"].is_null());

        let (reply, _rx) = crate::bus::DataReply::channel();
        assert!(notification_to_json(&Notification::DataRequested(reply)).is_none());

        let session = Session::with_id("session_9_restored0".to_string(), 9);
        let restored = notification_to_json(&Notification::SessionRestored(session)).unwrap();
        assert_eq!(restored["topic"], "session.restored");
        assert_eq!(restored["payload"]["id"], "session_9_restored0");
    }

    #[test]
    fn test_sessions_json() {
        let session = Session::with_id("session_5_zzzzzzzzz".to_string(), 5);
        let out = format_sessions_json(&[session]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["count"], 1);
        assert_eq!(value["items"][0]["id"], "session_5_zzzzzzzzz");
        assert_eq!(value["items"][0]["startTime"], 5);
    }
}
