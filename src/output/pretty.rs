use colored::{ColoredString, Colorize};

use crate::bus::Notification;
use crate::core::millis_to_datetime;
use crate::features::focus::{
    format_duration, format_duration_mmss, generate_insights, AggregateStatistics, InsightLevel,
    LiveState, Session,
};

/// Color a focus rate by band.
pub fn focus_rate_colored(rate: u8) -> ColoredString {
    let text = format!("{rate}%");
    if rate >= 90 {
        text.green()
    } else if rate >= 70 {
        text.yellow()
    } else {
        text.red()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn seconds_duration(seconds: f64) -> chrono::Duration {
    chrono::Duration::milliseconds((seconds * 1_000.0).round() as i64)
}

/// Format aggregate statistics with insights.
pub fn format_statistics_pretty(stats: &AggregateStatistics) -> String {
    let mut output = format!("{}\n", "Focus Statistics".bold());
    output.push_str(&"─".repeat(40));
    output.push('\n');

    output.push_str(&format!("  {:<22} {}\n", "Sessions".dimmed(), stats.total_sessions));
    output.push_str(&format!(
        "  {:<22} {}\n",
        "Total focus time".dimmed(),
        format_duration(seconds_duration(stats.total_time_seconds))
    ));
    output.push_str(&format!(
        "  {:<22} {}\n",
        "Distractions".dimmed(),
        stats.total_distractions
    ));
    output.push_str(&format!(
        "  {:<22} {}\n",
        "Average focus rate".dimmed(),
        focus_rate_colored(stats.average_focus_rate)
    ));

    if stats.total_sessions > 0 {
        output.push_str(&format!(
            "  {:<22} {:.2} min\n",
            "Average session".dimmed(),
            stats.average_session_minutes()
        ));
        output.push_str(&format!(
            "  {:<22} {:.2}\n",
            "Distractions/session".dimmed(),
            stats.average_distractions_per_session()
        ));
    }

    output.push('\n');
    output.push_str(&format!("{}\n", "Insights".bold()));
    for insight in generate_insights(stats) {
        let icon = match insight.level {
            InsightLevel::Positive => insight.level.icon().green(),
            InsightLevel::Neutral => insight.level.icon().yellow(),
            InsightLevel::Negative => insight.level.icon().red(),
        };
        output.push_str(&format!("  {icon} {}\n", insight.message));
    }

    output
}

/// Format completed sessions as a table.
pub fn format_sessions_pretty(sessions: &[Session]) -> String {
    if sessions.is_empty() {
        return "No focus sessions found.\n\nStart one with: focusbubble run".to_string();
    }

    let mut output = format!("{} ({})\n", "Focus Session History".bold(), sessions.len());
    output.push_str(&"═".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "{:<17} {:>9} {:>12} {:>6}  {}\n",
        "Started", "Duration", "Distractions", "Focus", "ID"
    ));
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for session in sessions {
        let started = millis_to_datetime(session.start_time)
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M");
        let duration = format_duration_mmss(chrono::Duration::milliseconds(session.duration_ms));

        output.push_str(&format!(
            "{:<17} {:>9} {:>12} {:>6}  {}\n",
            started,
            duration,
            session.distraction_count,
            focus_rate_colored(session.focus_rate),
            session.id.dimmed()
        ));
    }

    output
}

/// Format one session with its distractions.
pub fn format_session_pretty(session: &Session) -> String {
    let status = if session.is_completed {
        "[x]".green()
    } else {
        "[ ]".white()
    };

    let mut output = format!("{} {}\n", status, session.id.bold());
    output.push_str(&format!(
        "  {}: {}\n",
        "Started".dimmed(),
        millis_to_datetime(session.start_time)
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
    ));
    if let Some(end) = session.end_time {
        output.push_str(&format!(
            "  {}: {}\n",
            "Ended".dimmed(),
            millis_to_datetime(end)
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
        ));
    }
    output.push_str(&format!(
        "  {}: {}\n",
        "Duration".dimmed(),
        format_duration(chrono::Duration::milliseconds(session.duration_ms))
    ));
    output.push_str(&format!(
        "  {}: {}\n",
        "Focus rate".dimmed(),
        focus_rate_colored(session.focus_rate)
    ));

    if !session.distractions.is_empty() {
        output.push_str(&format!("  {}:\n", "Distractions".dimmed()));
        for event in &session.distractions {
            output.push_str(&format!(
                "    {} {}\n",
                format_duration_mmss(chrono::Duration::milliseconds(event.session_time_ms)),
                event.kind
            ));
        }
    }

    output
}

/// One-line status for the interactive tracker.
pub fn format_status_pretty(live: &LiveState, focus_rate: u8) -> String {
    let state = if !live.is_active {
        "idle".dimmed()
    } else if live.is_paused {
        "paused".yellow()
    } else {
        "focusing".green()
    };

    format!(
        "{} {}  distractions {}  focus {}",
        state,
        format_duration_mmss(chrono::Duration::seconds(live.current_time)).bold(),
        live.distraction_count,
        focus_rate_colored(focus_rate)
    )
}

/// Render bus traffic worth showing in the interactive tracker.
pub fn format_notification_pretty(notification: &Notification) -> Option<String> {
    match notification {
        Notification::DistractionRecorded(event) => Some(format!(
            "{} {} at {}",
            "Distraction recorded".red(),
            event.kind,
            format_duration_mmss(chrono::Duration::milliseconds(event.session_time_ms))
        )),
        Notification::SessionStart => Some("Session started".green().to_string()),
        Notification::SessionPause => Some("Session paused".yellow().to_string()),
        Notification::SessionResume => Some("Session resumed".green().to_string()),
        Notification::SessionReset => Some("Session reset".to_string()),
        Notification::SessionClearAllData => Some("All data cleared".to_string()),
        Notification::SessionRestored(session) => Some(format!(
            "{} at {}, type resume to continue",
            "Restored paused session".cyan(),
            format_duration_mmss(chrono::Duration::milliseconds(session.duration_ms))
        )),
        _ => None,
    }
}
