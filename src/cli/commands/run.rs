//! Interactive tracker.
//!
//! A single-threaded loop that drives the timer at the tick interval and
//! reads one command per line from stdin. Everything happens on one task, so
//! handlers never overlap.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::focus::{open_tracker, write_export};
use crate::bus::{Notification, Topic};
use crate::cli::args::{OutputFormat, RunArgs};
use crate::config::{Config, Paths};
use crate::core::SystemClock;
use crate::error::FocusError;
use crate::features::focus::{DistractionKind, EnvironmentSignal, FocusTracker};
use crate::output::{
    format_notification_pretty, format_statistics, format_status_pretty, notification_to_json,
    to_json,
};
use crate::storage::MemoryBlobStore;

const HELP: &str = "commands: start, pause, resume, reset, distract [tab|blur|manual], \
hide, blur, leave <y>, status, stats, export [path], clear, quit";

/// One line of input.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Start,
    Pause,
    Resume,
    Reset,
    Distract(DistractionKind),
    Signal(EnvironmentSignal),
    Status,
    Stats,
    Export(Option<PathBuf>),
    Clear,
    Help,
    Quit,
}

impl ReplCommand {
    /// Parse a command line. Blank lines yield `None`.
    ///
    /// # Errors
    ///
    /// Returns `FocusError::Parse` for unknown commands or bad arguments.
    pub fn parse(line: &str) -> Result<Option<Self>, FocusError> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();

        let command = match word.to_lowercase().as_str() {
            "start" | "s" => Self::Start,
            "pause" | "p" => Self::Pause,
            "resume" => Self::Resume,
            "reset" => Self::Reset,
            "distract" | "d" => {
                let kind = match arg {
                    None => DistractionKind::Manual,
                    Some(a) => DistractionKind::parse(a).ok_or_else(|| {
                        FocusError::Parse(format!("Unknown distraction type: {a}"))
                    })?,
                };
                Self::Distract(kind)
            }
            "hide" => Self::Signal(EnvironmentSignal::PageHidden),
            "blur" => Self::Signal(EnvironmentSignal::WindowBlur),
            "leave" => {
                let client_y = arg
                    .ok_or_else(|| FocusError::Parse("leave needs a y coordinate".to_string()))?
                    .parse::<f64>()
                    .map_err(|e| FocusError::Parse(format!("Invalid y coordinate: {e}")))?;
                Self::Signal(EnvironmentSignal::PointerLeave { client_y })
            }
            "status" => Self::Status,
            "stats" => Self::Stats,
            "export" => Self::Export(arg.map(PathBuf::from)),
            "clear" => Self::Clear,
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => return Err(FocusError::Parse(format!("Unknown command: {other}"))),
        };

        Ok(Some(command))
    }
}

/// Run the interactive tracker until `quit`, end of input, or Ctrl-C.
///
/// # Errors
///
/// Returns an error if the runtime or the store cannot be set up.
pub fn run(
    paths: &Paths,
    config: &Config,
    args: RunArgs,
    format: OutputFormat,
) -> Result<String, FocusError> {
    let tracker = if args.ephemeral {
        info!("Running without persistence");
        FocusTracker::new(
            Arc::new(SystemClock),
            Box::new(MemoryBlobStore::new()),
            config.focus.clone(),
        )
    } else {
        open_tracker(paths, &config.focus)?
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_loop(tracker, format))
}

async fn run_loop(mut tracker: FocusTracker, format: OutputFormat) -> Result<String, FocusError> {
    attach_listeners(&mut tracker, format);
    if let Some(session) = tracker.store().current_session() {
        print_notification(&Notification::SessionRestored(session), format);
    }

    let mut ticker = tokio::time::interval(tracker.config().tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if format == OutputFormat::Pretty {
        println!("{HELP}");
    }

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tracker.pump();
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("End of input");
                    break;
                };
                match ReplCommand::parse(&line) {
                    Ok(Some(ReplCommand::Quit)) => break,
                    Ok(Some(command)) => {
                        if let Err(e) = execute(&mut tracker, command, format).await {
                            eprintln!("{e}");
                        }
                    }
                    Ok(None) => {}
                    Err(e) => eprintln!("{e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    if !tracker.shutdown() {
        warn!("State could not be saved on exit");
    }
    Ok(String::new())
}

fn attach_listeners(tracker: &mut FocusTracker, format: OutputFormat) {
    let mut topics = vec![
        Topic::SessionStart,
        Topic::SessionPause,
        Topic::SessionResume,
        Topic::SessionReset,
        Topic::SessionClearAllData,
        Topic::DistractionRecorded,
    ];

    if format == OutputFormat::Json {
        topics.extend([Topic::TimerTick, Topic::StatisticsUpdated]);
    }
    for topic in topics {
        tracker.listen(topic, move |n| print_notification(n, format));
    }
}

fn print_notification(notification: &Notification, format: OutputFormat) {
    match format {
        OutputFormat::Pretty => {
            if let Some(line) = format_notification_pretty(notification) {
                println!("{line}");
            }
        }
        OutputFormat::Json => {
            if let Some(value) = notification_to_json(notification) {
                println!("{value}");
            }
        }
    }
}

async fn execute(
    tracker: &mut FocusTracker,
    command: ReplCommand,
    format: OutputFormat,
) -> Result<(), FocusError> {
    match command {
        ReplCommand::Start => tracker.start(),
        ReplCommand::Pause => tracker.pause(),
        ReplCommand::Resume => tracker.resume(),
        ReplCommand::Reset => tracker.reset(),
        ReplCommand::Distract(DistractionKind::Manual) => {
            if tracker.record_manual().is_none() {
                eprintln!("Distraction not recorded (no session, or too soon after the last one)");
            }
        }
        ReplCommand::Distract(kind) => tracker.report_distraction(kind),
        ReplCommand::Signal(signal) => {
            tracker.signal(signal);
        }
        ReplCommand::Status => println!("{}", status(tracker, format)?),
        ReplCommand::Stats => {
            println!("{}", format_statistics(&tracker.store().statistics(), format)?);
        }
        ReplCommand::Export(path) => {
            let report = tracker.request_export().await;
            let document = to_json(&report)?;
            match path {
                Some(path) => {
                    write_export(&path, &document)?;
                    println!("Exported to {}", path.display());
                }
                None => println!("{document}"),
            }
        }
        ReplCommand::Clear => tracker.clear_all_data(),
        ReplCommand::Help => println!("{HELP}"),
        ReplCommand::Quit => {}
    }
    Ok(())
}

fn status(tracker: &FocusTracker, format: OutputFormat) -> Result<String, FocusError> {
    let focus_rate = tracker
        .store()
        .current_session()
        .map_or_else(|| tracker.detector().focus_rate(), |s| s.focus_rate);

    match format {
        OutputFormat::Pretty => Ok(format_status_pretty(&tracker.live_state(), focus_rate)),
        OutputFormat::Json => to_json(&serde_json::json!({
            "timer": tracker.timer().snapshot(),
            "detector": tracker.detector().snapshot(),
            "currentSession": tracker.store().current_session(),
            "focusRate": focus_rate,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lifecycle_commands() {
        assert_eq!(ReplCommand::parse("start").unwrap(), Some(ReplCommand::Start));
        assert_eq!(ReplCommand::parse("  PAUSE ").unwrap(), Some(ReplCommand::Pause));
        assert_eq!(ReplCommand::parse("q").unwrap(), Some(ReplCommand::Quit));
        assert_eq!(ReplCommand::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_distractions() {
        assert_eq!(
            ReplCommand::parse("distract").unwrap(),
            Some(ReplCommand::Distract(DistractionKind::Manual))
        );
        assert_eq!(
            ReplCommand::parse("distract blur").unwrap(),
            Some(ReplCommand::Distract(DistractionKind::WindowBlur))
        );
        assert!(ReplCommand::parse("distract phone").is_err());
    }

    #[test]
    fn test_parse_signals() {
        assert_eq!(
            ReplCommand::parse("hide").unwrap(),
            Some(ReplCommand::Signal(EnvironmentSignal::PageHidden))
        );
        assert_eq!(
            ReplCommand::parse("leave -4").unwrap(),
            Some(ReplCommand::Signal(EnvironmentSignal::PointerLeave {
                client_y: -4.0
            }))
        );
        assert!(ReplCommand::parse("leave").is_err());
        assert!(ReplCommand::parse("leave up").is_err());
    }

    #[test]
    fn test_parse_export_path() {
        assert_eq!(
            ReplCommand::parse("export out.json").unwrap(),
            Some(ReplCommand::Export(Some(PathBuf::from("out.json"))))
        );
        assert!(ReplCommand::parse("dance").is_err());
    }
}
