use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::HOME_ENV;

#[derive(Parser)]
#[command(name = "focusbubble")]
#[command(about = "Track focus sessions and distractions from the terminal")]
#[command(long_about = "focusbubble - a focus session tracker

Times focus sessions, counts distractions, and keeps a history with
statistics and insights.

QUICK START:
  focusbubble run           Start the interactive tracker
  focusbubble stats         Show aggregate statistics
  focusbubble history       List completed sessions
  focusbubble export        Print the full export document

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

For more information on a specific command, run:
  focusbubble <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to ~/.focusbubble)
    #[arg(long, env = HOME_ENV, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Output format for command results
    ///
    /// Use 'pretty' for human-readable colored output,
    /// or 'json' for machine-readable output suitable for scripting.
    /// Defaults to `general.default_output` from config.yaml.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the interactive tracker
    ///
    /// Reads one command per line from stdin while the session timer runs.
    ///
    /// # Commands
    ///
    ///   start                  Begin a session
    ///   pause / resume         Pause or continue the session
    ///   reset                  End the session (kept if 5s or longer)
    ///   distract [tab|blur|manual]
    ///                          Record a distraction
    ///   hide / blur / leave Y  Simulate page-hidden, window-blur, pointer-leave
    ///   status / stats         Show the session or aggregate statistics
    ///   export [PATH]          Print or write the export document
    ///   clear                  Erase all history
    ///   quit                   Save and exit
    #[command(alias = "r")]
    Run(RunArgs),

    /// Show aggregate statistics and insights
    Stats,

    /// List completed sessions
    #[command(alias = "h")]
    History {
        /// Number of sessions to show (most recent first)
        #[arg(long, short = 'n', default_value = "10")]
        limit: usize,
    },

    /// Show one completed session
    Show {
        /// Session ID (session_<millis>_<suffix>)
        id: String,
    },

    /// Export sessions, statistics and insights as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },

    /// Erase all history
    ///
    /// Deletes every stored session and resets statistics.
    Clear {
        /// Confirm the deletion
        #[arg(long, short = 'f')]
        force: bool,
    },
}

/// Arguments for the interactive tracker.
#[derive(Args, Debug, Clone, Copy)]
pub struct RunArgs {
    /// Keep everything in memory; nothing is read or written on disk
    #[arg(long)]
    pub ephemeral: bool,
}
