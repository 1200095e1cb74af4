use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use focusbubble::cli::args::{Cli, Commands};
use focusbubble::cli::commands;
use focusbubble::config::{ColorSetting, Config, Paths};

const LOG_ENV: &str = "FOCUSBUBBLE_LOG";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {e:#}", "error".red().bold());
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn,focusbubble=info")),
        1 => EnvFilter::new("warn,focusbubble=debug"),
        _ => EnvFilter::new("warn,focusbubble=trace"),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let paths = match cli.home {
        Some(root) => Paths::with_root(root),
        None => Paths::new()?,
    };
    let config = Config::load_from_path(&paths.config_file)?;

    match config.general.color {
        ColorSetting::Always => colored::control::set_override(true),
        ColorSetting::Never => colored::control::set_override(false),
        ColorSetting::Auto => {}
    }

    let format = cli.output.unwrap_or(config.general.default_output);

    let output = match cli.command {
        Commands::Run(args) => commands::run(&paths, &config, args, format)?,
        Commands::Stats => {
            let tracker = commands::open_tracker(&paths, &config.focus)?;
            commands::stats(&tracker, format)?
        }
        Commands::History { limit } => {
            let tracker = commands::open_tracker(&paths, &config.focus)?;
            commands::history(&tracker, limit, format)?
        }
        Commands::Show { id } => {
            let tracker = commands::open_tracker(&paths, &config.focus)?;
            commands::show(&tracker, &id, format)?
        }
        Commands::Export { file } => {
            let tracker = commands::open_tracker(&paths, &config.focus)?;
            commands::export(&tracker, file.as_deref(), format)?
        }
        Commands::Clear { force } => {
            let mut tracker = commands::open_tracker(&paths, &config.focus)?;
            commands::clear(&mut tracker, force, format)?
        }
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
