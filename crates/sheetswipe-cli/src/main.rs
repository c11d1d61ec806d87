use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sheetswipe_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "sheetswipe")]
#[command(author, version, about = "Replay and inspect bottom-sheet dismissal gestures")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ~/.config/sheetswipe/config.toml)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a recorded gesture trace through the arbiter
    Replay {
        /// JSON trace file
        trace: PathBuf,
        /// Frame interval used to drive animations
        #[arg(long, default_value_t = 16.0)]
        frame_ms: f64,
        /// Print the diagnostic log after the replay
        #[arg(long)]
        debug: bool,
    },
    /// Evaluate the dismissal engine for a single release
    Decide {
        /// Downward displacement in pixels
        #[arg(long, allow_hyphen_values = true)]
        dy: f64,
        /// Sheet height in pixels
        #[arg(long)]
        height: f64,
        /// Platform-reported velocity
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        vy: f64,
        /// Largest velocity in the tracker history
        #[arg(long, default_value_t = 0.0)]
        max_velocity: f64,
        /// Gesture duration in milliseconds
        #[arg(long, default_value_t = 300.0)]
        total_ms: f64,
        /// Treat the gesture as a consistent fast swipe
        #[arg(long)]
        consistent: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config path
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Replay {
            trace,
            frame_ms,
            debug,
        } => commands::replay::run(&config, &trace, frame_ms, debug),
        Commands::Decide {
            dy,
            height,
            vy,
            max_velocity,
            total_ms,
            consistent,
        } => commands::decide::run(
            &config,
            commands::decide::DecideArgs {
                dy,
                height,
                vy,
                max_velocity,
                total_ms,
                consistent,
            },
        ),
        Commands::Config { write } => {
            commands::config::run(&config, cli.config.as_deref(), write)
        }
    }
}
