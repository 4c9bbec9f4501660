use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glide_core::{AppConfig, Direction};

mod commands;

#[derive(Parser)]
#[command(name = "glide")]
#[command(author, version, about = "Momentum smooth scrolling: configuration and scene replay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this configuration file instead of ~/.config/glide/config.toml
    #[arg(short = 'c', long = "config", global = true)]
    config_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Replay a scene file against the simulated scroll host
    Simulate {
        /// Scene file (TOML)
        scene: PathBuf,
        /// Print the trace as JSON
        #[arg(long)]
        json: bool,
        /// Drive frames from a real 60 Hz timer instead of a virtual clock
        #[arg(long)]
        realtime: bool,
        /// Stop after this many animation frames
        #[arg(long, default_value_t = 10_000)]
        max_frames: usize,
        /// Override the scroll direction ("x", "y" or "xy")
        #[arg(long)]
        direction: Option<Direction>,
        /// Override velocity
        #[arg(long)]
        velocity: Option<f64>,
        /// Override friction
        #[arg(long)]
        friction: Option<f64>,
        /// Override the wheel delta scale
        #[arg(long)]
        wheel_delta_scale: Option<f64>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration file location
    Path,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config_path.unwrap_or_else(AppConfig::config_path);
    let config = AppConfig::load_from(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Init { force } => commands::config::init(&config_path, force),
            ConfigAction::Path => commands::config::path(&config_path),
        },
        Commands::Simulate {
            scene,
            json,
            realtime,
            max_frames,
            direction,
            velocity,
            friction,
            wheel_delta_scale,
        } => {
            let options = commands::simulate::Options {
                json,
                realtime,
                max_frames,
                overrides: commands::simulate::Overrides {
                    direction,
                    velocity,
                    friction,
                    wheel_delta_scale,
                },
            };
            commands::simulate::run(&scene, &config, &options).await
        }
    }
}
