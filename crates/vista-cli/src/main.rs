//! Vista CLI - Headless Slideshow Player Tool
//!
//! Features:
//! - Scene list inspection
//! - Cover-fit layout calculation
//! - Scripted playback simulation

use clap::{Parser, Subcommand};

mod commands;
mod output;
mod simulate;

/// Vista CLI - Slideshow player toolkit
#[derive(Parser)]
#[command(name = "vista-cli")]
#[command(version)]
#[command(about = "Scene list inspection and playback simulation", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the scenes of a scene source
    Inspect {
        /// URL or path to the scene source JSON
        source: String,
    },

    /// Compute the cover-fit placement of content inside a target box
    Layout {
        /// Content size, e.g. 1920x1080
        #[arg(short, long)]
        content: String,

        /// Target size, e.g. 800x600
        #[arg(short, long)]
        target: String,

        /// Vertical anchor (top, center, bottom)
        #[arg(long, default_value = "center")]
        vertical: String,

        /// Horizontal anchor (left, center, right)
        #[arg(long, default_value = "center")]
        horizontal: String,
    },

    /// Drive a headless player through a sequence of steps
    Simulate {
        /// URL or path to the scene source JSON
        source: String,

        /// Viewport size
        #[arg(long, default_value = "1440x900")]
        viewport: String,

        /// Codecs the simulated browser can play
        #[arg(long, default_value = "h264,webm", value_delimiter = ',')]
        codecs: Vec<String>,

        /// Replay the current scene when it ends
        #[arg(long = "loop")]
        loop_scene: bool,

        /// Advance through the list when a scene ends
        #[arg(long)]
        repeat: bool,

        /// Start playback once a scene is ready
        #[arg(long)]
        autoplay: bool,

        /// Starting scene id
        #[arg(long, default_value = "0")]
        start: usize,

        /// Steps: next, prev, play, pause, stop, ended, poster, drain,
        /// resize, load:N, tick:SECONDS, event:NAME
        steps: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    vista_core::init();

    match cli.command {
        Commands::Inspect { source } => {
            commands::inspect(&source, &cli.format).await?;
        }
        Commands::Layout { content, target, vertical, horizontal } => {
            commands::layout(&content, &target, &vertical, &horizontal, &cli.format)?;
        }
        Commands::Simulate {
            source,
            viewport,
            codecs,
            loop_scene,
            repeat,
            autoplay,
            start,
            steps,
        } => {
            let options = simulate::SimulationOptions {
                viewport,
                codecs,
                loop_scene,
                repeat,
                autoplay,
                start,
            };
            simulate::run(&source, options, &steps, &cli.format).await?;
        }
    }

    Ok(())
}
