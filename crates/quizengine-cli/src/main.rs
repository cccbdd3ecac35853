//! quizengine CLI: play quizzes from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use quizengine_core::model::Difficulty;

mod commands;

#[derive(Parser)]
#[command(
    name = "quizengine",
    version,
    about = "Timed multiple-choice quizzes in the terminal"
)]
struct Cli {
    /// Log session activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a quiz and play it interactively
    Play {
        /// Quiz topic (prompted for when omitted)
        #[arg(long)]
        topic: Option<String>,

        /// Difficulty: easy, medium, hard
        #[arg(long)]
        difficulty: Option<Difficulty>,

        /// Number of questions
        #[arg(long)]
        questions: Option<u32>,

        /// Time limit in minutes (0 for untimed)
        #[arg(long)]
        time_limit: Option<u32>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Use the built-in sample questions instead of the quiz service
        #[arg(long)]
        offline: bool,
    },

    /// List suggested quiz topics
    Topics,

    /// Create a starter quizengine.toml
    Init,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Play {
            topic,
            difficulty,
            questions,
            time_limit,
            config,
            offline,
        } => {
            commands::play::execute(commands::play::PlayOptions {
                topic,
                difficulty,
                questions,
                time_limit,
                config,
                offline,
            })
            .await
        }
        Commands::Topics => commands::topics::execute(),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
