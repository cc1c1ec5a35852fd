//! quizgrade CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizgrade", version, about = "Quiz answer grading and session engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted session: grade answers against a question set
    Run {
        /// Path to a .toml question set
        #[arg(long)]
        questions: PathBuf,

        /// Path to a JSON file of scripted answers
        #[arg(long)]
        answers: PathBuf,

        /// Grader name from the config (default: the configured default)
        #[arg(long)]
        grader: Option<String>,

        /// Grade without a backend, using the deterministic fallbacks only
        #[arg(long)]
        offline: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate question-set TOML files
    Validate {
        /// Path to a question set file or directory
        #[arg(long)]
        questions: PathBuf,
    },

    /// Create starter config and example question set
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizgrade=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            questions,
            answers,
            grader,
            offline,
            config,
        } => commands::run::execute(questions, answers, grader, offline, config).await,
        Commands::Validate { questions } => commands::validate::execute(questions),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
