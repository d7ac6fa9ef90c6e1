//! Dispatch Control - CLI for training and validating dispatch models.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dispatchctl")]
#[command(about = "Ardence ticket dispatch predictor - training and evaluation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new dispatch model from historical tickets
    Train {
        /// Ticket dataset path (defaults to the configured data file)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Where to write the model artifact (defaults to the configured path)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Random seed override for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Number of trees override
        #[arg(long)]
        trees: Option<usize>,
    },

    /// Replay a trained model against historical tickets and report accuracy
    Evaluate {
        /// Ticket dataset path (defaults to the configured data file)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Model artifact path (defaults to the configured path)
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Predict the dispatch for a single ad-hoc ticket
    Predict {
        /// Ticket subject
        #[arg(long)]
        subject: String,

        /// Problem type / category
        #[arg(long)]
        problem_type: Option<String>,

        /// Comment body; repeat for multiple comments
        #[arg(long)]
        comment: Vec<String>,

        /// Model artifact path (defaults to the configured path)
        #[arg(long)]
        model: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Train { data, model, seed, trees } => commands::train(data, model, seed, trees),
        Commands::Evaluate { data, model } => commands::evaluate(data, model),
        Commands::Predict { subject, problem_type, comment, model } => {
            commands::predict(subject, problem_type, comment, model)
        }
    }
}
