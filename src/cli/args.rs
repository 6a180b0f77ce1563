//! Clap argument types and review-type selection.

use clap::Parser;
use std::path::PathBuf;

use gerry::models::{BackendName, ModelTier, ReviewType};

/// AI-assisted code review for Gerrit patches.
#[derive(Parser, Debug)]
#[command(name = "gerry", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Review the HEAD commit of the configured repository.
    Review(Box<ReviewArgs>),

    /// Fetch a change from Gerrit, review it, and post the results back.
    Gerrit(Box<GerritArgs>),

    /// Print version information.
    Version,
}

/// Review-type selection flags shared by both entry points.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct ReviewTypeFlags {
    /// Run the generic review.
    #[arg(long)]
    pub generic: bool,

    /// Run the coding-style review.
    #[arg(long)]
    pub style: bool,

    /// Run the static-analysis review.
    #[arg(long)]
    pub static_analysis: bool,
}

impl ReviewTypeFlags {
    /// Requested review types in execution order; none selected means
    /// all of them.
    pub fn selected(&self) -> Vec<ReviewType> {
        let mut kinds = Vec::new();
        if self.generic {
            kinds.push(ReviewType::Generic);
        }
        if self.style {
            kinds.push(ReviewType::Style);
        }
        if self.static_analysis {
            kinds.push(ReviewType::StaticAnalysis);
        }
        if kinds.is_empty() {
            kinds.extend(ReviewType::all());
        }
        kinds
    }
}

/// Arguments for the `review` subcommand (local review).
#[derive(Parser, Debug)]
pub struct ReviewArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Instruction file overriding the configured one for every
    /// requested review type.
    #[arg(short = 'i', long)]
    pub instruction: Option<PathBuf>,

    /// Write the review text to this file instead of stdout.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Assistant backend (overrides the configured one).
    #[arg(long)]
    pub backend: Option<BackendName>,

    /// Use the free model tier (default for local reviews).
    #[arg(short = 'f', long, conflicts_with = "paid_model")]
    pub free_model: bool,

    /// Use the paid model tier.
    #[arg(short = 'p', long)]
    pub paid_model: bool,

    #[command(flatten)]
    pub types: ReviewTypeFlags,

    /// Maximum number of most-changed files to add to the context.
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Token budget for the review context.
    #[arg(long)]
    pub max_tokens: Option<usize>,

    /// Skip confirmation prompts.
    #[arg(long)]
    pub yes: bool,

    /// Print verbose output, including file selection details.
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl ReviewArgs {
    /// The model tier this invocation asks for.
    pub fn tier(&self) -> ModelTier {
        if self.paid_model {
            ModelTier::Paid
        } else {
            ModelTier::Free
        }
    }
}

/// Arguments for the `gerrit` subcommand (Gerrit-integrated review).
#[derive(Parser, Debug)]
pub struct GerritArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Test the connection to Gerrit and exit.
    #[arg(long)]
    pub test: bool,

    /// Run the review but skip posting the results to Gerrit.
    #[arg(short = 's', long)]
    pub skip_post: bool,

    #[command(flatten)]
    pub types: ReviewTypeFlags,

    /// Skip confirmation prompts.
    #[arg(long)]
    pub yes: bool,

    /// Print verbose output, including file selection details.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Change number, change id, or Gerrit URL to review.
    #[arg(value_name = "CHANGE")]
    pub change: Option<String>,
}
