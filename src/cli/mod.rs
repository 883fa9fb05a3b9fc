//! CLI entry point for Pitchcraft.

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Pitchcraft marketing generator CLI
#[derive(Parser, Debug)]
#[command(name = "pitchcraft", version, about = "Pitchcraft — AI marketing plan and ad generator")]
pub struct Cli {
    /// TOML config file (environment variables still take precedence)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the submitted form record
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store product details for a later `results` run
    Submit(FormArgs),
    /// Generate the plan and ads for the stored product details
    Results(OutputArgs),
    /// Submit and generate in one step
    Generate(GenerateArgs),
}

/// Product details, as the form collects them.
#[derive(Args, Debug, Clone)]
pub struct FormArgs {
    /// Product title
    #[arg(short, long)]
    pub title: String,

    /// Product description
    #[arg(short, long)]
    pub description: String,

    /// Target audience
    #[arg(short, long)]
    pub audience: String,

    /// Product image (png, jpg, gif or webp)
    #[arg(short, long)]
    pub image: Option<PathBuf>,
}

/// Where generated ads are written.
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Directory for generated ad images
    #[arg(short, long, default_value = "ads")]
    pub out: PathBuf,
}

/// Arguments for `pitchcraft generate`.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub form: FormArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}
