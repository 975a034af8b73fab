//! stopcite CLI - builds the multilingual stopcitingai.com site.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "stopcite")]
#[command(about = "Build the stopcitingai.com static site from its translations")]
#[command(version)]
pub struct Cli {
    /// Site root containing translations, templates, fonts and assets
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Path to site.toml config file, relative to the site root
    #[arg(short, long, default_value = "site.toml")]
    config: PathBuf,

    /// Output directory (defaults to config or "public" under the root)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    commands::build::run(cli.root, cli.config, cli.output)
}
