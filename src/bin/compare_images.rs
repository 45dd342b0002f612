/// Compare two images and save the observation folder.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use image_observer::{CompareArgs, ObserveConfig, init_logger, parse_toml, run_comparison};

#[derive(Parser)]
#[command(about = "Compare two images and return a similarity percentage.")]
struct Cli {
    /// Path to the first image.
    image1: PathBuf,

    /// Path to the second image.
    image2: PathBuf,

    /// TOML file with an [observe] section (relative paths resolve against its directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let observe = match &cli.config {
        Some(path) => {
            let project_root = path.parent().unwrap_or(Path::new("."));
            parse_toml(path, project_root)
                .with_context(|| format!("Failed to parse config {:?}", path))?
        }
        None => ObserveConfig::default(),
    };

    let args = CompareArgs::new(cli.image1, cli.image2).with_observe(observe);
    let outcome = run_comparison(&args).context("Failed to compare images")?;

    println!("{}", summary_line(outcome.similarity));
    Ok(())
}

fn summary_line(similarity: f64) -> String {
    format!("Similarity using SSIM: {:.4}", similarity)
}
