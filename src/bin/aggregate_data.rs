/// Aggregate and filter results from the image comparison.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use image_observer::{filter_observations, init_logger};

#[derive(Parser)]
#[command(about = "Aggregate and filter results from the image comparison.")]
struct Cli {
    /// Directory containing the comparison data.
    input_dir: PathBuf,

    /// Directory to save the filtered observations.
    output_dir: PathBuf,

    /// Minimum similarity score to include in the results.
    #[arg(allow_negative_numbers = true)]
    threshold: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(false);

    filter_observations(&cli.input_dir, &cli.output_dir, cli.threshold)
        .with_context(|| format!("Failed to filter {:?}", cli.input_dir))?;

    println!("{}", completion_line(&cli.output_dir));
    Ok(())
}

fn completion_line(output_dir: &Path) -> String {
    format!("Filtered data has been saved to {}", output_dir.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from(["aggregate_data", "observations", "kept", "0.8"]).unwrap();
        assert_eq!(cli.input_dir, PathBuf::from("observations"));
        assert_eq!(cli.output_dir, PathBuf::from("kept"));
        assert_eq!(cli.threshold, 0.8);
    }

    #[test]
    fn test_negative_threshold() {
        let cli = Cli::try_parse_from(["aggregate_data", "in", "out", "-0.5"]).unwrap();
        assert_eq!(cli.threshold, -0.5);
    }

    #[test]
    fn test_invalid_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["aggregate_data", "in", "out"]).is_err());
        assert!(Cli::try_parse_from(["aggregate_data", "in", "out", "high"]).is_err());
    }

    #[test]
    fn test_completion_line() {
        assert_eq!(
            completion_line(Path::new("filtered")),
            "Filtered data has been saved to filtered"
        );
    }
}
