use std::path::PathBuf;
use std::time::Instant;

use crate::error::Result;
use crate::inspect::ImageInspector;
use crate::observe::{ObservationSaver, ObserveConfig};

#[derive(Debug, Clone, Default)]
pub struct CompareArgs {
    /// Path to the first image
    pub image1: PathBuf,

    /// Path to the second image
    pub image2: PathBuf,

    /// Where and how the observation folder is written
    pub observe: ObserveConfig,
}

impl CompareArgs {
    pub fn new(image1: impl Into<PathBuf>, image2: impl Into<PathBuf>) -> Self {
        Self {
            image1: image1.into(),
            image2: image2.into(),
            observe: ObserveConfig::default(),
        }
    }

    pub fn with_observe(mut self, observe: ObserveConfig) -> Self {
        self.observe = observe;
        self
    }
}

/// Result of one compare run
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonOutcome {
    /// Raw SSIM score (the record stores it rounded)
    pub similarity: f64,

    /// Observation folder that was written
    pub folder: PathBuf,
}

/// Core comparison API: load both images, score them and persist the
/// observation folder.
pub fn run_comparison(args: &CompareArgs) -> Result<ComparisonOutcome> {
    let start_time = Instant::now();
    tracing::info!("[Images]: {:?} vs {:?}", args.image1, args.image2);

    let inspection = ImageInspector::from_paths(&args.image1, &args.image2)?.image_similarity()?;
    tracing::info!("SSIM: {}", inspection.similarity);

    let saver = ObservationSaver::new(args.observe.clone());
    let folder = saver.save(&inspection, &args.image1, &args.image2)?;

    tracing::info!("Total comparison time: {:.3?}", start_time.elapsed());

    Ok(ComparisonOutcome {
        similarity: inspection.similarity,
        folder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    #[test]
    fn test_run_comparison_writes_folder() {
        let temp_dir = TempDir::new().unwrap();
        let image_path = temp_dir.path().join("same.png");
        RgbImage::from_fn(16, 16, |x, y| Rgb([x as u8 * 9, y as u8 * 9, 100]))
            .save(&image_path)
            .unwrap();

        let args = CompareArgs::new(&image_path, &image_path).with_observe(ObserveConfig {
            output_folder: temp_dir.path().join("observations"),
            ..Default::default()
        });
        let outcome = run_comparison(&args).unwrap();

        assert!((outcome.similarity - 1.0).abs() < 1e-6);
        assert!(outcome.folder.starts_with(temp_dir.path().join("observations")));
        assert!(outcome.folder.join("same.png").is_file());
        assert!(outcome.folder.join("delta.dds").is_file());
    }

    #[test]
    fn test_unreadable_image_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let bogus = temp_dir.path().join("bogus.png");
        std::fs::write(&bogus, "not an image").unwrap();

        let observations = temp_dir.path().join("observations");
        let args = CompareArgs::new(&bogus, &bogus).with_observe(ObserveConfig {
            output_folder: observations.clone(),
            ..Default::default()
        });

        assert!(matches!(run_comparison(&args), Err(AppError::ImageLoad(_))));
        assert!(!observations.exists());
    }
}
