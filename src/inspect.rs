// -- submodules
mod format;
mod ssim;

pub use format::{common_size, format_images};
pub use ssim::structural_similarity;

// -- external imports
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::map::map_pixels2;
use std::path::Path;

use crate::error::{AppError, Result};

/// Outcome of comparing two images
#[derive(Debug, Clone)]
pub struct Inspection {
    /// Structural similarity of the resized RGB pair (1.0 = identical)
    pub similarity: f64,

    /// First input exactly as decoded (not resized)
    pub image1: DynamicImage,

    /// Second input exactly as decoded (not resized)
    pub image2: DynamicImage,

    /// Absolute per-channel difference, sized to the common footprint
    pub delta: RgbImage,
}

/// Holds a pair of decoded images to be compared.
#[derive(Debug, Clone)]
pub struct ImageInspector {
    image1: DynamicImage,
    image2: DynamicImage,
}

impl ImageInspector {
    pub fn new(image1: DynamicImage, image2: DynamicImage) -> Self {
        Self { image1, image2 }
    }

    /// Decode both images from disk.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ImageLoad` if either path cannot be decoded.
    pub fn from_paths(image1_path: &Path, image2_path: &Path) -> Result<Self> {
        let image1 = load_image(image1_path)?;
        let image2 = load_image(image2_path)?;
        Ok(Self::new(image1, image2))
    }

    /// Compute SSIM and the delta image over the formatted pair, handing back
    /// the untouched originals alongside.
    pub fn image_similarity(self) -> Result<Inspection> {
        let (rgb1, rgb2) = format_images(&self.image1, &self.image2);
        tracing::debug!("Comparing at common size {:?}", rgb1.dimensions());

        let similarity = structural_similarity(&rgb1, &rgb2)?;
        let delta = absolute_difference(&rgb1, &rgb2);

        Ok(Inspection {
            similarity,
            image1: self.image1,
            image2: self.image2,
            delta,
        })
    }
}

pub fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|e| AppError::ImageLoad(format!("{:?}: {}", path, e)))
}

/// Per-pixel, per-channel `|a - b|` of two equally sized images.
pub fn absolute_difference(image1: &RgbImage, image2: &RgbImage) -> RgbImage {
    map_pixels2(image1, image2, |p: Rgb<u8>, q: Rgb<u8>| {
        Rgb([
            p[0].abs_diff(q[0]),
            p[1].abs_diff(q[1]),
            p[2].abs_diff(q[2]),
        ])
    })
}
