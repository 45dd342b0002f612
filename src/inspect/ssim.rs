use image::RgbImage;
use image_compare::Algorithm;

use crate::error::{AppError, Result};

/// Mean structural similarity of two equally sized RGB images (1.0 = identical).
///
/// # Errors
///
/// Returns `AppError::Similarity` if the metric rejects the pair, e.g. when
/// the two images differ in size.
pub fn structural_similarity(image1: &RgbImage, image2: &RgbImage) -> Result<f64> {
    let result = image_compare::rgb_similarity_structure(&Algorithm::MSSIMSimple, image1, image2)
        .map_err(|e| AppError::Similarity(format!("{:?}", e)))?;
    Ok(result.score)
}
