use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbImage};

/// Intersection footprint `(width, height)` of two images.
pub fn common_size(image1: &DynamicImage, image2: &DynamicImage) -> (u32, u32) {
    let (w1, h1) = image1.dimensions();
    let (w2, h2) = image2.dimensions();
    (w1.min(w2), h1.min(h2))
}

/// Convert both images to 8-bit RGB and resize them to their common size.
///
/// Content outside the smaller footprint is squeezed in by the resize, no
/// letterboxing or aspect correction is applied.
pub fn format_images(image1: &DynamicImage, image2: &DynamicImage) -> (RgbImage, RgbImage) {
    let (width, height) = common_size(image1, image2);
    let rgb1 = resize_to(image1.to_rgb8(), width, height);
    let rgb2 = resize_to(image2.to_rgb8(), width, height);
    (rgb1, rgb2)
}

fn resize_to(image: RgbImage, width: u32, height: u32) -> RgbImage {
    if image.dimensions() == (width, height) {
        return image;
    }
    imageops::resize(&image, width, height, FilterType::Triangle)
}
