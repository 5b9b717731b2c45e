use image::imageops::FilterType;
use image::DynamicImage;

/// Target dimensions for fitting `(width, height)` inside `max_dimension`.
///
/// Both sides are scaled by the same factor and rounded independently to
/// the nearest integer, never below 1. Returns `None` when no resize is
/// needed.
pub fn scaled_dimensions(width: u32, height: u32, max_dimension: Option<u32>) -> Option<(u32, u32)> {
    let max_dimension = max_dimension?;
    let longer = width.max(height);
    if longer <= max_dimension || max_dimension == 0 {
        return None;
    }

    let scale = max_dimension as f64 / longer as f64;
    let scale_side = |side: u32| ((side as f64 * scale).round() as u32).max(1);
    Some((scale_side(width), scale_side(height)))
}

/// Proportionally downscale so the longer side is at most `max_dimension`.
pub fn resize_to_max_dimension(img: DynamicImage, max_dimension: Option<u32>) -> DynamicImage {
    match scaled_dimensions(img.width(), img.height(), max_dimension) {
        Some((width, height)) => {
            tracing::debug!(
                "Resizing {}x{} -> {}x{}",
                img.width(),
                img.height(),
                width,
                height
            );
            img.resize_exact(width, height, FilterType::Lanczos3)
        }
        None => img,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    #[test]
    fn test_scaled_dimensions_landscape() {
        assert_eq!(scaled_dimensions(4000, 3000, Some(1200)), Some((1200, 900)));
    }

    #[test]
    fn test_scaled_dimensions_portrait() {
        assert_eq!(scaled_dimensions(1500, 3000, Some(1400)), Some((700, 1400)));
    }

    #[test]
    fn test_scaled_dimensions_rounds_to_nearest() {
        // 1001 * (1000 / 3000) = 333.67
        assert_eq!(scaled_dimensions(3000, 1001, Some(1000)), Some((1000, 334)));
    }

    #[test]
    fn test_scaled_dimensions_never_zero() {
        assert_eq!(scaled_dimensions(5000, 1, Some(100)), Some((100, 1)));
    }

    #[test]
    fn test_no_resize_when_within_bounds() {
        assert_eq!(scaled_dimensions(800, 600, Some(800)), None);
        assert_eq!(scaled_dimensions(800, 600, Some(1600)), None);
        assert_eq!(scaled_dimensions(8000, 6000, None), None);
    }

    #[test]
    fn test_resize_to_max_dimension() {
        let img = DynamicImage::new_rgb8(2000, 1500);
        let resized = resize_to_max_dimension(img, Some(1000));
        assert_eq!(resized.dimensions(), (1000, 750));
    }

    #[test]
    fn test_resize_noop_without_target() {
        let img = DynamicImage::new_rgb8(2000, 1500);
        let resized = resize_to_max_dimension(img, None);
        assert_eq!(resized.dimensions(), (2000, 1500));
    }

    #[test]
    fn test_resize_never_upscales() {
        let img = DynamicImage::new_rgb8(300, 200);
        let resized = resize_to_max_dimension(img, Some(1200));
        assert_eq!(resized.dimensions(), (300, 200));
    }
}
