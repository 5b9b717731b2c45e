use proptest::prelude::*;
use squeeze_batch::analysis::ImageAnalysis;
use squeeze_batch::archive::sanitize_label;
use squeeze_batch::formats::{is_image_file, SourceFormat};
use squeeze_batch::batch::BatchResult;
use squeeze_batch::error::CompressionError;
use squeeze_batch::processing::{converge, CompressionOutcome};
use squeeze_batch::resize::scaled_dimensions;
use squeeze_batch::{select_policy, Category, CompressionSettings};
use std::path::{Path, PathBuf};

const MB: f64 = 1024.0 * 1024.0;

fn analysis(file_size_mb: f64, width: u32, height: u32) -> ImageAnalysis {
    ImageAnalysis {
        file_size_bytes: (file_size_mb * MB) as u64,
        file_size_mb,
        width,
        height,
        max_dimension: width.max(height),
        aspect_ratio: width as f64 / height as f64,
        format: SourceFormat::Jpeg,
        likely_optimized: false,
        has_alpha: false,
    }
}

fn category_strategy() -> impl Strategy<Value = Category> {
    prop::sample::select(vec![
        Category::KnownOptimized,
        Category::Huge,
        Category::Large,
        Category::Medium,
        Category::Small,
    ])
}

fn outcome_strategy() -> impl Strategy<Value = CompressionOutcome> {
    (category_strategy(), 1u64..30_000_000u64, 0u64..=100u64).prop_map(
        |(category, original_bytes, percent)| CompressionOutcome {
            source_name: "in.jpg".to_string(),
            output_name: "in_compressed.jpg".to_string(),
            original_bytes,
            final_bytes: original_bytes * percent / 100,
            category,
            quality: 80,
            attempts: 1,
            kept_original: percent == 100,
        },
    )
}

proptest! {
    #[test]
    fn category_sums_match_successful_totals(
        entries in prop::collection::vec(prop::option::of(outcome_strategy()), 0..40)
    ) {
        let mut result = BatchResult::default();
        let mut expected_original = 0.0;
        let mut expected_successes = 0;

        for (index, entry) in entries.into_iter().enumerate() {
            match entry {
                Some(outcome) => {
                    expected_original += outcome.original_mb();
                    expected_successes += 1;
                    result.record_success(outcome);
                }
                None => {
                    let path = PathBuf::from(format!("broken_{}.jpg", index));
                    let error = CompressionError::UnreadableImage(path.clone(), "corrupt".to_string());
                    result.record_failure(&path, error);
                }
            }
        }
        result.finalize();

        let category_original: f64 = result.categories.values().map(|c| c.original_mb).sum();
        let category_compressed: f64 = result.categories.values().map(|c| c.compressed_mb).sum();
        let category_count: usize = result.categories.values().map(|c| c.count).sum();

        prop_assert_eq!(result.successful, expected_successes);
        prop_assert_eq!(category_count, result.successful);
        prop_assert_eq!(result.failures.len(), result.failed);
        prop_assert!((result.total_original_mb - expected_original).abs() < 1e-6);
        prop_assert!((category_original - result.total_original_mb).abs() < 1e-6);
        prop_assert!((category_compressed - result.total_compressed_mb).abs() < 1e-6);
        for stats in result.categories.values() {
            prop_assert!(stats.compressed_mb <= stats.original_mb + 1e-9);
            prop_assert!(stats.savings_percent.is_some());
        }
    }

    #[test]
    fn settings_quality_validation(quality in 0u8..=255u8) {
        let result = CompressionSettings::new(Some(quality), None, false);
        prop_assert_eq!(result.is_ok(), (1..=100).contains(&quality));
    }

    #[test]
    fn resize_respects_max_dimension(
        width in 1u32..=8000u32,
        height in 1u32..=8000u32,
        max_dimension in 1u32..=4000u32
    ) {
        match scaled_dimensions(width, height, Some(max_dimension)) {
            None => prop_assert!(width.max(height) <= max_dimension),
            Some((w, h)) => {
                prop_assert!(w >= 1 && h >= 1);
                prop_assert_eq!(w.max(h), max_dimension);

                // Aspect ratio holds within one pixel of rounding.
                let expected_h = w as f64 * height as f64 / width as f64;
                let expected_w = h as f64 * width as f64 / height as f64;
                prop_assert!((h as f64 - expected_h).abs() <= 1.0 || (w as f64 - expected_w).abs() <= 1.0);
            }
        }
    }

    #[test]
    fn huge_tier_boundary(size_mb in 0.0f64..20.0, dim in 1u32..6000u32) {
        let policy = select_policy(&analysis(size_mb, dim, dim / 2 + 1), &CompressionSettings::default());
        let expect_huge = size_mb > 10.0 || dim > 3000;
        prop_assert_eq!(policy.category == Category::Huge, expect_huge);
        prop_assert_eq!(policy.aggressive, expect_huge);
    }

    #[test]
    fn no_resize_beats_max_dimension(
        size_mb in 0.0f64..20.0,
        dim in 1u32..6000u32,
        max_dimension in prop::option::of(1u32..5000u32),
        quality in prop::option::of(1u8..=100u8)
    ) {
        let settings = CompressionSettings::new(quality, max_dimension, true).unwrap();
        let policy = select_policy(&analysis(size_mb, dim, dim), &settings);
        prop_assert_eq!(policy.max_dimension, None);
        if let Some(q) = quality {
            prop_assert_eq!(policy.quality, q);
        }
    }

    #[test]
    fn overrides_never_change_category(
        size_mb in 0.0f64..20.0,
        dim in 1u32..6000u32,
        max_dimension in 1u32..5000u32,
        quality in 1u8..=100u8
    ) {
        let info = analysis(size_mb, dim, dim);
        let tier = select_policy(&info, &CompressionSettings::default());
        let settings = CompressionSettings::new(Some(quality), Some(max_dimension), false).unwrap();
        let overridden = select_policy(&info, &settings);

        prop_assert_eq!(overridden.category, tier.category);
        prop_assert_eq!(overridden.aggressive, tier.aggressive);
        prop_assert_eq!(overridden.quality, quality);
        prop_assert_eq!(overridden.max_dimension, Some(max_dimension));
    }

    #[test]
    fn convergence_is_bounded_and_monotonic(
        start in 1u8..=100u8,
        target in 0u64..10_000u64,
        base_size in 0u64..20_000u64
    ) {
        let mut seen = Vec::new();
        let result = converge(start, target, |q| {
            seen.push(q);
            Ok(vec![0u8; (base_size * q as u64 / 100) as usize])
        })
        .unwrap();

        prop_assert!(!seen.is_empty() && seen.len() <= 5);
        prop_assert!(seen.windows(2).all(|w| w[1] < w[0]));
        prop_assert!(seen.iter().skip(1).all(|&q| q >= 30));
        prop_assert_eq!(result.attempts as usize, seen.len());
        prop_assert_eq!(Some(&result.quality), seen.last());
    }

    #[test]
    fn sanitized_labels_are_safe(label in ".{0,40}") {
        let cleaned = sanitize_label(&label);
        prop_assert!(!cleaned.is_empty());
        prop_assert!(cleaned
            .chars()
            .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_'));
        prop_assert_eq!(cleaned.trim(), cleaned.as_str());
    }

    #[test]
    fn is_image_file_recognizes_extensions(
        extension in prop::sample::select(&["jpg", "JPEG", "png", "webp", "bmp", "tif", "tiff", "gif", "txt", "heic"])
    ) {
        let filename = format!("test.{}", extension);
        let expected = matches!(
            extension.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp" | "tif" | "tiff"
        );
        prop_assert_eq!(is_image_file(Path::new(&filename)), expected);
    }
}
