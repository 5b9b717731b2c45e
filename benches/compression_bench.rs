use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use squeeze_batch::analysis::{ImageAnalysis, ImageAnalyzer};
use squeeze_batch::formats::SourceFormat;
use squeeze_batch::processing::{encode_jpeg, flatten_to_rgb, Compressor};
use squeeze_batch::resize::resize_to_max_dimension;
use squeeze_batch::{select_policy, CompressionSettings};
use std::path::PathBuf;
use tempfile::TempDir;

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

fn create_test_image(width: u32, height: u32) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let test_file = temp_dir.path().join("test.png");
    gradient(width, height).save(&test_file).unwrap();
    (test_file, temp_dir)
}

fn bench_policy_selection(c: &mut Criterion) {
    let analysis = ImageAnalysis {
        file_size_bytes: 3 * 1024 * 1024,
        file_size_mb: 3.0,
        width: 2400,
        height: 1600,
        max_dimension: 2400,
        aspect_ratio: 1.5,
        format: SourceFormat::Jpeg,
        likely_optimized: false,
        has_alpha: false,
    };
    let settings = CompressionSettings::new(Some(80), Some(1600), false).unwrap();

    c.bench_function("policy_selection", |b| {
        b.iter(|| select_policy(black_box(&analysis), black_box(&settings)))
    });
}

fn bench_image_analysis(c: &mut Criterion) {
    let (test_file, _temp_dir) = create_test_image(1920, 1080);
    let analyzer = ImageAnalyzer::default();

    c.bench_function("image_analysis", |b| {
        b.iter(|| analyzer.analyze(black_box(&test_file)))
    });
}

fn bench_image_resizing(c: &mut Criterion) {
    let mut group = c.benchmark_group("image_resizing");

    for (width, height) in [(800, 600), (1920, 1080), (3840, 2160)] {
        let img = DynamicImage::ImageRgb8(gradient(width, height));

        group.bench_with_input(
            BenchmarkId::new("resize", format!("{}x{}", width, height)),
            &img,
            |b, img| b.iter(|| resize_to_max_dimension(black_box(img.clone()), Some(width / 2))),
        );
    }

    group.finish();
}

fn bench_alpha_flattening(c: &mut Criterion) {
    let rgba = RgbaImage::from_fn(1920, 1080, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, ((x + y) % 256) as u8])
    });
    let img = DynamicImage::ImageRgba8(rgba);

    c.bench_function("alpha_flattening", |b| {
        b.iter(|| flatten_to_rgb(black_box(img.clone())))
    });
}

fn bench_jpeg_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("jpeg_encoding");
    let img = gradient(1200, 900);

    for quality in [30u8, 60, 90] {
        group.bench_with_input(BenchmarkId::new("quality", quality), &quality, |b, &q| {
            b.iter(|| encode_jpeg(black_box(&img), q))
        });
    }

    group.finish();
}

fn bench_compress_file(c: &mut Criterion) {
    let (test_file, _temp_dir) = create_test_image(1920, 1080);
    let output_dir = TempDir::new().unwrap();
    let compressor = Compressor::new(output_dir.path(), CompressionSettings::default());

    c.bench_function("compress_file", |b| {
        b.iter(|| {
            let outcome = compressor.compress(black_box(&test_file));
            // Keep the output directory from filling with `_<n>` copies.
            if let Ok(outcome) = &outcome {
                let _ = std::fs::remove_file(output_dir.path().join(&outcome.output_name));
            }
            outcome
        })
    });
}

criterion_group!(
    benches,
    bench_policy_selection,
    bench_image_analysis,
    bench_image_resizing,
    bench_alpha_flattening,
    bench_jpeg_encoding,
    bench_compress_file
);
criterion_main!(benches);
