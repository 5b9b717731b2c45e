use crate::analysis::{ImageAnalysis, ImageAnalyzer};
use crate::constants::INFO_PREFIX;
use crate::error::{CompressionError, Result};
use crate::policy::{select_policy, CompressionPolicy, CompressionSettings};
use crate::resize::scaled_dimensions;
use crate::utils::format_file_size;
use std::path::Path;

/// Analyze a file and resolve the policy it would be compressed with.
pub fn get_image_info(
    input_path: &Path,
    analyzer: &ImageAnalyzer,
    settings: &CompressionSettings,
) -> Result<(ImageAnalysis, CompressionPolicy)> {
    if !input_path.exists() {
        return Err(CompressionError::FileNotFound(input_path.to_path_buf()));
    }

    let analysis = analyzer.analyze(input_path)?;
    let policy = select_policy(&analysis, settings);
    Ok((analysis, policy))
}

/// Lines printed by the `analyze` command.
pub fn describe(input_path: &Path, analysis: &ImageAnalysis, policy: &CompressionPolicy) -> Vec<String> {
    let yes_no = |flag: bool| if flag { "yes" } else { "no" };

    let mut lines = vec![
        format!("{} Analysis of {}", INFO_PREFIX, input_path.display()),
        format!("  🎭 Format: {}", analysis.format),
        format!(
            "  📦 File size: {} ({:.2} MB)",
            format_file_size(analysis.file_size_bytes),
            analysis.file_size_mb
        ),
        format!("  📏 Dimensions: {}x{} pixels", analysis.width, analysis.height),
        format!("  📐 Aspect ratio: {:.2}:1", analysis.aspect_ratio),
        format!("  🎨 Transparency: {}", yes_no(analysis.has_alpha)),
        format!("  🔖 Already optimized: {}", yes_no(analysis.likely_optimized)),
        String::new(),
        "💡 Compression policy:".to_string(),
        format!("  🏷️  Category: {}", policy.category),
        format!("  📝 Description: {}", policy.description),
        format!("  🎯 Quality: {}", policy.quality),
    ];

    match policy.max_dimension {
        Some(max_dimension) => {
            let target = scaled_dimensions(analysis.width, analysis.height, Some(max_dimension))
                .unwrap_or((analysis.width, analysis.height));
            lines.push(format!(
                "  📏 Max dimension: {}px (output {}x{})",
                max_dimension, target.0, target.1
            ));
        }
        None => lines.push("  📏 Max dimension: unchanged".to_string()),
    }
    lines.push(format!("  🔁 Iterative mode: {}", yes_no(policy.aggressive)));

    lines
}

pub fn print_image_info(input_path: &Path, analysis: &ImageAnalysis, policy: &CompressionPolicy) {
    for line in describe(input_path, analysis, policy) {
        println!("{}", line);
    }
}
