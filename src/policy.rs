//! Size-tier compression policies.
//!
//! Tiers are evaluated top to bottom and the first match wins. User
//! overrides replace quality and max dimension after the tier is chosen;
//! the category label and the aggressive flag always describe the tier,
//! never the overridden values, so reports group files by what they were
//! on arrival.

use crate::analysis::ImageAnalysis;
use crate::constants::*;
use crate::error::{CompressionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    #[serde(rename = "Pre-optimized")]
    KnownOptimized,
    #[serde(rename = "A - Huge")]
    Huge,
    #[serde(rename = "B - Large")]
    Large,
    #[serde(rename = "C - Medium")]
    Medium,
    #[serde(rename = "D - Small")]
    Small,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::KnownOptimized => "Pre-optimized",
            Category::Huge => "A - Huge",
            Category::Large => "B - Large",
            Category::Medium => "C - Medium",
            Category::Small => "D - Small",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompressionPolicy {
    pub quality: u8,
    /// `None` keeps the original dimensions.
    pub max_dimension: Option<u32>,
    pub aggressive: bool,
    pub category: Category,
    pub description: String,
}

/// Per-run user overrides. `no_resize` beats `max_dimension`, which beats
/// the tier default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionSettings {
    pub quality: Option<u8>,
    pub max_dimension: Option<u32>,
    pub no_resize: bool,
}

impl CompressionSettings {
    pub fn new(quality: Option<u8>, max_dimension: Option<u32>, no_resize: bool) -> Result<Self> {
        let settings = Self {
            quality,
            max_dimension,
            no_resize,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(quality) = self.quality {
            if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
                return Err(CompressionError::InvalidQuality(quality));
            }
        }
        if self.max_dimension == Some(0) {
            return Err(CompressionError::InvalidMaxDimension(0));
        }
        Ok(())
    }

    /// Reads settings from a JSON document such as
    /// `{"quality": 80, "max_dimension": 1600, "no_resize": false}`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CompressionError::FileNotFound(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&raw)
            .map_err(|e| CompressionError::InvalidSettings(format!("{}: {}", path.display(), e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Layers explicit values over `self`; set fields in `other` win.
    pub fn merged_with(&self, other: &CompressionSettings) -> Self {
        Self {
            quality: other.quality.or(self.quality),
            max_dimension: other.max_dimension.or(self.max_dimension),
            no_resize: self.no_resize || other.no_resize,
        }
    }
}

fn tier_policy(analysis: &ImageAnalysis) -> CompressionPolicy {
    let size_mb = analysis.file_size_mb;
    let max_dim = analysis.max_dimension;

    let (category, quality, max_dimension, aggressive, description) =
        if analysis.likely_optimized && size_mb < KNOWN_OPTIMIZED_MAX_MB {
            (
                Category::KnownOptimized,
                KNOWN_OPTIMIZED_QUALITY,
                None,
                false,
                "Already optimized",
            )
        } else if size_mb > HUGE_SIZE_MB || max_dim > HUGE_DIMENSION {
            (
                Category::Huge,
                HUGE_QUALITY,
                Some(HUGE_MAX_DIMENSION),
                true,
                "Aggressive compression",
            )
        } else if size_mb > LARGE_SIZE_MB || max_dim > LARGE_DIMENSION {
            (
                Category::Large,
                LARGE_QUALITY,
                Some(LARGE_MAX_DIMENSION),
                false,
                "Medium compression",
            )
        } else if size_mb > MEDIUM_SIZE_MB || max_dim > MEDIUM_DIMENSION {
            (
                Category::Medium,
                MEDIUM_QUALITY,
                Some(MEDIUM_MAX_DIMENSION),
                false,
                "Light compression",
            )
        } else {
            (Category::Small, SMALL_QUALITY, None, false, "Minimal compression")
        };

    CompressionPolicy {
        quality,
        max_dimension,
        aggressive,
        category,
        description: description.to_string(),
    }
}

/// Resolve the policy for one analyzed image.
pub fn select_policy(analysis: &ImageAnalysis, settings: &CompressionSettings) -> CompressionPolicy {
    let mut policy = tier_policy(analysis);

    if let Some(quality) = settings.quality {
        policy.quality = quality;
        policy.description = format!("Custom quality {}%", quality);
    }

    if settings.no_resize {
        policy.max_dimension = None;
        policy.description.push_str(" (no resize)");
    } else if let Some(max_dimension) = settings.max_dimension {
        policy.max_dimension = Some(max_dimension);
        policy.description.push_str(&format!(" (max {}px)", max_dimension));
    }

    policy
}
