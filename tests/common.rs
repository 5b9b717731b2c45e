#![allow(dead_code)]

use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Deterministic byte stream so fixture sizes are stable between runs.
pub struct Noise(u64);

impl Noise {
    pub fn new(seed: u64) -> Self {
        Noise(seed)
    }

    pub fn next_byte(&mut self) -> u8 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u8
    }
}

/// PNG with the left half fully transparent, a few hundred KB at 800x400.
///
/// One bit of noise per channel keeps the PNG larger than its JPEG
/// re-encode while staying in the small tier.
pub fn write_alpha_png(path: &Path, width: u32, height: u32) {
    let mut noise = Noise::new(7);
    let img = RgbaImage::from_fn(width, height, |x, _| {
        let mut channel = |base: u8| base.wrapping_add(noise.next_byte() & 0x01);
        let alpha = if x < width / 2 { 0 } else { 255 };
        Rgba([channel(40), channel(120), channel(200), alpha])
    });
    img.save(path).unwrap();
}

/// Noisy gradient JPEG; at 4000x3000 and quality 100 it lands well above 5 MB.
pub fn write_noisy_jpeg(path: &Path, width: u32, height: u32, quality: u8) {
    let mut noise = Noise::new(42);
    let img = RgbImage::from_fn(width, height, |x, y| {
        let mut channel = |base: u32| ((base % 200) as u8).wrapping_add(noise.next_byte() & 0x0f);
        Rgb([channel(x / 20), channel(y / 15), channel((x + y) / 35)])
    });

    let writer = BufWriter::new(File::create(path).unwrap());
    let mut encoder = JpegEncoder::new_with_quality(writer, quality);
    encoder.encode_image(&img).unwrap();
}

pub fn write_solid_image(path: &Path, width: u32, height: u32) {
    RgbImage::from_pixel(width, height, Rgb([200, 100, 50]))
        .save(path)
        .unwrap();
}

pub fn write_corrupt_file(path: &Path) {
    fs::write(path, b"this is not an image at all").unwrap();
}

/// Session directory with an empty `uploads/` folder.
pub fn create_session(root: &Path, name: &str) -> PathBuf {
    let session = root.join(name);
    fs::create_dir_all(session.join("uploads")).unwrap();
    session
}

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}
