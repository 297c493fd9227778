use crate::models::{NormalizedImage, RawImage};
use crate::utils::PassportError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, RgbaImage};
use log::debug;
use std::io::Cursor;
use std::path::Path;

/// Grayscale conversion and contrast enhancement ahead of OCR.
pub struct ImageProcessor;

impl ImageProcessor {
    /// Read an image file and decode it to RGBA.
    pub fn open(image_path: &Path, max_bytes: usize) -> Result<RawImage, PassportError> {
        let bytes = std::fs::read(image_path).map_err(|e| {
            PassportError::DecodeError(format!("Failed to read {}: {}", image_path.display(), e))
        })?;
        Self::load_bytes(&bytes, max_bytes)
    }

    /// Decode an encoded image payload (PNG, JPEG, ...) to RGBA.
    pub fn load_bytes(bytes: &[u8], max_bytes: usize) -> Result<RawImage, PassportError> {
        if bytes.len() > max_bytes {
            return Err(PassportError::ImageTooLarge {
                size: bytes.len(),
                limit: max_bytes,
            });
        }

        let img = image::load_from_memory(bytes)
            .map_err(|e| PassportError::DecodeError(e.to_string()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        debug!("Decoded {}x{} image ({} bytes)", width, height, bytes.len());

        RawImage::new(width, height, rgba.into_raw())
    }

    /// Contrast curve multiplier for a contrast setting `c`.
    pub fn contrast_factor(contrast: f64) -> f64 {
        (259.0 * (contrast * 255.0 + 255.0)) / (255.0 * (259.0 - contrast * 255.0))
    }

    /// BT.601 luminance, rounded to the nearest level.
    pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
        (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64).round()
    }

    /// Convert to grayscale and apply the contrast curve. The input is left untouched.
    pub fn normalize(image: &RawImage, contrast: f64) -> NormalizedImage {
        let factor = Self::contrast_factor(contrast);
        let mut pixels = Vec::with_capacity(image.pixels.len());

        for px in image.pixels.chunks_exact(4) {
            let gray = Self::luminance(px[0], px[1], px[2]);
            let value = (factor * (gray - 128.0) + 128.0).clamp(0.0, 255.0).round() as u8;
            pixels.extend_from_slice(&[value, value, value, px[3]]);
        }

        NormalizedImage {
            width: image.width,
            height: image.height,
            pixels,
        }
    }

    pub fn encode_png(image: &NormalizedImage) -> Result<Vec<u8>, PassportError> {
        let buffer = RgbaImage::from_raw(image.width, image.height, image.pixels.clone())
            .ok_or_else(|| {
                PassportError::Unexpected("normalized buffer does not match its dimensions".to_string())
            })?;

        let mut encoded = Vec::new();
        DynamicImage::ImageRgba8(buffer)
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .map_err(|e| PassportError::Unexpected(format!("Failed to encode image: {}", e)))?;
        Ok(encoded)
    }

    /// PNG payload as a `data:` URI, for engines that take encoded input.
    pub fn to_data_uri(image: &NormalizedImage) -> Result<String, PassportError> {
        let png = Self::encode_png(image)?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(r: u8, g: u8, b: u8, a: u8) -> RawImage {
        RawImage::new(2, 1, vec![r, g, b, a, r, g, b, a]).unwrap()
    }

    #[test]
    fn test_contrast_factor_for_default_setting() {
        let factor = ImageProcessor::contrast_factor(1.5);
        assert!((factor - (-5.242914)).abs() < 1e-5);
    }

    #[test]
    fn test_mid_gray_is_fixed_point() {
        let out = ImageProcessor::normalize(&solid(128, 128, 128, 255), 1.5);
        assert_eq!(&out.pixels[..4], &[128, 128, 128, 255]);
    }

    #[test]
    fn test_extremes_clamp() {
        // The default contrast yields a negative factor, which inverts the extremes.
        let white = ImageProcessor::normalize(&solid(255, 255, 255, 10), 1.5);
        assert_eq!(&white.pixels[..4], &[0, 0, 0, 10]);
        let black = ImageProcessor::normalize(&solid(0, 0, 0, 200), 1.5);
        assert_eq!(&black.pixels[..4], &[255, 255, 255, 200]);
    }

    #[test]
    fn test_channels_equal_and_input_untouched() {
        let raw = RawImage::new(1, 1, vec![200, 30, 90, 77]).unwrap();
        let before = raw.clone();
        let out = ImageProcessor::normalize(&raw, 0.2);

        assert_eq!(raw, before);
        assert_eq!(out.width, 1);
        assert_eq!(out.height, 1);
        assert_eq!(out.pixels[0], out.pixels[1]);
        assert_eq!(out.pixels[1], out.pixels[2]);
        assert_eq!(out.pixels[3], 77);
    }

    #[test]
    fn test_luminance_weights() {
        assert_eq!(ImageProcessor::luminance(255, 0, 0), 76.0);
        assert_eq!(ImageProcessor::luminance(0, 255, 0), 150.0);
        assert_eq!(ImageProcessor::luminance(0, 0, 255), 29.0);
    }

    #[test]
    fn test_corrupt_bytes_are_decode_error() {
        let err = ImageProcessor::load_bytes(b"definitely not an image", 1024).unwrap_err();
        assert!(matches!(err, PassportError::DecodeError(_)));
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let err = ImageProcessor::load_bytes(&[0u8; 64], 16).unwrap_err();
        assert!(matches!(err, PassportError::ImageTooLarge { size: 64, limit: 16 }));
    }

    #[test]
    fn test_png_round_trip_through_loader() {
        let normalized = ImageProcessor::normalize(&solid(10, 20, 30, 255), 1.5);
        let png = ImageProcessor::encode_png(&normalized).unwrap();
        let decoded = ImageProcessor::load_bytes(&png, usize::MAX).unwrap();
        assert_eq!(decoded.pixels, normalized.pixels);

        let uri = ImageProcessor::to_data_uri(&normalized).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
    }
}
