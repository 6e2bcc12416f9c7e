// JPEG encoding
//
// Resizes the decoded frame to the fixed output width (aspect preserved,
// narrow sources are upscaled) and encodes it at the fixed quality factor.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::RgbImage;

use crate::error::{Result, ThumbError};
use crate::extract::RawFrame;

pub trait JpegEncode {
    fn encode_jpeg(&self, frame: &RawFrame, width: u32, quality: u8) -> Result<Vec<u8>>;
}

/// Default encoder backed by the `image` crate (Lanczos3 resampling).
#[derive(Debug, Default)]
pub struct ImageJpegEncoder;

impl JpegEncode for ImageJpegEncoder {
    fn encode_jpeg(&self, frame: &RawFrame, width: u32, quality: u8) -> Result<Vec<u8>> {
        let img = RgbImage::from_raw(frame.width, frame.height, frame.pixels.clone())
            .ok_or_else(|| ThumbError::Encode("frame buffer size mismatch".to_string()))?;

        let img = if frame.width != width {
            let new_height =
                ((frame.height as f64) * (width as f64 / frame.width as f64)) as u32;
            image::imageops::resize(&img, width, new_height.max(1), FilterType::Lanczos3)
        } else {
            img
        };

        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, quality)
            .encode_image(&img)
            .map_err(|e| ThumbError::Encode(e.to_string()))?;

        if out.is_empty() {
            return Err(ThumbError::Encode("encoder produced no bytes".to_string()));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32) -> RawFrame {
        RawFrame {
            width,
            height,
            pixels: vec![0x40; (width * height * 3) as usize],
        }
    }

    #[test]
    fn test_encode_downscales_wide_frames() {
        let encoder = ImageJpegEncoder;
        let jpeg = encoder.encode_jpeg(&solid_frame(1600, 900), 800, 90).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.width(), 800);
        assert_eq!(decoded.height(), 450);
    }

    #[test]
    fn test_encode_upscales_narrow_frames() {
        let encoder = ImageJpegEncoder;
        let jpeg = encoder.encode_jpeg(&solid_frame(320, 240), 800, 90).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.width(), 800);
        assert_eq!(decoded.height(), 600);
    }

    #[test]
    fn test_encode_passes_exact_width_through() {
        let encoder = ImageJpegEncoder;
        let jpeg = encoder.encode_jpeg(&solid_frame(800, 450), 800, 90).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.width(), 800);
        assert_eq!(decoded.height(), 450);
    }

    #[test]
    fn test_encode_rejects_bad_buffer() {
        let encoder = ImageJpegEncoder;
        let bad = RawFrame {
            width: 10,
            height: 10,
            pixels: vec![0; 5],
        };
        assert!(matches!(
            encoder.encode_jpeg(&bad, 800, 90),
            Err(ThumbError::Encode(_))
        ));
    }
}
