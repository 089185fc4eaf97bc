///! Normalisation of raw host screenshots into model-ready captures
use crate::{errors::CaptureError, models::*};
use deskpilot_core_types::ScaleFactor;
use image::codecs::jpeg::JpegEncoder;
use image::io::Reader as ImageReader;
use image::ColorType;
use std::io::Cursor;
use std::time::SystemTime;
use uuid::Uuid;

/// JPEG quality used for every capture sent to the model.
pub const JPEG_QUALITY: u8 = 90;

/// Decodes whatever the host produced (usually PNG), re-encodes it as JPEG and
/// records its physical size alongside the display scale.
pub fn normalize_screenshot(raw: &[u8], scale_factor: ScaleFactor) -> Result<Capture, CaptureError> {
    if raw.is_empty() {
        return Err(CaptureError::NoSource(
            "capture produced no image data".into(),
        ));
    }

    let img = ImageReader::new(Cursor::new(raw))
        .with_guessed_format()?
        .decode()?;
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(CaptureError::NoSource("capture is empty".into()));
    }

    let rgb = img.to_rgb8();
    let mut data = Vec::with_capacity(raw.len() / 4);
    JpegEncoder::new_with_quality(&mut data, JPEG_QUALITY).encode(
        rgb.as_raw(),
        width,
        height,
        ColorType::Rgb8,
    )?;

    tracing::debug!(width, height, scale = %scale_factor, bytes = data.len(), "capture normalised");

    Ok(Capture {
        id: Uuid::new_v4().to_string(),
        data,
        format: ImageFormat::Jpeg,
        width,
        height,
        scale_factor,
        timestamp: SystemTime::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 120, 200, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageOutputFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn png_becomes_jpeg_with_physical_dimensions() {
        let scale = ScaleFactor::new(2.0).unwrap();
        let capture = normalize_screenshot(&png(64, 40), scale).unwrap();

        assert_eq!(capture.format, ImageFormat::Jpeg);
        assert_eq!(capture.media_type(), "image/jpeg");
        assert_eq!((capture.width, capture.height), (64, 40));
        assert_eq!(capture.logical_size(), (32, 20));
        assert_eq!(&capture.data[..2], &[0xFF, 0xD8]);
        assert!(!capture.to_base64().is_empty());
    }

    #[test]
    fn empty_input_means_no_source() {
        let err = normalize_screenshot(&[], ScaleFactor::IDENTITY).unwrap_err();
        assert!(matches!(err, CaptureError::NoSource(_)));
        assert!(err.remediation().is_some());
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = normalize_screenshot(b"definitely not an image", ScaleFactor::IDENTITY)
            .unwrap_err();
        assert!(matches!(err, CaptureError::Decode(_)));
    }
}
