//! Data models for screen captures
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use deskpilot_core_types::ScaleFactor;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// One full-display screenshot in physical pixels.
#[derive(Debug, Clone)]
pub struct Capture {
    /// Unique identifier for the capture
    pub id: String,

    /// Encoded image bytes
    pub data: Vec<u8>,

    pub format: ImageFormat,

    /// Physical (device pixel) dimensions
    pub width: u32,
    pub height: u32,

    /// Physical pixels per logical point on the captured display
    pub scale_factor: ScaleFactor,

    pub timestamp: SystemTime,
}

impl Capture {
    pub fn media_type(&self) -> &'static str {
        self.format.media_type()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    /// Logical (point) size of the display.
    pub fn logical_size(&self) -> (u32, u32) {
        let scale = self.scale_factor.get();
        (
            (self.width as f64 / scale).round() as u32,
            (self.height as f64 / scale).round() as u32,
        )
    }
}

/// Image format for captures
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn media_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}
