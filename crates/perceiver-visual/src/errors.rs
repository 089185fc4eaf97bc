//! Error types for screen capture
use deskpilot_core_types::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// Nothing could be captured, usually a missing Screen Recording grant.
    #[error("no capturable screen source: {0}")]
    NoSource(String),

    /// The host capture tool ran but reported failure.
    #[error("screen capture command failed: {0}")]
    Command(String),

    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("invalid display scale: {0}")]
    InvalidScale(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaptureError {
    /// Operator guidance for failures that a permission grant can fix.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            CaptureError::NoSource(_) | CaptureError::Command(_) => Some(
                "Grant Screen Recording access: System Settings > Privacy & Security > \
                 Screen Recording, enable your terminal, then restart it. \
                 `deskpilot permissions --open` jumps to that pane.",
            ),
            _ => None,
        }
    }
}

impl From<image::ImageError> for CaptureError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode(err.to_string())
    }
}
