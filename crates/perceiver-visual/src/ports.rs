use async_trait::async_trait;

use crate::{errors::CaptureError, models::Capture};

/// Source of full-display screenshots.
#[async_trait]
pub trait CapturePort: Send + Sync {
    async fn capture(&self) -> Result<Capture, CaptureError>;
}
