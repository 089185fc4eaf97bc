//! Visual Perceiver - screen capture contract and screenshot normalisation
//!
//! This crate provides:
//! - the `CapturePort` contract the agent loop captures through
//! - the `Capture` model (JPEG bytes, physical size, display scale)
//! - PNG to JPEG normalisation for host screenshots

pub mod errors;
pub mod models;
pub mod ports;
pub mod screenshot;

// Re-exports
pub use errors::CaptureError;
pub use models::*;
pub use ports::CapturePort;
pub use screenshot::{normalize_screenshot, JPEG_QUALITY};
