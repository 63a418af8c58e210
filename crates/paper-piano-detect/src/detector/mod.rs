//! Paper and key marker detection pipeline.
//!
//! This module wires together frame edge detection, largest-quad selection,
//! rectification of the sheet and marker extraction in rectified space.

mod error;
mod params;
mod pipeline;
mod result;

pub use error::DetectError;
pub use params::{DetectorParams, EdgeParams};
pub use pipeline::PaperDetector;
pub use result::{DetectionResult, DetectionSummary};
