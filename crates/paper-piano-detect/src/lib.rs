//! Paper sheet and key marker detection.
//!
//! One [`PaperDetector::process`] call per camera frame:
//! - edges of the smoothed grayscale frame, dilated to close small gaps,
//! - the largest convex four-vertex outline is taken as the sheet,
//! - the sheet is rectified and dark blobs on it become key markers,
//! - marker centers are mapped back to frame coordinates and indexed.
//!
//! Shared geometry lives in `paper-piano-core`.

mod detector;
mod ordering;

pub use detector::{
    DetectError, DetectionResult, DetectionSummary, DetectorParams, EdgeParams, PaperDetector,
};
pub use ordering::{AscendingX, KeyOrdering};

pub use paper_piano_core::{KeyPoint, PerspectiveTransform, Quad};
