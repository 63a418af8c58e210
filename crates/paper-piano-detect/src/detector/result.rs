use image::{GrayImage, RgbImage};
use nalgebra::Point2;
use paper_piano_core::{KeyPoint, PerspectiveTransform, Quad};
use serde::{Deserialize, Serialize};

/// Output of one detection cycle.
#[derive(Clone, Debug)]
pub struct DetectionResult {
    /// Sheet corners in frame coordinates, if a sheet was found.
    pub quad: Option<Quad>,
    /// Rectification used this frame; `None` whenever `quad` is `None`.
    pub transform: Option<PerspectiveTransform>,
    /// Dilated edge mask of the frame.
    pub edges: GrayImage,
    /// Rectified sheet. Keeps the last successful rectification (or a blank
    /// buffer) when no sheet is found.
    pub rectified: RgbImage,
    /// Binary marker mask of `rectified`, same retention rule.
    pub rectified_mask: GrayImage,
    /// Marker centers in rectified coordinates, ascending x.
    pub rectified_points: Vec<Point2<f32>>,
    /// Marker centers in frame coordinates with their positional indices.
    pub key_points: Vec<KeyPoint>,
}

impl DetectionResult {
    #[inline]
    pub fn found_sheet(&self) -> bool {
        self.quad.is_some()
    }

    #[inline]
    pub fn key_count(&self) -> usize {
        self.key_points.len()
    }

    /// Serializable digest without the image buffers.
    pub fn summary(&self) -> DetectionSummary {
        DetectionSummary {
            quad: self.quad,
            rectified_size: self.transform.map(|t| [t.width, t.height]),
            key_points: self.key_points.clone(),
        }
    }
}

/// Image-free view of a [`DetectionResult`] for reports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub quad: Option<Quad>,
    pub rectified_size: Option<[u32; 2]>,
    pub key_points: Vec<KeyPoint>,
}
