//! Key identity policies.
//!
//! A detected marker gets its key index from its position among the markers
//! found in the same frame. When the number of markers changes between
//! frames, the indices shift and no longer refer to the same physical key.
//! The policy sits behind [`KeyOrdering`] so a tracker that matches markers
//! against previous frames can replace it without touching the detector.

use nalgebra::Point2;
use paper_piano_core::KeyPoint;

/// Assigns key indices to the marker centers found in one frame.
pub trait KeyOrdering {
    /// `points` are frame coordinates in no particular order.
    fn assign(&mut self, points: Vec<Point2<f32>>) -> Vec<KeyPoint>;
}

/// Index 0 is the leftmost marker, indices grow with x.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AscendingX;

impl KeyOrdering for AscendingX {
    fn assign(&mut self, mut points: Vec<Point2<f32>>) -> Vec<KeyPoint> {
        points.sort_by(|a, b| a.x.total_cmp(&b.x));
        points
            .into_iter()
            .enumerate()
            .map(|(index, position)| KeyPoint { index, position })
            .collect()
    }
}
