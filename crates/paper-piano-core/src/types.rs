use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Closed boundary traced in a binary image, in integer pixel coordinates.
pub type Contour = Vec<Point2<i32>>;

/// Four ordered corners of the paper sheet.
///
/// Index 0 is top-left, 1 top-right, 2 bottom-right, 3 bottom-left. Build it
/// through [`crate::order_corners`] so the ordering holds regardless of the
/// order the corners were found in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub corners: [Point2<f32>; 4],
}

impl Quad {
    #[inline]
    pub fn top_left(&self) -> Point2<f32> {
        self.corners[0]
    }

    #[inline]
    pub fn top_right(&self) -> Point2<f32> {
        self.corners[1]
    }

    #[inline]
    pub fn bottom_right(&self) -> Point2<f32> {
        self.corners[2]
    }

    #[inline]
    pub fn bottom_left(&self) -> Point2<f32> {
        self.corners[3]
    }

    /// Length of the top edge, rounded and clamped to at least one pixel.
    pub fn width_px(&self) -> u32 {
        edge_px(self.top_left(), self.top_right())
    }

    /// Length of the left edge, rounded and clamped to at least one pixel.
    pub fn height_px(&self) -> u32 {
        edge_px(self.top_left(), self.bottom_left())
    }
}

fn edge_px(a: Point2<f32>, b: Point2<f32>) -> u32 {
    let len = nalgebra::distance(&a, &b);
    if len.is_finite() {
        len.round().max(1.0) as u32
    } else {
        1
    }
}

/// One detected key marker in original-frame coordinates.
///
/// `index` is positional: it is the rank of the point among the points found
/// in the same frame, so it only identifies a physical key while the number
/// of detected keys stays the same.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyPoint {
    pub index: usize,
    pub position: Point2<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_dimensions_follow_top_and_left_edges() {
        let quad = Quad {
            corners: [
                Point2::new(10.0, 10.0),
                Point2::new(110.4, 10.0),
                Point2::new(110.0, 60.0),
                Point2::new(10.0, 60.6),
            ],
        };
        assert_eq!(quad.width_px(), 100);
        assert_eq!(quad.height_px(), 51);
    }

    #[test]
    fn degenerate_quad_is_at_least_one_pixel() {
        let p = Point2::new(5.0, 5.0);
        let quad = Quad { corners: [p; 4] };
        assert_eq!(quad.width_px(), 1);
        assert_eq!(quad.height_px(), 1);
    }
}
