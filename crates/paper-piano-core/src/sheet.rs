//! Synthetic keyboard sheets: a light page with dark circular key markers,
//! optionally placed into a camera-like frame under perspective.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{sample_bilinear_rgb, PerspectiveTransform, Quad};

/// Page size and marker arrangement of a synthetic sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    pub width: u32,
    pub height: u32,
    /// Number of key markers, spread evenly along the horizontal mid-line.
    pub keys: usize,
    pub marker_radius: u32,
    /// Distance from the left/right page edge to the outermost marker centers.
    pub margin: u32,
    pub paper: [u8; 3],
    pub ink: [u8; 3],
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            width: 360,
            height: 240,
            keys: 5,
            marker_radius: 7,
            margin: 50,
            paper: [235, 235, 235],
            ink: [25, 25, 25],
        }
    }
}

impl SheetLayout {
    /// Marker centers in page pixel coordinates, left to right.
    pub fn marker_centers(&self) -> Vec<Point2<f32>> {
        let y = (self.height / 2) as f32;
        match self.keys {
            0 => Vec::new(),
            1 => vec![Point2::new((self.width / 2) as f32, y)],
            n => {
                let span = self.width.saturating_sub(2 * self.margin) as usize;
                (0..n)
                    .map(|i| Point2::new((self.margin as usize + i * span / (n - 1)) as f32, y))
                    .collect()
            }
        }
    }

    pub fn render(&self) -> RgbImage {
        let mut page = RgbImage::from_pixel(self.width, self.height, Rgb(self.paper));
        for c in self.marker_centers() {
            draw_filled_circle_mut(
                &mut page,
                (c.x as i32, c.y as i32),
                self.marker_radius as i32,
                Rgb(self.ink),
            );
        }
        page
    }
}

/// A page warped into a frame, with the frame positions of its markers.
#[derive(Clone, Debug)]
pub struct PlacedSheet {
    pub frame: RgbImage,
    pub markers: Vec<Point2<f32>>,
    pub transform: PerspectiveTransform,
}

/// Render `layout` and project it so that its corners land on `corners`
/// (top-left, top-right, bottom-right, bottom-left) inside a frame filled
/// with `background`. Returns `None` for degenerate corners.
pub fn place_sheet(
    layout: &SheetLayout,
    frame_width: u32,
    frame_height: u32,
    corners: [Point2<f32>; 4],
    background: [u8; 3],
) -> Option<PlacedSheet> {
    let page = layout.render();
    let quad = Quad { corners };
    let transform = PerspectiveTransform::from_quad(&quad, layout.width, layout.height)?;

    let max_x = layout.width.saturating_sub(1) as f32;
    let max_y = layout.height.saturating_sub(1) as f32;
    let frame = RgbImage::from_fn(frame_width, frame_height, |x, y| {
        let p = transform.to_rect(Point2::new(x as f32, y as f32));
        if p.x >= 0.0 && p.y >= 0.0 && p.x <= max_x && p.y <= max_y {
            sample_bilinear_rgb(&page, p.x, p.y)
        } else {
            Rgb(background)
        }
    });

    let markers = layout
        .marker_centers()
        .into_iter()
        .map(|c| transform.to_frame(c))
        .collect();

    Some(PlacedSheet {
        frame,
        markers,
        transform,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_spread_between_margins() {
        let layout = SheetLayout {
            keys: 3,
            ..SheetLayout::default()
        };
        let xs: Vec<f32> = layout.marker_centers().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![50.0, 180.0, 310.0]);
    }

    #[test]
    fn rendered_page_has_ink_at_marker_centers() {
        let layout = SheetLayout::default();
        let page = layout.render();
        for c in layout.marker_centers() {
            assert_eq!(page.get_pixel(c.x as u32, c.y as u32).0, layout.ink);
        }
        assert_eq!(page.get_pixel(5, 5).0, layout.paper);
    }

    #[test]
    fn placed_sheet_keeps_background_outside_quad() {
        let corners = [
            Point2::new(100.0, 80.0),
            Point2::new(460.0, 80.0),
            Point2::new(460.0, 320.0),
            Point2::new(100.0, 320.0),
        ];
        let placed =
            place_sheet(&SheetLayout::default(), 640, 480, corners, [30, 30, 30]).expect("placed");
        assert_eq!(placed.frame.get_pixel(10, 10).0, [30, 30, 30]);
        assert_eq!(placed.frame.get_pixel(120, 100).0, [235, 235, 235]);
        assert_eq!(placed.markers.len(), 5);
        assert!((placed.markers[0].x - 150.0).abs() < 0.01);
        assert!((placed.markers[0].y - 200.0).abs() < 0.01);
    }
}
