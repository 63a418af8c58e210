use image::{imageops, GrayImage, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::morphology::{dilate, open};
use log::debug;
use nalgebra::Point2;
use paper_piano_core::{
    adaptive_threshold_inv, clear_border, external_contours, find_largest_quad, gaussian_blur,
    quad_from_corners, BoundingBox, PerspectiveTransform,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

use super::{DetectError, DetectionResult, DetectorParams, EdgeParams};
use crate::ordering::{AscendingX, KeyOrdering};

/// Finds the paper sheet in a frame and the key markers printed on it.
///
/// The detector keeps the last rectified sheet and its marker mask so that
/// frames where the sheet is momentarily lost still have something to show.
pub struct PaperDetector {
    params: DetectorParams,
    ordering: Box<dyn KeyOrdering + Send>,
    rectified: RgbImage,
    rectified_mask: GrayImage,
}

impl PaperDetector {
    /// Create a detector with blank `blank_size` rectified buffers.
    pub fn new(params: DetectorParams) -> Result<Self, DetectError> {
        params.validate()?;
        let [w, h] = params.blank_size;
        Ok(Self {
            rectified: RgbImage::new(w, h),
            rectified_mask: GrayImage::new(w, h),
            ordering: Box::new(AscendingX),
            params,
        })
    }

    /// Replace the key identity policy.
    pub fn with_ordering(mut self, ordering: impl KeyOrdering + Send + 'static) -> Self {
        self.ordering = Box::new(ordering);
        self
    }

    #[inline]
    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    /// Last rectified sheet (blank until a sheet has been seen).
    #[inline]
    pub fn rectified(&self) -> &RgbImage {
        &self.rectified
    }

    #[inline]
    pub fn rectified_mask(&self) -> &GrayImage {
        &self.rectified_mask
    }

    /// Run one detection cycle on `frame`.
    ///
    /// A frame without a usable sheet outline is not an error: the result has
    /// no quad and no key points, and carries the previous rectified buffers.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, frame, edges),
            fields(width = frame.width(), height = frame.height())
        )
    )]
    pub fn process(
        &mut self,
        frame: &RgbImage,
        edges: &EdgeParams,
    ) -> Result<DetectionResult, DetectError> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(DetectError::InvalidFrame { width, height });
        }
        let ksize = edges.kernel_size()?;
        let (low, high) = edges.thresholds()?;

        let gray = imageops::grayscale(frame);
        let smooth = gaussian_blur(&gray, ksize, 0.0);
        let edge_mask = dilate(
            &canny(&smooth, low, high),
            Norm::LInf,
            self.params.edge_dilate_radius,
        );

        let contours = external_contours(&edge_mask);
        debug!("{} external edge contours", contours.len());

        let Some(corners) = find_largest_quad(&contours, self.params.quad_epsilon_factor) else {
            debug!("no convex quadrilateral outline");
            return Ok(self.without_sheet(edge_mask));
        };
        let quad = quad_from_corners(corners);
        let Some(transform) = PerspectiveTransform::from_quad(&quad, quad.width_px(), quad.height_px())
        else {
            debug!("degenerate sheet outline {:?}", quad.corners);
            return Ok(self.without_sheet(edge_mask));
        };
        debug!(
            "sheet quad {:?}, rectified {}x{}",
            quad.corners, transform.width, transform.height
        );

        self.rectified = transform.warp(frame);
        self.rectified_mask = self.marker_mask(&self.rectified);

        let mut rectified_points = self.marker_centers(&self.rectified_mask);
        rectified_points.sort_by(|a, b| a.x.total_cmp(&b.x));
        let frame_points = rectified_points
            .iter()
            .map(|&p| transform.to_frame(p))
            .collect();
        let key_points = self.ordering.assign(frame_points);
        debug!("{} key points", key_points.len());

        Ok(DetectionResult {
            quad: Some(quad),
            transform: Some(transform),
            edges: edge_mask,
            rectified: self.rectified.clone(),
            rectified_mask: self.rectified_mask.clone(),
            rectified_points,
            key_points,
        })
    }

    fn without_sheet(&self, edges: GrayImage) -> DetectionResult {
        DetectionResult {
            quad: None,
            transform: None,
            edges,
            rectified: self.rectified.clone(),
            rectified_mask: self.rectified_mask.clone(),
            rectified_points: Vec::new(),
            key_points: Vec::new(),
        }
    }

    /// Binary mask of dark blobs on the rectified sheet, with the sheet edge
    /// band cleared so the outline itself never counts as a marker.
    fn marker_mask(&self, rectified: &RgbImage) -> GrayImage {
        let p = &self.params;
        let gray = imageops::grayscale(rectified);
        let smooth = gaussian_blur(&gray, p.marker_blur_size, p.marker_blur_sigma);
        let binary = adaptive_threshold_inv(&smooth, p.adaptive_block_size, p.adaptive_offset);
        let mut cleaned = open(&binary, Norm::LInf, p.open_radius);
        clear_border(&mut cleaned, p.border_width);
        dilate(&cleaned, Norm::LInf, p.marker_dilate_radius)
    }

    fn marker_centers(&self, mask: &GrayImage) -> Vec<Point2<f32>> {
        let min = self.params.min_marker_size;
        external_contours(mask)
            .iter()
            .filter_map(|c| BoundingBox::of(c))
            .filter(|bb| bb.width > min && bb.height > min)
            .map(|bb| bb.center())
            .collect()
    }
}

impl std::fmt::Debug for PaperDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaperDetector")
            .field("params", &self.params)
            .field("rectified", &self.rectified.dimensions())
            .finish_non_exhaustive()
    }
}
