use serde::{Deserialize, Serialize};

use super::DetectError;

/// Per-frame edge detection tunables, typically driven by a control panel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeParams {
    /// Smoothing strength; the Gaussian kernel side is `2 * blur_strength + 1`.
    ///
    /// The Canny stage applies its own fixed Gaussian (sigma 1.4) before
    /// taking gradients, so this blur stacks on top of it and
    /// `blur_strength = 0` still leaves the edges lightly smoothed.
    pub blur_strength: u32,
    /// First hysteresis threshold of the edge detector.
    pub edge_threshold1: f32,
    /// Second hysteresis threshold of the edge detector.
    pub edge_threshold2: f32,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            blur_strength: 7,
            edge_threshold1: 10.0,
            edge_threshold2: 30.0,
        }
    }
}

impl EdgeParams {
    /// Odd Gaussian kernel side derived from `blur_strength`.
    pub fn kernel_size(&self) -> Result<u32, DetectError> {
        self.blur_strength
            .checked_mul(2)
            .and_then(|k| k.checked_add(1))
            .ok_or_else(|| DetectError::invalid("blur_strength", "kernel size overflows"))
    }

    /// `(low, high)` hysteresis thresholds.
    ///
    /// The two thresholds may be given in either order.
    pub fn thresholds(&self) -> Result<(f32, f32), DetectError> {
        check_threshold("edge_threshold1", self.edge_threshold1)?;
        check_threshold("edge_threshold2", self.edge_threshold2)?;
        let (a, b) = (self.edge_threshold1, self.edge_threshold2);
        Ok((a.min(b), a.max(b)))
    }

    pub fn validate(&self) -> Result<(), DetectError> {
        self.kernel_size()?;
        self.thresholds()?;
        Ok(())
    }
}

fn check_threshold(name: &'static str, v: f32) -> Result<(), DetectError> {
    if !v.is_finite() || v < 0.0 {
        return Err(DetectError::invalid(
            name,
            format!("expected a finite value >= 0, got {v}"),
        ));
    }
    Ok(())
}

/// Fixed constants of the detection pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    /// Polygon simplification tolerance as a fraction of the contour perimeter.
    pub quad_epsilon_factor: f64,
    /// Chebyshev radius of the dilation that closes gaps in the sheet outline.
    ///
    /// Morphology uses centered square elements of side `2r + 1`; the
    /// default radius 2 (5x5) is the nearest symmetric match to a 4x4 block.
    pub edge_dilate_radius: u8,
    /// Smoothing kernel side applied to the rectified sheet.
    pub marker_blur_size: u32,
    pub marker_blur_sigma: f32,
    /// Neighbourhood side of the adaptive binarization (odd, >= 3).
    pub adaptive_block_size: u32,
    /// How much darker than its neighbourhood a pixel must be to count as ink.
    pub adaptive_offset: i32,
    /// Chebyshev radius of the opening that removes speckles. The default 1
    /// (3x3) is slightly gentler than a 4x4 block and keeps small markers.
    pub open_radius: u8,
    /// Width of the band cleared along each rectified edge. A band wider than
    /// half the sheet clears everything, leaving no key points.
    pub border_width: u32,
    /// Chebyshev radius of the dilation that thickens marker blobs (1 is 3x3).
    pub marker_dilate_radius: u8,
    /// Blobs must be strictly wider and taller than this, in pixels.
    pub min_marker_size: i32,
    /// `[width, height]` of the blank rectified buffers used before a sheet is seen.
    pub blank_size: [u32; 2],
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            quad_epsilon_factor: 0.01,
            edge_dilate_radius: 2,
            marker_blur_size: 11,
            marker_blur_sigma: 2.0,
            adaptive_block_size: 11,
            adaptive_offset: 2,
            open_radius: 1,
            border_width: 15,
            marker_dilate_radius: 1,
            min_marker_size: 6,
            blank_size: [300, 300],
        }
    }
}

impl DetectorParams {
    pub fn validate(&self) -> Result<(), DetectError> {
        if !self.quad_epsilon_factor.is_finite() || self.quad_epsilon_factor <= 0.0 {
            return Err(DetectError::invalid(
                "quad_epsilon_factor",
                format!("expected a finite value > 0, got {}", self.quad_epsilon_factor),
            ));
        }
        if self.marker_blur_size == 0 || self.marker_blur_size % 2 == 0 {
            return Err(DetectError::invalid(
                "marker_blur_size",
                format!("expected an odd size, got {}", self.marker_blur_size),
            ));
        }
        if self.adaptive_block_size < 3 || self.adaptive_block_size % 2 == 0 {
            return Err(DetectError::invalid(
                "adaptive_block_size",
                format!("expected an odd size >= 3, got {}", self.adaptive_block_size),
            ));
        }
        if self.min_marker_size < 0 {
            return Err(DetectError::invalid(
                "min_marker_size",
                format!("expected a value >= 0, got {}", self.min_marker_size),
            ));
        }
        if self.blank_size[0] == 0 || self.blank_size[1] == 0 {
            return Err(DetectError::invalid("blank_size", "dimensions must be non-zero"));
        }
        Ok(())
    }
}
