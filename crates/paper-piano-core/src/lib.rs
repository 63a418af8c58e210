//! Core types and utilities for paper keyboard detection.
//!
//! This crate holds everything the detector and the touch validator share:
//! the [`Quad`] and [`KeyPoint`] types, contour geometry, the perspective
//! rectification transform and a handful of raster operations on `image`
//! buffers. It knows nothing about fingertips or sound.

mod geometry;
mod raster;
pub mod sheet;
mod transform;
mod types;

pub use geometry::{
    approximate_polygon, arc_length, find_largest_quad, is_convex, order_corners, polygon_area,
    quad_from_corners,
};
pub use raster::{
    adaptive_threshold_inv, clear_border, external_contours, gaussian_blur, gaussian_kernel,
    sample_bilinear_rgb, BoundingBox,
};
pub use transform::{warp_perspective_rgb, Homography, PerspectiveTransform};
pub use types::{Contour, KeyPoint, Quad};
