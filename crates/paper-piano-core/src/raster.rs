//! Raster helpers on `image` buffers: sampling, explicit-size Gaussian
//! smoothing, adaptive binarization, border clearing and contour extraction.

use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::filter::separable_filter_equal;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::Contour;

#[inline]
fn get_rgb(src: &RgbImage, x: i64, y: i64) -> [f32; 3] {
    if x < 0 || y < 0 || x >= i64::from(src.width()) || y >= i64::from(src.height()) {
        return [0.0; 3];
    }
    let p = src.get_pixel(x as u32, y as u32).0;
    [f32::from(p[0]), f32::from(p[1]), f32::from(p[2])]
}

/// Bilinear sample with pixel centers at integer coordinates; pixels outside
/// the image read as black.
pub fn sample_bilinear_rgb(src: &RgbImage, x: f32, y: f32) -> Rgb<u8> {
    if !x.is_finite() || !y.is_finite() {
        return Rgb([0, 0, 0]);
    }
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_rgb(src, x0, y0);
    let p10 = get_rgb(src, x0 + 1, y0);
    let p01 = get_rgb(src, x0, y0 + 1);
    let p11 = get_rgb(src, x0 + 1, y0 + 1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let a = p00[c] + fx * (p10[c] - p00[c]);
        let b = p01[c] + fx * (p11[c] - p01[c]);
        out[c] = (a + fy * (b - a)).round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}

/// Normalized 1-D Gaussian weights of length `ksize`.
///
/// A non-positive `sigma` is derived from the size as
/// `0.3 * ((ksize - 1) / 2 - 1) + 0.8`.
pub fn gaussian_kernel(ksize: u32, sigma: f32) -> Vec<f32> {
    let ksize = ksize.max(1);
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let center = (ksize as f32 - 1.0) * 0.5;
    let mut weights: Vec<f32> = (0..ksize)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// Gaussian smoothing with an explicit odd kernel side.
///
/// Filtering runs on an `f32` copy so the result is rounded once, not
/// truncated after each pass. `ksize <= 1` returns a copy of the input.
pub fn gaussian_blur(src: &GrayImage, ksize: u32, sigma: f32) -> GrayImage {
    if ksize <= 1 || src.width() == 0 || src.height() == 0 {
        return src.clone();
    }
    let kernel = gaussian_kernel(ksize, sigma);
    let float: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(src.width(), src.height(), |x, y| {
            Luma([f32::from(src.get_pixel(x, y).0[0])])
        });
    let smoothed = separable_filter_equal(&float, &kernel);
    GrayImage::from_fn(src.width(), src.height(), |x, y| {
        Luma([smoothed.get_pixel(x, y).0[0].round().clamp(0.0, 255.0) as u8])
    })
}

/// Inverted local binarization against a Gaussian-weighted neighbourhood
/// mean: a pixel becomes foreground (255) when it is at least `offset`
/// darker than the mean of its `block x block` window.
pub fn adaptive_threshold_inv(src: &GrayImage, block: u32, offset: i32) -> GrayImage {
    let mean = gaussian_blur(src, block, 0.0);
    let mut out = GrayImage::new(src.width(), src.height());
    for ((o, s), m) in out.pixels_mut().zip(src.pixels()).zip(mean.pixels()) {
        let diff = i32::from(s.0[0]) - i32::from(m.0[0]);
        o.0[0] = if diff <= -offset { 255 } else { 0 };
    }
    out
}

/// Zero a band `width` pixels wide along all four edges.
pub fn clear_border(img: &mut GrayImage, width: u32) {
    let (w, h) = img.dimensions();
    for (x, y, p) in img.enumerate_pixels_mut() {
        let near_far_edge = x.saturating_add(width) >= w || y.saturating_add(width) >= h;
        if x < width || y < width || near_far_edge {
            p.0[0] = 0;
        }
    }
}

/// Outermost borders of the foreground (non-zero) regions. Borders nested
/// inside another region's hole are not reported.
pub fn external_contours(binary: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| c.points.into_iter().map(|p| Point2::new(p.x, p.y)).collect())
        .collect()
}

/// Axis-aligned pixel box; `width`/`height` count pixels, so a single pixel
/// has size 1x1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn of(points: &[Point2<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in points {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Some(Self {
            x: x0,
            y: y0,
            width: x1 - x0 + 1,
            height: y1 - y0 + 1,
        })
    }

    pub fn center(&self) -> Point2<f32> {
        Point2::new(
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }
}
