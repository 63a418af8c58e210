use image::RgbImage;
use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};
use serde::{Deserialize, Serialize};

use crate::{sample_bilinear_rgb, Quad};

/// Planar projective map `dst ~ H * src`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(f64::from(p.x), f64::from(p.y), 1.0);
        Point2::new((v[0] / v[2]) as f32, (v[1] / v[2]) as f32)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }

    /// Solve the map taking each `src[k]` onto `dst[k]`.
    ///
    /// Both point sets are first moved to their centroid and scaled to a mean
    /// radius of sqrt(2), which keeps the 8x8 system well conditioned for
    /// pixel-sized coordinates. Returns `None` for degenerate configurations
    /// (three collinear points, repeated points).
    pub fn from_point_pairs(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Self> {
        let (src_n, t_src) = conditioned(src);
        let (dst_n, t_dst) = conditioned(dst);

        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();
        for k in 0..4 {
            let (x, y) = (src_n[k].x, src_n[k].y);
            let (u, v) = (dst_n[k].x, dst_n[k].y);

            let r = 2 * k;
            a[(r, 0)] = x;
            a[(r, 1)] = y;
            a[(r, 2)] = 1.0;
            a[(r, 6)] = -u * x;
            a[(r, 7)] = -u * y;
            b[r] = u;

            a[(r + 1, 3)] = x;
            a[(r + 1, 4)] = y;
            a[(r + 1, 5)] = 1.0;
            a[(r + 1, 6)] = -v * x;
            a[(r + 1, 7)] = -v * y;
            b[r + 1] = v;
        }

        let sol = a.lu().solve(&b)?;
        let hn = Matrix3::new(
            sol[0], sol[1], sol[2], //
            sol[3], sol[4], sol[5], //
            sol[6], sol[7], 1.0,
        );

        let h = t_dst.try_inverse()? * hn * t_src;
        let s = h[(2, 2)];
        if !s.is_finite() || s.abs() < 1e-12 || h.iter().any(|v| !v.is_finite()) {
            return None;
        }
        Some(Self::new(h / s))
    }
}

fn conditioned(pts: &[Point2<f32>; 4]) -> ([Point2<f64>; 4], Matrix3<f64>) {
    let (cx, cy) = pts.iter().fold((0.0, 0.0), |(sx, sy), p| {
        (sx + f64::from(p.x) / 4.0, sy + f64::from(p.y) / 4.0)
    });
    let mean_r = pts
        .iter()
        .map(|p| (f64::from(p.x) - cx).hypot(f64::from(p.y) - cy))
        .sum::<f64>()
        / 4.0;
    let s = if mean_r > 1e-12 {
        std::f64::consts::SQRT_2 / mean_r
    } else {
        1.0
    };

    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let out = pts.map(|p| {
        let v = t * Vector3::new(f64::from(p.x), f64::from(p.y), 1.0);
        Point2::new(v[0], v[1])
    });
    (out, t)
}

/// Rectification of the paper quad onto an axis-aligned `width x height`
/// rectangle, together with its inverse.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveTransform {
    /// Frame pixel -> rectified pixel.
    pub rect_from_img: Homography,
    /// Rectified pixel -> frame pixel.
    pub img_from_rect: Homography,
    pub width: u32,
    pub height: u32,
}

impl PerspectiveTransform {
    /// Map `quad` corners onto `(0,0) (w,0) (w,h) (0,h)`.
    pub fn from_quad(quad: &Quad, width: u32, height: u32) -> Option<Self> {
        let (w, h) = (width as f32, height as f32);
        let rect = [
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ];
        let rect_from_img = Homography::from_point_pairs(&quad.corners, &rect)?;
        let img_from_rect = rect_from_img.inverse()?;
        Some(Self {
            rect_from_img,
            img_from_rect,
            width,
            height,
        })
    }

    #[inline]
    pub fn to_rect(&self, p: Point2<f32>) -> Point2<f32> {
        self.rect_from_img.apply(p)
    }

    #[inline]
    pub fn to_frame(&self, p: Point2<f32>) -> Point2<f32> {
        self.img_from_rect.apply(p)
    }

    /// Resample `frame` into the rectified rectangle.
    pub fn warp(&self, frame: &RgbImage) -> RgbImage {
        warp_perspective_rgb(frame, &self.img_from_rect, self.width, self.height)
    }
}

/// For every output pixel, map it through `img_from_rect` into `src` and
/// sample bilinearly. Samples falling outside `src` read as black.
pub fn warp_perspective_rgb(
    src: &RgbImage,
    img_from_rect: &Homography,
    out_w: u32,
    out_h: u32,
) -> RgbImage {
    RgbImage::from_fn(out_w, out_h, |x, y| {
        let p = img_from_rect.apply(Point2::new(x as f32, y as f32));
        sample_bilinear_rgb(src, p.x, p.y)
    })
}
