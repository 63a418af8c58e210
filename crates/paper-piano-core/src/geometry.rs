//! Plane geometry on contours: corner ordering, Douglas-Peucker
//! simplification and largest convex quadrilateral selection.

use std::cmp::Ordering;

use imageproc::point::Point;
use nalgebra::Point2;

use crate::{Contour, Quad};

/// Put four corners into top-left, top-right, bottom-right, bottom-left order.
///
/// The two points with the smallest x form the left edge and the other two
/// the right edge; within each edge the smaller y is the top. The sort is
/// stable, so exactly equal coordinates keep their input order (the result is
/// unspecified for such degenerate inputs).
pub fn order_corners(points: [Point2<f32>; 4]) -> Quad {
    let mut by_x = points;
    by_x.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));

    let (top_left, bottom_left) = split_by_y(by_x[0], by_x[1]);
    let (top_right, bottom_right) = split_by_y(by_x[2], by_x[3]);

    Quad {
        corners: [top_left, top_right, bottom_right, bottom_left],
    }
}

fn split_by_y(a: Point2<f32>, b: Point2<f32>) -> (Point2<f32>, Point2<f32>) {
    if b.y < a.y {
        (b, a)
    } else {
        (a, b)
    }
}

/// Perimeter of a closed polygon.
pub fn arc_length(points: &[Point2<i32>]) -> f64 {
    imageproc::geometry::arc_length(&to_imageproc(points), true)
}

/// Unsigned area enclosed by a closed polygon.
pub fn polygon_area(points: &[Point2<i32>]) -> f64 {
    imageproc::geometry::contour_area(&to_imageproc(points)).abs()
}

fn to_imageproc(points: &[Point2<i32>]) -> Vec<Point<i32>> {
    points.iter().map(|p| Point::new(p.x, p.y)).collect()
}

/// True when every turn of the closed polygon bends the same way.
///
/// Collinear vertices are tolerated; a polygon with no turn at all is not
/// convex.
pub fn is_convex(points: &[Point2<i32>]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }

    let mut left = false;
    let mut right = false;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let cross = i64::from(b.x - a.x) * i64::from(c.y - b.y)
            - i64::from(b.y - a.y) * i64::from(c.x - b.x);
        match cross.cmp(&0) {
            Ordering::Greater => left = true,
            Ordering::Less => right = true,
            Ordering::Equal => {}
        }
        if left && right {
            return false;
        }
    }
    left || right
}

/// Simplify a closed contour with the Douglas-Peucker algorithm.
///
/// The curve is split at two mutually distant points: the point farthest
/// from the first one, and the point farthest from that. Where the contour
/// starts does not matter. Each half is reduced independently so that no
/// dropped point lies farther than `epsilon` from the kept polyline. The
/// output starts at the first split point.
pub fn approximate_polygon(contour: &[Point2<i32>], epsilon: f64) -> Contour {
    let n = contour.len();
    if n < 3 {
        return contour.to_vec();
    }

    let a = farthest_from(contour, 0);
    if a == 0 {
        return vec![contour[0]];
    }
    let b = farthest_from(contour, a);

    let mut ring = contour.to_vec();
    ring.rotate_left(a);
    let split = (b + n - a) % n;

    let first: Vec<Point2<i32>> = ring[..=split].to_vec();
    let mut second: Vec<Point2<i32>> = ring[split..].to_vec();
    second.push(ring[0]);

    let mut out = simplify_open(&first, epsilon);
    let tail = simplify_open(&second, epsilon);
    // The second chain starts and ends on points the first chain already kept.
    out.extend_from_slice(&tail[1..tail.len() - 1]);
    out
}

/// Index of the contour point farthest from `contour[from]`; `from` itself
/// when every point coincides with it.
fn farthest_from(contour: &[Point2<i32>], from: usize) -> usize {
    let origin = contour[from];
    let mut far = from;
    let mut far_d2 = 0i64;
    for (i, &p) in contour.iter().enumerate() {
        let d2 = dist2(origin, p);
        if d2 > far_d2 {
            far_d2 = d2;
            far = i;
        }
    }
    far
}

fn simplify_open(chain: &[Point2<i32>], epsilon: f64) -> Contour {
    let last = chain.len() - 1;
    let mut keep = vec![false; chain.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0usize, last)];
    while let Some((s, e)) = stack.pop() {
        if e <= s + 1 {
            continue;
        }
        let mut worst = s;
        let mut worst_d = -1.0;
        for (i, &p) in chain.iter().enumerate().take(e).skip(s + 1) {
            let d = line_distance(p, chain[s], chain[e]);
            if d > worst_d {
                worst_d = d;
                worst = i;
            }
        }
        if worst_d > epsilon {
            keep[worst] = true;
            stack.push((s, worst));
            stack.push((worst, e));
        }
    }

    chain
        .iter()
        .zip(keep)
        .filter_map(|(&p, k)| k.then_some(p))
        .collect()
}

fn dist2(a: Point2<i32>, b: Point2<i32>) -> i64 {
    let dx = i64::from(b.x - a.x);
    let dy = i64::from(b.y - a.y);
    dx * dx + dy * dy
}

/// Distance from `p` to the infinite line through `a` and `b`.
fn line_distance(p: Point2<i32>, a: Point2<i32>, b: Point2<i32>) -> f64 {
    let len2 = dist2(a, b);
    if len2 == 0 {
        return (dist2(a, p) as f64).sqrt();
    }
    let cross = i64::from(b.x - a.x) * i64::from(p.y - a.y)
        - i64::from(b.y - a.y) * i64::from(p.x - a.x);
    (cross as f64).abs() / (len2 as f64).sqrt()
}

/// Pick the convex four-vertex simplification with the largest area.
///
/// Every contour is reduced with a tolerance of `epsilon_factor` times its
/// perimeter. Candidates that do not reduce to exactly four vertices, are not
/// convex or enclose no area are skipped. Vertices are returned in the order
/// the simplification produced them; use [`order_corners`] to canonicalize.
pub fn find_largest_quad(contours: &[Contour], epsilon_factor: f64) -> Option<[Point2<i32>; 4]> {
    let mut best: Option<([Point2<i32>; 4], f64)> = None;

    for contour in contours {
        let epsilon = epsilon_factor * arc_length(contour);
        let approx = approximate_polygon(contour, epsilon);
        let Ok(quad) = <[Point2<i32>; 4]>::try_from(approx.as_slice()) else {
            continue;
        };
        if !is_convex(&quad) {
            continue;
        }
        let area = polygon_area(&quad);
        if area > best.map_or(0.0, |(_, a)| a) {
            best = Some((quad, area));
        }
    }

    best.map(|(quad, _)| quad)
}

/// Canonically ordered quad from integer corner candidates.
pub fn quad_from_corners(corners: [Point2<i32>; 4]) -> Quad {
    order_corners(corners.map(|p| Point2::new(p.x as f32, p.y as f32)))
}
