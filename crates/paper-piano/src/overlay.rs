//! Debug drawing on top of a frame.

use std::collections::BTreeSet;

use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{
    draw_cross_mut, draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut,
};
use paper_piano_core::{KeyPoint, Quad};
use paper_piano_touch::Fingertip;

const OUTLINE: Rgb<u8> = Rgb([0, 200, 255]);
const KEY: Rgb<u8> = Rgb([0, 220, 0]);
const PRESSED: Rgb<u8> = Rgb([255, 40, 40]);
const FINGER: Rgb<u8> = Rgb([255, 0, 255]);

/// Copy of `frame` with the sheet outline, key points, rings around the keys
/// pressed this cycle and fingertip crosses.
pub fn draw_overlay(
    frame: &RgbImage,
    quad: Option<&Quad>,
    keys: &[KeyPoint],
    pressed: &BTreeSet<usize>,
    fingertips: &[Fingertip],
) -> RgbImage {
    let mut out = frame.clone();

    if let Some(q) = quad {
        for i in 0..4 {
            let a = q.corners[i];
            let b = q.corners[(i + 1) % 4];
            draw_line_segment_mut(&mut out, (a.x, a.y), (b.x, b.y), OUTLINE);
        }
    }

    for k in keys {
        let c = (k.position.x.round() as i32, k.position.y.round() as i32);
        draw_filled_circle_mut(&mut out, c, 3, KEY);
        if pressed.contains(&k.index) {
            draw_hollow_circle_mut(&mut out, c, 9, PRESSED);
            draw_hollow_circle_mut(&mut out, c, 10, PRESSED);
        }
    }

    for t in fingertips {
        let (x, y) = (t.position.x.round() as i32, t.position.y.round() as i32);
        draw_cross_mut(&mut out, FINGER, x, y);
    }

    out
}

/// Expand a binary mask to RGB so it can be saved or shown next to a frame.
pub fn mask_to_rgb(mask: &GrayImage) -> RgbImage {
    RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        let v = mask.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    })
}
