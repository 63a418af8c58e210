use image::{Rgb, RgbImage};
use nalgebra::Point2;
use paper_piano_core::sheet::{place_sheet, PlacedSheet, SheetLayout};
use paper_piano_detect::{
    AscendingX, DetectError, DetectorParams, EdgeParams, KeyOrdering, KeyPoint, PaperDetector,
};

fn edges() -> EdgeParams {
    EdgeParams {
        blur_strength: 2,
        ..EdgeParams::default()
    }
}

fn tilted_sheet(layout: &SheetLayout) -> PlacedSheet {
    let corners = [
        Point2::new(130.0, 110.0),
        Point2::new(500.0, 95.0),
        Point2::new(520.0, 370.0),
        Point2::new(115.0, 360.0),
    ];
    place_sheet(layout, 640, 480, corners, [40, 40, 40]).expect("placed sheet")
}

fn assert_keys_near(keys: &[KeyPoint], expected: &[Point2<f32>], tol: f32) {
    assert_eq!(keys.len(), expected.len(), "keys: {keys:?}");
    for (k, e) in keys.iter().zip(expected) {
        let d = (k.position - *e).norm();
        assert!(d < tol, "key {} at {:?}, expected {:?}", k.index, k.position, e);
    }
}

#[test]
fn finds_every_marker_of_a_tilted_sheet() {
    let layout = SheetLayout::default();
    let placed = tilted_sheet(&layout);
    let mut detector = PaperDetector::new(DetectorParams::default()).expect("detector");

    let result = detector.process(&placed.frame, &edges()).expect("process");

    assert!(result.found_sheet());
    assert_keys_near(&result.key_points, &placed.markers, 2.0);
    for (i, k) in result.key_points.iter().enumerate() {
        assert_eq!(k.index, i);
    }
    assert!(result
        .key_points
        .windows(2)
        .all(|w| w[0].position.x < w[1].position.x));
}

#[test]
fn sheet_corners_are_close_to_the_true_outline() {
    let placed = tilted_sheet(&SheetLayout::default());
    let mut detector = PaperDetector::new(DetectorParams::default()).expect("detector");
    let quad = detector
        .process(&placed.frame, &edges())
        .expect("process")
        .quad
        .expect("quad");

    let truth = [
        Point2::new(130.0_f32, 110.0),
        Point2::new(500.0, 95.0),
        Point2::new(520.0, 370.0),
        Point2::new(115.0, 360.0),
    ];
    for (c, t) in quad.corners.iter().zip(truth.iter()) {
        assert!((*c - *t).norm() < 8.0, "corner {c:?} vs {t:?}");
    }
}

#[test]
fn zero_blur_strength_relies_on_the_edge_detector_smoothing() {
    let placed = tilted_sheet(&SheetLayout::default());
    let mut detector = PaperDetector::new(DetectorParams::default()).expect("detector");
    let sharp = EdgeParams {
        blur_strength: 0,
        ..EdgeParams::default()
    };
    let result = detector.process(&placed.frame, &sharp).expect("process");
    assert!(result.found_sheet());
    assert_keys_near(&result.key_points, &placed.markers, 2.0);
}

#[test]
fn repeated_frames_give_identical_results() {
    let placed = tilted_sheet(&SheetLayout::default());
    let mut detector = PaperDetector::new(DetectorParams::default()).expect("detector");
    let a = detector.process(&placed.frame, &edges()).expect("first");
    let b = detector.process(&placed.frame, &edges()).expect("second");
    assert_eq!(a.summary(), b.summary());
    assert_eq!(a.rectified_mask, b.rectified_mask);
}

#[test]
fn sheet_without_markers_has_quad_but_no_keys() {
    let layout = SheetLayout {
        keys: 0,
        ..SheetLayout::default()
    };
    let placed = tilted_sheet(&layout);
    let mut detector = PaperDetector::new(DetectorParams::default()).expect("detector");
    let result = detector.process(&placed.frame, &edges()).expect("process");
    assert!(result.found_sheet());
    assert!(result.key_points.is_empty());
}

#[test]
fn border_band_wider_than_the_sheet_clears_every_marker() {
    let placed = tilted_sheet(&SheetLayout::default());
    let params = DetectorParams {
        border_width: u32::MAX,
        ..DetectorParams::default()
    };
    let mut detector = PaperDetector::new(params).expect("detector");
    let result = detector.process(&placed.frame, &edges()).expect("process");
    assert!(result.found_sheet());
    assert!(result.key_points.is_empty());
    assert!(result.rectified_mask.pixels().all(|p| p.0[0] == 0));
}

#[test]
fn uniform_frame_has_no_sheet() {
    let frame = RgbImage::from_pixel(320, 240, Rgb([0, 0, 0]));
    let mut detector = PaperDetector::new(DetectorParams::default()).expect("detector");
    let result = detector.process(&frame, &edges()).expect("process");
    assert!(result.quad.is_none());
    assert!(result.transform.is_none());
    assert!(result.key_points.is_empty());
    assert_eq!(result.edges.dimensions(), (320, 240));
}

#[test]
fn swapped_thresholds_match_ordered_ones() {
    let placed = tilted_sheet(&SheetLayout::default());
    let mut detector = PaperDetector::new(DetectorParams::default()).expect("detector");
    let ordered = detector.process(&placed.frame, &edges()).expect("ordered");
    let swapped = detector
        .process(
            &placed.frame,
            &EdgeParams {
                edge_threshold1: 30.0,
                edge_threshold2: 10.0,
                ..edges()
            },
        )
        .expect("swapped");
    assert_eq!(ordered.summary(), swapped.summary());
}

#[test]
fn invalid_detector_params_are_rejected() {
    let params = DetectorParams {
        marker_blur_size: 4,
        ..DetectorParams::default()
    };
    assert!(matches!(
        PaperDetector::new(params),
        Err(DetectError::InvalidParameter {
            name: "marker_blur_size",
            ..
        })
    ));
}

/// Right-to-left indexing, used to check that the policy is pluggable.
struct Descending;

impl KeyOrdering for Descending {
    fn assign(&mut self, points: Vec<Point2<f32>>) -> Vec<KeyPoint> {
        let mut keys = AscendingX.assign(points);
        keys.reverse();
        for (i, k) in keys.iter_mut().enumerate() {
            k.index = i;
        }
        keys
    }
}

#[test]
fn custom_ordering_replaces_the_default() {
    let placed = tilted_sheet(&SheetLayout::default());
    let mut detector = PaperDetector::new(DetectorParams::default())
        .expect("detector")
        .with_ordering(Descending);
    let keys = detector
        .process(&placed.frame, &edges())
        .expect("process")
        .key_points;
    assert_eq!(keys.len(), 5);
    assert!(keys[0].position.x > keys[4].position.x);
}
