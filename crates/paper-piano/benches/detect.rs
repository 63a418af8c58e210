use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::Point2;
use paper_piano::core::sheet::{place_sheet, SheetLayout};
use paper_piano::touch::joints;
use paper_piano::{
    DetectorParams, EdgeParams, Fingertip, Hand, KeyPoint, PaperDetector, TouchParams,
    TouchValidator,
};

fn synthetic_frame(keys: usize) -> image::RgbImage {
    let layout = SheetLayout {
        keys,
        ..SheetLayout::default()
    };
    let corners = [
        Point2::new(130.0, 110.0),
        Point2::new(500.0, 95.0),
        Point2::new(520.0, 370.0),
        Point2::new(115.0, 360.0),
    ];
    place_sheet(&layout, 640, 480, corners, [40, 40, 40])
        .expect("placed sheet")
        .frame
}

fn bench_detector(c: &mut Criterion) {
    let frame = synthetic_frame(5);
    let mut group = c.benchmark_group("detector");
    for blur in [2u32, 7] {
        let edges = EdgeParams {
            blur_strength: blur,
            ..EdgeParams::default()
        };
        let mut detector = PaperDetector::new(DetectorParams::default()).expect("detector");
        group.bench_function(format!("640x480_blur{blur}"), |b| {
            b.iter(|| {
                let res = detector
                    .process(black_box(&frame), &edges)
                    .expect("process");
                black_box(res.key_points.len())
            })
        });
    }
    group.finish();
}

fn bench_validator(c: &mut Criterion) {
    let keys: Vec<KeyPoint> = (0..12)
        .map(|i| KeyPoint {
            index: i,
            position: Point2::new(40.0 + 45.0 * i as f32, 240.0),
        })
        .collect();
    let tips: Vec<Fingertip> = [Hand::Left, Hand::Right]
        .into_iter()
        .flat_map(|hand| {
            joints::FINGERTIPS.into_iter().enumerate().map(move |(j, joint)| {
                let x = if hand == Hand::Left { 60.0 } else { 330.0 } + 40.0 * j as f32;
                Fingertip::new(hand, joint, Point2::new(x, 238.0))
            })
        })
        .collect();
    let params = TouchParams::default();

    c.bench_function("validator_12_keys_10_tips", |b| {
        let mut validator = TouchValidator::new();
        b.iter(|| {
            validator
                .process(black_box(&keys), black_box(&tips), &params)
                .expect("validate")
        })
    });
}

criterion_group!(benches, bench_detector, bench_validator);
criterion_main!(benches);
