use super::*;
use crate::foundation::core::Extent;

fn extent(w: u32, h: u32) -> Extent {
    Extent::new(w, h).unwrap()
}

fn step_depth() -> Field {
    Field::from_fn(extent(16, 16), |x, _| if x < 8 { 1.0 } else { 10.0 })
}

#[test]
fn flat_depth_maps_to_zero_everywhere() {
    let img = ImageRgb::filled(extent(8, 8), [0.4, 0.5, 0.6]);
    let depth = Field::filled(img.extent(), 2.5);
    let out = condition_depth(&depth, &img, &ConditionerOpts::default()).unwrap();
    assert!(out.data().iter().all(|&v| v == 0.0));
}

#[test]
fn nearer_pixels_map_higher_and_stay_in_unit_range() {
    let img = ImageRgb::filled(extent(16, 16), [0.5; 3]);
    let out = condition_depth(&step_depth(), &img, &ConditionerOpts::default()).unwrap();
    assert!(out.data().iter().all(|&v| (0.0..=1.0).contains(&v)));
    assert!(out.get(0, 8) > 0.9);
    assert!(out.get(15, 8) < 0.1);
}

#[test]
fn luminance_edges_stop_smoothing_across_the_boundary() {
    let flat = ImageRgb::filled(extent(16, 16), [0.5; 3]);
    let edged = ImageRgb::new(
        extent(16, 16),
        (0..16 * 16)
            .flat_map(|i| {
                let v = if i % 16 < 8 { 0.0 } else { 1.0 };
                [v, v, v]
            })
            .collect(),
    )
    .unwrap();
    let opts = ConditionerOpts::default();

    let smeared = condition_depth(&step_depth(), &flat, &opts).unwrap();
    let kept = condition_depth(&step_depth(), &edged, &opts).unwrap();

    assert_eq!(kept.get(7, 8), 1.0);
    assert_eq!(kept.get(8, 8), 0.0);
    assert!(smeared.get(7, 8) < 0.95);
    assert!(smeared.get(8, 8) > 0.05);
}

#[test]
fn isolated_outlier_does_not_compress_the_range() {
    let mut depth = Field::from_fn(extent(32, 32), |x, _| 1.0 / (0.05 + 0.95 * x as f32 / 31.0));
    depth.data_mut()[5 * 32 + 5] = 1e-9;
    let img = ImageRgb::filled(depth.extent(), [0.5; 3]);
    let opts = ConditionerOpts {
        smoothing_passes: 0,
        ..ConditionerOpts::default()
    };
    let out = condition_depth(&depth, &img, &opts).unwrap();
    assert!(out.get(31, 20) > 0.99);
    assert!(out.get(0, 20) < 0.01);
    assert!((out.get(16, 20) - 0.5).abs() < 0.1);
}

#[test]
fn mismatched_shapes_are_a_precondition_violation() {
    let img = ImageRgb::filled(extent(8, 8), [0.0; 3]);
    let depth = Field::filled(extent(8, 6), 1.0);
    let err = condition_depth(&depth, &img, &ConditionerOpts::default()).unwrap_err();
    assert!(err.is_precondition());
}

#[test]
fn smoothing_weights_are_one_on_flat_images() {
    let img = ImageRgb::filled(extent(8, 8), [0.3; 3]);
    let w = smoothing_weights(&img, &ConditionerOpts::default());
    assert!(w.data().iter().all(|&v| v == 1.0));
}

#[test]
fn opts_validation_rejects_inverted_quantiles() {
    assert!(ConditionerOpts::default().validate().is_ok());
    let bad = ConditionerOpts {
        low_quantile: 0.9,
        high_quantile: 0.1,
        ..ConditionerOpts::default()
    };
    assert!(bad.validate().unwrap_err().is_invalid_argument());
    let bad = ConditionerOpts {
        quantile_grid: 0,
        ..ConditionerOpts::default()
    };
    assert!(bad.validate().is_err());
}

#[test]
fn empty_fields_are_a_precondition_violation() {
    let empty = Extent {
        width: 0,
        height: 0,
    };
    let depth = Field::filled(empty, 1.0);
    let img = ImageRgb::filled(empty, [0.5; 3]);
    let err = condition_depth(&depth, &img, &ConditionerOpts::default()).unwrap_err();
    assert!(err.is_precondition(), "{err}");
}
