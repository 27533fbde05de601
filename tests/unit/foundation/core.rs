use super::*;

#[test]
fn frame_count_is_rounded_product_with_floor_of_two() {
    let fps = Fps::integer(30).unwrap();
    assert_eq!(fps.frame_count(4.0).unwrap(), 120);
    assert_eq!(fps.frame_count(0.01).unwrap(), 2);
    assert_eq!(fps.frame_count(1.0 / 30.0).unwrap(), 2);

    let fps = Fps::integer(10).unwrap();
    assert_eq!(fps.frame_count(0.34).unwrap(), 3);
    assert_eq!(fps.frame_count(0.36).unwrap(), 4);
}

#[test]
fn frame_count_matches_rule_across_inputs() {
    for num in [1u32, 7, 24, 30, 60] {
        let fps = Fps::integer(num).unwrap();
        for d in [0.05, 0.5, 1.0, 2.25, 4.0, 9.7] {
            let expected = ((d * f64::from(num)).round_ties_even() as u64).max(2);
            assert_eq!(fps.frame_count(d).unwrap(), expected, "d={d} fps={num}");
        }
    }
}

#[test]
fn frame_count_rejects_unbounded_clips() {
    let fps = Fps::integer(30).unwrap();
    let err = fps.frame_count(1e18).unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(err.to_string().contains("duration_s"));
    assert!(fps.frame_count(f64::MAX).unwrap_err().is_invalid_argument());
    assert!(fps.frame_count(f64::INFINITY).is_err());
    assert!(fps.frame_count(f64::NAN).is_err());

    let one = Fps::integer(1).unwrap();
    assert_eq!(one.frame_count(MAX_FRAME_COUNT as f64).unwrap(), MAX_FRAME_COUNT);
    assert!(one.frame_count(MAX_FRAME_COUNT as f64 + 1.0).is_err());
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).unwrap_err().is_invalid_argument());
    assert!(Fps::new(30, 0).unwrap_err().is_invalid_argument());
    let ntsc = Fps::new(30000, 1001).unwrap();
    assert!((ntsc.as_f64() - 29.97).abs() < 0.01);
}

#[test]
fn extent_even_floor_drops_odd_row_and_column() {
    let e = Extent::new(7, 5).unwrap().even_floor();
    assert_eq!(e, Extent { width: 6, height: 4 });
    assert!(e.is_even());
    assert_eq!(e.area(), 24);
    assert_eq!(e.longest_side(), 6);
    assert_eq!(e.to_string(), "6x4");
}

#[test]
fn extent_rejects_empty() {
    assert!(Extent::new(0, 4).unwrap_err().is_precondition());
}
