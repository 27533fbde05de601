use super::*;

#[test]
fn defaults_validate() {
    let plan = MotionParams::default().validate().unwrap();
    assert_eq!(plan.pattern, Pattern::Swipe);
    assert_eq!(plan.frame_count, 120);
    assert_eq!(plan.fps, Fps::integer(30).unwrap());
    assert_eq!(plan.effective_wobble(), 0.25);
    assert!((plan.max_shift_px(1000) - 80.0).abs() < 1e-9);
}

#[test]
fn each_bad_field_is_named() {
    let cases: Vec<(&str, MotionParams)> = vec![
        (
            "duration_s",
            MotionParams {
                duration_s: 0.0,
                ..Default::default()
            },
        ),
        (
            "duration_s",
            MotionParams {
                duration_s: f64::NAN,
                ..Default::default()
            },
        ),
        (
            "fps",
            MotionParams {
                fps: 0,
                ..Default::default()
            },
        ),
        (
            "motion_amount",
            MotionParams {
                motion_amount: -0.1,
                ..Default::default()
            },
        ),
        (
            "wobble_amount",
            MotionParams {
                wobble_amount: -1.0,
                ..Default::default()
            },
        ),
        (
            "zoom_amount",
            MotionParams {
                zoom_amount: f64::INFINITY,
                ..Default::default()
            },
        ),
        (
            "repeat_count",
            MotionParams {
                repeat_count: 0,
                ..Default::default()
            },
        ),
        (
            "max_side",
            MotionParams {
                max_side: 0,
                ..Default::default()
            },
        ),
    ];
    for (field, params) in cases {
        let err = params.validate().unwrap_err();
        assert!(err.is_invalid_argument(), "{field}: {err}");
        assert!(err.to_string().contains(field), "{field}: {err}");
    }
}

#[test]
fn unsupported_pattern_cites_value() {
    let params = MotionParams {
        pattern: "diagonal".to_string(),
        ..Default::default()
    };
    let err = params.validate().unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(err.to_string().contains("diagonal"));
}

#[test]
fn zero_wobble_is_allowed_and_ignored_off_swipe() {
    let plan = MotionParams {
        wobble_amount: 0.0,
        ..Default::default()
    }
    .validate()
    .unwrap();
    assert_eq!(plan.effective_wobble(), 0.0);

    let plan = MotionParams {
        pattern: "rotate".to_string(),
        wobble_amount: 0.9,
        ..Default::default()
    }
    .validate()
    .unwrap();
    assert_eq!(plan.effective_wobble(), 0.0);
}

#[test]
fn zoom_only_applies_to_rotate_forward() {
    let plan = MotionParams {
        pattern: "rotate_forward".to_string(),
        zoom_amount: 0.3,
        ..Default::default()
    }
    .validate()
    .unwrap();
    assert_eq!(plan.effective_zoom(), 0.3);

    for pattern in ["swipe", "shake", "rotate"] {
        let plan = MotionParams {
            pattern: pattern.to_string(),
            zoom_amount: 0.3,
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(plan.effective_zoom(), 0.0, "{pattern}");
    }
}

#[test]
fn short_clips_still_have_two_frames() {
    let plan = MotionParams {
        duration_s: 0.01,
        fps: 1,
        ..Default::default()
    }
    .validate()
    .unwrap();
    assert_eq!(plan.frame_count, 2);
    assert_eq!(plan.trajectory().unwrap().len(), 2);
}

#[test]
fn absurdly_long_clips_are_rejected_before_allocation() {
    for duration_s in [1e18, f64::MAX] {
        let err = MotionParams {
            duration_s,
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(err.is_invalid_argument(), "{duration_s}: {err}");
        assert!(err.to_string().contains("duration_s"), "{err}");
    }
}

#[test]
fn json_fills_missing_fields_with_defaults() {
    let params =
        MotionParams::from_json_str(r#"{ "pattern": "rotate_forward", "zoom_amount": 0.2 }"#)
            .unwrap();
    assert_eq!(params.pattern, "rotate_forward");
    assert_eq!(params.zoom_amount, 0.2);
    assert_eq!(params.fps, 30);
}

#[test]
fn json_rejects_unknown_fields() {
    let err = MotionParams::from_json_str(r#"{ "speed": 3 }"#).unwrap_err();
    assert!(matches!(err, PanError::Serde(_)));
}
