use super::*;

#[test]
fn defaults_match_production_constants() {
    let opts = EngineOpts::default();
    assert_eq!(opts.plane_count, 32);
    assert_eq!(opts.conditioner.smoothing_passes, 4);
    assert_eq!(opts.conditioner.smoothing_radius, 4);
    assert_eq!(opts.conditioner.quantile_grid, 128);
    assert_eq!(opts.compositor.min_layer_scale, 0.35);
    assert_eq!(opts.fill.iterations, 6);
    assert_eq!(opts.fill.radius, 2);
    assert_eq!(opts.fill.hole_alpha, 0.20);
    assert!(opts.validate().is_ok());
}

#[test]
fn single_plane_is_rejected() {
    let opts = EngineOpts {
        plane_count: 1,
        ..EngineOpts::default()
    };
    let err = opts.validate().unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(err.to_string().contains("plane_count"));
}

#[test]
fn nested_validation_is_applied() {
    let mut opts = EngineOpts::default();
    opts.fill.radius = 0;
    assert!(opts.validate().is_err());

    let mut opts = EngineOpts::default();
    opts.conditioner.low_quantile = 0.99;
    assert!(opts.validate().is_err());
}

#[test]
fn json_overrides_nested_fields() {
    let opts = EngineOpts::from_json_str(
        r#"{ "plane_count": 4, "fill": { "iterations": 2 }, "conditioner": { "smoothing_passes": 0 } }"#,
    )
    .unwrap();
    assert_eq!(opts.plane_count, 4);
    assert_eq!(opts.fill.iterations, 2);
    assert_eq!(opts.fill.radius, 2);
    assert_eq!(opts.conditioner.smoothing_passes, 0);
    assert_eq!(opts.conditioner.quantile_grid, 128);
}

#[test]
fn json_rejects_unknown_top_level_fields() {
    assert!(matches!(
        EngineOpts::from_json_str(r#"{ "planes": 4 }"#),
        Err(PanError::Serde(_))
    ));
}
