use super::*;
use crate::motion::params::MotionParams;

fn extent(w: u32, h: u32) -> Extent {
    Extent::new(w, h).unwrap()
}

fn plan(pattern: &str, motion_amount: f64) -> MotionPlan {
    MotionParams {
        duration_s: 1.0,
        fps: 4,
        motion_amount,
        pattern: pattern.to_string(),
        ..Default::default()
    }
    .validate()
    .unwrap()
}

fn ramp_image(e: Extent) -> ImageRgb {
    let w = e.width as f32 - 1.0;
    let data = (0..e.height)
        .flat_map(move |_| (0..e.width).flat_map(move |x| [x as f32 / w, 0.5, 1.0 - x as f32 / w]))
        .collect();
    ImageRgb::new(e, data).unwrap()
}

fn uniform_stack(e: Extent, inv: f32, planes: usize) -> PlaneStack {
    PlaneStack::decompose(&Field::filled(e, inv), &ramp_image(e), planes).unwrap()
}

#[test]
fn over_accumulates_monotonically_and_saturates() {
    let mut canvas = Canvas::new(extent(1, 1), 0);
    let mut last = canvas.alpha_at(0, 0);
    for a in [0.3f32, 0.5, 0.0, 1.0, 0.2, 0.9] {
        canvas.over(0, 0, [a, a, a], a);
        let now = canvas.alpha_at(0, 0);
        assert!(now >= last, "{now} < {last}");
        assert!((0.0..=1.0).contains(&now));
        last = now;
    }
    assert_eq!(last, 1.0);
}

#[test]
fn earlier_contributions_occlude_later_ones() {
    let mut canvas = Canvas::new(extent(1, 1), 0);
    canvas.over(0, 0, [0.5, 0.0, 0.0], 0.5);
    canvas.over(0, 0, [0.0, 1.0, 0.0], 1.0);
    let out = canvas.crop().unwrap();
    assert_eq!(out.color.pixel(0, 0), [0.5, 0.5, 0.0]);
    assert_eq!(out.alpha.get(0, 0), 1.0);
}

#[test]
fn empty_canvas_crops_to_transparent_frame() {
    let canvas = Canvas::new(extent(4, 2), 3);
    assert_eq!(canvas.extent(), extent(10, 8));
    let out = canvas.crop().unwrap();
    assert_eq!(out.color.extent(), extent(4, 2));
    assert!(out.is_transparent());
}

#[test]
fn padding_covers_largest_shift_and_wobble() {
    let e = extent(20, 6);
    let stack = uniform_stack(e, 0.5, 4);
    let plan = plan("swipe", 0.25);
    let trajectory = plan.trajectory().unwrap();
    let comp = FrameCompositor::new(&stack, &plan, &trajectory, &CompositorOpts::default());
    assert!((comp.max_shift_px() - 5.0).abs() < 1e-12);
    // 5px × (0.6 lateral + 0.25 wobble), rounded up, plus margin.
    assert_eq!(comp.padding(), 7);
}

#[test]
fn uniform_depth_reproduces_the_image_every_frame() {
    let e = extent(8, 8);
    let stack = uniform_stack(e, 0.0, 32);
    let plan = plan("swipe", 0.08);
    let trajectory = plan.trajectory().unwrap();
    assert_eq!(trajectory.len(), 4);
    let comp = FrameCompositor::new(&stack, &plan, &trajectory, &CompositorOpts::default());
    for pose in trajectory.poses() {
        let out = comp.composite(&pose).unwrap();
        assert_eq!(&out.color, stack.image());
        assert!(out.alpha.data().iter().all(|&a| a == 1.0));
    }
}

#[test]
fn nearest_plane_moves_by_full_shift() {
    let e = extent(20, 4);
    let stack = uniform_stack(e, 1.0, 8);
    assert!(stack.layers()[7].support().is_some());
    let plan = plan("swipe", 0.25);
    let trajectory = plan.trajectory().unwrap();
    let comp = FrameCompositor::new(&stack, &plan, &trajectory, &CompositorOpts::default());

    // First swipe frame: lateral x = -0.6, so the near plane moves 3px left.
    let pose = trajectory.pose(0);
    let offset = comp.layer_offset(7, &pose);
    assert!((offset.x + 3.0).abs() < 1e-9);
    assert!(offset.y.abs() < 1e-9);

    let out = comp.composite(&pose).unwrap();
    let image = stack.image();
    for x in 0..17 {
        let got = out.color.pixel(x, 1);
        let want = image.pixel(x + 3, 1);
        for c in 0..3 {
            assert!((got[c] - want[c]).abs() < 1e-4, "x={x} c={c}");
        }
        assert!((out.alpha.get(x, 1) - 1.0).abs() < 1e-4);
    }
    for x in 17..20 {
        assert!(out.alpha.get(x, 1) < 0.2, "x={x}");
    }
}

#[test]
fn far_plane_never_moves() {
    let e = extent(10, 4);
    let stack = uniform_stack(e, 0.5, 3);
    let plan = plan("rotate", 0.3);
    let trajectory = plan.trajectory().unwrap();
    let comp = FrameCompositor::new(&stack, &plan, &trajectory, &CompositorOpts::default());
    for pose in trajectory.poses() {
        assert_eq!(comp.layer_offset(0, &pose), Vec2::ZERO);
        assert_eq!(comp.layer_scale(0, &pose), 1.0);
    }
}

#[test]
fn wobble_lifts_near_planes_mid_swipe() {
    let e = extent(20, 4);
    let stack = uniform_stack(e, 1.0, 2);
    let plan = plan("swipe", 0.25);
    let trajectory = plan.trajectory().unwrap();
    let comp = FrameCompositor::new(&stack, &plan, &trajectory, &CompositorOpts::default());
    let mid = CameraPose {
        lateral: Vec2::ZERO,
        zoom: 0.0,
        progress: 0.5,
    };
    let near = comp.layer_offset(1, &mid);
    assert!((near.y - 0.25 * 5.0).abs() < 1e-9);
    let end = CameraPose {
        progress: 1.0,
        ..mid
    };
    assert!(comp.layer_offset(1, &end).y.abs() < 1e-9);
}

#[test]
fn zoom_shrinks_near_planes_down_to_the_floor() {
    let e = extent(10, 4);
    let stack = uniform_stack(e, 0.5, 5);
    let plan = MotionParams {
        pattern: "rotate_forward".to_string(),
        zoom_amount: 0.2,
        ..Default::default()
    }
    .validate()
    .unwrap();
    let trajectory = plan.trajectory().unwrap();
    let pose = CameraPose {
        lateral: Vec2::ZERO,
        zoom: 1.0,
        progress: 0.5,
    };

    let comp = FrameCompositor::new(&stack, &plan, &trajectory, &CompositorOpts::default());
    assert!((comp.layer_scale(4, &pose) - 0.8).abs() < 1e-9);
    assert!((comp.layer_scale(2, &pose) - 0.9).abs() < 1e-9);

    let floor = CompositorOpts {
        min_layer_scale: 0.95,
    };
    let comp = FrameCompositor::new(&stack, &plan, &trajectory, &floor);
    assert_eq!(comp.layer_scale(4, &pose), 0.95);
}

#[test]
fn zoom_is_centered_on_the_image() {
    let e = extent(11, 5);
    let stack = uniform_stack(e, 1.0, 2);
    let plan = MotionParams {
        pattern: "rotate_forward".to_string(),
        zoom_amount: 0.5,
        ..Default::default()
    }
    .validate()
    .unwrap();
    let trajectory = plan.trajectory().unwrap();
    let comp = FrameCompositor::new(&stack, &plan, &trajectory, &CompositorOpts::default());
    let pose = CameraPose {
        lateral: Vec2::ZERO,
        zoom: 1.0,
        progress: 0.5,
    };
    let t = comp.layer_transform(1, &pose);
    let center = t * kurbo::Point::new(5.0, 2.0);
    assert!((center.x - 5.0).abs() < 1e-9 && (center.y - 2.0).abs() < 1e-9);
    let corner = t * kurbo::Point::new(0.0, 0.0);
    assert!((corner.x - 2.5).abs() < 1e-9 && (corner.y - 1.0).abs() < 1e-9);
}

#[test]
fn compositor_opts_reject_non_positive_floor() {
    assert!(
        CompositorOpts {
            min_layer_scale: 0.0
        }
        .validate()
        .unwrap_err()
        .is_invalid_argument()
    );
    assert!(CompositorOpts::default().validate().is_ok());
}

#[test]
fn zoom_amount_has_no_effect_off_rotate_forward() {
    let stack = uniform_stack(extent(10, 4), 0.5, 5);
    let plan = MotionParams {
        pattern: "shake".to_string(),
        zoom_amount: 0.5,
        ..Default::default()
    }
    .validate()
    .unwrap();
    let trajectory = plan.trajectory().unwrap();
    let comp = FrameCompositor::new(&stack, &plan, &trajectory, &CompositorOpts::default());
    let pose = CameraPose {
        lateral: Vec2::ZERO,
        zoom: 1.0,
        progress: 0.5,
    };
    assert_eq!(comp.layer_scale(4, &pose), 1.0);
}
