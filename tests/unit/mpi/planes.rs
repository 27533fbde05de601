use super::*;

fn extent(w: u32, h: u32) -> Extent {
    Extent::new(w, h).unwrap()
}

fn gradient_stack(planes: usize) -> (Field, PlaneStack) {
    let e = extent(17, 5);
    let inv01 = Field::from_fn(e, |x, y| (x as f32 / 16.0 + y as f32 * 0.013).min(1.0));
    let img = ImageRgb::filled(e, [0.8, 0.4, 0.2]);
    let stack = PlaneStack::decompose(&inv01, &img, planes).unwrap();
    (inv01, stack)
}

#[test]
fn alpha_partitions_unity_at_every_pixel() {
    for planes in [2usize, 3, 7, 32] {
        let (inv01, stack) = gradient_stack(planes);
        assert_eq!(stack.len(), planes);
        for y in 0..inv01.height() {
            for x in 0..inv01.width() {
                let sum: f32 = stack.layers().iter().map(|l| l.alpha.get(x, y)).sum();
                assert!((sum - 1.0).abs() < 1e-6, "planes={planes} ({x},{y}) sum={sum}");
            }
        }
    }
}

#[test]
fn at_most_two_adjacent_planes_are_nonzero() {
    let (inv01, stack) = gradient_stack(32);
    for y in 0..inv01.height() {
        for x in 0..inv01.width() {
            let nonzero: Vec<usize> = stack
                .layers()
                .iter()
                .enumerate()
                .filter(|(_, l)| l.alpha().get(x, y) > 0.0)
                .map(|(i, _)| i)
                .collect();
            assert!(!nonzero.is_empty() && nonzero.len() <= 2);
            if nonzero.len() == 2 {
                assert_eq!(nonzero[1], nonzero[0] + 1);
            }
            let pos = inv01.get(x, y) * 31.0;
            assert!(nonzero.iter().all(|&i| (i as f32 - pos).abs() < 1.0 + 1e-5));
        }
    }
}

#[test]
fn extremes_land_on_first_and_last_plane() {
    let e = extent(2, 1);
    let inv01 = Field::new(e, vec![0.0, 1.0]).unwrap();
    let img = ImageRgb::filled(e, [1.0; 3]);
    let stack = PlaneStack::decompose(&inv01, &img, 32).unwrap();
    assert_eq!(stack.layers()[0].alpha().get(0, 0), 1.0);
    assert_eq!(stack.layers()[31].alpha().get(1, 0), 1.0);
    assert!(stack.layers()[15].is_empty());
    assert_eq!(
        stack.layers()[0].support(),
        Some(PixelBounds {
            x0: 0,
            y0: 0,
            x1: 1,
            y1: 1
        })
    );
}

#[test]
fn midpoint_splits_evenly_between_neighbours() {
    let e = extent(1, 1);
    let inv01 = Field::new(e, vec![0.5]).unwrap();
    let img = ImageRgb::filled(e, [1.0; 3]);
    let stack = PlaneStack::decompose(&inv01, &img, 4).unwrap();
    assert!((stack.layers()[1].alpha().get(0, 0) - 0.5).abs() < 1e-6);
    assert!((stack.layers()[2].alpha().get(0, 0) - 0.5).abs() < 1e-6);
}

#[test]
fn premultiplied_color_scales_image_by_alpha() {
    let e = extent(1, 1);
    let inv01 = Field::new(e, vec![0.25]).unwrap();
    let img = ImageRgb::filled(e, [0.8, 0.4, 0.2]);
    let stack = PlaneStack::decompose(&inv01, &img, 3).unwrap();
    let premul = stack.layers()[0].premultiplied(stack.image()).unwrap();
    let px = premul.pixel(0, 0);
    assert!((px[0] - 0.4).abs() < 1e-6);
    assert!((px[1] - 0.2).abs() < 1e-6);
    assert!((px[2] - 0.1).abs() < 1e-6);
}

#[test]
fn center01_spans_far_to_near() {
    assert_eq!(center01(0, 32), 0.0);
    assert_eq!(center01(31, 32), 1.0);
    assert_eq!(center01(0, 1), 0.0);
    let (_, stack) = gradient_stack(5);
    assert_eq!(stack.center01(2), 0.5);
}

#[test]
fn rejects_degenerate_plane_count_and_shape() {
    let e = extent(2, 2);
    let img = ImageRgb::filled(e, [0.0; 3]);
    let err = PlaneStack::decompose(&Field::filled(e, 0.5), &img, 1).unwrap_err();
    assert!(err.is_invalid_argument());
    let err = PlaneStack::decompose(&Field::filled(extent(2, 3), 0.5), &img, 8).unwrap_err();
    assert!(err.is_precondition());
}

#[test]
fn empty_image_is_rejected() {
    let empty = Extent {
        width: 4,
        height: 0,
    };
    let err = PlaneStack::decompose(
        &Field::filled(empty, 0.5),
        &ImageRgb::filled(empty, [0.0; 3]),
        4,
    )
    .unwrap_err();
    assert!(err.is_precondition());
}
