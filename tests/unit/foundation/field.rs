use super::*;

fn extent(w: u32, h: u32) -> Extent {
    Extent::new(w, h).unwrap()
}

#[test]
fn field_rejects_wrong_length() {
    let err = Field::new(extent(3, 2), vec![0.0; 5]).unwrap_err();
    assert!(err.is_precondition());
}

#[test]
fn field_from_fn_is_row_major() {
    let f = Field::from_fn(extent(3, 2), |x, y| (y * 10 + x) as f32);
    assert_eq!(f.data(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
    assert_eq!(f.get(2, 1), 12.0);
}

#[test]
fn image_requires_three_channels() {
    let err = ImageRgb::from_interleaved(extent(2, 2), 4, vec![0.0; 16]).unwrap_err();
    assert!(err.is_precondition());
    assert!(err.to_string().contains("4 channels"));

    let err = ImageRgb::new(extent(2, 2), vec![0.0; 11]).unwrap_err();
    assert!(err.is_precondition());
}

#[test]
fn cropped_even_keeps_top_left_pixels() {
    let data: Vec<f32> = (0..(3 * 3 * 3)).map(|v| v as f32 / 100.0).collect();
    let img = ImageRgb::new(extent(3, 3), data).unwrap();
    let before = img.pixel(1, 1);
    let even = img.cropped_even();
    assert_eq!(even.extent(), extent(2, 2));
    assert_eq!(even.pixel(1, 1), before);
}

#[test]
fn rgb8_roundtrip_quantizes_consistently() {
    let mut src = image::RgbImage::new(2, 2);
    src.put_pixel(1, 0, image::Rgb([255, 128, 0]));
    let img = ImageRgb::from_rgb8(&src).unwrap();
    assert_eq!(img.pixel(1, 0)[0], 1.0);
    assert_eq!(img.to_rgb8(), src);
}

#[test]
fn quantize_saturates() {
    assert_eq!(quantize_unit(-0.5), 0);
    assert_eq!(quantize_unit(2.0), 255);
    assert_eq!(quantize_unit(f32::NAN), 0);
    assert_eq!(quantize_unit(0.5), 128);
}

#[test]
fn luminance_of_white_is_one() {
    let img = ImageRgb::filled(extent(2, 2), [1.0, 1.0, 1.0]);
    for &v in img.luminance().data() {
        assert!((v - 1.0).abs() < 1e-6);
    }
}

#[test]
fn empty_extents_are_rejected() {
    let empty = Extent {
        width: 0,
        height: 3,
    };
    assert!(Field::new(empty, vec![]).unwrap_err().is_precondition());
    assert!(ImageRgb::new(empty, vec![]).unwrap_err().is_precondition());
    assert!(empty.ensure_non_empty().is_err());
    assert_eq!(extent(2, 3).ensure_non_empty().unwrap(), extent(2, 3));
}
