use std::path::Path;

use anyhow::Context;

use crate::foundation::core::Extent;
use crate::foundation::error::{PanError, PanResult};
use crate::foundation::field::{Field, ImageRgb};
use crate::foundation::math::resize_bilinear;

/// Decode encoded image bytes (any format the `image` crate reads) into normalized RGB.
///
/// Alpha, if present, is dropped.
pub fn decode_image(bytes: &[u8]) -> PanResult<ImageRgb> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    ImageRgb::from_rgb8(&dyn_img.to_rgb8())
}

/// Read and decode an image file.
pub fn load_image(path: &Path) -> PanResult<ImageRgb> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes)
}

/// Bound the longest side by `max_side`, then crop to even dimensions.
///
/// Images already within `max_side` are only cropped. Downscaled sides never drop below 2 pixels.
pub fn prepare_working_image(img: ImageRgb, max_side: u32) -> PanResult<ImageRgb> {
    let img = resize_max_side(img, max_side)?;
    let img = img.cropped_even();
    let extent = img.extent();
    if extent.width < 2 || extent.height < 2 {
        return Err(PanError::precondition(format!(
            "image must be at least 2x2 after even cropping, got {extent}"
        )));
    }
    Ok(img)
}

fn resize_max_side(img: ImageRgb, max_side: u32) -> PanResult<ImageRgb> {
    let longest = img.extent().longest_side();
    if max_side == 0 || longest <= max_side {
        return Ok(img);
    }
    let scale = f64::from(max_side) / f64::from(longest);
    let new_w = ((f64::from(img.width()) * scale).round() as u32).max(2);
    let new_h = ((f64::from(img.height()) * scale).round() as u32).max(2);
    tracing::debug!(
        from = %img.extent(),
        to_w = new_w,
        to_h = new_h,
        "downscaling image to working resolution"
    );

    let src = img.to_rgb32f()?;
    let mut resized =
        image::imageops::resize(&src, new_w, new_h, image::imageops::FilterType::CatmullRom);
    // Catmull-Rom overshoots near hard edges.
    for v in resized.iter_mut() {
        *v = v.clamp(0.0, 1.0);
    }
    ImageRgb::from_rgb32f(resized)
}

/// Decode a grayscale disparity map (8 or 16 bit) into `[0, 1]` values.
pub fn decode_disparity_map(bytes: &[u8]) -> PanResult<Field> {
    let dyn_img = image::load_from_memory(bytes).context("decode disparity map from memory")?;
    let luma = dyn_img.to_luma16();
    let extent = Extent::new(luma.width(), luma.height())?;
    let data = luma
        .into_raw()
        .into_iter()
        .map(|v| f32::from(v) / f32::from(u16::MAX))
        .collect();
    Field::new(extent, data)
}

/// Resample a field to `extent` (bilinear, corners aligned). Returns the input when it already fits.
pub fn fit_field(field: Field, extent: Extent) -> Field {
    if field.extent() == extent {
        return field;
    }
    resize_bilinear(&field, extent)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
