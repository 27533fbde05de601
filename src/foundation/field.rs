use crate::foundation::core::Extent;
use crate::foundation::error::{PanError, PanResult};
use crate::foundation::math::luminance;

/// Dense single-channel `H×W` field of `f32`, row-major.
///
/// Used for depth, normalized inverse depth, edge magnitude and per-layer alpha.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    extent: Extent,
    data: Vec<f32>,
}

impl Field {
    /// Wrap `data` as a field; `data.len()` must equal `width * height`.
    pub fn new(extent: Extent, data: Vec<f32>) -> PanResult<Self> {
        extent.ensure_non_empty()?;
        if data.len() != extent.area() {
            return Err(PanError::precondition(format!(
                "field data has {} values, expected {} for {extent}",
                data.len(),
                extent.area()
            )));
        }
        Ok(Self { extent, data })
    }

    /// Field with every value set to `value`.
    pub fn filled(extent: Extent, value: f32) -> Self {
        Self {
            extent,
            data: vec![value; extent.area()],
        }
    }

    /// Build a field by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(extent: Extent, mut f: impl FnMut(u32, u32) -> f32) -> Self {
        let mut data = Vec::with_capacity(extent.area());
        for y in 0..extent.height {
            for x in 0..extent.width {
                data.push(f(x, y));
            }
        }
        Self { extent, data }
    }

    /// Field dimensions.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.extent.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.extent.height
    }

    /// Row-major values.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable row-major values.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consume the field and return its values.
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Value at `(x, y)`. Panics when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[y as usize * self.extent.width as usize + x as usize]
    }

    /// Fail with a precondition violation unless the field has exactly `extent`.
    pub fn expect_extent(&self, extent: Extent, what: &str) -> PanResult<()> {
        if self.extent != extent {
            return Err(PanError::precondition(format!(
                "{what} is {}, expected {extent}",
                self.extent
            )));
        }
        Ok(())
    }
}

/// `H×W×3` image with linear-ish intensities in `[0, 1]`, interleaved RGB, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageRgb {
    extent: Extent,
    data: Vec<f32>,
}

impl ImageRgb {
    /// Wrap interleaved samples with `channels` values per pixel; only RGB (3) is accepted.
    pub fn from_interleaved(extent: Extent, channels: usize, data: Vec<f32>) -> PanResult<Self> {
        if channels != 3 {
            return Err(PanError::precondition(format!(
                "expected HxWx3 image, got {channels} channels"
            )));
        }
        extent.ensure_non_empty()?;
        if data.len() != extent.area() * 3 {
            return Err(PanError::precondition(format!(
                "image data has {} values, expected {} for {extent}x3",
                data.len(),
                extent.area() * 3
            )));
        }
        Ok(Self { extent, data })
    }

    /// Wrap interleaved RGB samples.
    pub fn new(extent: Extent, data: Vec<f32>) -> PanResult<Self> {
        Self::from_interleaved(extent, 3, data)
    }

    /// Image with every pixel set to `rgb`.
    pub fn filled(extent: Extent, rgb: [f32; 3]) -> Self {
        Self {
            extent,
            data: rgb.repeat(extent.area()),
        }
    }

    /// Convert an 8-bit RGB buffer to normalized floats.
    pub fn from_rgb8(img: &image::RgbImage) -> PanResult<Self> {
        let extent = Extent::new(img.width(), img.height())?;
        let data = img.as_raw().iter().map(|&v| f32::from(v) / 255.0).collect();
        Ok(Self { extent, data })
    }

    /// Take ownership of a float RGB buffer.
    pub fn from_rgb32f(img: image::Rgb32FImage) -> PanResult<Self> {
        let extent = Extent::new(img.width(), img.height())?;
        Ok(Self {
            extent,
            data: img.into_raw(),
        })
    }

    /// Borrow as an `image` float buffer (copies).
    pub fn to_rgb32f(&self) -> PanResult<image::Rgb32FImage> {
        image::Rgb32FImage::from_raw(self.extent.width, self.extent.height, self.data.clone())
            .ok_or_else(|| PanError::precondition("image buffer does not match its extent"))
    }

    /// Quantize to 8-bit RGB.
    pub fn to_rgb8(&self) -> image::RgbImage {
        let bytes = self.data.iter().map(|&v| quantize_unit(v)).collect();
        image::RgbImage::from_raw(self.extent.width, self.extent.height, bytes)
            .unwrap_or_else(|| image::RgbImage::new(self.extent.width, self.extent.height))
    }

    /// Image dimensions.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.extent.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.extent.height
    }

    /// Interleaved RGB samples.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// RGB at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 3] {
        let i = (y as usize * self.extent.width as usize + x as usize) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Per-pixel luma.
    pub fn luminance(&self) -> Field {
        let data = self
            .data
            .chunks_exact(3)
            .map(|px| luminance([px[0], px[1], px[2]]))
            .collect();
        Field {
            extent: self.extent,
            data,
        }
    }

    /// Crop the last row/column when a side is odd (yuv420p encoders need even sides).
    pub fn cropped_even(self) -> Self {
        let even = self.extent.even_floor();
        if even == self.extent {
            return self;
        }
        let src_w = self.extent.width as usize;
        let mut data = Vec::with_capacity(even.area() * 3);
        for y in 0..even.height as usize {
            let row = y * src_w * 3;
            data.extend_from_slice(&self.data[row..row + even.width as usize * 3]);
        }
        Self { extent: even, data }
    }
}

/// Map `[0, 1]` to `0..=255` with rounding; out-of-range and NaN values saturate.
pub fn quantize_unit(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/field.rs"]
mod tests;
