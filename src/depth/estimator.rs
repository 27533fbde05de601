use std::path::Path;

use anyhow::Context as _;

use crate::assets::decode::{decode_disparity_map, fit_field};
use crate::foundation::core::Extent;
use crate::foundation::error::{PanError, PanResult};
use crate::foundation::field::{Field, ImageRgb};

/// Diagonal of a 36×24mm full-frame sensor.
const FULL_FRAME_DIAGONAL_MM: f64 = 43.266_615_305_567_87;

const DEFAULT_FOCAL_35MM: f32 = 30.0;

/// Monocular depth estimator consumed by the render session.
///
/// Implementations may be expensive (model inference); a session invokes `estimate` exactly once
/// per render and never before the motion parameters have been validated. The estimator is owned
/// by the caller and injected, so one loaded model can serve many renders.
pub trait DepthEstimator {
    /// Predict a metric-ish depth field with the same extent as `image`.
    ///
    /// `disparity_factor` is `focal_px / width` and converts normalized disparity to depth.
    fn estimate(&mut self, image: &ImageRgb, disparity_factor: f32) -> PanResult<Field>;

    /// Short name used in logs and progress details.
    fn name(&self) -> &str {
        "depth-estimator"
    }
}

impl<E: DepthEstimator + ?Sized> DepthEstimator for Box<E> {
    fn estimate(&mut self, image: &ImageRgb, disparity_factor: f32) -> PanResult<Field> {
        (**self).estimate(image, disparity_factor)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<E: DepthEstimator + ?Sized> DepthEstimator for &mut E {
    fn estimate(&mut self, image: &ImageRgb, disparity_factor: f32) -> PanResult<Field> {
        (**self).estimate(image, disparity_factor)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Camera intrinsics needed to scale estimator disparity into depth.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DepthParams {
    /// Focal length in pixels at the working resolution. Takes precedence when set.
    pub focal_px: Option<f32>,
    /// 35mm-equivalent focal length (e.g. from EXIF). Defaults to 30mm.
    pub focal_35mm: Option<f32>,
}

impl DepthParams {
    /// Focal length in pixels for an image of `extent`.
    ///
    /// Values below 10mm are taken as a physical focal length and scaled by 8.4 to approximate the
    /// 35mm equivalent of a phone sensor.
    pub fn focal_px(&self, extent: Extent) -> f32 {
        if let Some(f_px) = self.focal_px
            && f_px.is_finite()
            && f_px > 0.0
        {
            return f_px;
        }
        let mut f_35mm = match self.focal_35mm {
            Some(f) if f.is_finite() && f >= 1.0 => f,
            _ => DEFAULT_FOCAL_35MM,
        };
        if f_35mm < 10.0 {
            f_35mm *= 8.4;
        }
        focal_35mm_to_px(f_35mm, extent)
    }

    /// `focal_px / width`.
    pub fn disparity_factor(&self, extent: Extent) -> f32 {
        self.focal_px(extent) / extent.width as f32
    }
}

/// Convert a 35mm-equivalent focal length to pixels by matching image and sensor diagonals.
pub fn focal_35mm_to_px(f_35mm: f32, extent: Extent) -> f32 {
    let w = f64::from(extent.width);
    let h = f64::from(extent.height);
    let diag_px = (w * w + h * h).sqrt();
    (f64::from(f_35mm) * diag_px / FULL_FRAME_DIAGONAL_MM) as f32
}

/// Convert normalized disparity to depth the way monodepth predictors do.
pub fn disparity_to_depth(disparity: f32, disparity_factor: f32) -> f32 {
    disparity_factor / disparity.clamp(1e-4, 1e4)
}

/// Estimator that reports the same depth everywhere. Produces no parallax.
#[derive(Clone, Copy, Debug)]
pub struct UniformDepth {
    /// Depth assigned to every pixel.
    pub depth: f32,
}

impl Default for UniformDepth {
    fn default() -> Self {
        Self { depth: 1.0 }
    }
}

impl DepthEstimator for UniformDepth {
    fn estimate(&mut self, image: &ImageRgb, _disparity_factor: f32) -> PanResult<Field> {
        Ok(Field::filled(image.extent(), self.depth))
    }

    fn name(&self) -> &str {
        "uniform"
    }
}

/// Estimator backed by a precomputed disparity map (`0` = far, `1` = near).
///
/// The map is resampled to the working image, so it may come from a lower resolution model pass.
#[derive(Clone, Debug)]
pub struct DisparityMap {
    disparity: Field,
}

impl DisparityMap {
    /// Wrap an in-memory disparity field.
    pub fn new(disparity: Field) -> Self {
        Self { disparity }
    }

    /// Decode a grayscale disparity image (8 or 16 bit).
    pub fn from_bytes(bytes: &[u8]) -> PanResult<Self> {
        Ok(Self::new(decode_disparity_map(bytes)?))
    }

    /// Read a grayscale disparity image from disk.
    pub fn from_path(path: &Path) -> PanResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read disparity map '{}'", path.display()))?;
        Self::from_bytes(&bytes)
    }
}

impl DepthEstimator for DisparityMap {
    fn estimate(&mut self, image: &ImageRgb, disparity_factor: f32) -> PanResult<Field> {
        if !disparity_factor.is_finite() || disparity_factor <= 0.0 {
            return Err(PanError::depth(format!(
                "disparity factor must be positive, got {disparity_factor}"
            )));
        }
        self.disparity.extent().ensure_non_empty()?;
        let mut depth = fit_field(self.disparity.clone(), image.extent().ensure_non_empty()?);
        for v in depth.data_mut() {
            *v = disparity_to_depth(*v, disparity_factor);
        }
        Ok(depth)
    }

    fn name(&self) -> &str {
        "disparity-map"
    }
}

#[cfg(test)]
#[path = "../../tests/unit/depth/estimator.rs"]
mod tests;
