use crate::depth::estimator::{DepthEstimator, DepthParams};
use crate::encode::sink::FrameSink;
use crate::foundation::error::{PanError, PanResult};
use crate::foundation::field::{ImageRgb, quantize_unit};
use crate::motion::params::MotionParams;
use crate::session::opts::EngineOpts;
use crate::session::progress::ProgressObserver;
use crate::session::render_session::{RenderSession, RenderStats};

/// A rendered frame as opaque RGB8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgb8 {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGB8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRgb8 {
    /// Quantize a float image (`[0, 1]`, out-of-range values saturate).
    pub fn from_image(image: &ImageRgb) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: image.data().iter().map(|&v| quantize_unit(v)).collect(),
        }
    }

    /// RGB at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Copy into an `image` buffer, e.g. for PNG output.
    pub fn to_rgb_image(&self) -> PanResult<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(|| {
            PanError::precondition(format!(
                "frame data has {} bytes, expected {} for {}x{}x3",
                self.data.len(),
                self.width as usize * self.height as usize * 3,
                self.width,
                self.height
            ))
        })
    }
}

/// A strategy that turns one still image into a motion clip.
///
/// Choosing between strategies (e.g. a hardware splat renderer vs. the depth-parallax engine) is
/// left to the caller; this crate provides [`BackendKind::Parallax`].
pub trait RenderBackend {
    /// Which strategy this is.
    fn kind(&self) -> BackendKind;

    /// Render every frame of the clip into `sink`, in order.
    fn render_clip(
        &mut self,
        image: ImageRgb,
        depth: &DepthParams,
        motion: &MotionParams,
        progress: &mut dyn ProgressObserver,
        sink: &mut dyn FrameSink,
    ) -> PanResult<RenderStats>;
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Depth-parallax multi-plane synthesis on the CPU.
    Parallax,
}

impl<E: DepthEstimator> RenderBackend for RenderSession<E> {
    fn kind(&self) -> BackendKind {
        BackendKind::Parallax
    }

    fn render_clip(
        &mut self,
        image: ImageRgb,
        depth: &DepthParams,
        motion: &MotionParams,
        progress: &mut dyn ProgressObserver,
        sink: &mut dyn FrameSink,
    ) -> PanResult<RenderStats> {
        self.render_into(image, depth, motion, progress, sink)
    }
}

/// Create a rendering backend around a caller-owned depth estimator.
pub fn create_backend(
    kind: BackendKind,
    estimator: Box<dyn DepthEstimator + Send>,
    opts: EngineOpts,
) -> PanResult<Box<dyn RenderBackend + Send>> {
    match kind {
        BackendKind::Parallax => Ok(Box::new(RenderSession::new(estimator, opts)?)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
