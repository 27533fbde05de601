use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{PanError, PanResult};
use crate::render::backend::FrameRgb8;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
}

/// Consumer of rendered frames; container and encoding are entirely its business.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order, between one
/// `begin` and one `end`.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> PanResult<()>;
    /// Push one frame in strictly increasing order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgb8) -> PanResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> PanResult<()>;
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRgb8)>,
    finished: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRgb8)] {
        &self.frames
    }

    /// Return `true` once `end` was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consume the sink and return the frames in order.
    pub fn into_frames(self) -> Vec<FrameRgb8> {
        self.frames.into_iter().map(|(_, f)| f).collect()
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> PanResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgb8) -> PanResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> PanResult<()> {
        self.finished = true;
        Ok(())
    }
}

/// Fail unless `frame` matches the configured size.
pub(crate) fn check_frame(cfg: &SinkConfig, frame: &FrameRgb8) -> PanResult<()> {
    if frame.width != cfg.width || frame.height != cfg.height {
        return Err(PanError::sink(format!(
            "frame size mismatch: got {}x{}, expected {}x{}",
            frame.width, frame.height, cfg.width, cfg.height
        )));
    }
    if frame.data.len() != cfg.width as usize * cfg.height as usize * 3 {
        return Err(PanError::sink(
            "frame.data size mismatch with width*height*3",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
