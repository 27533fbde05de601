use crate::foundation::core::Fps;
use crate::foundation::error::{PanError, PanResult};
use crate::motion::pattern::Pattern;
use crate::motion::trajectory::Trajectory;

/// Camera-motion request as received at the boundary (CLI flags, JSON job files, forms).
///
/// Nothing here is trusted until [`MotionParams::validate`] turns it into a [`MotionPlan`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionParams {
    /// Clip duration in seconds (> 0).
    pub duration_s: f64,
    /// Output frame rate (> 0).
    pub fps: u32,
    /// Maximum parallax shift as a fraction of image width (> 0).
    pub motion_amount: f64,
    /// Vertical wobble strength for `swipe` (>= 0).
    pub wobble_amount: f64,
    /// Pattern selector literal: `swipe`, `shake`, `rotate` or `rotate_forward`.
    pub pattern: String,
    /// Peak push-in for `rotate_forward` (>= 0).
    pub zoom_amount: f64,
    /// Revolutions/oscillations over the clip (>= 1).
    pub repeat_count: u32,
    /// Longest side of the working resolution in pixels (> 0).
    pub max_side: u32,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            duration_s: 4.0,
            fps: 30,
            motion_amount: 0.08,
            wobble_amount: 0.25,
            pattern: Pattern::Swipe.as_str().to_string(),
            zoom_amount: 0.15,
            repeat_count: 1,
            max_side: 1536,
        }
    }
}

impl MotionParams {
    /// Parse a JSON object; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> PanResult<Self> {
        serde_json::from_str(json).map_err(|e| PanError::serde(e.to_string()))
    }

    /// Check every field and resolve the pattern and frame count.
    ///
    /// Fails fast with `InvalidArgument` naming the first offending field.
    pub fn validate(&self) -> PanResult<MotionPlan> {
        positive("duration_s", self.duration_s)?;
        if self.fps == 0 {
            return Err(PanError::invalid_argument("fps must be > 0, got 0"));
        }
        positive("motion_amount", self.motion_amount)?;
        non_negative("wobble_amount", self.wobble_amount)?;
        let pattern: Pattern = self.pattern.parse()?;
        non_negative("zoom_amount", self.zoom_amount)?;
        if self.repeat_count == 0 {
            return Err(PanError::invalid_argument("repeat_count must be >= 1, got 0"));
        }
        if self.max_side == 0 {
            return Err(PanError::invalid_argument("max_side must be > 0, got 0"));
        }

        let fps = Fps::integer(self.fps)?;
        let frame_count = usize::try_from(fps.frame_count(self.duration_s)?).map_err(|_| {
            PanError::invalid_argument("duration_s * fps exceeds the addressable frame count")
        })?;

        Ok(MotionPlan {
            pattern,
            frame_count,
            fps,
            motion_amount: self.motion_amount,
            wobble_amount: self.wobble_amount,
            zoom_amount: self.zoom_amount,
            repeat_count: self.repeat_count,
            max_side: self.max_side,
        })
    }
}

/// Validated motion request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionPlan {
    /// Parsed pattern.
    pub pattern: Pattern,
    /// `max(2, round(duration_s × fps))`.
    pub frame_count: usize,
    /// Output frame rate.
    pub fps: Fps,
    /// Maximum parallax shift as a fraction of image width.
    pub motion_amount: f64,
    /// Vertical wobble strength (swipe only).
    pub wobble_amount: f64,
    /// Peak push-in (rotate_forward only).
    pub zoom_amount: f64,
    /// Revolutions/oscillations over the clip.
    pub repeat_count: u32,
    /// Longest side of the working resolution.
    pub max_side: u32,
}

impl MotionPlan {
    /// Build the trajectory for this plan.
    pub fn trajectory(&self) -> PanResult<Trajectory> {
        Trajectory::generate(self.pattern, self.frame_count, self.repeat_count)
    }

    /// Maximum shift in pixels for an image `width` pixels wide.
    pub fn max_shift_px(&self, width: u32) -> f64 {
        self.motion_amount * f64::from(width)
    }

    /// Wobble applied by the compositor: zero unless the pattern wobbles.
    pub fn effective_wobble(&self) -> f64 {
        if self.pattern.has_wobble() {
            self.wobble_amount
        } else {
            0.0
        }
    }

    /// Zoom applied by the compositor: zero unless the pattern zooms.
    pub fn effective_zoom(&self) -> f64 {
        if self.pattern.has_zoom() {
            self.zoom_amount
        } else {
            0.0
        }
    }
}

fn positive(field: &str, v: f64) -> PanResult<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(PanError::invalid_argument(format!(
            "{field} must be > 0, got {v}"
        )));
    }
    Ok(())
}

fn non_negative(field: &str, v: f64) -> PanResult<()> {
    if !v.is_finite() || v < 0.0 {
        return Err(PanError::invalid_argument(format!(
            "{field} must be >= 0, got {v}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/motion/params.rs"]
mod tests;
