use std::f64::consts::{PI, TAU};

use kurbo::Vec2;

use crate::foundation::error::{PanError, PanResult};
use crate::motion::pattern::Pattern;

/// Swipe pans between `-SWIPE_EXTENT` and `+SWIPE_EXTENT`.
const SWIPE_EXTENT: f64 = 0.6;

/// Camera motion for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    /// Normalized lateral offset, roughly in `[-1, 1]²`.
    pub lateral: Vec2,
    /// Zoom fraction in `[0, 1]`, scaled by the zoom amount at render time.
    pub zoom: f64,
    /// Normalized position of the frame in the clip, `[0, 1]`.
    pub progress: f64,
}

/// Per-frame camera-motion scalars for a whole clip.
///
/// A pure function of `(pattern, frame_count, repeat_count)`: no randomness and no hidden state,
/// so identical arguments always produce bit-identical sequences.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Trajectory {
    pattern: Pattern,
    repeat_count: u32,
    lateral_x: Vec<f64>,
    lateral_y: Vec<f64>,
    zoom: Vec<f64>,
}

impl Trajectory {
    /// Generate the trajectory for `pattern` over `frame_count` frames.
    pub fn generate(pattern: Pattern, frame_count: usize, repeat_count: u32) -> PanResult<Self> {
        if frame_count < 2 {
            return Err(PanError::invalid_argument(format!(
                "frame_count must be >= 2, got {frame_count}"
            )));
        }
        if repeat_count == 0 {
            return Err(PanError::invalid_argument("repeat_count must be >= 1"));
        }

        let n = frame_count;
        let reps = f64::from(repeat_count);
        let mut lateral_x = vec![0.0; n];
        let mut lateral_y = vec![0.0; n];
        let mut zoom = vec![0.0; n];

        match pattern {
            Pattern::Swipe => {
                for (i, x) in lateral_x.iter_mut().enumerate() {
                    *x = -SWIPE_EXTENT + 2.0 * SWIPE_EXTENT * position(i, n);
                }
            }
            Pattern::Shake => {
                let first = n.div_ceil(2);
                let second = n - first;
                for (i, x) in lateral_x[..first].iter_mut().enumerate() {
                    *x = (TAU * reps * position(i, first)).sin();
                }
                for (j, y) in lateral_y[first..].iter_mut().enumerate() {
                    *y = (TAU * reps * position(j, second)).sin();
                }
            }
            Pattern::Rotate | Pattern::RotateForward => {
                for i in 0..n {
                    let angle = TAU * reps * position(i, n);
                    lateral_x[i] = angle.sin();
                    lateral_y[i] = angle.cos();
                    if pattern == Pattern::RotateForward {
                        zoom[i] = (1.0 - angle.cos()) / 2.0;
                    }
                }
            }
        }

        Ok(Self {
            pattern,
            repeat_count,
            lateral_x,
            lateral_y,
            zoom,
        })
    }

    /// Pattern this trajectory was generated from.
    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    /// Number of revolutions/oscillations.
    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.lateral_x.len()
    }

    /// Always `false` for a generated trajectory.
    pub fn is_empty(&self) -> bool {
        self.lateral_x.is_empty()
    }

    /// Horizontal offsets per frame.
    pub fn lateral_x(&self) -> &[f64] {
        &self.lateral_x
    }

    /// Vertical offsets per frame.
    pub fn lateral_y(&self) -> &[f64] {
        &self.lateral_y
    }

    /// Zoom fractions per frame.
    pub fn zoom(&self) -> &[f64] {
        &self.zoom
    }

    /// Pose for frame `i`. Panics when out of range.
    pub fn pose(&self, i: usize) -> CameraPose {
        CameraPose {
            lateral: Vec2::new(self.lateral_x[i], self.lateral_y[i]),
            zoom: self.zoom[i],
            progress: position(i, self.len()),
        }
    }

    /// Poses in frame order.
    pub fn poses(&self) -> impl ExactSizeIterator<Item = CameraPose> + '_ {
        (0..self.len()).map(|i| self.pose(i))
    }

    /// Largest absolute lateral offset along either axis.
    pub fn max_lateral_extent(&self) -> f64 {
        self.lateral_x
            .iter()
            .chain(&self.lateral_y)
            .fold(0.0f64, |m, v| m.max(v.abs()))
    }
}

/// Vertical wobble factor for the swipe pattern: zero at both ends, one at the midpoint.
///
/// This is `sin(π·p)`. A `-cos(π·p)` curve would start at -1 and end at +1, so the clip would
/// open and close with a full vertical offset instead of settling back onto the swipe path.
pub fn wobble_envelope(progress: f64) -> f64 {
    (PI * progress.clamp(0.0, 1.0)).sin()
}

/// `i / (count - 1)`; a single sample sits at 0.
fn position(i: usize, count: usize) -> f64 {
    if count < 2 {
        0.0
    } else {
        i as f64 / (count - 1) as f64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/trajectory.rs"]
mod tests;
