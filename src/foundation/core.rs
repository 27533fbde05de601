use crate::foundation::error::{PanError, PanResult};

/// Absolute 0-based frame index within a rendered clip.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Longest clip, in frames, a motion request may ask for.
pub const MAX_FRAME_COUNT: u64 = u32::MAX as u64;

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> PanResult<Self> {
        if den == 0 {
            return Err(PanError::invalid_argument("fps den must be > 0"));
        }
        if num == 0 {
            return Err(PanError::invalid_argument("fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Whole-number FPS.
    pub fn integer(num: u32) -> PanResult<Self> {
        Self::new(num, 1)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Number of frames in a clip of `duration_s` seconds.
    ///
    /// Rounds half to even and never returns fewer than two frames, so every trajectory has a
    /// distinct start and end pose. Clips longer than [`MAX_FRAME_COUNT`] frames are rejected.
    pub fn frame_count(self, duration_s: f64) -> PanResult<u64> {
        let frames = (duration_s * self.as_f64()).round_ties_even();
        if !frames.is_finite() || frames > MAX_FRAME_COUNT as f64 {
            return Err(PanError::invalid_argument(format!(
                "duration_s * fps must be at most {MAX_FRAME_COUNT} frames, got {duration_s} s at {} fps",
                self.as_f64()
            )));
        }
        if frames > 2.0 {
            Ok(frames as u64)
        } else {
            Ok(2)
        }
    }
}

/// Pixel dimensions of a field or frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Extent {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Extent {
    /// Create an extent; both sides must be non-zero.
    pub fn new(width: u32, height: u32) -> PanResult<Self> {
        if width == 0 || height == 0 {
            return Err(PanError::precondition(format!(
                "extent must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Fail with `Precondition` when either side is zero.
    ///
    /// `Extent` has public fields, so values built as struct literals may be empty.
    pub fn ensure_non_empty(self) -> PanResult<Self> {
        Self::new(self.width, self.height)
    }

    /// Number of pixels.
    pub fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Largest even extent that fits inside `self` (each side at least 2 when possible).
    pub fn even_floor(self) -> Self {
        fn even(v: u32) -> u32 {
            if v >= 2 { v - (v % 2) } else { v }
        }
        Self {
            width: even(self.width),
            height: even(self.height),
        }
    }

    /// Return `true` when both sides are even.
    pub fn is_even(self) -> bool {
        self.width.is_multiple_of(2) && self.height.is_multiple_of(2)
    }

    /// Longest side in pixels.
    pub fn longest_side(self) -> u32 {
        self.width.max(self.height)
    }
}

impl std::fmt::Display for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
