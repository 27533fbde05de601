use std::fmt;
use std::str::FromStr;

use crate::foundation::error::PanError;

/// Virtual camera-motion pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// Linear left-to-right pan with an optional vertical wobble.
    Swipe,
    /// Horizontal shake, then vertical shake.
    Shake,
    /// Circular orbit.
    Rotate,
    /// Circular orbit with a synchronized push-in/out.
    RotateForward,
}

impl Pattern {
    /// Every supported pattern, in selector order.
    pub const ALL: [Pattern; 4] = [
        Pattern::Swipe,
        Pattern::Shake,
        Pattern::Rotate,
        Pattern::RotateForward,
    ];

    /// Selector literal.
    pub fn as_str(self) -> &'static str {
        match self {
            Pattern::Swipe => "swipe",
            Pattern::Shake => "shake",
            Pattern::Rotate => "rotate",
            Pattern::RotateForward => "rotate_forward",
        }
    }

    /// Whether the wobble parameter affects this pattern.
    pub fn has_wobble(self) -> bool {
        matches!(self, Pattern::Swipe)
    }

    /// Whether the zoom parameter affects this pattern.
    pub fn has_zoom(self) -> bool {
        matches!(self, Pattern::RotateForward)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pattern {
    type Err = PanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                PanError::invalid_argument(format!(
                    "unsupported pattern '{s}' (expected one of: swipe, shake, rotate, rotate_forward)"
                ))
            })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/pattern.rs"]
mod tests;
