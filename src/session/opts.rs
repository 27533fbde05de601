use crate::depth::conditioner::ConditionerOpts;
use crate::foundation::error::{PanError, PanResult};
use crate::render::compositor::CompositorOpts;
use crate::render::holes::FillOpts;

/// Tunable constants of the depth-parallax engine.
///
/// Defaults are the production values (32 planes, 4 smoothing passes, 6 fill iterations); small
/// values are useful for tests on tiny images.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineOpts {
    /// Number of depth planes (>= 2).
    pub plane_count: usize,
    /// Depth normalization and edge-aware smoothing.
    pub conditioner: ConditionerOpts,
    /// Per-layer warp limits.
    pub compositor: CompositorOpts,
    /// Hole detection and diffusion.
    pub fill: FillOpts,
}

impl Default for EngineOpts {
    fn default() -> Self {
        Self {
            plane_count: 32,
            conditioner: ConditionerOpts::default(),
            compositor: CompositorOpts::default(),
            fill: FillOpts::default(),
        }
    }
}

impl EngineOpts {
    /// Parse a JSON object; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> PanResult<Self> {
        serde_json::from_str(json).map_err(|e| PanError::serde(e.to_string()))
    }

    /// Reject configurations the engine cannot honor.
    pub fn validate(&self) -> PanResult<()> {
        if self.plane_count < 2 {
            return Err(PanError::invalid_argument(format!(
                "plane_count must be >= 2, got {}",
                self.plane_count
            )));
        }
        self.conditioner.validate()?;
        self.compositor.validate()?;
        self.fill.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/opts.rs"]
mod tests;
