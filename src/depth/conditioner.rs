use crate::foundation::error::{PanError, PanResult};
use crate::foundation::field::{Field, ImageRgb};
use crate::foundation::math::{box_mean, coarse_quantiles, sobel_magnitude};

/// Smallest depth inverted; protects against zero or negative estimator output.
const MIN_DEPTH: f32 = 1e-3;
/// Smallest normalization span for both inverse depth and edge strength.
const MIN_SPAN: f32 = 1e-6;

/// Tuning for [`condition_depth`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConditionerOpts {
    /// Side of the square downsample used to estimate quantiles.
    pub quantile_grid: u32,
    /// Lower inverse-depth quantile mapped to 0 (far).
    pub low_quantile: f64,
    /// Upper inverse-depth quantile mapped to 1 (near).
    pub high_quantile: f64,
    /// Edge-magnitude quantile treated as a full-strength edge.
    pub edge_quantile: f64,
    /// Number of edge-aware smoothing passes.
    pub smoothing_passes: u32,
    /// Box radius of each smoothing pass (4 = 9×9).
    pub smoothing_radius: u32,
}

impl Default for ConditionerOpts {
    fn default() -> Self {
        Self {
            quantile_grid: 128,
            low_quantile: 0.05,
            high_quantile: 0.95,
            edge_quantile: 0.90,
            smoothing_passes: 4,
            smoothing_radius: 4,
        }
    }
}

impl ConditionerOpts {
    /// Reject settings the conditioner cannot honor.
    pub fn validate(&self) -> PanResult<()> {
        if self.quantile_grid == 0 {
            return Err(PanError::invalid_argument(
                "conditioner.quantile_grid must be >= 1",
            ));
        }
        let unit = 0.0..=1.0;
        if !unit.contains(&self.low_quantile)
            || !unit.contains(&self.high_quantile)
            || self.low_quantile >= self.high_quantile
        {
            return Err(PanError::invalid_argument(
                "conditioner quantiles must satisfy 0 <= low_quantile < high_quantile <= 1",
            ));
        }
        if !unit.contains(&self.edge_quantile) {
            return Err(PanError::invalid_argument(
                "conditioner.edge_quantile must be in [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Turn estimator depth into a normalized inverse-depth field (`0` = farthest, `1` = nearest).
///
/// Normalization uses robust quantiles of a coarse downsample so isolated extreme depths do not
/// flatten the rest of the scene. The field is then smoothed with a box filter whose blend weight
/// collapses quadratically at luminance edges, which keeps depth discontinuities aligned with image
/// edges instead of smearing them into the parallax warp.
///
/// Flat depth is not an error: the span is clamped and every pixel maps to 0.
#[tracing::instrument(skip_all, fields(extent = %depth.extent()))]
pub fn condition_depth(depth: &Field, image: &ImageRgb, opts: &ConditionerOpts) -> PanResult<Field> {
    depth.extent().ensure_non_empty()?;
    depth.expect_extent(image.extent(), "depth field")?;

    let inv = Field::from_fn(depth.extent(), |x, y| 1.0 / depth.get(x, y).max(MIN_DEPTH));
    let [q_low, q_high] = coarse_quantiles(
        &inv,
        opts.quantile_grid,
        [opts.low_quantile, opts.high_quantile],
    );
    let span = q_high - q_low;
    if span < MIN_SPAN {
        tracing::warn!(q_low, q_high, "inverse depth has no spread; parallax will be flat");
    }
    let span = span.max(MIN_SPAN);
    let mut inv01 = inv;
    for v in inv01.data_mut() {
        *v = ((*v - q_low) / span).clamp(0.0, 1.0);
    }

    let weights = smoothing_weights(image, opts);
    let radius = opts.smoothing_radius as usize;
    for _ in 0..opts.smoothing_passes {
        let blurred = box_mean(&inv01, radius);
        for ((v, &b), &w) in inv01
            .data_mut()
            .iter_mut()
            .zip(blurred.data())
            .zip(weights.data())
        {
            *v += w * (b - *v);
        }
    }

    tracing::debug!(q_low, q_high, passes = opts.smoothing_passes, "depth conditioned");
    Ok(inv01)
}

/// Per-pixel blend toward the box average: 1 on flat luminance, falling as `(1 - e)²` with
/// normalized edge strength `e`.
pub(crate) fn smoothing_weights(image: &ImageRgb, opts: &ConditionerOpts) -> Field {
    let edges = sobel_magnitude(&image.luminance());
    let [q_edge] = coarse_quantiles(&edges, opts.quantile_grid, [opts.edge_quantile]);
    let scale = q_edge.max(MIN_SPAN);
    let mut weights = edges;
    for v in weights.data_mut() {
        let e = (*v / scale).clamp(0.0, 1.0);
        *v = (1.0 - e) * (1.0 - e);
    }
    weights
}

#[cfg(test)]
#[path = "../../tests/unit/depth/conditioner.rs"]
mod tests;
