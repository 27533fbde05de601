use crate::foundation::error::{PanError, PanResult};
use crate::foundation::field::ImageRgb;
use crate::foundation::math::{BoxSums, luminance};
use crate::render::compositor::Composite;

/// Hole-filler tuning.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FillOpts {
    /// Coverage below which a pixel is a hole.
    pub hole_alpha: f32,
    /// Smallest alpha divided by when unpremultiplying.
    pub min_alpha: f32,
    /// Maximum number of diffusion iterations.
    pub iterations: u32,
    /// Diffusion window radius (2 = 5×5).
    pub radius: u32,
    /// Stop early once this fraction of pixels is filled.
    pub target_coverage: f64,
    /// A pixel darker than this fraction of its 3×3 mean luma is a speckle candidate.
    pub speckle_luma_ratio: f32,
    /// Speckle candidates must have coverage below this.
    pub speckle_alpha_max: f32,
}

impl Default for FillOpts {
    fn default() -> Self {
        Self {
            hole_alpha: 0.20,
            min_alpha: 1e-4,
            iterations: 6,
            radius: 2,
            target_coverage: 0.999,
            speckle_luma_ratio: 0.5,
            speckle_alpha_max: 0.85,
        }
    }
}

impl FillOpts {
    /// Reject settings the filler cannot honor.
    pub fn validate(&self) -> PanResult<()> {
        let unit = 0.0..=1.0;
        if !unit.contains(&self.hole_alpha) {
            return Err(PanError::invalid_argument(format!(
                "fill.hole_alpha must be in [0, 1], got {}",
                self.hole_alpha
            )));
        }
        if !self.min_alpha.is_finite() || self.min_alpha <= 0.0 {
            return Err(PanError::invalid_argument(format!(
                "fill.min_alpha must be > 0, got {}",
                self.min_alpha
            )));
        }
        if self.radius == 0 {
            return Err(PanError::invalid_argument("fill.radius must be >= 1"));
        }
        if !(0.0..=1.0).contains(&self.target_coverage) {
            return Err(PanError::invalid_argument(format!(
                "fill.target_coverage must be in [0, 1], got {}",
                self.target_coverage
            )));
        }
        if !unit.contains(&self.speckle_luma_ratio) || !unit.contains(&self.speckle_alpha_max) {
            return Err(PanError::invalid_argument(
                "fill speckle thresholds must be in [0, 1]",
            ));
        }
        Ok(())
    }
}

/// What the filler found and fixed in one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FillReport {
    /// Pixels below the coverage threshold.
    pub low_alpha: usize,
    /// Dark isolated pixels near soft edges.
    pub speckles: usize,
    /// Holes left after the last iteration; they keep their unpremultiplied value.
    pub unresolved: usize,
    /// Iterations actually run.
    pub iterations: u32,
    /// Filled-pixel fraction before the first iteration and after each one.
    pub coverage: Vec<f64>,
}

impl FillReport {
    /// Total pixels initially marked as holes.
    pub fn holes(&self) -> usize {
        self.low_alpha + self.speckles
    }
}

/// Turn a composite into visible color, closing under-covered pixels by masked diffusion.
///
/// Each iteration replaces every hole with the mean of the non-hole pixels in its window and marks
/// it resolved when that window had any. Holes with no filled neighbor within `iterations × radius`
/// stay unresolved; that is a visual degradation, not an error.
pub fn fill_holes(composite: &Composite, opts: &FillOpts) -> PanResult<(ImageRgb, FillReport)> {
    composite
        .alpha
        .expect_extent(composite.color.extent(), "composite alpha")?;
    let extent = composite.color.extent();
    let (w, h) = (extent.width as usize, extent.height as usize);
    let alpha = composite.alpha.data();

    let mut color: Vec<f32> = composite
        .color
        .data()
        .chunks_exact(3)
        .zip(alpha)
        .flat_map(|(px, &a)| {
            let inv = 1.0 / a.max(opts.min_alpha);
            [px[0] * inv, px[1] * inv, px[2] * inv]
        })
        .collect();

    let mut hole: Vec<bool> = alpha.iter().map(|&a| a < opts.hole_alpha).collect();
    let mut report = FillReport {
        low_alpha: hole.iter().filter(|&&h| h).count(),
        ..FillReport::default()
    };

    let luma: Vec<f32> = color
        .chunks_exact(3)
        .map(|px| luminance([px[0], px[1], px[2]]))
        .collect();
    let luma_sums = BoxSums::new(extent, luma.iter().copied());
    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            if hole[i] || alpha[i] >= opts.speckle_alpha_max {
                continue;
            }
            let mean = luma_sums.window_sum(x, y, 1) / luma_sums.window_count(x, y, 1) as f64;
            if f64::from(luma[i]) < f64::from(opts.speckle_luma_ratio) * mean {
                hole[i] = true;
                report.speckles += 1;
            }
        }
    }

    let total = (w * h) as f64;
    let mut remaining = report.holes();
    report.coverage.push(1.0 - remaining as f64 / total);

    let radius = opts.radius as usize;
    for _ in 0..opts.iterations {
        if remaining == 0 || 1.0 - remaining as f64 / total >= opts.target_coverage {
            break;
        }
        let valid = BoxSums::new(extent, hole.iter().map(|&h| if h { 0.0 } else { 1.0 }));
        let channels: [BoxSums; 3] = std::array::from_fn(|c| {
            BoxSums::new(
                extent,
                color
                    .chunks_exact(3)
                    .zip(&hole)
                    .map(move |(px, &h)| if h { 0.0 } else { px[c] }),
            )
        });

        let mut resolved = Vec::new();
        for y in 0..h {
            for x in 0..w {
                let i = y * w + x;
                if !hole[i] {
                    continue;
                }
                let weight = valid.window_sum(x, y, radius);
                if weight <= 0.0 {
                    continue;
                }
                for (c, sums) in channels.iter().enumerate() {
                    color[i * 3 + c] = (sums.window_sum(x, y, radius) / weight) as f32;
                }
                resolved.push(i);
            }
        }
        for &i in &resolved {
            hole[i] = false;
        }
        remaining -= resolved.len();
        report.iterations += 1;
        report.coverage.push(1.0 - remaining as f64 / total);
    }

    report.unresolved = remaining;
    if remaining > 0 {
        tracing::debug!(
            unresolved = remaining,
            extent = %extent,
            "holes left unfilled after diffusion"
        );
    }
    Ok((ImageRgb::new(extent, color)?, report))
}

#[cfg(test)]
#[path = "../../tests/unit/render/holes.rs"]
mod tests;
