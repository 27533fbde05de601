use crate::foundation::core::Extent;
use crate::foundation::error::{PanError, PanResult};
use crate::foundation::field::{Field, ImageRgb};

/// Inclusive-exclusive pixel rectangle `[x0, x1) × [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBounds {
    /// Left column (inclusive).
    pub x0: u32,
    /// Top row (inclusive).
    pub y0: u32,
    /// Right column (exclusive).
    pub x1: u32,
    /// Bottom row (exclusive).
    pub y1: u32,
}

impl PixelBounds {
    fn point(x: u32, y: u32) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x + 1,
            y1: y + 1,
        }
    }

    fn include(&mut self, x: u32, y: u32) {
        self.x0 = self.x0.min(x);
        self.y0 = self.y0.min(y);
        self.x1 = self.x1.max(x + 1);
        self.y1 = self.y1.max(y + 1);
    }
}

/// One depth plane: per-pixel coverage weight plus the bounds where it is non-zero.
#[derive(Clone, Debug)]
pub struct Layer {
    alpha: Field,
    support: Option<PixelBounds>,
}

impl Layer {
    /// Coverage weight of this plane per pixel.
    pub fn alpha(&self) -> &Field {
        &self.alpha
    }

    /// Bounds of the non-zero alpha region; `None` for an empty plane.
    pub fn support(&self) -> Option<PixelBounds> {
        self.support
    }

    /// Return `true` when no pixel is assigned to this plane.
    pub fn is_empty(&self) -> bool {
        self.support.is_none()
    }

    /// Materialize the premultiplied color field (`image × alpha`).
    pub fn premultiplied(&self, image: &ImageRgb) -> PanResult<ImageRgb> {
        self.alpha.expect_extent(image.extent(), "layer alpha")?;
        let data = image
            .data()
            .chunks_exact(3)
            .zip(self.alpha.data())
            .flat_map(|(px, &a)| [px[0] * a, px[1] * a, px[2] * a])
            .collect();
        ImageRgb::new(image.extent(), data)
    }
}

/// Ordered stack of soft depth planes, index 0 farthest, `len() - 1` nearest.
///
/// Each pixel belongs to the two planes adjacent to its continuous position `inv01 × (L - 1)`,
/// with linear weights that sum to one, so the stack has no missing or doubled coverage and depth
/// boundaries do not stair-step. Premultiplied color is the shared image scaled by a layer's
/// alpha and is formed on the fly when layers are resampled.
#[derive(Clone, Debug)]
pub struct PlaneStack {
    image: ImageRgb,
    layers: Vec<Layer>,
}

impl PlaneStack {
    /// Decompose `image` into `plane_count` soft layers using the conditioned inverse depth.
    #[tracing::instrument(skip(inv01, image), fields(extent = %image.extent()))]
    pub fn decompose(inv01: &Field, image: &ImageRgb, plane_count: usize) -> PanResult<Self> {
        if plane_count < 2 {
            return Err(PanError::invalid_argument(format!(
                "plane_count must be >= 2, got {plane_count}"
            )));
        }
        image.extent().ensure_non_empty()?;
        inv01.expect_extent(image.extent(), "inverse-depth field")?;

        let extent = image.extent();
        let mut alphas = vec![vec![0.0f32; extent.area()]; plane_count];
        let mut supports: Vec<Option<PixelBounds>> = vec![None; plane_count];
        let top = (plane_count - 1) as f32;

        for y in 0..extent.height {
            for x in 0..extent.width {
                let idx = y as usize * extent.width as usize + x as usize;
                let pos = inv01.data()[idx].clamp(0.0, 1.0) * top;
                let lower = (pos.floor() as usize).min(plane_count - 2);
                let frac = pos - lower as f32;
                for (plane, weight) in [(lower, 1.0 - frac), (lower + 1, frac)] {
                    if weight <= 0.0 {
                        continue;
                    }
                    alphas[plane][idx] = weight;
                    match supports[plane].as_mut() {
                        Some(b) => b.include(x, y),
                        None => supports[plane] = Some(PixelBounds::point(x, y)),
                    }
                }
            }
        }

        let mut layers = Vec::with_capacity(plane_count);
        for (alpha, support) in alphas.into_iter().zip(supports) {
            layers.push(Layer {
                alpha: Field::new(extent, alpha)?,
                support,
            });
        }
        tracing::debug!(
            planes = plane_count,
            occupied = layers.iter().filter(|l| !l.is_empty()).count(),
            "plane stack built"
        );
        Ok(Self {
            image: image.clone(),
            layers,
        })
    }

    /// Number of planes.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always `false` for a decomposed stack; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers from far to near.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Source image shared by all layers.
    pub fn image(&self) -> &ImageRgb {
        &self.image
    }

    /// Dimensions of every layer.
    pub fn extent(&self) -> Extent {
        self.image.extent()
    }

    /// Relative nearness of plane `index` in `[0, 1]` (0 farthest, 1 nearest).
    pub fn center01(&self, index: usize) -> f32 {
        center01(index, self.layers.len())
    }
}

/// `index / (count - 1)`, the parallax weight of a plane.
pub fn center01(index: usize, count: usize) -> f32 {
    if count < 2 {
        return 0.0;
    }
    index as f32 / (count - 1) as f32
}

#[cfg(test)]
#[path = "../../tests/unit/mpi/planes.rs"]
mod tests;
