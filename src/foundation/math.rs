use crate::foundation::core::Extent;
use crate::foundation::field::Field;

/// Rec.601 luma.
pub(crate) fn luminance(rgb: [f32; 3]) -> f32 {
    0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2]
}

/// `q`-quantile of `values` with linear interpolation between closest ranks.
///
/// Sorts `values` in place. NaNs sort last. Returns 0 for an empty slice.
pub(crate) fn quantile(values: &mut [f32], q: f64) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_unstable_by(f32::total_cmp);
    let q = q.clamp(0.0, 1.0);
    let pos = q * (values.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = (pos - lo as f64) as f32;
    values[lo] + (values[hi] - values[lo]) * frac
}

/// Bilinear resample with corner pixels aligned between source and destination grids.
pub(crate) fn resize_bilinear(src: &Field, dst: Extent) -> Field {
    let sw = src.width();
    let sh = src.height();
    let scale = |d: u32, s: u32| {
        if d > 1 {
            (s - 1) as f64 / (d - 1) as f64
        } else {
            0.0
        }
    };
    let sx = scale(dst.width, sw);
    let sy = scale(dst.height, sh);
    Field::from_fn(dst, |x, y| {
        sample_bilinear_clamped(src, x as f64 * sx, y as f64 * sy)
    })
}

/// Bilinear sample at continuous `(x, y)` with coordinates clamped into the field.
pub(crate) fn sample_bilinear_clamped(src: &Field, x: f64, y: f64) -> f32 {
    let max_x = (src.width() - 1) as f64;
    let max_y = (src.height() - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);
    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(src.width() - 1);
    let y1 = (y0 + 1).min(src.height() - 1);
    let fx = (x - x0 as f64) as f32;
    let fy = (y - y0 as f64) as f32;
    let top = src.get(x0, y0) * (1.0 - fx) + src.get(x1, y0) * fx;
    let bottom = src.get(x0, y1) * (1.0 - fx) + src.get(x1, y1) * fx;
    top * (1.0 - fy) + bottom * fy
}

/// Summed-area table over one or more planar channels for O(1) window sums.
pub(crate) struct BoxSums {
    width: usize,
    height: usize,
    table: Vec<f64>,
}

impl BoxSums {
    /// Build from a row-major `width×height` channel.
    pub(crate) fn new(extent: Extent, values: impl IntoIterator<Item = f32>) -> Self {
        let width = extent.width as usize;
        let height = extent.height as usize;
        let stride = width + 1;
        let mut table = vec![0.0f64; stride * (height + 1)];
        let mut it = values.into_iter();
        for y in 0..height {
            let mut row_sum = 0.0f64;
            for x in 0..width {
                row_sum += f64::from(it.next().unwrap_or(0.0));
                table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row_sum;
            }
        }
        Self {
            width,
            height,
            table,
        }
    }

    /// Sum over the `(2r+1)²` window centered at `(x, y)`, clipped to the field.
    pub(crate) fn window_sum(&self, x: usize, y: usize, radius: usize) -> f64 {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius + 1).min(self.width);
        let y1 = (y + radius + 1).min(self.height);
        let stride = self.width + 1;
        self.table[y1 * stride + x1] - self.table[y0 * stride + x1] - self.table[y1 * stride + x0]
            + self.table[y0 * stride + x0]
    }

    /// Number of in-bounds pixels in the window centered at `(x, y)`.
    pub(crate) fn window_count(&self, x: usize, y: usize, radius: usize) -> usize {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius + 1).min(self.width);
        let y1 = (y + radius + 1).min(self.height);
        (x1 - x0) * (y1 - y0)
    }
}

/// Mean over the `(2r+1)²` window around each pixel; border windows average in-bounds pixels only.
pub(crate) fn box_mean(src: &Field, radius: usize) -> Field {
    let sums = BoxSums::new(src.extent(), src.data().iter().copied());
    Field::from_fn(src.extent(), |x, y| {
        let (x, y) = (x as usize, y as usize);
        (sums.window_sum(x, y, radius) / sums.window_count(x, y, radius) as f64) as f32
    })
}

/// Gradient magnitude from the 3×3 Sobel pair, replicating border pixels.
pub(crate) fn sobel_magnitude(src: &Field) -> Field {
    let w = src.width() as i64;
    let h = src.height() as i64;
    let at = |x: i64, y: i64| src.get(x.clamp(0, w - 1) as u32, y.clamp(0, h - 1) as u32);
    Field::from_fn(src.extent(), |x, y| {
        let (x, y) = (x as i64, y as i64);
        let gx = (at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1))
            - (at(x - 1, y - 1) + 2.0 * at(x - 1, y) + at(x - 1, y + 1));
        let gy = (at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1))
            - (at(x - 1, y - 1) + 2.0 * at(x, y - 1) + at(x + 1, y - 1));
        (gx * gx + gy * gy).sqrt()
    })
}

/// Quantile of a field measured on a coarse `grid×grid` bilinear downsample.
pub(crate) fn coarse_quantiles<const N: usize>(src: &Field, grid: u32, qs: [f64; N]) -> [f32; N] {
    let grid = grid.max(1);
    let coarse = resize_bilinear(
        src,
        Extent {
            width: grid,
            height: grid,
        },
    );
    let mut values = coarse.into_data();
    qs.map(|q| quantile(&mut values, q))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
