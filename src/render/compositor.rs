use kurbo::{Affine, Point, Rect, Vec2};

use crate::foundation::core::Extent;
use crate::foundation::error::{PanError, PanResult};
use crate::foundation::field::{Field, ImageRgb};
use crate::motion::params::MotionPlan;
use crate::motion::trajectory::{CameraPose, Trajectory, wobble_envelope};
use crate::mpi::planes::{Layer, PlaneStack};

/// Extra canvas border beyond the largest expected displacement.
const PAD_MARGIN: u32 = 2;

/// Compositor tuning.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompositorOpts {
    /// Lower bound of the per-layer zoom scale.
    pub min_layer_scale: f64,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            min_layer_scale: 0.35,
        }
    }
}

impl CompositorOpts {
    /// Reject settings the compositor cannot honor.
    pub fn validate(&self) -> PanResult<()> {
        if !self.min_layer_scale.is_finite() || self.min_layer_scale <= 0.0 {
            return Err(PanError::invalid_argument(format!(
                "compositor.min_layer_scale must be > 0, got {}",
                self.min_layer_scale
            )));
        }
        Ok(())
    }
}

/// Premultiplied color and coverage of one frame, cropped to the image extent.
#[derive(Clone, Debug)]
pub struct Composite {
    /// Premultiplied RGB.
    pub color: ImageRgb,
    /// Accumulated coverage in `[0, 1]`.
    pub alpha: Field,
}

impl Composite {
    /// Return `true` when no layer contributed any coverage.
    pub fn is_transparent(&self) -> bool {
        self.alpha.data().iter().all(|&a| a <= 0.0)
    }
}

/// Padded accumulation buffer for one frame.
///
/// Pixel `(cx, cy)` of the canvas covers image pixel `(cx - pad, cy - pad)`.
#[derive(Clone, Debug)]
pub struct Canvas {
    inner: Extent,
    pad: u32,
    width: usize,
    height: usize,
    color: Vec<f32>,
    alpha: Vec<f32>,
}

impl Canvas {
    /// Transparent canvas around an `inner` image with `pad` pixels on every side.
    pub fn new(inner: Extent, pad: u32) -> Self {
        let width = inner.width as usize + 2 * pad as usize;
        let height = inner.height as usize + 2 * pad as usize;
        Self {
            inner,
            pad,
            width,
            height,
            color: vec![0.0; width * height * 3],
            alpha: vec![0.0; width * height],
        }
    }

    /// Canvas dimensions including padding.
    pub fn extent(&self) -> Extent {
        Extent {
            width: self.width as u32,
            height: self.height as u32,
        }
    }

    /// Border width in pixels.
    pub fn pad(&self) -> u32 {
        self.pad
    }

    /// Accumulated coverage at canvas pixel `(cx, cy)`.
    pub fn alpha_at(&self, cx: u32, cy: u32) -> f32 {
        self.alpha[cy as usize * self.width + cx as usize]
    }

    /// Accumulate one premultiplied sample at canvas pixel `(cx, cy)`.
    ///
    /// Whatever has already been accumulated occludes the new contribution:
    /// `color += (1 - a) × layer_color`, `a += (1 - a) × layer_alpha`.
    pub fn over(&mut self, cx: u32, cy: u32, layer_color: [f32; 3], layer_alpha: f32) {
        let idx = cy as usize * self.width + cx as usize;
        let a = self.alpha[idx];
        let remaining = 1.0 - a;
        if remaining <= 0.0 {
            return;
        }
        let c = &mut self.color[idx * 3..idx * 3 + 3];
        for (dst, src) in c.iter_mut().zip(layer_color) {
            *dst += remaining * src;
        }
        self.alpha[idx] = (a + remaining * layer_alpha.clamp(0.0, 1.0)).min(1.0);
    }

    /// Drop the border and return the image-sized result.
    pub fn crop(self) -> PanResult<Composite> {
        let (w, h) = (self.inner.width as usize, self.inner.height as usize);
        let pad = self.pad as usize;
        let mut color = Vec::with_capacity(w * h * 3);
        let mut alpha = Vec::with_capacity(w * h);
        for y in pad..pad + h {
            let row = y * self.width + pad;
            color.extend_from_slice(&self.color[row * 3..(row + w) * 3]);
            alpha.extend_from_slice(&self.alpha[row..row + w]);
        }
        Ok(Composite {
            color: ImageRgb::new(self.inner, color)?,
            alpha: Field::new(self.inner, alpha)?,
        })
    }
}

/// Warps every plane of a [`PlaneStack`] for a camera pose and composites far to near.
///
/// Plane `i` moves by `center01(i) × max_shift` times the pose's lateral offset and is scaled about
/// the image center by `max(min_layer_scale, 1 - zoom × center01(i))`, so near planes shift and
/// zoom more than far ones.
#[derive(Debug)]
pub struct FrameCompositor<'a> {
    stack: &'a PlaneStack,
    max_shift_px: f64,
    wobble_amount: f64,
    zoom_amount: f64,
    min_layer_scale: f64,
    pad: u32,
}

impl<'a> FrameCompositor<'a> {
    /// Prepare a compositor for every pose of `trajectory`.
    pub fn new(
        stack: &'a PlaneStack,
        plan: &MotionPlan,
        trajectory: &Trajectory,
        opts: &CompositorOpts,
    ) -> Self {
        let max_shift_px = plan.max_shift_px(stack.extent().width);
        let wobble_amount = plan.effective_wobble();
        let reach = max_shift_px * (trajectory.max_lateral_extent() + wobble_amount);
        let pad = (reach.ceil().max(0.0) as u32).saturating_add(PAD_MARGIN);
        Self {
            stack,
            max_shift_px,
            wobble_amount,
            zoom_amount: plan.effective_zoom(),
            min_layer_scale: opts.min_layer_scale,
            pad,
        }
    }

    /// Canvas border in pixels.
    pub fn padding(&self) -> u32 {
        self.pad
    }

    /// Maximum lateral shift of the nearest plane, in pixels.
    pub fn max_shift_px(&self) -> f64 {
        self.max_shift_px
    }

    /// Pixel offset of plane `index` for `pose`, wobble included.
    pub fn layer_offset(&self, index: usize, pose: &CameraPose) -> Vec2 {
        let wobble = self.wobble_amount * wobble_envelope(pose.progress);
        let lateral = Vec2::new(pose.lateral.x, pose.lateral.y + wobble);
        lateral * (self.max_shift_px * f64::from(self.stack.center01(index)))
    }

    /// Zoom scale of plane `index` for `pose`.
    pub fn layer_scale(&self, index: usize, pose: &CameraPose) -> f64 {
        let zoom = pose.zoom * self.zoom_amount;
        (1.0 - zoom * f64::from(self.stack.center01(index))).max(self.min_layer_scale)
    }

    /// Map from plane pixel coordinates to image pixel coordinates.
    pub fn layer_transform(&self, index: usize, pose: &CameraPose) -> Affine {
        let extent = self.stack.extent();
        let center = Vec2::new(
            f64::from(extent.width - 1) / 2.0,
            f64::from(extent.height - 1) / 2.0,
        );
        let offset = self.layer_offset(index, pose);
        Affine::translate(center + offset)
            * Affine::scale(self.layer_scale(index, pose))
            * Affine::translate(-center)
    }

    /// Composite all planes for `pose` and crop back to the image extent.
    pub fn composite(&self, pose: &CameraPose) -> PanResult<Composite> {
        let mut canvas = Canvas::new(self.stack.extent(), self.pad);
        for (index, layer) in self.stack.layers().iter().enumerate() {
            if layer.is_empty() {
                continue;
            }
            self.draw_layer(&mut canvas, layer, self.layer_transform(index, pose));
        }
        canvas.crop()
    }

    fn draw_layer(&self, canvas: &mut Canvas, layer: &Layer, to_image: Affine) {
        let Some(support) = layer.support() else {
            return;
        };
        let pad = f64::from(self.pad);
        let to_canvas = Affine::translate((pad, pad)) * to_image;
        let from_canvas = to_canvas.inverse();

        // Bilinear footprint reaches one pixel past the support.
        let src = Rect::new(
            f64::from(support.x0) - 1.0,
            f64::from(support.y0) - 1.0,
            f64::from(support.x1),
            f64::from(support.y1),
        );
        let bbox = to_canvas.transform_rect_bbox(src);
        let canvas_extent = canvas.extent();
        let x0 = bbox.x0.floor().max(0.0) as u32;
        let y0 = bbox.y0.floor().max(0.0) as u32;
        let x1 = (bbox.x1.ceil().max(0.0) as u32).min(canvas_extent.width.saturating_sub(1));
        let y1 = (bbox.y1.ceil().max(0.0) as u32).min(canvas_extent.height.saturating_sub(1));
        if x0 > x1 || y0 > y1 {
            return;
        }

        let image = self.stack.image();
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                let p = from_canvas * Point::new(f64::from(cx), f64::from(cy));
                if let Some((color, alpha)) = sample_premultiplied(layer.alpha(), image, p)
                    && alpha > 0.0
                {
                    canvas.over(cx, cy, color, alpha);
                }
            }
        }
    }
}

/// Bilinear sample of `image × alpha` and `alpha` at `p`; taps outside the plane count as zero.
///
/// Returns `None` when `p` is more than one pixel outside the plane.
pub(crate) fn sample_premultiplied(
    alpha: &Field,
    image: &ImageRgb,
    p: Point,
) -> Option<([f32; 3], f32)> {
    let (w, h) = (i64::from(alpha.width()), i64::from(alpha.height()));
    if !p.x.is_finite() || !p.y.is_finite() {
        return None;
    }
    let x0f = p.x.floor();
    let y0f = p.y.floor();
    if x0f < -1.0 || y0f < -1.0 || x0f >= w as f64 || y0f >= h as f64 {
        return None;
    }
    let (x0, y0) = (x0f as i64, y0f as i64);
    let fx = (p.x - x0f) as f32;
    let fy = (p.y - y0f) as f32;

    let mut color = [0.0f32; 3];
    let mut a = 0.0f32;
    let taps = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1, y0, fx * (1.0 - fy)),
        (x0, y0 + 1, (1.0 - fx) * fy),
        (x0 + 1, y0 + 1, fx * fy),
    ];
    for (x, y, weight) in taps {
        if weight <= 0.0 || x < 0 || y < 0 || x >= w || y >= h {
            continue;
        }
        let tap_alpha = alpha.get(x as u32, y as u32);
        if tap_alpha <= 0.0 {
            continue;
        }
        let rgb = image.pixel(x as u32, y as u32);
        let k = weight * tap_alpha;
        a += k;
        for (c, v) in color.iter_mut().zip(rgb) {
            *c += k * v;
        }
    }
    Some((color, a))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
