use crate::assets::decode::prepare_working_image;
use crate::depth::conditioner::condition_depth;
use crate::depth::estimator::{DepthEstimator, DepthParams};
use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{PanError, PanResult};
use crate::foundation::field::ImageRgb;
use crate::motion::params::{MotionParams, MotionPlan};
use crate::motion::trajectory::Trajectory;
use crate::mpi::planes::PlaneStack;
use crate::render::backend::FrameRgb8;
use crate::render::compositor::FrameCompositor;
use crate::render::holes::fill_holes;
use crate::session::opts::EngineOpts;
use crate::session::progress::{ProgressObserver, Stage, notify};

/// Clip render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames in the clip.
    pub frames_total: u64,
    /// Frames delivered to the sink.
    pub frames_rendered: u64,
    /// Frames where no plane covered any pixel.
    pub transparent_frames: u64,
    /// Hole pixels left unfilled, summed over all frames.
    pub unresolved_holes: u64,
    /// Working resolution width.
    pub width: u32,
    /// Working resolution height.
    pub height: u32,
}

/// Everything derived once per render and shared by all frames.
struct Scene {
    plan: MotionPlan,
    stack: PlaneStack,
    trajectory: Trajectory,
}

/// Session-oriented depth-parallax renderer.
///
/// The session owns the depth estimator, so an expensive model is loaded once by the caller and
/// reused across renders. Each render validates its inputs before doing any work, calls the
/// estimator exactly once, then derives the plane stack and trajectory once and reuses them for
/// every frame.
pub struct RenderSession<E> {
    estimator: E,
    opts: EngineOpts,
}

impl<E: DepthEstimator> RenderSession<E> {
    /// Construct a session; fails with `InvalidArgument` on unusable options.
    pub fn new(estimator: E, opts: EngineOpts) -> PanResult<Self> {
        opts.validate()?;
        Ok(Self { estimator, opts })
    }

    /// Engine options in use.
    pub fn opts(&self) -> &EngineOpts {
        &self.opts
    }

    /// Borrow the estimator.
    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Render the whole clip and return its frames in order.
    pub fn render(
        &mut self,
        image: ImageRgb,
        depth: &DepthParams,
        motion: &MotionParams,
        progress: &mut dyn ProgressObserver,
    ) -> PanResult<Vec<FrameRgb8>> {
        let mut sink = InMemorySink::new();
        self.render_into(image, depth, motion, progress, &mut sink)?;
        Ok(sink.into_frames())
    }

    /// Render the whole clip and stream frames into `sink` in strictly increasing index order.
    #[tracing::instrument(skip_all, fields(estimator = self.estimator.name(), pattern = %motion.pattern))]
    pub fn render_into(
        &mut self,
        image: ImageRgb,
        depth: &DepthParams,
        motion: &MotionParams,
        progress: &mut dyn ProgressObserver,
        sink: &mut dyn FrameSink,
    ) -> PanResult<RenderStats> {
        let scene = self.prepare(image, depth, motion, progress)?;
        let extent = scene.stack.extent();
        let total = scene.trajectory.len();
        let compositor = FrameCompositor::new(
            &scene.stack,
            &scene.plan,
            &scene.trajectory,
            &self.opts.compositor,
        );
        tracing::info!(
            frames = total,
            extent = %extent,
            pad = compositor.padding(),
            "rendering frames"
        );

        let mut stats = RenderStats {
            frames_total: total as u64,
            width: extent.width,
            height: extent.height,
            ..RenderStats::default()
        };
        sink.begin(SinkConfig {
            width: extent.width,
            height: extent.height,
            fps: scene.plan.fps,
        })?;
        notify(progress, Stage::Render, 0.0, None);
        for (i, pose) in scene.trajectory.poses().enumerate() {
            let composite = compositor.composite(&pose)?;
            if composite.is_transparent() {
                stats.transparent_frames += 1;
                tracing::warn!(frame = i, "composited frame is fully transparent");
            }
            let (visible, report) = fill_holes(&composite, &self.opts.fill)?;
            stats.unresolved_holes += report.unresolved as u64;
            tracing::debug!(
                frame = i,
                holes = report.holes(),
                unresolved = report.unresolved,
                iterations = report.iterations,
                "frame composited"
            );

            sink.push_frame(FrameIndex(i as u64), &FrameRgb8::from_image(&visible))?;
            stats.frames_rendered += 1;
            let detail = format!("frame {}/{}", i + 1, total);
            notify(
                progress,
                Stage::Render,
                (i + 1) as f64 / total as f64,
                Some(&detail),
            );
        }
        if stats.unresolved_holes > 0 {
            tracing::warn!(
                unresolved = stats.unresolved_holes,
                "some holes could not be filled"
            );
        }

        notify(progress, Stage::Finalize, 0.0, Some("closing sink"));
        sink.end()?;
        notify(progress, Stage::Finalize, 1.0, None);
        tracing::info!(frames = stats.frames_rendered, "render finished");
        Ok(stats)
    }

    /// Render only frame `frame` of the clip, e.g. for a preview.
    #[tracing::instrument(skip_all, fields(frame = frame.0))]
    pub fn render_frame(
        &mut self,
        image: ImageRgb,
        depth: &DepthParams,
        motion: &MotionParams,
        frame: FrameIndex,
        progress: &mut dyn ProgressObserver,
    ) -> PanResult<FrameRgb8> {
        let plan = motion.validate()?;
        if frame.0 >= plan.frame_count as u64 {
            return Err(PanError::invalid_argument(format!(
                "frame {} is outside the clip of {} frames",
                frame.0, plan.frame_count
            )));
        }
        let scene = self.prepare(image, depth, motion, progress)?;
        let compositor = FrameCompositor::new(
            &scene.stack,
            &scene.plan,
            &scene.trajectory,
            &self.opts.compositor,
        );
        notify(progress, Stage::Render, 0.0, None);
        let composite = compositor.composite(&scene.trajectory.pose(frame.0 as usize))?;
        let (visible, _) = fill_holes(&composite, &self.opts.fill)?;
        notify(progress, Stage::Render, 1.0, None);
        Ok(FrameRgb8::from_image(&visible))
    }

    fn prepare(
        &mut self,
        image: ImageRgb,
        depth: &DepthParams,
        motion: &MotionParams,
        progress: &mut dyn ProgressObserver,
    ) -> PanResult<Scene> {
        let plan = motion.validate()?;

        notify(progress, Stage::Load, 0.0, Some("preparing image"));
        let image = prepare_working_image(image, plan.max_side)?;
        let extent = image.extent();
        notify(progress, Stage::Load, 1.0, None);
        tracing::info!(extent = %extent, frames = plan.frame_count, "image prepared");

        let factor = depth.disparity_factor(extent);
        notify(progress, Stage::Inference, 0.0, Some(self.estimator.name()));
        let depth_field = self.estimator.estimate(&image, factor)?;
        depth_field.expect_extent(extent, "estimated depth")?;
        notify(progress, Stage::Inference, 0.6, Some("conditioning depth"));
        let inv01 = condition_depth(&depth_field, &image, &self.opts.conditioner)?;
        notify(progress, Stage::Inference, 0.8, Some("building planes"));
        let stack = PlaneStack::decompose(&inv01, &image, self.opts.plane_count)?;
        notify(progress, Stage::Inference, 1.0, None);

        notify(progress, Stage::Trajectory, 0.0, None);
        let trajectory = plan.trajectory()?;
        notify(progress, Stage::Trajectory, 1.0, None);

        Ok(Scene {
            plan,
            stack,
            trajectory,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/render_session.rs"]
mod tests;
