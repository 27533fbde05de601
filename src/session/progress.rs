use std::panic::{AssertUnwindSafe, catch_unwind};

/// Coarse pipeline checkpoints reported to progress observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Decoding, resizing and even-cropping the input image.
    Load,
    /// Depth estimation, conditioning and plane decomposition.
    Inference,
    /// Camera trajectory generation.
    Trajectory,
    /// Per-frame compositing and hole filling.
    Render,
    /// Closing the frame sink.
    Finalize,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 5] = [
        Stage::Load,
        Stage::Inference,
        Stage::Trajectory,
        Stage::Render,
        Stage::Finalize,
    ];

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Inference => "inference",
            Stage::Trajectory => "trajectory",
            Stage::Render => "render",
            Stage::Finalize => "finalize",
        }
    }

    /// Share of overall job progress attributed to this stage (before normalization).
    pub fn weight(self) -> f64 {
        match self {
            Stage::Load => 0.05,
            Stage::Inference => 0.25,
            Stage::Trajectory => 0.05,
            Stage::Render => 0.50,
            Stage::Finalize => 0.05,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One progress checkpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressEvent<'a> {
    /// Stage the checkpoint belongs to.
    pub stage: Stage,
    /// Fraction of the stage completed, in `[0, 1]`.
    pub fraction: f64,
    /// Optional human-readable detail.
    pub detail: Option<&'a str>,
}

/// Receives progress checkpoints synchronously, in pipeline order.
///
/// Reporting is best effort: an error or panic from an observer is logged and ignored, and never
/// changes the render.
pub trait ProgressObserver {
    /// Handle one checkpoint.
    fn on_progress(&mut self, event: &ProgressEvent<'_>) -> anyhow::Result<()>;
}

impl<F> ProgressObserver for F
where
    F: FnMut(&ProgressEvent<'_>) -> anyhow::Result<()>,
{
    fn on_progress(&mut self, event: &ProgressEvent<'_>) -> anyhow::Result<()> {
        self(event)
    }
}

/// Observer that ignores every checkpoint.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _event: &ProgressEvent<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Deliver a checkpoint, swallowing observer failures.
pub(crate) fn notify(
    observer: &mut dyn ProgressObserver,
    stage: Stage,
    fraction: f64,
    detail: Option<&str>,
) {
    let event = ProgressEvent {
        stage,
        fraction: fraction.clamp(0.0, 1.0),
        detail,
    };
    match catch_unwind(AssertUnwindSafe(|| observer.on_progress(&event))) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            tracing::debug!(stage = %stage, error = %err, "progress observer failed; ignoring");
        }
        Err(_) => {
            tracing::debug!(stage = %stage, "progress observer panicked; ignoring");
        }
    }
}

/// Status of one stage in a [`JobProgress`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Not started.
    #[default]
    Pending,
    /// Reported at least once with a fraction below 1.
    Running,
    /// Reported complete.
    Done,
    /// Marked failed by the job supervisor.
    Error,
}

/// Progress of one stage.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct StageProgress {
    /// Current status.
    pub status: StageStatus,
    /// Fraction completed, in `[0, 1]`.
    pub fraction: f64,
}

/// Weighted overall progress of a render job, suitable for polling UIs.
///
/// Also a [`ProgressObserver`], so it can be handed straight to a render session.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct JobProgress {
    stages: [StageProgress; 5],
    detail: Option<String>,
}

impl JobProgress {
    /// Every stage pending at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress of `stage`.
    pub fn stage(&self, stage: Stage) -> &StageProgress {
        &self.stages[stage_index(stage)]
    }

    /// Most recent detail message.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Record a checkpoint: below 1 the stage is running, at 1 it is done.
    pub fn update(&mut self, stage: Stage, fraction: f64, detail: Option<&str>) {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let st = &mut self.stages[stage_index(stage)];
        st.fraction = fraction;
        st.status = if fraction < 1.0 {
            StageStatus::Running
        } else {
            StageStatus::Done
        };
        if let Some(detail) = detail {
            self.detail = Some(detail.to_string());
        }
    }

    /// Mark `stage` as failed without touching other stages.
    pub fn mark_error(&mut self, stage: Stage, detail: impl Into<String>) {
        let st = &mut self.stages[stage_index(stage)];
        st.fraction = 0.0;
        st.status = StageStatus::Error;
        self.detail = Some(detail.into());
    }

    /// Weighted progress over all stages, in `[0, 1]`.
    pub fn overall(&self) -> f64 {
        let total_weight: f64 = Stage::ALL.iter().map(|s| s.weight()).sum();
        let done: f64 = Stage::ALL
            .iter()
            .map(|&s| s.weight() * self.stage(s).fraction)
            .sum();
        (done / total_weight).clamp(0.0, 1.0)
    }

    /// Return `true` once every stage is done.
    pub fn is_done(&self) -> bool {
        self.stages.iter().all(|s| s.status == StageStatus::Done)
    }
}

impl ProgressObserver for JobProgress {
    fn on_progress(&mut self, event: &ProgressEvent<'_>) -> anyhow::Result<()> {
        self.update(event.stage, event.fraction, event.detail);
        Ok(())
    }
}

fn stage_index(stage: Stage) -> usize {
    match stage {
        Stage::Load => 0,
        Stage::Inference => 1,
        Stage::Trajectory => 2,
        Stage::Render => 3,
        Stage::Finalize => 4,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/progress.rs"]
mod tests;
