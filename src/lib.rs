//! depthpan turns a single still image into a short camera-motion clip.
//!
//! The engine is a depth-parallax multi-plane synthesizer: an injected [`DepthEstimator`] predicts
//! depth once, the depth is conditioned and split into a stack of soft planes, and every frame of a
//! deterministic camera [`Trajectory`] warps and composites those planes before a hole filler
//! closes disocclusions.
//!
//! - Validate [`MotionParams`] (done for you by the session)
//! - Create a [`RenderSession`] around your estimator
//! - Collect frames with [`RenderSession::render`] or stream them into a [`FrameSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Image decoding and working-resolution preparation.
pub mod assets;
/// Depth estimation boundary and conditioning.
pub mod depth;
/// Frame sinks.
pub mod encode;
/// Camera motion: parameters, patterns and trajectories.
pub mod motion;
/// Multi-plane image decomposition.
pub mod mpi;
/// Compositing and hole filling.
pub mod render;
/// Session-oriented rendering API.
pub mod session;

pub use crate::foundation::core::{Extent, Fps, FrameIndex};
pub use crate::foundation::error::{PanError, PanResult};
pub use crate::foundation::field::{Field, ImageRgb, quantize_unit};

pub use crate::assets::decode::{decode_image, load_image, prepare_working_image};
pub use crate::depth::conditioner::{ConditionerOpts, condition_depth};
pub use crate::depth::estimator::{DepthEstimator, DepthParams, DisparityMap, UniformDepth};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::png::PngSequenceSink;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::motion::params::{MotionParams, MotionPlan};
pub use crate::motion::pattern::Pattern;
pub use crate::motion::trajectory::{CameraPose, Trajectory};
pub use crate::mpi::planes::PlaneStack;
pub use crate::render::backend::{BackendKind, FrameRgb8, RenderBackend, create_backend};
pub use crate::render::compositor::CompositorOpts;
pub use crate::render::holes::FillOpts;
pub use crate::session::opts::EngineOpts;
pub use crate::session::progress::{
    JobProgress, NoProgress, ProgressEvent, ProgressObserver, Stage, StageStatus,
};
pub use crate::session::render_session::{RenderSession, RenderStats};
