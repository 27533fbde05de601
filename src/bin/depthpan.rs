use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "depthpan", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` wins when set.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a clip as an MP4 (requires `ffmpeg` on PATH) or a PNG sequence.
    Render(RenderArgs),
    /// Render a single frame of the clip as a PNG.
    Frame(FrameArgs),
    /// Print the camera trajectory as JSON.
    Trajectory(TrajectoryArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Input image (PNG, JPEG, ...).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Grayscale disparity map (0 = far, 1 = near). Without it the scene is flat.
    #[arg(long)]
    depth_map: Option<PathBuf>,

    /// 35mm-equivalent focal length of the source photo.
    #[arg(long)]
    focal_35mm: Option<f32>,

    /// Engine options JSON (plane count, conditioner, compositor, fill).
    #[arg(long)]
    engine: Option<PathBuf>,

    #[command(flatten)]
    motion: MotionArgs,
}

#[derive(Args, Debug)]
struct MotionArgs {
    /// Motion parameters JSON. Individual flags override its fields.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Clip duration in seconds.
    #[arg(long)]
    duration: Option<f64>,

    /// Frames per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Camera pattern: swipe, shake, rotate or rotate_forward.
    #[arg(long)]
    pattern: Option<String>,

    /// Maximum lateral shift as a fraction of image width.
    #[arg(long)]
    motion_amount: Option<f64>,

    /// Vertical wobble (swipe only) as a fraction of the maximum shift.
    #[arg(long)]
    wobble_amount: Option<f64>,

    /// Zoom strength for rotate_forward.
    #[arg(long)]
    zoom_amount: Option<f64>,

    /// Number of pattern cycles in the clip.
    #[arg(long)]
    repeat: Option<u32>,

    /// Longest working side in pixels.
    #[arg(long)]
    max_side: Option<u32>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output MP4 path, or output directory for `--sink png`.
    #[arg(long)]
    out: PathBuf,

    /// Output kind.
    #[arg(long, value_enum, default_value_t = SinkChoice::Mp4)]
    sink: SinkChoice,

    /// x264 constant rate factor for MP4 output.
    #[arg(long, default_value_t = 18)]
    crf: u8,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct TrajectoryArgs {
    #[command(flatten)]
    motion: MotionArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SinkChoice {
    Mp4,
    Png,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Trajectory(args) => cmd_trajectory(args),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "depthpan=info",
        1 => "depthpan=debug",
        _ => "depthpan=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_motion(args: &MotionArgs) -> anyhow::Result<depthpan::MotionParams> {
    let mut params = match &args.params {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("read motion params '{}'", path.display()))?;
            depthpan::MotionParams::from_json_str(&json)?
        }
        None => depthpan::MotionParams::default(),
    };
    if let Some(v) = args.duration {
        params.duration_s = v;
    }
    if let Some(v) = args.fps {
        params.fps = v;
    }
    if let Some(v) = &args.pattern {
        params.pattern = v.clone();
    }
    if let Some(v) = args.motion_amount {
        params.motion_amount = v;
    }
    if let Some(v) = args.wobble_amount {
        params.wobble_amount = v;
    }
    if let Some(v) = args.zoom_amount {
        params.zoom_amount = v;
    }
    if let Some(v) = args.repeat {
        params.repeat_count = v;
    }
    if let Some(v) = args.max_side {
        params.max_side = v;
    }
    Ok(params)
}

fn read_engine(path: Option<&Path>) -> anyhow::Result<depthpan::EngineOpts> {
    let Some(path) = path else {
        return Ok(depthpan::EngineOpts::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read engine options '{}'", path.display()))?;
    Ok(depthpan::EngineOpts::from_json_str(&json)?)
}

struct Prepared {
    session: depthpan::RenderSession<Box<dyn depthpan::DepthEstimator + Send>>,
    image: depthpan::ImageRgb,
    depth: depthpan::DepthParams,
    motion: depthpan::MotionParams,
}

fn prepare(args: &SourceArgs) -> anyhow::Result<Prepared> {
    let motion = read_motion(&args.motion)?;
    // Fail on bad motion before decoding anything.
    motion.validate()?;
    let opts = read_engine(args.engine.as_deref())?;
    let estimator: Box<dyn depthpan::DepthEstimator + Send> = match &args.depth_map {
        Some(path) => Box::new(depthpan::DisparityMap::from_path(path)?),
        None => {
            tracing::warn!("no depth map given, rendering a flat scene");
            Box::new(depthpan::UniformDepth::default())
        }
    };
    let image = depthpan::load_image(&args.in_path)?;
    Ok(Prepared {
        session: depthpan::RenderSession::new(estimator, opts)?,
        image,
        depth: depthpan::DepthParams {
            focal_px: None,
            focal_35mm: args.focal_35mm,
        },
        motion,
    })
}

fn progress_logger() -> impl FnMut(&depthpan::ProgressEvent<'_>) -> anyhow::Result<()> {
    let mut job = depthpan::JobProgress::new();
    move |e: &depthpan::ProgressEvent<'_>| -> anyhow::Result<()> {
        let before = job.stage(e.stage).status;
        job.update(e.stage, e.fraction, e.detail);
        let after = job.stage(e.stage).status;
        if before != after && after == depthpan::StageStatus::Done {
            tracing::info!(
                stage = %e.stage,
                overall_pct = (job.overall() * 100.0).round(),
                "stage done"
            );
        }
        Ok(())
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let Prepared {
        mut session,
        image,
        depth,
        motion,
    } = prepare(&args.source)?;
    let mut progress = progress_logger();

    let stats = match args.sink {
        SinkChoice::Mp4 => {
            let mut opts = depthpan::FfmpegSinkOpts::new(&args.out);
            opts.crf = args.crf;
            let mut sink = depthpan::FfmpegSink::new(opts);
            session.render_into(image, &depth, &motion, &mut progress, &mut sink)?
        }
        SinkChoice::Png => {
            let mut sink = depthpan::PngSequenceSink::new(&args.out);
            session.render_into(image, &depth, &motion, &mut progress, &mut sink)?
        }
    };

    eprintln!(
        "wrote {} ({} frames, {}x{})",
        args.out.display(),
        stats.frames_rendered,
        stats.width,
        stats.height
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let Prepared {
        mut session,
        image,
        depth,
        motion,
    } = prepare(&args.source)?;
    let mut progress = progress_logger();
    let frame = session.render_frame(
        image,
        &depth,
        &motion,
        depthpan::FrameIndex(args.frame),
        &mut progress,
    )?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    depthpan::encode::png::write_png(&args.out, &frame)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_trajectory(args: TrajectoryArgs) -> anyhow::Result<()> {
    let plan = read_motion(&args.motion)?.validate()?;
    let trajectory = plan.trajectory()?;
    let out = serde_json::json!({
        "pattern": plan.pattern,
        "fps": plan.fps,
        "frame_count": plan.frame_count,
        "repeat_count": plan.repeat_count,
        "trajectory": trajectory,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
