/// MP4 output through the system `ffmpeg`.
pub mod ffmpeg;
/// Numbered PNG output.
pub mod png;
/// Frame sink boundary.
pub mod sink;
