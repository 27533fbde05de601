/// Engine configuration.
pub mod opts;
/// Progress reporting.
pub mod progress;
/// The render operation.
pub mod render_session;
