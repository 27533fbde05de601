/// Common render-operation interface and frame type.
pub mod backend;
/// Frame Compositor.
pub mod compositor;
/// Hole Filler.
pub mod holes;
