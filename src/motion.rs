/// Motion parameter boundary and validation.
pub mod params;
/// Camera-motion pattern selector.
pub mod pattern;
/// Trajectory Generator.
pub mod trajectory;
