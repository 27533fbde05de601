/// Depth Conditioner: raw metric depth to an edge-respecting `[0, 1]` inverse-depth field.
pub mod conditioner;
/// Depth estimator boundary and built-in estimators.
pub mod estimator;
