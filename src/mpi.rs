//! Multi-plane image (MPI) representation: a depth-ordered stack of soft alpha layers.

/// Plane Decomposer.
pub mod planes;
