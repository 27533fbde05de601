/// Convenience result type used across depthpan.
pub type PanResult<T> = Result<T, PanError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Degenerate numeric inputs (flat depth, fully transparent frames) are not errors: the engine
/// clamps them and logs a warning instead.
#[derive(thiserror::Error, Debug)]
pub enum PanError {
    /// Malformed motion parameters, engine options or an unsupported pattern selector.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed image/depth shapes (channel count, mismatched dimensions).
    #[error("precondition violation: {0}")]
    Precondition(String),

    /// Failures reported by a depth estimator.
    #[error("depth estimation error: {0}")]
    Depth(String),

    /// Failures reported by a frame sink.
    #[error("frame sink error: {0}")]
    Sink(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PanError {
    /// Build a [`PanError::InvalidArgument`] value.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Build a [`PanError::Precondition`] value.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Build a [`PanError::Depth`] value.
    pub fn depth(msg: impl Into<String>) -> Self {
        Self::Depth(msg.into())
    }

    /// Build a [`PanError::Sink`] value.
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }

    /// Build a [`PanError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for [`PanError::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Return `true` for [`PanError::Precondition`].
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
