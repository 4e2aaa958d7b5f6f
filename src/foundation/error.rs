use std::path::PathBuf;

/// Convenience result type used across chromacut.
pub type ChromacutResult<T> = Result<T, ChromacutError>;

/// Error taxonomy shared by every pipeline stage.
///
/// Only [`ChromacutError::MissingRoot`] is fatal for a run; every other variant is scoped to a
/// single asset and is turned into a log line or an audit outcome by the caller.
#[derive(thiserror::Error, Debug)]
pub enum ChromacutError {
    /// Unreadable, corrupt or malformed raster data.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Backing template or upstream artifact is absent.
    #[error("missing dependency: {0}")]
    MissingDependency(String),

    /// Sidecar exists but could not be parsed.
    #[error("config corrupt: {0}")]
    ConfigCorrupt(String),

    /// Raster dimensions disagree with the backing template.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A required root directory does not exist.
    #[error("missing root directory: {}", .0.display())]
    MissingRoot(PathBuf),

    /// Invalid option, key or value.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChromacutError {
    /// Build a [`ChromacutError::InvalidImage`] value.
    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImage(msg.into())
    }

    /// Build a [`ChromacutError::MissingDependency`] value.
    pub fn missing_dependency(msg: impl Into<String>) -> Self {
        Self::MissingDependency(msg.into())
    }

    /// Build a [`ChromacutError::ConfigCorrupt`] value.
    pub fn config_corrupt(msg: impl Into<String>) -> Self {
        Self::ConfigCorrupt(msg.into())
    }

    /// Build a [`ChromacutError::DimensionMismatch`] value.
    pub fn dimension_mismatch(msg: impl Into<String>) -> Self {
        Self::DimensionMismatch(msg.into())
    }

    /// Build a [`ChromacutError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// `true` for the conditions that must stop the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingRoot(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
