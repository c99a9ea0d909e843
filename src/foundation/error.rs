/// Convenience result type used across the codec.
pub type FractalResult<T> = Result<T, FractalError>;

/// Top-level error taxonomy used by codec APIs.
///
/// Every variant signals a caller bug or unusable input; nothing is retried.
#[derive(thiserror::Error, Debug)]
pub enum FractalError {
    /// Invalid caller-provided data: image metadata, channel indices, block geometry, options.
    #[error("validation error: {0}")]
    Validation(String),

    /// Broken invariant or resource failure while encoding or decoding.
    #[error("codec error: {0}")]
    Codec(String),

    /// Errors when serializing or deserializing transform files.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FractalError {
    /// Build a [`FractalError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FractalError::Codec`] value.
    pub fn codec(msg: impl Into<String>) -> Self {
        Self::Codec(msg.into())
    }

    /// Build a [`FractalError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
