/// Convenience result type used across qrcompose.
pub type ComposeResult<T> = Result<T, ComposeError>;

/// Top-level error taxonomy used by the compositing APIs.
///
/// Every failure is surfaced to the caller. No stage substitutes an empty or
/// partially drawn image for a failed one.
#[derive(thiserror::Error, Debug)]
pub enum ComposeError {
    /// Input bytes could not be decoded into an image.
    #[error("decode error: {0}")]
    Decode(String),

    /// A canvas or computed draw dimension is zero, negative or too large.
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    /// Placement parameters cannot produce a usable overlay transform.
    #[error("invalid placement: {0}")]
    InvalidPlacement(String),

    /// The output buffer could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// Malformed configuration that is not a geometric problem.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing requests.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ComposeError {
    /// Build a [`ComposeError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ComposeError::InvalidDimension`] value.
    pub fn invalid_dimension(msg: impl Into<String>) -> Self {
        Self::InvalidDimension(msg.into())
    }

    /// Build a [`ComposeError::InvalidPlacement`] value.
    pub fn invalid_placement(msg: impl Into<String>) -> Self {
        Self::InvalidPlacement(msg.into())
    }

    /// Build a [`ComposeError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ComposeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ComposeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
