//! Error types shared by the symbol builder, the options layer and the renderer.

use thiserror::Error;

use crate::qrcode::Version;

/// Failure reported by an [`Encoder`](crate::qrcode::Encoder).
///
/// Only [`EncodeError::CapacityExceeded`] is recovered from, by retrying at the next
/// version. Everything else is handed back to the caller untouched.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The payload does not fit in the requested version at the requested level.
    #[error("data does not fit in a version {version} symbol")]
    CapacityExceeded { version: Version },

    /// Any other encoder failure.
    #[error(transparent)]
    Fault(Box<dyn std::error::Error + Send + Sync>),
}

impl EncodeError {
    /// Wraps an arbitrary encoder failure.
    pub fn fault<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Fault(Box::new(err))
    }

    /// Returns `true` for the capacity error that drives version escalation.
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. })
    }
}

/// Invalid [`RenderOptions`](crate::options::RenderOptions).
#[derive(Debug, Error)]
pub enum OptionsError {
    /// `rounding` is outside `[0, 100]` or NaN.
    #[error("rounding must be within [0, 100], got {0}")]
    RoundingOutOfRange(f64),

    /// `color` is empty or blank.
    #[error("color must not be empty")]
    EmptyColor,

    /// `mask_id` is not usable as an element id.
    #[error("mask id `{0}` is not a valid XML id")]
    InvalidMaskId(String),

    /// A pass-through attribute name is malformed or reserved.
    #[error("invalid presentation attribute `{0}`")]
    InvalidAttribute(String),

    /// An error correction level other than L, M, Q or H.
    #[error("unknown error correction level `{0}`, expected one of L, M, Q, H")]
    UnknownLevel(String),

    /// The options document is not valid JSON for [`RenderOptions`](crate::options::RenderOptions).
    #[error("failed to parse render options: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level error returned by [`render`](crate::helper::render).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Options(#[from] OptionsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn test_fault_is_transparent() {
        let err = EncodeError::fault(Boom);
        assert_eq!(err.to_string(), "boom");
        assert!(!err.is_capacity_exceeded());
    }

    #[test]
    fn test_capacity_message_names_version() {
        let err = EncodeError::CapacityExceeded { version: Version::new(7) };
        assert!(err.is_capacity_exceeded());
        assert_eq!(err.to_string(), "data does not fit in a version 7 symbol");
    }
}
