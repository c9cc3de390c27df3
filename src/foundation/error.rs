use crate::foundation::core::FrameNumber;

/// Convenience result type used across vatex.
pub type VatResult<T> = Result<T, VatError>;

/// Where in the `(frame, vertex)` grid an encoding failure happened.
///
/// The bare encoder knows neither; the frame sampler fills both in before surfacing the error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TexelSite {
    /// Frame being sampled, if known.
    pub frame: Option<FrameNumber>,
    /// Vertex index, if known.
    pub vertex: Option<usize>,
}

impl TexelSite {
    /// Site for a known `(frame, vertex)` pair.
    pub fn new(frame: FrameNumber, vertex: usize) -> Self {
        Self {
            frame: Some(frame),
            vertex: Some(vertex),
        }
    }
}

impl std::fmt::Display for TexelSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.frame, self.vertex) {
            (Some(frame), Some(vertex)) => write!(f, " at frame {}, vertex {vertex}", frame.0),
            (Some(frame), None) => write!(f, " at frame {}", frame.0),
            (None, Some(vertex)) => write!(f, " at vertex {vertex}"),
            (None, None) => Ok(()),
        }
    }
}

/// Top-level error taxonomy used by vatex APIs.
#[derive(thiserror::Error, Debug)]
pub enum VatError {
    /// Invalid user-provided input data or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// A displacement needs an exponent level above the 2-bit budget.
    #[error("range exceeded{site}: displacement {delta:?} needs exponent level {level} (max 3)")]
    RangeExceeded {
        /// Location of the failing texel.
        site: TexelSite,
        /// `rest - posed` displacement.
        delta: [f64; 3],
        /// Computed exponent level.
        level: i64,
    },

    /// A biased integer part does not fit its 2-bit field (strict encoding only).
    #[error(
        "integer part overflow{site}: displacement {delta:?} scales to integer part {value} on axis {axis}"
    )]
    IntegerPartOverflow {
        /// Location of the failing texel.
        site: TexelSite,
        /// `rest - posed` displacement.
        delta: [f64; 3],
        /// Axis index (0 = x, 1 = y, 2 = z).
        axis: usize,
        /// Unbiased integer part after scaling.
        value: i64,
    },

    /// A pose evaluator could not produce a frame.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VatError {
    /// Build a [`VatError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`VatError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`VatError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Attach a `(frame, vertex)` site to encoding errors; other variants pass through.
    pub fn at(self, site: TexelSite) -> Self {
        match self {
            Self::RangeExceeded { delta, level, .. } => Self::RangeExceeded { site, delta, level },
            Self::IntegerPartOverflow {
                delta, axis, value, ..
            } => Self::IntegerPartOverflow {
                site,
                delta,
                axis,
                value,
            },
            other => other,
        }
    }

    /// Return `true` for the encoder's quantization failures.
    pub fn is_encoding_failure(&self) -> bool {
        matches!(
            self,
            Self::RangeExceeded { .. } | Self::IntegerPartOverflow { .. }
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
