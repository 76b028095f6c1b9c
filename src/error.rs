use thiserror::Error;

use crate::data::DimensionType;

/// Unified error type for `bidrange` operations.
///
/// Errors are only raised while building or parsing inputs. Once a
/// [`BidInputs`](crate::data::BidInputs) snapshot exists, every engine
/// operation is infallible and reports "not yet computable" as `None`.
#[derive(Debug, Error, PartialEq)]
pub enum BidRangeError {
    /// Raised when two summaries describe the same dimension type.
    #[error("dimension `{dimension}` has more than one summary")]
    DuplicateSummary { dimension: DimensionType },

    /// Raised when a summary's minimum factor exceeds its maximum.
    #[error("summary for `{dimension}` has min {min} greater than max {max}")]
    InvertedLimits {
        /// Dimension whose limits are inverted.
        dimension: DimensionType,
        /// Reported minimum factor.
        min: f64,
        /// Reported maximum factor.
        max: f64,
    },

    /// Raised when a factor is NaN or infinite.
    #[error("non-finite factor {value} in {context}")]
    NonFiniteFactor {
        /// Human-readable context describing where the factor came from.
        context: &'static str,
        /// The offending value.
        value: f64,
    },

    /// Raised when a factor is negative; factor products only stay ordered for `>= 0`.
    #[error("negative factor {value} in {context}")]
    NegativeFactor {
        /// Human-readable context describing where the factor came from.
        context: &'static str,
        /// The offending value.
        value: f64,
    },

    /// Raised when a wire string does not name a known enum variant.
    #[error("unknown {kind} `{value}`")]
    UnknownVariant { kind: &'static str, value: String },
}

impl BidRangeError {
    /// Helper to format an [`UnknownVariant`](BidRangeError::UnknownVariant) error.
    pub fn unknown(kind: &'static str, value: &str) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.to_string(),
        }
    }

    /// Helper for reporting factors below zero.
    pub fn negative(context: &'static str, value: f64) -> Self {
        Self::NegativeFactor { context, value }
    }

    /// Helper for reporting NaN or infinite factors.
    pub fn non_finite(context: &'static str, value: f64) -> Self {
        Self::NonFiniteFactor { context, value }
    }
}

/// Type alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, BidRangeError>;
