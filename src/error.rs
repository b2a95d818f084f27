//! Error types for profile synthesis and device link encoding.

use crate::fixed::ReprError;
use crate::grid::GridError;
use crate::pipeline::PipelineError;
use crate::profile::ColorSpace;
use thiserror::Error;

/// Result type for profile operations.
pub type Result<T> = std::result::Result<T, ProfileError>;

/// Broad classification of a [`ProfileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A grid or pipeline could not be allocated.
    AllocationFailure,
    /// An argument was outside its legal domain.
    DomainError,
    /// No legal on-disk stage layout could be found.
    EncodingImpossible,
    /// A construction step failed after earlier steps had succeeded.
    PartialConstructionAbort,
}

/// Errors from building profiles and device links.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ProfileError {
    /// Grid sampling failed.
    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    /// A stage could not be inserted.
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// A value did not fit the fixed-point encoding.
    #[error("value out of range: {0}")]
    Repr(#[from] ReprError<f64>),

    /// The color space is not supported by this operation.
    #[error("unsupported color space {found}, expected {expected}")]
    UnsupportedColorSpace {
        found: ColorSpace,
        expected: &'static str,
    },

    /// Wrong number of tone curves for the color space.
    #[error("expected {expected} curves, got {found}")]
    CurveCount { expected: usize, found: usize },

    /// Transform channel counts disagree with its color spaces.
    #[error("{space} has {expected} channels but the pipeline has {found}")]
    ChannelMismatch {
        space: ColorSpace,
        expected: usize,
        found: usize,
    },

    /// The primaries or white point produce a singular matrix.
    #[error("primaries and white point do not form an invertible matrix")]
    SingularMatrix,

    /// Nothing in the encoding catalog can express the pipeline.
    #[error("cannot encode {stages} stage pipeline as a v{version_major} device link")]
    EncodingImpossible { version_major: u32, stages: usize },
}

impl ProfileError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProfileError::Grid(err) => match err {
                GridError::Allocation { .. } => ErrorKind::AllocationFailure,
                GridError::InvalidDimensions(_) => ErrorKind::DomainError,
                GridError::Aborted { .. } => ErrorKind::PartialConstructionAbort,
            },
            ProfileError::Pipeline(_) | ProfileError::Repr(_) => {
                ErrorKind::PartialConstructionAbort
            }
            ProfileError::UnsupportedColorSpace { .. }
            | ProfileError::CurveCount { .. }
            | ProfileError::ChannelMismatch { .. }
            | ProfileError::SingularMatrix => ErrorKind::DomainError,
            ProfileError::EncodingImpossible { .. } => ErrorKind::EncodingImpossible,
        }
    }
}

#[test]
fn error_kinds() {
    let err: ProfileError = GridError::Aborted { index: 3 }.into();
    assert_eq!(err.kind(), ErrorKind::PartialConstructionAbort);

    let err: ProfileError = GridError::Allocation {
        points: usize::MAX,
        channels: 3,
    }
    .into();
    assert_eq!(err.kind(), ErrorKind::AllocationFailure);

    let err = ProfileError::UnsupportedColorSpace {
        found: ColorSpace::RGB,
        expected: "CMYK",
    };
    assert_eq!(err.kind(), ErrorKind::DomainError);
    assert!(err.to_string().contains("CMYK"));
}
