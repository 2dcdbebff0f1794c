//! Error types for foveate-kit operations.

use thiserror::Error;

/// Errors raised by [`InterAreaResize`](crate::InterAreaResize).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterAreaError {
    /// Target dimensions contain a zero.
    #[error("Invalid target dimensions: {width}x{height}")]
    InvalidTargetDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// Source image has no pixels.
    #[error("Source image is empty: {width}x{height}")]
    EmptyImage {
        /// Source width
        width: u32,
        /// Source height
        height: u32,
    },
}

/// Errors raised by the foveation pipeline and its building blocks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FoveationError {
    /// A configuration constant or argument is out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No fixation point was supplied.
    #[error("At least one fixation point is required")]
    EmptyFixations,

    /// A fixation coordinate is NaN or infinite.
    #[error("Fixation ({x}, {y}) is not finite")]
    NonFiniteFixation {
        /// Horizontal coordinate
        x: f32,
        /// Vertical coordinate
        y: f32,
    },

    /// A fixation lies outside the image while strict bounds checking is on.
    #[error("Fixation ({x}, {y}) lies outside the {width}x{height} image")]
    FixationOutOfBounds {
        /// Horizontal coordinate
        x: f32,
        /// Vertical coordinate
        y: f32,
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },

    /// Two grids that must share a shape do not.
    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// Expected (width, height)
        expected: (u32, u32),
        /// Actual (width, height)
        actual: (u32, u32),
    },

    /// Pyramid and mask set disagree on the number of levels.
    #[error("Level count mismatch: expected {expected}, got {actual}")]
    LevelCountMismatch {
        /// Expected number of levels
        expected: usize,
        /// Actual number of levels
        actual: usize,
    },

    /// The image cannot be halved `levels - 1` times.
    #[error("Image {width}x{height} is too small for a {levels}-level pyramid")]
    ImageTooSmall {
        /// Image width
        width: u32,
        /// Image height
        height: u32,
        /// Requested pyramid depth
        levels: usize,
    },

    /// Resampling failed.
    #[error(transparent)]
    Resize(#[from] InterAreaError),
}
