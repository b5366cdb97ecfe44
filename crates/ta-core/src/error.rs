use thiserror::Error;

use crate::geom::Side;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("out of bounds")]
    OutOfBounds,
    #[error("invalid stride")]
    InvalidStride,
    #[error("{side} lane width must be positive, got {width}")]
    InvalidLaneWidth { side: Side, width: i32 },
    #[error("anchor {id} height must be positive, got {height}")]
    InvalidAnchorHeight { id: String, height: i32 },
    #[error("roi record has type {found:?}, expected {expected:?}")]
    RoiKindMismatch {
        expected: &'static str,
        found: String,
    },
}
