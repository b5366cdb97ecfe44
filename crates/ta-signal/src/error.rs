use ta_core::Side;
use thiserror::Error;

/// Construction failures of a [`crate::VerticalStrip`].
///
/// Apart from [`StripError::ReferenceUnavailable`], these indicate a caller
/// bug and are not meant to be recovered from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StripError {
    #[error("{side} strip requires at least one aligned roi")]
    EmptyRois { side: Side },
    #[error(
        "{side} strip roi {id} spans x={found_x} width={found_width}, expected x={x} width={width}"
    )]
    MisalignedRois {
        side: Side,
        id: String,
        x: i32,
        width: i32,
        found_x: i32,
        found_width: i32,
    },
    #[error("{side} strip reference signal could not be extracted from the frame")]
    ReferenceUnavailable { side: Side },
    #[error("{side} strip reference signal is empty")]
    EmptyReference { side: Side },
    #[error(transparent)]
    Geometry(#[from] ta_core::Error),
}
