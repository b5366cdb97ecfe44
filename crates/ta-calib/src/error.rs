use ta_core::Side;
use ta_signal::StripError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("calibration profile needs at least one lane")]
    MissingLanes,
    #[error("{expected} lane slot holds a {found} lane")]
    LaneSideMismatch { expected: Side, found: Side },
    #[error("anchor {id} belongs to the {found} lane, not {expected}")]
    AnchorSideMismatch {
        id: String,
        expected: Side,
        found: Side,
    },
    #[error("anchor {id} references the missing {side} lane")]
    AnchorWithoutLane { id: String, side: Side },
    #[error("{0} lane signal present without a {0} lane")]
    SignalWithoutLane(Side),
    #[error("profile has no {0} lane")]
    LaneMissing(Side),
    #[error("profile name is required")]
    MissingName,
    #[error("no calibration profile has been generated")]
    NotGenerated,
    #[error(transparent)]
    Strip(#[from] StripError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
