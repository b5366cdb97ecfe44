//! Vertical drift measurement for one film edge.
//!
//! A [`VerticalStrip`] owns a full-height, fixed-width lane of the frame.
//! Every frame is reduced to a 1D density trace: the lane band is converted to
//! intensity, smoothed with a 5x5 separable kernel and collapsed to one mean
//! per row. Perforations produce sharp light/dark transitions along that
//! trace, so its position tracks the film vertically.
//!
//! Drift is the lag of the normalized cross-correlation peak between the live
//! trace and the reference trace captured at calibration time:
//! - a positive offset means the film moved toward increasing `y` (down);
//! - the peak value is the confidence, approximately in `[-1, 1]`;
//! - a numerically flat trace on either side yields `(0.0, 0.0)`.

pub mod conv1d;
mod error;
pub mod extract;
pub mod kernels1d;
pub mod strip;
pub mod xcorr;

pub use error::StripError;
pub use extract::{SignalConfig, SignalExtractor};
pub use kernels1d::{SmoothingKernel, SmoothingKernel1D};
pub use strip::{TrackerConfig, VerticalOffset, VerticalStrip};
pub use xcorr::{CenteredSignal, CorrelationPeak, correlate_full, normalized_peak};
