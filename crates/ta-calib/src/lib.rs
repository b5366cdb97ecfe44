//! Calibration of perforation lanes from operator-drawn regions.
//!
//! [`CalibrationManager`] collects raw regions for one draft, splits them by
//! film edge around the frame's vertical midline, snaps each edge onto a
//! single shared lane and captures one [`ta_signal::VerticalStrip`] per edge.
//! The result is a [`CalibrationProfile`], the record persisted between a
//! calibration session and scan time. [`CalibrationSession`] owns the
//! captured frame and the draft state across the steps of an interactive
//! wizard.

mod config;
mod error;
mod manager;
mod profile;
mod session;

pub use config::CalibrationConfig;
pub use error::ProfileError;
pub use manager::{CalibrationManager, align_side};
pub use profile::{CalibrationProfile, LaneCalibration, ProfileSummary};
pub use session::CalibrationSession;
