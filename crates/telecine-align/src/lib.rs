//! Umbrella crate for the `telecine-align` workspace.
//!
//! Calibrate once with [`CalibrationManager`] on a captured frame, persist the
//! resulting [`CalibrationProfile`], then rebuild a [`VerticalStrip`] per film
//! edge at scan time and feed it every frame.

pub use ta_calib::*;
pub use ta_core::*;
pub use ta_signal::*;
