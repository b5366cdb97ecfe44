use serde::{Deserialize, Serialize};
use ta_core::MIN_RAW_ROI_SIZE;
use ta_signal::TrackerConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Drawn regions must be strictly larger than this on both axes.
    pub min_roi_size: i32,
    pub tracker: TrackerConfig,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            min_roi_size: MIN_RAW_ROI_SIZE,
            tracker: TrackerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use ta_signal::{SignalConfig, SmoothingKernel};

    use super::CalibrationConfig;

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: CalibrationConfig =
            serde_json::from_str(r#"{"tracker": {"max_lag": 40}}"#).expect("valid config");
        assert_eq!(cfg.min_roi_size, 5);
        assert_eq!(cfg.tracker.max_lag, Some(40));
        assert_eq!(cfg.tracker.signal, SignalConfig::default());

        let gaussian: CalibrationConfig = serde_json::from_str(
            r#"{"min_roi_size": 8, "tracker": {"signal": {"kernel": {"kind": "gaussian", "sigma": 1.4}}}}"#,
        )
        .expect("valid config");
        assert_eq!(gaussian.min_roi_size, 8);
        assert_eq!(
            gaussian.tracker.signal.kernel,
            SmoothingKernel::Gaussian { sigma: 1.4 }
        );
    }
}
