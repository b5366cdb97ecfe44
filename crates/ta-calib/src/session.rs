use ta_core::{Image, Luma};
use ta_signal::StripError;
use tracing::info;

use crate::{CalibrationConfig, CalibrationManager, CalibrationProfile, ProfileError};

/// Context of one interactive calibration: the frame the operator draws on,
/// the draft built over it and the resulting profile.
///
/// Replacing the captured frame invalidates everything derived from the old
/// one.
#[derive(Debug, Clone)]
pub struct CalibrationSession<P> {
    config: CalibrationConfig,
    captured: Option<Image<P>>,
    manager: Option<CalibrationManager>,
    profile: Option<CalibrationProfile>,
}

impl<P> Default for CalibrationSession<P> {
    fn default() -> Self {
        Self::new(CalibrationConfig::default())
    }
}

impl<P> CalibrationSession<P> {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            captured: None,
            manager: None,
            profile: None,
        }
    }

    pub fn set_captured_frame(&mut self, frame: Image<P>) {
        self.captured = Some(frame);
        self.manager = None;
        self.profile = None;
    }

    pub fn captured_frame(&self) -> Option<&Image<P>> {
        self.captured.as_ref()
    }

    /// The draft for the captured frame, created on first use.
    ///
    /// `None` until a frame has been captured.
    pub fn manager(&mut self) -> Option<&mut CalibrationManager> {
        self.captured.as_ref()?;
        let config = &self.config;
        Some(
            self.manager
                .get_or_insert_with(|| CalibrationManager::new(config.clone())),
        )
    }

    pub fn profile(&self) -> Option<&CalibrationProfile> {
        self.profile.as_ref()
    }

    /// For editing the name and description before finishing.
    pub fn profile_mut(&mut self) -> Option<&mut CalibrationProfile> {
        self.profile.as_mut()
    }

    /// Takes the named profile out of the session and resets it.
    pub fn finish(&mut self) -> Result<CalibrationProfile, ProfileError> {
        let profile = self.profile.as_ref().ok_or(ProfileError::NotGenerated)?;
        profile.ensure_named()?;
        let profile = self.profile.take().ok_or(ProfileError::NotGenerated)?;
        info!(id = profile.id(), name = profile.name(), "calibration finished");
        self.reset();
        Ok(profile)
    }

    pub fn reset(&mut self) {
        self.captured = None;
        self.manager = None;
        self.profile = None;
    }
}

impl<P: Luma> CalibrationSession<P> {
    /// Calibrates the draft against the captured frame.
    ///
    /// `Ok(None)` if no frame is captured or calibration is incomplete; a
    /// previous profile is discarded either way.
    pub fn generate_profile(&mut self) -> Result<Option<&CalibrationProfile>, StripError> {
        self.profile = None;
        let Some(frame) = self.captured.as_ref() else {
            return Ok(None);
        };
        let config = &self.config;
        let manager = self
            .manager
            .get_or_insert_with(|| CalibrationManager::new(config.clone()));
        self.profile = manager.generate_calibration_profile(&frame.as_view())?;
        Ok(self.profile.as_ref())
    }
}
