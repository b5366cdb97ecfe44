use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize, Serializer};
use ta_core::{AlignedRoi, AnchorDefinition, LaneDefinition, Side};
use ta_signal::{TrackerConfig, VerticalStrip};
use uuid::Uuid;

use crate::ProfileError;

/// Everything recorded for one film edge: its lane, the perforation anchors
/// inside it and the reference density trace.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneCalibration {
    lane: LaneDefinition,
    anchors: Vec<AnchorDefinition>,
    signal: Vec<f32>,
}

impl LaneCalibration {
    pub fn new(
        lane: LaneDefinition,
        anchors: Vec<AnchorDefinition>,
        signal: Vec<f32>,
    ) -> Result<Self, ProfileError> {
        if let Some(bad) = anchors.iter().find(|a| a.lane_side() != lane.side()) {
            return Err(ProfileError::AnchorSideMismatch {
                id: bad.id().to_owned(),
                expected: lane.side(),
                found: bad.lane_side(),
            });
        }
        Ok(Self {
            lane,
            anchors,
            signal,
        })
    }

    pub fn from_strip(strip: &VerticalStrip) -> Self {
        Self {
            lane: strip.lane_definition(),
            anchors: strip.anchor_definitions().to_vec(),
            signal: strip.reference_signal().to_vec(),
        }
    }

    pub fn lane(&self) -> &LaneDefinition {
        &self.lane
    }

    pub fn anchors(&self) -> &[AnchorDefinition] {
        &self.anchors
    }

    pub fn signal(&self) -> &[f32] {
        &self.signal
    }
}

/// Persisted calibration result.
///
/// At least one edge is always present; a single-edge profile is valid for
/// film gauges perforated on one side only. Geometry and signals are fixed
/// once built; only `name` and `description` can be edited.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "ProfileRecord")]
pub struct CalibrationProfile {
    id: String,
    name: String,
    description: String,
    timestamp: NaiveDateTime,
    left: Option<LaneCalibration>,
    right: Option<LaneCalibration>,
}

/// Overview shown before a profile is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub id: String,
    pub name: String,
    pub lanes: Vec<Side>,
    pub total_anchors: usize,
}

impl CalibrationProfile {
    /// New profile with a fresh id and the current local time.
    pub fn create_new(
        left: Option<LaneCalibration>,
        right: Option<LaneCalibration>,
    ) -> Result<Self, ProfileError> {
        check_slot(Side::Left, left.as_ref())?;
        check_slot(Side::Right, right.as_ref())?;
        if left.is_none() && right.is_none() {
            return Err(ProfileError::MissingLanes);
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            description: String::new(),
            timestamp: Local::now().naive_local(),
            left,
            right,
        })
    }

    /// Assembles a profile from calibrated strips; `None` if both are absent.
    pub fn from_strips(left: Option<&VerticalStrip>, right: Option<&VerticalStrip>) -> Option<Self> {
        Self::create_new(
            left.map(LaneCalibration::from_strip),
            right.map(LaneCalibration::from_strip),
        )
        .ok()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn lane(&self, side: Side) -> Option<&LaneCalibration> {
        match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        }
    }

    pub fn left_lane(&self) -> Option<&LaneDefinition> {
        self.left.as_ref().map(LaneCalibration::lane)
    }

    pub fn right_lane(&self) -> Option<&LaneDefinition> {
        self.right.as_ref().map(LaneCalibration::lane)
    }

    pub fn left_lane_signal(&self) -> &[f32] {
        self.left.as_ref().map(LaneCalibration::signal).unwrap_or_default()
    }

    pub fn right_lane_signal(&self) -> &[f32] {
        self.right.as_ref().map(LaneCalibration::signal).unwrap_or_default()
    }

    pub fn left_anchors(&self) -> &[AnchorDefinition] {
        self.left.as_ref().map(LaneCalibration::anchors).unwrap_or_default()
    }

    pub fn right_anchors(&self) -> &[AnchorDefinition] {
        self.right.as_ref().map(LaneCalibration::anchors).unwrap_or_default()
    }

    /// Left anchors followed by right anchors.
    pub fn anchors(&self) -> impl Iterator<Item = &AnchorDefinition> {
        self.left_anchors().iter().chain(self.right_anchors())
    }

    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            lanes: Side::BOTH
                .into_iter()
                .filter(|&s| self.lane(s).is_some())
                .collect(),
            total_anchors: self.anchors().count(),
        }
    }

    /// A profile must be named before it is persisted.
    pub fn ensure_named(&self) -> Result<(), ProfileError> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::MissingName);
        }
        Ok(())
    }

    /// Reconstructs the scan-time tracker for one edge from the stored lane,
    /// anchors and reference signal.
    pub fn build_strip(
        &self,
        side: Side,
        config: &TrackerConfig,
    ) -> Result<VerticalStrip, ProfileError> {
        let cal = self.lane(side).ok_or(ProfileError::LaneMissing(side))?;
        let rois = cal
            .anchors
            .iter()
            .map(|a| AlignedRoi::from_anchor(&cal.lane, a))
            .collect();
        Ok(VerticalStrip::from_reference(
            rois,
            side,
            cal.signal.clone(),
            config,
        )?)
    }

    pub fn to_json(&self) -> Result<String, ProfileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ProfileError> {
        Ok(serde_json::from_str(text)?)
    }
}

fn check_slot(expected: Side, cal: Option<&LaneCalibration>) -> Result<(), ProfileError> {
    match cal {
        Some(cal) if cal.lane.side() != expected => Err(ProfileError::LaneSideMismatch {
            expected,
            found: cal.lane.side(),
        }),
        _ => Ok(()),
    }
}

/// Wire shape shared with previously saved profiles.
#[derive(Serialize)]
struct ProfileRecordRef<'a> {
    id: &'a str,
    name: &'a str,
    timestamp: &'a NaiveDateTime,
    description: &'a str,
    left_lane_signal: &'a [f32],
    right_lane_signal: &'a [f32],
    left_lane: Option<&'a LaneDefinition>,
    right_lane: Option<&'a LaneDefinition>,
    anchors: Vec<&'a AnchorDefinition>,
}

#[derive(Deserialize)]
struct ProfileRecord {
    id: String,
    #[serde(default)]
    name: String,
    timestamp: NaiveDateTime,
    #[serde(default)]
    description: String,
    #[serde(default)]
    left_lane_signal: Vec<f32>,
    #[serde(default)]
    right_lane_signal: Vec<f32>,
    #[serde(default)]
    left_lane: Option<LaneDefinition>,
    #[serde(default)]
    right_lane: Option<LaneDefinition>,
    #[serde(default)]
    anchors: Vec<AnchorDefinition>,
}

impl Serialize for CalibrationProfile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ProfileRecordRef {
            id: &self.id,
            name: &self.name,
            timestamp: &self.timestamp,
            description: &self.description,
            left_lane_signal: self.left_lane_signal(),
            right_lane_signal: self.right_lane_signal(),
            left_lane: self.left_lane(),
            right_lane: self.right_lane(),
            anchors: self.anchors().collect(),
        }
        .serialize(serializer)
    }
}

impl TryFrom<ProfileRecord> for CalibrationProfile {
    type Error = ProfileError;

    fn try_from(rec: ProfileRecord) -> Result<Self, Self::Error> {
        let (left_anchors, right_anchors): (Vec<_>, Vec<_>) = rec
            .anchors
            .into_iter()
            .partition(|a| a.lane_side() == Side::Left);

        let left = assemble_side(Side::Left, rec.left_lane, left_anchors, rec.left_lane_signal)?;
        let right = assemble_side(
            Side::Right,
            rec.right_lane,
            right_anchors,
            rec.right_lane_signal,
        )?;

        check_slot(Side::Left, left.as_ref())?;
        check_slot(Side::Right, right.as_ref())?;
        if left.is_none() && right.is_none() {
            return Err(ProfileError::MissingLanes);
        }

        Ok(Self {
            id: rec.id,
            name: rec.name,
            description: rec.description,
            timestamp: rec.timestamp,
            left,
            right,
        })
    }
}

fn assemble_side(
    side: Side,
    lane: Option<LaneDefinition>,
    anchors: Vec<AnchorDefinition>,
    signal: Vec<f32>,
) -> Result<Option<LaneCalibration>, ProfileError> {
    let Some(lane) = lane else {
        if let Some(orphan) = anchors.first() {
            return Err(ProfileError::AnchorWithoutLane {
                id: orphan.id().to_owned(),
                side,
            });
        }
        if !signal.is_empty() {
            return Err(ProfileError::SignalWithoutLane(side));
        }
        return Ok(None);
    };
    if lane.side() != side {
        return Err(ProfileError::LaneSideMismatch {
            expected: side,
            found: lane.side(),
        });
    }
    LaneCalibration::new(lane, anchors, signal).map(Some)
}

#[cfg(test)]
mod tests {
    use ta_core::{AnchorDefinition, LaneDefinition, Side};
    use ta_signal::TrackerConfig;

    use super::{CalibrationProfile, LaneCalibration};
    use crate::ProfileError;

    fn left_lane() -> LaneCalibration {
        let lane = LaneDefinition::new(Side::Left, 104, 46).expect("lane");
        let anchors = vec![
            AnchorDefinition::new("a0", Side::Left, 100, 30).expect("anchor"),
            AnchorDefinition::new("a1", Side::Left, 300, 30).expect("anchor"),
        ];
        let signal = (0..64).map(|i| (i as f32 * 0.7).sin() * 50.0 + 120.25).collect();
        LaneCalibration::new(lane, anchors, signal).expect("consistent lane")
    }

    fn right_lane() -> LaneCalibration {
        let lane = LaneDefinition::new(Side::Right, 1700, 52).expect("lane");
        let anchors = vec![AnchorDefinition::new("b0", Side::Right, 210, 28).expect("anchor")];
        LaneCalibration::new(lane, anchors, vec![1.5, 2.5, 0.125, 9.0]).expect("consistent lane")
    }

    #[test]
    fn needs_at_least_one_lane() {
        assert!(matches!(
            CalibrationProfile::create_new(None, None),
            Err(ProfileError::MissingLanes)
        ));
        assert!(CalibrationProfile::from_strips(None, None).is_none());
        assert!(matches!(
            CalibrationProfile::create_new(Some(right_lane()), None),
            Err(ProfileError::LaneSideMismatch { .. })
        ));
    }

    #[test]
    fn anchors_must_match_lane_side() {
        let lane = LaneDefinition::new(Side::Left, 0, 10).expect("lane");
        let stray = AnchorDefinition::new("x", Side::Right, 0, 10).expect("anchor");
        assert!(matches!(
            LaneCalibration::new(lane, vec![stray], Vec::new()),
            Err(ProfileError::AnchorSideMismatch { .. })
        ));
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let mut profile =
            CalibrationProfile::create_new(Some(left_lane()), Some(right_lane())).expect("valid");
        profile.set_name("Super 8 / Kodak");
        profile.set_description("warm-up reel");

        let text = profile.to_json().expect("serialize");
        let back = CalibrationProfile::from_json(&text).expect("deserialize");
        assert_eq!(back, profile);
        assert_eq!(back.left_anchors().len(), 2);
        assert_eq!(back.right_anchors()[0].id(), "b0");
    }

    #[test]
    fn wire_shape_uses_flat_anchor_list() {
        let profile = CalibrationProfile::create_new(Some(left_lane()), None).expect("valid");
        let json = serde_json::to_value(&profile).expect("serialize");

        assert_eq!(json["left_lane"]["x"], 104);
        assert!(json["right_lane"].is_null());
        assert_eq!(json["right_lane_signal"].as_array().map(Vec::len), Some(0));
        assert_eq!(json["anchors"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["anchors"][1]["lane_side"], "LEFT");
        for key in ["id", "name", "timestamp", "description", "left_lane_signal"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn reads_previously_saved_profiles() {
        let text = r#"{
            "id": "5c1d8d3e-2f43-4d0c-9d57-4f8d7a0e61aa",
            "name": "8mm",
            "timestamp": "2025-03-14T09:26:53.589793",
            "description": "",
            "left_lane_signal": [10.0, 12.5, 200.0, 201.0, 11.0],
            "right_lane_signal": [],
            "left_lane": {"side": "LEFT", "x": 104, "width": 46},
            "right_lane": null,
            "anchors": [{"id": "h1", "lane_side": "LEFT", "y": 2, "height": 2}]
        }"#;
        let profile = CalibrationProfile::from_json(text).expect("valid profile");
        assert_eq!(profile.name(), "8mm");
        assert!(profile.right_lane().is_none());
        assert_eq!(profile.left_lane_signal().len(), 5);
        assert_eq!(profile.summary().lanes, vec![Side::Left]);
        assert_eq!(profile.summary().total_anchors, 1);
    }

    #[test]
    fn rejects_inconsistent_records() {
        let orphan_anchor = r#"{
            "id": "p", "timestamp": "2025-03-14T09:26:53",
            "left_lane": {"side": "LEFT", "x": 1, "width": 4},
            "anchors": [{"id": "h1", "lane_side": "RIGHT", "y": 2, "height": 2}]
        }"#;
        assert!(CalibrationProfile::from_json(orphan_anchor).is_err());

        let no_lanes = r#"{"id": "p", "timestamp": "2025-03-14T09:26:53"}"#;
        assert!(CalibrationProfile::from_json(no_lanes).is_err());

        let swapped = r#"{
            "id": "p", "timestamp": "2025-03-14T09:26:53",
            "left_lane": {"side": "RIGHT", "x": 1, "width": 4}
        }"#;
        assert!(CalibrationProfile::from_json(swapped).is_err());

        let orphan_signal = r#"{
            "id": "p", "timestamp": "2025-03-14T09:26:53",
            "left_lane": {"side": "LEFT", "x": 1, "width": 4},
            "right_lane_signal": [1.0]
        }"#;
        assert!(CalibrationProfile::from_json(orphan_signal).is_err());
    }

    #[test]
    fn name_is_required_before_saving() {
        let mut profile = CalibrationProfile::create_new(Some(left_lane()), None).expect("valid");
        assert!(matches!(profile.ensure_named(), Err(ProfileError::MissingName)));
        profile.set_name("  ");
        assert!(profile.ensure_named().is_err());
        profile.set_name("Regular 8");
        assert!(profile.ensure_named().is_ok());
    }

    #[test]
    fn builds_runtime_strip_from_stored_lane() {
        let profile = CalibrationProfile::create_new(Some(left_lane()), None).expect("valid");
        let strip = profile
            .build_strip(Side::Left, &TrackerConfig::default())
            .expect("stored lane");
        assert_eq!(strip.x(), 104);
        assert_eq!(strip.width(), 46);
        assert_eq!(strip.height(), 64);
        assert_eq!(strip.aligned_rois()[1].id(), "a1");
        assert_eq!(strip.reference_signal(), profile.left_lane_signal());

        assert!(matches!(
            profile.build_strip(Side::Right, &TrackerConfig::default()),
            Err(ProfileError::LaneMissing(Side::Right))
        ));
    }
}
