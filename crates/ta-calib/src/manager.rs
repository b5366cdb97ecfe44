use ta_core::{AlignedRoi, ImageView, Luma, PerSide, RawRoi, Roi, RoiKind, Side};
use ta_signal::{StripError, VerticalStrip};
use tracing::{debug, error, info, warn};

use crate::{CalibrationConfig, CalibrationProfile};

/// Draft state of one calibration: the raw regions drawn so far and the
/// aligned regions derived from them.
///
/// The manager never holds a frame. Operations that need one take it as an
/// argument and do not keep it past the call.
#[derive(Debug, Clone, Default)]
pub struct CalibrationManager {
    config: CalibrationConfig,
    raw_rois: Vec<RawRoi>,
    aligned_rois: Vec<AlignedRoi>,
}

impl CalibrationManager {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            raw_rois: Vec::new(),
            aligned_rois: Vec::new(),
        }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    pub fn raw_rois(&self) -> &[RawRoi] {
        &self.raw_rois
    }

    /// Result of the latest [`Self::align_raw_rois`], left side first.
    pub fn aligned_rois(&self) -> &[AlignedRoi] {
        &self.aligned_rois
    }

    pub fn clear_all_rois(&mut self) {
        self.raw_rois.clear();
        self.aligned_rois.clear();
    }

    /// Adds the region spanned by two corner points.
    ///
    /// Regions not larger than the configured minimum in both dimensions are
    /// ignored and `None` is returned.
    pub fn add_raw_roi(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> Option<&RawRoi> {
        let Some(roi) = RawRoi::from_points_with_min(x1, y1, x2, y2, self.config.min_roi_size)
        else {
            debug!(x1, y1, x2, y2, "ignoring undersized roi");
            return None;
        };
        debug!(%roi, "added raw roi");
        self.raw_rois.push(roi);
        self.raw_rois.last()
    }

    /// Removes the most recently added region containing `(x, y)` and returns
    /// its id.
    pub fn remove_raw_roi_from_point(&mut self, x: i32, y: i32) -> Option<String> {
        let idx = self.raw_rois.iter().rposition(|r| r.contains_point(x, y))?;
        let roi = self.raw_rois.remove(idx);
        debug!(%roi, "removed raw roi");
        Some(roi.id().to_owned())
    }

    /// Partitions the raw regions around the vertical midline of a frame
    /// `image_width` pixels wide. Regions straddling the midline are dropped.
    /// Each side is sorted top to bottom.
    pub fn split_rois_by_side(&self, image_width: usize) -> PerSide<Vec<RawRoi>> {
        let mid = i32::try_from(image_width / 2).unwrap_or(i32::MAX);
        let mut sides = PerSide::<Vec<RawRoi>>::default();

        for roi in &self.raw_rois {
            if roi.end_x() <= mid {
                sides.left.push(roi.clone());
            } else if roi.x() >= mid {
                sides.right.push(roi.clone());
            } else {
                warn!(%roi, mid, "roi straddles the frame midline, discarding");
            }
        }

        sides.left.sort_by_key(|r| r.y());
        sides.right.sort_by_key(|r| r.y());
        info!(
            left = sides.left.len(),
            right = sides.right.len(),
            "split rois by side"
        );
        sides
    }

    /// Snaps every side's regions onto that side's common horizontal span and
    /// stores the result.
    pub fn align_raw_rois(&mut self, image_width: usize) -> PerSide<Vec<AlignedRoi>> {
        let aligned = self
            .split_rois_by_side(image_width)
            .map(|side, rois| align_side(&rois, side));

        for side in Side::BOTH {
            if aligned.get(side).is_empty() {
                warn!(%side, "no aligned rois");
            }
        }

        self.aligned_rois.clear();
        self.aligned_rois.extend(aligned.left.iter().cloned());
        self.aligned_rois.extend(aligned.right.iter().cloned());
        aligned
    }

    /// Aligns the draft against `frame` and captures one strip per side that
    /// has aligned regions.
    ///
    /// A side whose reference cannot be read from the frame is logged and left
    /// empty. Any other strip error is a logic fault and is returned.
    pub fn generate_vertical_strips<P: Luma>(
        &mut self,
        frame: &ImageView<'_, P>,
    ) -> Result<PerSide<Option<VerticalStrip>>, StripError> {
        let aligned = self.align_raw_rois(frame.width());
        let tracker = &self.config.tracker;

        let mut strips = PerSide::<Option<VerticalStrip>>::default();
        for side in Side::BOTH {
            let rois = aligned.get(side);
            if rois.is_empty() {
                continue;
            }
            match VerticalStrip::new(rois.clone(), frame.height(), side, frame, tracker) {
                Ok(strip) => {
                    info!(
                        %side,
                        x = strip.x(),
                        width = strip.width(),
                        anchors = strip.aligned_rois().len(),
                        "built vertical strip"
                    );
                    *strips.get_mut(side) = Some(strip);
                }
                Err(err @ StripError::ReferenceUnavailable { .. }) => {
                    error!(%side, %err, "skipping strip");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(strips)
    }

    /// Runs the whole calibration against `frame`.
    ///
    /// `Ok(None)` means neither side produced a strip and calibration is
    /// incomplete.
    pub fn generate_calibration_profile<P: Luma>(
        &mut self,
        frame: &ImageView<'_, P>,
    ) -> Result<Option<CalibrationProfile>, StripError> {
        let strips = self.generate_vertical_strips(frame)?;
        let profile = CalibrationProfile::from_strips(strips.left.as_ref(), strips.right.as_ref());
        match &profile {
            Some(p) => info!(id = p.id(), "generated calibration profile"),
            None => error!("calibration incomplete: no strip on either side"),
        }
        Ok(profile)
    }
}

/// Aligns `rois` onto their common horizontal intersection.
///
/// Each output keeps its source's vertical extent and gets a fresh id.
/// Returns an empty list when the regions share no column.
pub fn align_side<K: RoiKind>(rois: &[Roi<K>], side: Side) -> Vec<AlignedRoi> {
    let Some(x) = rois.iter().map(Roi::x).max() else {
        return Vec::new();
    };
    let end_x = rois.iter().map(Roi::end_x).min().unwrap_or(x);
    let width = end_x - x;
    if width <= 0 {
        error!(%side, x, end_x, "rois share no common horizontal span");
        return Vec::new();
    }

    debug!(%side, x, width, count = rois.len(), "aligned lane");
    rois.iter()
        .map(|r| AlignedRoi::new(x, r.y(), width, r.height()))
        .collect()
}

#[cfg(test)]
mod tests {
    use ta_core::{AlignedRoi, Image, Raw, RawRoi, Side};

    use super::{CalibrationManager, align_side};
    use crate::CalibrationConfig;

    fn textured(width: usize, height: usize) -> Image<u8> {
        Image::from_fn(width, height, |x, y| ((x * 7 + y * 13) % 200 + 20) as u8)
    }

    #[test]
    fn undersized_rois_are_ignored() {
        let mut m = CalibrationManager::default();
        assert!(m.add_raw_roi(10, 10, 15, 40).is_none());
        assert!(m.add_raw_roi(10, 10, 40, 12).is_none());
        let added = m.add_raw_roi(40, 50, 10, 10).expect("large enough");
        assert_eq!((added.x(), added.y(), added.width(), added.height()), (10, 10, 30, 40));
        assert_eq!(m.raw_rois().len(), 1);
    }

    #[test]
    fn min_size_follows_config() {
        let mut m = CalibrationManager::new(CalibrationConfig {
            min_roi_size: 20,
            ..CalibrationConfig::default()
        });
        assert!(m.add_raw_roi(0, 0, 15, 40).is_none());
        assert!(m.add_raw_roi(0, 0, 25, 40).is_some());
    }

    #[test]
    fn removal_prefers_most_recent_hit() {
        let mut m = CalibrationManager::default();
        let first = m.add_raw_roi(0, 0, 50, 50).map(|r| r.id().to_owned());
        let second = m.add_raw_roi(20, 20, 80, 80).map(|r| r.id().to_owned());

        assert_eq!(m.remove_raw_roi_from_point(30, 30), second);
        assert_eq!(m.remove_raw_roi_from_point(30, 30), first);
        assert_eq!(m.remove_raw_roi_from_point(30, 30), None);
        assert!(m.raw_rois().is_empty());
    }

    #[test]
    fn straddling_roi_is_discarded() {
        let mut m = CalibrationManager::default();
        m.add_raw_roi(100, 300, 150, 330);
        m.add_raw_roi(940, 10, 990, 40);
        m.add_raw_roi(1700, 50, 1750, 80);
        m.add_raw_roi(110, 20, 160, 50);
        m.add_raw_roi(910, 5, 960, 35);

        let sides = m.split_rois_by_side(1920);
        let left_y: Vec<_> = sides.left.iter().map(RawRoi::y).collect();
        assert_eq!(left_y, vec![5, 20, 300]);
        assert_eq!(sides.right.len(), 1);
        assert_eq!(sides.right[0].x(), 1700);
    }

    #[test]
    fn alignment_uses_common_intersection() {
        let rois: Vec<RawRoi> = [100, 104, 102]
            .iter()
            .enumerate()
            .filter_map(|(i, &x)| {
                let y = 50 + 100 * i as i32;
                RawRoi::from_points(x, y, x + 50, y + 30)
            })
            .collect();

        let aligned = align_side(&rois, Side::Left);
        assert_eq!(aligned.len(), 3);
        assert!(aligned.iter().all(|r| r.x() == 104 && r.width() == 46));
        assert_eq!(aligned[2].y(), 250);
        assert_eq!(aligned[2].height(), 30);

        let again = align_side(&aligned, Side::Left);
        assert!(again.iter().all(|r| r.x() == 104 && r.width() == 46));
    }

    #[test]
    fn disjoint_rois_fail_alignment() {
        let rois = vec![AlignedRoi::new(0, 0, 10, 10), AlignedRoi::new(20, 40, 10, 10)];
        assert!(align_side(&rois, Side::Right).is_empty());
        assert!(align_side::<Raw>(&[], Side::Right).is_empty());
    }

    #[test]
    fn aligned_list_is_stored_left_first() {
        let mut m = CalibrationManager::default();
        m.add_raw_roi(1500, 10, 1550, 40);
        m.add_raw_roi(100, 10, 150, 40);
        let aligned = m.align_raw_rois(1920);
        assert_eq!(aligned.left.len(), 1);
        assert_eq!(aligned.right.len(), 1);
        assert_eq!(m.aligned_rois()[0].x(), 100);
        assert_eq!(m.aligned_rois()[1].x(), 1500);

        m.clear_all_rois();
        assert!(m.raw_rois().is_empty());
        assert!(m.aligned_rois().is_empty());
    }

    #[test]
    fn single_edge_film_produces_left_only_profile() {
        let frame = textured(1920, 400);
        let mut m = CalibrationManager::default();
        for (i, x) in [100, 104, 102].into_iter().enumerate() {
            let y = 40 + 120 * i as i32;
            assert!(m.add_raw_roi(x, y, x + 50, y + 30).is_some());
        }

        let profile = m
            .generate_calibration_profile(&frame.as_view())
            .expect("consistent strips")
            .expect("left lane calibrated");
        let lane = profile.left_lane().expect("left lane");
        assert_eq!((lane.x(), lane.width()), (104, 46));
        assert!(profile.right_lane().is_none());
        assert!(profile.right_lane_signal().is_empty());
        assert_eq!(profile.left_lane_signal().len(), 400);
        assert_eq!(profile.left_anchors().len(), 3);

        let ids: Vec<_> = m.aligned_rois().iter().map(|r| r.id()).collect();
        let anchor_ids: Vec<_> = profile.left_anchors().iter().map(|a| a.id()).collect();
        assert_eq!(ids, anchor_ids);
    }

    #[test]
    fn nothing_drawn_means_no_profile() {
        let frame = textured(640, 120);
        let mut m = CalibrationManager::default();
        assert_eq!(m.generate_calibration_profile(&frame.as_view()), Ok(None));

        m.add_raw_roi(300, 10, 340, 40);
        let strips = m.generate_vertical_strips(&frame.as_view()).expect("no strips");
        assert!(strips.left.is_none() && strips.right.is_none());
    }

    #[test]
    fn lane_outside_frame_is_skipped_per_side() {
        let frame = textured(640, 120);
        let mut m = CalibrationManager::default();
        m.add_raw_roi(20, 10, 60, 40);
        // Right of the midline but beyond the frame's right edge.
        m.add_raw_roi(700, 10, 760, 40);

        let strips = m.generate_vertical_strips(&frame.as_view()).expect("isolated failure");
        assert!(strips.left.is_some());
        assert!(strips.right.is_none());
    }
}
