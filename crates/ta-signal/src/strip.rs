use serde::{Deserialize, Serialize};
use ta_core::{AlignedRoi, AnchorDefinition, ImageView, LaneDefinition, Luma, Rect, Side};

use crate::StripError;
use crate::extract::{SignalConfig, SignalExtractor};
use crate::xcorr::{CenteredSignal, normalized_peak};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub signal: SignalConfig,
    /// Largest lag, in pixels, the peak search considers. `None` searches the
    /// full correlation.
    pub max_lag: Option<usize>,
}

/// Live drift of one edge relative to its reference.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VerticalOffset {
    /// Pixels; positive means the film moved down (toward increasing `y`).
    pub offset: f64,
    /// Normalized correlation peak, approximately in `[-1, 1]`.
    pub confidence: f64,
}

impl VerticalOffset {
    /// Reported for flat traces and frames that do not cover the lane.
    pub const NONE: Self = Self {
        offset: 0.0,
        confidence: 0.0,
    };
}

/// Full-height lane on one film edge plus the perforations known to lie in it.
///
/// A strip always owns a reference trace: construction captures it from a
/// frame (or takes a stored one), and fails otherwise.
#[derive(Debug, Clone)]
pub struct VerticalStrip {
    lane: LaneDefinition,
    height: usize,
    aligned_rois: Vec<AlignedRoi>,
    anchors: Vec<AnchorDefinition>,
    reference: Vec<f32>,
    reference_centered: CenteredSignal,
    live_centered: CenteredSignal,
    extractor: SignalExtractor,
    max_lag: Option<usize>,
}

impl VerticalStrip {
    /// Builds the strip and captures its reference trace from `frame`.
    ///
    /// All `aligned_rois` must share one `x`/`width`. Fails with
    /// [`StripError::ReferenceUnavailable`] when the lane does not overlap the
    /// frame.
    pub fn new<P: Luma>(
        aligned_rois: Vec<AlignedRoi>,
        image_height: usize,
        side: Side,
        frame: &ImageView<'_, P>,
        config: &TrackerConfig,
    ) -> Result<Self, StripError> {
        let mut strip = Self::unreferenced(aligned_rois, image_height, side, config)?;
        if !strip.compute_and_store_reference(frame) {
            return Err(StripError::ReferenceUnavailable { side });
        }
        Ok(strip)
    }

    /// Rebuilds a strip from a stored reference trace, e.g. one loaded from a
    /// saved profile. The strip height is the trace length.
    pub fn from_reference(
        aligned_rois: Vec<AlignedRoi>,
        side: Side,
        reference: Vec<f32>,
        config: &TrackerConfig,
    ) -> Result<Self, StripError> {
        if reference.is_empty() {
            return Err(StripError::EmptyReference { side });
        }
        let mut strip = Self::unreferenced(aligned_rois, reference.len(), side, config)?;
        strip.reference_centered.update(&reference);
        strip.reference = reference;
        Ok(strip)
    }

    fn unreferenced(
        aligned_rois: Vec<AlignedRoi>,
        image_height: usize,
        side: Side,
        config: &TrackerConfig,
    ) -> Result<Self, StripError> {
        let first = aligned_rois.first().ok_or(StripError::EmptyRois { side })?;
        let (x, width) = (first.x(), first.width());

        if let Some(bad) = aligned_rois
            .iter()
            .find(|r| r.x() != x || r.width() != width)
        {
            return Err(StripError::MisalignedRois {
                side,
                id: bad.id().to_owned(),
                x,
                width,
                found_x: bad.x(),
                found_width: bad.width(),
            });
        }

        let lane = LaneDefinition::new(side, x, width)?;
        let anchors = aligned_rois
            .iter()
            .map(|r| AnchorDefinition::new(r.id(), side, r.y(), r.height()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            lane,
            height: image_height,
            aligned_rois,
            anchors,
            reference: Vec::new(),
            reference_centered: CenteredSignal::default(),
            live_centered: CenteredSignal::default(),
            extractor: SignalExtractor::new(&config.signal),
            max_lag: config.max_lag,
        })
    }

    pub fn side(&self) -> Side {
        self.lane.side()
    }

    pub fn x(&self) -> i32 {
        self.lane.x()
    }

    pub fn width(&self) -> i32 {
        self.lane.width()
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The full-height band this strip reads, anchored at `y = 0`.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.lane.x(),
            0,
            self.lane.width(),
            i32::try_from(self.height).unwrap_or(i32::MAX),
        )
    }

    pub fn aligned_rois(&self) -> &[AlignedRoi] {
        &self.aligned_rois
    }

    pub fn reference_signal(&self) -> &[f32] {
        &self.reference
    }

    pub fn lane_definition(&self) -> LaneDefinition {
        self.lane
    }

    /// One anchor per aligned roi, in roi order, sharing the roi ids.
    pub fn anchor_definitions(&self) -> &[AnchorDefinition] {
        &self.anchors
    }

    /// Extracts the density trace of this strip's band from `frame`.
    ///
    /// Returns `None` when the band does not overlap the frame.
    pub fn extract_signal<P: Luma>(&mut self, frame: &ImageView<'_, P>) -> Option<Vec<f32>> {
        let band = self.rect().crop(frame)?;
        Some(self.extractor.extract(&band).to_vec())
    }

    /// Re-captures the baseline from `frame`.
    ///
    /// Keeps the previous reference and returns `false` if extraction fails.
    pub fn compute_and_store_reference<P: Luma>(&mut self, frame: &ImageView<'_, P>) -> bool {
        let Some(band) = self.rect().crop(frame) else {
            return false;
        };
        let signal = self.extractor.extract(&band);
        if signal.is_empty() {
            return false;
        }

        self.reference.clear();
        self.reference.extend_from_slice(signal);
        self.reference_centered.update(&self.reference);
        true
    }

    /// Measures how far the film has drifted vertically since the reference
    /// was captured.
    ///
    /// Reuses internal buffers, so repeated calls at frame rate do not grow
    /// memory. Flat traces (on either side) and frames that miss the lane
    /// yield [`VerticalOffset::NONE`].
    ///
    /// The offset is the lag of the live trace against the reference: full
    /// correlation index `k` maps to `k - (reference_len - 1)`. For a frame of
    /// the calibrated height this equals `k - (live_len - 1)`. A shorter frame
    /// still reports the true drift rather than a value biased by the height
    /// difference.
    pub fn measure_vertical_offset<P: Luma>(&mut self, frame: &ImageView<'_, P>) -> VerticalOffset {
        let Some(band) = self.rect().crop(frame) else {
            tracing::trace!(side = %self.lane.side(), "lane outside frame");
            return VerticalOffset::NONE;
        };

        let live = self.extractor.extract(&band);
        self.live_centered.update(live);

        match normalized_peak(&self.live_centered, &self.reference_centered, self.max_lag) {
            Some(peak) => VerticalOffset {
                offset: peak.lag as f64,
                confidence: peak.value,
            },
            None => VerticalOffset::NONE,
        }
    }
}
