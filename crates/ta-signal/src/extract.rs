use serde::{Deserialize, Serialize};
use ta_core::{BorderMode, ImageView, Luma};

use crate::conv1d::convolve_f32;
use crate::kernels1d::{SmoothingKernel, SmoothingKernel1D};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub kernel: SmoothingKernel,
    pub border: BorderMode<f32>,
}

/// Reusable density-trace extractor.
///
/// Smoothing is separable, so "2D smooth, then mean of every row" is computed
/// as "smooth each row, take its mean, then smooth the column of means". Both
/// axes use the same kernel and border policy, which makes the two orders
/// produce the same trace.
#[derive(Debug, Clone)]
pub struct SignalExtractor {
    kernel: SmoothingKernel1D,
    border: BorderMode<f32>,
    row: Vec<f32>,
    row_smooth: Vec<f32>,
    means: Vec<f32>,
    signal: Vec<f32>,
}

impl SignalExtractor {
    pub fn new(cfg: &SignalConfig) -> Self {
        Self {
            kernel: cfg.kernel.into(),
            border: cfg.border.clone(),
            row: Vec::new(),
            row_smooth: Vec::new(),
            means: Vec::new(),
            signal: Vec::new(),
        }
    }

    /// Reduces `band` to one smoothed mean intensity per row.
    ///
    /// The returned trace has `band.height()` samples and is empty for an
    /// empty band. It stays valid until the next call.
    pub fn extract<P: Luma>(&mut self, band: &ImageView<'_, P>) -> &[f32] {
        self.signal.clear();
        if band.is_empty() {
            return &self.signal;
        }

        let (w, h) = (band.width(), band.height());
        self.row.resize(w, 0.0);
        self.row_smooth.resize(w, 0.0);
        self.means.resize(h, 0.0);

        for (mean, src) in self.means.iter_mut().zip(band.rows()) {
            for (dst, &px) in self.row.iter_mut().zip(src) {
                *dst = px.luma();
            }
            convolve_f32(
                &self.row,
                &self.kernel.taps,
                self.kernel.radius,
                &self.border,
                &mut self.row_smooth,
            );
            *mean = self.row_smooth.iter().sum::<f32>() / w as f32;
        }

        self.signal.resize(h, 0.0);
        convolve_f32(
            &self.means,
            &self.kernel.taps,
            self.kernel.radius,
            &self.border,
            &mut self.signal,
        );
        &self.signal
    }
}
