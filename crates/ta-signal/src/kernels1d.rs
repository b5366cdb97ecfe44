use serde::{Deserialize, Serialize};

/// Taps of the 5x5 smoothing window, per axis.
pub const SMOOTHING_TAPS: usize = 5;

/// Per-axis smoothing selection.
///
/// `Binomial5` is the fixed `[1, 4, 6, 4, 1] / 16` table a 5-tap Gaussian
/// degenerates to when sigma is derived from the window size. `Gaussian`
/// samples `exp(-x^2 / (2 sigma^2))` over the same 5 taps; a non-positive or
/// non-finite sigma falls back to the binomial table.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SmoothingKernel {
    #[default]
    Binomial5,
    Gaussian {
        sigma: f32,
    },
}

/// Normalized symmetric 1D kernel (`sum(taps) ~= 1`, `len == 2 * radius + 1`).
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingKernel1D {
    pub radius: usize,
    pub taps: Vec<f32>,
}

impl SmoothingKernel1D {
    pub fn binomial5() -> Self {
        Self {
            radius: SMOOTHING_TAPS / 2,
            taps: vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
        }
    }

    pub fn gaussian5(sigma: f32) -> Self {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Self::binomial5();
        }

        let radius = SMOOTHING_TAPS / 2;
        let sigma2 = sigma * sigma;
        let mut taps: Vec<f32> = (0..SMOOTHING_TAPS)
            .map(|i| {
                let x = i as f32 - radius as f32;
                (-(x * x) / (2.0 * sigma2)).exp()
            })
            .collect();

        let sum: f32 = taps.iter().sum();
        for t in &mut taps {
            *t /= sum;
        }

        Self { radius, taps }
    }
}

impl From<SmoothingKernel> for SmoothingKernel1D {
    fn from(kind: SmoothingKernel) -> Self {
        match kind {
            SmoothingKernel::Binomial5 => Self::binomial5(),
            SmoothingKernel::Gaussian { sigma } => Self::gaussian5(sigma),
        }
    }
}
