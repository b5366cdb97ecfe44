/// Standard deviations at or below this fraction of the signal level are
/// treated as zero, so accumulated rounding on a constant trace is flat.
const FLAT_REL_TOL: f64 = 1e-9;

/// Zero-mean copy of a trace together with its population standard deviation.
#[derive(Debug, Clone, Default)]
pub struct CenteredSignal {
    centered: Vec<f64>,
    std: f64,
}

impl CenteredSignal {
    pub fn new(signal: &[f32]) -> Self {
        let mut out = Self::default();
        out.update(signal);
        out
    }

    /// Recomputes from `signal`, reusing the existing allocation.
    pub fn update(&mut self, signal: &[f32]) {
        self.centered.clear();
        self.std = 0.0;
        if signal.is_empty() {
            return;
        }

        let n = signal.len() as f64;
        let mean = signal.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
        self.centered
            .extend(signal.iter().map(|&v| f64::from(v) - mean));

        let std = (self.centered.iter().map(|d| d * d).sum::<f64>() / n).sqrt();
        if std > FLAT_REL_TOL * mean.abs().max(1.0) {
            self.std = std;
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.centered
    }

    pub fn len(&self) -> usize {
        self.centered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centered.is_empty()
    }

    pub fn std(&self) -> f64 {
        self.std
    }

    pub fn is_flat(&self) -> bool {
        self.std == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationPeak {
    /// Shift of `live` relative to `reference`; positive means `live` is the
    /// reference moved toward higher indices.
    pub lag: isize,
    pub value: f64,
}

/// `sum_j live[j + lag] * reference[j]` over the overlapping samples.
#[inline]
fn lag_dot(live: &[f64], reference: &[f64], lag: isize) -> f64 {
    let n = live.len() as isize;
    let m = reference.len() as isize;
    let j0 = (-lag).max(0);
    let j1 = m.min(n - lag);
    if j1 <= j0 {
        return 0.0;
    }

    let r = &reference[j0 as usize..j1 as usize];
    let l = &live[(j0 + lag) as usize..(j1 + lag) as usize];
    l.iter().zip(r).map(|(a, b)| a * b).sum()
}

/// Full cross-correlation of `live` against `reference`.
///
/// `out` gets `live.len() + reference.len() - 1` values; `out[k]` holds lag
/// `k - (reference.len() - 1)`, so every shift with any overlap is covered.
pub fn correlate_full(live: &[f64], reference: &[f64], out: &mut Vec<f64>) {
    out.clear();
    if live.is_empty() || reference.is_empty() {
        return;
    }

    let first = 1 - reference.len() as isize;
    let last = live.len() as isize - 1;
    out.extend((first..=last).map(|lag| lag_dot(live, reference, lag)));
}

/// Finds the normalized correlation peak without materializing the
/// correlation array.
///
/// Values are scaled by `reference.std * live.std * live.len()`, so a perfect
/// match scores about `1.0`. Ties keep the most negative lag. `max_lag`
/// restricts the search to `[-max_lag, max_lag]`; `None` searches every lag.
/// Returns `None` when either trace is flat.
pub fn normalized_peak(
    live: &CenteredSignal,
    reference: &CenteredSignal,
    max_lag: Option<usize>,
) -> Option<CorrelationPeak> {
    if live.is_flat() || reference.is_flat() {
        return None;
    }

    let scale = reference.std * live.std * live.len() as f64;
    let mut first = 1 - reference.len() as isize;
    let mut last = live.len() as isize - 1;
    if let Some(k) = max_lag {
        let k = k as isize;
        first = first.max(-k);
        last = last.min(k);
    }

    let mut best: Option<CorrelationPeak> = None;
    for lag in first..=last {
        let value = lag_dot(&live.centered, &reference.centered, lag) / scale;
        if best.is_none_or(|b| value > b.value) {
            best = Some(CorrelationPeak { lag, value });
        }
    }
    best
}
