use ta_core::{BorderMode, map_index};

/// Convolves `signal` with an odd-length `kernel` into `out`.
///
/// `out[i] = sum_k signal[i + radius - k] * kernel[k]`, with out-of-range
/// samples resolved through `border`.
pub fn convolve_f32(
    signal: &[f32],
    kernel: &[f32],
    radius: usize,
    border: &BorderMode<f32>,
    out: &mut [f32],
) {
    assert_eq!(out.len(), signal.len(), "output length differs from signal");
    assert_eq!(kernel.len(), 2 * radius + 1, "kernel is not 2 * radius + 1 taps");

    let n = signal.len();
    // Signals shorter than the kernel have no interior.
    let head = radius.min(n);
    let tail = n.saturating_sub(radius).max(head);

    for (i, slot) in out[..head].iter_mut().enumerate() {
        *slot = edge_tap_sum(signal, kernel, radius, border, i);
    }
    for (window, slot) in signal.windows(kernel.len()).zip(&mut out[head..tail]) {
        *slot = window
            .iter()
            .zip(kernel.iter().rev())
            .map(|(&s, &k)| s * k)
            .sum();
    }
    for (i, slot) in out.iter_mut().enumerate().skip(tail) {
        *slot = edge_tap_sum(signal, kernel, radius, border, i);
    }
}

fn edge_tap_sum(
    signal: &[f32],
    kernel: &[f32],
    radius: usize,
    border: &BorderMode<f32>,
    i: usize,
) -> f32 {
    let center = (i + radius) as isize;
    kernel
        .iter()
        .enumerate()
        .map(|(j, &k)| sample(signal, center - j as isize, border) * k)
        .sum()
}

fn sample(signal: &[f32], idx: isize, border: &BorderMode<f32>) -> f32 {
    if let Ok(i) = usize::try_from(idx)
        && let Some(&v) = signal.get(i)
    {
        return v;
    }
    match border {
        BorderMode::Constant(fill) => *fill,
        mode => map_index(idx, signal.len(), mode).map_or(0.0, |j| signal[j]),
    }
}
