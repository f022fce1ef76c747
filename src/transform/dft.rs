//! Discrete Fourier approximation of sliding windows.
use std::f64::consts::PI;

use crate::constants::NUMERIC_TOLERANCE;


/// Number of interleaved real/imaginary values a window of
/// `window_size` points provides, starting at coefficient `start`.
#[inline]
pub(crate) fn available_values(window_size: usize, start: usize) -> usize {
    let last = window_size / 2;
    if last < start { 0 } else { (last + 1 - start) * 2 }
}


/// Returns the Fourier approximation of every sliding window
/// (stride 1) of `series`.
///
/// Each window is divided by its standard deviation
/// (windows with zero deviation are left unscaled).
/// The output row of a window holds
/// `re(X_start), im(X_start), re(X_start+1), ...`
/// truncated to `length` values.
pub(crate) fn sliding_dft(
    series: &[f64],
    window_size: usize,
    start: usize,
    length: usize,
) -> Vec<Vec<f64>>
{
    let n_windows = series.len() + 1 - window_size;
    let n_coefs = length.div_ceil(2);

    let mut sum = 0.0;
    let mut sq_sum = 0.0;
    series[..window_size].iter()
        .for_each(|v| {
            sum += v;
            sq_sum += v * v;
        });

    let w = window_size as f64;
    let mut rows = Vec::with_capacity(n_windows);
    for j in 0..n_windows {
        if j > 0 {
            let (out, inc) = (series[j - 1], series[j + window_size - 1]);
            sum += inc - out;
            sq_sum += inc * inc - out * out;
        }
        let mean = sum / w;
        let variance = (sq_sum / w - mean * mean).max(0.0);
        let std = variance.sqrt();
        let scale = if std > NUMERIC_TOLERANCE { 1.0 / std } else { 1.0 };

        let window = &series[j..j + window_size];
        let mut row = Vec::with_capacity(n_coefs * 2);
        for k in start..start + n_coefs {
            let (re, im) = coefficient(window, k);
            row.push(re * scale);
            row.push(im * scale);
        }
        row.truncate(length);
        rows.push(row);
    }
    rows
}


/// The `k`-th DFT coefficient of `window`.
#[inline]
fn coefficient(window: &[f64], k: usize) -> (f64, f64) {
    let n = window.len() as f64;
    window.iter()
        .enumerate()
        .fold((0.0, 0.0), |(re, im), (t, x)| {
            let angle = 2.0 * PI * (k * t) as f64 / n;
            (re + x * angle.cos(), im - x * angle.sin())
        })
}
