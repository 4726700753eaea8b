//! In-place iterative radix-2 Cooley–Tukey FFT.
//!
//! Sign convention: the forward transform uses `e^{-2πi jk/n}` and the
//! inverse transform `e^{+2πi jk/n}` scaled by `1/n`, so that
//! `ifft(fft(x)) == x`.

use std::f64::consts::PI;

use agg_core::{ensure, Real, Result};
use num_complex::Complex64;

/// Forward discrete Fourier transform of `data`, in place.
///
/// # Errors
/// Returns an error if `data.len()` is not a power of two.
pub fn fft(data: &mut [Complex64]) -> Result<()> {
    transform(data, false)
}

/// Inverse discrete Fourier transform of `data`, in place (normalized by
/// `1/n`).
///
/// # Errors
/// Returns an error if `data.len()` is not a power of two.
pub fn ifft(data: &mut [Complex64]) -> Result<()> {
    transform(data, true)?;
    let scale = 1.0 / data.len() as Real;
    for z in data.iter_mut() {
        *z *= scale;
    }
    Ok(())
}

fn transform(data: &mut [Complex64], inverse: bool) -> Result<()> {
    let n = data.len();
    ensure!(
        n.is_power_of_two(),
        "fft length must be a power of two, got {n}"
    );

    bit_reverse_permute(data);

    let sign = if inverse { 1.0 } else { -1.0 };
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let angle = sign * 2.0 * PI / len as Real;
        // One twiddle table per stage, each entry evaluated directly.
        let twiddles: Vec<Complex64> = (0..half)
            .map(|k| Complex64::from_polar(1.0, angle * k as Real))
            .collect();
        for start in (0..n).step_by(len) {
            for (k, w) in twiddles.iter().enumerate() {
                let u = data[start + k];
                let v = data[start + k + half] * w;
                data[start + k] = u + v;
                data[start + k + half] = u - v;
            }
        }
        len <<= 1;
    }
    Ok(())
}

fn bit_reverse_permute(data: &mut [Complex64]) {
    let n = data.len();
    let mut j = 0;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            data.swap(i, j);
        }
    }
}
