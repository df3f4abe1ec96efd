// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Linear-phase FIR coefficient design and the decoder's default filter sets.

use std::f64::consts::PI;

use crate::decoder::{CW_RATE_PCM, INTERNAL_RATE_PCM};
use crate::{Coeff, ModType};

/// Default tap count for the narrow IF filter.
pub const DEFAULT_IF_TAPS: usize = 63;
/// Tap count of the SSB shifted-audio filter.
pub const SSB_SHIFT_TAPS: usize = 63;
/// Tap count of the CW band filter.
pub const CW_TAPS: usize = 63;

/// Lower edge of the shifted SSB band (Hz at the internal rate).
const SSB_SHIFT_EDGE_HZ: f64 = 3_000.0;
/// One-sided CW filter bandwidth (Hz at the CW rate).
const CW_HALF_BANDWIDTH_HZ: f64 = 250.0;

/// Hann-windowed sinc low-pass normalised to unit DC gain.
///
/// `cutoff_norm` is `cutoff_hz / sample_rate` (0.0–0.5).
pub fn lowpass<C: Coeff>(cutoff_norm: f64, taps: usize) -> Vec<C> {
    assert!(taps >= 1, "FIR filter must have at least 1 tap");
    let m = (taps - 1) as f64;
    let mut coeffs = Vec::with_capacity(taps);
    for i in 0..taps {
        // Mirror the first half so the taps are exactly symmetric.
        let mirror = taps - 1 - i;
        if mirror < i {
            coeffs.push(coeffs[mirror]);
            continue;
        }
        let x = i as f64 - m / 2.0;
        let sinc = if x == 0.0 {
            2.0 * cutoff_norm
        } else {
            (2.0 * PI * cutoff_norm * x).sin() / (PI * x)
        };
        let window = if taps == 1 {
            1.0
        } else {
            0.5 * (1.0 - (2.0 * PI * i as f64 / m).cos())
        };
        coeffs.push(sinc * window);
    }
    let sum: f64 = coeffs.iter().sum();
    if sum.abs() > 1e-12 {
        let inv = 1.0 / sum;
        for coeff in &mut coeffs {
            *coeff *= inv;
        }
    }
    coeffs.into_iter().map(C::from_f64).collect()
}

/// High-pass by spectral inversion of [`lowpass`]. `taps` must be odd.
pub fn highpass<C: Coeff>(cutoff_norm: f64, taps: usize) -> Vec<C> {
    assert!(taps % 2 == 1, "high-pass FIR needs an odd tap count");
    let mut coeffs: Vec<f64> = lowpass(cutoff_norm, taps);
    for coeff in &mut coeffs {
        *coeff = -*coeff;
    }
    coeffs[taps / 2] += 1.0;
    coeffs.into_iter().map(C::from_f64).collect()
}

/// Real-tap filter passing 3–6 kHz at the internal rate, i.e. the upper half
/// of the band after a quarter-rate shift.
pub fn ssb_shifted_audio() -> Vec<f32> {
    highpass(SSB_SHIFT_EDGE_HZ / INTERNAL_RATE_PCM, SSB_SHIFT_TAPS)
}

/// ±250 Hz band filter at the CW rate.
pub fn cw_band() -> Vec<f32> {
    lowpass(CW_HALF_BANDWIDTH_HZ / CW_RATE_PCM, CW_TAPS)
}

/// Two-sided IF bandwidth used when none is configured.
pub fn default_bandwidth_hz(mode: ModType) -> f64 {
    match mode {
        ModType::Usb | ModType::Lsb => 6_000.0,
        ModType::Cw => 1_000.0,
        _ => 9_000.0,
    }
}

/// Narrow IF low-pass for `mode` at the internal rate.
///
/// The cutoff is half of `bandwidth_hz` (or the mode default), kept below
/// the internal Nyquist frequency.
pub fn narrow_if(mode: ModType, bandwidth_hz: Option<f64>, taps: usize) -> Vec<f32> {
    let bandwidth = bandwidth_hz.unwrap_or_else(|| default_bandwidth_hz(mode));
    let cutoff_norm = (bandwidth / 2.0 / INTERNAL_RATE_PCM).clamp(0.0, 0.499);
    lowpass(cutoff_norm, taps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::test_util::assert_approx_eq;

    fn magnitude_at(coeff: &[f64], freq_norm: f64) -> f64 {
        let (mut re, mut im) = (0.0, 0.0);
        for (n, &c) in coeff.iter().enumerate() {
            let w = 2.0 * PI * freq_norm * n as f64;
            re += c * w.cos();
            im -= c * w.sin();
        }
        (re * re + im * im).sqrt()
    }

    fn assert_symmetric<C: Coeff + PartialEq + std::fmt::Debug>(coeff: &[C]) {
        let n = coeff.len();
        for k in 0..n / 2 {
            assert_eq!(coeff[k], coeff[n - 1 - k], "tap {k}");
        }
    }

    #[test]
    fn test_lowpass_unit_dc_gain() {
        let coeff: Vec<f64> = lowpass(0.1, 41);
        assert_approx_eq(coeff.iter().sum(), 1.0, 1e-12, "DC gain");
        assert!(magnitude_at(&coeff, 0.4) < 0.01);
    }

    #[test]
    fn test_lowpass_half_gain_at_cutoff() {
        let coeff: Vec<f64> = lowpass(0.2, 63);
        assert_approx_eq(magnitude_at(&coeff, 0.2), 0.5, 0.05, "cutoff gain");
    }

    #[test]
    fn test_highpass_blocks_dc_passes_nyquist() {
        let coeff: Vec<f64> = highpass(0.25, 63);
        assert_approx_eq(magnitude_at(&coeff, 0.0), 0.0, 1e-9, "DC gain");
        assert_approx_eq(magnitude_at(&coeff, 0.5), 1.0, 0.01, "Nyquist gain");
        assert_approx_eq(magnitude_at(&coeff, 0.375), 1.0, 0.01, "passband");
        assert!(magnitude_at(&coeff, 1_500.0 / INTERNAL_RATE_PCM) < 0.01);
    }

    #[test]
    fn test_default_sets_are_symmetric() {
        assert_symmetric(&ssb_shifted_audio());
        assert_symmetric(&cw_band());
        for mode in ModType::AMPLITUDE {
            let coeff = narrow_if(mode, None, DEFAULT_IF_TAPS);
            assert_eq!(coeff.len(), DEFAULT_IF_TAPS);
            assert_symmetric(&coeff);
        }
    }

    #[test]
    fn test_narrow_if_follows_bandwidth() {
        let wide: Vec<f64> = narrow_if(ModType::Am, Some(9_000.0), 63)
            .into_iter()
            .map(f64::from)
            .collect();
        let narrow: Vec<f64> = narrow_if(ModType::Cw, None, 63)
            .into_iter()
            .map(f64::from)
            .collect();
        let probe = 2_000.0 / INTERNAL_RATE_PCM;
        assert!(magnitude_at(&wide, probe) > 0.9);
        assert!(magnitude_at(&narrow, probe) < 0.05);
    }

    #[test]
    #[should_panic(expected = "odd tap count")]
    fn test_highpass_even_taps_panics() {
        let _: Vec<f64> = highpass(0.25, 64);
    }
}
