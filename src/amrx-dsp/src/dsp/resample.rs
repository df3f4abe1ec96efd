// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Fractional sample-rate conversion.

use std::f64::consts::PI;

use crate::{BlockProcessor, Coeff, IqSample, Sample, Signal};

/// Complex IF resampler (IF rate to the internal decode rate).
pub type IfResampler = Resampler<IqSample, f32>;
/// Real audio resampler (internal rate to output PCM rate).
pub type AudioResampler = Resampler<Sample, f64>;

/// Number of fractional-delay rows in the polyphase bank.
const PHASES: usize = 64;
/// Tap count per row when interpolating.
const BASE_TAPS: usize = 16;
/// Anti-alias cutoff as a fraction of the lower Nyquist frequency.
const CUTOFF_FRACTION: f64 = 0.9;

/// Polyphase windowed-sinc resampler with an arbitrary rate ratio.
///
/// An output-phase accumulator advances by `out_rate / in_rate` per input
/// sample; every time it crosses 1.0 one output is produced by the bank row
/// closest to the fractional position of that output. State is advanced one
/// input sample at a time, so block boundaries never change the output.
#[derive(Debug, Clone)]
pub struct Resampler<T, C> {
    in_rate: f64,
    out_rate: f64,
    ratio: f64,
    taps: usize,
    /// `PHASES + 1` rows of `taps` coefficients, oldest sample first.
    bank: Vec<Vec<C>>,
    /// Doubled ring buffer: `history[head..head + taps]` is the window.
    history: Vec<T>,
    head: usize,
    phase: f64,
}

impl<T, C> Resampler<T, C>
where
    T: Signal<C>,
    C: Coeff,
{
    /// # Panics
    /// If either rate is not a positive finite number.
    pub fn new(in_rate: f64, out_rate: f64) -> Self {
        assert!(
            in_rate.is_finite() && in_rate > 0.0,
            "resampler input rate must be positive, got {in_rate}"
        );
        assert!(
            out_rate.is_finite() && out_rate > 0.0,
            "resampler output rate must be positive, got {out_rate}"
        );
        let ratio = out_rate / in_rate;
        let taps = if ratio >= 1.0 {
            BASE_TAPS
        } else {
            BASE_TAPS * (1.0 / ratio).ceil() as usize
        };
        let cutoff = 0.5 * CUTOFF_FRACTION * ratio.min(1.0);
        let bank = (0..=PHASES)
            .map(|q| Self::design_row(taps, cutoff, q as f64 / PHASES as f64))
            .collect();
        Self {
            in_rate,
            out_rate,
            ratio,
            taps,
            bank,
            history: vec![T::default(); 2 * taps],
            head: 0,
            phase: 0.0,
        }
    }

    /// One bank row for an output lying `delay` input samples before the
    /// newest sample (plus the fixed group delay of `taps / 2`).
    fn design_row(taps: usize, cutoff: f64, delay: f64) -> Vec<C> {
        let half = taps as f64 / 2.0;
        let center = half + delay;
        let mut row: Vec<f64> = (0..taps)
            .map(|i| {
                let age = (taps - 1 - i) as f64;
                let t = center - age;
                let sinc = if t == 0.0 {
                    2.0 * cutoff
                } else {
                    (2.0 * PI * cutoff * t).sin() / (PI * t)
                };
                let window = if t.abs() < half {
                    0.5 * (1.0 + (PI * t / half).cos())
                } else {
                    0.0
                };
                sinc * window
            })
            .collect();
        let sum: f64 = row.iter().sum();
        if sum.abs() > 1e-12 {
            for coeff in &mut row {
                *coeff /= sum;
            }
        }
        row.into_iter().map(C::from_f64).collect()
    }

    pub fn in_rate(&self) -> f64 {
        self.in_rate
    }

    pub fn out_rate(&self) -> f64 {
        self.out_rate
    }

    /// `out_rate / in_rate`.
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn taps(&self) -> usize {
        self.taps
    }

    #[inline]
    fn push(&mut self, sample: T) {
        self.history[self.head] = sample;
        self.history[self.head + self.taps] = sample;
        self.head = (self.head + 1) % self.taps;
    }

    #[inline]
    fn interpolate(&self, row: usize) -> T {
        let window = &self.history[self.head..self.head + self.taps];
        window
            .iter()
            .zip(self.bank[row].iter())
            .fold(T::default(), |acc, (&x, &c)| acc + x * c)
    }
}

impl<T, C> BlockProcessor for Resampler<T, C>
where
    T: Signal<C>,
    C: Coeff,
{
    type Input = T;
    type Output = T;

    fn process_into(&mut self, input: &[T], output: &mut Vec<T>) {
        output.clear();
        output.reserve((input.len() as f64 * self.ratio).ceil() as usize + 1);
        for &sample in input {
            self.push(sample);
            self.phase += self.ratio;
            while self.phase >= 1.0 {
                self.phase -= 1.0;
                let delay = self.phase / self.ratio;
                let row = ((delay * PHASES as f64).round() as usize).min(PHASES);
                output.push(self.interpolate(row));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::test_util::{
        assert_approx_eq, assert_streaming_equivalent, test_iq, test_real,
    };

    fn tone(freq_norm: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|n| (2.0 * PI * freq_norm * n as f64).sin())
            .collect()
    }

    fn rms(samples: &[f64]) -> f64 {
        (samples.iter().map(|x| x * x).sum::<f64>() / samples.len() as f64).sqrt()
    }

    #[test]
    fn test_integer_upsample_length() {
        let mut rs = AudioResampler::new(12_000.0, 48_000.0);
        assert_eq!(rs.ratio(), 4.0);
        assert_eq!(rs.taps(), BASE_TAPS);
        for n in [0usize, 1, 7, 100] {
            assert_eq!(rs.process(&test_real(n)).len(), 4 * n);
        }
    }

    #[test]
    fn test_integer_downsample_length() {
        let mut rs = IfResampler::new(48_000.0, 12_000.0);
        assert_eq!(rs.taps(), 4 * BASE_TAPS);
        assert!(rs.process(&test_iq(3)).is_empty());
        assert_eq!(rs.process(&test_iq(1)).len(), 1);
        assert_eq!(rs.process(&test_iq(400)).len(), 100);
    }

    #[test]
    fn test_fractional_rate_law() {
        let mut rs = AudioResampler::new(44_100.0, 48_000.0);
        let mut total = 0usize;
        let mut consumed = 0usize;
        for n in [1usize, 13, 441, 999, 2, 3000] {
            total += rs.process(&test_real(n)).len();
            consumed += n;
            let expected = consumed as f64 * 48_000.0 / 44_100.0;
            assert!((total as f64 - expected).abs() <= 1.0, "{total} vs {expected}");
        }
    }

    #[test]
    fn test_rows_have_unit_dc_gain() {
        let rs = AudioResampler::new(12_000.0, 48_000.0);
        assert_eq!(rs.bank.len(), PHASES + 1);
        for (q, row) in rs.bank.iter().enumerate() {
            assert_approx_eq(row.iter().sum(), 1.0, 1e-12, &format!("row {q}"));
        }
    }

    #[test]
    fn test_dc_passthrough() {
        let mut rs = AudioResampler::new(12_000.0, 48_000.0);
        let out = rs.process(&vec![0.5; 100]);
        for (idx, &y) in out.iter().enumerate().skip(4 * BASE_TAPS) {
            assert_approx_eq(y, 0.5, 1e-9, &format!("sample {idx}"));
        }
    }

    #[test]
    fn test_upsampled_tone_keeps_amplitude() {
        let mut rs = AudioResampler::new(12_000.0, 48_000.0);
        let out = rs.process(&tone(1_000.0 / 12_000.0, 600));
        let settled = &out[4 * BASE_TAPS..];
        assert_approx_eq(rms(settled), 0.5_f64.sqrt(), 0.02, "tone rms");
    }

    #[test]
    fn test_downsample_rejects_out_of_band_tone() {
        let mut rs = AudioResampler::new(48_000.0, 12_000.0);
        let out = rs.process(&tone(10_000.0 / 48_000.0, 4_800));
        assert!(rms(&out[rs.taps()..]) < 0.05);

        let mut rs = AudioResampler::new(48_000.0, 12_000.0);
        let out = rs.process(&tone(1_000.0 / 48_000.0, 4_800));
        assert_approx_eq(rms(&out[rs.taps()..]), 0.5_f64.sqrt(), 0.02, "in-band");
    }

    #[test]
    fn test_streaming_equivalence() {
        let input = test_real(120);
        let splits: Vec<usize> = (0..=120).step_by(7).collect();
        assert_streaming_equivalent(
            || AudioResampler::new(12_000.0, 48_000.0),
            &input,
            &splits,
        );
        assert_streaming_equivalent(
            || AudioResampler::new(44_100.0, 12_000.0),
            &input,
            &splits,
        );

        let input = test_iq(120);
        assert_streaming_equivalent(|| IfResampler::new(12_000.0, 2_000.0), &input, &splits);
    }

    #[test]
    #[should_panic(expected = "input rate")]
    fn test_zero_rate_panics() {
        let _ = AudioResampler::new(0.0, 48_000.0);
    }
}
