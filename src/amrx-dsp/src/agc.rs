// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Automatic gain control for the IF (complex) and audio (real) stages.

use crate::{BlockProcessor, IqSample, Sample};

/// Samples quieter than this leave the gain untouched.
const AMPLITUDE_FLOOR: f64 = 1e-12;

/// Log-domain gain loop shared by both AGC flavours.
///
/// Each sample moves `ln(gain)` a fraction `rate` of the way towards the gain
/// that would put the sample exactly at `reference`; the result never exceeds
/// `max_gain`.
#[derive(Debug, Clone)]
struct GainLoop {
    log_gain: f64,
    log_max_gain: f64,
    log_reference: f64,
    rate: f64,
    gain: f64,
}

impl GainLoop {
    fn new(initial_gain: f64, max_gain: f64, reference: f64, rate: f64) -> Self {
        assert!(
            initial_gain > 0.0 && max_gain > 0.0 && reference > 0.0,
            "AGC gains and reference must be positive"
        );
        assert!(
            rate > 0.0 && rate <= 1.0,
            "AGC rate must be in (0, 1], got {rate}"
        );
        let log_max_gain = max_gain.ln();
        let log_gain = initial_gain.ln().min(log_max_gain);
        Self {
            log_gain,
            log_max_gain,
            log_reference: reference.ln(),
            rate,
            gain: log_gain.exp(),
        }
    }

    /// Gain to apply to a sample of magnitude `amplitude`; updates the loop
    /// afterwards.
    #[inline]
    fn step(&mut self, amplitude: f64) -> f64 {
        let gain = self.gain;
        if amplitude > AMPLITUDE_FLOOR {
            let error = self.log_reference - (amplitude.ln() + self.log_gain);
            self.log_gain = (self.log_gain + self.rate * error).min(self.log_max_gain);
            self.gain = self.log_gain.exp();
        }
        gain
    }
}

/// IF-stage AGC: raises the complex signal towards the reference magnitude.
#[derive(Debug, Clone)]
pub struct IfAgc {
    inner: GainLoop,
}

impl IfAgc {
    /// # Panics
    /// If a gain or the reference is not positive, or `rate` is outside (0, 1].
    pub fn new(initial_gain: f64, max_gain: f64, reference: f64, rate: f64) -> Self {
        Self {
            inner: GainLoop::new(initial_gain, max_gain, reference, rate),
        }
    }

    pub fn gain(&self) -> f64 {
        self.inner.gain
    }
}

impl BlockProcessor for IfAgc {
    type Input = IqSample;
    type Output = IqSample;

    fn process_into(&mut self, input: &[IqSample], output: &mut Vec<IqSample>) {
        output.clear();
        output.reserve(input.len());
        for &x in input {
            let gain = self.inner.step(x.norm() as f64);
            output.push(x * gain as f32);
        }
    }
}

/// Audio-stage AGC: slow level control plus a hard limit at ±1.0.
#[derive(Debug, Clone)]
pub struct AfAgc {
    inner: GainLoop,
}

impl AfAgc {
    /// # Panics
    /// If a gain or the reference is not positive, or `rate` is outside (0, 1].
    pub fn new(initial_gain: f64, max_gain: f64, reference: f64, rate: f64) -> Self {
        Self {
            inner: GainLoop::new(initial_gain, max_gain, reference, rate),
        }
    }

    pub fn gain(&self) -> f64 {
        self.inner.gain
    }
}

impl BlockProcessor for AfAgc {
    type Input = Sample;
    type Output = Sample;

    fn process_into(&mut self, input: &[Sample], output: &mut Vec<Sample>) {
        output.clear();
        output.reserve(input.len());
        for &x in input {
            let gain = self.inner.step(x.abs());
            output.push((x * gain).clamp(-1.0, 1.0));
        }
    }
}
