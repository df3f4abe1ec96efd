// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Low-order recursive filters: RC low-pass (de-emphasis), generic
//! direct-form-2 first/second-order sections, and a matched-Z high-pass
//! used as the DC blocker.

use std::f64::consts::PI;

use num_complex::Complex;

use crate::{BlockProcessor, Sample};

/// First-order RC low-pass.
///
/// Continuous domain: `H(s) = 1 / (1 + s * timeconst)`.
/// Discrete domain: `H(z) = (1 - e^(-1/timeconst)) / (1 - e^(-1/timeconst) / z)`.
///
/// The interleaved variants treat even and odd indices as two independent
/// channels with separate memories.
#[derive(Debug, Clone)]
pub struct LowPassFilterRc {
    timeconst: f64,
    a1: f64,
    b0: f64,
    y0_1: Sample,
    y1_1: Sample,
}

impl LowPassFilterRc {
    /// `timeconst` is in samples.
    ///
    /// # Panics
    /// If `timeconst` is not strictly positive.
    pub fn new(timeconst: f64) -> Self {
        assert!(
            timeconst > 0.0,
            "RC time constant must be positive, got {timeconst}"
        );
        let a1 = -(-1.0 / timeconst).exp();
        Self {
            timeconst,
            a1,
            b0: 1.0 + a1,
            y0_1: 0.0,
            y1_1: 0.0,
        }
    }

    pub fn timeconst(&self) -> f64 {
        self.timeconst
    }

    pub fn process_inplace(&mut self, samples: &mut [Sample]) {
        let mut y = self.y0_1;
        for sample in samples.iter_mut() {
            y = self.b0 * *sample - self.a1 * y;
            *sample = y;
        }
        self.y0_1 = y;
    }

    /// Filter an interleaved two-channel block. A trailing unpaired sample
    /// is copied through unfiltered.
    pub fn process_interleaved_into(&mut self, input: &[Sample], output: &mut Vec<Sample>) {
        output.clear();
        output.extend_from_slice(input);
        self.process_interleaved_inplace(output);
    }

    /// In-place form of [`Self::process_interleaved_into`].
    pub fn process_interleaved_inplace(&mut self, samples: &mut [Sample]) {
        let mut y0 = self.y0_1;
        let mut y1 = self.y1_1;
        for pair in samples.chunks_exact_mut(2) {
            y0 = self.b0 * pair[0] - self.a1 * y0;
            pair[0] = y0;
            y1 = self.b0 * pair[1] - self.a1 * y1;
            pair[1] = y1;
        }
        self.y0_1 = y0;
        self.y1_1 = y1;
    }
}

impl BlockProcessor for LowPassFilterRc {
    type Input = Sample;
    type Output = Sample;

    fn process_into(&mut self, input: &[Sample], output: &mut Vec<Sample>) {
        output.clear();
        output.extend_from_slice(input);
        self.process_inplace(output);
    }
}

/// Generic first-order direct-form-2 IIR section.
#[derive(Debug, Clone)]
pub struct FirstOrderIirFilter {
    b0: f64,
    b1: f64,
    a1: f64,
    x1: f64,
}

impl FirstOrderIirFilter {
    pub fn new(b0: f64, b1: f64, a1: f64) -> Self {
        Self { b0, b1, a1, x1: 0.0 }
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let x0 = input - self.a1 * self.x1;
        let y = self.b0 * x0 + self.b1 * self.x1;
        self.x1 = x0;
        y
    }
}

/// Generic second-order (biquad) direct-form-2 IIR section.
///
/// `H(z) = (b0 + b1/z + b2/z²) / (1 + a1/z + a2/z²)`
#[derive(Debug, Clone)]
pub struct BiquadIirFilter {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    x1: f64,
    x2: f64,
}

impl BiquadIirFilter {
    pub fn new(b0: f64, b1: f64, b2: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0,
            b1,
            b2,
            a1,
            a2,
            x1: 0.0,
            x2: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let x0 = input - (self.a1 * self.x1 + self.a2 * self.x2);
        let y = self.b0 * x0 + self.b1 * self.x1 + self.b2 * self.x2;
        self.x2 = self.x1;
        self.x1 = x0;
        y
    }

    /// `(b0, b1, b2, a1, a2)`.
    pub fn coefficients(&self) -> (f64, f64, f64, f64, f64) {
        (self.b0, self.b1, self.b2, self.a1, self.a2)
    }

    /// Magnitude response at `freq_norm` cycles per sample.
    pub fn gain_at(&self, freq_norm: f64) -> f64 {
        let zinv = Complex::from_polar(1.0, -2.0 * PI * freq_norm);
        let zinv2 = zinv * zinv;
        let num = zinv * self.b1 + zinv2 * self.b2 + self.b0;
        let den = zinv * self.a1 + zinv2 * self.a2 + 1.0;
        (num / den).norm()
    }
}

/// Second-order high-pass with unit gain at Nyquist, used to block DC.
///
/// The poles are those of a 2-pole Butterworth high-pass prototype, mapped
/// to the z-plane with the matched-Z transform; both zeros sit at z = 1.
#[derive(Debug, Clone)]
pub struct HighPassFilterIir {
    biquad: BiquadIirFilter,
}

impl HighPassFilterIir {
    /// `cutoff` is normalised to the sample rate (cycles per sample).
    ///
    /// # Panics
    /// If `cutoff` is not strictly between 0 and 0.5.
    pub fn new(cutoff: f64) -> Self {
        assert!(
            cutoff > 0.0 && cutoff < 0.5,
            "high-pass cutoff must be in (0, 0.5), got {cutoff}"
        );
        let (b0, b1, b2, a1, a2) = Self::design(cutoff);
        Self {
            biquad: BiquadIirFilter::new(b0, b1, b2, a1, a2),
        }
    }

    fn design(cutoff: f64) -> (f64, f64, f64, f64, f64) {
        // Angular cutoff frequency.
        let w = 2.0 * PI * cutoff;

        // p_k = w / exp((2k + n - 1) / (2n) * pi * j), k = 1, n = 2.
        // The second pole is the conjugate of the first.
        let p1s = w / Complex::new(0.0, (2 + 2 - 1) as f64 / (2 * 2) as f64 * PI).exp();

        // Matched Z: p_z = exp(p_s * T) with T = 1 sample.
        let p1z = p1s.exp();

        // H(z) = g * (1 - 1/z)^2 / ((1 - p1/z) * (1 - p2/z))
        //      = g * (1 - 2/z + 1/z^2) / (1 - (p1 + p2)/z + p1*p2/z^2)
        let (b0, b1, b2) = (1.0, -2.0, 1.0);
        let a1 = -2.0 * p1z.re;
        let a2 = p1z.norm_sqr();

        // Unit gain at z = -1.
        let g = (b0 - b1 + b2) / (1.0 - a1 + a2);
        (b0 / g, b1 / g, b2 / g, a1, a2)
    }

    pub fn process_inplace(&mut self, samples: &mut [Sample]) {
        for sample in samples.iter_mut() {
            *sample = self.biquad.process(*sample);
        }
    }

    pub fn coefficients(&self) -> (f64, f64, f64, f64, f64) {
        self.biquad.coefficients()
    }

    pub fn gain_at(&self, freq_norm: f64) -> f64 {
        self.biquad.gain_at(freq_norm)
    }
}

impl BlockProcessor for HighPassFilterIir {
    type Input = Sample;
    type Output = Sample;

    fn process_into(&mut self, input: &[Sample], output: &mut Vec<Sample>) {
        output.clear();
        output.extend(input.iter().map(|&x| self.biquad.process(x)));
    }
}
