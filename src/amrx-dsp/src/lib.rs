// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Streaming AM/DSB/SSB/CW demodulation core.
//!
//! Symmetric FIR filters, low-order recursive filters, rate conversion,
//! quarter-rate shifting, AGC and the per-mode [`AmDecoder`] pipeline that
//! turns blocks of complex IF samples into mono audio.

pub mod agc;
pub mod decoder;
pub mod demod;
pub mod dsp;
pub mod mode;

use std::ops::{Add, Mul};

use num_complex::Complex;

/// One complex IF sample.
pub type IqSample = Complex<f32>;
/// Demodulator output, still in single precision.
pub type IqSampleDecoded = f32;
/// Working-precision baseband / audio sample.
pub type Sample = f64;

pub use decoder::AmDecoder;
pub use mode::{ModType, ModeError};

/// Block-at-a-time stream transform.
///
/// Implementations keep whatever history they need between calls so that
/// feeding `a` then `b` produces the same output as feeding `a ++ b` once.
/// An empty output is a normal result and means "feed more input".
pub trait BlockProcessor {
    type Input;
    type Output;

    /// Consume all of `input`, replacing the contents of `output`.
    fn process_into(&mut self, input: &[Self::Input], output: &mut Vec<Self::Output>);

    fn process(&mut self, input: &[Self::Input]) -> Vec<Self::Output> {
        let mut output = Vec::new();
        self.process_into(input, &mut output);
        output
    }
}

/// Filter tap type.
pub trait Coeff: Copy + Send + Sync + 'static {
    fn from_f64(value: f64) -> Self;
}

impl Coeff for f32 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Coeff for f64 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
}

/// A sample value that can be scaled by taps of type `C` and accumulated.
pub trait Signal<C>: Copy + Default + Add<Output = Self> + Mul<C, Output = Self> {}

impl<C, T> Signal<C> for T where T: Copy + Default + Add<Output = T> + Mul<C, Output = T> {}
