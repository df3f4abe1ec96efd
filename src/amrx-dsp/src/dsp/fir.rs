// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use crate::{BlockProcessor, Coeff, IqSample, Sample, Signal};

/// Complex-sample low-pass with optional integer decimation (narrow IF filter).
pub type LowPassFilterFirIq = FirFilter<IqSample, f32>;
/// Real-sample low-pass for audio-band filtering.
pub type LowPassFilterFirAudio = FirFilter<Sample, f64>;

/// Block FIR filter for linear-phase (symmetric) coefficient sets.
///
/// The filter keeps the last `order` input samples so consecutive blocks are
/// processed as one continuous stream, and carries the decimation phase
/// across blocks so block sizes need not be multiples of the decimation
/// factor.
///
/// Coefficients are assumed symmetric (`coeff[k] == coeff[order - k]`); each
/// output pairs the mirrored taps to halve the multiply count.
#[derive(Debug, Clone)]
pub struct FirFilter<T, C> {
    coeff: Vec<C>,
    order: usize,
    downsample: usize,
    /// The most recent `order` input samples, oldest first.
    state: Vec<T>,
    /// Index into the next block of the next sample to produce output for.
    pos: usize,
}

/// One output sample. `at(k)` returns the input `k` samples before the
/// current one.
#[inline]
fn symmetric_tap<T, C, F>(coeff: &[C], order: usize, at: F) -> T
where
    T: Signal<C>,
    C: Coeff,
    F: Fn(usize) -> T,
{
    let mut y = T::default();
    for k in 0..(order + 1) / 2 {
        y = y + (at(k) + at(order - k)) * coeff[k];
    }
    if order % 2 == 0 {
        y = y + at(order / 2) * coeff[order / 2];
    }
    y
}

impl<T, C> FirFilter<T, C>
where
    T: Signal<C>,
    C: Coeff,
{
    /// Construct a filter from `coeff` (length = order + 1), keeping every
    /// `downsample`-th output.
    ///
    /// # Panics
    /// If `coeff` is empty or `downsample` is zero.
    pub fn new(coeff: Vec<C>, downsample: usize) -> Self {
        assert!(!coeff.is_empty(), "FIR filter must have at least 1 tap");
        assert!(downsample >= 1, "FIR downsample factor must be >= 1");
        let order = coeff.len() - 1;
        Self {
            coeff,
            order,
            downsample,
            state: vec![T::default(); order],
            pos: 0,
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn downsample(&self) -> usize {
        self.downsample
    }

    pub fn coefficients(&self) -> &[C] {
        &self.coeff
    }

    /// Decimation phase carried into the next block; always `< downsample()`.
    pub fn phase(&self) -> usize {
        self.pos
    }

    /// Number of samples the next call will produce for `n` input samples.
    pub fn output_len(&self, n: usize) -> usize {
        (n + self.downsample - 1 - self.pos) / self.downsample
    }
}

impl<T, C> BlockProcessor for FirFilter<T, C>
where
    T: Signal<C>,
    C: Coeff,
{
    type Input = T;
    type Output = T;

    fn process_into(&mut self, input: &[T], output: &mut Vec<T>) {
        let n = input.len();
        let order = self.order;
        let step = self.downsample;
        let coeff = &self.coeff;
        let state = &self.state;

        output.clear();
        output.reserve(self.output_len(n));

        // The first few outputs reach back into the previous block.
        let mut p = self.pos;
        while p < n && p < order {
            output.push(symmetric_tap(coeff, order, |k| {
                if k <= p {
                    input[p - k]
                } else {
                    state[order + p - k]
                }
            }));
            p += step;
        }

        // The rest only need the current block.
        while p < n {
            output.push(symmetric_tap(coeff, order, |k| input[p - k]));
            p += step;
        }

        self.pos = p - n;

        if n < order {
            self.state.copy_within(n.., 0);
            self.state[order - n..].copy_from_slice(input);
        } else {
            self.state.copy_from_slice(&input[n - order..]);
        }
    }
}
