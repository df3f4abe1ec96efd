// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use crate::{IqSample, IqSampleDecoded};

/// Upper bound on the number of samples visited by [`rms_level_approx`].
const APPROX_POINTS: usize = 256;

/// Approximate RMS magnitude of an IQ block, computed over an evenly strided
/// subset of at most [`APPROX_POINTS`] samples. Returns 0.0 for an empty block.
pub fn rms_level_approx(samples: &[IqSample]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let stride = (samples.len() / APPROX_POINTS).max(1);
    let mut level = 0.0_f32;
    let mut count = 0usize;
    for sample in samples.iter().step_by(stride) {
        level += sample.norm_sqr();
        count += 1;
    }
    (level / count as f32).sqrt()
}

/// Mean and RMS of a real block. Returns `(0.0, 0.0)` for an empty block.
pub fn samples_mean_rms(samples: &[IqSampleDecoded]) -> (f32, f32) {
    if samples.is_empty() {
        return (0.0, 0.0);
    }
    let mut sum = 0.0_f32;
    let mut sum_sqr = 0.0_f32;
    for &sample in samples {
        sum += sample;
        sum_sqr += sample * sample;
    }
    let n = samples.len() as f32;
    (sum / n, (sum_sqr / n).sqrt())
}
