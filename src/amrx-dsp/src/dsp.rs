// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Filtering and rate-conversion building blocks used by the decoder.

pub mod design;
pub mod fir;
pub mod iir;
pub mod level;
pub mod resample;
pub mod shift;

pub use fir::{FirFilter, LowPassFilterFirAudio, LowPassFilterFirIq};
pub use iir::{BiquadIirFilter, FirstOrderIirFilter, HighPassFilterIir, LowPassFilterRc};
pub use level::{rms_level_approx, samples_mean_rms};
pub use resample::{AudioResampler, IfResampler, Resampler};
pub use shift::QuarterShifter;
