// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Per-mode AM/DSB/SSB/CW decode pipeline.

use crate::agc::{AfAgc, IfAgc};
use crate::demod::Detector;
use crate::dsp::{
    design, rms_level_approx, samples_mean_rms, AudioResampler, FirFilter, HighPassFilterIir,
    IfResampler, LowPassFilterFirIq, LowPassFilterRc, QuarterShifter,
};
use crate::{BlockProcessor, IqSample, IqSampleDecoded, ModType, Sample};

/// Output audio sample rate.
pub const SAMPLE_RATE_PCM: f64 = 48_000.0;
/// Rate of the narrow filter and every stage up to the audio resampler.
pub const INTERNAL_RATE_PCM: f64 = 12_000.0;
/// Rate of the CW band filter. The 500 Hz pitch is a quarter of it.
pub const CW_RATE_PCM: f64 = 2_000.0;
/// De-emphasis time constant in microseconds.
pub const DEFAULT_DEEMPHASIS_US: f64 = 100.0;
/// DC blocker cutoff at the internal rate.
pub const DC_BLOCK_CUTOFF_HZ: f64 = 60.0;

/// Weight of the previous value in the baseband level trackers.
const LEVEL_SMOOTHING: f32 = 0.95;

/// Mode-dependent frequency routing between the narrow filter and the IF AGC.
#[derive(Debug, Clone)]
enum Route {
    /// AM and DSB: no routing.
    Direct,
    /// USB (up, filter, down) and LSB (down, filter, up).
    Sideband {
        first: QuarterShifter,
        filter: FirFilter<IqSample, f32>,
        second: QuarterShifter,
    },
    Cw {
        downsampler: IfResampler,
        filter: FirFilter<IqSample, f32>,
        pitch: QuarterShifter,
        upsampler: IfResampler,
    },
}

impl Route {
    fn for_mode(mode: ModType) -> Self {
        match mode {
            ModType::Usb => Self::Sideband {
                first: QuarterShifter::up(),
                filter: FirFilter::new(design::ssb_shifted_audio(), 1),
                second: QuarterShifter::down(),
            },
            ModType::Lsb => Self::Sideband {
                first: QuarterShifter::down(),
                filter: FirFilter::new(design::ssb_shifted_audio(), 1),
                second: QuarterShifter::up(),
            },
            ModType::Cw => Self::Cw {
                downsampler: IfResampler::new(INTERNAL_RATE_PCM, CW_RATE_PCM),
                filter: FirFilter::new(design::cw_band(), 1),
                pitch: QuarterShifter::up(),
                upsampler: IfResampler::new(CW_RATE_PCM, INTERNAL_RATE_PCM),
            },
            _ => Self::Direct,
        }
    }
}

/// Streaming decoder for the amplitude-modulation family.
///
/// Each [`BlockProcessor::process_into`] call runs one block of IF samples
/// through the stages fixed by the mode at construction. An empty output
/// means a rate-changing stage has not accumulated a full sample yet; all
/// state has still advanced and the next call continues seamlessly.
#[derive(Debug, Clone)]
pub struct AmDecoder {
    sample_rate_demod: f64,
    mode: ModType,
    detector: Detector,

    if_resampler: Option<IfResampler>,
    am_filter: LowPassFilterFirIq,
    route: Route,
    if_agc: IfAgc,
    dc_block: HighPassFilterIir,
    audio_resampler: AudioResampler,
    af_agc: AfAgc,
    deemph: LowPassFilterRc,

    if_level: f32,
    baseband_mean: f32,
    baseband_level: f32,

    buf_resampled: Vec<IqSample>,
    buf_filtered: Vec<IqSample>,
    buf_filtered2a: Vec<IqSample>,
    buf_filtered2b: Vec<IqSample>,
    buf_filtered2c: Vec<IqSample>,
    buf_filtered3: Vec<IqSample>,
    buf_filtered4: Vec<IqSample>,
    buf_decoded: Vec<IqSampleDecoded>,
    buf_baseband_demod: Vec<Sample>,
    buf_baseband_preagc: Vec<Sample>,
    buf_baseband: Vec<Sample>,
}

impl AmDecoder {
    /// Build a decoder for IF samples at `sample_rate_demod`.
    ///
    /// `amfilter_coeff` are the symmetric taps of the narrow IF filter, which
    /// runs at [`INTERNAL_RATE_PCM`].
    ///
    /// # Panics
    /// On FM or NBFM, on a non-positive sample rate, or on empty coefficients.
    pub fn new(sample_rate_demod: f64, amfilter_coeff: Vec<f32>, mode: ModType) -> Self {
        let detector = Detector::for_mode(mode);
        assert!(
            sample_rate_demod.is_finite() && sample_rate_demod > 0.0,
            "demodulator sample rate must be positive, got {sample_rate_demod}"
        );

        let if_resampler = (sample_rate_demod != INTERNAL_RATE_PCM)
            .then(|| IfResampler::new(sample_rate_demod, INTERNAL_RATE_PCM));
        let taps = amfilter_coeff.len();

        // SSB and CW run at a lower level than AM/DSB on both AGC stages.
        let (if_reference, af_reference) = if mode.is_narrow() {
            (0.25, 0.1)
        } else {
            (0.7, 0.2)
        };

        tracing::debug!(
            "AmDecoder: mode {}, IF rate {} Hz, internal rate {} Hz, output rate {} Hz, {} IF taps, IF resampler {}",
            mode,
            sample_rate_demod,
            INTERNAL_RATE_PCM,
            SAMPLE_RATE_PCM,
            taps,
            if if_resampler.is_some() { "on" } else { "off" }
        );

        Self {
            sample_rate_demod,
            mode,
            detector,
            if_resampler,
            am_filter: LowPassFilterFirIq::new(amfilter_coeff, 1),
            route: Route::for_mode(mode),
            if_agc: IfAgc::new(1.0, 100_000.0, if_reference, 0.001),
            dc_block: HighPassFilterIir::new(DC_BLOCK_CUTOFF_HZ / INTERNAL_RATE_PCM),
            audio_resampler: AudioResampler::new(INTERNAL_RATE_PCM, SAMPLE_RATE_PCM),
            // Mostly a peak limiter.
            af_agc: AfAgc::new(0.0001, 1.5, af_reference, 0.002),
            deemph: LowPassFilterRc::new(DEFAULT_DEEMPHASIS_US * 1.0e-6 * SAMPLE_RATE_PCM),
            if_level: 0.0,
            baseband_mean: 0.0,
            baseband_level: 0.0,
            buf_resampled: Vec::new(),
            buf_filtered: Vec::new(),
            buf_filtered2a: Vec::new(),
            buf_filtered2b: Vec::new(),
            buf_filtered2c: Vec::new(),
            buf_filtered3: Vec::new(),
            buf_filtered4: Vec::new(),
            buf_decoded: Vec::new(),
            buf_baseband_demod: Vec::new(),
            buf_baseband_preagc: Vec::new(),
            buf_baseband: Vec::new(),
        }
    }

    /// Build a decoder with the mode's default narrow IF filter.
    pub fn with_default_filter(sample_rate_demod: f64, mode: ModType) -> Self {
        let coeff = design::narrow_if(mode, None, design::DEFAULT_IF_TAPS);
        Self::new(sample_rate_demod, coeff, mode)
    }

    pub fn mode(&self) -> ModType {
        self.mode
    }

    pub fn sample_rate_demod(&self) -> f64 {
        self.sample_rate_demod
    }

    /// Approximate RMS level of the routed IF signal in the latest block
    /// that reached the IF AGC.
    pub fn if_level(&self) -> f32 {
        self.if_level
    }

    /// Smoothed mean of the demodulated signal.
    pub fn baseband_mean(&self) -> f32 {
        self.baseband_mean
    }

    /// Smoothed RMS of the demodulated signal.
    pub fn baseband_level(&self) -> f32 {
        self.baseband_level
    }
}

impl BlockProcessor for AmDecoder {
    type Input = IqSample;
    type Output = Sample;

    fn process_into(&mut self, samples_in: &[IqSample], audio: &mut Vec<Sample>) {
        audio.clear();

        let samples: &[IqSample] = match self.if_resampler.as_mut() {
            Some(resampler) => {
                resampler.process_into(samples_in, &mut self.buf_resampled);
                if self.buf_resampled.is_empty() {
                    tracing::trace!("AmDecoder: IF resampler not ready");
                    return;
                }
                &self.buf_resampled
            }
            None => samples_in,
        };

        self.am_filter.process_into(samples, &mut self.buf_filtered);

        match &mut self.route {
            Route::Direct => std::mem::swap(&mut self.buf_filtered, &mut self.buf_filtered3),
            Route::Sideband {
                first,
                filter,
                second,
            } => {
                first.process_into(&self.buf_filtered, &mut self.buf_filtered2a);
                filter.process_into(&self.buf_filtered2a, &mut self.buf_filtered2b);
                second.process_into(&self.buf_filtered2b, &mut self.buf_filtered3);
            }
            Route::Cw {
                downsampler,
                filter,
                pitch,
                upsampler,
            } => {
                downsampler.process_into(&self.buf_filtered, &mut self.buf_filtered2a);
                if self.buf_filtered2a.is_empty() {
                    tracing::trace!("AmDecoder: CW downsampler not ready");
                    return;
                }
                filter.process_into(&self.buf_filtered2a, &mut self.buf_filtered2b);
                pitch.process_into(&self.buf_filtered2b, &mut self.buf_filtered2c);
                upsampler.process_into(&self.buf_filtered2c, &mut self.buf_filtered3);
                if self.buf_filtered3.is_empty() {
                    tracing::trace!("AmDecoder: CW upsampler not ready");
                    return;
                }
            }
        }

        self.if_level = rms_level_approx(&self.buf_filtered3);

        self.if_agc
            .process_into(&self.buf_filtered3, &mut self.buf_filtered4);

        self.detector
            .demodulate(&self.buf_filtered4, &mut self.buf_decoded);
        if self.buf_decoded.is_empty() {
            return;
        }

        self.buf_baseband_demod.clear();
        self.buf_baseband_demod
            .extend(self.buf_decoded.iter().map(|&x| Sample::from(x)));

        self.dc_block.process_inplace(&mut self.buf_baseband_demod);

        self.audio_resampler
            .process_into(&self.buf_baseband_demod, &mut self.buf_baseband_preagc);
        if self.buf_baseband_preagc.is_empty() {
            tracing::trace!("AmDecoder: audio resampler not ready");
            return;
        }

        self.af_agc
            .process_into(&self.buf_baseband_preagc, &mut self.buf_baseband);

        let (mean, rms) = samples_mean_rms(&self.buf_decoded);
        self.baseband_mean = LEVEL_SMOOTHING * self.baseband_mean + (1.0 - LEVEL_SMOOTHING) * mean;
        self.baseband_level = LEVEL_SMOOTHING * self.baseband_level + (1.0 - LEVEL_SMOOTHING) * rms;

        self.deemph.process_inplace(&mut self.buf_baseband);

        std::mem::swap(audio, &mut self.buf_baseband);
    }
}
