// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

mod am;
mod dsb;

pub use am::demodulate_am;
pub use dsb::demodulate_dsb;

use crate::{IqSample, IqSampleDecoded, ModType};

/// Selects the detector for an amplitude-family mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detector {
    /// AM: magnitude of IQ.
    Envelope,
    /// DSB, USB, LSB and CW: in-phase component. Sideband selection happens
    /// upstream.
    InPhase,
}

impl Detector {
    /// # Panics
    /// On FM and NBFM, which this decoder never demodulates.
    pub fn for_mode(mode: ModType) -> Self {
        match mode {
            ModType::Am => Self::Envelope,
            ModType::Dsb | ModType::Usb | ModType::Lsb | ModType::Cw => Self::InPhase,
            ModType::Fm | ModType::Nbfm => {
                panic!("{mode} must be handled by the FM decoder, not the AM decoder")
            }
        }
    }

    /// Demodulate `samples` into `out`, replacing its contents.
    pub fn demodulate(self, samples: &[IqSample], out: &mut Vec<IqSampleDecoded>) {
        match self {
            Self::Envelope => demodulate_am(samples, out),
            Self::InPhase => demodulate_dsb(samples, out),
        }
    }
}
