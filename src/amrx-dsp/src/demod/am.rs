// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use crate::{IqSample, IqSampleDecoded};

/// AM envelope detector: magnitude of IQ.
pub fn demodulate_am(samples: &[IqSample], out: &mut Vec<IqSampleDecoded>) {
    out.clear();
    out.extend(
        samples
            .iter()
            .map(|sample| (sample.re * sample.re + sample.im * sample.im).sqrt()),
    );
}
