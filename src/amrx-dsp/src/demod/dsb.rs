// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use crate::{IqSample, IqSampleDecoded};

/// Product detector for a carrier already at 0 Hz: take the real part.
pub fn demodulate_dsb(samples: &[IqSample], out: &mut Vec<IqSampleDecoded>) {
    out.clear();
    out.extend(samples.iter().map(|sample| sample.re));
}

#[cfg(test)]
mod tests {
    use super::demodulate_dsb;
    use crate::IqSample;

    #[test]
    fn test_dsb_takes_real_part() {
        let input = vec![
            IqSample::new(0.5, 0.9),
            IqSample::new(-0.25, -1.0),
            IqSample::new(0.0, 0.3),
        ];
        let mut out = Vec::new();
        demodulate_dsb(&input, &mut out);
        assert_eq!(out, vec![0.5, -0.25, 0.0]);
    }

    #[test]
    fn test_dsb_constant_carrier() {
        let mut out = Vec::new();
        demodulate_dsb(&[IqSample::new(0.8, 0.0); 5], &mut out);
        assert_eq!(out, vec![0.8; 5]);
    }
}
