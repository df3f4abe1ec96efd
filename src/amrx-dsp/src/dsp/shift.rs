// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use crate::{BlockProcessor, IqSample};

/// Frequency shift by exactly a quarter of the sample rate.
///
/// Multiplying by `j^n` (up) or `(-j)^n` (down) only swaps and negates the
/// I/Q components, so the shift is exact.
#[derive(Debug, Clone)]
pub struct QuarterShifter {
    up: bool,
    /// Rotation index `n mod 4` of the next sample.
    index: u8,
}

impl QuarterShifter {
    /// Shift by `+Fs/4`.
    pub fn up() -> Self {
        Self { up: true, index: 0 }
    }

    /// Shift by `-Fs/4`.
    pub fn down() -> Self {
        Self {
            up: false,
            index: 0,
        }
    }

    pub fn is_up(&self) -> bool {
        self.up
    }

    #[inline]
    fn rotate(&self, x: IqSample) -> IqSample {
        // Down is the conjugate rotation, i.e. index 1 and 3 swapped.
        let quadrant = if self.up {
            self.index
        } else {
            (4 - self.index) & 3
        };
        match quadrant {
            0 => x,
            1 => IqSample::new(-x.im, x.re),
            2 => -x,
            _ => IqSample::new(x.im, -x.re),
        }
    }
}

impl BlockProcessor for QuarterShifter {
    type Input = IqSample;
    type Output = IqSample;

    fn process_into(&mut self, input: &[IqSample], output: &mut Vec<IqSample>) {
        output.clear();
        output.reserve(input.len());
        for &x in input {
            output.push(self.rotate(x));
            self.index = (self.index + 1) & 3;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::test_util::{assert_approx_eq, assert_streaming_equivalent, test_iq};
    use std::f64::consts::PI;

    #[test]
    fn test_up_sequence() {
        let one = IqSample::new(1.0, 0.0);
        let out = QuarterShifter::up().process(&[one; 5]);
        assert_eq!(
            out,
            vec![
                IqSample::new(1.0, 0.0),
                IqSample::new(0.0, 1.0),
                IqSample::new(-1.0, 0.0),
                IqSample::new(0.0, -1.0),
                IqSample::new(1.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_down_sequence() {
        let one = IqSample::new(1.0, 0.0);
        let out = QuarterShifter::down().process(&[one; 4]);
        assert_eq!(
            out,
            vec![
                IqSample::new(1.0, 0.0),
                IqSample::new(0.0, -1.0),
                IqSample::new(-1.0, 0.0),
                IqSample::new(0.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_up_then_down_is_identity() {
        let input = test_iq(37);
        let mut up = QuarterShifter::up();
        let mut down = QuarterShifter::down();
        let mut restored = Vec::new();
        for chunk in input.chunks(5) {
            restored.extend(down.process(&up.process(chunk)));
        }
        assert_eq!(restored, input);
    }

    #[test]
    fn test_shifts_tone_by_quarter_rate() {
        let freq = 0.1;
        let input: Vec<IqSample> = (0..64)
            .map(|n| IqSample::from_polar(1.0, (2.0 * PI * freq * n as f64) as f32))
            .collect();
        let out = QuarterShifter::up().process(&input);
        for (n, y) in out.iter().enumerate() {
            let phase = 2.0 * PI * (freq + 0.25) * n as f64;
            assert_approx_eq(y.re as f64, phase.cos(), 1e-4, &format!("re {n}"));
            assert_approx_eq(y.im as f64, phase.sin(), 1e-4, &format!("im {n}"));
        }
    }

    #[test]
    fn test_streaming_equivalence() {
        let input = test_iq(23);
        let splits: Vec<usize> = (0..=23).collect();
        assert_streaming_equivalent(QuarterShifter::up, &input, &splits);
        assert_streaming_equivalent(QuarterShifter::down, &input, &splits);
    }
}
