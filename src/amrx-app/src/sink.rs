// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::io::Write;

use amrx_dsp::Sample;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Mono PCM output encodings, all little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PcmFormat {
    #[default]
    F32,
    S16,
}

/// Writes decoded audio blocks to a byte stream.
pub struct PcmSink<W> {
    writer: W,
    format: PcmFormat,
    bytes: Vec<u8>,
    samples_written: u64,
}

impl<W: Write> PcmSink<W> {
    pub fn new(writer: W, format: PcmFormat) -> Self {
        Self {
            writer,
            format,
            bytes: Vec::new(),
            samples_written: 0,
        }
    }

    pub fn write(&mut self, audio: &[Sample]) -> std::io::Result<()> {
        self.bytes.clear();
        match self.format {
            PcmFormat::F32 => {
                for &x in audio {
                    self.bytes.extend_from_slice(&(x as f32).to_le_bytes());
                }
            }
            PcmFormat::S16 => {
                for &x in audio {
                    let v = (x.clamp(-1.0, 1.0) * i16::MAX as f64).round() as i16;
                    self.bytes.extend_from_slice(&v.to_le_bytes());
                }
            }
        }
        self.writer.write_all(&self.bytes)?;
        self.samples_written += audio.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f32_output() {
        let mut sink = PcmSink::new(Vec::new(), PcmFormat::F32);
        sink.write(&[0.5, -0.25]).unwrap();
        assert_eq!(sink.samples_written(), 2);
        let bytes = sink.into_inner();
        let mut expected = 0.5_f32.to_le_bytes().to_vec();
        expected.extend_from_slice(&(-0.25_f32).to_le_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_s16_output_clamps() {
        let mut sink = PcmSink::new(Vec::new(), PcmFormat::S16);
        sink.write(&[1.5, -2.0, 0.0, 0.5]).unwrap();
        let bytes = sink.into_inner();
        let values: Vec<i16> = bytes
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(values, vec![i16::MAX, -i16::MAX, 0, 16384]);
    }

    #[test]
    fn test_empty_block_writes_nothing() {
        let mut sink = PcmSink::new(Vec::new(), PcmFormat::S16);
        sink.write(&[]).unwrap();
        sink.flush().unwrap();
        assert!(sink.into_inner().is_empty());
    }
}
