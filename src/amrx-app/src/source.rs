// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::io::{ErrorKind, Read};

use amrx_dsp::IqSample;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Raw interleaved I/Q sample encodings, all little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IqFormat {
    /// Unsigned 8-bit, as produced by rtl_sdr.
    #[default]
    Cu8,
    /// Signed 8-bit.
    Cs8,
    /// Signed 16-bit.
    Cs16,
    /// 32-bit float.
    Cf32,
}

impl IqFormat {
    /// Size of one complex sample in bytes.
    pub fn bytes_per_sample(self) -> usize {
        match self {
            IqFormat::Cu8 | IqFormat::Cs8 => 2,
            IqFormat::Cs16 => 4,
            IqFormat::Cf32 => 8,
        }
    }
}

/// Source of IF samples for the decode loop.
pub trait IqSource {
    /// Read the next block of IQ samples into `buf`.
    /// Returns the number of samples written (0 at end of stream), or an
    /// error string.
    fn read_into(&mut self, buf: &mut [IqSample]) -> Result<usize, String>;
}

/// IQ source decoding raw samples from any byte stream (file, stdin).
pub struct ReaderIqSource<R> {
    reader: R,
    format: IqFormat,
    bytes: Vec<u8>,
}

impl<R: Read> ReaderIqSource<R> {
    pub fn new(reader: R, format: IqFormat) -> Self {
        Self {
            reader,
            format,
            bytes: Vec::new(),
        }
    }

    pub fn format(&self) -> IqFormat {
        self.format
    }

    /// Fill `self.bytes` as far as the stream allows. Returns the number of
    /// bytes read; less than requested only at end of stream.
    fn fill(&mut self, wanted: usize) -> Result<usize, String> {
        self.bytes.resize(wanted, 0);
        let mut filled = 0;
        while filled < wanted {
            match self.reader.read(&mut self.bytes[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(format!("IQ read failed: {}", e)),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> IqSource for ReaderIqSource<R> {
    fn read_into(&mut self, buf: &mut [IqSample]) -> Result<usize, String> {
        let bps = self.format.bytes_per_sample();
        let filled = self.fill(buf.len() * bps)?;
        // A trailing partial sample at end of stream is dropped.
        let count = filled / bps;
        convert_bytes_to_complex(self.format, &self.bytes[..count * bps], &mut buf[..count]);
        Ok(count)
    }
}

/// Decode `bytes` into `out`; `out.len()` samples are written.
fn convert_bytes_to_complex(format: IqFormat, bytes: &[u8], out: &mut [IqSample]) {
    let chunks = bytes.chunks_exact(format.bytes_per_sample());
    match format {
        IqFormat::Cu8 => {
            for (sample, c) in out.iter_mut().zip(chunks) {
                *sample =
                    IqSample::new((c[0] as f32 - 127.5) / 128.0, (c[1] as f32 - 127.5) / 128.0);
            }
        }
        IqFormat::Cs8 => {
            for (sample, c) in out.iter_mut().zip(chunks) {
                *sample = IqSample::new((c[0] as i8) as f32 / 128.0, (c[1] as i8) as f32 / 128.0);
            }
        }
        IqFormat::Cs16 => {
            for (sample, c) in out.iter_mut().zip(chunks) {
                *sample = IqSample::new(
                    i16::from_le_bytes([c[0], c[1]]) as f32 / 32768.0,
                    i16::from_le_bytes([c[2], c[3]]) as f32 / 32768.0,
                );
            }
        }
        IqFormat::Cf32 => {
            for (sample, c) in out.iter_mut().zip(chunks) {
                *sample = IqSample::new(
                    f32::from_le_bytes([c[0], c[1], c[2], c[3]]),
                    f32::from_le_bytes([c[4], c[5], c[6], c[7]]),
                );
            }
        }
    }
}
