// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Modulation type as known to the surrounding receiver.
///
/// FM and NBFM belong to a different decoder; [`crate::AmDecoder`] refuses them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModType {
    Fm,
    Nbfm,
    #[default]
    Am,
    Dsb,
    Usb,
    Lsb,
    Cw,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModeError {
    #[error("unknown modulation type '{0}' (expected one of: AM, DSB, USB, LSB, CW, FM, NBFM)")]
    Unknown(String),

    #[error("{0} is not handled by the AM decoder")]
    NotAmplitude(ModType),
}

impl ModType {
    pub const AMPLITUDE: [ModType; 5] = [
        ModType::Am,
        ModType::Dsb,
        ModType::Usb,
        ModType::Lsb,
        ModType::Cw,
    ];

    /// True for the modes the AM decoder can demodulate.
    pub fn is_amplitude(self) -> bool {
        !matches!(self, ModType::Fm | ModType::Nbfm)
    }

    /// Single sideband or CW, i.e. the modes that use the lower AGC references.
    pub fn is_narrow(self) -> bool {
        matches!(self, ModType::Usb | ModType::Lsb | ModType::Cw)
    }

    pub fn ensure_amplitude(self) -> Result<Self, ModeError> {
        if self.is_amplitude() {
            Ok(self)
        } else {
            Err(ModeError::NotAmplitude(self))
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModType::Fm => "FM",
            ModType::Nbfm => "NBFM",
            ModType::Am => "AM",
            ModType::Dsb => "DSB",
            ModType::Usb => "USB",
            ModType::Lsb => "LSB",
            ModType::Cw => "CW",
        }
    }
}

impl fmt::Display for ModType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModType {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FM" => Ok(ModType::Fm),
            "NBFM" => Ok(ModType::Nbfm),
            "AM" => Ok(ModType::Am),
            "DSB" => Ok(ModType::Dsb),
            "USB" => Ok(ModType::Usb),
            "LSB" => Ok(ModType::Lsb),
            "CW" => Ok(ModType::Cw),
            _ => Err(ModeError::Unknown(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("usb".parse::<ModType>(), Ok(ModType::Usb));
        assert_eq!(" Cw ".parse::<ModType>(), Ok(ModType::Cw));
        assert_eq!("NBFM".parse::<ModType>(), Ok(ModType::Nbfm));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            "WFM".parse::<ModType>(),
            Err(ModeError::Unknown("WFM".to_string()))
        );
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for mode in ModType::AMPLITUDE {
            assert_eq!(mode.to_string().parse::<ModType>(), Ok(mode));
        }
    }

    #[test]
    fn test_fm_is_not_amplitude() {
        assert!(!ModType::Fm.is_amplitude());
        assert!(!ModType::Nbfm.is_amplitude());
        assert_eq!(
            ModType::Fm.ensure_amplitude(),
            Err(ModeError::NotAmplitude(ModType::Fm))
        );
        for mode in ModType::AMPLITUDE {
            assert!(mode.is_amplitude());
        }
    }

    #[test]
    fn test_narrow_modes() {
        assert!(ModType::Usb.is_narrow());
        assert!(ModType::Lsb.is_narrow());
        assert!(ModType::Cw.is_narrow());
        assert!(!ModType::Am.is_narrow());
        assert!(!ModType::Dsb.is_narrow());
    }
}
