// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Configuration for the `amrx` command.
//!
//! Read from the `[amrx]` section of `amrx.toml`, searched in the current
//! directory, then the XDG config directory, then `/etc/amrx/`.

use std::path::{Path, PathBuf};

use amrx_dsp::decoder::INTERNAL_RATE_PCM;
use amrx_dsp::dsp::design::DEFAULT_IF_TAPS;
use amrx_dsp::ModType;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sink::PcmFormat;
use crate::source::IqFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(PathBuf, String),

    #[error("Failed to parse config file {0}: {1}")]
    ParseError(PathBuf, String),
}

/// Returns the default search paths for `amrx.toml`
/// (current directory → XDG config → /etc).
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("amrx.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("amrx").join("amrx.toml"));
    }
    paths.push(PathBuf::from("/etc/amrx/amrx.toml"));
    paths
}

/// Extract and deserialize a named section from a TOML file.
///
/// Returns `Ok(Some(cfg))` when the section is present and parses cleanly,
/// `Ok(None)` when the section is absent, or `Err` on I/O / parse failure.
fn load_section_from_file<T: DeserializeOwned>(
    path: &Path,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;

    let table: toml::Table = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;

    let Some(section) = table.get(key) else {
        return Ok(None);
    };

    // Re-serialize the section then parse as T so all serde defaults apply.
    let section_toml = toml::to_string(section)
        .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
    let cfg = toml::from_str::<T>(&section_toml)
        .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
    Ok(Some(cfg))
}

/// Trait for loading configuration from an `amrx.toml` section.
pub trait ConfigFile: Sized + Default + DeserializeOwned {
    /// Section key in `amrx.toml`.
    fn section_key() -> &'static str;

    /// Load the section from a specific file path.
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// does not contain the expected `[<section_key>]` header.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        load_section_from_file::<Self>(path, Self::section_key())?.ok_or_else(|| {
            ConfigError::ParseError(
                path.to_path_buf(),
                format!("missing [{}] section", Self::section_key()),
            )
        })
    }

    /// Search default paths and load the first file that contains the
    /// expected section.
    ///
    /// Returns `(config, path_where_found)` or `(Default::default(), None)`
    /// when no config file is found.
    fn load_from_default_paths() -> Result<(Self, Option<PathBuf>), ConfigError> {
        for path in config_search_paths() {
            if path.exists() {
                if let Some(cfg) = load_section_from_file::<Self>(&path, Self::section_key())? {
                    return Ok((cfg, Some(path)));
                }
            }
        }
        Ok((Self::default(), None))
    }
}

/// Top-level `[amrx]` configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub input: InputConfig,
    pub decoder: DecoderConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: Option<String>,
}

/// IQ input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// IQ file to read; stdin when absent.
    pub path: Option<PathBuf>,
    /// Raw sample encoding.
    pub format: IqFormat,
    /// IF sample rate in Hz.
    pub sample_rate: f64,
    /// IQ samples per decode call.
    pub block_size: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: None,
            format: IqFormat::Cu8,
            sample_rate: 48_000.0,
            block_size: 4_096,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Demodulation mode (AM, DSB, USB, LSB, CW).
    pub mode: ModType,
    /// Two-sided narrow IF bandwidth in Hz; mode default when absent.
    pub if_bandwidth_hz: Option<f64>,
    /// Narrow IF filter length (odd).
    pub fir_taps: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            mode: ModType::Am,
            if_bandwidth_hz: None,
            fir_taps: DEFAULT_IF_TAPS,
        }
    }
}

/// PCM output settings. Audio is always mono at 48 kHz.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File to write; stdout when absent.
    pub path: Option<PathBuf>,
    pub format: PcmFormat,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_log_level(self.general.log_level.as_deref())?;

        if !(self.input.sample_rate.is_finite() && self.input.sample_rate > 0.0) {
            return Err("[input].sample_rate must be > 0".to_string());
        }
        if self.input.block_size == 0 {
            return Err("[input].block_size must be > 0".to_string());
        }

        self.decoder
            .mode
            .ensure_amplitude()
            .map_err(|e| format!("[decoder].mode: {}", e))?;
        if self.decoder.fir_taps < 3 || self.decoder.fir_taps % 2 == 0 {
            return Err(format!(
                "[decoder].fir_taps must be odd and >= 3 (got {})",
                self.decoder.fir_taps
            ));
        }
        if let Some(bw) = self.decoder.if_bandwidth_hz {
            if !(bw > 0.0 && bw <= INTERNAL_RATE_PCM) {
                return Err(format!(
                    "[decoder].if_bandwidth_hz must be in range (0, {}]",
                    INTERNAL_RATE_PCM
                ));
            }
        }

        Ok(())
    }

    /// Generate an example configuration wrapped under the `[amrx]` section
    /// header.
    pub fn example_toml() -> String {
        #[derive(serde::Serialize)]
        struct Wrapper {
            amrx: AppConfig,
        }
        let example = AppConfig {
            general: GeneralConfig {
                log_level: Some("info".to_string()),
            },
            input: InputConfig {
                path: Some(PathBuf::from("capture.cu8")),
                format: IqFormat::Cu8,
                sample_rate: 48_000.0,
                block_size: 4_096,
            },
            decoder: DecoderConfig {
                mode: ModType::Am,
                if_bandwidth_hz: Some(9_000.0),
                fir_taps: DEFAULT_IF_TAPS,
            },
            output: OutputConfig {
                path: Some(PathBuf::from("audio.f32")),
                format: PcmFormat::F32,
            },
        };
        toml::to_string_pretty(&Wrapper { amrx: example }).unwrap_or_default()
    }
}

impl ConfigFile for AppConfig {
    fn section_key() -> &'static str {
        "amrx"
    }
}

fn validate_log_level(level: Option<&str>) -> Result<(), String> {
    if let Some(level) = level {
        match level {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(format!(
                    "[general].log_level '{}' is invalid (expected one of: trace, debug, info, warn, error)",
                    level
                ))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.general.log_level, None);
        assert_eq!(config.input.path, None);
        assert_eq!(config.input.format, IqFormat::Cu8);
        assert_eq!(config.input.sample_rate, 48_000.0);
        assert_eq!(config.input.block_size, 4_096);
        assert_eq!(config.decoder.mode, ModType::Am);
        assert_eq!(config.decoder.if_bandwidth_hz, None);
        assert_eq!(config.decoder.fir_taps, 63);
        assert_eq!(config.output.format, PcmFormat::F32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml_str = r#"
[input]
format = "cs16"
sample_rate = 240000.0

[decoder]
mode = "USB"
if_bandwidth_hz = 3000.0
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.input.format, IqFormat::Cs16);
        assert_eq!(config.input.sample_rate, 240_000.0);
        assert_eq!(config.input.block_size, 4_096);
        assert_eq!(config.decoder.mode, ModType::Usb);
        assert_eq!(config.decoder.if_bandwidth_hz, Some(3_000.0));
        assert_eq!(config.decoder.fir_taps, 63);
        assert_eq!(config.output.format, PcmFormat::F32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_fm() {
        let mut config = AppConfig::default();
        config.decoder.mode = ModType::Nbfm;
        let err = config.validate().unwrap_err();
        assert!(err.starts_with("[decoder].mode"), "{err}");
    }

    #[test]
    fn test_validate_ranges() {
        let mut config = AppConfig::default();
        config.decoder.fir_taps = 64;
        assert!(config.validate().unwrap_err().contains("fir_taps"));

        let mut config = AppConfig::default();
        config.decoder.fir_taps = 1;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.input.sample_rate = 0.0;
        assert!(config.validate().unwrap_err().contains("sample_rate"));

        let mut config = AppConfig::default();
        config.input.block_size = 0;
        assert!(config.validate().unwrap_err().contains("block_size"));

        let mut config = AppConfig::default();
        config.decoder.if_bandwidth_hz = Some(20_000.0);
        assert!(config.validate().unwrap_err().contains("if_bandwidth_hz"));

        let mut config = AppConfig::default();
        config.general.log_level = Some("loud".to_string());
        assert!(config.validate().unwrap_err().contains("log_level"));
    }

    #[test]
    fn test_example_toml_round_trips() {
        let example = AppConfig::example_toml();
        assert!(example.contains("[amrx.decoder]"));
        let table: toml::Table = toml::from_str(&example).unwrap();
        let section = toml::to_string(&table["amrx"]).unwrap();
        let config: AppConfig = toml::from_str(&section).unwrap();
        assert_eq!(config.decoder.if_bandwidth_hz, Some(9_000.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amrx.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[amrx.decoder]\nmode = \"CW\"\n\n[amrx.output]\nformat = \"s16\""
        )
        .unwrap();

        let config = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(config.decoder.mode, ModType::Cw);
        assert_eq!(config.output.format, PcmFormat::S16);
    }

    #[test]
    fn test_load_from_file_missing_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amrx.toml");
        std::fs::write(&path, "[other]\nkey = 1\n").unwrap();
        let err = AppConfig::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("missing [amrx] section"));
    }

    #[test]
    fn test_load_from_file_bad_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amrx.toml");
        std::fs::write(&path, "[amrx.decoder]\nmode = \"SSTV\"\n").unwrap();
        assert!(matches!(
            AppConfig::load_from_file(&path),
            Err(ConfigError::ParseError(_, _))
        ));
    }
}
