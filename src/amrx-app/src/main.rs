// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

mod config;
mod logging;
mod sink;
mod source;

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{debug, info, warn};

use amrx_dsp::decoder::SAMPLE_RATE_PCM;
use amrx_dsp::dsp::design;
use amrx_dsp::{AmDecoder, BlockProcessor, IqSample, ModType};

use config::{AppConfig, ConfigFile};
use logging::init_logging;
use sink::{PcmFormat, PcmSink};
use source::{IqFormat, IqSource, ReaderIqSource};

pub type DynResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const PKG_DESCRIPTION: &str = concat!(env!("CARGO_PKG_NAME"), " - AM/DSB/SSB/CW IQ decoder");

#[derive(Debug, Parser)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = PKG_DESCRIPTION,
)]
struct Cli {
    /// Path to configuration file
    #[arg(long = "config", short = 'C', value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print example configuration and exit
    #[arg(long = "print-config")]
    print_config: bool,
    /// Demodulation mode (AM, DSB, USB, LSB, CW)
    #[arg(short = 'm', long = "mode")]
    mode: Option<ModType>,
    /// IF sample rate in Hz
    #[arg(short = 'r', long = "rate")]
    rate: Option<f64>,
    /// Raw IQ sample format
    #[arg(short = 'f', long = "format", value_enum)]
    format: Option<IqFormat>,
    /// IQ input file ("-" for stdin)
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    input: Option<PathBuf>,
    /// PCM output file ("-" for stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,
    /// PCM output format
    #[arg(long = "pcm-format", value_enum)]
    pcm_format: Option<PcmFormat>,
    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long = "log-level")]
    log_level: Option<String>,
}

/// CLI flags override values from the config file.
fn apply_cli(cli: &Cli, cfg: &mut AppConfig) {
    if let Some(mode) = cli.mode {
        cfg.decoder.mode = mode;
    }
    if let Some(rate) = cli.rate {
        cfg.input.sample_rate = rate;
    }
    if let Some(format) = cli.format {
        cfg.input.format = format;
    }
    if let Some(ref input) = cli.input {
        cfg.input.path = Some(input.clone());
    }
    if let Some(ref output) = cli.output {
        cfg.output.path = Some(output.clone());
    }
    if let Some(format) = cli.pcm_format {
        cfg.output.format = format;
    }
    if let Some(ref level) = cli.log_level {
        cfg.general.log_level = Some(level.clone());
    }
}

/// `None` and `-` both mean the standard stream.
fn named_path(path: Option<&PathBuf>) -> Option<&Path> {
    path.map(PathBuf::as_path).filter(|p| *p != Path::new("-"))
}

fn open_input(path: Option<&PathBuf>) -> DynResult<Box<dyn Read>> {
    Ok(match named_path(path) {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| format!("Failed to open IQ input {}: {}", path.display(), e))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(std::io::stdin().lock()),
    })
}

fn open_output(path: Option<&PathBuf>) -> DynResult<Box<dyn Write>> {
    Ok(match named_path(path) {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| format!("Failed to create PCM output {}: {}", path.display(), e))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    })
}

fn run(cfg: &AppConfig) -> DynResult<()> {
    let mode = cfg.decoder.mode;
    let sample_rate = cfg.input.sample_rate;

    let mut source = ReaderIqSource::new(open_input(cfg.input.path.as_ref())?, cfg.input.format);
    let mut sink = PcmSink::new(open_output(cfg.output.path.as_ref())?, cfg.output.format);

    let coeff = design::narrow_if(mode, cfg.decoder.if_bandwidth_hz, cfg.decoder.fir_taps);
    let mut decoder = AmDecoder::new(sample_rate, coeff, mode);

    info!(
        "Decoding {} ({:?} IQ at {} Hz) to mono {:?} PCM at {} Hz",
        mode,
        source.format(),
        sample_rate,
        cfg.output.format,
        SAMPLE_RATE_PCM
    );

    let mut iq = vec![IqSample::new(0.0, 0.0); cfg.input.block_size];
    let mut audio = Vec::new();
    let report_every = (sample_rate.round() as u64).max(1);
    let mut next_report = report_every;
    let mut consumed: u64 = 0;

    loop {
        let n = source.read_into(&mut iq)?;
        if n == 0 {
            break;
        }
        consumed += n as u64;

        decoder.process_into(&iq[..n], &mut audio);
        if !audio.is_empty() {
            match sink.write(&audio) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    warn!("PCM output closed, stopping");
                    break;
                }
                Err(e) => return Err(format!("PCM write failed: {}", e).into()),
            }
        }

        if consumed >= next_report {
            debug!(
                "{:.1} s in: IF level {:.4}, baseband mean {:.4}, baseband level {:.4}",
                consumed as f64 / sample_rate,
                decoder.if_level(),
                decoder.baseband_mean(),
                decoder.baseband_level()
            );
            next_report += report_every;
        }
    }

    match sink.flush() {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
        Err(e) => return Err(format!("PCM flush failed: {}", e).into()),
    }

    info!(
        "Done: {} IQ samples ({:.1} s) in, {} audio samples out",
        consumed,
        consumed as f64 / sample_rate,
        sink.samples_written()
    );
    Ok(())
}

fn main() -> DynResult<()> {
    let cli = Cli::parse();

    if cli.print_config {
        println!("{}", AppConfig::example_toml());
        return Ok(());
    }

    let (mut cfg, config_path) = if let Some(ref path) = cli.config {
        let cfg = AppConfig::load_from_file(path)?;
        (cfg, Some(path.clone()))
    } else {
        AppConfig::load_from_default_paths()?
    };
    apply_cli(&cli, &mut cfg);
    cfg.validate()
        .map_err(|e| format!("Invalid configuration: {}", e))?;

    init_logging(cfg.general.log_level.as_deref());

    if let Some(ref path) = config_path {
        info!("Loaded configuration from {}", path.display());
    }

    run(&cfg)
}
