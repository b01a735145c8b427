//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::engine::{
    ClipPolicy, ConvertOptions, IrProcessor, OfflineOptions, ResampleQuality, ResampledAsset,
};

/// Print the metadata of an impulse response.
pub fn probe(path: &str, json: bool) -> Result<()> {
    info!("Probing: {}", path);

    let session = IrProcessor::new()
        .probe(path)
        .with_context(|| format!("probing {}", path))?;
    let metadata = *session.metadata();
    session.close();

    if json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
    } else {
        let (channels, frames, sample_rate, format) = metadata.to_tuple();
        println!("Channels:    {}", channels);
        println!("Frames:      {}", frames);
        println!("Sample rate: {} Hz", sample_rate);
        println!("Format:      0x{:06x}", format);
    }

    Ok(())
}

/// Samples file written by `convert --output`.
#[derive(Serialize)]
struct ConvertedSamples<'a> {
    source: &'a str,
    sample_rate: u32,
    channels: usize,
    options: ConvertOptions,
    samples: &'a [i32],
}

/// Decode an impulse response to fixed point at `rate`.
pub fn convert(
    path: &str,
    rate: u32,
    quality: ResampleQuality,
    clip: ClipPolicy,
    output: Option<&Path>,
) -> Result<()> {
    info!("Converting {} to {} Hz", path, rate);

    let processor = IrProcessor::new();
    let options = ConvertOptions::new(quality, clip);

    let session = processor
        .probe(path)
        .with_context(|| format!("probing {}", path))?;
    let channels = session.metadata().channel_count();
    let samples = processor
        .read_and_convert(session, rate, &options)
        .with_context(|| format!("converting {} to {} Hz", path, rate))?;

    let peak = samples.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
    println!(
        "{} samples ({} frames x {} channels), peak {}",
        samples.len(),
        samples.len() / channels,
        channels,
        peak
    );

    if let Some(output) = output {
        let record = ConvertedSamples {
            source: path,
            sample_rate: rate,
            channels,
            options,
            samples: &samples,
        };
        let json = serde_json::to_string(&record)?;
        fs::write(output, json).with_context(|| format!("writing {}", output.display()))?;
        println!("Samples written to {}", output.display());
    }

    Ok(())
}

/// Write a `rate` copy of `directory/filename`.
pub fn resample(
    directory: &str,
    filename: &str,
    rate: u32,
    quality: ResampleQuality,
    reuse: bool,
) -> Result<PathBuf> {
    if reuse {
        let asset = ResampledAsset::locate(directory, filename, rate);
        if asset.exists() {
            info!("Reusing {}", asset.path().display());
            println!("Already converted: {}", asset.path().display());
            return Ok(asset.into_path());
        }
    }

    info!("Resampling {} in {} to {} Hz", filename, directory, rate);

    let path = IrProcessor::new()
        .offline_resample(
            directory,
            filename,
            rate,
            &OfflineOptions::with_quality(quality),
        )
        .with_context(|| format!("resampling {} to {} Hz", filename, rate))?;

    println!("Written: {}", path.display());
    Ok(path)
}
