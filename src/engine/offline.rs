//! Offline Conversion Pipeline
//!
//! Converts an impulse response on disk into a sibling file named
//! `<targetRate>_<filename>`. Nothing here touches session state, so any
//! number of conversions may run side by side.
//!
//! This module never checks whether the output already exists. Callers that
//! want to reuse earlier work look it up with [`ResampledAsset::locate`]
//! before calling [`offline_resample`].

use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::codec::{Codec, FrameWriter, StreamInfo};
use crate::engine::buffer::AudioBuffer;
use crate::engine::probe::open_validated;
use crate::engine::resample::{ResampleEngine, ResampleQuality, ResampleRequest};
use crate::engine::session::read_all;
use crate::error::{IrError, Result};

/// Conversion settings for the on-disk path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OfflineOptions {
    /// Interpolator (default: best sinc)
    pub quality: ResampleQuality,
}

impl OfflineOptions {
    pub fn with_quality(quality: ResampleQuality) -> Self {
        OfflineOptions { quality }
    }
}

// ============================================================================
// Resampled Asset
// ============================================================================

/// Location of a converted copy of an impulse response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResampledAsset {
    path: PathBuf,
    target_rate: u32,
}

impl ResampledAsset {
    /// File name of the converted copy of `filename`
    pub fn file_name(filename: &str, target_rate: u32) -> String {
        format!("{}_{}", target_rate, filename)
    }

    /// Where the `target_rate` copy of `directory/filename` lives
    pub fn locate(directory: impl AsRef<Path>, filename: &str, target_rate: u32) -> Self {
        ResampledAsset {
            path: directory
                .as_ref()
                .join(Self::file_name(filename, target_rate)),
            target_rate,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn target_rate(&self) -> u32 {
        self.target_rate
    }

    /// Whether a file is already present at this location
    ///
    /// No staleness check: an existing file is assumed to match its source.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Convert `directory/filename` to `target_sample_rate` and write the result
/// next to it
///
/// The output keeps the source's channel layout and sample encoding; its
/// declared rate and frame count are the converted ones.
///
/// # Returns
/// * `Ok(PathBuf)` - Path of the written file
///
/// # Errors
/// * `InvalidArgument` - If `directory` or `filename` is empty, `filename` is
///   not a single path component, or the rate is zero
/// * `FileOpenFailure`, `UnsupportedChannelLayout`, `InvalidStreamMetadata` - As for probing
/// * `AllocationFailure`, `ReadFailure`, `ResampleFailure` - As for decoding
/// * `WriteFailure` - If the output cannot be written; a partial file is removed
pub fn offline_resample<C: Codec, E: ResampleEngine>(
    codec: &C,
    engine: &E,
    directory: &str,
    filename: &str,
    target_sample_rate: u32,
    options: &OfflineOptions,
) -> Result<PathBuf> {
    if directory.is_empty() {
        return Err(IrError::invalid_argument("directory is empty"));
    }
    if filename.is_empty() {
        return Err(IrError::invalid_argument("filename is empty"));
    }
    if !is_plain_file_name(filename) {
        return Err(IrError::invalid_argument(format!(
            "filename must be a bare file name, got {}",
            filename
        )));
    }
    if target_sample_rate == 0 {
        return Err(IrError::invalid_argument("target sample rate must be positive"));
    }

    let source_path = Path::new(directory).join(filename);
    let (reader, metadata) = open_validated(codec, &source_path)?;
    let source = read_all(reader, &metadata)?;

    let converted = if metadata.sample_rate() == target_sample_rate {
        debug!(
            "{} is already at {} Hz, copying frames",
            source_path.display(),
            target_sample_rate
        );
        source
    } else {
        let request = ResampleRequest::new(
            metadata.sample_rate(),
            target_sample_rate,
            source.num_frames(),
            source.num_channels(),
            options.quality,
        )?;
        let resampled = engine.resample(&source, &request)?;
        request.check_output(&resampled)?;
        resampled
    };

    let asset = ResampledAsset::locate(directory, filename, target_sample_rate);
    let info = metadata.resampled_info(target_sample_rate, converted.num_frames() as u64);
    write_asset(codec, asset.path(), &info, &converted)?;

    info!(
        "Wrote {} ({} frames at {} Hz)",
        asset.path().display(),
        info.frames,
        info.sample_rate
    );

    Ok(asset.into_path())
}

/// One normal path component: no separators, no root, no `.` or `..`
fn is_plain_file_name(filename: &str) -> bool {
    let mut components = Path::new(filename).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Write `buffer` to `path`, removing the file again if writing fails
fn write_asset<C: Codec>(
    codec: &C,
    path: &Path,
    info: &StreamInfo,
    buffer: &AudioBuffer,
) -> Result<()> {
    let written = {
        let mut writer = codec.create(path, info)?;
        match writer.write_frames(buffer) {
            Ok(()) => writer.finalize(),
            Err(e) => Err(e),
        }
    };

    if written.is_err() {
        if let Err(e) = fs::remove_file(path) {
            debug!("Could not remove partial {}: {}", path.display(), e);
        }
    }

    written
}
