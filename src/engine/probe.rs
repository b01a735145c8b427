//! Metadata Probe
//!
//! Opens an impulse response, validates its layout and hands back a
//! [`Session`] that owns the still-open handle.

use std::path::Path;

use log::debug;

use crate::codec::{Codec, WavCodec, WavFrameReader};
use crate::engine::metadata::ImpulseResponseMetadata;
use crate::engine::session::Session;
use crate::error::{IrError, Result};

/// Open `path` and validate its stream layout
///
/// The reader is dropped, and with it the file handle, on any validation
/// failure.
pub fn open_validated<C: Codec>(
    codec: &C,
    path: &Path,
) -> Result<(C::Reader, ImpulseResponseMetadata)> {
    let (reader, info) = codec.open_read(path)?;
    let metadata = ImpulseResponseMetadata::validate(&info)?;
    Ok((reader, metadata))
}

/// Probe an impulse response through `codec`
///
/// # Errors
/// * `InvalidArgument` - If `path` is empty
/// * `FileOpenFailure` - If the codec cannot open the file
/// * `UnsupportedChannelLayout` - If the file is not mono, stereo or 4-channel
/// * `InvalidStreamMetadata` - If the file has no frames or no sample rate
pub fn probe<C: Codec>(codec: &C, path: &str) -> Result<Session<C::Reader>> {
    if path.is_empty() {
        return Err(IrError::invalid_argument("impulse response path is empty"));
    }

    let path = Path::new(path);
    let (reader, metadata) = open_validated(codec, path)?;

    debug!(
        "Probed {}: {} channels, {} frames, {} Hz, format {}",
        path.display(),
        metadata.channel_count(),
        metadata.frame_count(),
        metadata.sample_rate(),
        metadata.format()
    );

    Ok(Session::new(reader, metadata, path))
}

/// Probe a WAV impulse response
pub fn probe_impulse_response(path: &str) -> Result<Session<WavFrameReader>> {
    probe(&WavCodec, path)
}
