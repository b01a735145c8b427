//! Decode-and-Convert Pipeline
//!
//! Reads a probed session in full, converts it to the target rate when the
//! rates differ and quantizes the result to fixed point.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::codec::FrameReader;
use crate::engine::quantize::{quantize, ClipPolicy};
use crate::engine::resample::{ResampleEngine, ResampleQuality, ResampleRequest};
use crate::engine::session::Session;
use crate::error::{IrError, Result};

/// Conversion settings for the in-memory path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Interpolator used when the rates differ (default: zero-order hold)
    pub quality: ResampleQuality,
    /// Handling of values past the 16-bit range (default: clamp)
    pub clip: ClipPolicy,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            quality: ResampleQuality::ZeroOrderHold,
            clip: ClipPolicy::Clamp,
        }
    }
}

impl ConvertOptions {
    pub fn new(quality: ResampleQuality, clip: ClipPolicy) -> Self {
        ConvertOptions { quality, clip }
    }

    /// Fast conversion for loading IRs on the fly (same as default)
    pub fn realtime() -> Self {
        Self::default()
    }

    /// Best sinc conversion, clamped
    pub fn high_fidelity() -> Self {
        ConvertOptions {
            quality: ResampleQuality::SincBest,
            clip: ClipPolicy::Clamp,
        }
    }
}

impl<R: FrameReader> Session<R> {
    /// Decode this session at `target_sample_rate` as interleaved fixed point
    ///
    /// The file handle is closed as soon as the frames are read. The result
    /// holds `frames × channels` samples when the rates match, otherwise
    /// `floor(frames × target / source) × channels`.
    ///
    /// # Errors
    /// * `InvalidArgument` - If `target_sample_rate` is zero
    /// * `AllocationFailure` - If a buffer cannot be allocated
    /// * `ReadFailure` - If the stream ends early or cannot be decoded
    /// * `ResampleFailure` - If the engine fails or returns the wrong length
    pub fn read_and_convert<E: ResampleEngine>(
        self,
        engine: &E,
        target_sample_rate: u32,
        options: &ConvertOptions,
    ) -> Result<Vec<i32>> {
        if target_sample_rate == 0 {
            return Err(IrError::invalid_argument("target sample rate must be positive"));
        }

        let source_rate = self.metadata().sample_rate();
        let source = self.read_all()?;

        if source_rate == target_sample_rate {
            debug!(
                "Rates match at {} Hz, quantizing {} samples",
                source_rate,
                source.len()
            );
            return quantize(source.samples(), options.clip);
        }

        let request = ResampleRequest::new(
            source_rate,
            target_sample_rate,
            source.num_frames(),
            source.num_channels(),
            options.quality,
        )?;
        let resampled = engine.resample(&source, &request)?;
        drop(source);
        request.check_output(&resampled)?;

        quantize(resampled.samples(), options.clip)
    }
}
