//! Audio Buffer Management
//!
//! Interleaved float buffers shared by both pipelines. Every allocation is
//! fallible so that an oversized impulse response surfaces as
//! [`IrError::AllocationFailure`] instead of aborting the process.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, Result};

// ============================================================================
// Channel Layout
// ============================================================================

/// Channel layouts accepted for impulse responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelLayout {
    /// Single channel
    Mono,
    /// Left/right pair
    Stereo,
    /// Four channels (true-stereo IR: LL, LR, RL, RR)
    Quad,
}

impl ChannelLayout {
    /// Number of interleaved channels in this layout
    pub fn num_channels(self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
            ChannelLayout::Quad => 4,
        }
    }
}

impl TryFrom<u32> for ChannelLayout {
    type Error = IrError;

    fn try_from(channels: u32) -> Result<Self> {
        match channels {
            1 => Ok(ChannelLayout::Mono),
            2 => Ok(ChannelLayout::Stereo),
            4 => Ok(ChannelLayout::Quad),
            _ => Err(IrError::UnsupportedChannelLayout { channels }),
        }
    }
}

// ============================================================================
// Sample Count Helpers
// ============================================================================

/// Total interleaved sample count for `frames` frames of `channels` channels
///
/// This is the only place a frame count is turned into a buffer length.
pub fn total_samples(frames: usize, channels: usize) -> Result<usize> {
    frames
        .checked_mul(channels)
        .ok_or(IrError::AllocationFailure {
            samples: usize::MAX,
        })
}

/// Allocate an empty vector able to hold `len` items without reallocating
pub(crate) fn try_vec_with_capacity<T>(len: usize) -> Result<Vec<T>> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(len)
        .map_err(|_| IrError::AllocationFailure { samples: len })?;
    Ok(vec)
}

// ============================================================================
// AudioBuffer
// ============================================================================

/// Interleaved 32-bit float audio
///
/// Samples are stored frame by frame: `[c0, c1, .., c0, c1, ..]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    channels: usize,
}

impl AudioBuffer {
    /// Allocate a silent buffer of `frames` frames
    pub fn try_silent(frames: usize, channels: usize) -> Result<Self> {
        if channels == 0 {
            return Err(IrError::invalid_argument("buffer needs at least one channel"));
        }
        let len = total_samples(frames, channels)?;
        let mut samples = try_vec_with_capacity(len)?;
        samples.resize(len, 0.0);
        Ok(AudioBuffer { samples, channels })
    }

    /// Wrap already interleaved samples
    ///
    /// Fails if the sample count is not a whole number of frames.
    pub fn from_interleaved(samples: Vec<f32>, channels: usize) -> Result<Self> {
        if channels == 0 || samples.len() % channels != 0 {
            return Err(IrError::invalid_argument(format!(
                "{} samples do not form whole frames of {} channels",
                samples.len(),
                channels
            )));
        }
        Ok(AudioBuffer { samples, channels })
    }

    /// Build an interleaved buffer from one vector per channel
    ///
    /// Every channel must hold the same number of frames.
    pub fn from_planar(planar: &[Vec<f32>]) -> Result<Self> {
        let channels = planar.len();
        let frames = planar.first().map_or(0, Vec::len);
        if channels == 0 || planar.iter().any(|ch| ch.len() != frames) {
            return Err(IrError::invalid_argument("planar channels differ in length"));
        }

        let mut samples = try_vec_with_capacity(total_samples(frames, channels)?)?;
        for frame in 0..frames {
            for channel in planar {
                samples.push(channel[frame]);
            }
        }

        Ok(AudioBuffer { samples, channels })
    }

    /// Split into one vector per channel
    pub fn to_planar(&self) -> Result<Vec<Vec<f32>>> {
        let frames = self.num_frames();
        let mut planar = Vec::with_capacity(self.channels);
        for _ in 0..self.channels {
            planar.push(try_vec_with_capacity(frames)?);
        }

        for (i, sample) in self.samples.iter().enumerate() {
            planar[i % self.channels].push(*sample);
        }

        Ok(planar)
    }

    /// Number of frames
    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    /// Number of interleaved channels
    pub fn num_channels(&self) -> usize {
        self.channels
    }

    /// Total sample count (`frames × channels`)
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if the buffer holds no frames
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Absolute peak value across all channels
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()))
    }
}

// ============================================================================
// Tests
// ============================================================================
