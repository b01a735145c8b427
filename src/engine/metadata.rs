//! Impulse-response metadata and its validation rules

use serde::Serialize;

use crate::codec::{FormatTag, StreamInfo};
use crate::engine::buffer::ChannelLayout;
use crate::error::{IrError, Result};

/// Validated stream layout of an impulse response
///
/// Only constructed through [`ImpulseResponseMetadata::validate`], so a value
/// of this type always has a supported layout, a positive rate and at least
/// one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImpulseResponseMetadata {
    channel_layout: ChannelLayout,
    frame_count: u64,
    sample_rate: u32,
    format: FormatTag,
}

impl ImpulseResponseMetadata {
    /// Validate raw codec info
    ///
    /// Checks run in order: channel layout first, then rate and frame count.
    pub fn validate(info: &StreamInfo) -> Result<Self> {
        let channel_layout = ChannelLayout::try_from(info.channels)?;

        if info.sample_rate == 0 || info.frames == 0 {
            return Err(IrError::InvalidStreamMetadata {
                sample_rate: info.sample_rate,
                frames: info.frames,
            });
        }

        Ok(ImpulseResponseMetadata {
            channel_layout,
            frame_count: info.frames,
            sample_rate: info.sample_rate,
            format: info.format,
        })
    }

    pub fn channel_layout(&self) -> ChannelLayout {
        self.channel_layout
    }

    pub fn channel_count(&self) -> usize {
        self.channel_layout.num_channels()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn format(&self) -> FormatTag {
        self.format
    }

    /// `(channelCount, frameCount, sampleRate, format)`
    pub fn to_tuple(&self) -> (u32, u64, u32, u32) {
        (
            self.channel_count() as u32,
            self.frame_count,
            self.sample_rate,
            self.format.0,
        )
    }

    /// Frame count as an in-memory length
    pub(crate) fn frames_usize(&self) -> Result<usize> {
        usize::try_from(self.frame_count).map_err(|_| IrError::AllocationFailure {
            samples: usize::MAX,
        })
    }

    /// Stream info for a copy of this stream at another rate and length
    pub(crate) fn resampled_info(&self, sample_rate: u32, frames: u64) -> StreamInfo {
        StreamInfo {
            channels: self.channel_count() as u32,
            frames,
            sample_rate,
            format: self.format,
        }
    }
}
