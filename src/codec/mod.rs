//! Codec Collaborator
//!
//! The pipelines only see audio files through these traits: open a file for
//! reading and learn its stream layout, read every frame as interleaved
//! `f32`, create a file and write frames to it. Closing is dropping.
//!
//! [`WavCodec`] is the production implementation.

pub mod wav;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::buffer::AudioBuffer;
use crate::error::Result;

pub use wav::{WavCodec, WavFrameReader, WavFrameWriter};

// ============================================================================
// Format Tag
// ============================================================================

/// Opaque codec-defined description of the container and sample encoding
///
/// The upper half holds the container (major) type, the lower 16 bits the
/// sample subtype. Pipelines never interpret it; they only carry it from a
/// source file to the file they write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatTag(pub u32);

impl FormatTag {
    pub const MAJOR_WAV: u32 = 0x01_0000;
    pub const MAJOR_MASK: u32 = 0x0FFF_0000;
    pub const SUBTYPE_MASK: u32 = 0x0000_FFFF;

    pub const PCM_S8: u32 = 0x0001;
    pub const PCM_16: u32 = 0x0002;
    pub const PCM_24: u32 = 0x0003;
    pub const PCM_32: u32 = 0x0004;
    pub const PCM_U8: u32 = 0x0005;
    pub const FLOAT: u32 = 0x0006;

    /// Tag for a WAV container with the given sample subtype
    pub const fn wav(subtype: u32) -> Self {
        FormatTag(Self::MAJOR_WAV | (subtype & Self::SUBTYPE_MASK))
    }

    pub const fn major(self) -> u32 {
        self.0 & Self::MAJOR_MASK
    }

    pub const fn subtype(self) -> u32 {
        self.0 & Self::SUBTYPE_MASK
    }
}

impl std::fmt::Display for FormatTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:06x}", self.0)
    }
}

// ============================================================================
// Stream Info
// ============================================================================

/// Raw stream layout as reported by a codec, before any validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    pub channels: u32,
    pub frames: u64,
    pub sample_rate: u32,
    pub format: FormatTag,
}

// ============================================================================
// Collaborator Traits
// ============================================================================

/// An open file handle positioned at the first frame
pub trait FrameReader {
    /// Fill `buffer` completely with the next frames of the stream
    ///
    /// A stream that ends before the buffer is full is a read failure.
    fn read_frames(&mut self, buffer: &mut AudioBuffer) -> Result<()>;
}

/// A file handle open for writing
pub trait FrameWriter {
    /// Append every frame of `buffer`
    fn write_frames(&mut self, buffer: &AudioBuffer) -> Result<()>;

    /// Flush headers and close the file
    fn finalize(self) -> Result<()>;
}

/// Opens audio files for the pipelines
pub trait Codec {
    type Reader: FrameReader;
    type Writer: FrameWriter;

    /// Open `path` read-only and report its stream layout
    fn open_read(&self, path: &Path) -> Result<(Self::Reader, StreamInfo)>;

    /// Create (or truncate) `path` for writing a stream laid out as `info`
    fn create(&self, path: &Path, info: &StreamInfo) -> Result<Self::Writer>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tag_parts() {
        let tag = FormatTag::wav(FormatTag::PCM_24);
        assert_eq!(tag.major(), FormatTag::MAJOR_WAV);
        assert_eq!(tag.subtype(), FormatTag::PCM_24);
        assert_eq!(tag.to_string(), "0x010003");
    }
}
