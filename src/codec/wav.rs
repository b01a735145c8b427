//! WAV codec backed by hound
//!
//! Reads 8/16/24/32-bit integer PCM and 32-bit float WAV files as
//! interleaved `f32` in [-1.0, 1.0], and writes `f32` frames back in the
//! encoding named by a [`FormatTag`].

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::codec::{Codec, FormatTag, FrameReader, FrameWriter, StreamInfo};
use crate::engine::buffer::AudioBuffer;
use crate::error::{IrError, OpenFailureKind, Result};

/// Full-scale divisor for signed integer samples of `bits` bits
fn int_full_scale(bits: u16) -> f64 {
    (1u64 << (bits - 1)) as f64
}

/// Map a hound spec onto a format tag, rejecting encodings we cannot carry
fn format_tag_for(spec: &WavSpec) -> Option<FormatTag> {
    let subtype = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => FormatTag::FLOAT,
        (SampleFormat::Int, 8) => FormatTag::PCM_U8,
        (SampleFormat::Int, 16) => FormatTag::PCM_16,
        (SampleFormat::Int, 24) => FormatTag::PCM_24,
        (SampleFormat::Int, 32) => FormatTag::PCM_32,
        _ => return None,
    };
    Some(FormatTag::wav(subtype))
}

/// Inverse of [`format_tag_for`]: sample encoding for a WAV format tag
fn sample_encoding_for(tag: FormatTag) -> Option<(SampleFormat, u16)> {
    if tag.major() != FormatTag::MAJOR_WAV {
        return None;
    }
    match tag.subtype() {
        FormatTag::FLOAT => Some((SampleFormat::Float, 32)),
        FormatTag::PCM_U8 | FormatTag::PCM_S8 => Some((SampleFormat::Int, 8)),
        FormatTag::PCM_16 => Some((SampleFormat::Int, 16)),
        FormatTag::PCM_24 => Some((SampleFormat::Int, 24)),
        FormatTag::PCM_32 => Some((SampleFormat::Int, 32)),
        _ => None,
    }
}

fn open_failure(path: &Path, err: hound::Error) -> IrError {
    let kind = match &err {
        hound::Error::IoError(io)
            if matches!(
                io.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied
            ) =>
        {
            OpenFailureKind::NotFound
        }
        _ => OpenFailureKind::BadFormat,
    };
    IrError::FileOpenFailure {
        path: path.to_path_buf(),
        kind,
        source: Some(Box::new(err)),
    }
}

// ============================================================================
// Codec
// ============================================================================

/// WAV files through hound
#[derive(Debug, Clone, Copy, Default)]
pub struct WavCodec;

impl Codec for WavCodec {
    type Reader = WavFrameReader;
    type Writer = WavFrameWriter;

    fn open_read(&self, path: &Path) -> Result<(WavFrameReader, StreamInfo)> {
        let reader = WavReader::open(path).map_err(|e| open_failure(path, e))?;
        let spec = reader.spec();

        let format = format_tag_for(&spec).ok_or_else(|| IrError::FileOpenFailure {
            path: path.to_path_buf(),
            kind: OpenFailureKind::BadFormat,
            source: Some(
                format!(
                    "{}-bit {:?} samples are not supported",
                    spec.bits_per_sample, spec.sample_format
                )
                .into(),
            ),
        })?;

        let info = StreamInfo {
            channels: u32::from(spec.channels),
            frames: u64::from(reader.duration()),
            sample_rate: spec.sample_rate,
            format,
        };

        Ok((WavFrameReader { reader, spec }, info))
    }

    fn create(&self, path: &Path, info: &StreamInfo) -> Result<WavFrameWriter> {
        let write_failure = |reason: String| IrError::WriteFailure {
            path: path.to_path_buf(),
            reason,
            source: None,
        };

        let (sample_format, bits_per_sample) = sample_encoding_for(info.format)
            .ok_or_else(|| write_failure(format!("format tag {} is not WAV", info.format)))?;
        let channels = u16::try_from(info.channels)
            .map_err(|_| write_failure(format!("{} channels do not fit WAV", info.channels)))?;

        let spec = WavSpec {
            channels,
            sample_rate: info.sample_rate,
            bits_per_sample,
            sample_format,
        };

        let writer = WavWriter::create(path, spec).map_err(|e| IrError::WriteFailure {
            path: path.to_path_buf(),
            reason: "failed to create WAV file".to_string(),
            source: Some(Box::new(e)),
        })?;

        Ok(WavFrameWriter {
            writer,
            spec,
            path: path.to_path_buf(),
        })
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Open WAV file handle, closed on drop
pub struct WavFrameReader {
    reader: WavReader<BufReader<File>>,
    spec: WavSpec,
}

impl FrameReader for WavFrameReader {
    fn read_frames(&mut self, buffer: &mut AudioBuffer) -> Result<()> {
        if buffer.num_channels() != usize::from(self.spec.channels) {
            return Err(IrError::ReadFailure {
                reason: format!(
                    "buffer has {} channels, stream has {}",
                    buffer.num_channels(),
                    self.spec.channels
                ),
                source: None,
            });
        }

        let wanted = buffer.len();
        let out = buffer.samples_mut();
        let filled = match self.spec.sample_format {
            SampleFormat::Float => fill_samples(self.reader.samples::<f32>(), out, |v| v)?,
            SampleFormat::Int => {
                let scale = int_full_scale(self.spec.bits_per_sample);
                fill_samples(self.reader.samples::<i32>(), out, |v| (v as f64 / scale) as f32)?
            }
        };

        if filled < wanted {
            return Err(IrError::ReadFailure {
                reason: format!("stream ended after {} of {} samples", filled, wanted),
                source: None,
            });
        }

        Ok(())
    }
}

/// Copy converted samples into `out`, returning how many were written
fn fill_samples<S, I, F>(samples: I, out: &mut [f32], convert: F) -> Result<usize>
where
    I: Iterator<Item = hound::Result<S>>,
    F: Fn(S) -> f32,
{
    let mut filled = 0;
    for (slot, sample) in out.iter_mut().zip(samples) {
        let sample = sample.map_err(|e| IrError::ReadFailure {
            reason: format!("failed to decode sample {}", filled),
            source: Some(Box::new(e)),
        })?;
        *slot = convert(sample);
        filled += 1;
    }
    Ok(filled)
}

// ============================================================================
// Writer
// ============================================================================

/// WAV file open for writing
pub struct WavFrameWriter {
    writer: WavWriter<BufWriter<File>>,
    spec: WavSpec,
    path: PathBuf,
}

impl WavFrameWriter {
    fn write_failure(&self, err: hound::Error) -> IrError {
        IrError::WriteFailure {
            path: self.path.clone(),
            reason: "failed to write sample".to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl FrameWriter for WavFrameWriter {
    fn write_frames(&mut self, buffer: &AudioBuffer) -> Result<()> {
        if buffer.num_channels() != usize::from(self.spec.channels) {
            return Err(IrError::WriteFailure {
                path: self.path.clone(),
                reason: format!(
                    "buffer has {} channels, file has {}",
                    buffer.num_channels(),
                    self.spec.channels
                ),
                source: None,
            });
        }

        match self.spec.sample_format {
            SampleFormat::Float => {
                for &sample in buffer.samples() {
                    if let Err(e) = self.writer.write_sample(sample) {
                        return Err(self.write_failure(e));
                    }
                }
            }
            SampleFormat::Int => {
                let scale = int_full_scale(self.spec.bits_per_sample);
                for &sample in buffer.samples() {
                    let scaled = (f64::from(sample) * scale).round().clamp(-scale, scale - 1.0);
                    if let Err(e) = self.writer.write_sample(scaled as i32) {
                        return Err(self.write_failure(e));
                    }
                }
            }
        }

        Ok(())
    }

    fn finalize(self) -> Result<()> {
        let path = self.path;
        self.writer.finalize().map_err(|e| IrError::WriteFailure {
            path,
            reason: "failed to finalize WAV header".to_string(),
            source: Some(Box::new(e)),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
