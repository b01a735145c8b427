//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hound::{SampleFormat, WavSpec, WavWriter};

use irkit::codec::{Codec, FormatTag, FrameReader, FrameWriter, StreamInfo};
use irkit::engine::{AudioBuffer, ResampleEngine, ResampleRequest};
use irkit::error::{IrError, OpenFailureKind, Result};

/// Deterministic test signal in [-0.9, 0.9], different per channel
pub fn test_signal(frames: usize, channels: usize) -> Vec<f32> {
    let mut samples = Vec::with_capacity(frames * channels);
    for frame in 0..frames {
        for channel in 0..channels {
            let phase = (frame * (channel + 3)) as f32 * 0.05;
            samples.push(0.9 * phase.sin());
        }
    }
    samples
}

/// Write a 32-bit float WAV file
pub fn write_float_wav(path: &Path, channels: u16, rate: u32, samples: &[f32]) {
    let spec = WavSpec {
        channels,
        sample_rate: rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

/// Write a 16-bit PCM WAV file
pub fn write_pcm16_wav(path: &Path, channels: u16, rate: u32, samples: &[i16]) {
    let spec = WavSpec {
        channels,
        sample_rate: rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

/// Write `frames` frames of the test signal and return the path as a string
pub fn fixture(dir: &Path, name: &str, channels: u16, rate: u32, frames: usize) -> String {
    let path = dir.join(name);
    write_float_wav(&path, channels, rate, &test_signal(frames, channels as usize));
    path.to_str().unwrap().to_string()
}

// ============================================================================
// Fake codec
// ============================================================================

/// In-memory codec that reports whatever stream info it is given and counts
/// how many readers are still open
#[derive(Clone)]
pub struct FakeCodec {
    pub info: StreamInfo,
    pub samples: Vec<f32>,
    pub fail_writes: bool,
    open_readers: Arc<AtomicUsize>,
}

impl FakeCodec {
    pub fn new(channels: u32, frames: u64, sample_rate: u32) -> Self {
        FakeCodec {
            info: StreamInfo {
                channels,
                frames,
                sample_rate,
                format: FormatTag::wav(FormatTag::FLOAT),
            },
            samples: test_signal(frames as usize, channels as usize),
            fail_writes: false,
            open_readers: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn open_readers(&self) -> usize {
        self.open_readers.load(Ordering::SeqCst)
    }
}

pub struct FakeReader {
    samples: Vec<f32>,
    open_readers: Arc<AtomicUsize>,
}

impl Drop for FakeReader {
    fn drop(&mut self) {
        self.open_readers.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FrameReader for FakeReader {
    fn read_frames(&mut self, buffer: &mut AudioBuffer) -> Result<()> {
        if self.samples.len() < buffer.len() {
            return Err(IrError::ReadFailure {
                reason: "fake stream too short".to_string(),
                source: None,
            });
        }
        let len = buffer.len();
        buffer.samples_mut().copy_from_slice(&self.samples[..len]);
        Ok(())
    }
}

/// Writes a placeholder file on create, then fails or succeeds as configured
pub struct FakeWriter {
    path: PathBuf,
    fail: bool,
}

impl FrameWriter for FakeWriter {
    fn write_frames(&mut self, _buffer: &AudioBuffer) -> Result<()> {
        if self.fail {
            return Err(IrError::WriteFailure {
                path: self.path.clone(),
                reason: "disk full".to_string(),
                source: None,
            });
        }
        Ok(())
    }

    fn finalize(self) -> Result<()> {
        Ok(())
    }
}

impl Codec for FakeCodec {
    type Reader = FakeReader;
    type Writer = FakeWriter;

    fn open_read(&self, path: &Path) -> Result<(FakeReader, StreamInfo)> {
        if path.to_string_lossy().contains("missing") {
            return Err(IrError::FileOpenFailure {
                path: path.to_path_buf(),
                kind: OpenFailureKind::NotFound,
                source: None,
            });
        }
        self.open_readers.fetch_add(1, Ordering::SeqCst);
        let reader = FakeReader {
            samples: self.samples.clone(),
            open_readers: Arc::clone(&self.open_readers),
        };
        Ok((reader, self.info))
    }

    fn create(&self, path: &Path, _info: &StreamInfo) -> Result<FakeWriter> {
        std::fs::write(path, b"RIFF").map_err(|e| IrError::WriteFailure {
            path: path.to_path_buf(),
            reason: "create".to_string(),
            source: Some(Box::new(e)),
        })?;
        Ok(FakeWriter {
            path: path.to_path_buf(),
            fail: self.fail_writes,
        })
    }
}

// ============================================================================
// Fake engines
// ============================================================================

/// Engine that always reports failure
pub struct FailingEngine;

impl ResampleEngine for FailingEngine {
    fn resample(&self, _input: &AudioBuffer, _request: &ResampleRequest) -> Result<AudioBuffer> {
        Err(IrError::ResampleFailure {
            reason: "engine error 6".to_string(),
        })
    }
}

/// Engine that returns one frame fewer than requested
pub struct ShortEngine;

impl ResampleEngine for ShortEngine {
    fn resample(&self, _input: &AudioBuffer, request: &ResampleRequest) -> Result<AudioBuffer> {
        AudioBuffer::try_silent(request.output_frames - 1, request.channels)
    }
}
