//! Integration Tests
//!
//! Probe and decode-and-convert behaviour through the public API.

mod common;

use irkit::engine::{quantize_sample, ResampleQuality, RubatoEngine, SessionSlot};
use irkit::error::OpenFailureKind;
use irkit::{probe_impulse_response, ClipPolicy, ConvertOptions, IrError, IrProcessor};
use pretty_assertions::assert_eq;
use tempfile::tempdir;
use test_case::test_case;

use common::{fixture, test_signal, write_float_wav, FailingEngine, FakeCodec, ShortEngine};

// === Probe ===

#[test]
fn test_empty_path_is_invalid_argument() {
    let err = probe_impulse_response("").err().unwrap();
    assert!(matches!(err, IrError::InvalidArgument { .. }));
    assert_eq!(err.error_code(), "INVALID_ARGUMENT");
}

#[test]
fn test_missing_file_is_open_failure() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.wav");
    let err = probe_impulse_response(path.to_str().unwrap())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        IrError::FileOpenFailure {
            kind: OpenFailureKind::NotFound,
            ..
        }
    ));
}

#[test_case(1 ; "mono")]
#[test_case(2 ; "stereo")]
#[test_case(4 ; "quad")]
fn test_supported_layouts_probe(channels: u16) {
    let dir = tempdir().unwrap();
    let path = fixture(dir.path(), "ir.wav", channels, 44100, 256);

    let session = probe_impulse_response(&path).unwrap();
    let (ch, frames, rate, _) = session.metadata().to_tuple();
    assert_eq!((ch, frames, rate), (u32::from(channels), 256, 44100));
}

#[test_case(3 ; "three")]
#[test_case(5 ; "five")]
#[test_case(6 ; "six")]
fn test_unsupported_layouts_rejected(channels: u16) {
    let dir = tempdir().unwrap();
    let path = fixture(dir.path(), "ir.wav", channels, 44100, 64);

    let err = probe_impulse_response(&path).err().unwrap();
    assert!(matches!(
        err,
        IrError::UnsupportedChannelLayout { channels: c } if c == u32::from(channels)
    ));
}

#[test]
fn test_zero_frames_rejected() {
    let dir = tempdir().unwrap();
    let path = fixture(dir.path(), "ir.wav", 2, 44100, 0);

    let err = probe_impulse_response(&path).err().unwrap();
    assert!(matches!(err, IrError::InvalidStreamMetadata { frames: 0, .. }));
}

#[test]
fn test_zero_sample_rate_rejected() {
    let codec = FakeCodec::new(2, 100, 0);
    let processor = IrProcessor::with_parts(codec.clone(), RubatoEngine);

    let err = processor.probe("ir.wav").err().unwrap();
    assert!(matches!(
        err,
        IrError::InvalidStreamMetadata {
            sample_rate: 0,
            frames: 100
        }
    ));
}

#[test]
fn test_failed_validation_closes_handle() {
    for codec in [FakeCodec::new(3, 100, 48000), FakeCodec::new(2, 0, 48000)] {
        let processor = IrProcessor::with_parts(codec.clone(), RubatoEngine);
        assert!(processor.probe("ir.wav").is_err());
        assert_eq!(codec.open_readers(), 0);
    }
}

#[test]
fn test_session_holds_handle_until_consumed() {
    let codec = FakeCodec::new(2, 100, 48000);
    let processor = IrProcessor::with_parts(codec.clone(), RubatoEngine);

    let session = processor.probe("ir.wav").unwrap();
    assert_eq!(codec.open_readers(), 1);

    let samples = processor
        .read_and_convert(session, 48000, &ConvertOptions::default())
        .unwrap();
    assert_eq!(samples.len(), 200);
    assert_eq!(codec.open_readers(), 0);
}

#[test]
fn test_dropped_session_closes_handle() {
    let codec = FakeCodec::new(1, 10, 48000);
    let processor = IrProcessor::with_parts(codec.clone(), RubatoEngine);

    let session = processor.probe("ir.wav").unwrap();
    session.close();
    assert_eq!(codec.open_readers(), 0);
}

#[test]
fn test_released_slot_guard_closes_pending_handle() {
    let codec = FakeCodec::new(1, 10, 48000);
    let slot = SessionSlot::new(IrProcessor::with_parts(codec.clone(), RubatoEngine));

    slot.lock().probe("ir.wav").unwrap();
    assert_eq!(codec.open_readers(), 0);

    let err = slot
        .lock()
        .read_and_convert(48000, &ConvertOptions::default())
        .unwrap_err();
    assert!(matches!(err, IrError::NoPendingSession));
}

#[test]
fn test_sessions_are_independent() {
    let dir = tempdir().unwrap();
    let a = fixture(dir.path(), "a.wav", 1, 44100, 100);
    let b = fixture(dir.path(), "b.wav", 2, 48000, 50);

    let first = probe_impulse_response(&a).unwrap();
    let second = probe_impulse_response(&b).unwrap();

    let options = ConvertOptions::default();
    let from_second = second.read_and_convert(&RubatoEngine, 48000, &options).unwrap();
    let from_first = first.read_and_convert(&RubatoEngine, 44100, &options).unwrap();

    assert_eq!(from_first.len(), 100);
    assert_eq!(from_second.len(), 100);
}

// === Decode and convert ===

#[test_case(1 ; "mono")]
#[test_case(2 ; "stereo")]
#[test_case(4 ; "quad")]
fn test_same_rate_matches_quantized_source(channels: u16) {
    let dir = tempdir().unwrap();
    let frames = 300;
    let source = test_signal(frames, channels as usize);
    let path = dir.path().join("ir.wav");
    write_float_wav(&path, channels, 48000, &source);

    let session = probe_impulse_response(path.to_str().unwrap()).unwrap();
    let samples = session
        .read_and_convert(&RubatoEngine, 48000, &ConvertOptions::default())
        .unwrap();

    assert_eq!(samples.len(), frames * channels as usize);
    let expected: Vec<i32> = source
        .iter()
        .map(|&s| (s * 32768.0).round() as i32)
        .collect();
    assert_eq!(samples, expected);
}

#[test_case(44100, 48000, 1000, 2 ; "cd to dat stereo")]
#[test_case(48000, 44100, 1000, 2 ; "dat to cd stereo")]
#[test_case(48000, 96000, 777, 1 ; "double mono")]
#[test_case(96000, 44100, 4099, 4 ; "quad down")]
#[test_case(22050, 48000, 3, 1 ; "tiny upsample")]
fn test_resampled_length_is_exact(source_rate: u32, target_rate: u32, frames: usize, channels: u16) {
    let dir = tempdir().unwrap();
    let path = fixture(dir.path(), "ir.wav", channels, source_rate, frames);
    let expected_frames = frames * target_rate as usize / source_rate as usize;

    for quality in [
        ResampleQuality::ZeroOrderHold,
        ResampleQuality::Linear,
        ResampleQuality::SincBest,
    ] {
        let session = probe_impulse_response(&path).unwrap();
        let options = ConvertOptions::new(quality, ClipPolicy::Clamp);
        let samples = session
            .read_and_convert(&RubatoEngine, target_rate, &options)
            .unwrap();
        assert_eq!(samples.len(), expected_frames * channels as usize);
    }
}

#[test]
fn test_resampled_values_stay_in_range() {
    let dir = tempdir().unwrap();
    let path = fixture(dir.path(), "ir.wav", 2, 44100, 2000);

    let session = probe_impulse_response(&path).unwrap();
    let samples = session
        .read_and_convert(&RubatoEngine, 48000, &ConvertOptions::high_fidelity())
        .unwrap();

    assert!(samples.iter().all(|&s| (-32768..=32767).contains(&s)));
    assert!(samples.iter().any(|&s| s.abs() > 20000));
}

#[test]
fn test_full_scale_policy_is_pinned() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ir.wav");
    write_float_wav(&path, 1, 44100, &[1.0, -1.0, 0.5]);

    let clamp = probe_impulse_response(path.to_str().unwrap())
        .unwrap()
        .read_and_convert(&RubatoEngine, 44100, &ConvertOptions::default())
        .unwrap();
    assert_eq!(clamp, vec![32767, -32768, 16384]);

    let widen = probe_impulse_response(path.to_str().unwrap())
        .unwrap()
        .read_and_convert(
            &RubatoEngine,
            44100,
            &ConvertOptions::new(ResampleQuality::ZeroOrderHold, ClipPolicy::Widen),
        )
        .unwrap();
    assert_eq!(widen, vec![32768, -32768, 16384]);
    assert_eq!(quantize_sample(1.0, ClipPolicy::Widen), widen[0]);
}

#[test]
fn test_engine_failure_is_surfaced() {
    let codec = FakeCodec::new(2, 1000, 44100);
    let processor = IrProcessor::with_parts(codec.clone(), FailingEngine);

    let session = processor.probe("ir.wav").unwrap();
    let err = processor
        .read_and_convert(session, 48000, &ConvertOptions::default())
        .unwrap_err();

    assert!(matches!(err, IrError::ResampleFailure { .. }));
    assert_eq!(codec.open_readers(), 0);
}

#[test]
fn test_short_engine_output_is_rejected() {
    let codec = FakeCodec::new(2, 1000, 44100);
    let processor = IrProcessor::with_parts(codec, ShortEngine);

    let session = processor.probe("ir.wav").unwrap();
    let err = processor
        .read_and_convert(session, 48000, &ConvertOptions::default())
        .unwrap_err();
    assert!(matches!(err, IrError::ResampleFailure { .. }));
}

#[test]
fn test_short_stream_is_read_failure() {
    let mut codec = FakeCodec::new(1, 100, 44100);
    codec.samples.truncate(50);
    let processor = IrProcessor::with_parts(codec.clone(), RubatoEngine);

    let session = processor.probe("ir.wav").unwrap();
    let err = processor
        .read_and_convert(session, 44100, &ConvertOptions::default())
        .unwrap_err();
    assert!(matches!(err, IrError::ReadFailure { .. }));
    assert_eq!(codec.open_readers(), 0);
}

#[test]
fn test_same_rate_skips_engine() {
    let codec = FakeCodec::new(1, 10, 48000);
    let processor = IrProcessor::with_parts(codec, FailingEngine);

    let session = processor.probe("ir.wav").unwrap();
    let samples = processor
        .read_and_convert(session, 48000, &ConvertOptions::default())
        .unwrap();
    assert_eq!(samples.len(), 10);
}
