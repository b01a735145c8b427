//! irkit - Impulse-Response Ingest and Sample-Rate Conversion
//!
//! Loads impulse responses for convolution effects (reverb, cabinet
//! emulation) and brings them to the sample rate of the host.
//!
//! # Architecture
//!
//! Two independent paths share one resampler:
//! - In memory: probe a file into a [`Session`], then decode it to
//!   interleaved fixed-point samples at the target rate
//! - On disk: convert a file and write `<rate>_<name>` next to it
//!
//! File access goes through the [`codec::Codec`] traits and conversion
//! through [`engine::ResampleEngine`], with WAV (hound) and rubato
//! implementations provided.

pub mod cli;
pub mod codec;
pub mod engine;
pub mod error;

pub use engine::{
    offline_resample, probe_impulse_response, ClipPolicy, ConvertOptions,
    ImpulseResponseMetadata, IrProcessor, OfflineOptions, ResampleQuality, ResampledAsset,
    Session, SessionSlot,
};
pub use error::{IrError, Result};
