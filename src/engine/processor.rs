//! Codec and engine bundled behind the three entry points

use std::path::PathBuf;

use crate::codec::{Codec, WavCodec};
use crate::engine::convert::ConvertOptions;
use crate::engine::offline::{offline_resample, OfflineOptions};
use crate::engine::probe::probe;
use crate::engine::resample::{ResampleEngine, RubatoEngine};
use crate::engine::session::Session;
use crate::error::Result;

/// Probe, convert and offline-resample through one codec and one engine
#[derive(Debug, Clone, Default)]
pub struct IrProcessor<C = WavCodec, E = RubatoEngine> {
    codec: C,
    engine: E,
}

impl IrProcessor {
    /// WAV files, rubato conversion
    pub fn new() -> Self {
        IrProcessor {
            codec: WavCodec,
            engine: RubatoEngine,
        }
    }
}

impl<C: Codec, E: ResampleEngine> IrProcessor<C, E> {
    pub fn with_parts(codec: C, engine: E) -> Self {
        IrProcessor { codec, engine }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// See [`probe`]
    pub fn probe(&self, path: &str) -> Result<Session<C::Reader>> {
        probe(&self.codec, path)
    }

    /// See [`Session::read_and_convert`]
    pub fn read_and_convert(
        &self,
        session: Session<C::Reader>,
        target_sample_rate: u32,
        options: &ConvertOptions,
    ) -> Result<Vec<i32>> {
        session.read_and_convert(&self.engine, target_sample_rate, options)
    }

    /// See [`offline_resample`]
    pub fn offline_resample(
        &self,
        directory: &str,
        filename: &str,
        target_sample_rate: u32,
        options: &OfflineOptions,
    ) -> Result<PathBuf> {
        offline_resample(
            &self.codec,
            &self.engine,
            directory,
            filename,
            target_sample_rate,
            options,
        )
    }
}
