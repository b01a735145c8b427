//! Probe-to-decode sessions
//!
//! A [`Session`] binds one open file handle to the metadata probed from it.
//! It is consumed by value when decoded, so a handle can be read at most
//! once, and dropping an unconsumed session closes the file.
//!
//! [`SessionSlot`] keeps the older single-slot protocol (probe now, convert
//! "the last probed file" later) available for callers that need it. A
//! pairing lives inside one [`SlotGuard`]: the slot lock is held for the
//! whole probe+convert, and a session left pending when the guard drops is
//! closed.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use crate::codec::{Codec, FrameReader};
use crate::engine::buffer::AudioBuffer;
use crate::engine::convert::ConvertOptions;
use crate::engine::metadata::ImpulseResponseMetadata;
use crate::engine::processor::IrProcessor;
use crate::engine::resample::ResampleEngine;
use crate::error::{IrError, Result};

// ============================================================================
// Session
// ============================================================================

/// An open, validated impulse response waiting to be decoded
#[derive(Debug)]
pub struct Session<R> {
    reader: R,
    metadata: ImpulseResponseMetadata,
    path: PathBuf,
}

impl<R> Session<R> {
    pub(crate) fn new(reader: R, metadata: ImpulseResponseMetadata, path: &Path) -> Self {
        Session {
            reader,
            metadata,
            path: path.to_path_buf(),
        }
    }

    pub fn metadata(&self) -> &ImpulseResponseMetadata {
        &self.metadata
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the handle without decoding
    pub fn close(self) {
        debug!("Closing unconsumed session for {}", self.path.display());
    }
}

impl<R: FrameReader> Session<R> {
    /// Read every frame and close the handle
    pub fn read_all(self) -> Result<AudioBuffer> {
        let Session {
            reader, metadata, ..
        } = self;
        read_all(reader, &metadata)
    }
}

/// Read the whole stream described by `metadata`, consuming (closing) `reader`
pub(crate) fn read_all<R: FrameReader>(
    mut reader: R,
    metadata: &ImpulseResponseMetadata,
) -> Result<AudioBuffer> {
    let mut buffer = AudioBuffer::try_silent(metadata.frames_usize()?, metadata.channel_count())?;
    reader.read_frames(&mut buffer)?;
    Ok(buffer)
}

// ============================================================================
// Session Slot
// ============================================================================

/// A single shared slot for the probe-then-convert protocol
///
/// All access goes through [`SessionSlot::lock`]; the returned guard
/// serializes a probe and its matching conversion against every other
/// caller of the same slot.
pub struct SessionSlot<C: Codec, E> {
    processor: IrProcessor<C, E>,
    pending: Mutex<Option<Session<C::Reader>>>,
}

impl<C: Codec, E: ResampleEngine> SessionSlot<C, E> {
    pub fn new(processor: IrProcessor<C, E>) -> Self {
        SessionSlot {
            processor,
            pending: Mutex::new(None),
        }
    }

    /// Take exclusive use of the slot until the guard is dropped
    ///
    /// A poisoned lock is recovered; the pending session it guards is still
    /// a complete value.
    pub fn lock(&self) -> SlotGuard<'_, C, E> {
        SlotGuard {
            processor: &self.processor,
            pending: self.pending.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }
}

/// Exclusive access to a [`SessionSlot`]
///
/// Dropping the guard closes any session it probed but did not convert, so
/// the next caller always starts from an empty slot.
pub struct SlotGuard<'a, C: Codec, E> {
    processor: &'a IrProcessor<C, E>,
    pending: MutexGuard<'a, Option<Session<C::Reader>>>,
}

impl<C: Codec, E: ResampleEngine> SlotGuard<'_, C, E> {
    /// Probe `path` into the slot
    ///
    /// Any session still pending is closed first, whether or not the new
    /// probe succeeds.
    pub fn probe(&mut self, path: &str) -> Result<ImpulseResponseMetadata> {
        if let Some(previous) = self.pending.take() {
            warn!(
                "Discarding unconsumed session for {}",
                previous.path().display()
            );
            previous.close();
        }

        let session = self.processor.probe(path)?;
        let metadata = *session.metadata();
        *self.pending = Some(session);
        Ok(metadata)
    }

    /// Metadata of the pending session, if any
    pub fn pending(&self) -> Option<&ImpulseResponseMetadata> {
        (*self.pending).as_ref().map(Session::metadata)
    }

    /// Decode the pending session, emptying the slot
    pub fn read_and_convert(
        &mut self,
        target_sample_rate: u32,
        options: &ConvertOptions,
    ) -> Result<Vec<i32>> {
        let session = self.pending.take().ok_or(IrError::NoPendingSession)?;
        self.processor
            .read_and_convert(session, target_sample_rate, options)
    }
}

impl<C: Codec, E> Drop for SlotGuard<'_, C, E> {
    fn drop(&mut self) {
        if let Some(session) = self.pending.take() {
            debug!(
                "Guard released with {} still pending",
                session.path().display()
            );
            session.close();
        }
    }
}
