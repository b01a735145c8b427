//! Error handling for irkit
//!
//! Every failure is returned as a typed [`IrError`]; the library never logs
//! errors itself, so each variant carries enough detail for the caller to
//! log or surface it.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for irkit operations
pub type Result<T> = std::result::Result<T, IrError>;

/// Boxed source error carried by collaborator failures
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Why a codec could not open a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenFailureKind {
    /// The path does not exist or is not readable
    NotFound,
    /// The file exists but is not a decodable audio stream
    BadFormat,
}

impl std::fmt::Display for OpenFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpenFailureKind::NotFound => write!(f, "not found"),
            OpenFailureKind::BadFormat => write!(f, "bad format"),
        }
    }
}

/// Main error type for irkit operations
#[derive(Error, Debug)]
pub enum IrError {
    // Argument Errors
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    // Stream Validation Errors
    #[error("Unsupported channel layout: {channels} channels (expected 1, 2 or 4)")]
    UnsupportedChannelLayout { channels: u32 },

    #[error("Invalid stream metadata: sample rate {sample_rate} Hz, {frames} frames")]
    InvalidStreamMetadata { sample_rate: u32, frames: u64 },

    // File Errors
    #[error("Failed to open {path} ({kind})")]
    FileOpenFailure {
        path: PathBuf,
        kind: OpenFailureKind,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Failed to read frames: {reason}")]
    ReadFailure {
        reason: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Failed to write {path}: {reason}")]
    WriteFailure {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<BoxedSource>,
    },

    // Resource Errors
    #[error("Allocation failed for {samples} samples")]
    AllocationFailure { samples: usize },

    // Processing Errors
    #[error("Resampling failed: {reason}")]
    ResampleFailure { reason: String },

    // Session Errors
    #[error("No probed session is pending")]
    NoPendingSession,
}

impl IrError {
    /// Shorthand for an [`IrError::InvalidArgument`]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        IrError::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`IrError::ResampleFailure`]
    pub fn resample(reason: impl Into<String>) -> Self {
        IrError::ResampleFailure {
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            IrError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            IrError::UnsupportedChannelLayout { .. } => "UNSUPPORTED_CHANNEL_LAYOUT",
            IrError::InvalidStreamMetadata { .. } => "INVALID_STREAM_METADATA",
            IrError::FileOpenFailure { .. } => "FILE_OPEN_FAILURE",
            IrError::ReadFailure { .. } => "READ_FAILURE",
            IrError::WriteFailure { .. } => "WRITE_FAILURE",
            IrError::AllocationFailure { .. } => "ALLOCATION_FAILURE",
            IrError::ResampleFailure { .. } => "RESAMPLE_FAILURE",
            IrError::NoPendingSession => "NO_PENDING_SESSION",
        }
    }

    /// Check if retrying with different input could succeed
    ///
    /// Nothing is retried automatically; this only informs the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            IrError::InvalidArgument { .. }
                | IrError::FileOpenFailure { .. }
                | IrError::AllocationFailure { .. }
                | IrError::WriteFailure { .. }
                | IrError::NoPendingSession
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            IrError::InvalidArgument { .. } => vec![
                "Check that the path, filename and target rate are non-empty and non-zero",
            ],
            IrError::UnsupportedChannelLayout { .. } => vec![
                "Convert the impulse response to mono, stereo or 4-channel (true stereo)",
            ],
            IrError::InvalidStreamMetadata { .. } => vec![
                "The file declares no audio frames or no sample rate",
                "Re-export the impulse response from its source",
            ],
            IrError::FileOpenFailure {
                kind: OpenFailureKind::NotFound,
                ..
            } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            IrError::FileOpenFailure {
                kind: OpenFailureKind::BadFormat,
                ..
            } => vec![
                "Convert the impulse response to WAV (PCM or 32-bit float)",
                "The file may be corrupted - try re-exporting from source",
            ],
            IrError::AllocationFailure { .. } => vec![
                "Close other applications to free memory",
                "Use a shorter impulse response",
            ],
            IrError::WriteFailure { .. } => vec![
                "Check the output directory exists and is writable",
                "Free up disk space",
            ],
            IrError::NoPendingSession => vec!["Probe an impulse response before converting it"],
            _ => vec![],
        }
    }
}
