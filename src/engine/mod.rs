//! Impulse-Response Engine
//!
//! Both conversion paths and the pieces they share:
//! - Metadata probe and caller-owned sessions
//! - Decode-and-convert to fixed point (in memory)
//! - Offline conversion to a new file (on disk)
//! - Sample-rate conversion and quantization

pub mod buffer;
pub mod convert;
pub mod metadata;
pub mod offline;
pub mod probe;
pub mod processor;
pub mod quantize;
pub mod resample;
pub mod session;

pub use buffer::{AudioBuffer, ChannelLayout};
pub use convert::ConvertOptions;
pub use metadata::ImpulseResponseMetadata;
pub use offline::{offline_resample, OfflineOptions, ResampledAsset};
pub use probe::{open_validated, probe, probe_impulse_response};
pub use processor::IrProcessor;
pub use quantize::{quantize, quantize_sample, ClipPolicy, FIXED_POINT_SCALE};
pub use resample::{ResampleEngine, ResampleQuality, ResampleRequest, RubatoEngine};
pub use session::{Session, SessionSlot, SlotGuard};
