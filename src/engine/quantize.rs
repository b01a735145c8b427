//! Float to 16-bit-range fixed-point conversion
//!
//! A sample `s` maps to `round(s × 32768)`. Full-scale positive input
//! (`1.0`) lands one step above `i16::MAX`, so the caller picks what happens
//! to values outside the 16-bit range with a [`ClipPolicy`].

use serde::{Deserialize, Serialize};

use crate::engine::buffer::try_vec_with_capacity;
use crate::error::Result;

/// Scale from the nominal [-1.0, 1.0] float domain to fixed point
pub const FIXED_POINT_SCALE: f32 = 32768.0;

/// What to do with quantized values outside `i16::MIN..=i16::MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClipPolicy {
    /// Saturate to `[-32768, 32767]`
    #[default]
    Clamp,
    /// Keep the exact rounded value in the wider `i32` range
    Widen,
}

/// Quantize a single sample
///
/// NaN maps to 0 under both policies.
#[inline]
pub fn quantize_sample(sample: f32, policy: ClipPolicy) -> i32 {
    let scaled = (sample * FIXED_POINT_SCALE).round();
    match policy {
        ClipPolicy::Clamp => scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i32,
        // `as` saturates at the i32 bounds and sends NaN to 0
        ClipPolicy::Widen => scaled as i32,
    }
}

/// Quantize an interleaved buffer into a new vector of the same length
pub fn quantize(samples: &[f32], policy: ClipPolicy) -> Result<Vec<i32>> {
    let mut out = try_vec_with_capacity(samples.len())?;
    out.extend(samples.iter().map(|&s| quantize_sample(s, policy)));
    Ok(out)
}
