//! Sample-rate conversion using rubato
//!
//! The pipelines describe a conversion with a [`ResampleRequest`] and hand
//! it to a [`ResampleEngine`]. [`RubatoEngine`] runs the whole buffer through
//! a fixed-input rubato resampler, flushes the tail and removes the
//! resampler's delay, so the result always holds exactly
//! `output_frames × channels` samples.

use log::debug;
use rubato::{
    FastFixedIn, PolynomialDegree, Resampler as RubatoResampler, SincFixedIn,
    SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use serde::{Deserialize, Serialize};

use crate::engine::buffer::{total_samples, try_vec_with_capacity, AudioBuffer};
use crate::error::{IrError, Result};

/// Input frames fed to rubato per call
const CHUNK_FRAMES: usize = 1024;

/// Flushes allowed once the input runs out
const MAX_TAIL_FLUSHES: usize = 8;

// ============================================================================
// Quality
// ============================================================================

/// Converter quality ladder, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleQuality {
    /// Long windowed sinc, cubic kernel interpolation
    #[default]
    SincBest,
    /// Medium sinc
    SincMedium,
    /// Short sinc
    SincFastest,
    /// Sample-and-hold
    ZeroOrderHold,
    /// Straight-line interpolation
    Linear,
}

impl ResampleQuality {
    fn sinc_parameters(self) -> Option<SincInterpolationParameters> {
        let (sinc_len, f_cutoff, oversampling_factor, interpolation, window) = match self {
            ResampleQuality::SincBest => (
                256,
                0.95,
                256,
                SincInterpolationType::Cubic,
                WindowFunction::BlackmanHarris2,
            ),
            ResampleQuality::SincMedium => (
                128,
                0.925,
                128,
                SincInterpolationType::Linear,
                WindowFunction::BlackmanHarris2,
            ),
            ResampleQuality::SincFastest => (
                64,
                0.9,
                64,
                SincInterpolationType::Linear,
                WindowFunction::Blackman2,
            ),
            ResampleQuality::ZeroOrderHold | ResampleQuality::Linear => return None,
        };

        Some(SincInterpolationParameters {
            sinc_len,
            f_cutoff,
            interpolation,
            oversampling_factor,
            window,
        })
    }

    pub fn is_sinc(self) -> bool {
        matches!(
            self,
            ResampleQuality::SincBest | ResampleQuality::SincMedium | ResampleQuality::SincFastest
        )
    }

    fn polynomial_degree(self) -> Option<PolynomialDegree> {
        match self {
            ResampleQuality::ZeroOrderHold => Some(PolynomialDegree::Nearest),
            ResampleQuality::Linear => Some(PolynomialDegree::Linear),
            _ => None,
        }
    }
}

// ============================================================================
// Request
// ============================================================================

/// One whole-buffer conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampleRequest {
    pub source_rate: u32,
    pub target_rate: u32,
    /// `target_rate / source_rate`
    pub ratio: f64,
    pub input_frames: usize,
    /// `floor(input_frames × target_rate / source_rate)`
    pub output_frames: usize,
    pub channels: usize,
    pub quality: ResampleQuality,
}

impl ResampleRequest {
    /// Describe converting `input_frames` frames from `source_rate` to `target_rate`
    ///
    /// `output_frames` is computed here, once, in integer arithmetic. Every
    /// output buffer size is derived from it.
    pub fn new(
        source_rate: u32,
        target_rate: u32,
        input_frames: usize,
        channels: usize,
        quality: ResampleQuality,
    ) -> Result<Self> {
        if source_rate == 0 || target_rate == 0 {
            return Err(IrError::invalid_argument(format!(
                "sample rates must be positive (source {}, target {})",
                source_rate, target_rate
            )));
        }
        if channels == 0 {
            return Err(IrError::invalid_argument("resampling needs at least one channel"));
        }

        let exact = input_frames as u128 * u128::from(target_rate) / u128::from(source_rate);
        let output_frames = usize::try_from(exact).map_err(|_| IrError::AllocationFailure {
            samples: usize::MAX,
        })?;
        if output_frames == 0 {
            return Err(IrError::resample(format!(
                "{} frames at {} Hz leave no frames at {} Hz",
                input_frames, source_rate, target_rate
            )));
        }

        Ok(ResampleRequest {
            source_rate,
            target_rate,
            ratio: f64::from(target_rate) / f64::from(source_rate),
            input_frames,
            output_frames,
            channels,
            quality,
        })
    }

    /// Interleaved length of the converted buffer
    pub fn output_samples(&self) -> Result<usize> {
        total_samples(self.output_frames, self.channels)
    }

    /// Reject engine output that does not match this request's layout
    pub fn check_output(&self, output: &AudioBuffer) -> Result<()> {
        let expected = self.output_samples()?;
        if output.num_channels() != self.channels || output.len() != expected {
            return Err(IrError::resample(format!(
                "engine returned {} samples x {} channels, expected {} x {}",
                output.len(),
                output.num_channels(),
                expected,
                self.channels
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Sample-rate converter used by both pipelines
pub trait ResampleEngine {
    /// Convert `input` as described by `request`
    ///
    /// On success the returned buffer holds exactly `request.output_frames`
    /// frames of `request.channels` channels.
    fn resample(&self, input: &AudioBuffer, request: &ResampleRequest) -> Result<AudioBuffer>;
}

/// Whole-buffer conversion through rubato
#[derive(Debug, Clone, Copy, Default)]
pub struct RubatoEngine;

impl ResampleEngine for RubatoEngine {
    fn resample(&self, input: &AudioBuffer, request: &ResampleRequest) -> Result<AudioBuffer> {
        if input.num_channels() != request.channels || input.num_frames() != request.input_frames {
            return Err(IrError::resample(format!(
                "buffer is {} frames x {} channels, request is {} x {}",
                input.num_frames(),
                input.num_channels(),
                request.input_frames,
                request.channels
            )));
        }

        debug!(
            "Resampling {} frames {}Hz -> {}Hz ({} channels, {:?})",
            request.input_frames,
            request.source_rate,
            request.target_rate,
            request.channels,
            request.quality
        );

        let planar = input.to_planar()?;

        let converted = if request.quality.is_sinc() {
            run_to_length(
                |channels| sinc_resampler(request, channels),
                &planar,
                request.output_frames,
            )?
        } else {
            run_to_length(
                |channels| polynomial_resampler(request, channels),
                &planar,
                request.output_frames,
            )?
        };

        let output = AudioBuffer::from_planar(&converted)?;
        debug!("Resampled to {} frames", output.num_frames());
        Ok(output)
    }
}

fn sinc_resampler(request: &ResampleRequest, channels: usize) -> Result<SincFixedIn<f32>> {
    let params = request.quality.sinc_parameters().ok_or_else(|| {
        IrError::resample(format!("{:?} is not a sinc interpolator", request.quality))
    })?;
    SincFixedIn::<f32>::new(request.ratio, 1.0, params, CHUNK_FRAMES, channels)
        .map_err(|e| IrError::resample(format!("failed to create sinc resampler: {}", e)))
}

fn polynomial_resampler(request: &ResampleRequest, channels: usize) -> Result<FastFixedIn<f32>> {
    let degree = request.quality.polynomial_degree().ok_or_else(|| {
        IrError::resample(format!("no interpolator for {:?}", request.quality))
    })?;
    FastFixedIn::<f32>::new(request.ratio, 1.0, degree, CHUNK_FRAMES, channels)
        .map_err(|e| IrError::resample(format!("failed to create resampler: {}", e)))
}

/// Push every input frame through a resampler built by `make` and return
/// exactly `output_frames` frames per channel, delay-compensated
///
/// `make` is called twice: once for a mono resampler that measures the
/// delay, once for the real run.
fn run_to_length<R, F>(make: F, planar: &[Vec<f32>], output_frames: usize) -> Result<Vec<Vec<f32>>>
where
    R: RubatoResampler<f32>,
    F: Fn(usize) -> Result<R>,
{
    let delay = measured_delay(&make)?;
    let mut resampler = make(planar.len())?;
    let mut output = collect(&mut resampler, planar, delay + output_frames)?;

    for channel in output.iter_mut() {
        channel.drain(..delay);
        channel.truncate(output_frames);
    }

    Ok(output)
}

/// Output frames between an input frame and its converted counterpart
///
/// `output_delay()` does not match the real latency of every rubato
/// resampler, so a unit impulse at frame 0 is pushed through a fresh mono
/// resampler and the position of its peak is taken as the delay.
fn measured_delay<R, F>(make: &F) -> Result<usize>
where
    R: RubatoResampler<f32>,
    F: Fn(usize) -> Result<R>,
{
    let mut resampler = make(1)?;
    let mut impulse = try_vec_with_capacity(resampler.input_frames_next())?;
    impulse.resize(resampler.input_frames_next(), 0.0);
    if let Some(first) = impulse.first_mut() {
        *first = 1.0;
    }

    let reach = 2 * resampler.output_delay() + resampler.output_frames_max();
    let response = collect(&mut resampler, &[impulse], reach)?;

    let (delay, peak) = response
        .first()
        .map(|channel| peak_position(channel))
        .unwrap_or((0, 0.0));
    if peak <= 0.0 {
        return Err(IrError::resample("resampler gave no response to an impulse"));
    }

    debug!(
        "Measured delay {} frames (rubato reports {})",
        delay,
        resampler.output_delay()
    );
    Ok(delay)
}

/// Index and magnitude of the first largest sample
fn peak_position(samples: &[f32]) -> (usize, f32) {
    samples
        .iter()
        .enumerate()
        .fold((0, 0.0_f32), |(best, peak), (i, s)| {
            if s.abs() > peak {
                (i, s.abs())
            } else {
                (best, peak)
            }
        })
}

/// Feed `planar` through `resampler`, then flush until at least `wanted`
/// frames per channel have come out
///
/// # Errors
/// * `ResampleFailure` - If rubato fails, or the tail has not arrived after
///   `MAX_TAIL_FLUSHES` flushes
fn collect<R: RubatoResampler<f32>>(
    resampler: &mut R,
    planar: &[Vec<f32>],
    wanted: usize,
) -> Result<Vec<Vec<f32>>> {
    let input_frames = planar.first().map_or(0, Vec::len);

    let mut output = planar
        .iter()
        .map(|_| try_vec_with_capacity(wanted + resampler.output_frames_max()))
        .collect::<Result<Vec<Vec<f32>>>>()?;

    let mut position = 0;
    let mut flushes = 0;

    while output.first().map_or(0, Vec::len) < wanted {
        let next = resampler.input_frames_next();
        let chunk = if position + next <= input_frames {
            let slices: Vec<&[f32]> = planar
                .iter()
                .map(|ch| &ch[position..position + next])
                .collect();
            position += next;
            resampler.process(slices.as_slice(), None)
        } else if position < input_frames {
            let slices: Vec<&[f32]> = planar.iter().map(|ch| &ch[position..]).collect();
            position = input_frames;
            resampler.process_partial(Some(slices.as_slice()), None)
        } else {
            if flushes == MAX_TAIL_FLUSHES {
                break;
            }
            flushes += 1;
            resampler.process_partial::<&[f32]>(None, None)
        }
        .map_err(|e| IrError::resample(e.to_string()))?;

        for (out, converted) in output.iter_mut().zip(&chunk) {
            out.extend_from_slice(converted);
        }
    }

    let produced = output.first().map_or(0, Vec::len);
    if produced < wanted {
        return Err(IrError::resample(format!(
            "resampler stalled after {} of {} frames",
            produced, wanted
        )));
    }

    Ok(output)
}

// ============================================================================
// Tests
// ============================================================================
