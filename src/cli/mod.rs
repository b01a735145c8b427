//! CLI Module
//!
//! Command-line interface for probing and converting impulse responses.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::engine::{ClipPolicy, ResampleQuality};

/// irkit - impulse-response probing and sample-rate conversion
#[derive(Parser, Debug)]
#[command(name = "irkit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the metadata of an impulse response
    #[command(name = "probe")]
    Probe {
        /// Path to the impulse response
        path: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode an impulse response to fixed point at a target rate
    #[command(name = "convert")]
    Convert {
        /// Path to the impulse response
        path: String,

        /// Target sample rate in Hz
        #[arg(short, long)]
        rate: u32,

        /// Interpolator used when the rates differ
        #[arg(short, long, value_enum, default_value_t = QualityArg::ZeroOrderHold)]
        quality: QualityArg,

        /// Handling of samples past the 16-bit range
        #[arg(long, value_enum, default_value_t = ClipArg::Clamp)]
        clip: ClipArg,

        /// Write the samples to this file as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a copy of an impulse response at a target rate
    #[command(name = "resample")]
    Resample {
        /// Directory holding the impulse response
        directory: String,

        /// File name inside the directory
        filename: String,

        /// Target sample rate in Hz
        #[arg(short, long)]
        rate: u32,

        /// Interpolator
        #[arg(short, long, value_enum, default_value_t = QualityArg::SincBest)]
        quality: QualityArg,

        /// Skip conversion if the converted file already exists
        #[arg(long)]
        reuse: bool,
    },
}

/// Resampler quality as typed on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum QualityArg {
    SincBest,
    SincMedium,
    SincFastest,
    ZeroOrderHold,
    Linear,
}

impl From<QualityArg> for ResampleQuality {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::SincBest => ResampleQuality::SincBest,
            QualityArg::SincMedium => ResampleQuality::SincMedium,
            QualityArg::SincFastest => ResampleQuality::SincFastest,
            QualityArg::ZeroOrderHold => ResampleQuality::ZeroOrderHold,
            QualityArg::Linear => ResampleQuality::Linear,
        }
    }
}

/// Clip policy as typed on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipArg {
    Clamp,
    Widen,
}

impl From<ClipArg> for ClipPolicy {
    fn from(arg: ClipArg) -> Self {
        match arg {
            ClipArg::Clamp => ClipPolicy::Clamp,
            ClipArg::Widen => ClipPolicy::Widen,
        }
    }
}
