//! SGU-1 Sound Generator Unit emulator
//!
//! A bus-level emulation of the SGU-1 sound chip as it is wired into a larger
//! computer emulator. The host drives the chip once per emulated clock cycle
//! with a bit-packed 64-bit pin value; the chip decodes chip-select, read/write,
//! address and data lines, derives audio sample timing from the tick rate, and
//! raises a virtual "sample ready" pin whenever a new output sample exists.
//!
//! # Features
//! - Fixed-point clock divider from any tick rate to the audio sample rate
//! - 6-bit external register window paged onto 8 channel register blocks
//!   through a channel-select latch
//! - Pluggable synthesis engines behind the [`SoundEngine`] trait
//! - Optional per-voice sample history for oscilloscope-style inspection
//! - Single-producer/single-consumer sample handoff for hosts with an audio thread
//!
//! # Crate feature flags
//! - `export-wav` (default): WAV rendering of collected samples (enables `hound`)
//! - `softsynth` (opt-in): Experimental float synthesizer engine (`softsynth`)
//!
//! # Quick start
//! ```
//! use sgu1::sgu1::pins;
//! use sgu1::{Sgu1, Sgu1Config};
//!
//! let mut chip = Sgu1::new(Sgu1Config::default());
//!
//! // Select channel 2, then write its volume register
//! chip.tick(pins::write_request(pins::CHANNEL_SELECT_ADDR, 2));
//! chip.tick(pins::write_request(0x02, 0x7F));
//!
//! let out = chip.tick(pins::read_request(0x02));
//! assert_eq!(pins::data(out), 0x7F);
//! ```

#![warn(missing_docs)]

pub mod backend; // Sound engine trait abstraction
pub mod sgu1; // SGU-1 bus model, clock divider, decoder and chip facade
pub mod sound_unit; // Multi-channel reference engine
pub mod streaming; // Sample handoff to a consumer thread

#[cfg(feature = "export-wav")]
pub mod export; // WAV rendering
#[cfg(feature = "softsynth")]
/// Experimental software synthesizer engine (stereo mix only)
pub mod softsynth;

/// Error types for SGU-1 emulator operations
///
/// The bus protocol itself never fails: malformed pin values are masked and
/// out-of-range channel selections are normalized on use. These errors cover
/// the surrounding surface (configuration, buffers, export).
#[derive(thiserror::Error, Debug)]
pub enum Sgu1Error {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Configuration text could not be parsed
    #[error("Configuration parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error from filesystem or device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error writing audio file
    #[error("Audio file write error: {0}")]
    AudioFileError(String),

    /// Sample buffer error
    #[error("Sample buffer error: {0}")]
    BufferError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for Sgu1Error {
    /// Converts a String into `Sgu1Error::Other`.
    ///
    /// Prefer the specific variant constructors where the failure kind is known.
    fn from(msg: String) -> Self {
        Sgu1Error::Other(msg)
    }
}

impl From<&str> for Sgu1Error {
    /// Converts a string slice into `Sgu1Error::Other`.
    fn from(msg: &str) -> Self {
        Sgu1Error::Other(msg.to_string())
    }
}

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, Sgu1Error>;

// Public API exports
pub use backend::SoundEngine;
pub use sgu1::{Sgu1, Sgu1Config};
pub use sound_unit::SoundUnit;
pub use streaming::{RingBuffer, SampleStream, StreamConfig};

#[cfg(feature = "export-wav")]
pub use export::{export_to_wav, render_ticks, write_wav, ExportConfig};
#[cfg(feature = "softsynth")]
pub use softsynth::SoftSynth;
