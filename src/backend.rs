//! Sound engine trait abstraction for SGU-1 synthesis backends
//!
//! The chip facade owns timing, bus decoding and channel paging. The actual
//! waveform synthesis is delegated to an engine implementing this trait, so
//! different synthesizers can be swapped in without touching the bus model.

/// Common interface for SGU-1 synthesis engines
///
/// Engines expose their state as a flat register file addressed by absolute
/// index: channel `c`, register `r` lives at `c * CHANNEL_REGISTERS + r`.
/// The chip facade computes these indices; engines never see the
/// channel-select latch.
///
/// This trait allows different implementations to be used interchangeably:
/// - [`SoundUnit`](crate::SoundUnit): multi-channel engine with per-voice taps
/// - `SoftSynth` (feature `softsynth`): float synthesizer producing a stereo mix only
///
/// # Example
///
/// ```
/// use sgu1::{SoundEngine, SoundUnit};
///
/// fn beep<E: SoundEngine>(engine: &mut E) -> (i16, i16) {
///     engine.write(0x00, 0x00); // Channel 0 frequency low
///     engine.write(0x01, 0x10); // Channel 0 frequency high
///     engine.write(0x02, 0x7F); // Channel 0 volume
///     engine.next_sample()
/// }
///
/// let mut engine = SoundUnit::with_rate(8, 44_100);
/// let _ = beep(&mut engine);
/// ```
pub trait SoundEngine: Send {
    /// Create an engine with `channel_count` voices producing samples at `sample_rate` Hz
    fn with_rate(channel_count: usize, sample_rate: u32) -> Self
    where
        Self: Sized;

    /// Number of voices this engine was created with
    fn channel_count(&self) -> usize;

    /// Reset the engine to its power-on state
    ///
    /// Clears all registers and synthesis state.
    fn reset(&mut self);

    /// Read a raw register byte by absolute index
    ///
    /// Indices outside the register file read as 0x00.
    fn read(&self, index: usize) -> u8;

    /// Write a raw register byte by absolute index
    ///
    /// Indices outside the register file are ignored.
    fn write(&mut self, index: usize, value: u8);

    /// Advance the engine by one output sample
    ///
    /// # Returns
    ///
    /// Stereo `(left, right)` pair at full 16-bit scale
    fn next_sample(&mut self) -> (i16, i16);

    /// Raw output of a single voice for the most recent sample
    ///
    /// Engines without per-voice taps return `None`. Default implementation
    /// returns `None`.
    fn channel_sample(&self, _channel: usize) -> Option<i16> {
        None
    }

    /// Mute or unmute a voice
    ///
    /// Default implementation is a no-op.
    fn set_channel_mute(&mut self, _channel: usize, _mute: bool) {}

    /// Check if a voice is muted
    fn is_channel_muted(&self, _channel: usize) -> bool {
        false
    }
}
