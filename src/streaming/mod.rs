//! Sample handoff between the chip thread and an output thread
//!
//! The chip itself is single-threaded. Hosts that play audio in real time
//! tick it on a producer thread and drain finished samples elsewhere through
//! the SPSC [`RingBuffer`]. [`SampleStream`] adds backpressure and counters on
//! top of the raw ring.

pub mod realtime;
pub mod ring_buffer;

pub use realtime::{SampleStream, StreamStats};
pub use ring_buffer::RingBuffer;

/// Producer backoff when the ring is full, in microseconds
pub const BUFFER_BACKOFF_MICROS: u64 = 100;

/// Configuration for streamed output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Ring size in samples (not frames)
    pub ring_buffer_size: usize,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Interleaved channels per frame
    pub channels: u16,
}

impl StreamConfig {
    /// Stereo stream with a 4096-sample ring (~46 ms at 44.1 kHz)
    pub fn low_latency(sample_rate: u32) -> Self {
        StreamConfig {
            ring_buffer_size: 4096,
            sample_rate,
            channels: 2,
        }
    }

    /// Stereo stream with a 32768-sample ring (~372 ms at 44.1 kHz)
    pub fn stable(sample_rate: u32) -> Self {
        StreamConfig {
            ring_buffer_size: 32768,
            sample_rate,
            channels: 2,
        }
    }

    /// Ring latency in milliseconds
    pub fn latency_ms(&self) -> f32 {
        let frames = self.ring_buffer_size as f32 / f32::from(self.channels.max(1));
        frames / self.sample_rate as f32 * 1000.0
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::stable(crate::sgu1::config::DEFAULT_SOUND_HZ)
    }
}
