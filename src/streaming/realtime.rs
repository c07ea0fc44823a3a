//! Backpressured sample stream
//!
//! Wraps a shared [`RingBuffer`] with blocking and non-blocking writes and
//! running counters. The producer side owns a clone of the stream; the
//! consumer side reads from the same ring.

use super::{RingBuffer, StreamConfig, BUFFER_BACKOFF_MICROS};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Counters for monitoring stream health
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StreamStats {
    /// Non-blocking writes that could not store every sample
    pub overrun_count: usize,
    /// Samples accepted by the ring
    pub samples_written: usize,
    /// Samples handed to the consumer
    pub samples_read: usize,
    /// Ring fill level after the last operation
    pub fill_percentage: f32,
}

/// Stereo sample stream over a shared ring
#[derive(Debug, Clone)]
pub struct SampleStream {
    buffer: Arc<RingBuffer>,
    config: StreamConfig,
    stats: Arc<Mutex<StreamStats>>,
}

impl SampleStream {
    /// Allocate a stream for `config`
    ///
    /// # Errors
    ///
    /// Propagates [`RingBuffer::new`] sizing errors.
    pub fn new(config: StreamConfig) -> crate::Result<Self> {
        Ok(SampleStream {
            buffer: Arc::new(RingBuffer::new(config.ring_buffer_size)?),
            config,
            stats: Arc::new(Mutex::new(StreamStats::default())),
        })
    }

    /// Write every sample, sleeping while the ring is full
    ///
    /// Only returns once all of `samples` has been queued, so the consumer must
    /// keep draining.
    pub fn write_blocking(&self, samples: &[f32]) -> usize {
        let mut remaining = samples;
        while !remaining.is_empty() {
            let written = self.buffer.write(remaining);
            self.record_write(written, false);
            if written == 0 {
                std::thread::sleep(Duration::from_micros(BUFFER_BACKOFF_MICROS));
            } else {
                remaining = &remaining[written..];
            }
        }
        samples.len()
    }

    /// Write what fits; a short write counts as an overrun
    pub fn write_nonblocking(&self, samples: &[f32]) -> usize {
        let written = self.buffer.write(samples);
        self.record_write(written, written < samples.len());
        written
    }

    /// Drain up to `dest.len()` samples
    pub fn read(&self, dest: &mut [f32]) -> usize {
        let read = self.buffer.read(dest);
        let mut stats = self.stats.lock();
        stats.samples_read += read;
        stats.fill_percentage = self.buffer.fill_percentage();
        read
    }

    fn record_write(&self, written: usize, overrun: bool) {
        let mut stats = self.stats.lock();
        if overrun {
            stats.overrun_count += 1;
        }
        stats.samples_written += written;
        stats.fill_percentage = self.buffer.fill_percentage();
    }

    /// Samples queued for the consumer
    pub fn available_read(&self) -> usize {
        self.buffer.available_read()
    }

    /// Room left in the ring
    pub fn available_write(&self) -> usize {
        self.buffer.available_write()
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> StreamStats {
        *self.stats.lock()
    }

    /// Drop all queued samples
    pub fn flush(&self) {
        self.buffer.flush();
    }

    /// Ring fill level (0.0 to 1.0)
    pub fn fill_percentage(&self) -> f32 {
        self.buffer.fill_percentage()
    }

    /// Stream configuration
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Shared ring, for consumers that poll it directly
    pub fn buffer(&self) -> Arc<RingBuffer> {
        Arc::clone(&self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonblocking_overrun_counted() {
        let stream = SampleStream::new(StreamConfig {
            ring_buffer_size: 8,
            sample_rate: 44_100,
            channels: 2,
        })
        .unwrap();
        assert_eq!(stream.write_nonblocking(&[0.5; 12]), 7);
        let stats = stream.stats();
        assert_eq!(stats.overrun_count, 1);
        assert_eq!(stats.samples_written, 7);
    }

    #[test]
    fn test_blocking_write_with_consumer() {
        let stream = SampleStream::new(StreamConfig {
            ring_buffer_size: 16,
            sample_rate: 44_100,
            channels: 2,
        })
        .unwrap();
        let producer = {
            let stream = stream.clone();
            std::thread::spawn(move || stream.write_blocking(&[0.25; 1000]))
        };

        let mut total = 0;
        let mut dest = [0.0; 32];
        while total < 1000 {
            let n = stream.read(&mut dest);
            assert!(dest[..n].iter().all(|&s| s == 0.25));
            total += n;
            if n == 0 {
                std::thread::yield_now();
            }
        }
        assert_eq!(producer.join().unwrap(), 1000);
        let stats = stream.stats();
        assert_eq!(stats.samples_written, 1000);
        assert_eq!(stats.samples_read, 1000);
        assert_eq!(stats.overrun_count, 0);
    }

    #[test]
    fn test_bad_size_rejected() {
        let config = StreamConfig {
            ring_buffer_size: 0,
            ..StreamConfig::default()
        };
        assert!(SampleStream::new(config).is_err());
    }
}
