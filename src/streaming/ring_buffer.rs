//! Ring buffer for handing chip samples to a consumer thread
//!
//! The chip is ticked on a producer thread; a consumer (audio device, file
//! writer) drains samples at its own pace. Memory is fixed at
//! `capacity * size_of::<f32>()` regardless of run length.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{Result, Sgu1Error};

/// 512 MiB worth of f32 samples
const MAX_CAPACITY: usize = 512 * 1024 * 1024 / std::mem::size_of::<f32>();

/// Single-producer/single-consumer sample ring
///
/// # Thread Safety
/// - One producer thread (chip tick loop)
/// - One consumer thread (playback or export)
/// - Buffer storage sits behind a `parking_lot::Mutex`; the cursors are
///   atomics so fill levels can be polled without taking the lock
///
/// Cursors count samples monotonically and are only reduced to an index with
/// `mask`, so one slot is always kept free to tell full from empty.
#[derive(Debug)]
pub struct RingBuffer {
    buffer: Mutex<Vec<f32>>,
    write_pos: AtomicUsize,
    read_pos: AtomicUsize,
    /// Power of two
    capacity: usize,
    mask: usize,
}

impl RingBuffer {
    /// Create a ring holding at least `requested_capacity` samples
    ///
    /// Capacity is rounded up to the next power of two.
    ///
    /// # Errors
    ///
    /// [`Sgu1Error::BufferError`] if the capacity is zero or would exceed 512 MiB.
    pub fn new(requested_capacity: usize) -> Result<Self> {
        if requested_capacity == 0 {
            return Err(Sgu1Error::BufferError(
                "ring buffer capacity must be greater than 0".into(),
            ));
        }
        if requested_capacity > MAX_CAPACITY {
            return Err(Sgu1Error::BufferError(format!(
                "ring buffer capacity {requested_capacity} exceeds maximum {MAX_CAPACITY}"
            )));
        }

        let capacity = requested_capacity.next_power_of_two();
        Ok(RingBuffer {
            buffer: Mutex::new(vec![0.0; capacity]),
            write_pos: AtomicUsize::new(0),
            read_pos: AtomicUsize::new(0),
            capacity,
            mask: capacity - 1,
        })
    }

    /// Slots in the ring (one is always kept free)
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn used(&self, write: usize, read: usize) -> usize {
        write.wrapping_sub(read)
    }

    /// Samples ready to be read
    pub fn available_read(&self) -> usize {
        let write = self.write_pos.load(Ordering::Acquire);
        let read = self.read_pos.load(Ordering::Acquire);
        self.used(write, read)
    }

    /// Samples that can be written without overwriting unread data
    pub fn available_write(&self) -> usize {
        self.capacity - 1 - self.available_read()
    }

    /// Write as many of `samples` as fit, returning the count written
    pub fn write(&self, samples: &[f32]) -> usize {
        let mut buf = self.buffer.lock();

        let write_pos = self.write_pos.load(Ordering::Acquire);
        let read_pos = self.read_pos.load(Ordering::Acquire);
        let free = self.capacity - 1 - self.used(write_pos, read_pos);
        let to_write = samples.len().min(free);
        if to_write == 0 {
            return 0;
        }

        let start = write_pos & self.mask;
        let first = to_write.min(self.capacity - start);
        buf[start..start + first].copy_from_slice(&samples[..first]);
        buf[..to_write - first].copy_from_slice(&samples[first..to_write]);
        drop(buf);

        self.write_pos
            .store(write_pos.wrapping_add(to_write), Ordering::Release);
        to_write
    }

    /// Read up to `dest.len()` samples, returning the count read
    pub fn read(&self, dest: &mut [f32]) -> usize {
        let buf = self.buffer.lock();

        let write_pos = self.write_pos.load(Ordering::Acquire);
        let read_pos = self.read_pos.load(Ordering::Acquire);
        let to_read = dest.len().min(self.used(write_pos, read_pos));
        if to_read == 0 {
            return 0;
        }

        let start = read_pos & self.mask;
        let first = to_read.min(self.capacity - start);
        dest[..first].copy_from_slice(&buf[start..start + first]);
        dest[first..to_read].copy_from_slice(&buf[..to_read - first]);
        drop(buf);

        self.read_pos
            .store(read_pos.wrapping_add(to_read), Ordering::Release);
        to_read
    }

    /// Discard all unread samples
    pub fn flush(&self) {
        let _guard = self.buffer.lock();
        let write_pos = self.write_pos.load(Ordering::Acquire);
        self.read_pos.store(write_pos, Ordering::Release);
    }

    /// No samples waiting
    pub fn is_empty(&self) -> bool {
        self.available_read() == 0
    }

    /// No room for another sample
    pub fn is_full(&self) -> bool {
        self.available_write() == 0
    }

    /// Fill level (0.0 to 1.0)
    pub fn fill_percentage(&self) -> f32 {
        self.available_read() as f32 / self.capacity as f32
    }
}
