//! Per-voice sample history
//!
//! Fixed-capacity circular buffers of raw engine samples, one per voice. The
//! chip only fills them; oscilloscope-style consumers read them back.

/// Circular history of raw per-voice samples
#[derive(Debug, Clone)]
pub struct VoiceHistory {
    /// `channels * capacity` samples, voice-major
    samples: Vec<i16>,
    /// Next write position per voice
    cursors: Vec<usize>,
    capacity: usize,
}

impl VoiceHistory {
    /// Allocate history for `channels` voices of `capacity` samples each
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(channels: usize, capacity: usize) -> Self {
        assert!(capacity > 0, "voice history capacity must be positive");
        VoiceHistory {
            samples: vec![0; channels * capacity],
            cursors: vec![0; channels],
            capacity,
        }
    }

    /// Append a sample for `channel`, overwriting the oldest one
    ///
    /// Channels outside the configured range are ignored.
    #[inline]
    pub fn push(&mut self, channel: usize, sample: i16) {
        let Some(cursor) = self.cursors.get_mut(channel) else {
            return;
        };
        self.samples[channel * self.capacity + *cursor] = sample;
        *cursor += 1;
        if *cursor >= self.capacity {
            *cursor = 0;
        }
    }

    /// Raw ring storage for `channel` (not rotated)
    pub fn channel(&self, channel: usize) -> &[i16] {
        if channel >= self.cursors.len() {
            return &[];
        }
        let start = channel * self.capacity;
        &self.samples[start..start + self.capacity]
    }

    /// Next write position for `channel`
    pub fn cursor(&self, channel: usize) -> usize {
        self.cursors.get(channel).copied().unwrap_or(0)
    }

    /// Samples of `channel` from oldest to newest
    pub fn ordered(&self, channel: usize) -> impl Iterator<Item = i16> + '_ {
        let ring = self.channel(channel);
        let cursor = self.cursor(channel).min(ring.len());
        ring[cursor..].iter().chain(ring[..cursor].iter()).copied()
    }

    /// Number of voices tracked
    pub fn channel_count(&self) -> usize {
        self.cursors.len()
    }

    /// Samples kept per voice
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Zero all samples and rewind the cursors; capacity is unchanged
    pub fn clear(&mut self) {
        self.samples.fill(0);
        self.cursors.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_wraps_cursor() {
        let mut history = VoiceHistory::new(2, 4);
        for s in 1..=5 {
            history.push(1, s);
        }
        assert_eq!(history.cursor(1), 1);
        assert_eq!(history.channel(1), &[5, 2, 3, 4]);
        assert_eq!(history.channel(0), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_ordered_oldest_first() {
        let mut history = VoiceHistory::new(1, 3);
        for s in [10, 20, 30, 40] {
            history.push(0, s);
        }
        let ordered: Vec<i16> = history.ordered(0).collect();
        assert_eq!(ordered, vec![20, 30, 40]);
    }

    #[test]
    fn test_out_of_range_channel_ignored() {
        let mut history = VoiceHistory::new(1, 2);
        history.push(5, 7);
        assert!(history.channel(5).is_empty());
        assert_eq!(history.ordered(5).count(), 0);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut history = VoiceHistory::new(2, 8);
        history.push(0, 1);
        history.clear();
        assert_eq!(history.capacity(), 8);
        assert_eq!(history.cursor(0), 0);
        assert!(history.channel(0).iter().all(|&s| s == 0));
    }
}
