//! Register Address Decoder
//!
//! The external bus only carries a 6-bit address. The top address selects the
//! channel-select latch; every other address is an offset into the register
//! block of the channel the latch points at.
//!
//! The latch stores the full byte it was written. The channel number is only
//! reduced modulo the engine's channel count when the engine is indexed, so
//! software reading the latch back sees exactly what it wrote.

use super::pins::CHANNEL_SELECT_ADDR;
use super::CHANNEL_REGISTERS;

/// Where a bus access lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterTarget {
    /// The channel-select latch itself
    ChannelSelect,
    /// An absolute engine register index
    Engine(usize),
}

/// Resolve an external address against the latch value for an engine with
/// `channels` voices
pub fn resolve(addr: u8, select: u8, channels: usize) -> RegisterTarget {
    let addr = addr & CHANNEL_SELECT_ADDR;
    if addr == CHANNEL_SELECT_ADDR {
        RegisterTarget::ChannelSelect
    } else {
        RegisterTarget::Engine(absolute_index(select, addr, channels))
    }
}

/// Absolute engine register index for `addr` within the block of channel `select`
///
/// `select` wraps modulo `channels`; a zero count is treated as one channel.
#[inline]
pub fn absolute_index(select: u8, addr: u8, channels: usize) -> usize {
    (select as usize % channels.max(1)) * CHANNEL_REGISTERS + addr as usize
}

/// Channel-select latch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSelect {
    value: u8,
    channels: usize,
}

impl ChannelSelect {
    /// Create a latch selecting channel 0 of an engine with `channels` voices
    pub fn new(channels: usize) -> Self {
        Self {
            value: 0,
            channels: channels.max(1),
        }
    }

    /// Raw latch value, as last written
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Store a new latch value (any byte is accepted)
    pub fn set(&mut self, value: u8) {
        self.value = value;
    }

    /// Number of channels the latch pages over
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Channel the latch effectively addresses
    pub fn channel(&self) -> usize {
        self.value as usize % self.channels
    }

    /// Return to channel 0
    pub fn reset(&mut self) {
        self.value = 0;
    }

    /// Resolve an external address through this latch
    pub fn resolve(&self, addr: u8) -> RegisterTarget {
        resolve(addr, self.value, self.channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgu1::CHANNEL_COUNT;

    #[test]
    fn test_top_address_targets_latch() {
        for select in [0u8, 3, 7, 8, 0xFF] {
            assert_eq!(
                resolve(0x3F, select, CHANNEL_COUNT),
                RegisterTarget::ChannelSelect
            );
        }
    }

    #[test]
    fn test_engine_index() {
        assert_eq!(resolve(0x00, 0, CHANNEL_COUNT), RegisterTarget::Engine(0));
        assert_eq!(resolve(0x02, 1, CHANNEL_COUNT), RegisterTarget::Engine(66));
        assert_eq!(
            resolve(0x3E, 7, CHANNEL_COUNT),
            RegisterTarget::Engine(7 * 64 + 62)
        );
    }

    #[test]
    fn test_out_of_range_select_wraps_on_use() {
        let mut latch = ChannelSelect::new(CHANNEL_COUNT);
        latch.set(13);
        assert_eq!(latch.value(), 13);
        assert_eq!(latch.channel(), 5);
        assert_eq!(latch.resolve(0x04), RegisterTarget::Engine(5 * 64 + 4));
    }

    #[test]
    fn test_select_wraps_on_engine_channel_count() {
        let mut latch = ChannelSelect::new(4);
        latch.set(5);
        assert_eq!(latch.channel(), 1);
        assert_eq!(latch.resolve(0x00), RegisterTarget::Engine(64));
        assert_eq!(absolute_index(7, 0x3E, 4), 3 * 64 + 62);
        assert_eq!(absolute_index(9, 0x01, 1), 1);
    }

    #[test]
    fn test_zero_channels_pages_to_first_block() {
        let latch = ChannelSelect::new(0);
        assert_eq!(latch.channels(), 1);
        assert_eq!(resolve(0x10, 3, 0), RegisterTarget::Engine(0x10));
    }

    #[test]
    fn test_reset() {
        let mut latch = ChannelSelect::new(4);
        latch.set(0xFF);
        latch.reset();
        assert_eq!(latch.value(), 0);
        assert_eq!(latch.channels(), 4);
    }
}
