//! SGU-1 Chip Domain
//!
//! Bus-level model of the SGU-1 sound generator: pin encoding, clock divider,
//! channel-paged register decoding and the chip facade tying them together.
//!
//! Implementation:
//! - `pins` - Bit layout of the 64-bit pin bus and pure encode/decode helpers
//! - `clock` - Fixed-point tick-to-sample divider
//! - `decoder` - Channel-select latch and register address resolution
//! - `chip` - The `Sgu1` facade driven by `tick`

// Internal modules
pub mod chip;
pub mod clock;
pub mod config;
pub mod decoder;
pub mod history;
pub mod pins;
pub mod registers;

// Re-export public API
pub use chip::Sgu1;
pub use clock::SampleClock;
pub use config::Sgu1Config;
pub use decoder::{ChannelSelect, RegisterTarget};
pub use history::VoiceHistory;
pub use registers::{Register, RegisterIndex};

/// Number of voices on the chip
pub const CHANNEL_COUNT: usize = 8;

/// Size of each voice's register block (the external address window)
pub const CHANNEL_REGISTERS: usize = 64;

/// Samples kept per voice when voice history is enabled
pub const VOICE_HISTORY_LEN: usize = 1024;
