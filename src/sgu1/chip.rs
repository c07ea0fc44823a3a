//! SGU-1 chip facade
//!
//! The host calls [`Sgu1::tick`] once per emulated clock cycle with the current
//! pin state. Each tick first runs the sample clock (advancing the engine and
//! raising the SAMPLE pin on sample boundaries), then performs the bus access
//! if the chip is selected.

use log::{debug, trace};

use super::clock::SampleClock;
use super::config::Sgu1Config;
use super::decoder::{ChannelSelect, RegisterTarget};
use super::history::VoiceHistory;
use super::pins;
use super::registers::RegisterIndex;
use super::{CHANNEL_COUNT, CHANNEL_REGISTERS, VOICE_HISTORY_LEN};
use crate::backend::SoundEngine;
use crate::sound_unit::SoundUnit;

/// Full-scale divisor mapping engine output to `-1.0..=1.0`
const SAMPLE_SCALE: f32 = 1.0 / 32767.0;

/// SGU-1 instance state
pub struct Sgu1<E: SoundEngine = SoundUnit> {
    config: Sgu1Config,
    engine: E,
    clock: SampleClock,
    select: ChannelSelect,
    /// Last output sample (left, right), scaled by the configured magnitude
    sample: [f32; 2],
    history: Option<VoiceHistory>,
    /// Pins returned by the last tick, for debug inspection
    pins: u64,
}

impl Sgu1<SoundUnit> {
    /// Create a chip backed by the [`SoundUnit`] engine
    ///
    /// # Panics
    ///
    /// Panics if either frequency in `config` is zero.
    pub fn new(config: Sgu1Config) -> Self {
        Self::with_backend(config)
    }
}

impl<E: SoundEngine> Sgu1<E> {
    /// Create a chip with a freshly constructed engine of type `E`
    ///
    /// # Panics
    ///
    /// Panics if either frequency in `config` is zero.
    pub fn with_backend(config: Sgu1Config) -> Self {
        assert!(config.sound_hz > 0, "sound frequency must be positive");
        let engine = E::with_rate(CHANNEL_COUNT, config.sound_hz);
        Self::with_engine(config, engine)
    }

    /// Create a chip around an existing engine
    ///
    /// The channel-select latch pages over `engine.channel_count()` voices.
    ///
    /// # Panics
    ///
    /// Panics if either frequency in `config` is zero or the engine has no
    /// channels.
    pub fn with_engine(config: Sgu1Config, engine: E) -> Self {
        let channels = engine.channel_count();
        assert!(channels > 0, "engine must have at least one channel");
        let clock = SampleClock::new(config.tick_hz, config.sound_hz);
        let history = config
            .voice_history
            .then(|| VoiceHistory::new(engine.channel_count(), VOICE_HISTORY_LEN));
        debug!(
            "SGU-1 init: {} channels, tick {} Hz, sound {} Hz, period {}/{}",
            channels,
            config.tick_hz,
            config.sound_hz,
            clock.period(),
            clock.precision()
        );
        Sgu1 {
            config,
            engine,
            clock,
            select: ChannelSelect::new(channels),
            sample: [0.0; 2],
            history,
            pins: 0,
        }
    }

    /// Reset the chip to its power-on state
    ///
    /// Configuration (clock period, magnitude, history capacity) is kept.
    pub fn reset(&mut self) {
        debug!("SGU-1 reset");
        self.engine.reset();
        self.clock.reset();
        self.select.reset();
        self.sample = [0.0; 2];
        if let Some(history) = &mut self.history {
            history.clear();
        }
        self.pins = 0;
    }

    /// Tick the chip by one host clock cycle
    pub fn tick(&mut self, pins: u64) -> u64 {
        let mut pins = pins::with_sample_ready(pins & pins::PIN_MASK, false);

        let events = self.clock.tick();
        for _ in 0..events {
            self.generate_sample();
        }
        if events > 0 {
            pins = pins::with_sample_ready(pins, true);
        }

        if pins::is_selected(pins) {
            let addr = pins::address(pins);
            if pins::is_read(pins) {
                pins = pins::with_data(pins, self.reg_read(addr));
            } else {
                self.reg_write(addr, pins::data(pins));
            }
        }

        self.pins = pins;
        pins
    }

    fn generate_sample(&mut self) {
        let (l, r) = self.engine.next_sample();
        let mag = self.config.magnitude * SAMPLE_SCALE;
        self.sample = [l as f32 * mag, r as f32 * mag];

        if let Some(history) = &mut self.history {
            for ch in 0..history.channel_count() {
                if let Some(s) = self.engine.channel_sample(ch) {
                    history.push(ch, s);
                }
            }
        }
    }

    /// Read a register by external address, honouring the channel-select latch
    pub fn reg_read(&self, addr: u8) -> u8 {
        match self.select.resolve(addr) {
            RegisterTarget::ChannelSelect => self.select.value(),
            RegisterTarget::Engine(index) => self.engine.read(index),
        }
    }

    /// Write a register by external address, honouring the channel-select latch
    pub fn reg_write(&mut self, addr: u8, data: u8) {
        match self.select.resolve(addr) {
            RegisterTarget::ChannelSelect => {
                trace!("SGU-1 channel select <- {data:#04X}");
                self.select.set(data);
            }
            RegisterTarget::Engine(index) => {
                trace!("SGU-1 {} <- {data:#04X}", RegisterIndex(index));
                self.engine.write(index, data);
            }
        }
    }

    /// Write an absolute engine register, bypassing the latch
    pub fn write_absolute(&mut self, index: usize, data: u8) {
        self.engine.write(index, data);
    }

    /// Read an absolute engine register, bypassing the latch
    pub fn read_absolute(&self, index: usize) -> u8 {
        self.engine.read(index)
    }

    /// Write register `addr` of `channel` without disturbing the latch
    ///
    /// `channel` wraps modulo the engine's channel count.
    pub fn write_channel(&mut self, channel: usize, addr: u8, data: u8) {
        let channel = channel % self.select.channels();
        let index = channel * CHANNEL_REGISTERS + usize::from(addr & pins::CHANNEL_SELECT_ADDR);
        self.engine.write(index, data);
    }

    /// Raw channel-select latch value
    pub fn channel_select(&self) -> u8 {
        self.select.value()
    }

    /// Channel currently reachable through the address window
    pub fn selected_channel(&self) -> usize {
        self.select.channel()
    }

    /// Last output sample as a (left, right) pair
    pub fn sample(&self) -> [f32; 2] {
        self.sample
    }

    /// Last output sample folded to mono
    pub fn sample_mono(&self) -> f32 {
        (self.sample[0] + self.sample[1]) * 0.5
    }

    /// Pins returned by the last tick
    pub fn pins(&self) -> u64 {
        self.pins
    }

    /// Chip configuration
    pub fn config(&self) -> &Sgu1Config {
        &self.config
    }

    /// Sample clock divider state
    pub fn clock(&self) -> &SampleClock {
        &self.clock
    }

    /// Per-voice sample history, if enabled
    pub fn voice_history(&self) -> Option<&VoiceHistory> {
        self.history.as_ref()
    }

    /// Mute or unmute a voice
    pub fn set_channel_mute(&mut self, channel: usize, mute: bool) {
        self.engine.set_channel_mute(channel, mute);
    }

    /// Check if a voice is muted
    pub fn is_channel_muted(&self, channel: usize) -> bool {
        self.engine.is_channel_muted(channel)
    }

    /// Synthesis engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable synthesis engine
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

impl<E: SoundEngine> std::fmt::Debug for Sgu1<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sgu1")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("select", &self.select)
            .field("sample", &self.sample)
            .field("pins", &format_args!("{:#018X}", self.pins))
            .finish()
    }
}
