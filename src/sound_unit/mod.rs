//! SoundUnit synthesis engine
//!
//! Eight-voice wavetable synthesizer with the SGU-1 channel register layout
//! (see [`Register`](crate::sgu1::Register)). Each voice runs a phase
//! accumulator at the chip's native rate, picks one of eight waveforms, can be
//! ring-modulated by the next voice, passes through a state-variable filter and
//! is finally scaled by signed volume and panning.
//!
//! PCM playback and the sweep units are register-compatible (their registers
//! store and read back) but not synthesized; a voice in PCM mode is silent.

pub mod flags;
pub mod waveform;

use crate::backend::SoundEngine;
use crate::sgu1::{Register, CHANNEL_REGISTERS};
use flags::{Flags0, Flags1, Waveform};
use waveform::NoiseState;

/// Chip master clock in Hz
pub const CHIP_CLOCK: u32 = 618_000;
/// Master clock divider feeding the voices
pub const CHIP_DIVIDER: u32 = 2;
/// Native voice update rate
pub const NATIVE_RATE: u32 = CHIP_CLOCK / CHIP_DIVIDER;
/// Phase units per waveform cycle
pub const FREQ_BASE: u32 = 524_288;

/// Bits dropped from the 19-bit cycle position to get the 8-bit wave position
const WAVE_POS_SHIFT: u32 = 11;
/// Bits dropped from the cycle position to get the noise clock (32 per cycle)
const NOISE_POS_SHIFT: u32 = 14;

/// Per-voice synthesis state
#[derive(Debug, Clone, Copy, Default)]
struct Voice {
    /// Phase accumulator, modulo `FREQ_BASE * sample_rate`
    phase: u64,
    noise: NoiseState,
    /// Raw oscillator output for the current sample
    wave: i8,
    low: i32,
    band: i32,
    /// Post-volume mono output, the voice tap
    out: i16,
    muted: bool,
}

impl Voice {
    fn clear_filter(&mut self) {
        self.low = 0;
        self.band = 0;
    }

    /// Chamberlin state-variable filter step
    ///
    /// `cutoff` is a 16-bit coefficient (only the top 14 bits are used to keep
    /// the loop stable); `resonance` lowers the damping.
    fn filter(&mut self, input: i32, cutoff: u16, resonance: u8, flags: Flags0) -> i32 {
        let f = i32::from(cutoff >> 2);
        let q = 256 - i32::from(resonance);

        self.low = (self.low + ((f * self.band) >> 16)).clamp(-32768, 32767);
        let high = input - self.low - ((q * self.band) >> 8);
        self.band = (self.band + ((f * high) >> 16)).clamp(-32768, 32767);

        let mut out = 0;
        if flags.contains(Flags0::FILTER_LOW) {
            out += self.low;
        }
        if flags.contains(Flags0::FILTER_HIGH) {
            out += high;
        }
        if flags.contains(Flags0::FILTER_BAND) {
            out += self.band;
        }
        out
    }
}

/// Multi-voice SGU-1 synthesis engine
#[derive(Debug, Clone)]
pub struct SoundUnit {
    regs: Vec<u8>,
    voices: Vec<Voice>,
    sample_rate: u32,
    sine: [i8; 256],
}

impl SoundUnit {
    fn reg(&self, channel: usize, reg: Register) -> u8 {
        self.regs[channel * CHANNEL_REGISTERS + reg.offset() as usize]
    }

    fn reg16(&self, channel: usize, lo: Register) -> u16 {
        let base = channel * CHANNEL_REGISTERS + lo.offset() as usize;
        u16::from_le_bytes([self.regs[base], self.regs[base + 1]])
    }

    /// 16-bit frequency register of `channel`
    pub fn frequency(&self, channel: usize) -> u16 {
        if channel >= self.voices.len() {
            return 0;
        }
        self.reg16(channel, Register::FreqLo)
    }

    /// Output frequency in Hz produced by a frequency register value
    pub fn frequency_hz(freq: u16) -> f64 {
        f64::from(freq) * f64::from(NATIVE_RATE) / f64::from(FREQ_BASE)
    }

    /// Output sample rate this engine was created for
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Advance oscillator `channel` by one output sample and latch its raw wave
    fn run_oscillator(&mut self, channel: usize) {
        let rate = u64::from(self.sample_rate);
        let cycle = u64::from(FREQ_BASE) * rate;
        let step = u64::from(self.reg16(channel, Register::FreqLo)) * u64::from(NATIVE_RATE);
        let flags0 = self.reg(channel, Register::Flags0);
        let duty = self.reg(channel, Register::Duty);

        let voice = &mut self.voices[channel];
        let old_pos = voice.phase / rate;
        voice.phase = (voice.phase + step) % cycle;
        let pos = voice.phase / rate;

        let old_slot = (old_pos >> NOISE_POS_SHIFT) as u32;
        let slot = (pos >> NOISE_POS_SHIFT) as u32;
        let noise_clocks = slot.wrapping_sub(old_slot) & 0x1F;
        for _ in 0..noise_clocks {
            voice.noise.clock();
        }

        voice.wave = if Flags0::from_bits_truncate(flags0).contains(Flags0::PCM) {
            0
        } else {
            waveform::sample(
                Waveform::from_flags0(flags0),
                (pos >> WAVE_POS_SHIFT) as u8,
                duty,
                &self.sine,
                &voice.noise,
            )
        };
    }

    /// Ring mod, filter and volume for `channel`; returns the voice tap
    fn run_voice(&mut self, channel: usize) -> i16 {
        let flags = Flags0::from_bits_truncate(self.reg(channel, Register::Flags0));
        let cutoff = self.reg16(channel, Register::CutoffLo);
        let resonance = self.reg(channel, Register::Resonance);
        let volume = self.reg(channel, Register::Volume) as i8;

        let mut wave = i32::from(self.voices[channel].wave);
        if flags.contains(Flags0::RING_MOD) {
            let next = (channel + 1) % self.voices.len();
            wave = (wave * i32::from(self.voices[next].wave)) >> 7;
        }

        let input = wave << 8;
        let voice = &mut self.voices[channel];
        let filtered = if flags.filter_enabled() {
            voice.filter(input, cutoff, resonance, flags)
        } else {
            input
        };

        let out = ((filtered * i32::from(volume)) >> 7).clamp(-32768, 32767) as i16;
        voice.out = out;
        out
    }

    fn on_write(&mut self, channel: usize, offset: usize, value: u8) {
        if offset != Register::Flags1.offset() as usize {
            return;
        }
        let flags = Flags1::from_bits_truncate(value);
        let voice = &mut self.voices[channel];
        if flags.contains(Flags1::PHASE_RESET) {
            voice.phase = 0;
        }
        if flags.contains(Flags1::FILTER_PHASE_RESET) {
            voice.clear_filter();
        }
    }
}

/// Pan gains (left, right) out of 127 for a signed pan value
#[inline]
fn pan_gains(pan: i8) -> (i32, i32) {
    let pan = i32::from(pan).max(-127);
    (127 - pan.max(0), 127 + pan.min(0))
}

impl SoundEngine for SoundUnit {
    fn with_rate(channel_count: usize, sample_rate: u32) -> Self {
        assert!(sample_rate > 0, "sound frequency must be positive");
        SoundUnit {
            regs: vec![0; channel_count * CHANNEL_REGISTERS],
            voices: vec![Voice::default(); channel_count],
            sample_rate,
            sine: waveform::sine_table(),
        }
    }

    fn channel_count(&self) -> usize {
        self.voices.len()
    }

    fn reset(&mut self) {
        self.regs.fill(0);
        for voice in &mut self.voices {
            *voice = Voice {
                muted: voice.muted,
                ..Voice::default()
            };
        }
    }

    fn read(&self, index: usize) -> u8 {
        self.regs.get(index).copied().unwrap_or(0)
    }

    fn write(&mut self, index: usize, value: u8) {
        let Some(slot) = self.regs.get_mut(index) else {
            return;
        };
        *slot = value;
        self.on_write(index / CHANNEL_REGISTERS, index % CHANNEL_REGISTERS, value);
    }

    fn next_sample(&mut self) -> (i16, i16) {
        let channels = self.voices.len();
        for ch in 0..channels {
            self.run_oscillator(ch);
        }

        let (mut left, mut right) = (0i32, 0i32);
        for ch in 0..channels {
            let out = i32::from(self.run_voice(ch));
            if self.voices[ch].muted {
                continue;
            }
            let (gl, gr) = pan_gains(self.reg(ch, Register::Pan) as i8);
            left += out * gl / 127;
            right += out * gr / 127;
        }

        (
            (left >> 2).clamp(-32768, 32767) as i16,
            (right >> 2).clamp(-32768, 32767) as i16,
        )
    }

    fn channel_sample(&self, channel: usize) -> Option<i16> {
        self.voices.get(channel).map(|v| v.out)
    }

    fn set_channel_mute(&mut self, channel: usize, mute: bool) {
        if let Some(voice) = self.voices.get_mut(channel) {
            voice.muted = mute;
        }
    }

    fn is_channel_muted(&self, channel: usize) -> bool {
        self.voices.get(channel).is_some_and(|v| v.muted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 44_100;

    fn reg_index(channel: usize, reg: Register) -> usize {
        channel * CHANNEL_REGISTERS + reg.offset() as usize
    }

    /// Program `channel` with a waveform, frequency and full volume
    fn voice_on(su: &mut SoundUnit, channel: usize, wave: u8, freq: u16) {
        let [lo, hi] = freq.to_le_bytes();
        su.write(reg_index(channel, Register::FreqLo), lo);
        su.write(reg_index(channel, Register::FreqHi), hi);
        su.write(reg_index(channel, Register::Flags0), wave);
        su.write(reg_index(channel, Register::Duty), 0x80);
        su.write(reg_index(channel, Register::Volume), 0x7F);
    }

    #[test]
    fn test_power_on_is_silent() {
        let mut su = SoundUnit::with_rate(8, RATE);
        for _ in 0..1000 {
            assert_eq!(su.next_sample(), (0, 0));
        }
    }

    #[test]
    fn test_register_round_trip() {
        let mut su = SoundUnit::with_rate(8, RATE);
        for index in 0..8 * CHANNEL_REGISTERS {
            su.write(index, (index * 7) as u8);
        }
        for index in 0..8 * CHANNEL_REGISTERS {
            assert_eq!(su.read(index), (index * 7) as u8);
        }
    }

    #[test]
    fn test_out_of_range_access() {
        let mut su = SoundUnit::with_rate(2, RATE);
        su.write(10_000, 0xFF);
        assert_eq!(su.read(10_000), 0);
    }

    #[test]
    fn test_saw_frequency() {
        let mut su = SoundUnit::with_rate(8, RATE);
        let freq = 0x1000;
        voice_on(&mut su, 0, Waveform::Saw as u8, freq);

        // Count falling edges of the sawtooth over one second
        let mut prev = i32::from(i16::MIN);
        let mut wraps = 0;
        for _ in 0..RATE {
            su.next_sample();
            let tap = i32::from(su.channel_sample(0).unwrap());
            if tap < prev - 16_000 {
                wraps += 1;
            }
            prev = tap;
        }
        let expected = SoundUnit::frequency_hz(freq);
        assert!((wraps as f64 - expected).abs() <= 2.0, "{wraps} vs {expected}");
    }

    #[test]
    fn test_pan_hard_left() {
        let mut su = SoundUnit::with_rate(8, RATE);
        voice_on(&mut su, 0, Waveform::Pulse as u8, 0x0800);
        su.write(reg_index(0, Register::Pan), 0x80);
        for _ in 0..200 {
            let (_, r) = su.next_sample();
            assert_eq!(r, 0);
        }
        assert!(su.channel_sample(0).unwrap() != 0);
    }

    #[test]
    fn test_negative_volume_inverts() {
        let mut a = SoundUnit::with_rate(8, RATE);
        let mut b = SoundUnit::with_rate(8, RATE);
        voice_on(&mut a, 0, Waveform::Triangle as u8, 0x0400);
        voice_on(&mut b, 0, Waveform::Triangle as u8, 0x0400);
        b.write(reg_index(0, Register::Volume), 0x81); // -127
        for _ in 0..100 {
            let (la, _) = a.next_sample();
            let (lb, _) = b.next_sample();
            assert!((i32::from(la) + i32::from(lb)).abs() <= 1);
        }
    }

    #[test]
    fn test_mute_keeps_tap() {
        let mut su = SoundUnit::with_rate(8, RATE);
        voice_on(&mut su, 3, Waveform::Pulse as u8, 0x0800);
        su.set_channel_mute(3, true);
        assert!(su.is_channel_muted(3));
        let mut tap_seen = false;
        for _ in 0..100 {
            assert_eq!(su.next_sample(), (0, 0));
            tap_seen |= su.channel_sample(3).unwrap() != 0;
        }
        assert!(tap_seen);
        assert!(!su.is_channel_muted(99));
    }

    #[test]
    fn test_ring_mod_with_silent_neighbor() {
        let mut su = SoundUnit::with_rate(8, RATE);
        voice_on(&mut su, 0, Waveform::Pulse as u8 | Flags0::RING_MOD.bits(), 0x0800);
        // Channel 1 has frequency 0 and pulse duty 0: a constant high level
        su.write(reg_index(1, Register::Flags0), Waveform::Pulse as u8);
        let mut plain = SoundUnit::with_rate(8, RATE);
        voice_on(&mut plain, 0, Waveform::Pulse as u8, 0x0800);
        for _ in 0..100 {
            su.next_sample();
            plain.next_sample();
            let a = i32::from(su.channel_sample(0).unwrap());
            let b = i32::from(plain.channel_sample(0).unwrap());
            assert!((a - b).abs() <= 256, "{a} vs {b}");
        }
    }

    #[test]
    fn test_phase_reset_restarts_oscillator() {
        let mut su = SoundUnit::with_rate(8, RATE);
        voice_on(&mut su, 0, Waveform::Saw as u8, 0x2345);
        su.next_sample();
        let first = su.channel_sample(0);
        for _ in 0..37 {
            su.next_sample();
        }
        su.write(reg_index(0, Register::Flags1), Flags1::PHASE_RESET.bits());
        su.next_sample();
        assert_eq!(su.channel_sample(0), first);
        assert_eq!(su.read(reg_index(0, Register::Flags1)), 0x01);
    }

    #[test]
    fn test_lowpass_attenuates_high_frequency() {
        let peak = |cutoff: u16| {
            let mut su = SoundUnit::with_rate(8, RATE);
            let flags = Waveform::Pulse as u8 | Flags0::FILTER_LOW.bits();
            voice_on(&mut su, 0, flags, 0x8000);
            let [lo, hi] = cutoff.to_le_bytes();
            su.write(reg_index(0, Register::CutoffLo), lo);
            su.write(reg_index(0, Register::CutoffHi), hi);
            (0..4000)
                .map(|_| {
                    su.next_sample();
                    su.channel_sample(0).unwrap().unsigned_abs()
                })
                .skip(2000)
                .max()
                .unwrap_or(0)
        };
        assert!(peak(0x0400) < peak(0xFFFF) / 2);
    }

    #[test]
    fn test_reset_clears_registers_keeps_mute() {
        let mut su = SoundUnit::with_rate(8, RATE);
        voice_on(&mut su, 1, Waveform::Noise as u8, 0x1000);
        su.set_channel_mute(1, true);
        su.next_sample();
        su.reset();
        assert_eq!(su.read(reg_index(1, Register::Volume)), 0);
        assert_eq!(su.channel_sample(1), Some(0));
        assert!(su.is_channel_muted(1));
        assert_eq!(su.next_sample(), (0, 0));
    }

    #[test]
    fn test_pcm_mode_is_silent() {
        let mut su = SoundUnit::with_rate(8, RATE);
        voice_on(&mut su, 0, Waveform::Saw as u8 | Flags0::PCM.bits(), 0x1000);
        for _ in 0..100 {
            assert_eq!(su.next_sample(), (0, 0));
        }
    }
}
