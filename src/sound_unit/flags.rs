//! Channel control flags
//!
//! Decoded views of the two per-channel control registers. Flags0 carries the
//! waveform in its low three bits, so the waveform is decoded separately from
//! the flag bits.

use bitflags::bitflags;

bitflags! {
    /// Control register 0 (waveform, PCM, ring mod and filter mode)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags0: u8 {
        /// Play from PCM memory instead of the oscillator
        const PCM = 0x08;
        /// Multiply with the next channel's oscillator
        const RING_MOD = 0x10;
        /// Filter low-pass output enable
        const FILTER_LOW = 0x20;
        /// Filter high-pass output enable
        const FILTER_HIGH = 0x40;
        /// Filter band-pass output enable
        const FILTER_BAND = 0x80;
    }
}

bitflags! {
    /// Control register 1 (resets, PCM loop and sweep enables)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags1: u8 {
        /// Restart the oscillator phase when written
        const PHASE_RESET = 0x01;
        /// Clear the filter state when written
        const FILTER_PHASE_RESET = 0x02;
        /// Loop PCM playback at the bound
        const PCM_LOOP = 0x08;
        /// Sync the restart timer to the oscillator
        const TIMER_SYNC = 0x10;
        /// Frequency sweep enable
        const FREQ_SWEEP = 0x20;
        /// Volume sweep enable
        const VOL_SWEEP = 0x40;
        /// Cutoff sweep enable
        const CUT_SWEEP = 0x80;
    }
}

impl Flags0 {
    /// Any filter output enabled
    pub fn filter_enabled(&self) -> bool {
        self.intersects(Flags0::FILTER_LOW | Flags0::FILTER_HIGH | Flags0::FILTER_BAND)
    }
}

/// Oscillator waveform, Flags0 bits 0-2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    /// Pulse with programmable duty
    Pulse = 0,
    /// Rising sawtooth
    Saw = 1,
    /// Sine
    Sine = 2,
    /// Triangle
    Triangle = 3,
    /// White noise
    Noise = 4,
    /// Short-period noise
    PeriodicNoise = 5,
    /// Sine with phase bits XORed in
    XorSine = 6,
    /// Triangle with phase bits XORed in
    XorTriangle = 7,
}

impl Waveform {
    /// Decode the waveform from a Flags0 register value
    pub fn from_flags0(value: u8) -> Self {
        match value & 0x07 {
            0 => Waveform::Pulse,
            1 => Waveform::Saw,
            2 => Waveform::Sine,
            3 => Waveform::Triangle,
            4 => Waveform::Noise,
            5 => Waveform::PeriodicNoise,
            6 => Waveform::XorSine,
            _ => Waveform::XorTriangle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_ignores_flag_bits() {
        assert_eq!(Waveform::from_flags0(0x00), Waveform::Pulse);
        assert_eq!(Waveform::from_flags0(0xF9), Waveform::Saw);
        assert_eq!(Waveform::from_flags0(0x07), Waveform::XorTriangle);
    }

    #[test]
    fn test_flags0_truncates_waveform() {
        let flags = Flags0::from_bits_truncate(0x33);
        assert!(flags.contains(Flags0::RING_MOD | Flags0::FILTER_LOW));
        assert!(!flags.contains(Flags0::PCM));
        assert!(flags.filter_enabled());
        assert!(!Flags0::from_bits_truncate(0x17).filter_enabled());
    }
}
