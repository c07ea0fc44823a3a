//! Oscillator waveform generation
//!
//! All shapes are computed from an 8-bit phase position and return a signed
//! 8-bit amplitude. Noise shapes read shift registers owned by the voice.

use super::flags::Waveform;

/// Full-period 256-entry sine table, amplitude 127
pub fn sine_table() -> [i8; 256] {
    let mut table = [0i8; 256];
    for (i, slot) in table.iter_mut().enumerate() {
        let angle = i as f32 * std::f32::consts::TAU / 256.0;
        *slot = (angle.sin() * 127.0).round() as i8;
    }
    table
}

/// Triangle at phase `pos`
#[inline]
pub fn triangle(pos: u8) -> i8 {
    let p = pos as i16;
    let v = if p < 128 { p * 2 - 128 } else { 383 - p * 2 };
    v.clamp(-128, 127) as i8
}

/// Noise shift registers for one voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseState {
    /// 23-bit maximal-length LFSR
    pub lfsr: u32,
    /// 6-bit rotating pattern for periodic noise
    pub periodic: u8,
}

const LFSR_SEED: u32 = 0x1;
const PERIODIC_SEED: u8 = 0x01;

impl Default for NoiseState {
    fn default() -> Self {
        NoiseState {
            lfsr: LFSR_SEED,
            periodic: PERIODIC_SEED,
        }
    }
}

impl NoiseState {
    /// Clock both shift registers once
    #[inline]
    pub fn clock(&mut self) {
        let bit = (self.lfsr ^ (self.lfsr >> 5)) & 1;
        self.lfsr = (self.lfsr >> 1) | (bit << 22);
        self.periodic = ((self.periodic >> 1) | ((self.periodic & 1) << 5)) & 0x3F;
    }

    fn white(&self) -> i8 {
        self.lfsr as u8 as i8
    }

    fn periodic(&self) -> i8 {
        if self.periodic & 1 != 0 {
            127
        } else {
            -128
        }
    }
}

/// Evaluate `wave` at phase position `pos`
///
/// `duty` only affects the pulse shape: the output is high once the position
/// reaches it, so 0x80 is a square.
pub fn sample(wave: Waveform, pos: u8, duty: u8, sine: &[i8; 256], noise: &NoiseState) -> i8 {
    match wave {
        Waveform::Pulse => {
            if pos >= duty {
                127
            } else {
                -128
            }
        }
        Waveform::Saw => (pos as i16 - 128) as i8,
        Waveform::Sine => sine[pos as usize],
        Waveform::Triangle => triangle(pos),
        Waveform::Noise => noise.white(),
        Waveform::PeriodicNoise => noise.periodic(),
        Waveform::XorSine => (sine[pos as usize] as u8 ^ pos) as i8,
        Waveform::XorTriangle => (triangle(pos) as u8 ^ pos) as i8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_table_shape() {
        let sine = sine_table();
        assert_eq!(sine[0], 0);
        assert_eq!(sine[64], 127);
        assert_eq!(sine[192], -127);
    }

    #[test]
    fn test_triangle_extremes() {
        assert_eq!(triangle(0), -128);
        assert_eq!(triangle(128), 127);
        assert_eq!(triangle(255), -127);
    }

    #[test]
    fn test_pulse_duty() {
        let sine = sine_table();
        let noise = NoiseState::default();
        let highs = (0..=255u8)
            .filter(|&p| sample(Waveform::Pulse, p, 0x80, &sine, &noise) > 0)
            .count();
        assert_eq!(highs, 128);
    }

    #[test]
    fn test_lfsr_never_sticks_at_zero() {
        let mut noise = NoiseState::default();
        for _ in 0..10_000 {
            noise.clock();
            assert_ne!(noise.lfsr, 0);
        }
    }

    #[test]
    fn test_periodic_noise_repeats_every_six_clocks() {
        let mut noise = NoiseState::default();
        let start = noise.periodic;
        for _ in 0..6 {
            noise.clock();
        }
        assert_eq!(noise.periodic, start);
    }
}
