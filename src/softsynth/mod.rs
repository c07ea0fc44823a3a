use crate::backend::SoundEngine;
use crate::sgu1::{Register, CHANNEL_REGISTERS};
use crate::sound_unit::SoundUnit;
use std::f32::consts::PI;

const MIN_CUTOFF: f32 = 100.0;
const MAX_CUTOFF: f32 = 12_000.0;

#[derive(Clone, Copy, Debug)]
struct BiquadLP {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    z1: f32,
    z2: f32,
}

impl BiquadLP {
    fn new() -> Self {
        Self {
            b0: 0.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    fn set_lowpass(&mut self, cutoff: f32, q: f32, sample_rate: f32) {
        let cutoff = cutoff.min(sample_rate * 0.45);
        let w0 = 2.0 * PI * (cutoff / sample_rate);
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q.max(0.1));
        let a0 = 1.0 + alpha;
        self.b0 = (1.0 - cos_w0) * 0.5 / a0;
        self.b1 = (1.0 - cos_w0) / a0;
        self.b2 = (1.0 - cos_w0) * 0.5 / a0;
        self.a1 = -2.0 * cos_w0 / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    // Transposed direct form II
    fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }

    fn clear(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

#[derive(Clone, Copy, Debug)]
struct SoftVoice {
    phase: f32,
    phase_inc: f32,
    amp: f32,
    pan: f32,
    pwm_width: f32,
    biq: BiquadLP,
    muted: bool,
}

impl SoftVoice {
    fn new() -> Self {
        SoftVoice {
            phase: 0.0,
            phase_inc: 0.0,
            amp: 0.0,
            pan: 0.0,
            pwm_width: 0.5,
            biq: BiquadLP::new(),
            muted: false,
        }
    }

    /// Pull the voice parameters from its register block
    fn update(&mut self, regs: &[u8], sample_rate: f32) {
        let freq = u16::from_le_bytes([
            regs[Register::FreqLo.offset() as usize],
            regs[Register::FreqHi.offset() as usize],
        ]);
        let hz = SoundUnit::frequency_hz(freq) as f32;
        self.phase_inc = if hz > 0.0 {
            (2.0 * PI * hz / sample_rate).min(PI)
        } else {
            0.0
        };

        // Signed volume: negative values invert the voice
        self.amp = f32::from(regs[Register::Volume.offset() as usize] as i8) / 127.0;
        self.pan = (f32::from(regs[Register::Pan.offset() as usize] as i8) / 127.0).clamp(-1.0, 1.0);
        self.pwm_width =
            (f32::from(regs[Register::Duty.offset() as usize]) / 256.0).clamp(0.05, 0.95);

        let cutoff = u16::from_le_bytes([
            regs[Register::CutoffLo.offset() as usize],
            regs[Register::CutoffHi.offset() as usize],
        ]);
        let cut_hz = if cutoff == 0 {
            MAX_CUTOFF
        } else {
            MIN_CUTOFF + (MAX_CUTOFF - MIN_CUTOFF) * f32::from(cutoff) / 65535.0
        };
        let q = 0.7 + f32::from(regs[Register::Resonance.offset() as usize]) / 32.0;
        self.biq.set_lowpass(cut_hz, q, sample_rate);
    }

    fn advance(&mut self) -> f32 {
        if self.phase_inc == 0.0 {
            return 0.0;
        }

        self.phase += self.phase_inc;
        if self.phase > 2.0 * PI {
            self.phase -= 2.0 * PI;
        }

        // Oscillator: saw + pulse mixture, tanh soft edge on the saw
        let saw = ((self.phase / PI) - 1.0) * 1.5;
        let saw = saw.tanh();
        let pulse = if self.phase / (2.0 * PI) < self.pwm_width {
            1.0
        } else {
            -1.0
        };
        let osc = 0.7 * saw + 0.3 * pulse;

        let filtered = self.biq.process(osc);
        let drive: f32 = 1.6;
        let sat = (filtered * drive).tanh() / drive.tanh();
        // Blend some pre-filter signal to retain presence
        let blended = 0.7 * sat + 0.3 * osc * 0.8;
        blended * self.amp
    }
}

/// Experimental software synthesizer reading the SGU-1 register layout
///
/// This engine is intentionally not bit-accurate. Every voice plays a
/// saw/pulse mixture through a resonant low-pass biquad with mild saturation,
/// driven by the frequency, volume, pan, duty, cutoff and resonance registers.
/// Waveform selection, ring modulation and the SGU-1 filter modes are
/// ignored. Only the stereo mix is produced; there are no per-voice taps.
#[derive(Debug, Clone)]
pub struct SoftSynth {
    voices: Vec<SoftVoice>,
    registers: Vec<u8>,
    sample_rate: f32,
    dirty: bool,
}

impl SoftSynth {
    /// Output sample rate in Hz
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

impl SoundEngine for SoftSynth {
    fn with_rate(channel_count: usize, sample_rate: u32) -> Self {
        assert!(sample_rate > 0, "sound frequency must be positive");
        SoftSynth {
            voices: vec![SoftVoice::new(); channel_count],
            registers: vec![0; channel_count * CHANNEL_REGISTERS],
            sample_rate: sample_rate as f32,
            dirty: true,
        }
    }

    fn channel_count(&self) -> usize {
        self.voices.len()
    }

    fn reset(&mut self) {
        self.registers.fill(0);
        for voice in &mut self.voices {
            *voice = SoftVoice {
                muted: voice.muted,
                ..SoftVoice::new()
            };
            voice.biq.clear();
        }
        self.dirty = true;
    }

    fn read(&self, index: usize) -> u8 {
        self.registers.get(index).copied().unwrap_or(0)
    }

    fn write(&mut self, index: usize, value: u8) {
        if let Some(r) = self.registers.get_mut(index) {
            *r = value;
            self.dirty = true;
        }
    }

    fn next_sample(&mut self) -> (i16, i16) {
        if self.dirty {
            for (voice, regs) in self
                .voices
                .iter_mut()
                .zip(self.registers.chunks_exact(CHANNEL_REGISTERS))
            {
                voice.update(regs, self.sample_rate);
            }
            self.dirty = false;
        }

        let mut left = 0.0f32;
        let mut right = 0.0f32;
        for voice in &mut self.voices {
            let s = voice.advance();
            if voice.muted {
                continue;
            }
            left += s * (1.0 - voice.pan.max(0.0));
            right += s * (1.0 + voice.pan.min(0.0));
        }

        let scale = 32767.0 / 4.0;
        (
            (left * scale).clamp(-32767.0, 32767.0) as i16,
            (right * scale).clamp(-32767.0, 32767.0) as i16,
        )
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
