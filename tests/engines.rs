//! Chip facade driving the bundled engines

use approx::assert_abs_diff_eq;
use sgu1::sgu1::pins::{self, CHANNEL_SELECT_ADDR};
use sgu1::sgu1::Register;
use sgu1::sound_unit::flags::Waveform;
use sgu1::{RingBuffer, SoundEngine, Sgu1, Sgu1Config};
use std::sync::Arc;

fn program_voice<E: SoundEngine>(chip: &mut Sgu1<E>, channel: u8, wave: Waveform) {
    for (reg, value) in [
        (CHANNEL_SELECT_ADDR, channel),
        (Register::FreqLo.offset(), 0x00),
        (Register::FreqHi.offset(), 0x06),
        (Register::Duty.offset(), 0x80),
        (Register::Flags0.offset(), wave as u8),
        (Register::Volume.offset(), 0x7F),
    ] {
        chip.tick(pins::write_request(reg, value));
    }
}

fn peak<E: SoundEngine>(chip: &mut Sgu1<E>, ticks: usize) -> f32 {
    (0..ticks)
        .filter_map(|_| {
            pins::is_sample_ready(chip.tick(0))
                .then(|| chip.sample()[0].abs().max(chip.sample()[1].abs()))
        })
        .fold(0.0, f32::max)
}

#[test]
fn programmed_voice_is_audible() {
    let mut chip = Sgu1::new(Sgu1Config::new(441_000, 44_100));
    program_voice(&mut chip, 2, Waveform::Pulse);
    let level = peak(&mut chip, 44_100);
    assert!(level > 0.1 && level <= 1.0, "{level}");
}

#[test]
fn magnitude_scales_output() {
    let mut full = Sgu1::new(Sgu1Config::new(44_100, 44_100));
    let mut half = Sgu1::new(Sgu1Config::new(44_100, 44_100).with_magnitude(0.5));
    program_voice(&mut full, 0, Waveform::Saw);
    program_voice(&mut half, 0, Waveform::Saw);
    for _ in 0..500 {
        full.tick(0);
        half.tick(0);
        assert_abs_diff_eq!(half.sample()[0], full.sample()[0] * 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(half.sample_mono(), full.sample_mono() * 0.5, epsilon = 1e-6);
    }
}

#[test]
fn zero_magnitude_is_silent() {
    let mut chip = Sgu1::new(Sgu1Config::new(44_100, 44_100).with_magnitude(0.0));
    program_voice(&mut chip, 0, Waveform::Pulse);
    assert_eq!(peak(&mut chip, 1000), 0.0);
}

#[test]
fn voice_history_captures_active_channel() {
    let mut chip = Sgu1::new(Sgu1Config::new(44_100, 44_100).with_voice_history(true));
    program_voice(&mut chip, 1, Waveform::Triangle);
    for _ in 0..2048 {
        chip.tick(0);
    }
    let history = chip.voice_history().unwrap();
    assert!(history.ordered(1).any(|s| s != 0));
    assert!(history.ordered(0).all(|s| s == 0));
}

#[test]
fn muted_channel_drops_out_of_mix() {
    let mut chip = Sgu1::new(Sgu1Config::new(44_100, 44_100));
    program_voice(&mut chip, 4, Waveform::Pulse);
    chip.set_channel_mute(4, true);
    assert!(chip.is_channel_muted(4));
    assert_eq!(peak(&mut chip, 1000), 0.0);

    chip.set_channel_mute(4, false);
    assert!(peak(&mut chip, 1000) > 0.0);
}

#[test]
fn chip_runs_on_producer_thread() {
    let ring = Arc::new(RingBuffer::new(1 << 16).unwrap());
    let mut chip = Sgu1::new(Sgu1Config::new(441_000, 44_100));
    program_voice(&mut chip, 0, Waveform::Saw);

    let producer = {
        let ring = Arc::clone(&ring);
        std::thread::spawn(move || {
            let mut produced = 0;
            for _ in 0..44_100 {
                if pins::is_sample_ready(chip.tick(0)) {
                    produced += ring.write(&chip.sample());
                }
            }
            produced
        })
    };
    let produced = producer.join().unwrap();
    assert_eq!(produced, 2 * 4410);
    assert_eq!(ring.available_read(), produced);
}

#[cfg(feature = "softsynth")]
mod softsynth {
    use super::*;
    use sgu1::SoftSynth;

    #[test]
    fn softsynth_backend_behind_same_facade() {
        let mut chip: Sgu1<SoftSynth> =
            Sgu1::with_backend(Sgu1Config::new(441_000, 44_100).with_voice_history(true));
        program_voice(&mut chip, 0, Waveform::Saw);
        assert!(peak(&mut chip, 44_100) > 0.05);

        // No per-voice taps, so the history never advances
        let history = chip.voice_history().unwrap();
        assert_eq!(history.cursor(0), 0);
    }
}
