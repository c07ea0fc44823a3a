//! Rendering chip output to audio files
//!
//! The chip only caches its latest sample, so exporting means ticking it and
//! collecting the sample on every tick that raises the sample-ready pin.
//!
//! # Examples
//!
//! ```no_run
//! use sgu1::export::{render_ticks, write_wav, ExportConfig};
//! use sgu1::{Sgu1, Sgu1Config};
//!
//! # fn main() -> sgu1::Result<()> {
//! let config = Sgu1Config::default();
//! let mut chip = Sgu1::new(config);
//! let frames = render_ticks(&mut chip, config.tick_hz as usize);
//! write_wav("one_second.wav", &frames, config.sound_hz, ExportConfig::default())?;
//! # Ok(())
//! # }
//! ```

mod wav;
pub use wav::*;

use crate::backend::SoundEngine;
use crate::sgu1::{pins, Sgu1};

/// Export configuration options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportConfig {
    /// Scale down audio whose peak exceeds 0.95
    pub normalize: bool,
    /// Fade out duration in seconds (0 = no fade)
    pub fade_out_duration: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            normalize: true,
            fade_out_duration: 0.0,
        }
    }
}

impl ExportConfig {
    /// Enable or disable normalization
    pub fn normalize(mut self, enable: bool) -> Self {
        self.normalize = enable;
        self
    }

    /// Add a linear fade out at the end
    pub fn fade_out(mut self, duration_seconds: f32) -> Self {
        self.fade_out_duration = duration_seconds;
        self
    }
}

/// Tick `chip` with an idle bus `ticks` times, collecting every new sample
///
/// When several sample events fire in one tick only the last one is visible,
/// so coarse tick rates yield fewer frames than `sound_hz` would suggest.
pub fn render_ticks<E: SoundEngine>(chip: &mut Sgu1<E>, ticks: usize) -> Vec<[f32; 2]> {
    let expected = (ticks as u64 * u64::from(chip.config().sound_hz)
        / u64::from(chip.config().tick_hz.max(1))) as usize;
    let mut frames = Vec::with_capacity(expected + 1);
    for _ in 0..ticks {
        if pins::is_sample_ready(chip.tick(0)) {
            frames.push(chip.sample());
        }
    }
    frames
}

/// Scale frames so the peak sits at 0.95 if it is above that
pub fn normalize_frames(frames: &mut [[f32; 2]]) {
    let peak = frames
        .iter()
        .flat_map(|f| f.iter())
        .map(|s| s.abs())
        .fold(0.0f32, f32::max);

    if peak > 0.95 {
        let scale = 0.95 / peak;
        for frame in frames.iter_mut() {
            frame[0] *= scale;
            frame[1] *= scale;
        }
    }
}

/// Apply a linear fade to the last `fade_duration` seconds
fn apply_fade_out(frames: &mut [[f32; 2]], fade_duration: f32, sample_rate: u32) {
    if fade_duration <= 0.0 || frames.is_empty() {
        return;
    }

    let fade_frames = ((fade_duration * sample_rate as f32) as usize).max(1);
    let start_fade = frames.len().saturating_sub(fade_frames);

    for (i, frame) in frames.iter_mut().enumerate().skip(start_fade) {
        let factor = 1.0 - (i - start_fade + 1) as f32 / fade_frames as f32;
        frame[0] *= factor;
        frame[1] *= factor;
    }
}
