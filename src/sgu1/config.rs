//! Chip configuration

use serde::{Deserialize, Serialize};

use super::clock::FIXEDPOINT_SCALE;
use crate::{Result, Sgu1Error};

/// Default host tick rate (1 MHz)
pub const DEFAULT_TICK_HZ: u32 = 1_000_000;
/// Default output sample rate
pub const DEFAULT_SOUND_HZ: u32 = 44_100;

/// Setup parameters for [`Sgu1`](super::Sgu1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sgu1Config {
    /// Frequency at which `tick` will be called, in Hz
    pub tick_hz: u32,
    /// Output sample frequency, in Hz
    pub sound_hz: u32,
    /// Output sample magnitude (0.0 = silence, 1.0 = full scale)
    pub magnitude: f32,
    /// Keep a circular history of raw samples per voice
    pub voice_history: bool,
}

impl Default for Sgu1Config {
    fn default() -> Self {
        Sgu1Config {
            tick_hz: DEFAULT_TICK_HZ,
            sound_hz: DEFAULT_SOUND_HZ,
            magnitude: 1.0,
            voice_history: false,
        }
    }
}

impl Sgu1Config {
    /// Configuration for the given tick and sample rates, other fields default
    pub fn new(tick_hz: u32, sound_hz: u32) -> Self {
        Sgu1Config {
            tick_hz,
            sound_hz,
            ..Self::default()
        }
    }

    /// Set the output magnitude
    pub fn with_magnitude(mut self, magnitude: f32) -> Self {
        self.magnitude = magnitude;
        self
    }

    /// Enable or disable per-voice sample history
    pub fn with_voice_history(mut self, enabled: bool) -> Self {
        self.voice_history = enabled;
        self
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Sgu1Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration before handing it to the chip
    ///
    /// The chip constructor treats zero rates as programming errors and
    /// panics; hosts loading configuration from outside should call this first.
    /// A sample rate above `tick_hz * FIXEDPOINT_SCALE` is also rejected, since
    /// the clock divider cannot produce it.
    pub fn validate(&self) -> Result<()> {
        if self.tick_hz == 0 {
            return Err(Sgu1Error::ConfigError(
                "tick frequency must be positive".into(),
            ));
        }
        if self.sound_hz == 0 {
            return Err(Sgu1Error::ConfigError(
                "sound frequency must be positive".into(),
            ));
        }
        let max_sound_hz = u64::from(self.tick_hz) * FIXEDPOINT_SCALE as u64;
        if u64::from(self.sound_hz) > max_sound_hz {
            return Err(Sgu1Error::ConfigError(format!(
                "sound frequency {} Hz exceeds {} Hz ({} Hz tick x {})",
                self.sound_hz, max_sound_hz, self.tick_hz, FIXEDPOINT_SCALE
            )));
        }
        if !(0.0..=1.0).contains(&self.magnitude) {
            return Err(Sgu1Error::ConfigError(format!(
                "magnitude {} outside 0.0..=1.0",
                self.magnitude
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Sgu1Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_rates_rejected() {
        let err = Sgu1Config::new(0, 44_100).validate().unwrap_err();
        assert!(err.to_string().contains("tick frequency"));
        let err = Sgu1Config::new(1_000_000, 0).validate().unwrap_err();
        assert!(err.to_string().contains("sound frequency"));
    }

    #[test]
    fn test_sound_rate_beyond_divider_rejected() {
        let err = Sgu1Config::new(1_000, 44_100).validate().unwrap_err();
        assert!(matches!(err, Sgu1Error::ConfigError(_)));
        assert!(err.to_string().contains("exceeds 16000 Hz"));

        // Four samples per tick is still within range
        assert!(Sgu1Config::new(11_025, 44_100).validate().is_ok());
        assert!(Sgu1Config::new(2_757, 44_112).validate().is_ok());
        assert!(Sgu1Config::new(2_757, 44_113).validate().is_err());
    }

    #[test]
    fn test_magnitude_range() {
        assert!(Sgu1Config::default().with_magnitude(1.5).validate().is_err());
        assert!(Sgu1Config::default().with_magnitude(0.0).validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let cfg = Sgu1Config::from_json(r#"{ "tick_hz": 6293750, "voice_history": true }"#).unwrap();
        assert_eq!(cfg.tick_hz, 6_293_750);
        assert_eq!(cfg.sound_hz, DEFAULT_SOUND_HZ);
        assert!(cfg.voice_history);
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            Sgu1Config::from_json("not json"),
            Err(Sgu1Error::Json(_))
        ));
        assert!(matches!(
            Sgu1Config::from_json(r#"{ "sound_hz": 0 }"#),
            Err(Sgu1Error::ConfigError(_))
        ));
    }
}
