//! Sample Clock Divider
//!
//! Converts the host tick rate into discrete "new audio sample" events using a
//! fixed-point down-counter. The period is `tick_hz * precision / sound_hz`;
//! each tick removes one unit of precision and every zero crossing emits one
//! sample event.

/// Fixed point precision for the sample period
pub const FIXEDPOINT_SCALE: i64 = 16;

/// Compute the fixed-point sample period
///
/// `floor(tick_hz * precision / sound_hz)`, never less than 1 so the divider
/// always makes progress even when ticks are coarser than samples.
///
/// When `tick_hz * precision < sound_hz` the clamped period no longer tracks
/// the requested rate: every tick yields exactly `precision` events, so
/// samples come out at `tick_hz * precision` Hz. [`Sgu1Config::validate`]
/// rejects such rates.
///
/// [`Sgu1Config::validate`]: super::Sgu1Config::validate
///
/// # Panics
///
/// Panics if either frequency or the precision is zero.
pub fn compute_period(tick_hz: u32, sound_hz: u32, precision: i64) -> i64 {
    assert!(tick_hz > 0, "tick frequency must be positive");
    assert!(sound_hz > 0, "sound frequency must be positive");
    assert!(precision > 0, "fixed point precision must be positive");
    ((i64::from(tick_hz) * precision) / i64::from(sound_hz)).max(1)
}

/// Fixed-point tick-to-sample divider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleClock {
    period: i64,
    counter: i64,
    precision: i64,
}

impl SampleClock {
    /// Create a divider with the default precision
    pub fn new(tick_hz: u32, sound_hz: u32) -> Self {
        Self::with_precision(tick_hz, sound_hz, FIXEDPOINT_SCALE)
    }

    /// Create a divider with a custom fixed-point precision
    pub fn with_precision(tick_hz: u32, sound_hz: u32, precision: i64) -> Self {
        let period = compute_period(tick_hz, sound_hz, precision);
        SampleClock {
            period,
            counter: period,
            precision,
        }
    }

    /// Advance by one tick, returning how many sample boundaries were crossed
    ///
    /// Usually 0 or 1. Larger values only occur when the tick rate is below
    /// the sample rate.
    #[inline]
    pub fn tick(&mut self) -> u32 {
        self.counter -= self.precision;
        let mut events = 0;
        while self.counter <= 0 {
            self.counter += self.period;
            events += 1;
        }
        events
    }

    /// Restore the counter to a full period
    pub fn reset(&mut self) {
        self.counter = self.period;
    }

    /// Fixed-point ticks per sample
    pub fn period(&self) -> i64 {
        self.period
    }

    /// Current fixed-point counter value
    pub fn counter(&self) -> i64 {
        self.counter
    }

    /// Fixed-point precision factor
    pub fn precision(&self) -> i64 {
        self.precision
    }

    /// Effective ticks per sample, including rounding of the period
    pub fn ticks_per_sample(&self) -> f64 {
        self.period as f64 / self.precision as f64
    }
}
