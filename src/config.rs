use crate::error::{FieldErrors, Result};
use std::time::Duration;

/// Default chance of a simulated payment failing.
pub const DEFAULT_FAILURE_RATE: f64 = 0.10;
/// How long the processing step shows the terminal status before moving on.
pub const DEFAULT_RESULT_DISPLAY_DELAY: Duration = Duration::from_millis(2000);
/// Largest accepted time scale.
pub const MAX_TIME_SCALE: f64 = 1000.0;

/// Runtime knobs of the checkout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckoutConfig {
    /// Probability in `[0, 1]` that a payment attempt fails.
    pub failure_rate: f64,
    /// Multiplier applied to every real wait: 1.0 is real time, 0.0 skips
    /// waiting. Declared processing times are not affected.
    pub time_scale: f64,
    pub result_display_delay: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            failure_rate: DEFAULT_FAILURE_RATE,
            time_scale: 1.0,
            result_display_delay: DEFAULT_RESULT_DISPLAY_DELAY,
        }
    }
}

impl CheckoutConfig {
    /// No waiting at all; handy for scripted runs and tests.
    pub fn instant() -> Self {
        Self {
            time_scale: 0.0,
            ..Self::default()
        }
    }

    pub fn with_failure_rate(self, failure_rate: f64) -> Self {
        Self {
            failure_rate,
            ..self
        }
    }

    pub fn validate(self) -> Result<Self> {
        let mut errors = FieldErrors::default();
        if !(0.0..=1.0).contains(&self.failure_rate) {
            errors.push("failure_rate", "must be between 0 and 1");
        }
        if !(0.0..=MAX_TIME_SCALE).contains(&self.time_scale) {
            errors.push("time_scale", "must be between 0 and 1000");
        }
        errors.into_result()?;
        Ok(self)
    }

    /// `delay` adjusted by the time scale, saturating at `Duration::MAX`.
    pub fn scaled(&self, delay: Duration) -> Duration {
        if self.time_scale == 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(delay.as_secs_f64() * self.time_scale).unwrap_or(Duration::MAX)
    }
}
