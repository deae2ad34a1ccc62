use std::time::Duration;

use rand::Rng;

/// Exponential backoff between stream reconnection attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    pub base: Duration,
    pub cap: Duration,
    /// Fraction of the nominal delay applied as random jitter in both directions.
    pub jitter_ratio: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            cap: Duration::from_secs(30),
            jitter_ratio: 0.2,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before attempt `attempt` (zero-based), without jitter.
    pub fn nominal_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(16));
        self.base.saturating_mul(factor).min(self.cap)
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        let nominal = self.nominal_delay(attempt);
        let jitter = self.jitter_ratio.clamp(0.0, 1.0);
        if jitter == 0.0 {
            return nominal;
        }

        let factor = rand::rng().random_range((1.0 - jitter)..=(1.0 + jitter));
        nominal.mul_f64(factor)
    }
}
