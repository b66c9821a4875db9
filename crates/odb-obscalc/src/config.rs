//! Engine configuration and retry backoff (§4.8, §6 "Environment").

use std::fmt;
use std::time::Duration;

/// Shape of the exponential retry backoff applied after a failed
/// calculation (§4.8 "On failure").
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffConfig {
    /// Backoff for the first retry after a failure.
    pub base: Duration,
    /// Upper bound on the computed backoff, regardless of failure count.
    pub max: Duration,
    /// Multiplicative jitter factor applied to the computed backoff,
    /// e.g. `0.2` allows up to ±20%.
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(5),
            max: Duration::from_secs(600),
            jitter: 0.2,
        }
    }
}

impl BackoffConfig {
    /// `min(max, base * 2^(failure_count - 1) * jitter_factor)` (§4.8).
    ///
    /// `jitter_factor` is supplied by the caller (typically sampled from
    /// `[1 - jitter, 1 + jitter]`) so this function stays pure and
    /// testable; the engine itself draws the random factor.
    pub fn backoff_for(&self, failure_count: u32, jitter_factor: f64) -> Duration {
        debug_assert!(failure_count >= 1);
        let exponent = failure_count.saturating_sub(1).min(32);
        let scaled = self.base.as_secs_f64() * 2f64.powi(exponent as i32) * jitter_factor;
        Duration::from_secs_f64(scaled.max(0.0)).min(self.max)
    }
}

/// Engine-wide configuration supplied to `init` (§6 "Environment").
#[derive(Clone, Debug, PartialEq)]
pub struct ObscalcConfig {
    /// Opaque version tag mixed into cache keys (also fed to
    /// `GenParams::fingerprint`).
    pub commit_hash: String,
    /// Number of worker threads computing entries concurrently, or
    /// `None` to auto-detect from [`Self::resolved_worker_count`].
    pub worker_pool_size: Option<usize>,
    /// Retry backoff shape.
    pub backoff: BackoffConfig,
    /// Default `futureLimit` passed to the sequence merge when the
    /// caller does not override it.
    pub future_limit_default: usize,
    /// Ceiling on atoms ever materialized from one protosequence pull
    /// (§9 "Lazy atom streams").
    pub atom_count_ceiling: usize,
    /// How long a worker's lease on an entry is honored before another
    /// worker may reclaim it (§5 "per-row version check").
    pub lease_duration: Duration,
    /// How often the periodic tick scans for `Retry` entries whose
    /// `retry_at` has elapsed.
    pub tick_interval: Duration,
}

impl Default for ObscalcConfig {
    fn default() -> Self {
        Self {
            commit_hash: String::new(),
            worker_pool_size: None,
            backoff: BackoffConfig::default(),
            future_limit_default: 5,
            atom_count_ceiling: 100_000,
            lease_duration: Duration::from_secs(30),
            tick_interval: Duration::from_millis(500),
        }
    }
}

/// A configuration that failed [`ObscalcConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `worker_pool_size` was explicitly set to zero.
    ZeroWorkers,
    /// `backoff.jitter` is not a finite, non-negative number.
    InvalidJitter,
    /// `backoff.base` or `backoff.max` is zero.
    InvalidBackoffBound,
    /// `atom_count_ceiling` was zero.
    ZeroAtomCeiling,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroWorkers => write!(f, "worker_pool_size must be at least 1"),
            ConfigError::InvalidJitter => write!(f, "backoff.jitter must be finite and non-negative"),
            ConfigError::InvalidBackoffBound => write!(f, "backoff.base and backoff.max must be non-zero"),
            ConfigError::ZeroAtomCeiling => write!(f, "atom_count_ceiling must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ObscalcConfig {
    /// The worker pool size to actually spawn: an explicit
    /// `worker_pool_size` clamped to `[1, 64]`, or, when unset, half the
    /// detected parallelism clamped to `[2, 16]` (mirrors the teacher's
    /// async engine sizing — cache capacity and thread pools alike stay
    /// within a sane range regardless of what the host reports).
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_pool_size {
            Some(n) => n.clamp(1, 64),
            None => {
                let cpus = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
                (cpus / 2).clamp(2, 16)
            }
        }
    }

    /// Reject a configuration that could not be safely started: zero
    /// workers, a non-finite or negative backoff jitter, a zero backoff
    /// bound, or a zero atom ceiling.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_pool_size == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        if !self.backoff.jitter.is_finite() || self.backoff.jitter < 0.0 {
            return Err(ConfigError::InvalidJitter);
        }
        if self.backoff.base.is_zero() || self.backoff.max.is_zero() {
            return Err(ConfigError::InvalidBackoffBound);
        }
        if self.atom_count_ceiling == 0 {
            return Err(ConfigError::ZeroAtomCeiling);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_failure_before_capping() {
        let cfg = BackoffConfig { base: Duration::from_secs(1), max: Duration::from_secs(1000), jitter: 1.0 };
        assert_eq!(cfg.backoff_for(1, 1.0), Duration::from_secs(1));
        assert_eq!(cfg.backoff_for(2, 1.0), Duration::from_secs(2));
        assert_eq!(cfg.backoff_for(3, 1.0), Duration::from_secs(4));
    }

    #[test]
    fn backoff_never_exceeds_max() {
        let cfg = BackoffConfig { base: Duration::from_secs(1), max: Duration::from_secs(10), jitter: 1.0 };
        assert_eq!(cfg.backoff_for(20, 1.0), Duration::from_secs(10));
    }

    #[test]
    fn backoff_applies_jitter_factor() {
        let cfg = BackoffConfig { base: Duration::from_secs(10), max: Duration::from_secs(1000), jitter: 1.0 };
        assert_eq!(cfg.backoff_for(1, 0.5), Duration::from_secs(5));
    }

    #[test]
    fn default_config_validates() {
        assert!(ObscalcConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_workers_rejected() {
        let cfg = ObscalcConfig { worker_pool_size: Some(0), ..ObscalcConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroWorkers));
    }

    #[test]
    fn nan_jitter_rejected() {
        let cfg = ObscalcConfig {
            backoff: BackoffConfig { jitter: f64::NAN, ..BackoffConfig::default() },
            ..ObscalcConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidJitter));
    }

    #[test]
    fn zero_atom_ceiling_rejected() {
        let cfg = ObscalcConfig { atom_count_ceiling: 0, ..ObscalcConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroAtomCeiling));
    }

    #[test]
    fn explicit_worker_count_is_clamped() {
        let cfg = ObscalcConfig { worker_pool_size: Some(1000), ..ObscalcConfig::default() };
        assert_eq!(cfg.resolved_worker_count(), 64);
    }

    #[test]
    fn auto_detected_worker_count_is_bounded() {
        let cfg = ObscalcConfig::default();
        let n = cfg.resolved_worker_count();
        assert!((2..=16).contains(&n));
    }
}
