use serde::{Deserialize, Serialize};

pub const DEFAULT_PRECISION: usize = 2;
pub const DEFAULT_PENDING_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Fractional digits kept when floats are written.
    pub precision: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}

impl CodecConfig {
    pub fn tolerance(&self) -> f64 {
        10f64.powi(-(self.precision.min(i32::MAX as usize) as i32))
    }
}

/// What a receiver does with a delta record whose id it has never seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownIdPolicy {
    /// Drop the record and report it.
    #[default]
    Ignore,
    /// Hold the record and replay it after the next snapshot.
    Buffer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub precision: usize,
    pub unknown_id_policy: UnknownIdPolicy,
    /// Upper bound on buffered delta records; the oldest are evicted first.
    pub pending_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            unknown_id_policy: UnknownIdPolicy::Ignore,
            pending_capacity: DEFAULT_PENDING_CAPACITY,
        }
    }
}

impl SyncConfig {
    pub fn buffered() -> Self {
        Self {
            unknown_id_policy: UnknownIdPolicy::Buffer,
            ..Default::default()
        }
    }

    pub fn codec(&self) -> CodecConfig {
        CodecConfig {
            precision: self.precision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tolerance_matches_two_digits() {
        assert!((CodecConfig::default().tolerance() - 0.01).abs() < 1e-15);
    }

    #[test]
    fn buffered_keeps_defaults() {
        let config = SyncConfig::buffered();
        assert_eq!(config.unknown_id_policy, UnknownIdPolicy::Buffer);
        assert_eq!(config.precision, DEFAULT_PRECISION);
    }
}
