//! Client configuration.

use std::time::Duration;

use crate::error::ConfigError;
use crate::tokenizer::DEFAULT_LIMIT;

/// Well-known port of the remote-control protocol.
pub const ECP_PORT: u16 = 8060;

/// Default deadline for a single transport call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);

/// Default delay between consecutive sequencer calls. Whether the device
/// needs this much is unknown; it is kept adjustable.
pub const DEFAULT_PACING: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcpConfig {
    /// Destination port (8060 outside of tests).
    pub port: u16,

    /// Deadline for each transport call.
    pub timeout: Duration,

    /// Delay between sequencer calls.
    pub pacing: Duration,

    /// Maximum number of values accepted by the tokenizer.
    pub limit: usize,
}

impl Default for EcpConfig {
    fn default() -> Self {
        Self {
            port: ECP_PORT,
            timeout: DEFAULT_TIMEOUT,
            pacing: DEFAULT_PACING,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl EcpConfig {
    /// Defaults overridden by `ECP_PORT`, `ECP_TIMEOUT_MS`, `ECP_PACING_MS`,
    /// and `ECP_LIMIT` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(port) = read::<u16>(&lookup, "ECP_PORT")? {
            config.port = port;
        }
        if let Some(ms) = read::<u64>(&lookup, "ECP_TIMEOUT_MS")? {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = read::<u64>(&lookup, "ECP_PACING_MS")? {
            config.pacing = Duration::from_millis(ms);
        }
        if let Some(limit) = read::<usize>(&lookup, "ECP_LIMIT")? {
            config.limit = limit;
        }

        config.validate()?;
        Ok(config)
    }

    /// Timeout and limit must be non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "timeout",
                value: "0".to_string(),
            });
        }
        if self.limit == 0 {
            return Err(ConfigError::InvalidValue {
                name: "limit",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn read<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = EcpConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EcpConfig::default());
        assert_eq!(config.port, 8060);
        assert_eq!(config.limit, 3);
    }

    #[test]
    fn env_overrides() {
        let config = EcpConfig::from_lookup(lookup(&[
            ("ECP_PORT", "9000"),
            ("ECP_TIMEOUT_MS", "250"),
            ("ECP_PACING_MS", "0"),
            ("ECP_LIMIT", " 5 "),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.pacing, Duration::ZERO);
        assert_eq!(config.limit, 5);
    }

    #[test]
    fn invalid_values_are_errors() {
        let err = EcpConfig::from_lookup(lookup(&[("ECP_PORT", "eighty")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                name: "ECP_PORT",
                value: "eighty".to_string()
            }
        );
        assert!(EcpConfig::from_lookup(lookup(&[("ECP_TIMEOUT_MS", "0")])).is_err());
        assert!(EcpConfig::from_lookup(lookup(&[("ECP_LIMIT", "0")])).is_err());
    }
}
