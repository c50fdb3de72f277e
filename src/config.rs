//! Configuration Module
//!
//! The listening port comes from the command line; cache sizing and optional
//! limits come from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::{DEFAULT_MAX_CACHE_SIZE, DEFAULT_MAX_OBJECT_SIZE};
use crate::error::ConfigError;

/// Proxy configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TCP port the proxy listens on
    pub port: u16,
    /// Total payload bytes the object cache may hold
    pub max_cache_size: usize,
    /// Largest response that will be cached
    pub max_object_size: usize,
    /// Concurrent connection limit, 0 = unbounded
    pub max_connections: usize,
    /// Origin connect deadline in seconds, 0 = wait indefinitely
    pub connect_timeout: u64,
    /// Cache statistics log interval in seconds, 0 = disabled
    pub stats_interval: u64,
}

impl Config {
    /// Builds the configuration from process arguments and environment.
    ///
    /// `args` is the full argument list including the program name and must
    /// hold exactly one positional port argument.
    ///
    /// # Environment Variables
    /// - `MAX_CACHE_SIZE` - Cache capacity in bytes (default: 1049000)
    /// - `MAX_OBJECT_SIZE` - Largest cacheable response in bytes (default: 102400)
    /// - `MAX_CONNECTIONS` - Concurrent connection limit (default: 0, unbounded)
    /// - `CONNECT_TIMEOUT` - Origin connect deadline in seconds (default: 0, none)
    /// - `STATS_INTERVAL` - Statistics log interval in seconds (default: 60)
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let program = args.next().unwrap_or_else(|| "cache_proxy".to_string());
        let rest: Vec<String> = args.collect();
        if rest.len() != 1 {
            return Err(ConfigError::Usage(program));
        }

        let port = rest[0]
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(rest[0].clone()))?;

        let config = Self {
            port,
            max_cache_size: env_or("MAX_CACHE_SIZE", DEFAULT_MAX_CACHE_SIZE)?,
            max_object_size: env_or("MAX_OBJECT_SIZE", DEFAULT_MAX_OBJECT_SIZE)?,
            max_connections: env_or("MAX_CONNECTIONS", 0)?,
            connect_timeout: env_or("CONNECT_TIMEOUT", 0)?,
            stats_interval: env_or("STATS_INTERVAL", 60)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the object ceiling fits inside the cache.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_object_size == 0 || self.max_object_size > self.max_cache_size {
            return Err(ConfigError::Sizes {
                max_cache_size: self.max_cache_size,
                max_object_size: self.max_object_size,
            });
        }
        Ok(())
    }

    /// Origin connect deadline, if one is configured.
    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout > 0).then(|| Duration::from_secs(self.connect_timeout))
    }

    /// Connection limit, if one is configured.
    pub fn connection_limit(&self) -> Option<usize> {
        (self.max_connections > 0).then_some(self.max_connections)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
            max_object_size: DEFAULT_MAX_OBJECT_SIZE,
            max_connections: 0,
            connect_timeout: 0,
            stats_interval: 60,
        }
    }
}

/// Reads a numeric variable, falling back to `default` when unset.
fn env_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidVar {
            name,
            value,
        }),
        Err(_) => Ok(default),
    }
}
