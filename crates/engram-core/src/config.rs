//! Environment-based configuration.
//!
//! Mirrors spec section 6's "Environment" block: either a single DSN
//! (`ENGRAM_ENVIRONMENT=local_environment`) or discrete host/port/user/
//! password/db settings. Kept as a small explicit struct with a `from_env`
//! constructor rather than pulling in a generic config crate, matching the
//! teacher's minimal-dependency style.

use std::path::PathBuf;

/// Resolved runtime configuration for an `Engram` instance.
#[derive(Debug, Clone)]
pub struct EngramConfig {
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
    /// Root directory for the filesystem-backed object store.
    pub object_store_root: PathBuf,
    /// Host to bind the HTTP surface to (consumed by `engram-server`).
    pub host: String,
    /// Port to bind the HTTP surface to (consumed by `engram-server`).
    pub port: u16,
    /// Minimum size of the database connection pool.
    pub db_pool_min: u32,
    /// Maximum size of the database connection pool.
    pub db_pool_max: u32,
    /// How often the background consolidator sweeps episodic decay, in hours.
    pub decay_interval_hours: u64,
}

impl Default for EngramConfig {
    fn default() -> Self {
        Self {
            db_path: default_data_dir().join("engram.db"),
            object_store_root: default_data_dir().join("artifacts"),
            host: "127.0.0.1".to_string(),
            port: 8080,
            db_pool_min: 2,
            db_pool_max: 20,
            decay_interval_hours: 1,
        }
    }
}

impl EngramConfig {
    /// Build configuration from environment variables, falling back to
    /// platform defaults for anything unset.
    ///
    /// When `ENGRAM_ENVIRONMENT=local_environment`, `ENGRAM_DSN` (a bare
    /// filesystem path in this SQLite-backed implementation) takes
    /// precedence over the discrete `ENGRAM_DB_*` variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        let is_local = std::env::var("ENGRAM_ENVIRONMENT")
            .map(|v| v == "local_environment")
            .unwrap_or(false);

        if is_local {
            if let Ok(dsn) = std::env::var("ENGRAM_DSN") {
                config.db_path = PathBuf::from(dsn);
            }
        } else if let Ok(path) = std::env::var("ENGRAM_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Ok(path) = std::env::var("ENGRAM_OBJECT_STORE_ROOT") {
            config.object_store_root = PathBuf::from(path);
        }
        if let Ok(host) = std::env::var("ENGRAM_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("ENGRAM_PORT").ok().and_then(|v| v.parse().ok()) {
            config.port = port;
        }
        if let Ok(min) = std::env::var("ENGRAM_DB_POOL_MIN")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.db_pool_min = min;
        }
        if let Ok(max) = std::env::var("ENGRAM_DB_POOL_MAX")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.db_pool_max = max;
        }
        if let Ok(hours) = std::env::var("ENGRAM_DECAY_INTERVAL_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.decay_interval_hours = hours;
        }

        config
    }
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("ai", "engram", "core")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".engram"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_pool_bounds() {
        let config = EngramConfig::default();
        assert!(config.db_pool_min <= config.db_pool_max);
        assert_eq!(config.port, 8080);
    }
}
