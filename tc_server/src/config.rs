//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tourney_clock::{SessionConfig, StructureCatalog, TournamentStructure};

/// Default HTTP bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:6970";

/// Default snapshot location
pub const DEFAULT_SNAPSHOT_PATH: &str = "tournament_state.json";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Snapshot file path
    pub snapshot_path: PathBuf,
    /// Structure for a fresh session; the catalog default when unset
    pub default_structure: Option<String>,
    /// Countdown tick interval in milliseconds
    pub tick_interval_ms: u64,
    /// Prometheus exporter bind address; metrics are disabled when unset
    pub metrics_bind: Option<SocketAddr>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `snapshot_override` - Optional snapshot path override (from CLI args)
    /// * `structure_override` - Optional default structure override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a set variable cannot be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        snapshot_override: Option<PathBuf>,
        structure_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_env("SERVER_BIND")?.unwrap_or_else(default_bind),
        };

        let snapshot_path = snapshot_override
            .or_else(|| std::env::var("SNAPSHOT_PATH").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_PATH));

        let default_structure = structure_override
            .or_else(|| std::env::var("DEFAULT_STRUCTURE").ok())
            .filter(|id| !id.trim().is_empty());

        let tick_interval_ms = parse_env("TICK_INTERVAL_MS")?.unwrap_or(1000);
        let metrics_bind = parse_env("METRICS_BIND")?;

        Ok(ServerConfig {
            bind,
            snapshot_path,
            default_structure,
            tick_interval_ms,
            metrics_bind,
        })
    }

    /// Validate configuration against the structure catalog
    pub fn validate(&self, catalog: &StructureCatalog) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                var: "TICK_INTERVAL_MS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if let Some(id) = &self.default_structure
            && catalog.get(id).is_none()
        {
            let known: Vec<&str> = catalog.iter().map(|s| s.id.as_str()).collect();
            return Err(ConfigError::Invalid {
                var: "DEFAULT_STRUCTURE".to_string(),
                reason: format!("Unknown structure '{}' (known: {})", id, known.join(", ")),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server bind address ({})", self.bind),
            });
        }

        Ok(())
    }

    /// Structure a fresh session starts on.
    ///
    /// Used on first launch and when the snapshot cannot be restored.
    pub fn fresh_structure<'a>(&self, catalog: &'a StructureCatalog) -> &'a TournamentStructure {
        self.default_structure
            .as_deref()
            .and_then(|id| catalog.get(id))
            .unwrap_or_else(|| catalog.default_structure())
    }

    /// Session actor settings derived from this configuration
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::with_tick_interval(Duration::from_millis(self.tick_interval_ms))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            default_structure: None,
            tick_interval_ms: 1000,
            metrics_bind: None,
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 6970))
}

/// Helper to parse an optional environment variable.
///
/// Unset or empty is `None`; a value that does not parse is an error.
fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::Invalid {
                    var: key.to_string(),
                    reason: e.to_string(),
                })
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::Arc;
    use tourney_clock::{MemoryStore, load_session};

    const VARS: [&str; 5] = [
        "SERVER_BIND",
        "SNAPSHOT_PATH",
        "DEFAULT_STRUCTURE",
        "TICK_INTERVAL_MS",
        "METRICS_BIND",
    ];

    fn clear_env() {
        for var in VARS {
            // SAFETY: env-touching tests are serialized with #[serial]
            unsafe { std::env::remove_var(var) };
        }
    }

    fn set_env(key: &str, value: &str) {
        // SAFETY: env-touching tests are serialized with #[serial]
        unsafe { std::env::set_var(key, value) };
    }

    #[test]
    fn test_default_bind_matches_constant() {
        assert_eq!(default_bind(), DEFAULT_BIND.parse::<SocketAddr>().unwrap());
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_env();
        let config = ServerConfig::from_env(None, None, None).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert!(config.validate(&StructureCatalog::builtin()).is_ok());
    }

    #[test]
    #[serial]
    fn test_env_values_are_read() {
        clear_env();
        set_env("SERVER_BIND", "0.0.0.0:8080");
        set_env("SNAPSHOT_PATH", "/tmp/clock.json");
        set_env("DEFAULT_STRUCTURE", "turbo");
        set_env("TICK_INTERVAL_MS", "250");
        set_env("METRICS_BIND", "0.0.0.0:9090");

        let config = ServerConfig::from_env(None, None, None).unwrap();
        clear_env();

        assert_eq!(config.bind, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.snapshot_path, PathBuf::from("/tmp/clock.json"));
        assert_eq!(config.default_structure.as_deref(), Some("turbo"));
        assert_eq!(config.tick_interval_ms, 250);
        assert_eq!(config.metrics_bind, Some("0.0.0.0:9090".parse().unwrap()));
        assert_eq!(
            config.session_config().tick_interval,
            Duration::from_millis(250)
        );
    }

    #[test]
    #[serial]
    fn test_cli_overrides_env() {
        clear_env();
        set_env("SERVER_BIND", "0.0.0.0:8080");
        set_env("DEFAULT_STRUCTURE", "turbo");

        let config = ServerConfig::from_env(
            Some("127.0.0.1:7000".parse().unwrap()),
            Some(PathBuf::from("other.json")),
            Some("deep-stack".to_string()),
        )
        .unwrap();
        clear_env();

        assert_eq!(config.bind.port(), 7000);
        assert_eq!(config.snapshot_path, PathBuf::from("other.json"));
        assert_eq!(config.default_structure.as_deref(), Some("deep-stack"));
    }

    #[test]
    #[serial]
    fn test_unparsable_env_is_error() {
        clear_env();
        set_env("TICK_INTERVAL_MS", "fast");
        let err = ServerConfig::from_env(None, None, None).unwrap_err();
        clear_env();

        let msg = err.to_string();
        assert!(msg.contains("TICK_INTERVAL_MS"));
    }

    #[test]
    fn test_validation_zero_tick() {
        let config = ServerConfig {
            tick_interval_ms: 0,
            ..ServerConfig::default()
        };
        let err = config.validate(&StructureCatalog::builtin()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == "TICK_INTERVAL_MS"));
    }

    #[test]
    fn test_validation_unknown_structure() {
        let config = ServerConfig {
            default_structure: Some("hyper".to_string()),
            ..ServerConfig::default()
        };
        let err = config.validate(&StructureCatalog::builtin()).unwrap_err();
        assert!(err.to_string().contains("hyper"));
        assert!(err.to_string().contains("regular"));
    }

    #[test]
    fn test_fresh_structure_follows_config() {
        let catalog = StructureCatalog::builtin();
        assert_eq!(ServerConfig::default().fresh_structure(&catalog).id, "regular");

        let config = ServerConfig {
            default_structure: Some("deep-stack".to_string()),
            ..ServerConfig::default()
        };
        assert_eq!(config.fresh_structure(&catalog).id, "deep-stack");
    }

    #[test]
    fn test_corrupt_snapshot_restarts_on_configured_structure() {
        let catalog = Arc::new(StructureCatalog::builtin());
        let config = ServerConfig {
            default_structure: Some("turbo".to_string()),
            ..ServerConfig::default()
        };
        let store = MemoryStore::with_contents("{\"version\": 1, \"truncated");

        let session = load_session(&store, catalog.clone(), config.fresh_structure(&catalog));
        assert_eq!(session.structure().id, "turbo");
        assert_eq!(session.state().time_remaining, 600);
        assert!(session.players().is_empty());
    }

    #[test]
    fn test_validation_metrics_port_clash() {
        let config = ServerConfig {
            metrics_bind: Some(default_bind()),
            ..ServerConfig::default()
        };
        assert!(config.validate(&StructureCatalog::builtin()).is_err());
    }
}
