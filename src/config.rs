use anyhow::Context;
use ::config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::graphql::PermissionRule;
use crate::utils::RetryConfig;

// ============================================================================
// Application Configuration
// ============================================================================
//
// Layered, later sources win:
//   1. Built-in defaults
//   2. Optional `config/community.{toml,json,yaml}` file
//   3. Environment variables: COMMUNITY_<KEY>, nested with `__`
//      e.g. COMMUNITY_METRICS__PORT=9100
//
// ============================================================================

const ENV_PREFIX: &str = "COMMUNITY";
const CONFIG_FILE: &str = "config/community";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub service_name: String,
    pub log_filter: String,
    pub metrics: MetricsConfig,
    pub event_bus: EventBusConfig,
    pub graphql: GraphqlConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

/// Retry and dead-letter policy for integration-event handlers.
#[derive(Debug, Clone, Deserialize)]
pub struct EventBusConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    /// Dead letters kept before the oldest is dropped.
    pub dead_letter_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlConfig {
    /// Directory scanned for additional `*.graphql` type definitions.
    #[serde(default)]
    pub schema_dir: Option<PathBuf>,
    /// Rule applied to fields no module registered a rule for.
    pub default_rule: String,
}

impl From<&EventBusConfig> for RetryConfig {
    fn from(config: &EventBusConfig) -> Self {
        RetryConfig {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            multiplier: config.multiplier,
        }
    }
}

impl GraphqlConfig {
    pub fn default_rule(&self) -> anyhow::Result<PermissionRule> {
        self.default_rule
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .context("invalid graphql.default_rule")
    }
}

impl AppConfig {
    /// Load from the config file (if present) and the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::build(None, true)
    }

    /// Defaults overridden only by `vars`, which use the same names as the
    /// process environment. Reads neither the environment nor files.
    pub fn from_vars(vars: HashMap<String, String>) -> anyhow::Result<Self> {
        Self::build(Some(vars), false)
    }

    fn build(vars: Option<HashMap<String, String>>, read_file: bool) -> anyhow::Result<Self> {
        let mut builder = Config::builder()
            .set_default("service_name", "community-platform")?
            .set_default("log_filter", "info,community_platform=debug")?
            .set_default("metrics.enabled", true)?
            .set_default("metrics.host", "0.0.0.0")?
            .set_default("metrics.port", 9090_i64)?
            .set_default("event_bus.max_attempts", 3_i64)?
            .set_default("event_bus.initial_delay_ms", 100_i64)?
            .set_default("event_bus.max_delay_ms", 5_000_i64)?
            .set_default("event_bus.multiplier", 2.0)?
            .set_default("event_bus.dead_letter_capacity", 10_000_i64)?
            .set_default("graphql.default_rule", "authenticated")?;

        if read_file {
            builder = builder.add_source(File::with_name(CONFIG_FILE).required(false));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()
            .context("failed to build configuration")?;

        let app: AppConfig = config
            .try_deserialize()
            .context("failed to deserialize configuration")?;
        app.graphql.default_rule()?;
        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_vars(HashMap::new()).unwrap();
        assert_eq!(config.service_name, "community-platform");
        assert_eq!(config.metrics.port, 9090);
        assert!(config.metrics.enabled);
        assert_eq!(config.event_bus.max_attempts, 3);
        assert_eq!(config.event_bus.dead_letter_capacity, 10_000);
        assert!(config.graphql.schema_dir.is_none());
        assert_eq!(config.graphql.default_rule().unwrap(), PermissionRule::Authenticated);
    }

    #[test]
    fn test_environment_overrides() {
        let config = AppConfig::from_vars(vars(&[
            ("COMMUNITY_SERVICE_NAME", "oak-park"),
            ("COMMUNITY_METRICS__PORT", "9100"),
            ("COMMUNITY_METRICS__ENABLED", "false"),
            ("COMMUNITY_EVENT_BUS__MAX_ATTEMPTS", "5"),
            ("COMMUNITY_EVENT_BUS__DEAD_LETTER_CAPACITY", "50"),
            ("COMMUNITY_GRAPHQL__SCHEMA_DIR", "/srv/schema"),
            ("COMMUNITY_GRAPHQL__DEFAULT_RULE", "deny"),
        ]))
        .unwrap();

        assert_eq!(config.service_name, "oak-park");
        assert_eq!(config.metrics.port, 9100);
        assert!(!config.metrics.enabled);
        assert_eq!(config.event_bus.max_attempts, 5);
        assert_eq!(config.event_bus.dead_letter_capacity, 50);
        assert_eq!(config.graphql.schema_dir, Some(PathBuf::from("/srv/schema")));
        assert_eq!(config.graphql.default_rule().unwrap(), PermissionRule::Deny);
    }

    #[test]
    fn test_unknown_default_rule_is_rejected() {
        let result = AppConfig::from_vars(vars(&[("COMMUNITY_GRAPHQL__DEFAULT_RULE", "maybe")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_retry_config_from_event_bus() {
        let config = AppConfig::from_vars(HashMap::new()).unwrap();
        let retry = RetryConfig::from(&config.event_bus);
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.initial_delay, Duration::from_millis(100));
        assert_eq!(retry.max_delay, Duration::from_secs(5));
    }
}
