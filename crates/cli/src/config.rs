use persistence::{ConnectionError, DatabaseEnvironments, Environment};
use serde::Deserialize;

/// Environment variable that overrides the `environment` key.
pub const ENVIRONMENT_VAR: &str = "CMS_ENV";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Name of the active environment, e.g. `development` or `prod`.
    #[serde(default = "default_environment")]
    pub environment: String,
    pub database: DatabaseEnvironments,
    pub logging: LoggingConfig,
    /// Values used to create the settings singleton on first start.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

fn default_environment() -> String {
    "development".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Environment(#[from] ConnectionError),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml
    /// 2. config/local.toml (optional, not in git)
    /// 3. Environment variables with CMS__ prefix
    /// 4. `CMS_ENV` for the active environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("CMS").separator("__"));

        if let Ok(env) = std::env::var(ENVIRONMENT_VAR) {
            builder = builder.set_override("environment", env)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Builds a config from embedded defaults plus `overrides`, without
    /// reading any file.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            environment = "test"

            [database.development]
            url = ""
            max_connections = 10
            min_connections = 1
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [database.production]
            url = ""
            max_connections = 20
            min_connections = 5
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [database.test]
            url = ""
            max_connections = 5
            min_connections = 0
            connect_timeout_secs = 5
            idle_timeout_secs = 60

            [logging]
            level = "info"
            format = "json"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// The environment named by the `environment` key.
    pub fn active_environment(&self) -> Result<Environment, ConnectionError> {
        self.environment.parse()
    }

    fn validate(&self) -> Result<(), ConfigValidationError> {
        self.active_environment()?;

        for env in [
            Environment::Development,
            Environment::Production,
            Environment::Test,
        ] {
            let db = self.database.get(env);
            if db.min_connections > db.max_connections {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "database.{}: min_connections cannot exceed max_connections",
                    env
                )));
            }
            if db.health_check_interval_secs == 0 {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "database.{}: health_check_interval_secs must be positive",
                    env
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load_with_defaults() {
        let config = Config::load_for_test(&[]).expect("Failed to load config");

        assert_eq!(config.active_environment().unwrap(), Environment::Test);
        assert_eq!(config.database.production.max_connections, 20);
        assert_eq!(config.database.development.min_connections, 1);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.is_json());
        assert!(config.bootstrap.contact_email.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::load_for_test(&[
            ("environment", "prod"),
            ("database.production.url", "postgres://cms@db.internal/carecms"),
            ("logging.format", "pretty"),
            ("bootstrap.contact_email", "info@riverside.example"),
        ])
        .expect("Failed to load config");

        assert_eq!(config.active_environment().unwrap(), Environment::Production);
        let db = config.database.resolve(Environment::Production).unwrap();
        assert_eq!(db.url, "postgres://cms@db.internal/carecms");
        assert!(!config.logging.is_json());
        assert_eq!(
            config.bootstrap.contact_email.as_deref(),
            Some("info@riverside.example")
        );
    }

    #[test]
    fn test_config_validation_unknown_environment() {
        let config =
            Config::load_for_test(&[("environment", "staging")]).expect("Failed to load config");
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("staging"));
    }

    #[test]
    fn test_config_validation_invalid_pool_settings() {
        let config = Config::load_for_test(&[
            ("database.production.min_connections", "100"),
            ("database.production.max_connections", "10"),
        ])
        .expect("Failed to load config");

        let result = config.validate();
        let message = result.unwrap_err().to_string();
        assert!(message.contains("min_connections"));
        assert!(message.contains("production"));
    }

    #[test]
    fn test_config_validation_zero_health_check_interval() {
        let config = Config::load_for_test(&[("database.test.health_check_interval_secs", "0")])
            .expect("Failed to load config");
        assert_eq!(config.database.development.health_check_interval_secs, 30);

        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("health_check_interval_secs"));
    }
}
