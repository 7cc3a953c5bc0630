use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ManagerConfig {
    pub management: ManagementConfig,
    pub components: ComponentsConfig,
    pub heartbeat: HeartbeatConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ManagementConfig {
    /// Object name domain used by the built-in components
    #[serde(default = "default_domain")]
    pub domain: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ComponentsConfig {
    /// Component kinds to build from the catalog, in start order
    #[serde(default = "default_enabled")]
    pub enabled: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HeartbeatConfig {
    /// Milliseconds between heartbeat ticks
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Default level when neither RUST_LOG nor a CLI flag overrides it
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Console output format: pretty, compact or json
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for daily rolling log files (optional)
    #[serde(default)]
    pub directory: Option<String>,
}

impl ManagerConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("componentry.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            // Start with default values
            .set_default("management.domain", default_domain())?
            .set_default("components.enabled", default_enabled())?
            .set_default("heartbeat.interval_ms", default_interval_ms())?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Environment variables, e.g. COMPONENTRY_HEARTBEAT__INTERVAL_MS=500
            .add_source(
                Environment::with_prefix("COMPONENTRY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("components.enabled"),
            )
            .build()?;

        let config: ManagerConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.management.domain.is_empty() {
            return Err(ConfigError::Message(
                "Management domain must not be empty".to_string(),
            ));
        }

        if self.management.domain.contains([':', '*', '?', ',', '=']) {
            return Err(ConfigError::Message(format!(
                "Management domain '{}' contains a reserved character",
                self.management.domain
            )));
        }

        if self.heartbeat.interval_ms == 0 {
            return Err(ConfigError::Message(
                "Heartbeat interval_ms must be greater than 0".to_string(),
            ));
        }

        for (i, kind) in self.components.enabled.iter().enumerate() {
            if self.components.enabled[..i].contains(kind) {
                return Err(ConfigError::Message(format!(
                    "Component '{}' is enabled more than once",
                    kind
                )));
            }
        }

        Ok(())
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            management: ManagementConfig {
                domain: default_domain(),
            },
            components: ComponentsConfig {
                enabled: default_enabled(),
            },
            heartbeat: HeartbeatConfig {
                interval_ms: default_interval_ms(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
                directory: None,
            },
        }
    }
}

// Default value functions
fn default_domain() -> String {
    "componentry".to_string()
}
fn default_enabled() -> Vec<String> {
    vec!["runtime".to_string(), "heartbeat".to_string()]
}
fn default_interval_ms() -> u64 {
    1000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}
