//! Configuration schema types
//!
//! The root structure maps one-to-one onto the TOML configuration file.
//! Each MESH exchange gets its own mailbox section because PDS and NDOP
//! use separate mailboxes, workflow IDs and shared keys.

use crate::config::SecretString;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// Main bridge configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// MESH mailbox configuration per exchange
    pub mesh: MeshConfig,

    /// FHIR data hub configuration
    pub fhir: FhirConfig,

    /// Correlation cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BridgeConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.mesh.pds.validate("mesh.pds")?;
        self.mesh.ndop.validate("mesh.ndop")?;
        self.fhir.validate()?;
        self.cache.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// MESH mailbox configuration per exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshConfig {
    /// PDS demographics exchange mailbox
    pub pds: MeshMailboxConfig,

    /// NDOP consent exchange mailbox
    pub ndop: MeshMailboxConfig,
}

/// Connection settings for one MESH mailbox
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshMailboxConfig {
    /// Base URL of the MESH server
    pub base_url: String,

    /// Our mailbox ID on this exchange
    pub mailbox_id: String,

    /// Registry mailbox that receives our request files
    pub recipient_mailbox_id: String,

    /// Workflow ID stamped on every message
    pub workflow_id: String,

    /// Mailbox shared key for the NHSMESH authorization scheme
    /// Stored securely in memory and automatically zeroized on drop
    pub shared_key: SecretString,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl MeshMailboxConfig {
    fn validate(&self, section: &str) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err(format!("{section}.base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!(
                "{section}.base_url must start with http:// or https://"
            ));
        }

        if self.mailbox_id.is_empty() {
            return Err(format!("{section}.mailbox_id cannot be empty"));
        }

        if self.recipient_mailbox_id.is_empty() {
            return Err(format!("{section}.recipient_mailbox_id cannot be empty"));
        }

        if self.workflow_id.is_empty() {
            return Err(format!("{section}.workflow_id cannot be empty"));
        }

        if self.shared_key.expose_secret().is_empty() {
            return Err(format!("{section}.shared_key cannot be empty"));
        }

        Ok(())
    }
}

/// FHIR data hub configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FhirConfig {
    /// Base URL of the FHIR service
    pub base_url: String,

    /// Template collection image reference passed to `$convert-data`
    pub template_image: String,

    /// Bearer token for the FHIR service (optional)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub access_token: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl FhirConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("fhir.base_url cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("fhir.base_url must start with http:// or https://".to_string());
        }

        if self.template_image.is_empty() {
            return Err("fhir.template_image cannot be empty".to_string());
        }

        Ok(())
    }
}

/// Correlation cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live for correlation entries, in hours
    ///
    /// The registry commits to answering within this window; entries that
    /// outlive it correspond to batches that will never be answered.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
}

impl CacheConfig {
    fn validate(&self) -> Result<(), String> {
        if self.ttl_hours == 0 {
            return Err("cache.ttl_hours must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Output format (text or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.format.as_str()) {
            return Err(format!(
                "Invalid logging.format '{}'. Must be one of: {}",
                self.format,
                valid_formats.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_ttl_hours() -> u64 {
    crate::domain::TRACKING_TTL_HOURS
}

fn default_log_format() -> String {
    "text".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn mailbox_config() -> MeshMailboxConfig {
        MeshMailboxConfig {
            base_url: "https://mesh.example.com".to_string(),
            mailbox_id: "X26HC001".to_string(),
            recipient_mailbox_id: "X26HC002".to_string(),
            workflow_id: "SPINE_PDS".to_string(),
            shared_key: secret_string("key".to_string()),
            timeout_seconds: 60,
        }
    }

    fn valid_config() -> BridgeConfig {
        BridgeConfig {
            application: ApplicationConfig::default(),
            mesh: MeshConfig {
                pds: mailbox_config(),
                ndop: mailbox_config(),
            },
            fhir: FhirConfig {
                base_url: "https://fhir.example.com".to_string(),
                template_image: "acr.example/templates:v1".to_string(),
                access_token: None,
                timeout_seconds: 60,
            },
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = valid_config();
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mailbox_validation_names_the_section() {
        let mut config = valid_config();
        config.mesh.ndop.workflow_id = String::new();

        let error = config.validate().unwrap_err();
        assert!(error.contains("mesh.ndop.workflow_id"));
    }

    #[test]
    fn test_mailbox_base_url_scheme_is_checked() {
        let mut config = valid_config();
        config.mesh.pds.base_url = "ftp://mesh.example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_shared_key_is_rejected() {
        let mut config = valid_config();
        config.mesh.pds.shared_key = secret_string(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fhir_template_image_is_required() {
        let mut config = valid_config();
        config.fhir.template_image = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cache_ttl_defaults_to_response_window() {
        assert_eq!(CacheConfig::default().ttl_hours, 48);
    }

    #[test]
    fn test_zero_cache_ttl_is_rejected() {
        let mut config = valid_config();
        config.cache.ttl_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_format_validation() {
        let mut config = valid_config();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }
}
