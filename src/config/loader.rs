//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{BridgeConfig, MeshMailboxConfig};
use crate::config::secret_string;
use crate::domain::{BridgeError, Result};
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into BridgeConfig
/// 4. Applies environment variable overrides (MESHBRIDGE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, the TOML does not parse, a
/// referenced environment variable is unset, or validation fails.
pub fn load_config(path: impl AsRef<Path>) -> Result<BridgeConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(BridgeError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BridgeError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: BridgeConfig = toml::from_str(&contents)
        .map_err(|e| BridgeError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        BridgeError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. All referenced variables must be set;
/// missing ones are reported together.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| {
        BridgeError::Configuration(format!("Invalid substitution pattern: {e}"))
    })?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(BridgeError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the MESHBRIDGE_* prefix
///
/// Variables follow the pattern MESHBRIDGE_<SECTION>_<KEY>, for example
/// MESHBRIDGE_FHIR_BASE_URL or MESHBRIDGE_MESH_PDS_SHARED_KEY.
fn apply_env_overrides(config: &mut BridgeConfig) {
    if let Ok(val) = std::env::var("MESHBRIDGE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    apply_mailbox_overrides(&mut config.mesh.pds, "MESHBRIDGE_MESH_PDS");
    apply_mailbox_overrides(&mut config.mesh.ndop, "MESHBRIDGE_MESH_NDOP");

    if let Ok(val) = std::env::var("MESHBRIDGE_FHIR_BASE_URL") {
        config.fhir.base_url = val;
    }
    if let Ok(val) = std::env::var("MESHBRIDGE_FHIR_TEMPLATE_IMAGE") {
        config.fhir.template_image = val;
    }
    if let Ok(val) = std::env::var("MESHBRIDGE_FHIR_ACCESS_TOKEN") {
        config.fhir.access_token = Some(secret_string(val));
    }

    if let Ok(val) = std::env::var("MESHBRIDGE_CACHE_TTL_HOURS") {
        if let Ok(hours) = val.parse() {
            config.cache.ttl_hours = hours;
        }
    }

    if let Ok(val) = std::env::var("MESHBRIDGE_LOGGING_FORMAT") {
        config.logging.format = val;
    }
}

fn apply_mailbox_overrides(mailbox: &mut MeshMailboxConfig, prefix: &str) {
    if let Ok(val) = std::env::var(format!("{prefix}_BASE_URL")) {
        mailbox.base_url = val;
    }
    if let Ok(val) = std::env::var(format!("{prefix}_MAILBOX_ID")) {
        mailbox.mailbox_id = val;
    }
    if let Ok(val) = std::env::var(format!("{prefix}_RECIPIENT_MAILBOX_ID")) {
        mailbox.recipient_mailbox_id = val;
    }
    if let Ok(val) = std::env::var(format!("{prefix}_WORKFLOW_ID")) {
        mailbox.workflow_id = val;
    }
    if let Ok(val) = std::env::var(format!("{prefix}_SHARED_KEY")) {
        mailbox.shared_key = secret_string(val);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID_TOML: &str = r#"
[application]
log_level = "info"

[mesh.pds]
base_url = "https://mesh.example.com"
mailbox_id = "X26HC001"
recipient_mailbox_id = "X26HC002"
workflow_id = "SPINE_PDS"
shared_key = "pds-key"

[mesh.ndop]
base_url = "https://mesh.example.com"
mailbox_id = "X26HC003"
recipient_mailbox_id = "X26HC004"
workflow_id = "SPINE_NDOP"
shared_key = "ndop-key"

[fhir]
base_url = "https://fhir.example.com"
template_image = "acr.example/templates:v1"
"#;

    fn write_temp_config(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("TEST_SHARED_KEY", "from-env");
        let input = "shared_key = \"${TEST_SHARED_KEY}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "shared_key = \"from-env\"\n");
        std::env::remove_var("TEST_SHARED_KEY");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("MISSING_VAR");
        let input = "shared_key = \"${MISSING_VAR}\"";
        assert!(substitute_env_vars(input).is_err());
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("COMMENTED_VAR");
        let input = "# shared_key = \"${COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config("nonexistent.toml").is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let temp_file = write_temp_config(VALID_TOML);

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.mesh.pds.mailbox_id, "X26HC001");
        assert_eq!(config.mesh.ndop.workflow_id, "SPINE_NDOP");
        assert_eq!(config.fhir.base_url, "https://fhir.example.com");
        assert_eq!(config.cache.ttl_hours, 48);
    }

    #[test]
    fn test_load_config_invalid_values_rejected() {
        let temp_file = write_temp_config(&VALID_TOML.replace(
            "base_url = \"https://fhir.example.com\"",
            "base_url = \"\"",
        ));

        assert!(load_config(temp_file.path()).is_err());
    }
}
