//! Validate config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");

        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  PDS Mailbox: {} -> {}", config.mesh.pds.mailbox_id, config.mesh.pds.recipient_mailbox_id);
        println!("  PDS Workflow: {}", config.mesh.pds.workflow_id);
        println!("  NDOP Mailbox: {} -> {}", config.mesh.ndop.mailbox_id, config.mesh.ndop.recipient_mailbox_id);
        println!("  NDOP Workflow: {}", config.mesh.ndop.workflow_id);
        println!("  FHIR Service: {}", config.fhir.base_url);
        println!("  Template Image: {}", config.fhir.template_image);
        println!("  Cache TTL: {}h", config.cache.ttl_hours);
        Ok(0)
    }
}
