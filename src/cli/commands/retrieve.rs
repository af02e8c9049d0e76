//! Retrieve command implementation
//!
//! Runs the retrieve leg for one registry: drain its MESH inbox and fold
//! each processed response into the FHIR hub.

use crate::cli::Source;
use crate::config::load_config;
use crate::core::{NdopService, PdsService};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the retrieve command
#[derive(Args, Debug)]
pub struct RetrieveArgs {
    /// Registry whose inbox to drain
    #[arg(long, value_enum)]
    pub source: Source,
}

impl RetrieveArgs {
    /// Execute the retrieve command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(source = ?self.source, "Starting retrieve command");

        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Configuration error");
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let result = match self.source {
            Source::Pds => {
                PdsService::from_config(&config)?
                    .retrieve_mesh_messages(&shutdown_signal)
                    .await
            }
            Source::Ndop => {
                NdopService::from_config(&config)?
                    .retrieve_mesh_messages(&shutdown_signal)
                    .await
            }
        };

        match result {
            Ok(()) => Ok(0),
            Err(e) => {
                tracing::error!(error = %e, "Retrieve run failed");
                eprintln!("Retrieve run failed: {e}");
                Ok(5)
            }
        }
    }
}
