//! Send command implementation
//!
//! Runs the send leg for one registry: page the hub's patients into request
//! files and hand them to the registry's MESH mailbox.

use crate::cli::Source;
use crate::config::load_config;
use crate::core::{NdopService, PdsService};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the send command
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Registry to send request files to
    #[arg(long, value_enum)]
    pub source: Source,
}

impl SendArgs {
    /// Execute the send command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(source = ?self.source, "Starting send command");

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
                    .send_mesh_messages(&shutdown_signal)
                    .await
            }
            Source::Ndop => {
                NdopService::from_config(&config)?
                    .send_mesh_messages(&shutdown_signal)
                    .await
            }
        };

        match result {
            Ok(()) => Ok(0),
            Err(e) => {
                tracing::error!(error = %e, "Send run failed");
                eprintln!("Send run failed: {e}");
                Ok(5)
            }
        }
    }
}
