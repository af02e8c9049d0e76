//! Per-registry MESH clients
//!
//! Each registry gets its own mailbox client owning the filename convention
//! and, for NDOP, the correlation-ID minting and control-file companion.
//! Both implement [`MeshExchange`], the seam the reconciliation services
//! depend on.

use crate::adapters::mesh::control::build_control_file;
use crate::adapters::mesh::mailbox::Mailbox;
use crate::config::MeshMailboxConfig;
use crate::domain::message::file_base_name;
use crate::domain::{
    MeshMessage, Result, NDOP_MESH_FILE_NAME_PREFIX, PDS_MESH_FILE_NAME_PREFIX,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Result of a successful send.
#[derive(Debug, Clone)]
pub struct SentMessage {
    /// Transport-assigned message ID
    pub message_id: String,

    /// Locally minted correlation ID threaded through the control file,
    /// when the registry's exchange uses one.
    pub tracking_id: Option<String>,
}

/// Mailbox exchange for one registry.
#[async_trait]
pub trait MeshExchange: Send + Sync {
    /// Send one outbound batch as a file, named per the registry convention.
    async fn send_message(&self, content: &str) -> Result<SentMessage>;

    /// List pending inbound message IDs.
    async fn list_messages(&self) -> Result<Vec<String>>;

    /// Retrieve one inbound message.
    async fn retrieve_message(&self, message_id: &str) -> Result<MeshMessage>;

    /// Acknowledge (remove) one inbound message.
    async fn acknowledge_message(&self, message_id: &str) -> Result<bool>;
}

/// MESH client for the PDS demographics exchange.
///
/// PDS request files are plain CSV trace files; responses are matched inline
/// by the unique reference column, so no control file is sent.
pub struct PdsMeshClient {
    mailbox: Arc<dyn Mailbox>,
    config: MeshMailboxConfig,
}

impl PdsMeshClient {
    pub fn new(mailbox: Arc<dyn Mailbox>, config: MeshMailboxConfig) -> Self {
        Self { mailbox, config }
    }
}

#[async_trait]
impl MeshExchange for PdsMeshClient {
    async fn send_message(&self, content: &str) -> Result<SentMessage> {
        let file_name = format!(
            "{}_{}.csv",
            PDS_MESH_FILE_NAME_PREFIX,
            Utc::now().format("%Y%m%d%H%M%S")
        );

        let message_id = self
            .mailbox
            .send_message(
                &self.config.recipient_mailbox_id,
                &self.config.workflow_id,
                content,
                &file_name,
                "text/csv",
            )
            .await?;

        tracing::info!(
            file_name = %file_name,
            message_id = %message_id,
            "Sent file to MESH PDS mailbox"
        );

        Ok(SentMessage {
            message_id,
            tracking_id: None,
        })
    }

    async fn list_messages(&self) -> Result<Vec<String>> {
        self.mailbox.list_messages().await
    }

    async fn retrieve_message(&self, message_id: &str) -> Result<MeshMessage> {
        self.mailbox.retrieve_message(message_id).await
    }

    async fn acknowledge_message(&self, message_id: &str) -> Result<bool> {
        self.mailbox.acknowledge_message(message_id).await
    }
}

/// MESH client for the NDOP consent exchange.
///
/// Every data file is followed by a DTS control file sharing its base name.
/// The payload goes first: receivers may start processing on the data file
/// alone, with the control file as a secondary correlation signal.
pub struct NdopMeshClient {
    mailbox: Arc<dyn Mailbox>,
    config: MeshMailboxConfig,
}

impl NdopMeshClient {
    pub fn new(mailbox: Arc<dyn Mailbox>, config: MeshMailboxConfig) -> Self {
        Self { mailbox, config }
    }
}

#[async_trait]
impl MeshExchange for NdopMeshClient {
    async fn send_message(&self, content: &str) -> Result<SentMessage> {
        let file_name = format!(
            "{}_{}.dat",
            NDOP_MESH_FILE_NAME_PREFIX,
            Utc::now().format("%Y%m%d%H%M%S")
        );
        let control_id = format!("{}_{}", self.config.mailbox_id, Uuid::new_v4());

        let message_id = self
            .mailbox
            .send_message(
                &self.config.recipient_mailbox_id,
                &self.config.workflow_id,
                content,
                &file_name,
                "text/csv",
            )
            .await?;

        let control_file_name = format!("{}.ctl", file_base_name(&file_name));
        let control_content = build_control_file(
            &self.config.workflow_id,
            &self.config.recipient_mailbox_id,
            &self.config.mailbox_id,
            &control_id,
        );

        self.mailbox
            .send_message(
                &self.config.recipient_mailbox_id,
                &self.config.workflow_id,
                &control_content,
                &control_file_name,
                "text/xml",
            )
            .await?;

        tracing::info!(
            file_name = %file_name,
            message_id = %message_id,
            tracking_id = %control_id,
            "Sent file and control file to MESH NDOP mailbox"
        );

        Ok(SentMessage {
            message_id,
            tracking_id: Some(control_id),
        })
    }

    async fn list_messages(&self) -> Result<Vec<String>> {
        self.mailbox.list_messages().await
    }

    async fn retrieve_message(&self, message_id: &str) -> Result<MeshMessage> {
        self.mailbox.retrieve_message(message_id).await
    }

    async fn acknowledge_message(&self, message_id: &str) -> Result<bool> {
        self.mailbox.acknowledge_message(message_id).await
    }
}
