//! Raw MESH mailbox client
//!
//! This module defines the [`Mailbox`] trait the rest of the bridge depends
//! on, and [`HttpMailbox`], the reqwest implementation of the MESH REST API.
//! The trait is the seam used by tests and by the per-registry clients; the
//! HTTP implementation is deliberately thin.

use crate::config::MeshMailboxConfig;
use crate::domain::{MeshError, MeshMessage, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

/// Store-and-forward mailbox operations.
///
/// Send failures are propagated, not retried. An empty inbox listing is not
/// an error, and a retrieved message with a zero-length body is valid.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Upload a payload to a recipient mailbox; returns the transport message ID.
    async fn send_message(
        &self,
        recipient: &str,
        workflow_id: &str,
        content: &str,
        file_name: &str,
        content_type: &str,
    ) -> Result<String>;

    /// List the IDs of all messages awaiting retrieval.
    async fn list_messages(&self) -> Result<Vec<String>>;

    /// Fetch one message's headers and raw content by ID.
    async fn retrieve_message(&self, message_id: &str) -> Result<MeshMessage>;

    /// Remove a retrieved message from the remote mailbox.
    async fn acknowledge_message(&self, message_id: &str) -> Result<bool>;
}

/// Inbox listing response shape.
#[derive(Debug, Deserialize)]
struct InboxResponse {
    messages: Vec<String>,
}

/// Outbox send response shape.
#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(rename = "messageID", alias = "messageId")]
    message_id: String,
}

/// MESH REST API mailbox client.
pub struct HttpMailbox {
    base_url: String,
    mailbox_id: String,
    shared_key: String,
    client: Client,
}

impl HttpMailbox {
    /// Create a mailbox client from configuration.
    pub fn new(config: &MeshMailboxConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MeshError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            mailbox_id: config.mailbox_id.clone(),
            shared_key: config.shared_key.expose_secret().to_string(),
            client,
        })
    }

    /// The mailbox this client authenticates as.
    pub fn mailbox_id(&self) -> &str {
        &self.mailbox_id
    }

    fn inbox_url(&self) -> String {
        format!("{}/messageexchange/{}/inbox", self.base_url, self.mailbox_id)
    }

    /// Authorization header in the NHSMESH scheme: mailbox, nonce, nonce
    /// count, timestamp, and a SHA-256 digest over those fields keyed with
    /// the mailbox shared key.
    fn auth_header_value(&self) -> String {
        let nonce = Uuid::new_v4();
        let nonce_count = 1;
        let timestamp = Utc::now().format("%Y%m%d%H%M").to_string();

        let mut hasher = Sha256::new();
        hasher.update(self.shared_key.as_bytes());
        hasher.update(b":");
        hasher.update(
            format!("{}:{nonce}:{nonce_count}:{timestamp}", self.mailbox_id).as_bytes(),
        );
        let digest = general_purpose::STANDARD.encode(hasher.finalize());

        format!(
            "NHSMESH {}:{nonce}:{nonce_count}:{timestamp}:{digest}",
            self.mailbox_id
        )
    }
}

#[async_trait]
impl Mailbox for HttpMailbox {
    async fn send_message(
        &self,
        recipient: &str,
        workflow_id: &str,
        content: &str,
        file_name: &str,
        content_type: &str,
    ) -> Result<String> {
        let url = format!(
            "{}/messageexchange/{}/outbox",
            self.base_url, self.mailbox_id
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header_value())
            .header("mex-from", &self.mailbox_id)
            .header("mex-to", recipient)
            .header("mex-workflowid", workflow_id)
            .header("mex-filename", file_name)
            .header("Content-Type", content_type)
            .body(content.to_string())
            .send()
            .await
            .map_err(|e| MeshError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body).into());
        }

        let send_response: SendResponse = response
            .json()
            .await
            .map_err(|e| MeshError::SendFailed(format!("invalid send response: {e}")))?;

        Ok(send_response.message_id)
    }

    async fn list_messages(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.inbox_url())
            .header("Authorization", self.auth_header_value())
            .send()
            .await
            .map_err(|e| MeshError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body).into());
        }

        let inbox: InboxResponse = response
            .json()
            .await
            .map_err(|e| MeshError::ListFailed(format!("invalid inbox response: {e}")))?;

        Ok(inbox.messages)
    }

    async fn retrieve_message(&self, message_id: &str) -> Result<MeshMessage> {
        let url = format!("{}/{}", self.inbox_url(), message_id);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header_value())
            .send()
            .await
            .map_err(|e| MeshError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MeshError::RetrieveFailed {
                message_id: message_id.to_string(),
                message: format!("{status}: {body}"),
            }
            .into());
        }

        // Carry the mex-* headers through; the original remote filename
        // drives message classification downstream.
        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_lowercase(), value.to_string());
            }
        }

        let content = response
            .bytes()
            .await
            .map_err(|e| MeshError::RetrieveFailed {
                message_id: message_id.to_string(),
                message: e.to_string(),
            })?
            .to_vec();

        Ok(MeshMessage {
            id: message_id.to_string(),
            headers,
            content,
        })
    }

    async fn acknowledge_message(&self, message_id: &str) -> Result<bool> {
        let url = format!("{}/{}/status/acknowledged", self.inbox_url(), message_id);

        let response = self
            .client
            .put(&url)
            .header("Authorization", self.auth_header_value())
            .send()
            .await
            .map_err(|e| MeshError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MeshError::AcknowledgeFailed {
                message_id: message_id.to_string(),
                message: format!("{status}: {body}"),
            }
            .into());
        }

        Ok(true)
    }
}

fn status_error(status: StatusCode, body: String) -> MeshError {
    if status.is_server_error() {
        MeshError::ServerError {
            status: status.as_u16(),
            message: body,
        }
    } else {
        MeshError::ClientError {
            status: status.as_u16(),
            message: body,
        }
    }
}
