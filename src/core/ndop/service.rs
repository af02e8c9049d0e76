//! NDOP reconciliation service
//!
//! The send path remembers each batch in the tracking cache under the
//! control-file correlation ID. The retrieve path resolves a data file back
//! to its batch in two hops: file base name to correlation ID (written when
//! the control file arrives), then correlation ID to NHS numbers. A miss on
//! either hop leaves the message unacknowledged.

use crate::adapters::cache::{get_json, put_json, InMemoryTrackingCache, TrackingCache};
use crate::adapters::fhir::{ConvertDataRequest, DataHubFhirClient, FhirStore, TemplateInfo};
use crate::adapters::mesh::{HttpMailbox, MeshExchange, NdopMeshClient};
use crate::adapters::mesh::control::parse_local_id;
use crate::config::BridgeConfig;
use crate::core::ndop::convert;
use crate::domain::message::{classify_filename, file_base_name, MessageKind, MeshMessage};
use crate::domain::{
    BridgeError, Result, FHIR_SERVER_MAX_PAGE_SIZE, NDOP_MESH_FILE_NAME_PREFIX,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Consent reconciliation against NDOP over MESH.
pub struct NdopService {
    mesh: Arc<dyn MeshExchange>,
    fhir: Arc<dyn FhirStore>,
    cache: Arc<dyn TrackingCache>,
    page_size: usize,
    tracking_ttl: Duration,
}

impl NdopService {
    pub fn new(
        mesh: Arc<dyn MeshExchange>,
        fhir: Arc<dyn FhirStore>,
        cache: Arc<dyn TrackingCache>,
        page_size: usize,
        tracking_ttl: Duration,
    ) -> Self {
        Self {
            mesh,
            fhir,
            cache,
            page_size,
            tracking_ttl,
        }
    }

    /// Wire up the service from configuration with real transport clients.
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        let mailbox = Arc::new(HttpMailbox::new(&config.mesh.ndop)?);
        let mesh = Arc::new(NdopMeshClient::new(mailbox, config.mesh.ndop.clone()));
        let fhir = Arc::new(DataHubFhirClient::new(&config.fhir)?);
        let cache = Arc::new(InMemoryTrackingCache::new());
        Ok(Self::new(
            mesh,
            fhir,
            cache,
            FHIR_SERVER_MAX_PAGE_SIZE,
            Duration::from_secs(config.cache.ttl_hours * 3600),
        ))
    }

    /// Page through the hub's patients and send each page as a check file,
    /// remembering the batch under its correlation ID.
    ///
    /// A conversion or cache failure aborts the run; a transport failure
    /// skips only the affected page. An empty page sends nothing.
    pub async fn send_mesh_messages(&self, cancel: &watch::Receiver<bool>) -> Result<()> {
        tracing::info!("Sending NDOP check requests to MESH");

        let mut bundle = self.fhir.search_patients(self.page_size).await?;
        tracing::info!(
            count = bundle.entry.len(),
            "Resources returned when searching data hub FHIR service"
        );

        loop {
            if *cancel.borrow() {
                tracing::info!("Cancellation requested while sending NDOP check requests");
                return Ok(());
            }

            let converted = convert::bundle_to_csv(&bundle)?;
            tracing::info!("Patient bundle converted to CSV");

            if !converted.csv.is_empty() {
                match self.mesh.send_message(&converted.csv).await {
                    Ok(sent) => {
                        tracing::info!(message_id = %sent.message_id, "Message sent to MESH");
                        if let Some(tracking_id) = sent.tracking_id {
                            put_json(
                                self.cache.as_ref(),
                                &tracking_id,
                                &converted.nhs_numbers,
                                self.tracking_ttl,
                            )
                            .await?;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to send message to MESH");
                    }
                }
            }

            if bundle.entry.len() < self.page_size {
                break;
            }

            bundle = match self.fhir.continue_search(&bundle).await {
                Ok(next) => next,
                Err(e) => {
                    tracing::error!(error = %e, "Search of data hub FHIR service failed");
                    break;
                }
            };
        }

        Ok(())
    }

    /// Drain the NDOP mailbox, folding each data message into the hub.
    pub async fn retrieve_mesh_messages(&self, cancel: &watch::Receiver<bool>) -> Result<()> {
        tracing::info!("Checking for NDOP messages in MESH");

        let message_ids = self.mesh.list_messages().await?;
        tracing::info!(count = message_ids.len(), "Retrieved NDOP messages from MESH");

        for (index, message_id) in message_ids.iter().enumerate() {
            if *cancel.borrow() {
                tracing::info!(
                    message_id = %message_id,
                    position = index + 1,
                    total = message_ids.len(),
                    "Cancellation requested while processing messages"
                );
                return Ok(());
            }

            if let Err(e) = self.process_message(message_id).await {
                tracing::error!(
                    message_id = %message_id,
                    error = %e,
                    "Failed to retrieve and process MESH message"
                );
                continue;
            }

            tracing::info!(message_id = %message_id, "MESH message has been processed");
            match self.mesh.acknowledge_message(message_id).await {
                Ok(true) => {
                    tracing::info!(message_id = %message_id, "Message acknowledged in MESH");
                }
                Ok(false) => {
                    tracing::error!(message_id = %message_id, "Failed to acknowledge MESH message");
                }
                Err(e) => {
                    tracing::error!(
                        message_id = %message_id,
                        error = %e,
                        "Failed to acknowledge MESH message"
                    );
                }
            }
        }

        Ok(())
    }

    async fn process_message(&self, message_id: &str) -> Result<()> {
        let message = self.mesh.retrieve_message(message_id).await?;
        tracing::info!(message_id = %message_id, "Message retrieved from MESH");

        if message.content.is_empty() {
            tracing::debug!(message_id = %message_id, "Got empty message from MESH");
            return Ok(());
        }

        let file_name = message.file_name().unwrap_or_default().to_string();
        match classify_filename(&file_name, NDOP_MESH_FILE_NAME_PREFIX) {
            MessageKind::Control => self.process_control_message(&message, &file_name).await,
            MessageKind::Data => self.process_data_message(&message, &file_name).await,
            MessageKind::Trace => {
                tracing::debug!(
                    message_id = %message_id,
                    content = %message.content_utf8(),
                    "Got a trace message without actual data"
                );
                Ok(())
            }
        }
    }

    /// Record the control file's correlation ID against the shared base name.
    ///
    /// A malformed control file is acknowledged anyway: it will not parse
    /// any better on the next run. A cache write failure is transient, so
    /// the message stays in the inbox.
    async fn process_control_message(&self, message: &MeshMessage, file_name: &str) -> Result<()> {
        let content = message.content_utf8();

        let local_id = match parse_local_id(&content) {
            Ok(local_id) => local_id,
            Err(e) => {
                tracing::warn!(
                    message_id = %message.id,
                    file_name = %file_name,
                    error = %e,
                    "Discarding malformed control file"
                );
                return Ok(());
            }
        };

        put_json(
            self.cache.as_ref(),
            file_base_name(file_name),
            &local_id,
            self.tracking_ttl,
        )
        .await?;

        tracing::debug!(
            message_id = %message.id,
            tracking_id = %local_id,
            "Control file correlation recorded"
        );
        Ok(())
    }

    async fn process_data_message(&self, message: &MeshMessage, file_name: &str) -> Result<()> {
        let sent_nhs_numbers = self.recall_batch(file_base_name(file_name)).await?;
        tracing::info!(message_id = %message.id, "Request data for MESH message was found in cache");

        let json = convert::csv_to_consents(&message.content_utf8(), &sent_nhs_numbers)?;
        tracing::info!(message_id = %message.id, "Message converted to JSON");

        let bundle = self
            .fhir
            .convert_data(ConvertDataRequest {
                input_data: json,
                template: TemplateInfo::for_ndop_mesh_consent(),
            })
            .await?;
        tracing::info!(message_id = %message.id, "Message converted to FHIR bundle");

        self.fhir.transaction(bundle).await?;
        Ok(())
    }

    /// Resolve a data file back to the NHS numbers originally sent.
    async fn recall_batch(&self, base_name: &str) -> Result<Vec<String>> {
        let tracking_id: String = get_json(self.cache.as_ref(), base_name)
            .await?
            .ok_or_else(|| {
                BridgeError::Correlation(format!(
                    "correlation ID for MESH file {base_name} could not be found in cache"
                ))
            })?;

        let nhs_numbers: Vec<String> = get_json(self.cache.as_ref(), &tracking_id)
            .await?
            .unwrap_or_default();

        if nhs_numbers.is_empty() {
            return Err(BridgeError::Correlation(format!(
                "request data for MESH file {base_name} could not be found in cache"
            )));
        }

        Ok(nhs_numbers)
    }
}
