//! PDS reconciliation service
//!
//! The send path pages the hub's patients into trace request files; the
//! retrieve path folds trace responses back, applying the removed-patient
//! policy before the hub transaction.

use crate::adapters::fhir::{ConvertDataRequest, DataHubFhirClient, FhirStore, TemplateInfo};
use crate::adapters::mesh::{HttpMailbox, MeshExchange, PdsMeshClient};
use crate::config::BridgeConfig;
use crate::core::pds::convert;
use crate::core::pds::models::PdsMeshRecordResponse;
use crate::domain::message::{classify_filename, MessageKind, MeshMessage};
use crate::domain::{
    Result, FHIR_SERVER_MAX_PAGE_SIZE, PDS_MESH_FILE_NAME_PREFIX, PDS_NO_MATCH_SENTINEL,
    PDS_REMOVED_STATUS_CODE,
};
use std::sync::Arc;
use tokio::sync::watch;

/// Demographics reconciliation against PDS over MESH.
pub struct PdsService {
    mesh: Arc<dyn MeshExchange>,
    fhir: Arc<dyn FhirStore>,
    page_size: usize,
}

impl PdsService {
    pub fn new(mesh: Arc<dyn MeshExchange>, fhir: Arc<dyn FhirStore>, page_size: usize) -> Self {
        Self {
            mesh,
            fhir,
            page_size,
        }
    }

    /// Wire up the service from configuration with real transport clients.
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        let mailbox = Arc::new(HttpMailbox::new(&config.mesh.pds)?);
        let mesh = Arc::new(PdsMeshClient::new(mailbox, config.mesh.pds.clone()));
        let fhir = Arc::new(DataHubFhirClient::new(&config.fhir)?);
        Ok(Self::new(mesh, fhir, FHIR_SERVER_MAX_PAGE_SIZE))
    }

    /// Page through the hub's patients and send each page as a trace file.
    ///
    /// A conversion failure aborts the run; a transport failure skips only
    /// the affected page. Pagination continues only while full pages come
    /// back, so the last partial page ends the run.
    pub async fn send_mesh_messages(&self, cancel: &watch::Receiver<bool>) -> Result<()> {
        tracing::info!("Sending PDS trace requests to MESH");

        let mut bundle = self.fhir.search_patients(self.page_size).await?;
        tracing::info!(
            count = bundle.entry.len(),
            "Resources returned when searching data hub FHIR service"
        );

        loop {
            if *cancel.borrow() {
                tracing::info!("Cancellation requested while sending PDS trace requests");
                return Ok(());
            }

            let csv = convert::bundle_to_csv(&bundle)?;
            tracing::info!("Patient bundle converted to CSV");

            match self.mesh.send_message(&csv).await {
                Ok(sent) => {
                    tracing::info!(message_id = %sent.message_id, "Message sent to MESH");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to send message to MESH");
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

    /// Drain the PDS mailbox, folding each data message into the hub.
    ///
    /// A message that fails to process is left unacknowledged for the next
    /// run; only successfully handled messages are removed from the inbox.
    pub async fn retrieve_mesh_messages(&self, cancel: &watch::Receiver<bool>) -> Result<()> {
        tracing::info!("Checking for PDS messages in MESH");

        let message_ids = self.mesh.list_messages().await?;
        tracing::info!(count = message_ids.len(), "Retrieved PDS messages from MESH");

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
        match classify_filename(&file_name, PDS_MESH_FILE_NAME_PREFIX) {
            MessageKind::Data => self.process_data_message(&message).await,
            MessageKind::Control => {
                // The PDS exchange correlates inline; a control file here
                // carries nothing we track.
                tracing::debug!(
                    message_id = %message_id,
                    file_name = %file_name,
                    "Ignoring control file on the PDS exchange"
                );
                Ok(())
            }
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

    async fn process_data_message(&self, message: &MeshMessage) -> Result<()> {
        let csv = message.content_utf8();
        let mut records = convert::csv_to_records(&csv)?;

        let deleted = reconcile_removed_patients(&mut records);
        let json = convert::records_to_json(&records)?;
        tracing::info!(message_id = %message.id, "Message converted to JSON");

        let mut bundle = self
            .fhir
            .convert_data(ConvertDataRequest {
                input_data: json,
                template: TemplateInfo::for_pds_mesh_patient(),
            })
            .await?;
        tracing::info!(message_id = %message.id, "Message converted to FHIR bundle");

        if !deleted.is_empty() {
            bundle.append_delete_entries("Patient", &deleted);
        }

        self.fhir.transaction(bundle).await?;
        tracing::info!(message_id = %message.id, "Message processed successfully");

        Ok(())
    }
}

/// Apply the removed-patient policy to a parsed response in place.
///
/// A status code of 91 means PDS has removed or merged the traced record.
/// The original hub record is always scheduled for deletion; when the
/// response names a real superseding NHS number the row is rewritten to it,
/// otherwise the row is dropped entirely. Iteration runs from the end so
/// removals cannot shift unvisited rows, and the returned deletions keep
/// that order.
pub fn reconcile_removed_patients(records: &mut Vec<PdsMeshRecordResponse>) -> Vec<String> {
    let mut deleted = Vec::new();

    for i in (0..records.len()).rev() {
        if records[i].error_success_code.as_deref() != Some(PDS_REMOVED_STATUS_CODE) {
            continue;
        }

        let original = records[i].nhs_number.clone();
        if let Some(number) = original.clone() {
            deleted.push(number);
        }

        match (records[i].matched_nhs_no.clone(), original) {
            (Some(matched), Some(_)) if matched != PDS_NO_MATCH_SENTINEL => {
                records[i].nhs_number = Some(matched);
            }
            _ => {
                records.remove(i);
            }
        }
    }

    deleted
}
