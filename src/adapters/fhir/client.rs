//! FHIR data hub client
//!
//! [`FhirStore`] is the seam the reconciliation services depend on:
//! paginated patient search with cursor continuation, `$convert-data`, and
//! transactional commit. [`DataHubFhirClient`] is the reqwest
//! implementation against the hub's REST API.

use crate::adapters::fhir::models::{convert_data_payload, Bundle, ConvertDataRequest};
use crate::config::FhirConfig;
use crate::domain::{FhirError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use std::time::Duration;
use uuid::Uuid;

/// Operations the bridge needs from the central FHIR store.
#[async_trait]
pub trait FhirStore: Send + Sync {
    /// Search all patients, returning the first page of at most `page_size`.
    async fn search_patients(&self, page_size: usize) -> Result<Bundle>;

    /// Fetch the next page of a search set via its continuation link.
    async fn continue_search(&self, current: &Bundle) -> Result<Bundle>;

    /// Convert wire-format data into a FHIR bundle via `$convert-data`.
    async fn convert_data(&self, request: ConvertDataRequest) -> Result<Bundle>;

    /// Commit a transaction bundle.
    async fn transaction(&self, bundle: Bundle) -> Result<Bundle>;
}

/// REST client for the FHIR data hub.
pub struct DataHubFhirClient {
    base_url: String,
    template_image: String,
    access_token: Option<String>,
    client: Client,
}

impl DataHubFhirClient {
    /// Create a client from configuration.
    pub fn new(config: &FhirConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FhirError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            template_image: config.template_image.clone(),
            access_token: config
                .access_token
                .as_ref()
                .map(|token| token.expose_secret().to_string()),
            client,
        })
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => builder.header("Authorization", format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn get_bundle(&self, url: &str) -> Result<Bundle> {
        let response = self
            .request(self.client.get(url))
            .send()
            .await
            .map_err(|e| FhirError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FhirError::SearchFailed(format!("{status}: {body}")).into());
        }

        response
            .json::<Bundle>()
            .await
            .map_err(|e| FhirError::InvalidResponse(e.to_string()).into())
    }
}

#[async_trait]
impl FhirStore for DataHubFhirClient {
    async fn search_patients(&self, page_size: usize) -> Result<Bundle> {
        let url = format!("{}/Patient?_count={page_size}", self.base_url);
        tracing::debug!(url = %url, "Searching patients in FHIR service");
        self.get_bundle(&url).await
    }

    async fn continue_search(&self, current: &Bundle) -> Result<Bundle> {
        let next = current.next_link().ok_or(FhirError::MissingNextLink)?;
        tracing::debug!(url = %next, "Continuing patient search");
        self.get_bundle(next).await
    }

    async fn convert_data(&self, request: ConvertDataRequest) -> Result<Bundle> {
        let template_name = request.template.name();
        tracing::info!(
            template = %template_name,
            data_type = %request.template.data_type,
            "Converting data with template"
        );

        let payload = convert_data_payload(
            &request.input_data,
            &request.template.data_type,
            &self.template_image,
            &template_name,
        );

        let url = format!("{}/$convert-data", self.base_url);
        let response = self
            .request(self.client.post(&url).json(&payload))
            .send()
            .await
            .map_err(|e| FhirError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FhirError::InvalidResponse(e.to_string()))?;

        if !status.is_success() {
            tracing::error!(status = %status, response = %body, "Error converting data");
            // A missing template is a deployment problem, not a retry candidate.
            let needle = format!("Template '{template_name}' not found");
            if body.to_lowercase().contains(&needle.to_lowercase()) {
                return Err(FhirError::TemplateNotFound(template_name).into());
            }
            return Err(FhirError::ConversionFailed {
                status: status.as_u16(),
                message: body,
            }
            .into());
        }

        serde_json::from_str::<Bundle>(&body)
            .map_err(|e| FhirError::InvalidResponse(format!("expected a Bundle: {e}")).into())
    }

    async fn transaction(&self, mut bundle: Bundle) -> Result<Bundle> {
        bundle.id = Some(Uuid::new_v4().to_string());

        tracing::info!(
            total = bundle.entry.len(),
            "Committing transaction bundle to FHIR service"
        );

        let response = self
            .request(self.client.post(&self.base_url).json(&bundle))
            .send()
            .await
            .map_err(|e| FhirError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FhirError::TransactionFailed(format!("{status}: {body}")).into());
        }

        response
            .json::<Bundle>()
            .await
            .map_err(|e| FhirError::InvalidResponse(e.to_string()).into())
    }
}
