//! Minimal FHIR model types
//!
//! Only the slice of FHIR the bridge touches is modelled: search-set and
//! transaction bundles, entry request components for deletes, the
//! `$convert-data` Parameters payload, and NHS-number extraction from
//! Patient resources. Resources themselves stay as raw JSON values.

use crate::domain::NHS_NUMBER_SYSTEM;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A FHIR bundle: search results, or a transaction to commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub bundle_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<BundleLink>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,
}

/// A pagination or self link on a bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleLink {
    pub relation: String,
    pub url: String,
}

/// One bundle entry: a resource, a request directive, or both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleEntry {
    #[serde(rename = "fullUrl", skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<BundleRequest>,
}

/// Transaction request component of a bundle entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleRequest {
    pub method: String,
    pub url: String,
}

impl Bundle {
    /// The continuation URL for the next page of a search set, if any.
    pub fn next_link(&self) -> Option<&str> {
        self.link
            .iter()
            .find(|link| link.relation == "next")
            .map(|link| link.url.as_str())
    }

    /// Append one DELETE entry per resource ID, after any existing entries.
    pub fn append_delete_entries(&mut self, resource_type: &str, ids: &[String]) {
        for id in ids {
            self.entry.push(BundleEntry {
                full_url: None,
                resource: None,
                request: Some(BundleRequest {
                    method: "DELETE".to_string(),
                    url: format!("{resource_type}/{id}"),
                }),
            });
        }
    }
}

/// Extract a resource's NHS number from its identifier list.
pub fn nhs_number(resource: &Value) -> Option<String> {
    resource
        .get("identifier")?
        .as_array()?
        .iter()
        .find(|identifier| {
            identifier.get("system").and_then(Value::as_str) == Some(NHS_NUMBER_SYSTEM)
        })?
        .get("value")?
        .as_str()
        .map(str::to_string)
}

/// A mapping template deployed on the conversion service.
///
/// The template name is derived from its coordinates, lowercased.
#[derive(Debug, Clone)]
pub struct TemplateInfo {
    pub organisation_code: String,
    pub domain: String,
    pub data_type: String,
    pub resource_type: String,
}

impl TemplateInfo {
    pub fn name(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.organisation_code, self.domain, self.data_type, self.resource_type
        )
        .to_lowercase()
    }

    /// Template for PDS MESH patient responses.
    pub fn for_pds_mesh_patient() -> Self {
        Self {
            organisation_code: "x26".to_string(),
            domain: "pds-mesh".to_string(),
            data_type: "json".to_string(),
            resource_type: "patient".to_string(),
        }
    }

    /// Template for NDOP MESH consent responses.
    pub fn for_ndop_mesh_consent() -> Self {
        Self {
            organisation_code: "x26".to_string(),
            domain: "ndop-mesh".to_string(),
            data_type: "json".to_string(),
            resource_type: "consent".to_string(),
        }
    }
}

/// Input to the hub's `$convert-data` operation.
#[derive(Debug, Clone)]
pub struct ConvertDataRequest {
    pub input_data: String,
    pub template: TemplateInfo,
}

/// Build the `$convert-data` Parameters resource.
pub fn convert_data_payload(
    input_data: &str,
    input_data_type: &str,
    template_collection_reference: &str,
    root_template: &str,
) -> Value {
    serde_json::json!({
        "resourceType": "Parameters",
        "parameter": [
            { "name": "inputData", "valueString": input_data },
            { "name": "inputDataType", "valueString": input_data_type },
            { "name": "templateCollectionReference", "valueString": template_collection_reference },
            { "name": "rootTemplate", "valueString": root_template }
        ]
    })
}
