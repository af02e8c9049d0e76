//! FHIR data hub adapter
//!
//! The central FHIR store is the system of record for patients and consent
//! records. The bridge reads it with paginated searches, converts wire
//! payloads into FHIR bundles through its `$convert-data` operation, and
//! writes with transactional bundles.

pub mod client;
pub mod models;

pub use client::{DataHubFhirClient, FhirStore};
pub use models::{Bundle, BundleEntry, BundleRequest, ConvertDataRequest, TemplateInfo};
