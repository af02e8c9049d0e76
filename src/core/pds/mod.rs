//! PDS demographics reconciliation
//!
//! Patients are traced against the Personal Demographics Service in bulk
//! over MESH. Requests are CSV trace files keyed by the hub's resource ID;
//! responses carry the authoritative demographics plus a match outcome per
//! row, which this module folds back into the FHIR hub.

pub mod convert;
pub mod models;
pub mod service;

pub use service::PdsService;
