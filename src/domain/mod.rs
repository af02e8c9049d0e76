//! Core domain types
//!
//! This module contains the domain types shared across the bridge: the error
//! hierarchy, the `Result` alias, retrieved-message types and filename
//! classification, plus the wire-level constants both registries share.

pub mod errors;
pub mod message;
pub mod result;

pub use errors::{BridgeError, FhirError, MeshError};
pub use message::{classify_filename, MeshMessage, MessageKind};
pub use result::Result;

/// Identifier system for NHS numbers on FHIR Patient resources.
pub const NHS_NUMBER_SYSTEM: &str = "https://fhir.nhs.uk/Id/nhs-number";

/// Azure FHIR servers cap transaction bundles and search pages at 500 entries.
pub const FHIR_SERVER_MAX_PAGE_SIZE: usize = 500;

/// Filename prefix for PDS MESH trace request files.
pub const PDS_MESH_FILE_NAME_PREFIX: &str = "MPTREQ";

/// Filename prefix for NDOP MESH request files.
pub const NDOP_MESH_FILE_NAME_PREFIX: &str = "NDOPREQ";

/// MESH header carrying the original remote filename of a retrieved message.
pub const MESH_FILE_NAME_HEADER: &str = "mex-filename";

/// Response code marking a record as removed or merged at the registry.
pub const PDS_REMOVED_STATUS_CODE: &str = "91";

/// Sentinel "no match" NHS number in PDS merge responses.
pub const PDS_NO_MATCH_SENTINEL: &str = "0000000000";

/// How long correlation state for an outbound batch is kept before a late
/// response is treated as an unrecoverable miss.
pub const TRACKING_TTL_HOURS: u64 = 48;
