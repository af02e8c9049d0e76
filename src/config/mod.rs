//! Configuration management
//!
//! TOML-based configuration with environment variable substitution
//! (`${VAR_NAME}`), MESHBRIDGE_* prefixed overrides and validation on load.
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [mesh.pds]
//! base_url = "https://mesh.spineservices.nhs.uk"
//! mailbox_id = "X26HC001"
//! recipient_mailbox_id = "X26HC002"
//! workflow_id = "SPINE_PDS_MESH"
//! shared_key = "${MESH_PDS_SHARED_KEY}"
//!
//! [mesh.ndop]
//! base_url = "https://mesh.spineservices.nhs.uk"
//! mailbox_id = "X26HC003"
//! recipient_mailbox_id = "X26HC004"
//! workflow_id = "SPINE_NDOP_MESH"
//! shared_key = "${MESH_NDOP_SHARED_KEY}"
//!
//! [fhir]
//! base_url = "https://fhir.example.nhs.uk"
//! template_image = "acr.example/fhir-converter/templates:v1"
//!
//! [cache]
//! ttl_hours = 48
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, BridgeConfig, CacheConfig, FhirConfig, LoggingConfig, MeshConfig,
    MeshMailboxConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
