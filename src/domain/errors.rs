//! Domain error types
//!
//! This module defines the error hierarchy for the bridge. All errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main bridge error type
///
/// This is the primary error type used throughout the application.
/// It wraps transport- and store-specific error types and provides
/// context for error handling.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// MESH mailbox transport errors
    #[error("MESH error: {0}")]
    Mesh(#[from] MeshError),

    /// FHIR data hub errors
    #[error("FHIR error: {0}")]
    Fhir(#[from] FhirError),

    /// Wire-format conversion errors (CSV/XML/JSON)
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Correlation failures (tracking state missing or expired)
    #[error("Correlation error: {0}")]
    Correlation(String),

    /// Tracking cache access errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// MESH mailbox transport errors
///
/// Errors that occur when talking to a MESH mailbox. These errors don't
/// expose the underlying HTTP client types.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Failed to connect to the mailbox endpoint
    #[error("Failed to connect to MESH mailbox: {0}")]
    ConnectionFailed(String),

    /// Sending a message failed
    #[error("Failed to send message: {0}")]
    SendFailed(String),

    /// Listing pending messages failed
    #[error("Failed to list inbox messages: {0}")]
    ListFailed(String),

    /// Retrieving a single message failed
    #[error("Failed to retrieve message {message_id}: {message}")]
    RetrieveFailed { message_id: String, message: String },

    /// Acknowledging a message failed
    #[error("Failed to acknowledge message {message_id}: {message}")]
    AcknowledgeFailed { message_id: String, message: String },

    /// A control file did not carry the expected correlation element
    #[error("Invalid control file: {0}")]
    InvalidControlFile(String),

    /// Server error (5xx)
    #[error("MESH server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("MESH client error: {status} - {message}")]
    ClientError { status: u16, message: String },
}

/// FHIR data hub errors
///
/// Errors that occur when interacting with the central FHIR store.
#[derive(Debug, Error)]
pub enum FhirError {
    /// Failed to connect to the FHIR server
    #[error("Failed to connect to FHIR server: {0}")]
    ConnectionFailed(String),

    /// Search request failed
    #[error("Search failed: {0}")]
    SearchFailed(String),

    /// The bundle has no continuation link to follow
    #[error("Bundle has no next link to continue pagination")]
    MissingNextLink,

    /// The named mapping template is not deployed on the conversion service.
    /// A configuration error, not a retry candidate.
    #[error("Conversion template not found: {0}")]
    TemplateNotFound(String),

    /// `$convert-data` failed for a reason other than a missing template
    #[error("Data conversion failed: {status} - {message}")]
    ConversionFailed { status: u16, message: String },

    /// Transactional commit failed
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Response could not be parsed into the expected shape
    #[error("Invalid response from FHIR server: {0}")]
    InvalidResponse(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        BridgeError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for BridgeError {
    fn from(err: toml::de::Error) -> Self {
        BridgeError::Configuration(format!("TOML parse error: {err}"))
    }
}
