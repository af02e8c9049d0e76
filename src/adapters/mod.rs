//! External integrations
//!
//! This module contains the adapters for the systems the bridge talks to:
//! the MESH mailbox transport, the central FHIR data hub, and the tracking
//! cache used to correlate asynchronous responses.

pub mod cache;
pub mod fhir;
pub mod mesh;
