//! Reconciliation engine
//!
//! One submodule per upstream registry. Each service owns the full cycle
//! for its registry: batch the FHIR hub's patients into request files on
//! the send path, and fold the registry's responses back into the hub on
//! the retrieve path.

pub mod ndop;
pub mod pds;
pub mod validate;

pub use ndop::NdopService;
pub use pds::PdsService;
