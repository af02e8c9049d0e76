//! NDOP consent reconciliation
//!
//! The National Data Opt-Out registry answers a batch of NHS numbers with
//! the subset that has NOT opted out. Correlation is indirect: the response
//! file only ties back to its request through the control-file sidecar, so
//! the batch sent is remembered in the tracking cache and the answer is a
//! set difference against it.

pub mod convert;
pub mod models;
pub mod service;

pub use service::NdopService;
