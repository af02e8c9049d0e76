// meshbridge - MESH to FHIR data-exchange bridge
// Licensed under the MIT License

//! # meshbridge
//!
//! meshbridge is a backend batch service that keeps a central FHIR data hub in
//! step with two national registries over the MESH store-and-forward mailbox
//! transport:
//!
//! - **PDS** (patient demographics): bulk extracts of the hub's patients are
//!   sent as CSV trace files; asynchronous response files are reconciled back
//!   into the hub, including record deletions and NHS-number merges.
//! - **NDOP** (national data opt-out): bulk extracts of NHS numbers are sent
//!   with a DTS control file; responses are correlated back to the original
//!   batch through a TTL cache and turned into per-patient consent records.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (send/retrieve pipelines, converters, policies)
//! - [`adapters`] - External integrations (MESH mailboxes, FHIR hub, cache)
//! - [`domain`] - Core domain types, message classification, errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meshbridge::config::load_config;
//! use meshbridge::core::ndop::NdopService;
//! use tokio::sync::watch;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = load_config("meshbridge.toml")?;
//! let service = NdopService::from_config(&config)?;
//!
//! let (_tx, shutdown) = watch::channel(false);
//! service.send_mesh_messages(&shutdown).await?;
//! service.retrieve_mesh_messages(&shutdown).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], backed by the
//! [`domain::BridgeError`] hierarchy. Transport failures on a single page or
//! message are logged and isolated; conversion failures abort the run, since
//! they would repeat identically for every remaining page.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
