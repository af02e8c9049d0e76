//! MESH mailbox transport adapter
//!
//! MESH is a store-and-forward mailbox system: messages are uploaded to a
//! recipient mailbox, listed and downloaded by the recipient, and removed by
//! an explicit acknowledgement. This module provides the raw mailbox client
//! plus the per-registry clients that own filename and correlation-ID
//! conventions.

pub mod client;
pub mod control;
pub mod mailbox;

pub use client::{MeshExchange, NdopMeshClient, PdsMeshClient, SentMessage};
pub use mailbox::{HttpMailbox, Mailbox};
