//! Retrieved MESH messages and filename classification
//!
//! The MESH transport has no structured message-type field: the only signal
//! for what a retrieved message is comes from its remote filename. The
//! classification is kept as a pure function here so the retrieve pipelines
//! can be tested without any I/O.

use std::collections::HashMap;

use super::MESH_FILE_NAME_HEADER;

/// A single message retrieved from a MESH mailbox.
///
/// A zero-length body is a valid message (a trace acknowledgement), distinct
/// from the message being absent.
#[derive(Debug, Clone)]
pub struct MeshMessage {
    /// Opaque transport-assigned message ID
    pub id: String,

    /// Transport headers, including the original remote filename
    pub headers: HashMap<String, String>,

    /// Raw message content
    pub content: Vec<u8>,
}

impl MeshMessage {
    /// The original remote filename, if the transport supplied one.
    pub fn file_name(&self) -> Option<&str> {
        self.headers.get(MESH_FILE_NAME_HEADER).map(String::as_str)
    }

    /// Message content decoded as UTF-8, with invalid bytes replaced.
    pub fn content_utf8(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

/// Classification of a retrieved message, decided once per message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// A `.ctl` sidecar carrying correlation metadata
    Control,
    /// A substantive response payload matching the source's file prefix
    Data,
    /// Anything else: trace acknowledgements, reports, empty bodies
    Trace,
}

/// Classify a retrieved message by its remote filename.
///
/// `data_prefix` is the source-specific request-file prefix (for example
/// `MPTREQ` or `NDOPREQ`); a data file must carry that prefix and a `.dat`
/// or `.csv` extension. Control files are recognised by extension alone.
pub fn classify_filename(file_name: &str, data_prefix: &str) -> MessageKind {
    let extension = file_extension(file_name);

    if extension == ".ctl" {
        return MessageKind::Control;
    }

    if file_name.starts_with(data_prefix) && (extension == ".dat" || extension == ".csv") {
        return MessageKind::Data;
    }

    MessageKind::Trace
}

/// The filename without its final extension.
///
/// Control and data files share a base name; this is the correlation key on
/// the retrieve path.
pub fn file_base_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) => &file_name[..idx],
        None => file_name,
    }
}

/// The final extension including the leading dot, or an empty string.
pub fn file_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) => &file_name[idx..],
        None => "",
    }
}
