//! DTS control files
//!
//! A control file is a small XML sidecar that accompanies a data file and
//! carries routing and correlation metadata. The schema is fixed, so both
//! the builder and the `LocalId` extractor work over the literal tags rather
//! than a general XML model.

use crate::domain::{MeshError, Result};

/// Build the DTS control file body for an outbound data file.
///
/// `Subject` and `LocalId` both carry the correlation ID; receivers key off
/// either field.
pub fn build_control_file(
    workflow_id: &str,
    to_mailbox: &str,
    from_mailbox: &str,
    control_id: &str,
) -> String {
    format!(
        "<DTSControl>\
         <Version>1.0</Version>\
         <AddressType>DTS</AddressType>\
         <MessageType>Data</MessageType>\
         <WorkflowId>{workflow_id}</WorkflowId>\
         <To_DTS>{to_mailbox}</To_DTS>\
         <From_DTS>{from_mailbox}</From_DTS>\
         <Subject>{control_id}</Subject>\
         <LocalId>{control_id}</LocalId>\
         <Compress>Y</Compress>\
         <AllowChunking>Y</AllowChunking>\
         <Encrypted>N</Encrypted>\
         </DTSControl>"
    )
}

/// Extract the `LocalId` element value from a control file body.
pub fn parse_local_id(content: &str) -> Result<String> {
    const OPEN: &str = "<LocalId>";
    const CLOSE: &str = "</LocalId>";

    let start = content
        .find(OPEN)
        .ok_or_else(|| MeshError::InvalidControlFile("missing LocalId element".to_string()))?
        + OPEN.len();
    let end = content[start..]
        .find(CLOSE)
        .ok_or_else(|| MeshError::InvalidControlFile("unterminated LocalId element".to_string()))?;

    let local_id = content[start..start + end].trim();
    if local_id.is_empty() {
        return Err(MeshError::InvalidControlFile("empty LocalId element".to_string()).into());
    }

    Ok(local_id.to_string())
}
