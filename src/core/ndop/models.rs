//! NDOP check file records

use serde::{Deserialize, Serialize};

/// One row of an outbound check file: NHS number plus a mandatory blank
/// trailing column. The file carries no header.
#[derive(Debug, Clone, Serialize)]
pub struct NdopMeshRecordRequest {
    pub nhs_number: String,
    pub blank: String,
}

/// One row of an inbound response file. Headerless; the first column is the
/// NHS number of a patient who has NOT opted out. The trailing blank column
/// is not always present.
#[derive(Debug, Clone, Deserialize)]
pub struct NdopMeshRecordResponse {
    pub nhs_number: String,

    #[serde(default)]
    pub blank: Option<String>,
}

/// One consent answer in the JSON handed to the hub's conversion template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NdopMeshEnrichedRecord {
    pub nhs_number: String,
    pub opted_out: bool,
}

/// Result of converting a patient page to a check file: the CSV body plus
/// the batch of NHS numbers it contains, remembered for correlation.
#[derive(Debug, Clone)]
pub struct NdopBundleCsv {
    pub csv: String,
    pub nhs_numbers: Vec<String>,
}
