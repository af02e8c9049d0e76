//! PDS trace file conversions
//!
//! Outbound: one CSV row per hub patient, headered per the trace interface.
//! Inbound: response files open with a summary line and may or may not carry
//! the column header; the header is reinstated exactly once before parsing.

use crate::adapters::fhir::models::{nhs_number, Bundle};
use crate::core::pds::models::{PdsMeshRecordRequest, PdsMeshRecordResponse, RESPONSE_HEADER_LINE};
use crate::core::validate::is_valid_nhs_number;
use crate::domain::{BridgeError, Result};
use serde::Serialize;

/// Convert a page of hub patients into an outbound trace request file.
///
/// A patient without an NHS number fails the whole page: a partial trace
/// file would silently drop patients from reconciliation.
pub fn bundle_to_csv(bundle: &Bundle) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for entry in &bundle.entry {
        let resource = entry.resource.as_ref().ok_or_else(|| {
            BridgeError::Conversion("bundle entry has no resource".to_string())
        })?;

        let id = resource
            .get("id")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| BridgeError::Conversion("patient has no resource ID".to_string()))?;

        let number = nhs_number(resource).ok_or_else(|| {
            BridgeError::Conversion(format!("patient {id} has no NHS number"))
        })?;

        if !is_valid_nhs_number(&number) {
            tracing::warn!(
                patient_id = %id,
                nhs_number = %number,
                "Patient NHS number fails modulus 11 check"
            );
        }

        writer
            .serialize(PdsMeshRecordRequest {
                unique_reference: id.to_string(),
                nhs_number: number,
                ..Default::default()
            })
            .map_err(|e| BridgeError::Conversion(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| BridgeError::Conversion(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| BridgeError::Conversion(e.to_string()))
}

/// Parse an inbound trace response file into records.
///
/// A non-empty file that yields zero records is a conversion failure, not an
/// empty result: it means the layout was not what this interface produces.
pub fn csv_to_records(source: &str) -> Result<Vec<PdsMeshRecordResponse>> {
    let content = normalized_csv_content(source);

    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let records: Vec<PdsMeshRecordResponse> = reader
        .deserialize()
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| BridgeError::Conversion(e.to_string()))?;

    if records.is_empty() {
        return Err(BridgeError::Conversion(
            "trace response file contains no records".to_string(),
        ));
    }

    Ok(records)
}

/// Wrap parsed records into the JSON document the conversion template expects.
pub fn records_to_json(records: &[PdsMeshRecordResponse]) -> Result<String> {
    #[derive(Serialize)]
    struct Patients<'a> {
        patients: &'a [PdsMeshRecordResponse],
    }

    Ok(serde_json::to_string(&Patients { patients: records })?)
}

/// Drop the summary line and ensure exactly one header line follows.
fn normalized_csv_content(source: &str) -> String {
    let mut lines = source.lines().skip(1).peekable();

    if lines.peek() == Some(&RESPONSE_HEADER_LINE) {
        return lines.collect::<Vec<_>>().join("\n");
    }

    std::iter::once(RESPONSE_HEADER_LINE)
        .chain(lines)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(id: &str, number: Option<&str>) -> serde_json::Value {
        let mut resource = serde_json::json!({ "resourceType": "Patient", "id": id });
        if let Some(number) = number {
            resource["identifier"] = serde_json::json!([
                { "system": "https://fhir.nhs.uk/Id/nhs-number", "value": number }
            ]);
        }
        resource
    }

    fn bundle_of(patients: Vec<serde_json::Value>) -> Bundle {
        serde_json::from_value(serde_json::json!({
            "resourceType": "Bundle",
            "type": "searchset",
            "entry": patients.into_iter()
                .map(|p| serde_json::json!({ "resource": p }))
                .collect::<Vec<_>>()
        }))
        .unwrap()
    }

    fn response_row(reference: &str, number: &str, code: &str, matched: &str) -> String {
        let mut row: Vec<&str> = vec![""; 29];
        row[0] = reference;
        row[1] = number;
        row[25] = code;
        row[26] = matched;
        row.join(",")
    }

    #[test]
    fn test_bundle_to_csv_writes_reference_and_nhs_number() {
        let bundle = bundle_of(vec![
            patient("p1", Some("9434765919")),
            patient("p2", Some("9434765870")),
        ]);

        let csv = bundle_to_csv(&bundle).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("UNIQUE REFERENCE,NHS_NO"));
        assert!(lines[1].starts_with("p1,9434765919,"));
        assert!(lines[2].starts_with("p2,9434765870,"));
    }

    #[test]
    fn test_bundle_to_csv_fails_on_missing_nhs_number() {
        let bundle = bundle_of(vec![patient("p1", None)]);

        let result = bundle_to_csv(&bundle);
        assert!(matches!(result, Err(BridgeError::Conversion(_))));
    }

    #[test]
    fn test_csv_to_records_prepends_missing_header() {
        let source = format!(
            "summary,of,the,response\n{}",
            response_row("p1", "9434765919", "00", "")
        );

        let records = csv_to_records(&source).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].unique_reference.as_deref(), Some("p1"));
    }

    #[test]
    fn test_csv_to_records_keeps_existing_header() {
        let source = format!(
            "summary,of,the,response\n{}\n{}",
            RESPONSE_HEADER_LINE,
            response_row("p1", "9434765919", "00", "")
        );

        let records = csv_to_records(&source).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].nhs_number.as_deref(), Some("9434765919"));
    }

    #[test]
    fn test_csv_to_records_fails_when_no_rows_remain() {
        let result = csv_to_records("summary,only,line");
        assert!(matches!(result, Err(BridgeError::Conversion(_))));
    }

    #[test]
    fn test_records_to_json_wraps_in_patients_key() {
        let records = csv_to_records(&format!(
            "summary\n{}",
            response_row("p1", "9434765919", "91", "9434765870")
        ))
        .unwrap();

        let json = records_to_json(&records).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["patients"][0]["UNIQUE REFERENCE"], "p1");
        assert_eq!(value["patients"][0]["ERROR/SUCCESS_CODE"], "91");
    }
}
