//! NDOP check file conversions
//!
//! Outbound files are headerless two-column CSV, one NHS number per row.
//! Inbound files list only the NHS numbers that have NOT opted out; the
//! consent answer for the whole batch is a set difference against the
//! numbers originally sent.

use crate::adapters::fhir::models::{nhs_number, Bundle};
use crate::core::ndop::models::{
    NdopBundleCsv, NdopMeshEnrichedRecord, NdopMeshRecordRequest, NdopMeshRecordResponse,
};
use crate::domain::{BridgeError, Result};
use serde::Serialize;
use std::collections::HashSet;

/// Convert a page of hub patients into an outbound check file.
///
/// Patients without an NHS number cannot be checked and are skipped; they
/// are also left out of the remembered batch so no answer is fabricated
/// for them.
pub fn bundle_to_csv(bundle: &Bundle) -> Result<NdopBundleCsv> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    let mut nhs_numbers = Vec::new();

    for entry in &bundle.entry {
        let Some(resource) = entry.resource.as_ref() else {
            continue;
        };

        let Some(number) = nhs_number(resource) else {
            tracing::warn!(
                patient_id = resource.get("id").and_then(serde_json::Value::as_str),
                "Patient has no NHS number, skipping opt-out check"
            );
            continue;
        };

        writer
            .serialize(NdopMeshRecordRequest {
                nhs_number: number.clone(),
                blank: String::new(),
            })
            .map_err(|e| BridgeError::Conversion(e.to_string()))?;
        nhs_numbers.push(number);
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| BridgeError::Conversion(e.to_string()))?;
    let csv = String::from_utf8(bytes).map_err(|e| BridgeError::Conversion(e.to_string()))?;

    Ok(NdopBundleCsv { csv, nhs_numbers })
}

/// Enrich an inbound response into one consent answer per batch member.
///
/// Every NHS number originally sent gets exactly one answer: opted out
/// unless the response lists it. A non-empty response that parses to zero
/// rows is a conversion failure.
pub fn csv_to_consents(source: &str, sent_nhs_numbers: &[String]) -> Result<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source.as_bytes());

    let opted_in: Vec<NdopMeshRecordResponse> = reader
        .deserialize()
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| BridgeError::Conversion(e.to_string()))?;

    if opted_in.is_empty() {
        return Err(BridgeError::Conversion(
            "check response file contains no records".to_string(),
        ));
    }

    let opted_in: HashSet<String> = opted_in.into_iter().map(|r| r.nhs_number).collect();

    let consents: Vec<NdopMeshEnrichedRecord> = sent_nhs_numbers
        .iter()
        .map(|number| NdopMeshEnrichedRecord {
            nhs_number: number.clone(),
            opted_out: !opted_in.contains(number),
        })
        .collect();

    #[derive(Serialize)]
    struct Consents {
        consents: Vec<NdopMeshEnrichedRecord>,
    }

    Ok(serde_json::to_string(&Consents { consents })?)
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

    #[test]
    fn test_bundle_to_csv_is_headerless_with_blank_column() {
        let bundle = bundle_of(vec![
            patient("p1", Some("9434765919")),
            patient("p2", Some("9434765870")),
        ]);

        let result = bundle_to_csv(&bundle).unwrap();

        assert_eq!(result.csv, "9434765919,\n9434765870,\n");
        assert_eq!(result.nhs_numbers, vec!["9434765919", "9434765870"]);
    }

    #[test]
    fn test_bundle_to_csv_skips_patients_without_nhs_number() {
        let bundle = bundle_of(vec![
            patient("p1", None),
            patient("p2", Some("9434765870")),
        ]);

        let result = bundle_to_csv(&bundle).unwrap();

        assert_eq!(result.csv, "9434765870,\n");
        assert_eq!(result.nhs_numbers, vec!["9434765870"]);
    }

    #[test]
    fn test_bundle_to_csv_empty_bundle_yields_empty_file() {
        let result = bundle_to_csv(&bundle_of(Vec::new())).unwrap();

        assert!(result.csv.is_empty());
        assert!(result.nhs_numbers.is_empty());
    }

    #[test]
    fn test_csv_to_consents_is_a_set_difference() {
        let sent = vec![
            "1111111111".to_string(),
            "2222222222".to_string(),
            "3333333333".to_string(),
        ];

        let json = csv_to_consents("1111111111,\n3333333333,\n", &sent).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let consents = value["consents"].as_array().unwrap();
        assert_eq!(consents.len(), 3);
        assert_eq!(consents[0]["nhs_number"], "1111111111");
        assert_eq!(consents[0]["opted_out"], false);
        assert_eq!(consents[1]["nhs_number"], "2222222222");
        assert_eq!(consents[1]["opted_out"], true);
        assert_eq!(consents[2]["opted_out"], false);
    }

    #[test]
    fn test_csv_to_consents_handles_rows_without_blank_column() {
        let sent = vec!["1111111111".to_string()];

        let json = csv_to_consents("1111111111\n", &sent).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["consents"][0]["opted_out"], false);
    }

    #[test]
    fn test_csv_to_consents_zero_rows_is_a_failure() {
        let result = csv_to_consents("", &["1111111111".to_string()]);
        assert!(matches!(result, Err(BridgeError::Conversion(_))));
    }
}
