//! PDS MESH trace file records
//!
//! Column names follow the PDS bulk demographics trace interface. The same
//! serde names drive both CSV (column headers) and the JSON handed to the
//! hub's conversion templates.

use serde::{Deserialize, Serialize};

/// One row of an outbound trace request file.
///
/// Only the unique reference and NHS number are populated; the remaining
/// columns are part of the interface but the hub traces by NHS number alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdsMeshRecordRequest {
    #[serde(rename = "UNIQUE REFERENCE")]
    pub unique_reference: String,

    #[serde(rename = "NHS_NO")]
    pub nhs_number: String,

    #[serde(rename = "FAMILY_NAME")]
    pub family_name: String,

    #[serde(rename = "GIVEN_NAME")]
    pub given_name: String,

    #[serde(rename = "OTHER_GIVEN_NAME")]
    pub other_given_name: String,

    #[serde(rename = "GENDER")]
    pub gender: String,

    #[serde(rename = "DATE_OF_BIRTH")]
    pub date_of_birth: String,

    #[serde(rename = "POSTCODE")]
    pub postcode: String,

    #[serde(rename = "DATE_OF_DEATH")]
    pub date_of_death: String,

    #[serde(rename = "ADDRESS_LINE1")]
    pub address_line1: String,

    #[serde(rename = "ADDRESS_LINE2")]
    pub address_line2: String,

    #[serde(rename = "ADDRESS_LINE3")]
    pub address_line3: String,

    #[serde(rename = "ADDRESS_LINE4")]
    pub address_line4: String,

    #[serde(rename = "ADDRESS_LINE5")]
    pub address_line5: String,

    #[serde(rename = "ADDRESS_DATE")]
    pub address_date: String,

    #[serde(rename = "GP_PRACTICE_CODE")]
    pub gp_practice_code: String,

    #[serde(rename = "GP_REGISTRATION_DATE")]
    pub gp_registration_date: String,

    #[serde(rename = "NHAIS_POSTING_ID")]
    pub nhais_posting_id: String,

    #[serde(rename = "AS_AT_DATE")]
    pub as_at_date: String,

    #[serde(rename = "LOCAL_PATIENT_ID")]
    pub local_patient_id: String,

    #[serde(rename = "INTERNAL_ID")]
    pub internal_id: String,

    #[serde(rename = "TELEPHONE_NUMBER")]
    pub telephone_number: String,

    #[serde(rename = "MOBILE_NUMBER")]
    pub mobile_number: String,

    #[serde(rename = "EMAIL_ADDRESS")]
    pub email_address: String,
}

/// One row of an inbound trace response file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdsMeshRecordResponse {
    #[serde(rename = "UNIQUE REFERENCE")]
    pub unique_reference: Option<String>,

    #[serde(rename = "REQ_NHS_NUMBER")]
    pub nhs_number: Option<String>,

    #[serde(rename = "FAMILY_NAME")]
    pub family_name: Option<String>,

    #[serde(rename = "GIVEN_NAME")]
    pub given_name: Option<String>,

    #[serde(rename = "OTHER_GIVEN_NAME")]
    pub other_given_name: Option<String>,

    #[serde(rename = "GENDER")]
    pub gender: Option<String>,

    #[serde(rename = "DATE_OF_BIRTH")]
    pub date_of_birth: Option<String>,

    #[serde(rename = "DATE_OF_DEATH")]
    pub date_of_death: Option<String>,

    #[serde(rename = "ADDRESS_LINE1")]
    pub address_line1: Option<String>,

    #[serde(rename = "ADDRESS_LINE2")]
    pub address_line2: Option<String>,

    #[serde(rename = "ADDRESS_LINE3")]
    pub address_line3: Option<String>,

    #[serde(rename = "ADDRESS_LINE4")]
    pub address_line4: Option<String>,

    #[serde(rename = "ADDRESS_LINE5")]
    pub address_line5: Option<String>,

    #[serde(rename = "POSTCODE")]
    pub postcode: Option<String>,

    #[serde(rename = "GP_PRACTICE_CODE")]
    pub gp_practice_code: Option<String>,

    #[serde(rename = "GP_REGISTRATION_DATE")]
    pub gp_registration_date: Option<String>,

    #[serde(rename = "NHAIS_POSTING_ID")]
    pub nhais_posting_id: Option<String>,

    #[serde(rename = "AS_AT_DATE")]
    pub as_at_date: Option<String>,

    #[serde(rename = "LOCAL_PATIENT_ID")]
    pub local_patient_id: Option<String>,

    #[serde(rename = "INTERNAL_ID")]
    pub internal_id: Option<String>,

    #[serde(rename = "TELEPHONE_NUMBER")]
    pub telephone_number: Option<String>,

    #[serde(rename = "MOBILE_NUMBER")]
    pub mobile_number: Option<String>,

    #[serde(rename = "EMAIL_ADDRESS")]
    pub email_address: Option<String>,

    #[serde(rename = "SENSITIVITY_FLAG")]
    pub sensitivity_flag: Option<String>,

    #[serde(rename = "MPS_ID")]
    pub mps_id: Option<String>,

    #[serde(rename = "ERROR/SUCCESS_CODE")]
    pub error_success_code: Option<String>,

    #[serde(rename = "MATCHED_NHS_NO")]
    pub matched_nhs_no: Option<String>,

    #[serde(rename = "MATCHED_ALGORITHM_INDICATOR")]
    pub matched_algorithm_indicator: Option<String>,

    #[serde(rename = "MATCHED_CONFIDENCE_PERCENTAGE")]
    pub matched_confidence_percentage: Option<String>,
}

/// Canonical header line of a trace response file, in column order.
///
/// Responses arrive with a summary line first and sometimes without this
/// header; the converter reinstates it before parsing.
pub const RESPONSE_HEADER_LINE: &str = "UNIQUE REFERENCE,REQ_NHS_NUMBER,FAMILY_NAME,GIVEN_NAME,\
OTHER_GIVEN_NAME,GENDER,DATE_OF_BIRTH,DATE_OF_DEATH,ADDRESS_LINE1,ADDRESS_LINE2,ADDRESS_LINE3,\
ADDRESS_LINE4,ADDRESS_LINE5,POSTCODE,GP_PRACTICE_CODE,GP_REGISTRATION_DATE,NHAIS_POSTING_ID,\
AS_AT_DATE,LOCAL_PATIENT_ID,INTERNAL_ID,TELEPHONE_NUMBER,MOBILE_NUMBER,EMAIL_ADDRESS,\
SENSITIVITY_FLAG,MPS_ID,ERROR/SUCCESS_CODE,MATCHED_NHS_NO,MATCHED_ALGORITHM_INDICATOR,\
MATCHED_CONFIDENCE_PERCENTAGE";
