//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use patient_outcomes::RecordBatch;
use patient_outcomes::utils::arrow::batch_from_columns;

/// One raw patient record with the fields the tests vary
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub patient_id: &'static str,
    pub admit: Option<&'static str>,
    pub discharge: Option<&'static str>,
    pub died: Option<&'static str>,
    pub icd9: &'static str,
    pub diagnosis: &'static str,
    pub ethnicity: &'static str,
    pub admission_location: &'static str,
    pub discharge_location: &'static str,
    pub gender: &'static str,
    pub insurance: &'static str,
    pub first_careunit: &'static str,
    pub last_careunit: &'static str,
    pub los: f64,
    pub seq_num: f64,
}

impl RawRecord {
    pub fn new(patient_id: &'static str) -> Self {
        Self {
            patient_id,
            admit: Some("2130-03-01 10:00:00"),
            discharge: Some("2130-03-04 12:30:00"),
            died: None,
            icd9: "41401",
            diagnosis: "CORONARY ARTERY DISEASE",
            ethnicity: "ASIAN",
            admission_location: "EMERGENCY ROOM ADMIT",
            discharge_location: "HOME HEALTH CARE",
            gender: "F",
            insurance: "Medicare",
            first_careunit: "CCU",
            last_careunit: "CCU",
            los: 2.4,
            seq_num: 1.0,
        }
    }
}

fn text<T>(records: &[RawRecord], field: impl Fn(&RawRecord) -> T) -> ArrayRef
where
    T: Into<Option<&'static str>>,
{
    let values: Vec<Option<&str>> = records.iter().map(|r| field(r).into()).collect();
    Arc::new(StringArray::from(values)) as ArrayRef
}

fn constant(records: &[RawRecord], value: &'static str) -> ArrayRef {
    text(records, |_| value)
}

/// A raw record batch with the full column set of the admissions extract
pub fn raw_batch(records: &[RawRecord]) -> RecordBatch {
    let columns = vec![
        ("patient_id".to_string(), text(records, |r| r.patient_id)),
        ("HADM_ID".to_string(), constant(records, "100001")),
        ("ICUSTAY_ID".to_string(), constant(records, "200001")),
        ("DBSOURCE".to_string(), constant(records, "carevue")),
        ("ADMITTIME".to_string(), text(records, |r| r.admit)),
        ("DISCHTIME".to_string(), text(records, |r| r.discharge)),
        ("DEATHTIME".to_string(), text(records, |r| r.died)),
        ("ADMISSION_TYPE".to_string(), constant(records, "EMERGENCY")),
        ("ADMISSION_LOCATION".to_string(), text(records, |r| r.admission_location)),
        ("DISCHARGE_LOCATION".to_string(), text(records, |r| r.discharge_location)),
        ("INSURANCE".to_string(), text(records, |r| r.insurance)),
        ("LANGUAGE".to_string(), constant(records, "ENGL")),
        ("RELIGION".to_string(), constant(records, "CATHOLIC")),
        ("MARITAL_STATUS".to_string(), constant(records, "MARRIED")),
        ("ETHNICITY".to_string(), text(records, |r| r.ethnicity)),
        ("EDREGTIME".to_string(), constant(records, "2130-03-01 08:00:00")),
        ("EDOUTTIME".to_string(), constant(records, "2130-03-01 09:30:00")),
        ("DIAGNOSIS".to_string(), text(records, |r| r.diagnosis)),
        ("HOSPITAL_EXPIRE_FLAG".to_string(), constant(records, "0")),
        ("GENDER".to_string(), text(records, |r| r.gender)),
        ("DOB".to_string(), constant(records, "2070-06-15 00:00:00")),
        ("DOD".to_string(), text(records, |r| r.died)),
        ("DOD_HOSP".to_string(), text(records, |r| r.died)),
        ("DOD_SSN".to_string(), text(records, |_| None::<&'static str>)),
        ("FIRST_CAREUNIT".to_string(), text(records, |r| r.first_careunit)),
        ("LAST_CAREUNIT".to_string(), text(records, |r| r.last_careunit)),
        ("FIRST_WARDID".to_string(), constant(records, "7")),
        ("LAST_WARDID".to_string(), constant(records, "7")),
        ("INTIME".to_string(), constant(records, "2130-03-01 11:00:00")),
        ("OUTTIME".to_string(), constant(records, "2130-03-03 20:00:00")),
        (
            "LOS".to_string(),
            Arc::new(Float64Array::from(records.iter().map(|r| r.los).collect::<Vec<_>>())) as ArrayRef,
        ),
        ("ICD9_CODE".to_string(), text(records, |r| r.icd9)),
        (
            "SEQ_NUM".to_string(),
            Arc::new(Float64Array::from(records.iter().map(|r| r.seq_num).collect::<Vec<_>>()))
                as ArrayRef,
        ),
    ];
    batch_from_columns(columns, records.len()).unwrap()
}

/// A small cohort covering every collapse branch and several stay lengths
pub fn cohort() -> Vec<RawRecord> {
    vec![
        RawRecord::new("10006"),
        RawRecord {
            ethnicity: "WHITE",
            discharge_location: "REHAB/DISTINCT PART HOSP",
            admission_location: "PHYS REFERRAL/NORMAL DELI",
            icd9: "486",
            diagnosis: "PNEUMONIA",
            gender: "M",
            los: 7.8,
            seq_num: 3.0,
            discharge: Some("2130-03-15 09:00:00"),
            ..RawRecord::new("10011")
        },
        RawRecord {
            ethnicity: "BLACK/AFRICAN AMERICAN",
            discharge_location: "DEAD/EXPIRED",
            died: Some("2130-03-09 04:00:00"),
            icd9: "0389",
            diagnosis: "SEPSIS",
            insurance: "Private",
            first_careunit: "MICU",
            last_careunit: "MICU",
            los: 0.6,
            seq_num: 2.0,
            ..RawRecord::new("10013")
        },
        RawRecord {
            ethnicity: "WHITE",
            discharge_location: "LONG TERM CARE HOSPITAL",
            icd9: "V4581",
            diagnosis: "CORONARY ARTERY DISEASE",
            los: 64.0,
            seq_num: 5.0,
            ..RawRecord::new("10017")
        },
    ]
}
