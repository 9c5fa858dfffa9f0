//! Raw and derived column names of the patient record table.

/// Record identifier, the key of every prediction set
pub const PATIENT_ID: &str = "patient_id";

pub const ADMITTIME: &str = "ADMITTIME";
pub const DISCHTIME: &str = "DISCHTIME";
pub const INTIME: &str = "INTIME";
pub const OUTTIME: &str = "OUTTIME";
pub const DOB: &str = "DOB";
pub const DOD_HOSP: &str = "DOD_HOSP";

pub const ICD9_CODE: &str = "ICD9_CODE";
pub const DIAGNOSIS: &str = "DIAGNOSIS";
pub const ADMISSION_TYPE: &str = "ADMISSION_TYPE";
pub const ADMISSION_LOCATION: &str = "ADMISSION_LOCATION";
pub const DISCHARGE_LOCATION: &str = "DISCHARGE_LOCATION";
pub const INSURANCE: &str = "INSURANCE";
pub const GENDER: &str = "GENDER";
pub const FIRST_CAREUNIT: &str = "FIRST_CAREUNIT";
pub const LAST_CAREUNIT: &str = "LAST_CAREUNIT";
pub const ETHNICITY: &str = "ETHNICITY";

/// ICU length of stay in fractional days
pub const LOS: &str = "LOS";
pub const SEQ_NUM: &str = "SEQ_NUM";

/// 1 when the patient died during the hospital stay
pub const DIED_IN_HOSPITAL: &str = "DIED_IN_HOSPITAL";
/// Whole days between admission and discharge
pub const LOS_IN_HOSPITAL: &str = "LOS_in_Hospital";
pub const ICD9_CATEGORY: &str = "ICD9_CATEGORY";
pub const LOS_BINNED: &str = "LOS_Binned";

/// Administrative columns with no predictive use, dropped first
pub const ADMINISTRATIVE_COLUMNS: [&str; 15] = [
    PATIENT_ID,
    "HADM_ID",
    "ICUSTAY_ID",
    "DBSOURCE",
    "LANGUAGE",
    "RELIGION",
    "FIRST_WARDID",
    "LAST_WARDID",
    "MARITAL_STATUS",
    "DOD_SSN",
    "DEATHTIME",
    "HOSPITAL_EXPIRE_FLAG",
    "EDREGTIME",
    "EDOUTTIME",
    "DOD",
];

/// Timestamp columns consumed by the stay-length derivation
pub const CONSUMED_TIMESTAMPS: [&str; 5] = [ADMITTIME, DISCHTIME, INTIME, OUTTIME, DOB];

/// Raw columns read as floating point; everything else is read as text
pub const NUMERIC_COLUMNS: [&str; 2] = [LOS, SEQ_NUM];
