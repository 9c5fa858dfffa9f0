//! ICD-9 diagnosis code classification
//!
//! Maps a raw ICD-9 code to a broad clinical category by numeric range.
//! Codes are stored without the decimal point, so `41401` is `414.01` and
//! classifies by its three-digit category `414`. Supplementary (`V`) and
//! external-cause (`E`) codes fall outside the disease ranges and classify
//! as [`ClinicalCategory::Other`].

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Broad clinical category of a diagnosis code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClinicalCategory {
    Circulatory,
    Respiratory,
    Digestive,
    Diabetes,
    Injury,
    Musculoskeletal,
    Genitourinary,
    Neoplasms,
    Other,
}

impl ClinicalCategory {
    /// Label used as the categorical value in feature tables
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Circulatory => "Circulatory",
            Self::Respiratory => "Respiratory",
            Self::Digestive => "Digestive",
            Self::Diabetes => "Diabetes",
            Self::Injury => "Injury",
            Self::Musculoskeletal => "Musculoskeletal",
            Self::Genitourinary => "Genitourinary",
            Self::Neoplasms => "Neoplasms",
            Self::Other => "Other",
        }
    }

    /// Category of an integer code
    ///
    /// Checked in priority order. 785-788 are symptom codes that belong to
    /// the organ system ranges above them.
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        if (390 <= code && code <= 459) || code == 785 {
            Self::Circulatory
        } else if (460 <= code && code <= 519) || code == 786 {
            Self::Respiratory
        } else if (520 <= code && code <= 579) || code == 787 {
            Self::Digestive
        } else if code == 250 {
            Self::Diabetes
        } else if 800 <= code && code <= 999 {
            Self::Injury
        } else if 710 <= code && code <= 739 {
            Self::Musculoskeletal
        } else if (580 <= code && code <= 629) || code == 788 {
            Self::Genitourinary
        } else if 140 <= code && code <= 239 {
            Self::Neoplasms
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for ClinicalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replace each `V` or `E` prefix run (the letter and the digits after it) with `0`
///
/// All `V` runs are replaced before any `E` run.
#[must_use]
pub fn strip_supplementary_prefix(raw_code: &str) -> String {
    replace_letter_runs(&replace_letter_runs(raw_code, 'V'), 'E')
}

fn replace_letter_runs(value: &str, letter: char) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c == letter {
            while chars.next_if(char::is_ascii_digit).is_some() {}
            out.push('0');
        } else {
            out.push(c);
        }
    }
    out
}

/// Classify a raw diagnosis code
///
/// Never fails: empty, non-numeric and out-of-range codes are `Other`.
#[must_use]
pub fn classify(raw_code: &str) -> ClinicalCategory {
    let cleaned = strip_supplementary_prefix(raw_code);
    let cleaned = cleaned.trim();
    // Subcategory digits follow the implied decimal point
    let category = if cleaned.len() > 3 && cleaned.bytes().all(|b| b.is_ascii_digit()) {
        &cleaned[..3]
    } else {
        cleaned
    };
    match category.parse::<i64>() {
        Ok(code) => ClinicalCategory::from_code(code),
        Err(_) => ClinicalCategory::Other,
    }
}

/// Classify a column of optional codes; a missing code is `Other`
#[must_use]
pub fn classify_all(codes: &[Option<String>]) -> Vec<ClinicalCategory> {
    codes
        .par_iter()
        .map(|code| code.as_deref().map_or(ClinicalCategory::Other, classify))
        .collect()
}
