//! Feature engineering: diagnosis classification, categorical collapsing,
//! derived columns and numeric encoding.

pub mod binning;
pub mod builder;
pub mod codes;
pub mod collapse;
pub mod encoder;

pub use binning::BinSpec;
pub use builder::{BuiltFeatures, FeatureBuilder};
pub use codes::{ClinicalCategory, classify};
pub use collapse::{CollapseRule, collapse};
pub use encoder::Encoder;
