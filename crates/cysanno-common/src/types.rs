//! Shared field vocabulary
//!
//! Sentinel strings written into annotation fields. These are part of the
//! output format: downstream consumers match on them verbatim, so they live
//! here rather than in the crates that produce them.

use crate::error::CommonError;
use serde::{Deserialize, Serialize};

/// Position sentinel for a protein identifier with no resolvable record
pub const BAD_ID: &str = "BAD_ID";

/// Position sentinel for a peptide fragment absent from the full sequence
pub const RESIDUE_NOT_FOUND: &str = "RESIDUE_NOT_FOUND";

/// Conservation marker when no alignment data is available for an organism
pub const NO_DATA: &str = "--";

/// Conservation marker when the residue position itself could not be derived
pub const CONSERVED_ERROR: &str = "Error";

/// Conservation marker for an identical aligned residue
pub const CONSERVED_YES: &str = "Yes";

/// Conservation marker for a non-identical (or gapped) aligned residue
pub const CONSERVED_NO: &str = "No";

/// Separator between concatenated feature annotations within one field
pub const FUNCTION_ENTRY_SEP: &str = " || ";

/// Feature inclusion policy for the annotator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeatureMode {
    /// Disulfide bonds plus short (<= 10 residue) features from the
    /// controlled vocabulary
    #[default]
    Simplified,
    /// Every feature whose span contains the position
    All,
}

impl std::str::FromStr for FeatureMode {
    type Err = CommonError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simplified" => Ok(FeatureMode::Simplified),
            "all" => Ok(FeatureMode::All),
            _ => Err(CommonError::parse(format!("Invalid feature mode: {}", s))),
        }
    }
}

impl std::fmt::Display for FeatureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureMode::Simplified => write!(f, "simplified"),
            FeatureMode::All => write!(f, "all"),
        }
    }
}
