//! Feature annotator
//!
//! Scans a record's feature table for entries overlapping a residue
//! position and formats them for the output `function` and `domain` fields.

use crate::record::ProteinRecord;
use cysanno_common::types::{FeatureMode, FUNCTION_ENTRY_SEP};

/// Feature types considered functional in simplified mode, provided their
/// span is at most [`SHORT_FEATURE_MAX_LEN`] residues
const FUNCTIONAL_FEATURES: &[&str] = &[
    "CA_BIND", "ZN_FING", "DNA_BIND", "NP_BIND", "ACT_SITE", "METAL", "BINDING", "SITE",
    "NON_STD", "MOD_RES", "LIPID", "CARBOHYD", "DISULFID", "CROSSLINK", "VARIANT", "MUTAGEN",
    "UNSURE", "CONFLICT", "REGION",
];

/// Span cutoff for non-disulfide features in simplified mode
const SHORT_FEATURE_MAX_LEN: usize = 10;

/// Functional and domain annotation strings for one residue position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidueAnnotation {
    pub function: String,
    pub domains: String,
}

impl ResidueAnnotation {
    pub fn is_empty(&self) -> bool {
        self.function.is_empty() && self.domains.is_empty()
    }
}

/// Collect the annotations at 0-based position `pos` in `record`.
///
/// Domain-type features always go to `domains`, regardless of mode. For
/// `function`, simplified mode keeps disulfide bonds and short features from
/// the controlled vocabulary; `All` keeps every overlapping feature. Matches
/// concatenate as `TYPE--qualifiers` with `" || "` between entries.
pub fn annotate(record: &ProteinRecord, pos: usize, mode: FeatureMode) -> ResidueAnnotation {
    let mut functions: Vec<String> = Vec::new();
    let mut domains: Vec<String> = Vec::new();

    for feature in &record.features {
        if !feature.contains(pos) {
            continue;
        }

        let entry = format!("{}--{}", feature.kind, feature.qualifiers);

        if feature.kind == "DOMAIN" {
            domains.push(entry);
            continue;
        }

        let keep = match mode {
            FeatureMode::All => true,
            FeatureMode::Simplified => {
                feature.kind == "DISULFID"
                    || (FUNCTIONAL_FEATURES.contains(&feature.kind.as_str())
                        && feature.len().is_some_and(|len| len <= SHORT_FEATURE_MAX_LEN))
            },
        };
        if keep {
            functions.push(entry);
        }
    }

    ResidueAnnotation {
        function: functions.join(FUNCTION_ENTRY_SEP),
        domains: domains.join(FUNCTION_ENTRY_SEP),
    }
}

/// Extract the subcellular-location annotation string for a record.
///
/// Isoform-specific comments contribute only the location text after the
/// isoform label.
pub fn protein_location(record: &ProteinRecord) -> String {
    let mut location = String::new();
    for body in &record.subcellular_locations {
        let text = if body.starts_with("Isoform") {
            body.split_once(':').map(|(_, rest)| rest).unwrap_or(body)
        } else {
            body.as_str()
        };
        if !location.is_empty() {
            location.push(' ');
        }
        location.push_str(text.trim());
    }
    location
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Feature, FeaturePos};

    fn feature(kind: &str, start: usize, end: usize, qualifiers: &str) -> Feature {
        Feature {
            kind: kind.to_string(),
            start: FeaturePos::Exact(start),
            end: FeaturePos::Exact(end),
            qualifiers: qualifiers.to_string(),
        }
    }

    fn record_with(features: Vec<Feature>) -> ProteinRecord {
        ProteinRecord {
            accession: "P00001".to_string(),
            organism: "Homo sapiens (Human)".to_string(),
            sequence: "MPPYTVVYFPVRGRCAALRMLLADQGQSWKEE".to_string(),
            subcellular_locations: vec![],
            features,
        }
    }

    #[test]
    fn test_simplified_keeps_disulfide_regardless_of_length() {
        let record = record_with(vec![feature("DISULFID", 4, 30, "/note=\"Interchain\"")]);
        let annotation = annotate(&record, 10, FeatureMode::Simplified);
        assert_eq!(annotation.function, "DISULFID--/note=\"Interchain\"");
    }

    #[test]
    fn test_simplified_drops_long_controlled_features() {
        let record = record_with(vec![feature("REGION", 0, 30, "/note=\"Long\"")]);
        let annotation = annotate(&record, 10, FeatureMode::Simplified);
        assert!(annotation.function.is_empty());

        // same feature matches in All mode
        let annotation = annotate(&record, 10, FeatureMode::All);
        assert_eq!(annotation.function, "REGION--/note=\"Long\"");
    }

    #[test]
    fn test_simplified_keeps_short_controlled_features() {
        let record = record_with(vec![feature("BINDING", 8, 12, "/ligand=\"Zn(2+)\"")]);
        let annotation = annotate(&record, 10, FeatureMode::Simplified);
        assert_eq!(annotation.function, "BINDING--/ligand=\"Zn(2+)\"");
    }

    #[test]
    fn test_uncontrolled_type_excluded_in_simplified() {
        let record = record_with(vec![feature("HELIX", 8, 12, "")]);
        assert!(annotate(&record, 10, FeatureMode::Simplified).function.is_empty());
        assert_eq!(annotate(&record, 10, FeatureMode::All).function, "HELIX--");
    }

    #[test]
    fn test_domains_collected_separately_in_both_modes() {
        let record = record_with(vec![feature("DOMAIN", 0, 30, "/note=\"GST N\"")]);
        for mode in [FeatureMode::Simplified, FeatureMode::All] {
            let annotation = annotate(&record, 10, mode);
            assert!(annotation.function.is_empty());
            assert_eq!(annotation.domains, "DOMAIN--/note=\"GST N\"");
        }
    }

    #[test]
    fn test_multiple_matches_concatenate() {
        let record = record_with(vec![
            feature("DISULFID", 4, 12, ""),
            feature("ACT_SITE", 10, 11, "/note=\"Nucleophile\""),
        ]);
        let annotation = annotate(&record, 10, FeatureMode::Simplified);
        assert_eq!(
            annotation.function,
            "DISULFID-- || ACT_SITE--/note=\"Nucleophile\""
        );
    }

    #[test]
    fn test_unknown_boundary_never_matches() {
        let record = record_with(vec![Feature {
            kind: "DISULFID".to_string(),
            start: FeaturePos::Unknown,
            end: FeaturePos::Exact(30),
            qualifiers: String::new(),
        }]);
        assert!(annotate(&record, 10, FeatureMode::All).is_empty());
    }

    #[test]
    fn test_protein_location_isoform_handling() {
        let mut record = record_with(vec![]);
        record.subcellular_locations = vec![
            "Cytoplasm. Nucleus.".to_string(),
            "Isoform 2: Mitochondrion.".to_string(),
        ];
        assert_eq!(protein_location(&record), "Cytoplasm. Nucleus. Mitochondrion.");
    }
}
