//! Reference organisms for conservation analysis
//!
//! The organism set is closed: conservation fields are produced for exactly
//! these organisms, and each maps to a fixed BLAST database stem inside the
//! database directory.

use crate::error::CommonError;
use serde::{Deserialize, Serialize};

/// A reference organism against which residue conservation is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Organism {
    Human,
    Mouse,
    Fly,
    Yeast,
    Mustard,
    Worms,
}

impl Organism {
    /// All reference organisms, in output-column order
    pub const ALL: [Organism; 6] = [
        Organism::Human,
        Organism::Mouse,
        Organism::Fly,
        Organism::Yeast,
        Organism::Mustard,
        Organism::Worms,
    ];

    /// Lowercase name used in CLI flags and output column headers
    pub fn as_str(self) -> &'static str {
        match self {
            Organism::Human => "human",
            Organism::Mouse => "mouse",
            Organism::Fly => "fly",
            Organism::Yeast => "yeast",
            Organism::Mustard => "mustard",
            Organism::Worms => "worms",
        }
    }

    /// File stem of the organism's BLAST reference database
    pub fn database_stem(self) -> &'static str {
        match self {
            Organism::Human => "human_nr_uniprot",
            Organism::Mouse => "mouse_nr_uniprot",
            Organism::Fly => "fly_nr_uniprot",
            Organism::Yeast => "yeast_nr_uniprot",
            Organism::Mustard => "mustard_nr_uniprot",
            Organism::Worms => "worms_nr_uniprot",
        }
    }
}

impl std::str::FromStr for Organism {
    type Err = CommonError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Organism::Human),
            "mouse" => Ok(Organism::Mouse),
            "fly" => Ok(Organism::Fly),
            "yeast" => Ok(Organism::Yeast),
            "mustard" => Ok(Organism::Mustard),
            "worms" => Ok(Organism::Worms),
            _ => Err(CommonError::parse(format!("Unknown organism: {}", s))),
        }
    }
}

impl std::fmt::Display for Organism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse a `--defined-organism` value, where `none` disables the
/// cross-species annotation stage.
pub fn parse_defined_organism(s: &str) -> std::result::Result<Option<Organism>, CommonError> {
    if s.eq_ignore_ascii_case("none") {
        Ok(None)
    } else {
        s.parse().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organism_round_trip() {
        for organism in Organism::ALL {
            assert_eq!(organism.as_str().parse::<Organism>().unwrap(), organism);
        }
        assert!("dog".parse::<Organism>().is_err());
    }

    #[test]
    fn test_organism_case_insensitive() {
        assert_eq!("Human".parse::<Organism>().unwrap(), Organism::Human);
        assert_eq!("YEAST".parse::<Organism>().unwrap(), Organism::Yeast);
    }

    #[test]
    fn test_database_stems() {
        assert_eq!(Organism::Human.database_stem(), "human_nr_uniprot");
        assert_eq!(Organism::Worms.database_stem(), "worms_nr_uniprot");
    }

    #[test]
    fn test_parse_defined_organism() {
        assert_eq!(parse_defined_organism("none").unwrap(), None);
        assert_eq!(parse_defined_organism("None").unwrap(), None);
        assert_eq!(
            parse_defined_organism("mouse").unwrap(),
            Some(Organism::Mouse)
        );
        assert!(parse_defined_organism("dog").is_err());
    }
}
