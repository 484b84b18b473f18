//! FASTA writing and reading
//!
//! The annotation pipeline optionally dumps every fetched sequence to a
//! FASTA file, and can read such a file back to resolve accessions without
//! hitting the network.

use crate::error::Result;
use cysanno_common::CommonError;
use regex::Regex;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

/// Append (or truncate-write) one `sp`-style entry to a FASTA file
pub fn write_fasta_entry(
    path: &Path,
    accession: &str,
    description: &str,
    sequence: &str,
    append: bool,
) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(append)
        .write(true)
        .truncate(!append)
        .open(path)?;
    writeln!(file, ">sp|{}|{}", accession, description)?;
    writeln!(file, "{}", sequence)?;
    Ok(())
}

fn entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // >sp|ACCESSION|description\n sequence lines until the next '>'
        Regex::new(r">[st][rp]\|(\w+)\|[^\n]*\n([A-Za-z\s]*)").expect("Invalid FASTA entry regex")
    })
}

/// In-memory FASTA file indexed by accession
#[derive(Debug, Default)]
pub struct FastaFile {
    sequences: HashMap<String, String>,
}

impl FastaFile {
    /// Read and index a FASTA file
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    fn parse(text: &str) -> Self {
        let mut sequences = HashMap::new();
        for capture in entry_re().captures_iter(text) {
            let accession = capture[1].to_string();
            let sequence: String = capture[2].chars().filter(|c| !c.is_whitespace()).collect();
            sequences.insert(accession, sequence);
        }
        Self { sequences }
    }

    pub fn id_exists(&self, accession: &str) -> bool {
        self.sequences.contains_key(accession)
    }

    /// Sequence for an accession, with whitespace stripped
    pub fn get_sequence(&self, accession: &str) -> Result<&str> {
        self.sequences
            .get(accession)
            .map(String::as_str)
            .ok_or_else(|| {
                CommonError::parse(format!("Accession '{}' not found in FASTA file", accession))
                    .into()
            })
    }

    pub fn iter_ids(&self) -> impl Iterator<Item = &str> {
        self.sequences.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sequences.fasta");

        write_fasta_entry(&path, "P26641", "Elongation factor 1-gamma", "MAAGTLYTYP", false)
            .unwrap();
        write_fasta_entry(&path, "P09211", "Glutathione S-transferase P", "MPPYTVVYFP", true)
            .unwrap();

        let fasta = FastaFile::read(&path).unwrap();
        assert_eq!(fasta.len(), 2);
        assert!(fasta.id_exists("P26641"));
        assert_eq!(fasta.get_sequence("P09211").unwrap(), "MPPYTVVYFP");
    }

    #[test]
    fn test_truncate_replaces_existing_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sequences.fasta");

        write_fasta_entry(&path, "P26641", "first", "MAAGTLYTYP", false).unwrap();
        write_fasta_entry(&path, "P09211", "second", "MPPYTVVYFP", false).unwrap();

        let fasta = FastaFile::read(&path).unwrap();
        assert_eq!(fasta.len(), 1);
        assert!(!fasta.id_exists("P26641"));
    }

    #[test]
    fn test_parse_multiline_sequences_and_tr_entries() {
        let text = ">sp|P26641|Elongation factor\nMAAGTLYTYP\nQTFMSCNLIT\n>tr|A0A024R1R8|uncharacterized\nMPPYTVVYFP\n";
        let fasta = FastaFile::parse(text);
        assert_eq!(fasta.get_sequence("P26641").unwrap(), "MAAGTLYTYPQTFMSCNLIT");
        assert_eq!(fasta.get_sequence("A0A024R1R8").unwrap(), "MPPYTVVYFP");
    }

    #[test]
    fn test_missing_accession_is_an_error() {
        let fasta = FastaFile::parse("");
        assert!(fasta.is_empty());
        assert!(fasta.get_sequence("P26641").is_err());
    }
}
