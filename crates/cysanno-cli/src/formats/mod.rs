//! Input file containers
//!
//! Each supported input format reads into the same row model, takes
//! annotations through shared mutable access, and writes itself back out
//! with the annotation columns in a fixed order.

pub mod cimage;
pub mod tsv;

use crate::error::Result;
use cysanno_common::Organism;
use cysanno_core::conserve::CrossReference;
use std::collections::BTreeMap;
use std::path::Path;

/// Supported input file formats
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// cimage output with grouped residue-summary and peptide rows
    Cimage,
    /// Generic tab-separated file with id and sequence columns
    Tsv,
}

/// Annotation values attached to one peptide row
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    /// Residue position(s) in the parent protein, or a sentinel
    pub position: String,
    pub function: String,
    pub domains: String,
    pub protein_location: String,
    /// Per-organism conservation classification, empty until alignment ran
    pub conserved: BTreeMap<Organism, String>,
    /// Defined-organism cross-reference fields
    pub defined: CrossReference,
}

/// One peptide detail row of an input file
#[derive(Debug, Clone, Default)]
pub struct PeptideRow {
    /// Group index linking the row to its residue-summary row
    pub index: String,
    pub id: String,
    pub description: String,
    pub symbol: String,
    pub sequence: String,
    pub mass: String,
    /// Trailing pass-through columns (ratios, intensities)
    pub extras: Vec<String>,
    pub annotations: Annotations,
}

/// A parsed input file of either supported format
#[derive(Debug)]
pub enum InputFile {
    Cimage(cimage::CimageFile),
    Tsv(tsv::TsvFile),
}

impl InputFile {
    pub fn read(path: &Path, file_type: FileType, id_col: &str, seq_col: &str) -> Result<Self> {
        match file_type {
            FileType::Cimage => cimage::CimageFile::read(path).map(InputFile::Cimage),
            FileType::Tsv => tsv::TsvFile::read(path, id_col, seq_col).map(InputFile::Tsv),
        }
    }

    pub fn peptides(&self) -> &[PeptideRow] {
        match self {
            InputFile::Cimage(file) => file.peptides(),
            InputFile::Tsv(file) => file.peptides(),
        }
    }

    pub fn peptides_mut(&mut self) -> &mut [PeptideRow] {
        match self {
            InputFile::Cimage(file) => file.peptides_mut(),
            InputFile::Tsv(file) => file.peptides_mut(),
        }
    }

    /// Unique protein ids across the peptide rows, in first-seen order
    pub fn unique_ids(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.peptides()
            .iter()
            .filter(|row| seen.insert(row.id.as_str()))
            .map(|row| row.id.clone())
            .collect()
    }

    /// Write the annotated file. `defined_label` names the five
    /// defined-organism columns; values stay empty when no defined organism
    /// was requested.
    pub fn write(&self, path: &Path, organisms: &[Organism], defined_label: &str) -> Result<()> {
        match self {
            InputFile::Cimage(file) => file.write(path, organisms, defined_label),
            InputFile::Tsv(file) => file.write(path, organisms, defined_label),
        }
    }
}
