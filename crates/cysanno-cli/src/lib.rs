//! Cysteine Annotation CLI Library
//!
//! Command-line interface for annotating functional cysteine residues in
//! mass-spectrometry search results.
//!
//! # Overview
//!
//! `cysanno` reads a cimage output file (or a generic tsv), fetches the
//! UniProtKB record for every protein, locates each `*`-marked residue in
//! the full sequence, attaches functional annotations, and optionally
//! aligns every protein against per-organism reference databases to score
//! residue conservation. Results are written back as an annotated
//! tab-separated file.

pub mod error;
pub mod formats;
pub mod run;

// Re-export commonly used types
pub use error::{CliError, Result};
pub use formats::FileType;

use clap::Parser;
use cysanno_common::types::FeatureMode;
use std::path::PathBuf;

/// cysanno - Annotate functional cysteine residues in cimage output
#[derive(Parser, Debug)]
#[command(name = "cysanno")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to input file
    pub input_file: PathBuf,

    /// Input file format
    #[arg(short = 'f', long, value_enum, default_value_t = FileType::Cimage)]
    pub file_type: FileType,

    /// Protein id column name, for tsv input
    #[arg(long, default_value = "protein_ID")]
    pub id_col: String,

    /// Peptide sequence column name, for tsv input
    #[arg(long, default_value = "sequence")]
    pub seq_col: String,

    /// Name of file to write results to
    #[arg(long, default_value = "Cysteine_annotation.tsv")]
    pub ofname: PathBuf,

    /// Write fetched protein sequences to sequences.fasta
    #[arg(short = 's', long)]
    pub write_seq: bool,

    /// Align protein sequences to determine residue conservation.
    /// Requires --database-dir.
    #[arg(short = 'a', long)]
    pub align: bool,

    /// Write raw alignment data to per-organism <organism>_alignments.txt files
    #[arg(short = 'w', long)]
    pub write_alignment_data: bool,

    /// Directory containing the per-organism sequence databases for alignment
    #[arg(short = 'd', long)]
    pub database_dir: Option<PathBuf>,

    /// Organism whose best alignment hit is cross-referenced in full,
    /// or 'none'
    #[arg(short = 'o', long, default_value = "none")]
    pub defined_organism: String,

    /// Largest e-value still considered a usable conservation signal
    #[arg(long, default_value_t = cysanno_core::conserve::DEFAULT_EVALUE_CUTOFF)]
    pub evalue_cutoff: f64,

    /// Separator between values for peptides with multiple modified residues
    #[arg(long, default_value = "|")]
    pub residue_sep: String,

    /// Separator between position:function pairs for peptides with multiple
    /// modified residues
    #[arg(long, default_value = "!")]
    pub fxn_sep: String,

    /// Which feature types count as functional annotations
    #[arg(long, default_value = "simplified")]
    pub feature_mode: FeatureMode,

    /// Worker count for record fetching and alignment
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Disable parallel processing
    #[arg(long, conflicts_with = "threads")]
    pub serial: bool,

    /// Alignment engine executable
    #[arg(long, default_value = cysanno_core::blast::DEFAULT_BLAST_EXE)]
    pub blast_exe: String,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}
