//! Pipeline runner
//!
//! Drives one annotation run end to end: parse input, fetch records,
//! annotate residues, optionally align for conservation and cross-reference
//! the defined organism, then write the annotated file.

use crate::error::{CliError, Result};
use crate::formats::InputFile;
use crate::Cli;
use cysanno_common::organism::parse_defined_organism;
use cysanno_common::types::{BAD_ID, NO_DATA};
use cysanno_common::Organism;
use cysanno_core::alignment::Alignment;
use cysanno_core::annotate::{annotate, protein_location, ResidueAnnotation};
use cysanno_core::blast::BlastEngine;
use cysanno_core::conserve::{align_all, conserved_field, cross_reference, QuerySequence};
use cysanno_core::fasta::write_fasta_entry;
use cysanno_core::fetch::UniprotClient;
use cysanno_core::locate::{locate, parse_position_field, tryptic_core, ResiduePosition};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// FASTA file written by `--write-seq`
const SEQ_PATH: &str = "sequences.fasta";

pub async fn run(cli: &Cli) -> Result<()> {
    let defined_organism = parse_defined_organism(&cli.defined_organism)?;
    if cli.align && cli.database_dir.is_none() {
        return Err(CliError::config(
            "--database-dir must be specified when --align is set",
        ));
    }
    let threads = if cli.serial { Some(1) } else { cli.threads };

    let mut input = InputFile::read(&cli.input_file, cli.file_type, &cli.id_col, &cli.seq_col)?;
    if input.peptides().is_empty() {
        return Err(CliError::input(format!(
            "No peptides found in '{}'",
            cli.input_file.display()
        )));
    }

    let ids = input.unique_ids();
    info!(
        peptides = input.peptides().len(),
        proteins = ids.len(),
        "Parsed input file"
    );

    println!("Retrieving protein records...");
    let client = UniprotClient::from_env()?;
    let records = client.fetch_all(&ids, threads, true).await?;

    // id -> (description, full sequence) for the fasta and alignment stages
    let mut sequences: HashMap<String, (String, String)> = HashMap::new();

    for peptide in input.peptides_mut() {
        let Some(record) = records.get(&peptide.id).and_then(Option::as_ref) else {
            warn!(id = %peptide.id, "No record for protein, marking row");
            peptide.annotations.position = BAD_ID.to_string();
            continue;
        };

        let fragment = tryptic_core(&peptide.sequence);
        let positions = locate(&record.sequence, fragment);
        if positions.contains(&ResiduePosition::NotFound) {
            warn!(id = %peptide.id, sequence = %peptide.sequence,
                  "Peptide not located in full sequence, marking row");
        }

        let per_residue: Vec<(ResiduePosition, ResidueAnnotation)> = positions
            .iter()
            .map(|&position| {
                let annotation = match position {
                    // annotator positions are 0-based
                    ResiduePosition::Found(pos) => annotate(record, pos - 1, cli.feature_mode),
                    ResiduePosition::NotFound => ResidueAnnotation::default(),
                };
                (position, annotation)
            })
            .collect();

        let annotations = &mut peptide.annotations;
        annotations.position = positions
            .iter()
            .map(ResiduePosition::field_value)
            .collect::<Vec<_>>()
            .join(&cli.residue_sep);
        annotations.function = join_residue_values(
            per_residue.iter().map(|(p, a)| (*p, a.function.as_str())),
            &cli.fxn_sep,
        );
        annotations.domains = join_residue_values(
            per_residue.iter().map(|(p, a)| (*p, a.domains.as_str())),
            &cli.fxn_sep,
        );
        annotations.protein_location = protein_location(record);

        sequences
            .entry(peptide.id.clone())
            .or_insert_with(|| (peptide.description.clone(), record.sequence.clone()));
    }

    if cli.write_seq {
        let mut append = false;
        for id in &ids {
            if let Some((description, sequence)) = sequences.get(id) {
                write_fasta_entry(Path::new(SEQ_PATH), id, description, sequence, append)?;
                append = true;
            }
        }
        info!(path = SEQ_PATH, "Wrote protein sequences");
    }

    if cli.align {
        let database_dir = cli.database_dir.as_deref().ok_or_else(|| {
            CliError::config("--database-dir must be specified when --align is set")
        })?;
        let engine = BlastEngine::new(database_dir, &cli.blast_exe);
        engine.validate(&Organism::ALL)?;

        println!("Aligning protein sequences to determine residue conservation...");
        let queries: Vec<QuerySequence> = ids
            .iter()
            .filter_map(|id| {
                sequences.get(id).map(|(description, sequence)| QuerySequence {
                    id: id.clone(),
                    description: description.clone(),
                    sequence: sequence.clone(),
                })
            })
            .collect();

        let alignments = align_all(&queries, &engine, &Organism::ALL, threads, true).await?;

        if cli.write_alignment_data {
            for &organism in &Organism::ALL {
                let path = format!("{}_alignments.txt", organism);
                // truncate up front; each unique protein's XML is appended once
                std::fs::write(&path, "")?;
                for id in &ids {
                    if let Some(alignment) = alignments.get(id, organism) {
                        alignment.write_xml(Path::new(&path), true)?;
                    }
                }
                info!(path, "Wrote alignment data");
            }
        }

        for peptide in input.peptides_mut() {
            let positions = parse_positions(&peptide.annotations.position, &cli.residue_sep);

            for &organism in &Organism::ALL {
                // a row with no modified residues carries no conservation signal
                let field = if positions.is_empty() {
                    NO_DATA.to_string()
                } else {
                    match alignments.get(&peptide.id, organism) {
                        Some(alignment) => conserved_field(
                            &positions,
                            alignment,
                            cli.evalue_cutoff,
                            &cli.residue_sep,
                        ),
                        None => conserved_field(
                            &positions,
                            &Alignment::empty(&peptide.id, &peptide.description, organism),
                            cli.evalue_cutoff,
                            &cli.residue_sep,
                        ),
                    }
                };
                peptide.annotations.conserved.insert(organism, field);
            }
        }

        if let Some(defined) = defined_organism {
            let hit_ids = alignments.best_hit_ids(defined);
            info!(organism = %defined, hits = hit_ids.len(), "Cross-referencing defined organism");
            let homolog_records = client.fetch_all(&hit_ids, threads, true).await?;

            for peptide in input.peptides_mut() {
                let Some(alignment) = alignments.get(&peptide.id, defined) else {
                    continue;
                };
                let positions = parse_positions(&peptide.annotations.position, &cli.residue_sep);
                peptide.annotations.defined = cross_reference(
                    alignment,
                    &positions,
                    &homolog_records,
                    cli.feature_mode,
                    &cli.residue_sep,
                    &cli.fxn_sep,
                );
            }
        }
    }

    input.write(&cli.ofname, &Organism::ALL, &cli.defined_organism)?;
    println!("Results written to {}", cli.ofname.display());
    Ok(())
}

/// Parse a written position field back into residue positions. A row with
/// no modified residues has an empty field and contributes no positions.
fn parse_positions(field: &str, sep: &str) -> Vec<ResiduePosition> {
    if field.is_empty() {
        return Vec::new();
    }
    field.split(sep).map(parse_position_field).collect()
}

/// Join per-residue annotation values: a lone residue contributes its bare
/// value, multiple residues contribute `position:value` pairs. All-empty
/// values collapse to the empty string.
fn join_residue_values<'a>(
    values: impl Iterator<Item = (ResiduePosition, &'a str)>,
    sep: &str,
) -> String {
    let values: Vec<(ResiduePosition, &str)> = values.collect();
    if values.iter().all(|(_, value)| value.is_empty()) {
        return String::new();
    }
    if let [(_, value)] = values.as_slice() {
        return (*value).to_string();
    }
    values
        .iter()
        .map(|(position, value)| {
            let pos = match position {
                ResiduePosition::Found(pos) => pos.to_string(),
                ResiduePosition::NotFound => String::new(),
            };
            format!("{}:{}", pos, value)
        })
        .collect::<Vec<_>>()
        .join(sep)
}
