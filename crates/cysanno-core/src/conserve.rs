//! Conservation orchestrator
//!
//! Fans alignment tasks out across the reference organisms, classifies each
//! modified residue as conserved or not, and assembles the cross-species
//! annotation fields for the defined organism.

use crate::alignment::Alignment;
use crate::annotate::annotate;
use crate::blast::BlastEngine;
use crate::error::{CoreError, Result};
use crate::fetch::worker_count;
use crate::locate::ResiduePosition;
use crate::record::ProteinRecord;
use cysanno_common::types::{
    FeatureMode, CONSERVED_ERROR, CONSERVED_NO, CONSERVED_YES, NO_DATA,
};
use cysanno_common::Organism;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

/// Default significance cutoff: hits with a larger e-value carry no
/// conservation signal
pub const DEFAULT_EVALUE_CUTOFF: f64 = 1e-5;

/// One query sequence to align, deduplicated by protein id
#[derive(Debug, Clone)]
pub struct QuerySequence {
    pub id: String,
    pub description: String,
    pub sequence: String,
}

/// One alignment per (protein id, organism) pair
#[derive(Debug, Default)]
pub struct AlignmentSet {
    alignments: HashMap<String, HashMap<Organism, Alignment>>,
}

impl AlignmentSet {
    pub fn get(&self, id: &str, organism: Organism) -> Option<&Alignment> {
        self.alignments.get(id)?.get(&organism)
    }

    pub fn len(&self) -> usize {
        self.alignments.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.alignments.is_empty()
    }

    /// Unique best-hit accessions for one organism across all proteins,
    /// in stable order. Input for the second record-fetch round.
    pub fn best_hit_ids(&self, organism: Organism) -> Vec<String> {
        let ids: BTreeSet<String> = self
            .alignments
            .values()
            .filter_map(|per_organism| per_organism.get(&organism))
            .map(|alignment| alignment.best_hit_id())
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect();
        ids.into_iter().collect()
    }
}

/// Align every query against every organism's reference database on a
/// bounded worker pool.
///
/// Queries are deduplicated by protein id, so each protein is aligned once
/// per organism no matter how many peptide rows reference it. A failed or
/// unparseable engine run degrades to an empty alignment for that task
/// only; a missing result is a fatal consistency failure.
pub async fn align_all(
    queries: &[QuerySequence],
    engine: &BlastEngine,
    organisms: &[Organism],
    threads: Option<usize>,
    show_progress: bool,
) -> Result<AlignmentSet> {
    let mut unique: HashMap<&str, &QuerySequence> = HashMap::new();
    for query in queries {
        unique.entry(query.id.as_str()).or_insert(query);
    }

    let tasks: Vec<(&QuerySequence, Organism)> = unique
        .values()
        .flat_map(|&query| organisms.iter().map(move |&organism| (query, organism)))
        .collect();

    if tasks.is_empty() {
        return Ok(AlignmentSet::default());
    }

    let workers = worker_count(threads, tasks.len());
    info!(tasks = tasks.len(), workers, "Aligning protein sequences");

    let bar = if show_progress {
        align_progress_bar(tasks.len() as u64)
    } else {
        ProgressBar::hidden()
    };

    let results: Vec<Alignment> = futures::stream::iter(&tasks)
        .map(|&(query, organism)| {
            let bar = &bar;
            async move {
                let alignment = run_task(engine, query, organism).await;
                bar.inc(1);
                alignment
            }
        })
        .buffer_unordered(workers)
        .collect()
        .await;

    bar.finish_and_clear();

    if results.len() != tasks.len() {
        return Err(CoreError::Consistency {
            expected: tasks.len(),
            actual: results.len(),
        });
    }

    let mut set = AlignmentSet::default();
    for alignment in results {
        set.alignments
            .entry(alignment.query_id.clone())
            .or_default()
            .insert(alignment.organism, alignment);
    }
    Ok(set)
}

/// Run one (protein, organism) alignment, absorbing per-task failures into
/// an empty alignment so other tasks proceed unaffected
async fn run_task(engine: &BlastEngine, query: &QuerySequence, organism: Organism) -> Alignment {
    let xml = match engine.blastp(&query.sequence, organism).await {
        Ok(xml) => xml,
        Err(e) => {
            warn!(id = %query.id, organism = %organism, error = %e,
                  "Alignment failed, recording empty result");
            return Alignment::empty(&query.id, &query.description, organism);
        },
    };

    match Alignment::from_xml(&xml, &query.id, &query.description, organism) {
        Ok(alignment) => alignment,
        Err(e) => {
            warn!(id = %query.id, organism = %organism, error = %e,
                  "Alignment output unparseable, recording empty result");
            Alignment::empty(&query.id, &query.description, organism)
        },
    }
}

/// Classify conservation of one residue against one organism's alignment
pub fn classify_residue(
    position: ResiduePosition,
    alignment: &Alignment,
    evalue_cutoff: f64,
) -> &'static str {
    let pos = match position {
        ResiduePosition::Found(pos) => pos,
        ResiduePosition::NotFound => return CONSERVED_ERROR,
    };

    match alignment.best_hit_evalue() {
        None => NO_DATA,
        Some(evalue) if evalue > evalue_cutoff => NO_DATA,
        Some(_) => {
            if alignment.conserved_at(pos) {
                CONSERVED_YES
            } else {
                CONSERVED_NO
            }
        },
    }
}

/// Per-peptide conserved field: one classification per residue, joined
/// with the residue separator in left-to-right residue order
pub fn conserved_field(
    positions: &[ResiduePosition],
    alignment: &Alignment,
    evalue_cutoff: f64,
    residue_sep: &str,
) -> String {
    positions
        .iter()
        .map(|&position| classify_residue(position, alignment, evalue_cutoff))
        .collect::<Vec<_>>()
        .join(residue_sep)
}

/// The five defined-organism cross-reference fields for one peptide row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossReference {
    pub id: String,
    pub evalue: String,
    pub description: String,
    pub position: String,
    pub function: String,
}

/// Assemble the cross-reference fields from the defined organism's
/// alignment and the second-round record cache.
///
/// Empty alignment: every field stays the empty string. Residues aligned
/// against a gap contribute empty position/function entries.
pub fn cross_reference(
    alignment: &Alignment,
    positions: &[ResiduePosition],
    homolog_records: &HashMap<String, Option<ProteinRecord>>,
    feature_mode: FeatureMode,
    residue_sep: &str,
    fxn_sep: &str,
) -> CrossReference {
    if alignment.is_empty() {
        return CrossReference::default();
    }

    let record = homolog_records
        .get(alignment.best_hit_id())
        .and_then(|record| record.as_ref());

    let homolog_positions: Vec<Option<usize>> = positions
        .iter()
        .map(|&position| match position {
            ResiduePosition::Found(pos) => alignment.homolog_position_at(pos),
            ResiduePosition::NotFound => None,
        })
        .collect();

    let position_field = homolog_positions
        .iter()
        .map(|pos| pos.map(|p| p.to_string()).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(residue_sep);

    let functions: Vec<String> = homolog_positions
        .iter()
        .map(|pos| match (pos, record) {
            // homolog positions are 1-based; the annotator takes 0-based
            (Some(pos), Some(record)) => annotate(record, pos - 1, feature_mode).function,
            _ => String::new(),
        })
        .collect();

    let function_field = if functions.iter().all(String::is_empty) {
        String::new()
    } else if functions.len() == 1 {
        functions.into_iter().next().unwrap_or_default()
    } else {
        homolog_positions
            .iter()
            .zip(&functions)
            .map(|(pos, function)| {
                format!(
                    "{}:{}",
                    pos.map(|p| p.to_string()).unwrap_or_default(),
                    function
                )
            })
            .collect::<Vec<_>>()
            .join(fxn_sep)
    };

    CrossReference {
        id: alignment.best_hit_id().to_string(),
        evalue: alignment
            .best_hit_evalue()
            .map(format_evalue)
            .unwrap_or_default(),
        description: alignment.best_hit_description().to_string(),
        position: position_field,
        function: function_field,
    }
}

/// Render an e-value for the output evalue field
pub fn format_evalue(evalue: f64) -> String {
    format!("{:e}", evalue)
}

fn align_progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    bar.set_message("Aligning protein sequences");
    bar
}
