//! Alignment model and gapped position mapper
//!
//! Parses BLAST `-outfmt 5` XML into an in-memory [`Alignment`] holding the
//! best-scoring hit, and answers the two questions the conservation stage
//! asks about a 1-based query position: is the aligned residue identical,
//! and where does it sit in the hit's own sequence.
//!
//! Both aligned strands may contain `-` gap characters, so raw positions
//! must be remapped through a column index. The map is built lazily, once
//! per alignment.

use crate::error::{CoreError, Result};
use cysanno_common::Organism;
use serde::Deserialize;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;
use tracing::warn;

// ============================================================================
// BLAST XML wire structs (quick-xml serde)
// ============================================================================

#[derive(Debug, Deserialize)]
struct BlastOutputXml {
    #[serde(rename = "BlastOutput_iterations", default)]
    iterations: IterationsXml,
}

#[derive(Debug, Deserialize, Default)]
struct IterationsXml {
    #[serde(rename = "Iteration", default)]
    iterations: Vec<IterationXml>,
}

#[derive(Debug, Deserialize)]
struct IterationXml {
    #[serde(rename = "Iteration_hits", default)]
    hits: IterationHitsXml,
}

#[derive(Debug, Deserialize, Default)]
struct IterationHitsXml {
    #[serde(rename = "Hit", default)]
    hits: Vec<HitXml>,
}

#[derive(Debug, Deserialize)]
struct HitXml {
    #[serde(rename = "Hit_accession")]
    accession: String,
    #[serde(rename = "Hit_def", default)]
    description: String,
    #[serde(rename = "Hit_hsps", default)]
    hsps: HitHspsXml,
}

#[derive(Debug, Deserialize, Default)]
struct HitHspsXml {
    #[serde(rename = "Hsp", default)]
    hsps: Vec<HspXml>,
}

#[derive(Debug, Deserialize)]
struct HspXml {
    #[serde(rename = "Hsp_evalue")]
    evalue: f64,
    #[serde(rename = "Hsp_query-from")]
    query_from: usize,
    #[serde(rename = "Hsp_query-to")]
    query_to: usize,
    #[serde(rename = "Hsp_hit-from")]
    hit_from: usize,
    #[serde(rename = "Hsp_qseq")]
    qseq: String,
    #[serde(rename = "Hsp_hseq")]
    hseq: String,
}

// ============================================================================
// In-memory representation
// ============================================================================

/// Best-scoring hit of one alignment, with its top-ranked HSP
#[derive(Debug, Clone)]
struct BestHit {
    accession: String,
    description: String,
    evalue: f64,
    /// 1-based query coordinate of the first aligned column
    query_from: usize,
    /// 1-based query coordinate of the last aligned column
    query_to: usize,
    /// 1-based hit coordinate of the first aligned column
    hit_from: usize,
    /// Aligned query strand, gaps included
    qseq: String,
    /// Aligned hit strand, gaps included
    hseq: String,
}

/// Bidirectional index map over the gapped alignment columns
#[derive(Debug)]
struct PositionMap {
    /// Ungapped query offset (0-based from `query_from`) -> alignment column
    query_columns: Vec<usize>,
    /// Alignment column -> 1-based position in the hit's own sequence,
    /// `None` where the hit strand holds a gap
    hit_positions: Vec<Option<usize>>,
}

impl PositionMap {
    fn build(hit: &BestHit) -> Self {
        let mut query_columns = Vec::new();
        let mut hit_positions = Vec::with_capacity(hit.hseq.len());
        let mut hit_residues = 0usize;

        for (col, (q, h)) in hit.qseq.chars().zip(hit.hseq.chars()).enumerate() {
            if q.is_ascii_alphabetic() {
                query_columns.push(col);
            }
            if h.is_ascii_alphabetic() {
                hit_positions.push(Some(hit.hit_from + hit_residues));
                hit_residues += 1;
            } else {
                hit_positions.push(None);
            }
        }

        PositionMap {
            query_columns,
            hit_positions,
        }
    }
}

/// Parsed result of aligning one query sequence against one organism's
/// reference database
#[derive(Debug)]
pub struct Alignment {
    pub query_id: String,
    pub query_description: String,
    pub organism: Organism,
    best_hit: Option<BestHit>,
    raw_xml: Option<String>,
    position_map: OnceLock<PositionMap>,
}

impl Alignment {
    /// An alignment with no hits
    pub fn empty(
        query_id: impl Into<String>,
        query_description: impl Into<String>,
        organism: Organism,
    ) -> Self {
        Self {
            query_id: query_id.into(),
            query_description: query_description.into(),
            organism,
            best_hit: None,
            raw_xml: None,
            position_map: OnceLock::new(),
        }
    }

    /// Parse BLAST XML output. Empty output or a zero-hit result is a valid
    /// empty alignment; structurally broken XML is an error.
    pub fn from_xml(
        xml: &str,
        query_id: impl Into<String>,
        query_description: impl Into<String>,
        organism: Organism,
    ) -> Result<Self> {
        let query_id = query_id.into();
        let query_description = query_description.into();

        if xml.trim().is_empty() {
            return Ok(Self::empty(query_id, query_description, organism));
        }

        let output: BlastOutputXml = quick_xml::de::from_str(xml).map_err(|e| {
            CoreError::alignment_parse(&query_id, organism.as_str(), e.to_string())
        })?;

        let best_hit = output
            .iterations
            .iterations
            .into_iter()
            .flat_map(|iteration| iteration.hits.hits)
            .next()
            .and_then(|hit| {
                let HitXml {
                    accession,
                    description,
                    hsps,
                } = hit;
                let hsp = hsps.hsps.into_iter().next();
                if hsp.is_none() {
                    warn!(id = %query_id, organism = %organism, hit = %accession,
                          "Best hit carries no HSP, treating alignment as empty");
                }
                hsp.map(|hsp| BestHit {
                    accession,
                    description,
                    evalue: hsp.evalue,
                    query_from: hsp.query_from,
                    query_to: hsp.query_to,
                    hit_from: hsp.hit_from,
                    qseq: hsp.qseq,
                    hseq: hsp.hseq,
                })
            });

        let raw_xml = best_hit.as_ref().map(|_| xml.to_string());

        Ok(Self {
            query_id,
            query_description,
            organism,
            best_hit,
            raw_xml,
            position_map: OnceLock::new(),
        })
    }

    /// True if the engine reported no hits
    pub fn is_empty(&self) -> bool {
        self.best_hit.is_none()
    }

    /// Accession of the best hit, or `""` if none
    pub fn best_hit_id(&self) -> &str {
        self.best_hit
            .as_ref()
            .map(|hit| hit.accession.as_str())
            .unwrap_or("")
    }

    /// Description of the best hit, or `""` if none
    pub fn best_hit_description(&self) -> &str {
        self.best_hit
            .as_ref()
            .map(|hit| hit.description.as_str())
            .unwrap_or("")
    }

    /// E-value of the best hit
    pub fn best_hit_evalue(&self) -> Option<f64> {
        self.best_hit.as_ref().map(|hit| hit.evalue)
    }

    fn position_map(&self) -> Option<&PositionMap> {
        let hit = self.best_hit.as_ref()?;
        Some(self.position_map.get_or_init(|| PositionMap::build(hit)))
    }

    /// Alignment column holding the 1-based query position, if inside the
    /// aligned span
    fn column_of(&self, query_pos: usize) -> Option<usize> {
        let hit = self.best_hit.as_ref()?;
        if query_pos < hit.query_from || query_pos > hit.query_to {
            return None;
        }
        let map = self.position_map()?;
        map.query_columns.get(query_pos - hit.query_from).copied()
    }

    /// Whether the residue at the 1-based query position is conserved:
    /// the aligned hit residue must be the identical letter, not merely
    /// aligned. Positions outside the aligned span, and columns where the
    /// hit strand holds a gap, are never conserved.
    pub fn conserved_at(&self, query_pos: usize) -> bool {
        let Some(col) = self.column_of(query_pos) else {
            return false;
        };
        // span guarantee in column_of makes these lookups in-bounds
        let hit = match self.best_hit.as_ref() {
            Some(hit) => hit,
            None => return false,
        };
        let q = hit.qseq.as_bytes()[col];
        let h = hit.hseq.as_bytes()[col];
        h.is_ascii_alphabetic() && q.eq_ignore_ascii_case(&h)
    }

    /// 1-based position of the homologous residue in the hit's own
    /// sequence, or `None` if the query position is outside the aligned
    /// span or aligned against a gap
    pub fn homolog_position_at(&self, query_pos: usize) -> Option<usize> {
        let col = self.column_of(query_pos)?;
        self.position_map()?.hit_positions.get(col).copied().flatten()
    }

    /// Append (or truncate-write) the raw engine XML to a dump file.
    /// Empty alignments write nothing.
    pub fn write_xml(&self, path: &Path, append: bool) -> std::io::Result<()> {
        let Some(ref xml) = self.raw_xml else {
            return Ok(());
        };
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(append)
            .write(true)
            .truncate(!append)
            .open(path)?;
        file.write_all(xml.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }
}
