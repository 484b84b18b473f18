//! Residue locator
//!
//! Maps modification markers inside a peptide fragment to absolute 1-based
//! residue positions in the parent protein sequence. A `*` immediately
//! follows each modified residue, e.g. `FPEELTQTFMSC*NLITGMFQR`.

use cysanno_common::types::{BAD_ID, RESIDUE_NOT_FOUND};

/// Marker character denoting a modified residue in a peptide fragment
pub const MOD_MARKER: char = '*';

/// Resolved position of one modified residue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResiduePosition {
    /// 1-based position within the full protein sequence
    Found(usize),
    /// The de-marked fragment does not occur in the full sequence
    NotFound,
}

impl ResiduePosition {
    /// Render for the output position field
    pub fn field_value(&self) -> String {
        match self {
            ResiduePosition::Found(pos) => pos.to_string(),
            ResiduePosition::NotFound => RESIDUE_NOT_FOUND.to_string(),
        }
    }
}

/// Parse a position field value back into a [`ResiduePosition`], used when
/// classifying conservation for already-annotated rows. The `BAD_ID`
/// sentinel also maps to `NotFound`.
pub fn parse_position_field(value: &str) -> ResiduePosition {
    if value == RESIDUE_NOT_FOUND || value == BAD_ID {
        return ResiduePosition::NotFound;
    }
    match value.parse::<usize>() {
        Ok(pos) => ResiduePosition::Found(pos),
        Err(_) => ResiduePosition::NotFound,
    }
}

/// Remove modification markers from a fragment
pub fn strip_markers(fragment: &str) -> String {
    fragment.chars().filter(|&c| c != MOD_MARKER).collect()
}

/// Extract the core of a tryptic peptide string, dropping the flanking
/// residues around the boundary dots: `K.ABC*DE.R` -> `ABC*DE`. Fragments
/// without flanks pass through unchanged.
pub fn tryptic_core(sequence: &str) -> &str {
    let mut parts = sequence.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(core), Some(_)) => core,
        _ => sequence,
    }
}

/// Locate every marked residue of `fragment` within `full_sequence`.
///
/// The de-marked fragment is matched at its first occurrence; each marker at
/// fragment byte offset `k` with `i` markers before it denotes the residue
/// at bare-fragment offset `k - i - 1`. Positions are returned 1-based, in
/// left-to-right marker order. If the fragment is absent every marker maps
/// to [`ResiduePosition::NotFound`].
pub fn locate(full_sequence: &str, fragment: &str) -> Vec<ResiduePosition> {
    let bare = strip_markers(fragment);
    let start = full_sequence.find(&bare);

    fragment
        .char_indices()
        .filter(|&(_, c)| c == MOD_MARKER)
        .enumerate()
        .map(|(i, (k, _))| match start {
            Some(start) => ResiduePosition::Found(start + k.saturating_sub(i + 1) + 1),
            None => ResiduePosition::NotFound,
        })
        .collect()
}
