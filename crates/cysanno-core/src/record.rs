//! Protein record model and UniProtKB flat-text parser
//!
//! A [`ProteinRecord`] is immutable once parsed and lives in a per-run
//! cache keyed by accession.
//!
//! The parser reads the UniProtKB "txt" (Swiss-Prot flat) format: two-letter
//! line codes, `FT` feature table, `SQ` sequence block terminated by `//`.
//! Feature spans are normalized here, once, to a half-open 0-based
//! `[start, end)` range so every downstream comparison is `start <= p < end`.

use crate::error::{CoreError, Result};

/// Position of a feature boundary within the protein sequence
///
/// UniProt marks uncertain boundaries with `?`, `<` or `>`; those never
/// match any residue position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeaturePos {
    Exact(usize),
    Unknown,
}

/// One entry of a record's feature table
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Type tag from the flat file, e.g. `DISULFID`, `BINDING`, `DOMAIN`
    pub kind: String,
    /// 0-based inclusive start of the span
    pub start: FeaturePos,
    /// 0-based exclusive end of the span
    pub end: FeaturePos,
    /// Qualifier lines (`/note=...`, `/evidence=...`) joined with `"; "`
    pub qualifiers: String,
}

impl Feature {
    /// The `[start, end)` span, or `None` if either boundary is unknown
    pub fn span(&self) -> Option<(usize, usize)> {
        match (self.start, self.end) {
            (FeaturePos::Exact(s), FeaturePos::Exact(e)) => Some((s, e)),
            _ => None,
        }
    }

    /// Whether the 0-based position falls inside the span.
    /// A feature with an unknown boundary never matches.
    pub fn contains(&self, pos: usize) -> bool {
        match self.span() {
            Some((start, end)) => start <= pos && pos < end,
            None => false,
        }
    }

    /// Span length in residues, or `None` if a boundary is unknown
    pub fn len(&self) -> Option<usize> {
        self.span().map(|(start, end)| end - start)
    }
}

/// A protein record fetched from the remote knowledge database
#[derive(Debug, Clone, PartialEq)]
pub struct ProteinRecord {
    /// Primary accession
    pub accession: String,
    /// Organism name from the `OS` lines
    pub organism: String,
    /// Full amino-acid sequence
    pub sequence: String,
    /// Bodies of `SUBCELLULAR LOCATION` comments, topic prefix stripped
    pub subcellular_locations: Vec<String>,
    /// Feature table, in file order
    pub features: Vec<Feature>,
}

impl ProteinRecord {
    /// Parse a UniProtKB flat-text record
    pub fn parse(text: &str) -> Result<Self> {
        let mut accession = None;
        let mut organism_lines: Vec<&str> = Vec::new();
        let mut comments: Vec<String> = Vec::new();
        let mut features: Vec<Feature> = Vec::new();
        let mut sequence = String::new();
        let mut in_sequence = false;

        for line in text.lines() {
            if in_sequence {
                if line.starts_with("//") {
                    in_sequence = false;
                    continue;
                }
                sequence.extend(line.chars().filter(|c| !c.is_whitespace()));
                continue;
            }

            let (code, body) = match line.split_at_checked(5) {
                Some((code, body)) => (code.trim_end(), body),
                None => (line.trim_end(), ""),
            };

            match code {
                "AC" => {
                    if accession.is_none() {
                        accession = body
                            .split(';')
                            .next()
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty());
                    }
                },
                "OS" => organism_lines.push(body.trim()),
                "CC" => {
                    let body = body.trim_start();
                    if let Some(rest) = body.strip_prefix("-!- ") {
                        comments.push(rest.to_string());
                    } else if let Some(last) = comments.last_mut() {
                        last.push(' ');
                        last.push_str(body);
                    }
                },
                "FT" => {
                    let body = body.trim_end();
                    if body.starts_with(char::is_whitespace) {
                        // continuation: qualifier or wrapped qualifier value
                        let cont = body.trim_start();
                        if let Some(feature) = features.last_mut() {
                            if cont.starts_with('/') && !feature.qualifiers.is_empty() {
                                feature.qualifiers.push_str("; ");
                            } else if !cont.starts_with('/') && !feature.qualifiers.is_empty() {
                                feature.qualifiers.push(' ');
                            }
                            feature.qualifiers.push_str(cont);
                        }
                    } else {
                        let mut parts = body.split_whitespace();
                        let kind = parts.next().unwrap_or_default().to_string();
                        let location = parts.next().unwrap_or_default();
                        if !kind.is_empty() && !location.is_empty() {
                            let (start, end) = parse_feature_location(location);
                            features.push(Feature {
                                kind,
                                start,
                                end,
                                qualifiers: String::new(),
                            });
                        }
                    }
                },
                "SQ" => in_sequence = true,
                _ => {},
            }
        }

        let accession = accession
            .ok_or_else(|| CoreError::RecordParse("missing AC line".to_string()))?;
        if sequence.is_empty() {
            return Err(CoreError::RecordParse(format!(
                "record {} has no sequence block",
                accession
            )));
        }

        let organism = organism_lines
            .join(" ")
            .trim_end_matches('.')
            .trim()
            .to_string();

        let subcellular_locations = comments
            .iter()
            .filter_map(|c| c.strip_prefix("SUBCELLULAR LOCATION:"))
            .map(|body| body.trim().to_string())
            .collect();

        Ok(ProteinRecord {
            accession,
            organism,
            sequence,
            subcellular_locations,
            features,
        })
    }
}

/// Parse an FT location token (`26..84`, `145`, `<1..84`, `?26`) into the
/// normalized half-open 0-based span
fn parse_feature_location(location: &str) -> (FeaturePos, FeaturePos) {
    let (from_tok, to_tok) = match location.split_once("..") {
        Some((from, to)) => (from, to),
        None => (location, location),
    };

    let from = parse_boundary(from_tok);
    let to = parse_boundary(to_tok);

    // 1-based inclusive [from, to] becomes 0-based half-open [from-1, to)
    let start = match from {
        FeaturePos::Exact(n) if n > 0 => FeaturePos::Exact(n - 1),
        _ => FeaturePos::Unknown,
    };
    (start, to)
}

fn parse_boundary(token: &str) -> FeaturePos {
    if token.starts_with(['?', '<', '>']) {
        return FeaturePos::Unknown;
    }
    match token.parse::<usize>() {
        Ok(n) => FeaturePos::Exact(n),
        Err(_) => FeaturePos::Unknown,
    }
}
