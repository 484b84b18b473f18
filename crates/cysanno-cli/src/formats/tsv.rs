//! Generic tsv input container
//!
//! A flat tab-separated file with one peptide per row. The protein id and
//! peptide sequence columns are named by the caller; every original column
//! passes through and the annotation columns are appended on the right.

use super::{Annotations, PeptideRow};
use crate::error::{CliError, Result};
use cysanno_common::Organism;
use std::path::Path;

#[derive(Debug)]
pub struct TsvFile {
    headers: Vec<String>,
    /// Raw cells per record, index-aligned with `peptides`
    rows: Vec<Vec<String>>,
    peptides: Vec<PeptideRow>,
}

impl TsvFile {
    pub fn read(path: &Path, id_col: &str, seq_col: &str) -> Result<Self> {
        if !path.is_file() {
            return Err(CliError::FileNotFound(path.display().to_string()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let id_idx = headers
            .iter()
            .position(|h| h == id_col)
            .ok_or_else(|| CliError::MissingColumn(id_col.to_string()))?;
        let seq_idx = headers
            .iter()
            .position(|h| h == seq_col)
            .ok_or_else(|| CliError::MissingColumn(seq_col.to_string()))?;

        let mut rows = Vec::new();
        let mut peptides = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let cells: Vec<String> = record?.iter().map(String::from).collect();
            peptides.push(PeptideRow {
                index: (i + 1).to_string(),
                id: cells.get(id_idx).cloned().unwrap_or_default(),
                sequence: cells.get(seq_idx).cloned().unwrap_or_default(),
                annotations: Annotations::default(),
                ..PeptideRow::default()
            });
            rows.push(cells);
        }

        Ok(Self {
            headers,
            rows,
            peptides,
        })
    }

    pub fn peptides(&self) -> &[PeptideRow] {
        &self.peptides
    }

    pub fn peptides_mut(&mut self) -> &mut [PeptideRow] {
        &mut self.peptides
    }

    pub fn write(&self, path: &Path, organisms: &[Organism], defined_label: &str) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_path(path)?;

        let mut header = self.headers.clone();
        header.extend(
            ["protein_location", "position", "function", "domains"]
                .into_iter()
                .map(String::from),
        );
        for &organism in organisms {
            header.push(format!("{}_conserved", organism));
        }
        for field in ["id", "evalue", "description", "position", "function"] {
            header.push(format!("{}_{}", defined_label, field));
        }
        writer.write_record(&header)?;

        for (cells, peptide) in self.rows.iter().zip(&self.peptides) {
            let annotations = &peptide.annotations;
            let mut record = cells.clone();
            record.push(annotations.protein_location.clone());
            record.push(annotations.position.clone());
            record.push(annotations.function.clone());
            record.push(annotations.domains.clone());
            for organism in organisms {
                record.push(
                    annotations
                        .conserved
                        .get(organism)
                        .cloned()
                        .unwrap_or_default(),
                );
            }
            let defined = &annotations.defined;
            record.extend([
                defined.id.clone(),
                defined.evalue.clone(),
                defined.description.clone(),
                defined.position.clone(),
                defined.function.clone(),
            ]);
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "\
protein_ID\tsequence\tratio
P26641\tFPEELTQTFMSC*NLITGMFQR\t1.52
P09211\tASC*LYGQLPK\t0.71
";

    fn read_fixture(dir: &tempfile::TempDir) -> TsvFile {
        let path = dir.path().join("peptides.tsv");
        std::fs::write(&path, FIXTURE).unwrap();
        TsvFile::read(&path, "protein_ID", "sequence").unwrap()
    }

    #[test]
    fn test_read_rows() {
        let dir = tempfile::tempdir().unwrap();
        let file = read_fixture(&dir);
        assert_eq!(file.peptides.len(), 2);
        assert_eq!(file.peptides[0].id, "P26641");
        assert_eq!(file.peptides[0].sequence, "FPEELTQTFMSC*NLITGMFQR");
        assert_eq!(file.peptides[1].index, "2");
    }

    #[test]
    fn test_missing_required_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("peptides.tsv");
        std::fs::write(&path, "id\tsequence\nP26641\tABC\n").unwrap();
        let result = TsvFile::read(&path, "protein_ID", "sequence");
        match result {
            Err(CliError::MissingColumn(col)) => assert_eq!(col, "protein_ID"),
            _ => panic!("expected missing column error"),
        }
    }

    #[test]
    fn test_write_appends_annotation_columns() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = read_fixture(&dir);
        {
            let annotations = &mut file.peptides_mut()[0].annotations;
            annotations.position = "16".to_string();
            annotations.conserved.insert(Organism::Human, "Yes".to_string());
        }

        let out = dir.path().join("annotated.tsv");
        file.write(&out, &Organism::ALL, "none").unwrap();
        let written = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = written.lines().collect();

        assert_eq!(lines.len(), 3);
        let header: Vec<&str> = lines[0].split('\t').collect();
        assert_eq!(&header[..3], &["protein_ID", "sequence", "ratio"]);
        assert!(header.contains(&"position"));
        assert!(header.contains(&"worms_conserved"));
        assert!(header.contains(&"none_evalue"));

        let first: Vec<&str> = lines[1].split('\t').collect();
        assert_eq!(first[0], "P26641");
        assert_eq!(first[2], "1.52");
        assert_eq!(first[4], "16"); // position column
        assert_eq!(first[7], "Yes"); // human_conserved
    }
}
