//! cimage output file container
//!
//! A cimage file is tab-separated with grouped rows: a header row whose
//! first column reads `index`, residue-summary rows carrying a non-empty
//! group index, and peptide detail rows (empty index) grouped under the
//! preceding summary row. Trailing ratio columns are ragged and passed
//! through untouched.

use super::{Annotations, PeptideRow};
use crate::error::{CliError, Result};
use cysanno_common::Organism;
use cysanno_core::conserve::CrossReference;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug)]
pub struct CimageFile {
    header: PeptideRow,
    summaries: Vec<PeptideRow>,
    peptides: Vec<PeptideRow>,
}

impl CimageFile {
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CliError::FileNotFound(path.display().to_string()),
            _ => CliError::Io(e),
        })?;

        let mut header = None;
        let mut summaries = Vec::new();
        let mut peptides: Vec<PeptideRow> = Vec::new();
        let mut group_index = String::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let mut row = parse_row(line);

            if row.index.trim() == "index" {
                header = Some(row);
            } else if !row.index.trim().is_empty() {
                group_index = row.index.trim().to_string();
                summaries.push(row);
            } else {
                row.index = group_index.clone();
                peptides.push(row);
            }
        }

        let header = header.ok_or_else(|| {
            CliError::input(format!(
                "No header row found in '{}'; expected a row starting with 'index'",
                path.display()
            ))
        })?;

        Ok(Self {
            header,
            summaries,
            peptides,
        })
    }

    pub fn peptides(&self) -> &[PeptideRow] {
        &self.peptides
    }

    pub fn peptides_mut(&mut self) -> &mut [PeptideRow] {
        &mut self.peptides
    }

    /// Write the annotated file, preserving the summary/detail grouping:
    /// each summary row is followed by the peptide rows sharing its index
    pub fn write(&self, path: &Path, organisms: &[Organism], defined_label: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = BufWriter::new(file);

        write_row(&mut writer, &self.header_row(organisms, defined_label), organisms)?;
        for summary in &self.summaries {
            write_row(&mut writer, summary, organisms)?;
            for peptide in &self.peptides {
                if peptide.index.trim() == summary.index.trim() {
                    write_row(&mut writer, peptide, organisms)?;
                }
            }
        }
        writer.flush()?;
        Ok(())
    }

    fn header_row(&self, organisms: &[Organism], defined_label: &str) -> PeptideRow {
        let mut row = self.header.clone();
        row.id = "id".to_string();

        let annotations = &mut row.annotations;
        annotations.protein_location = "protein location".to_string();
        annotations.position = "residue position".to_string();
        annotations.function = "residue function".to_string();
        annotations.domains = "domains".to_string();
        for &organism in organisms {
            annotations
                .conserved
                .insert(organism, format!("{}_conserved", organism));
        }
        annotations.defined = CrossReference {
            id: format!("{}_id", defined_label),
            evalue: format!("{}_evalue", defined_label),
            description: format!("{}_description", defined_label),
            position: format!("{}_position", defined_label),
            function: format!("{}_function", defined_label),
        };
        row
    }
}

fn parse_row(line: &str) -> PeptideRow {
    let mut fields = line.trim_end_matches(['\r', '\n']).split('\t').map(str::to_string);
    PeptideRow {
        index: fields.next().unwrap_or_default(),
        id: fields.next().unwrap_or_default(),
        description: fields.next().unwrap_or_default(),
        symbol: fields.next().unwrap_or_default(),
        sequence: fields.next().unwrap_or_default(),
        mass: fields.next().unwrap_or_default(),
        extras: fields.collect(),
        annotations: Annotations::default(),
    }
}

fn write_row<W: Write>(
    writer: &mut W,
    row: &PeptideRow,
    organisms: &[Organism],
) -> std::io::Result<()> {
    let annotations = &row.annotations;
    let mut cells: Vec<&str> = vec![
        &row.index,
        &row.id,
        &row.symbol,
        &row.description,
        &annotations.protein_location,
        &row.sequence,
        &row.mass,
        &annotations.position,
        &annotations.function,
        &annotations.domains,
    ];
    for organism in organisms {
        cells.push(
            annotations
                .conserved
                .get(organism)
                .map(String::as_str)
                .unwrap_or(""),
        );
    }
    let defined = &annotations.defined;
    cells.extend([
        defined.id.as_str(),
        defined.evalue.as_str(),
        defined.description.as_str(),
        defined.position.as_str(),
        defined.function.as_str(),
    ]);
    for extra in &row.extras {
        cells.push(extra.trim());
    }
    writeln!(writer, "{}", cells.join("\t"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "\
index\tid\tdescription\tsymbol\tsequence\tmass\tmr.1\tmr.2
1\tP26641\tElongation factor 1-gamma\tEEF1G\tC16\t50119.9\t1.52\t1.48
\tP26641\tElongation factor 1-gamma\tEEF1G\tK.FPEELTQTFMSC*NLITGMFQR.W\t50119.9\t1.52\t1.48
\tP09211\tGlutathione S-transferase P\tGSTP1\tR.ASC*LYGQLPK.F\t23341.0\t0.71
2\tP00338\tL-lactate dehydrogenase A\tLDHA\tC163\t36689.0\t1.01
\tP00338\tL-lactate dehydrogenase A\tLDHA\tK.VIGSGC*NLDSAR.F\t36689.0\t1.01
";

    fn read_fixture(dir: &tempfile::TempDir) -> CimageFile {
        let path = dir.path().join("cimage.txt");
        std::fs::write(&path, FIXTURE).unwrap();
        CimageFile::read(&path).unwrap()
    }

    #[test]
    fn test_read_groups_rows() {
        let dir = tempfile::tempdir().unwrap();
        let file = read_fixture(&dir);

        assert_eq!(file.summaries.len(), 2);
        assert_eq!(file.peptides.len(), 3);
        // detail rows inherit the preceding summary's index
        assert_eq!(file.peptides[0].index, "1");
        assert_eq!(file.peptides[1].index, "1");
        assert_eq!(file.peptides[2].index, "2");
        assert_eq!(file.peptides[1].id, "P09211");
        assert_eq!(file.peptides[0].sequence, "K.FPEELTQTFMSC*NLITGMFQR.W");
        // ragged trailing columns survive
        assert_eq!(file.peptides[0].extras, vec!["1.52", "1.48"]);
        assert_eq!(file.peptides[1].extras, vec!["0.71"]);
    }

    #[test]
    fn test_missing_header_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("headless.txt");
        std::fs::write(&path, "1\tP26641\tdesc\tEEF1G\tC16\t50119.9\n").unwrap();
        assert!(matches!(CimageFile::read(&path), Err(CliError::Input(_))));
    }

    #[test]
    fn test_missing_file_is_file_not_found() {
        let result = CimageFile::read(Path::new("/nonexistent/cimage.txt"));
        assert!(matches!(result, Err(CliError::FileNotFound(_))));
    }

    #[test]
    fn test_write_round_trip_with_annotations() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = read_fixture(&dir);

        {
            let annotations = &mut file.peptides_mut()[0].annotations;
            annotations.position = "16".to_string();
            annotations.function = "DISULFID--".to_string();
            annotations.protein_location = "Cytoplasm.".to_string();
            annotations.conserved.insert(Organism::Mouse, "Yes".to_string());
            annotations.conserved.insert(Organism::Yeast, "--".to_string());
        }

        let out = dir.path().join("annotated.tsv");
        file.write(&out, &Organism::ALL, "mouse").unwrap();
        let written = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = written.lines().collect();

        // header + 2 summaries + 3 peptides, grouped under their summaries
        assert_eq!(lines.len(), 6);
        let header: Vec<&str> = lines[0].split('\t').collect();
        assert_eq!(
            &header[..10],
            &[
                "index", "id", "symbol", "description", "protein location", "sequence", "mass",
                "residue position", "residue function", "domains"
            ]
        );
        assert!(lines[0].contains("human_conserved"));
        assert!(lines[0].contains("mouse_id\tmouse_evalue\tmouse_description"));

        let annotated: Vec<&str> = lines[2].split('\t').collect();
        assert_eq!(annotated[1], "P26641");
        assert_eq!(annotated[7], "16");
        // conserved columns follow organism order; "--" stays distinct from "No"
        assert_eq!(annotated[11], "Yes");
        assert_eq!(annotated[13], "--");
        // P09211 grouped under summary 1, LDHA row under summary 2
        assert!(lines[3].contains("P09211"));
        assert!(lines[4].contains("C163"));
        assert!(lines[5].contains("P00338"));
    }
}
