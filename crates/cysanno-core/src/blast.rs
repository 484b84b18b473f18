//! External alignment engine adapter
//!
//! Invokes `blastp` (or a configured substitute) against per-organism
//! reference databases and captures its XML output. The engine runs as a
//! child process fed the query sequence on stdin; one invocation per
//! (protein, organism) task.

use crate::error::{CoreError, Result};
use cysanno_common::Organism;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Default alignment engine executable
pub const DEFAULT_BLAST_EXE: &str = "blastp";

/// Number of ranked alignments requested per query
const NUM_ALIGNMENTS: u32 = 5;

/// Handle to the external alignment engine and its database directory
#[derive(Debug, Clone)]
pub struct BlastEngine {
    database_dir: PathBuf,
    executable: String,
}

impl BlastEngine {
    pub fn new(database_dir: impl Into<PathBuf>, executable: impl Into<String>) -> Self {
        Self {
            database_dir: database_dir.into(),
            executable: executable.into(),
        }
    }

    /// Path to the organism's reference database inside the database dir
    pub fn database_path(&self, organism: Organism) -> PathBuf {
        self.database_dir.join(organism.database_stem())
    }

    /// Verify the database directory and every organism's database before
    /// any alignment starts. A missing database is a fatal configuration
    /// error, not a per-task failure.
    pub fn validate(&self, organisms: &[Organism]) -> Result<()> {
        if !self.database_dir.is_dir() {
            return Err(CoreError::config(format!(
                "Database directory '{}' does not exist",
                self.database_dir.display()
            )));
        }

        for &organism in organisms {
            let stem = self.database_path(organism);
            // protein databases ship as <stem>.phr/.pin/.psq volumes
            let volume = stem.with_extension("phr");
            if !volume.exists() && !stem.exists() {
                return Err(CoreError::config(format!(
                    "No {} database found at '{}'",
                    organism,
                    stem.display()
                )));
            }
        }

        Ok(())
    }

    /// Align one query sequence against one organism's database, returning
    /// the engine's raw XML output. A zero-hit run is a success with an
    /// empty hit list in the XML; a failed engine invocation is an error
    /// the caller isolates to this task.
    pub async fn blastp(&self, query: &str, organism: Organism) -> Result<String> {
        let database = self.database_path(organism);
        debug!(organism = %organism, database = %database.display(), "Running alignment engine");

        let mut child = tokio::process::Command::new(&self.executable)
            .arg("-query")
            .arg("-")
            .arg("-db")
            .arg(&database)
            .arg("-outfmt")
            .arg("5")
            .arg("-num_alignments")
            .arg(NUM_ALIGNMENTS.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CoreError::Engine {
                exe: self.executable.clone(),
                reason: e.to_string(),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(query.as_bytes())
                .await
                .map_err(|e| CoreError::Engine {
                    exe: self.executable.clone(),
                    reason: format!("failed to write query: {}", e),
                })?;
            // close stdin so the engine sees EOF
        }

        let output = child.wait_with_output().await.map_err(|e| CoreError::Engine {
            exe: self.executable.clone(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(CoreError::Engine {
                exe: self.executable.clone(),
                reason: format!(
                    "exit status {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_path_per_organism() {
        let engine = BlastEngine::new("/data/blastdb", DEFAULT_BLAST_EXE);
        assert_eq!(
            engine.database_path(Organism::Human),
            Path::new("/data/blastdb/human_nr_uniprot")
        );
        assert_eq!(
            engine.database_path(Organism::Mustard),
            Path::new("/data/blastdb/mustard_nr_uniprot")
        );
    }

    #[test]
    fn test_validate_missing_directory() {
        let engine = BlastEngine::new("/nonexistent/blastdb", DEFAULT_BLAST_EXE);
        let result = engine.validate(&Organism::ALL);
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn test_validate_missing_database_volume() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("human_nr_uniprot.phr"), b"").unwrap();

        let engine = BlastEngine::new(dir.path(), DEFAULT_BLAST_EXE);
        assert!(engine.validate(&[Organism::Human]).is_ok());

        let result = engine.validate(&[Organism::Human, Organism::Yeast]);
        match result {
            Err(CoreError::Config(msg)) => assert!(msg.contains("yeast")),
            _ => panic!("expected config error"),
        }
    }

    #[test]
    fn test_validate_accepts_bare_database_file() {
        let dir = tempfile::tempdir().unwrap();
        for organism in Organism::ALL {
            std::fs::write(dir.path().join(organism.database_stem()), b"").unwrap();
        }
        let engine = BlastEngine::new(dir.path(), DEFAULT_BLAST_EXE);
        assert!(engine.validate(&Organism::ALL).is_ok());
    }

    #[tokio::test]
    async fn test_missing_executable_is_engine_error() {
        let dir = tempfile::tempdir().unwrap();
        let engine = BlastEngine::new(dir.path(), "definitely-not-a-real-blastp");
        let result = engine.blastp("MAAAFPEELT", Organism::Human).await;
        assert!(matches!(result, Err(CoreError::Engine { .. })));
    }
}
