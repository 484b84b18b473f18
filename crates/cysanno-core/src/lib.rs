//! Cysteine Annotation Core
//!
//! The domain layer of the annotation pipeline: fetching protein records,
//! locating modified residues, extracting functional annotations, and
//! scoring cross-organism conservation through an external alignment
//! engine.
//!
//! # Pipeline stages
//!
//! - **fetch**: retrieve UniProtKB flat-text records with bounded retry
//! - **record**: parse records into sequences, features, and locations
//! - **locate**: find `*`-marked residues of a peptide in the full sequence
//! - **annotate**: collect the features overlapping each residue
//! - **blast** / **alignment** / **conserve**: align against per-organism
//!   reference databases and classify residue conservation
//!
//! # Example
//!
//! ```no_run
//! use cysanno_core::fetch::UniprotClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = UniprotClient::from_env()?;
//!     let record = client.fetch("P26641").await;
//!     println!("found: {}", record.is_some());
//!     Ok(())
//! }
//! ```

pub mod alignment;
pub mod annotate;
pub mod blast;
pub mod conserve;
pub mod error;
pub mod fasta;
pub mod fetch;
pub mod locate;
pub mod record;

pub use error::{CoreError, Result};
