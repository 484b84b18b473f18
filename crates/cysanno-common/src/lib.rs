//! Cysanno Common Library
//!
//! Shared types, logging and error handling for the cysanno workspace.
//!
//! # Overview
//!
//! This crate provides functionality used across all cysanno workspace
//! members:
//!
//! - **Error Handling**: shared error and result types
//! - **Logging**: tracing configuration and initialization
//! - **Organisms**: the closed set of reference organisms used for
//!   conservation analysis
//! - **Field vocabulary**: sentinel strings written into annotation fields

pub mod error;
pub mod logging;
pub mod organism;
pub mod types;

// Re-export commonly used types
pub use error::{CommonError, Result};
pub use organism::Organism;
