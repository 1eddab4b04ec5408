//! Meal nutrition estimation.
//!
//! Pipeline: Regional Normalization → Dish Matching → Totals → Narrative

mod analyzer;
mod food_table;
mod narrative;
mod normalizer;

pub use analyzer::*;
pub use food_table::*;
pub use narrative::*;
pub use normalizer::*;

use thiserror::Error;

/// Errors building lookup tables.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Duplicate name in table: {0}")]
    DuplicateName(String),

    #[error("Empty name in table")]
    EmptyName,
}

pub type TableResult<T> = Result<T, TableError>;
