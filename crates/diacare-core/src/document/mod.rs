//! Medical document field extraction.
//!
//! Works on plain text already extracted from a PDF or scan. Each field is
//! resolved by walking its rules top-down and keeping the first structurally
//! valid value, so every field of the result is always present.

mod dates;
mod rules;

pub use dates::*;
pub use rules::*;

use std::sync::LazyLock;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{FieldName, ParsedDocument, ParsedField};

static BUILTIN_RULES: LazyLock<Vec<FieldRule>> =
    LazyLock::new(|| default_rules().expect("built-in document rules compile"));

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Invalid pattern for {field}: {source}")]
    Pattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("Confidence for {field} must be within (0, 1], got {confidence}")]
    InvalidConfidence {
        field: &'static str,
        confidence: f64,
    },

    #[error("Rule confidences for {field} must strictly decrease")]
    ConfidenceOrder { field: &'static str },

    #[error("Invalid year window {min_year}..={max_year}")]
    YearWindow { min_year: i32, max_year: i32 },
}

pub type RuleResult<T> = Result<T, RuleError>;

/// Plausible years for extracted dates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DocumentConfig {
    pub min_year: i32,
    /// Also the reference year when deriving a birth year from an age
    pub max_year: i32,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            min_year: 1900,
            max_year: Utc::now().year(),
        }
    }
}

impl DocumentConfig {
    pub fn validate(&self) -> RuleResult<()> {
        if self.min_year > self.max_year {
            return Err(RuleError::YearWindow {
                min_year: self.min_year,
                max_year: self.max_year,
            });
        }
        Ok(())
    }
}

/// Rule interpreter producing a [`ParsedDocument`].
#[derive(Debug, Clone)]
pub struct DocumentParser {
    rules: Vec<FieldRule>,
    config: DocumentConfig,
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self {
            rules: BUILTIN_RULES.clone(),
            config: DocumentConfig::default(),
        }
    }
}

impl DocumentParser {
    /// Parser with the built-in rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in rules with a custom year window.
    pub fn with_config(config: DocumentConfig) -> RuleResult<Self> {
        Self::with_rules(BUILTIN_RULES.clone(), config)
    }

    /// Custom rules. Rules for the same field are tried in the given order
    /// and their confidences must strictly decrease.
    pub fn with_rules(rules: Vec<FieldRule>, config: DocumentConfig) -> RuleResult<Self> {
        config.validate()?;
        for field in FieldName::ALL {
            let confidences: Vec<f64> = rules
                .iter()
                .filter(|r| r.field == field)
                .map(|r| r.confidence)
                .collect();
            if confidences.windows(2).any(|pair| pair[1] >= pair[0]) {
                return Err(RuleError::ConfidenceOrder {
                    field: field.as_str(),
                });
            }
        }
        Ok(Self { rules, config })
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Extract all fields. Unmatched fields are `{ value: null, confidence: 0 }`.
    pub fn parse(&self, text: &str) -> ParsedDocument {
        let mut doc = ParsedDocument::default();
        for field in FieldName::ALL {
            doc.set(field, self.parse_field(field, text));
        }
        tracing::debug!(
            found = doc.found_count(),
            chars = text.len(),
            "Parsed medical document"
        );
        doc
    }

    /// Resolve one field.
    pub fn parse_field(&self, field: FieldName, text: &str) -> ParsedField<String> {
        self.rules
            .iter()
            .filter(|rule| rule.field == field)
            .find_map(|rule| {
                rule.apply(text, &self.config)
                    .map(|value| ParsedField::found(value, rule.confidence))
            })
            .unwrap_or_default()
    }
}
