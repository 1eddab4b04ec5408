//! Parsed medical document models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single extracted value with a heuristic confidence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedField<T> {
    pub value: Option<T>,
    pub confidence: f64,
}

impl<T> ParsedField<T> {
    pub fn found(value: T, confidence: f64) -> Self {
        Self {
            value: Some(value),
            confidence,
        }
    }

    /// The uniform shape returned for fields no rule matched.
    pub fn missing() -> Self {
        Self {
            value: None,
            confidence: 0.0,
        }
    }

    pub fn is_found(&self) -> bool {
        self.value.is_some()
    }
}

impl<T> Default for ParsedField<T> {
    fn default() -> Self {
        Self::missing()
    }
}

/// Fields recovered from a medical document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    Name,
    Dob,
    Weight,
    Height,
    A1c,
    Medications,
    InsulinDose,
    TargetRange,
}

impl FieldName {
    pub const ALL: [FieldName; 8] = [
        FieldName::Name,
        FieldName::Dob,
        FieldName::Weight,
        FieldName::Height,
        FieldName::A1c,
        FieldName::Medications,
        FieldName::InsulinDose,
        FieldName::TargetRange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Name => "name",
            FieldName::Dob => "dob",
            FieldName::Weight => "weight",
            FieldName::Height => "height",
            FieldName::A1c => "a1c",
            FieldName::Medications => "medications",
            FieldName::InsulinDose => "insulinDose",
            FieldName::TargetRange => "targetRange",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every field of a parsed document. Units: weight kg, height cm,
/// A1c percent, insulin units, target range "low-high" mg/dL.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDocument {
    pub name: ParsedField<String>,
    pub dob: ParsedField<String>,
    pub weight: ParsedField<String>,
    pub height: ParsedField<String>,
    pub a1c: ParsedField<String>,
    pub medications: ParsedField<String>,
    pub insulin_dose: ParsedField<String>,
    pub target_range: ParsedField<String>,
}

impl ParsedDocument {
    pub fn get(&self, field: FieldName) -> &ParsedField<String> {
        match field {
            FieldName::Name => &self.name,
            FieldName::Dob => &self.dob,
            FieldName::Weight => &self.weight,
            FieldName::Height => &self.height,
            FieldName::A1c => &self.a1c,
            FieldName::Medications => &self.medications,
            FieldName::InsulinDose => &self.insulin_dose,
            FieldName::TargetRange => &self.target_range,
        }
    }

    pub fn set(&mut self, field: FieldName, parsed: ParsedField<String>) {
        let slot = match field {
            FieldName::Name => &mut self.name,
            FieldName::Dob => &mut self.dob,
            FieldName::Weight => &mut self.weight,
            FieldName::Height => &mut self.height,
            FieldName::A1c => &mut self.a1c,
            FieldName::Medications => &mut self.medications,
            FieldName::InsulinDose => &mut self.insulin_dose,
            FieldName::TargetRange => &mut self.target_range,
        };
        *slot = parsed;
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (FieldName, &ParsedField<String>)> {
        FieldName::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    /// Number of fields with a value.
    pub fn found_count(&self) -> usize {
        self.fields().filter(|(_, f)| f.is_found()).count()
    }
}
