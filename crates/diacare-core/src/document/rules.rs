//! Extraction rules and the built-in rule table.
//!
//! Each field owns an ordered list of rules, most specific first. A rule is a
//! regex plus an [`Extraction`] that turns its captures into a normalized
//! value. Confidence reflects how likely the rule is to produce a false
//! positive and strictly decreases down each field's list.

use std::ops::RangeInclusive;

use regex::{Captures, Regex};

use super::dates::{format_iso, year_in_window, DateFormat};
use super::{DocumentConfig, RuleError, RuleResult};
use crate::models::FieldName;

const LB_TO_KG: f64 = 0.453_592;
const INCH_TO_CM: f64 = 2.54;
const FOOT_TO_CM: f64 = 30.48;
const MAX_AGE_YEARS: i32 = 120;
const MAX_NAME_WORDS: usize = 5;

/// Words that end a captured name, usually the next label on the same line.
const NAME_STOP_WORDS: &[&str] = &[
    "age", "sex", "gender", "dob", "d.o.b", "date", "mrn", "id", "uhid", "phone", "mobile",
    "address", "ref",
];

/// Diabetes-related drugs found by the last-resort medication scan.
const KNOWN_MEDICATIONS: &[&str] = &[
    "metformin",
    "glimepiride",
    "gliclazide",
    "glipizide",
    "sitagliptin",
    "vildagliptin",
    "teneligliptin",
    "linagliptin",
    "dapagliflozin",
    "empagliflozin",
    "canagliflozin",
    "pioglitazone",
    "acarbose",
    "voglibose",
    "semaglutide",
    "liraglutide",
    "dulaglutide",
    "insulin glargine",
    "insulin aspart",
    "insulin lispro",
    "insulin detemir",
    "insulin degludec",
    "lantus",
    "humalog",
    "novorapid",
    "levemir",
    "tresiba",
    "mixtard",
    "atorvastatin",
    "rosuvastatin",
    "telmisartan",
    "losartan",
    "amlodipine",
    "aspirin",
];

/// A numeric quantity with a canonical unit and a plausible range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// kg
    Weight,
    /// cm
    Height,
    /// percent
    A1c,
    /// units
    InsulinDose,
}

impl Measure {
    pub fn plausible_range(&self) -> RangeInclusive<f64> {
        match self {
            Measure::Weight => 2.0..=300.0,
            Measure::Height => 50.0..=250.0,
            Measure::A1c => 3.0..=20.0,
            Measure::InsulinDose => 0.5..=300.0,
        }
    }

    /// Convert `value` written in `unit` to the canonical unit.
    fn to_canonical(&self, value: f64, unit: Option<&str>) -> f64 {
        let unit = unit.map(str::to_ascii_lowercase).unwrap_or_default();
        match self {
            Measure::Weight if unit.starts_with("lb") || unit.starts_with("pound") => {
                value * LB_TO_KG
            }
            Measure::Height if unit == "m" || unit.starts_with("met") => value * 100.0,
            Measure::Height if unit.starts_with("in") || unit == "\"" => value * INCH_TO_CM,
            _ => value,
        }
    }

    fn render(&self, value: f64) -> String {
        let number = format_number(value);
        match self {
            Measure::Weight => format!("{number} kg"),
            Measure::Height => format!("{number} cm"),
            Measure::A1c => format!("{number}%"),
            Measure::InsulinDose => format!("{number} units"),
        }
    }

    fn accept(&self, value: f64) -> Option<String> {
        (value.is_finite() && self.plausible_range().contains(&value)).then(|| self.render(value))
    }
}

/// How a rule's captures become a value.
///
/// Named groups used: `date`, `age`, `value`, `unit`, `feet`, `inches`, `low`,
/// `high`. Kinds without a group of their own fall back to the whole match.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// `date` parsed in the declared format
    Date(DateFormat),
    /// `age` in years, turned into an approximate birth date (`YYYY-01-01`)
    AgeInYears,
    /// Earliest valid date among all matches
    OldestDate(DateFormat),
    /// `value` as a name-like phrase
    Text,
    /// `value` with optional `unit`, converted and range checked
    Measurement(Measure),
    /// `feet` and optional `inches`, as a height in cm
    FeetInches,
    /// `low`-`high` glucose target in mg/dL
    Range,
    /// `value` split into a comma separated list
    List,
    /// Every distinct match of the pattern, in order of appearance
    KnownTerms,
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: FieldName,
    pub pattern: Regex,
    pub extraction: Extraction,
    pub confidence: f64,
}

impl FieldRule {
    pub fn new(
        field: FieldName,
        pattern: &str,
        extraction: Extraction,
        confidence: f64,
    ) -> RuleResult<Self> {
        if !(confidence > 0.0 && confidence <= 1.0) {
            return Err(RuleError::InvalidConfidence {
                field: field.as_str(),
                confidence,
            });
        }
        let pattern = Regex::new(pattern).map_err(|source| RuleError::Pattern {
            field: field.as_str(),
            source,
        })?;
        Ok(Self {
            field,
            pattern,
            extraction,
            confidence,
        })
    }

    /// First structurally valid value this rule finds in `text`.
    pub fn apply(&self, text: &str, config: &DocumentConfig) -> Option<String> {
        match &self.extraction {
            Extraction::OldestDate(format) => self
                .pattern
                .captures_iter(text)
                .filter_map(|caps| {
                    let date = format.parse(date_group(&caps))?;
                    year_in_window(&date, config.min_year, config.max_year).then_some(date)
                })
                .min()
                .map(|date| format_iso(&date)),
            Extraction::KnownTerms => {
                let mut found: Vec<String> = Vec::new();
                for m in self.pattern.find_iter(text) {
                    let term = m.as_str().to_lowercase();
                    if !found.contains(&term) {
                        found.push(term);
                    }
                }
                (!found.is_empty()).then(|| found.join(", "))
            }
            extraction => self
                .pattern
                .captures_iter(text)
                .find_map(|caps| extraction.extract(&caps, config)),
        }
    }
}

impl Extraction {
    fn extract(&self, caps: &Captures<'_>, config: &DocumentConfig) -> Option<String> {
        match self {
            Extraction::Date(format) => {
                let date = format.parse(date_group(caps))?;
                year_in_window(&date, config.min_year, config.max_year)
                    .then(|| format_iso(&date))
            }
            Extraction::AgeInYears => {
                let age: i32 = group(caps, "age")?.parse().ok()?;
                let year = config.max_year - age;
                ((0..=MAX_AGE_YEARS).contains(&age) && year >= config.min_year)
                    .then(|| format!("{year:04}-01-01"))
            }
            Extraction::Text => clean_name(group(caps, "value")?),
            Extraction::Measurement(measure) => {
                let value: f64 = group(caps, "value")?.parse().ok()?;
                measure.accept(measure.to_canonical(value, group(caps, "unit")))
            }
            Extraction::FeetInches => {
                let feet: f64 = group(caps, "feet")?.parse().ok()?;
                let inches: f64 = match group(caps, "inches") {
                    Some(raw) => raw.parse().ok()?,
                    None => 0.0,
                };
                if inches >= 12.0 {
                    return None;
                }
                Measure::Height.accept(feet * FOOT_TO_CM + inches * INCH_TO_CM)
            }
            Extraction::Range => {
                let low: u32 = group(caps, "low")?.parse().ok()?;
                let high: u32 = group(caps, "high")?.parse().ok()?;
                (40 <= low && low < high && high <= 400).then(|| format!("{low}-{high} mg/dL"))
            }
            Extraction::List => split_list(group(caps, "value")?),
            Extraction::OldestDate(_) | Extraction::KnownTerms => None,
        }
    }
}

fn group<'t>(caps: &Captures<'t>, name: &str) -> Option<&'t str> {
    caps.name(name).map(|m| m.as_str().trim())
}

fn date_group<'t>(caps: &Captures<'t>) -> &'t str {
    caps.name("date")
        .or_else(|| caps.get(0))
        .map(|m| m.as_str())
        .unwrap_or_default()
}

/// Keep the leading name-like words, stopping at the next label or number.
fn clean_name(raw: &str) -> Option<String> {
    let mut words = Vec::new();
    for word in raw.split_whitespace() {
        let key = word
            .trim_matches(|c: char| !c.is_alphanumeric() && c != '.')
            .trim_end_matches('.')
            .to_lowercase();
        if NAME_STOP_WORDS.contains(&key.as_str()) || word.chars().any(|c| c.is_ascii_digit()) {
            break;
        }
        let word = word.trim_end_matches([',', ';', ':', '|']);
        if word.is_empty() {
            break;
        }
        words.push(word);
        if words.len() == MAX_NAME_WORDS {
            break;
        }
    }
    let name = words.join(" ");
    (name.chars().filter(|c| c.is_alphabetic()).count() >= 2).then_some(name)
}

fn split_list(raw: &str) -> Option<String> {
    let items: Vec<String> = raw
        .split([',', ';', '+'])
        .flat_map(|part| part.split(" and "))
        .map(|item| item.trim().trim_end_matches('.').trim().to_string())
        .filter(|item| item.chars().any(|c| c.is_alphabetic()))
        .collect();
    (!items.is_empty()).then(|| items.join(", "))
}

fn format_number(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

/// Built-in rules, grouped by field, most specific first.
pub fn default_rules() -> RuleResult<Vec<FieldRule>> {
    use DateFormat::*;
    use Extraction::*;
    use FieldName as F;

    const DOB_LABEL: &str =
        r"(?i)\b(?:date\s+of\s+birth|d\.?o\.?b\.?|birth\s*date|born(?:\s+on)?)";
    const NUMBER: &str = r"(?P<value>\d{1,3}(?:\.\d+)?)";

    let dob = |format: DateFormat, hint: &str| {
        format!(r"{DOB_LABEL}\s*{hint}\s*[:\-]?\s*(?P<date>{})", format.pattern())
    };
    let meds_pattern = format!(
        r"(?i)\b(?:{})\b",
        KNOWN_MEDICATIONS
            .iter()
            .map(|m| m.replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|")
    );

    let specs: Vec<(FieldName, String, Extraction, f64)> = vec![
        // Name
        (
            F::Name,
            r"(?im)^[ \t]*(?:patient(?:'s)?\s+name|name\s+of\s+(?:the\s+)?patient|full\s+name)[ \t]*[:\-][ \t]*(?P<value>[^\n]+)".into(),
            Text,
            0.95,
        ),
        (F::Name, r"(?im)^[ \t]*name[ \t]*[:\-][ \t]*(?P<value>[^\n]+)".into(), Text, 0.9),
        (F::Name, r"(?im)\bpatient[ \t]*[:\-][ \t]*(?P<value>[^\n]+)".into(), Text, 0.8),
        (
            F::Name,
            r"\b(?:Mr|Mrs|Ms|Miss)\.?[ \t]+(?P<value>[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+){0,2})".into(),
            Text,
            0.6,
        ),
        // Date of birth
        (F::Dob, dob(DayMonthYear, ""), Date(DayMonthYear), 0.98),
        (F::Dob, dob(MonthDayYear, ""), Date(MonthDayYear), 0.97),
        (F::Dob, dob(Ymd, ""), Date(Ymd), 0.96),
        (F::Dob, dob(Mdy, r"\(\s*mm/dd/yyyy\s*\)"), Date(Mdy), 0.955),
        (F::Dob, dob(Dmy, ""), Date(Dmy), 0.95),
        (
            F::Dob,
            r"(?i)\bage\s*[:\-]?\s*(?P<age>\d{1,3})\s*(?:y|yrs?|years?)?\b".into(),
            AgeInYears,
            0.6,
        ),
        (
            F::Dob,
            r"(?i)\b(?P<age>\d{1,3})[\s\-]*(?:years?|yrs?)[\s\-]*old\b".into(),
            AgeInYears,
            0.55,
        ),
        (F::Dob, format!("(?i){}", DayMonthYear.pattern()), OldestDate(DayMonthYear), 0.4),
        (F::Dob, Ymd.pattern().into(), OldestDate(Ymd), 0.38),
        (F::Dob, Dmy.pattern().into(), OldestDate(Dmy), 0.35),
        // Weight
        (
            F::Weight,
            format!(r"(?i)\b(?:body\s+)?(?:weight|weighs|wt)\.?\s*[:\-]?\s*{NUMBER}\s*(?P<unit>kgs?|kilograms?|lbs?|pounds?)\b"),
            Measurement(Measure::Weight),
            0.95,
        ),
        (
            F::Weight,
            format!(r"(?i)\b(?:body\s+)?(?:weight|weighs|wt)\.?\s*[:\-]?\s*{NUMBER}\b"),
            Measurement(Measure::Weight),
            0.8,
        ),
        (
            F::Weight,
            format!(r"(?i)\b{NUMBER}\s*(?P<unit>kgs?|kilograms?)\b"),
            Measurement(Measure::Weight),
            0.6,
        ),
        // Height
        (
            F::Height,
            r"(?i)\b(?:height|ht)\.?\s*[:\-]?\s*(?P<value>\d{2,3}(?:\.\d+)?)\s*(?P<unit>cm|centimet(?:er|re)s?)\b".into(),
            Measurement(Measure::Height),
            0.95,
        ),
        (
            F::Height,
            r"(?i)\b(?:height|ht)\.?\s*[:\-]?\s*(?P<value>\d(?:\.\d{1,2})?)\s*(?P<unit>m|met(?:er|re)s?)\b".into(),
            Measurement(Measure::Height),
            0.9,
        ),
        (
            F::Height,
            r#"(?i)\b(?:height|ht)\.?\s*[:\-]?\s*(?P<feet>\d)\s*(?:'|ft\.?|feet|foot)\s*(?:(?P<inches>\d{1,2})\s*(?:"|''|in(?:ch(?:es)?)?\.?)?)?"#.into(),
            FeetInches,
            0.88,
        ),
        (
            F::Height,
            r#"(?i)\b(?:height|ht)\.?\s*[:\-]?\s*(?P<value>\d{2,3}(?:\.\d+)?)\s*(?P<unit>inch(?:es)?\b|in\b|")"#.into(),
            Measurement(Measure::Height),
            0.8,
        ),
        // A trailing inch unit is still converted, never read as cm
        (
            F::Height,
            r#"(?i)\b(?:height|ht)\.?\s*[:\-]?\s*(?P<value>\d{2,3}(?:\.\d+)?)\b(?:\s*(?P<unit>inch(?:es)?\b|in\b|"))?"#.into(),
            Measurement(Measure::Height),
            0.75,
        ),
        (
            F::Height,
            r"(?i)\b(?P<value>\d{3}(?:\.\d+)?)\s*(?P<unit>cm)\b".into(),
            Measurement(Measure::Height),
            0.55,
        ),
        // HbA1c
        (
            F::A1c,
            r"(?i)\b(?:hba1c|hb\s*a1c|a1c|glyc(?:at|osyl)ated\s+ha?emoglobin)\s*(?:\(\s*%\s*\)|level|value|result)?\s*(?:is|of|was|[:\-=])?\s*(?P<value>\d{1,2}(?:\.\d{1,2})?)\s*%".into(),
            Measurement(Measure::A1c),
            0.95,
        ),
        (
            F::A1c,
            r"(?i)\b(?:hba1c|hb\s*a1c|a1c)\s*(?:level|value|result)?\s*(?:is|of|was|[:\-=])?\s*(?P<value>\d{1,2}(?:\.\d{1,2})?)\b".into(),
            Measurement(Measure::A1c),
            0.8,
        ),
        (
            F::A1c,
            r"(?i)\b(?P<value>\d{1,2}(?:\.\d{1,2})?)\s*%\s*(?:hba1c|a1c)\b".into(),
            Measurement(Measure::A1c),
            0.7,
        ),
        // Medications
        (
            F::Medications,
            r"(?im)^[ \t]*(?:current\s+)?(?:medications?|medicines?|meds|drugs|prescriptions?)[ \t]*[:\-][ \t]*(?P<value>[^\n]+)".into(),
            List,
            0.9,
        ),
        (
            F::Medications,
            r"(?i)\b(?:currently\s+taking|prescribed|taking)\s+(?P<value>[^\n.]+)".into(),
            List,
            0.7,
        ),
        (F::Medications, meds_pattern, KnownTerms, 0.5),
        // Insulin dose
        (
            F::InsulinDose,
            format!(r"(?i)\binsulin\s+(?:dose|dosage)\s*(?:\(\s*units?\s*\))?\s*[:\-]?\s*{NUMBER}\s*(?:units?|iu|u)?\b"),
            Measurement(Measure::InsulinDose),
            0.95,
        ),
        (
            F::InsulinDose,
            format!(r"(?i)\b(?:tdd|total\s+daily\s+(?:insulin\s+)?dose)\s*[:\-]?\s*{NUMBER}"),
            Measurement(Measure::InsulinDose),
            0.85,
        ),
        (
            F::InsulinDose,
            format!(r"(?i)\b{NUMBER}\s*(?:units?|iu)\b[^\n]{{0,40}}?\binsulin\b"),
            Measurement(Measure::InsulinDose),
            0.7,
        ),
        (
            F::InsulinDose,
            format!(r"(?i)\binsulin\b[^\n]{{0,40}}?\b{NUMBER}\s*(?:units?|iu)\b"),
            Measurement(Measure::InsulinDose),
            0.65,
        ),
        // Target range
        (
            F::TargetRange,
            r"(?i)\b(?:target|goal)\s*(?:glucose|blood\s+sugar|bg)?\s*(?:range)?\s*[:\-]?\s*(?P<low>\d{2,3})\s*(?:-|–|to)\s*(?P<high>\d{2,3})".into(),
            Range,
            0.9,
        ),
        (
            F::TargetRange,
            r"(?i)\b(?:keep|maintain)\s+(?:blood\s+)?(?:glucose|sugar|bg)\s+(?:levels?\s+)?(?:between\s+)?(?P<low>\d{2,3})\s*(?:-|–|to|and)\s*(?P<high>\d{2,3})".into(),
            Range,
            0.7,
        ),
        (
            F::TargetRange,
            r"(?i)\b(?P<low>\d{2,3})\s*(?:-|–|to)\s*(?P<high>\d{2,3})\s*mg\s*/\s*dl\b".into(),
            Range,
            0.5,
        ),
    ];

    specs
        .into_iter()
        .map(|(field, pattern, extraction, confidence)| {
            FieldRule::new(field, &pattern, extraction, confidence)
        })
        .collect()
}
