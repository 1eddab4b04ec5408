//! Qualitative health-impact narrative for an analyzed meal.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{HealthImpact, ImpactLevel, Totals};

/// Carbs above which the meal gets a high-carb caution.
pub const HIGH_CARB_CAUTION_GRAMS: f64 = 60.0;

/// Carbs above which a post-meal walk is suggested.
pub const WALK_SUGGESTION_GRAMS: f64 = 50.0;

/// Fiber at or above which the meal gets a fiber benefit.
pub const FIBER_BENEFIT_GRAMS: f64 = 5.0;

/// Protein at or above which the meal gets a protein benefit.
pub const PROTEIN_BENEFIT_GRAMS: f64 = 20.0;

static FRIED: LazyLock<Regex> = LazyLock::new(|| keyword(r"fried"));
static FRIED_STYLE: LazyLock<Regex> = LazyLock::new(|| keyword(r"deep|fried"));
static LENTILS: LazyLock<Regex> = LazyLock::new(|| keyword(r"dals?|lentils?"));
static VEGETABLES: LazyLock<Regex> = LazyLock::new(|| keyword(r"vegetables?|salads?"));

/// Whole-word, case-insensitive alternation.
fn keyword(alternation: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("keyword pattern compiles")
}

const FALLBACK_BENEFIT: &str =
    "Logging meals regularly helps you and your doctor spot glucose patterns";

/// Narrative fields derived from a meal.
#[derive(Debug, Clone, PartialEq)]
pub struct Narrative {
    pub health_impact: HealthImpact,
    /// Never empty
    pub benefits: Vec<String>,
    pub cautions: Vec<String>,
    pub alternatives: Vec<String>,
}

/// Derive the narrative from the normalized description, the cooking style
/// hint and the meal totals.
pub fn build_narrative(description: &str, cooking_style: Option<&str>, totals: &Totals) -> Narrative {
    let style = cooking_style.unwrap_or_default();

    let mut benefits = Vec::new();
    let mut cautions = Vec::new();
    let mut alternatives = Vec::new();

    if totals.carbs > HIGH_CARB_CAUTION_GRAMS {
        cautions.push(format!(
            "High carbohydrate content ({:.0}g) may cause a significant glucose spike",
            totals.carbs
        ));
        alternatives.push(
            "Reduce the portion of rice or bread by a third and add more vegetables".to_string(),
        );
    }

    if FRIED.is_match(description) || FRIED_STYLE.is_match(style) {
        cautions.push("Fried food is high in oil, which can slow glucose recovery and add calories".to_string());
        alternatives.push("Try grilled, steamed or air-fried versions of the same dish".to_string());
    }

    if LENTILS.is_match(description) {
        benefits.push("Lentils provide plant protein and slow-release carbohydrates".to_string());
    }

    if VEGETABLES.is_match(description) {
        benefits.push("Vegetables add fiber, vitamins and minerals with few carbohydrates".to_string());
    }

    if totals.fiber >= FIBER_BENEFIT_GRAMS {
        benefits.push(format!(
            "Good fiber content ({:.0}g) helps slow glucose absorption",
            totals.fiber
        ));
    }

    if totals.protein >= PROTEIN_BENEFIT_GRAMS {
        benefits.push(format!(
            "Good protein content ({:.0}g) helps you stay full and steadies glucose",
            totals.protein
        ));
    }

    if totals.carbs > WALK_SUGGESTION_GRAMS {
        benefits.push("A 10-15 minute walk after this meal can help lower the glucose rise".to_string());
    }

    if benefits.is_empty() {
        benefits.push(FALLBACK_BENEFIT.to_string());
    }

    Narrative {
        health_impact: health_impact_for(totals.overall_impact_level),
        benefits,
        cautions,
        alternatives,
    }
}

fn health_impact_for(level: ImpactLevel) -> HealthImpact {
    let description = match level {
        ImpactLevel::Low => "This meal is likely to have a gentle effect on blood glucose.",
        ImpactLevel::Medium => {
            "This meal may cause a moderate rise in blood glucose. Check your levels two hours after eating."
        }
        ImpactLevel::High => {
            "This meal is likely to raise blood glucose significantly. Consider a smaller portion and monitor closely."
        }
    };

    HealthImpact {
        category: level,
        description: description.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(carbs: f64, protein: f64, fiber: f64, level: ImpactLevel) -> Totals {
        Totals {
            carbs,
            protein,
            fat: 5.0,
            fiber,
            calories: 300.0,
            overall_impact_level: level,
        }
    }

    #[test]
    fn test_high_carb_caution_and_walk() {
        let narrative = build_narrative("biryani", None, &totals(70.0, 10.0, 2.0, ImpactLevel::High));
        assert_eq!(narrative.cautions.len(), 1);
        assert!(narrative.cautions[0].contains("70g"));
        assert_eq!(narrative.alternatives.len(), 1);
        assert!(narrative.benefits.iter().any(|b| b.contains("walk")));
        assert_eq!(narrative.health_impact.category, ImpactLevel::High);
    }

    #[test]
    fn test_walk_without_caution_between_thresholds() {
        let narrative = build_narrative("rice", None, &totals(55.0, 4.0, 1.0, ImpactLevel::High));
        assert!(narrative.cautions.is_empty());
        assert!(narrative.benefits.iter().any(|b| b.contains("walk")));
    }

    #[test]
    fn test_fried_from_description_or_style() {
        let t = totals(20.0, 5.0, 1.0, ImpactLevel::Medium);
        let from_text = build_narrative("fried rice", None, &t);
        assert!(from_text.cautions.iter().any(|c| c.contains("oil")));

        let from_style = build_narrative("samosa", Some("Deep"), &t);
        assert!(from_style.cautions.iter().any(|c| c.contains("oil")));
        assert!(from_style.alternatives.iter().any(|a| a.contains("grilled")));
    }

    #[test]
    fn test_benefits_from_keywords_and_totals() {
        let narrative = build_narrative(
            "dal with vegetable curry",
            None,
            &totals(30.0, 22.0, 9.0, ImpactLevel::Low),
        );
        assert_eq!(narrative.benefits.len(), 4);
        assert!(narrative.cautions.is_empty());
    }

    #[test]
    fn test_keywords_match_whole_words() {
        let t = totals(20.0, 5.0, 1.0, ImpactLevel::Medium);
        let narrative = build_narrative("sandal unfried sweet", Some("undeep"), &t);
        assert_eq!(narrative.benefits, vec![FALLBACK_BENEFIT.to_string()]);
        assert!(narrative.cautions.is_empty());

        let narrative = build_narrative("Lentils and mixed salads", Some("deep-fried"), &t);
        assert_eq!(narrative.benefits.len(), 2);
        assert_eq!(narrative.cautions.len(), 1);
    }

    #[test]
    fn test_fallback_benefit() {
        let narrative = build_narrative("tea", None, &totals(10.0, 2.0, 0.0, ImpactLevel::Medium));
        assert_eq!(narrative.benefits, vec![FALLBACK_BENEFIT.to_string()]);
        assert!(narrative.cautions.is_empty());
        assert!(narrative.alternatives.is_empty());
    }
}
