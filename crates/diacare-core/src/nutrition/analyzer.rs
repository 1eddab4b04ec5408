//! Meal analyzer: free-text description → recognized dishes and totals.
//!
//! Matching is whole-word against every canonical name and synonym in the
//! food table. Longer names are tried first and their spans are consumed, so
//! "fried rice" is never also counted as "rice". A dish is counted once even
//! if it is mentioned several times (first mention wins).

use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use strsim::{jaro_winkler, normalized_levenshtein};
use tracing::{debug, warn};

use crate::models::{
    DishItem, FoodEntry, MealAnalysisError, MealAnalysisResult, MealType, Nutrition, Totals,
};

use super::{build_narrative, FoodTable, RegionalNormalizer, TableResult};

/// Optional leading quantity: "2", "1.5", "1/2", "1 1/2", "½", "two", "half",
/// with an optional size word and serving unit ("2 large bowls of").
const QUANTITY_PREFIX: &str = r"(?:(?P<qty>\b(?:\d+\s+\d+/\d+|\d+/\d+|\d+(?:\.\d+)?|one|two|three|four|five|six|seven|eight|nine|ten|half|a couple of)|[½¼¾])\s*(?:(?:small|medium|large|big)\s+)?(?:(?:pieces?|plates?|bowls?|cups?|katoris?|servings?|glass(?:es)?|slices?|helpings?)\s+(?:of\s+)?)?)?";

/// Minimum fuzzy score for a dish name to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.80;

/// Number of suggestions returned for unrecognized meals.
const MAX_SUGGESTIONS: usize = 3;

static BUILTIN: LazyLock<MealAnalyzer> = LazyLock::new(|| {
    MealAnalyzer::with_tables(FoodTable::builtin(), RegionalNormalizer::builtin())
        .expect("built-in food table compiles")
});

/// Cooking method hint supplied alongside a description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookingStyle {
    Regular,
    Fried,
    Steamed,
    Grilled,
}

impl CookingStyle {
    /// Interpret a free-text cooking hint.
    pub fn from_hint(hint: &str) -> Self {
        let lower = hint.to_lowercase();
        if lower.contains("deep") || lower.contains("fried") || lower.contains("fry") {
            CookingStyle::Fried
        } else if lower.contains("steam") || lower.contains("boil") {
            CookingStyle::Steamed
        } else if ["grill", "bake", "roast", "tandoor"]
            .iter()
            .any(|k| lower.contains(k))
        {
            CookingStyle::Grilled
        } else {
            CookingStyle::Regular
        }
    }

    /// Adjust reference nutrition for this cooking method.
    pub fn adjust(&self, nutrition: Nutrition) -> Nutrition {
        match self {
            CookingStyle::Regular => nutrition,
            CookingStyle::Fried => Nutrition {
                fat: nutrition.fat * 1.4,
                calories: nutrition.calories * 1.15,
                ..nutrition
            },
            CookingStyle::Steamed => Nutrition {
                fat: nutrition.fat * 0.8,
                ..nutrition
            },
            CookingStyle::Grilled => Nutrition {
                fat: nutrition.fat * 0.9,
                ..nutrition
            },
        }
    }
}

/// Per-request analysis options.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    /// Multiplies every stated quantity (default 1)
    pub portion_multiplier: f64,
    pub cooking_style: Option<String>,
    pub meal_type: Option<MealType>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            portion_multiplier: 1.0,
            cooking_style: None,
            meal_type: None,
        }
    }
}

impl AnalysisOptions {
    /// The portion multiplier, or 1 when it is not a positive number.
    pub fn effective_multiplier(&self) -> f64 {
        if self.portion_multiplier.is_finite() && self.portion_multiplier > 0.0 {
            self.portion_multiplier
        } else {
            warn!(
                portion_multiplier = self.portion_multiplier,
                "Invalid portion multiplier, using 1"
            );
            1.0
        }
    }
}

/// A compiled name pattern pointing back at its table entry.
#[derive(Debug, Clone)]
struct NamePattern {
    entry: usize,
    name_len: usize,
    regex: Regex,
}

/// A dish found in the description.
#[derive(Debug, Clone)]
struct DishMatch {
    position: usize,
    entry: usize,
    dish_name: String,
    stated_quantity: f64,
}

/// Analyzer for free-text meal descriptions.
#[derive(Debug, Clone)]
pub struct MealAnalyzer {
    table: FoodTable,
    normalizer: RegionalNormalizer,
    /// Sorted by descending name length
    patterns: Vec<NamePattern>,
}

impl Default for MealAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl MealAnalyzer {
    /// Analyzer over the built-in food table and regional mapping.
    pub fn new() -> Self {
        BUILTIN.clone()
    }

    /// Analyzer over custom tables.
    pub fn with_tables(table: FoodTable, normalizer: RegionalNormalizer) -> TableResult<Self> {
        let mut patterns = Vec::new();
        for (index, entry) in table.entries().iter().enumerate() {
            for name in entry.names() {
                patterns.push(NamePattern {
                    entry: index,
                    name_len: name.chars().count(),
                    regex: Regex::new(&dish_pattern(name))?,
                });
            }
        }
        patterns.sort_by(|a, b| b.name_len.cmp(&a.name_len));

        Ok(Self {
            table,
            normalizer,
            patterns,
        })
    }

    /// Analyze a meal description.
    pub fn analyze(&self, description: &str, options: &AnalysisOptions) -> MealAnalysisResult {
        let meal_name = description.trim().to_string();
        let normalized = self.normalizer.normalize(description);
        let multiplier = options.effective_multiplier();
        let style = options
            .cooking_style
            .as_deref()
            .map(CookingStyle::from_hint)
            .unwrap_or(CookingStyle::Regular);

        let mut matches = self.match_dishes(&normalized);
        if matches.is_empty() {
            debug!(description = %meal_name, "No dishes recognized");
            return self.unknown_dish(meal_name, options.meal_type, &normalized);
        }
        matches.sort_by_key(|m| m.position);

        let items: Vec<DishItem> = matches
            .iter()
            .map(|m| self.build_item(m, multiplier, style))
            .collect();
        let totals = Totals::from_items(&items);
        let narrative = build_narrative(&normalized, options.cooking_style.as_deref(), &totals);

        debug!(
            items = items.len(),
            carbs = totals.carbs,
            impact = %totals.overall_impact_level,
            "Meal analyzed"
        );

        MealAnalysisResult {
            meal_name,
            meal_type: options.meal_type,
            items,
            totals,
            health_impact: Some(narrative.health_impact),
            benefits: Some(narrative.benefits),
            cautions: non_empty(narrative.cautions),
            alternatives: non_empty(narrative.alternatives),
            error: None,
            message: None,
            suggestions: Vec::new(),
        }
    }

    /// Normalize a description with this analyzer's regional mapping.
    pub fn normalize(&self, description: &str) -> String {
        self.normalizer.normalize(description)
    }

    /// Get the food table for direct access.
    pub fn table(&self) -> &FoodTable {
        &self.table
    }

    /// Get the normalizer for direct access.
    pub fn normalizer(&self) -> &RegionalNormalizer {
        &self.normalizer
    }

    /// Find each dish once, consuming matched spans longest-name first.
    fn match_dishes(&self, text: &str) -> Vec<DishMatch> {
        let mut consumed: Vec<Range<usize>> = Vec::new();
        let mut seen: HashSet<usize> = HashSet::new();
        let mut matches = Vec::new();

        for pattern in &self.patterns {
            if seen.contains(&pattern.entry) {
                continue;
            }

            for caps in pattern.regex.captures_iter(text) {
                let (Some(whole), Some(name)) = (caps.get(0), caps.name("name")) else {
                    continue;
                };
                if consumed.iter().any(|span| overlaps(span, &name.range())) {
                    continue;
                }

                let stated_quantity = caps
                    .name("qty")
                    .and_then(|q| parse_quantity(q.as_str()))
                    .unwrap_or(1.0);

                consumed.push(whole.range());
                seen.insert(pattern.entry);
                matches.push(DishMatch {
                    position: whole.start(),
                    entry: pattern.entry,
                    dish_name: name.as_str().to_string(),
                    stated_quantity,
                });
                break;
            }
        }

        matches
    }

    fn build_item(&self, m: &DishMatch, multiplier: f64, style: CookingStyle) -> DishItem {
        let entry: &FoodEntry = &self.table.entries()[m.entry];
        let quantity = m.stated_quantity * multiplier;
        let nutrition = style.adjust(entry.nutrition.scaled(quantity)).rounded();

        DishItem {
            dish_name: m.dish_name.clone(),
            normalized_name: entry.name.clone(),
            quantity,
            unit: entry.portion.unit.clone(),
            estimated_weight_grams: (entry.portion.grams * quantity).round(),
            ingredients: entry.ingredients.clone(),
            nutrition,
            impact_level: entry.impact,
            glycemic_index: entry.glycemic_index,
        }
    }

    fn unknown_dish(
        &self,
        meal_name: String,
        meal_type: Option<MealType>,
        normalized: &str,
    ) -> MealAnalysisResult {
        let suggestions = self.suggest(normalized);
        let mut message = format!(
            "Could not recognise any dishes in \"{}\". Try dish names such as \"2 chapati with dal\", \"idli sambar\" or \"rice and rajma\".",
            meal_name
        );
        if !suggestions.is_empty() {
            message.push_str(&format!(" Did you mean: {}?", suggestions.join(", ")));
        }

        MealAnalysisResult {
            meal_name,
            meal_type,
            items: Vec::new(),
            totals: Totals::empty(),
            health_impact: None,
            benefits: None,
            cautions: None,
            alternatives: None,
            error: Some(MealAnalysisError::UnknownDish),
            message: Some(message),
            suggestions,
        }
    }

    /// Closest canonical dish names to the words of an unrecognized description.
    fn suggest(&self, normalized: &str) -> Vec<String> {
        let tokens: Vec<&str> = normalized
            .split(|c: char| !c.is_alphabetic())
            .filter(|t| t.chars().count() >= 3)
            .collect();

        let mut scored: Vec<(f64, &str)> = Vec::new();
        for entry in self.table.entries() {
            let best = entry
                .names()
                .flat_map(|name| tokens.iter().map(move |t| fuzzy_match(t, name)))
                .fold(0.0_f64, f64::max);
            if best >= SUGGESTION_THRESHOLD {
                scored.push((best, entry.name.as_str()));
            }
        }

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, name)| name.to_string())
            .collect()
    }
}

/// Regex for an optional quantity followed by a whole-word dish name.
/// Plural "s"/"es" is tolerated and multi-word names accept any whitespace.
fn dish_pattern(name: &str) -> String {
    let words: Vec<String> = name.split_whitespace().map(regex::escape).collect();
    format!(
        r"{}\b(?P<name>{})(?:e?s)?\b",
        QUANTITY_PREFIX,
        words.join(r"\s+")
    )
}

fn parse_quantity(text: &str) -> Option<f64> {
    let value = match text {
        "half" | "½" => 0.5,
        "¼" => 0.25,
        "¾" => 0.75,
        "one" => 1.0,
        "two" | "a couple of" => 2.0,
        "three" => 3.0,
        "four" => 4.0,
        "five" => 5.0,
        "six" => 6.0,
        "seven" => 7.0,
        "eight" => 8.0,
        "nine" => 9.0,
        "ten" => 10.0,
        numeric => parse_numeric(numeric)?,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Decimal, simple fraction ("1/2") or mixed number ("1 1/2").
fn parse_numeric(text: &str) -> Option<f64> {
    let mut total = 0.0;
    for part in text.split_whitespace() {
        total += match part.split_once('/') {
            Some((numerator, denominator)) => {
                let denominator: f64 = denominator.parse().ok()?;
                if denominator == 0.0 {
                    return None;
                }
                numerator.parse::<f64>().ok()? / denominator
            }
            None => part.parse::<f64>().ok()?,
        };
    }
    Some(total)
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

fn non_empty(list: Vec<String>) -> Option<Vec<String>> {
    (!list.is_empty()).then_some(list)
}

/// Compute fuzzy string similarity using combined metrics.
fn fuzzy_match(a: &str, b: &str) -> f64 {
    // Jaro-Winkler favours shared prefixes, Levenshtein overall similarity
    jaro_winkler(a, b) * 0.6 + normalized_levenshtein(a, b) * 0.4
}
