//! Food table models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Expected blood-glucose effect of a food or a whole meal.
///
/// Ordered so that `max()` over a meal's items yields the overall level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl ImpactLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactLevel::Low => "low",
            ImpactLevel::Medium => "medium",
            ImpactLevel::High => "high",
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Macro-nutrient profile. Grams, except calories (kcal).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Nutrition {
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub fiber: f64,
    pub calories: f64,
}

impl Nutrition {
    pub const fn new(carbs: f64, protein: f64, fat: f64, fiber: f64, calories: f64) -> Self {
        Self {
            carbs,
            protein,
            fat,
            fiber,
            calories,
        }
    }

    /// Scale every field by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            carbs: self.carbs * factor,
            protein: self.protein * factor,
            fat: self.fat * factor,
            fiber: self.fiber * factor,
            calories: self.calories * factor,
        }
    }

    /// Round every field to the nearest whole gram/kcal.
    pub fn rounded(&self) -> Self {
        Self {
            carbs: self.carbs.round(),
            protein: self.protein.round(),
            fat: self.fat.round(),
            fiber: self.fiber.round(),
            calories: self.calories.round(),
        }
    }
}

impl std::ops::Add for Nutrition {
    type Output = Nutrition;

    fn add(self, rhs: Nutrition) -> Nutrition {
        Nutrition {
            carbs: self.carbs + rhs.carbs,
            protein: self.protein + rhs.protein,
            fat: self.fat + rhs.fat,
            fiber: self.fiber + rhs.fiber,
            calories: self.calories + rhs.calories,
        }
    }
}

/// The reference portion a food's nutrition values refer to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Portion {
    /// Counting unit (e.g., "piece", "bowl", "cup")
    pub unit: String,
    /// Human readable description (e.g., "1 medium chapati")
    pub description: String,
    /// Approximate weight of one reference portion
    pub grams: f64,
}

/// A single entry in the food lookup table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodEntry {
    /// Canonical dish name - unique key
    pub name: String,
    /// Alternative names matched to this entry
    pub synonyms: Vec<String>,
    /// Nutrition per reference portion
    pub nutrition: Nutrition,
    /// Glycemic index, when known
    pub glycemic_index: Option<u8>,
    pub impact: ImpactLevel,
    pub portion: Portion,
    pub ingredients: Vec<String>,
}

impl FoodEntry {
    /// Create an entry with the required fields.
    pub fn new(name: &str, nutrition: Nutrition, impact: ImpactLevel, portion: Portion) -> Self {
        Self {
            name: name.to_lowercase(),
            synonyms: Vec::new(),
            nutrition,
            glycemic_index: None,
            impact,
            portion,
            ingredients: Vec::new(),
        }
    }

    /// All names this entry answers to, canonical name first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.synonyms.iter().map(String::as_str))
    }
}
