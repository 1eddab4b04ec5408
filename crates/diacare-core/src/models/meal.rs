//! Meal analysis models.

use serde::{Deserialize, Serialize};

use super::food::{ImpactLevel, Nutrition};

/// Meal of the day a description belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl std::str::FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" | "supper" => Ok(MealType::Dinner),
            "snack" | "snacks" => Ok(MealType::Snack),
            other => Err(format!("unknown meal type: {}", other)),
        }
    }
}

/// A dish recognized in a meal description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DishItem {
    /// Name as it appeared in the (normalized) description
    pub dish_name: String,
    /// Canonical food table name
    pub normalized_name: String,
    /// Effective quantity (stated quantity x portion multiplier)
    pub quantity: f64,
    /// Counting unit of the reference portion
    pub unit: String,
    pub estimated_weight_grams: f64,
    pub ingredients: Vec<String>,
    pub nutrition: Nutrition,
    pub impact_level: ImpactLevel,
    pub glycemic_index: Option<u8>,
}

/// Aggregate nutrition of a meal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub fiber: f64,
    pub calories: f64,
    pub overall_impact_level: ImpactLevel,
}

impl Totals {
    /// Zeroed totals reported for unrecognized meals.
    pub fn empty() -> Self {
        Self {
            carbs: 0.0,
            protein: 0.0,
            fat: 0.0,
            fiber: 0.0,
            calories: 0.0,
            overall_impact_level: ImpactLevel::Medium,
        }
    }

    /// Sum item nutrition. Overall impact is the highest item impact.
    pub fn from_items(items: &[DishItem]) -> Self {
        let sum = items
            .iter()
            .fold(Nutrition::default(), |acc, item| acc + item.nutrition);
        let overall_impact_level = items
            .iter()
            .map(|item| item.impact_level)
            .max()
            .unwrap_or(ImpactLevel::Medium);

        Self {
            carbs: sum.carbs,
            protein: sum.protein,
            fat: sum.fat,
            fiber: sum.fiber,
            calories: sum.calories,
            overall_impact_level,
        }
    }
}

/// Qualitative summary shown alongside the numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthImpact {
    pub category: ImpactLevel,
    pub description: String,
}

/// Typed reason a meal could not be analyzed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MealAnalysisError {
    UnknownDish,
}

impl MealAnalysisError {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealAnalysisError::UnknownDish => "unknown_dish",
        }
    }
}

/// Result of analyzing one free-text meal description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealAnalysisResult {
    pub meal_name: String,
    pub meal_type: Option<MealType>,
    pub items: Vec<DishItem>,
    pub totals: Totals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_impact: Option<HealthImpact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benefits: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cautions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<MealAnalysisError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Closest known dish names when nothing was recognized
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl MealAnalysisResult {
    /// Whether at least one dish was recognized.
    pub fn is_recognized(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, carbs: f64, impact: ImpactLevel) -> DishItem {
        DishItem {
            dish_name: name.into(),
            normalized_name: name.into(),
            quantity: 1.0,
            unit: "piece".into(),
            estimated_weight_grams: 40.0,
            ingredients: vec![],
            nutrition: Nutrition::new(carbs, 1.0, 1.0, 1.0, 50.0),
            impact_level: impact,
            glycemic_index: None,
        }
    }

    #[test]
    fn test_totals_sum_items() {
        let items = vec![
            item("chapati", 30.0, ImpactLevel::Medium),
            item("dal", 18.0, ImpactLevel::Low),
        ];
        let totals = Totals::from_items(&items);
        assert_eq!(totals.carbs, 48.0);
        assert_eq!(totals.calories, 100.0);
        assert_eq!(totals.overall_impact_level, ImpactLevel::Medium);
    }

    #[test]
    fn test_totals_overall_is_max() {
        let items = vec![
            item("salad", 7.0, ImpactLevel::Low),
            item("naan", 45.0, ImpactLevel::High),
        ];
        assert_eq!(Totals::from_items(&items).overall_impact_level, ImpactLevel::High);

        let low_only = vec![item("salad", 7.0, ImpactLevel::Low)];
        assert_eq!(Totals::from_items(&low_only).overall_impact_level, ImpactLevel::Low);
    }

    #[test]
    fn test_meal_type_from_str() {
        assert_eq!("Lunch".parse::<MealType>(), Ok(MealType::Lunch));
        assert_eq!("supper".parse::<MealType>(), Ok(MealType::Dinner));
        assert!("brunch".parse::<MealType>().is_err());
    }

    #[test]
    fn test_error_serializes_snake_case() {
        let json = serde_json::to_string(&MealAnalysisError::UnknownDish).unwrap();
        assert_eq!(json, "\"unknown_dish\"");
    }
}
