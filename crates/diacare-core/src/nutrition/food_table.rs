//! Static food lookup table.
//!
//! Nutrition values are per reference portion and are rough household
//! estimates, not laboratory figures.

use std::collections::HashSet;

use crate::models::{FoodEntry, ImpactLevel, Nutrition, Portion};

use super::TableError;

/// Ordered, immutable collection of foods.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodTable {
    entries: Vec<FoodEntry>,
}

impl Default for FoodTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FoodTable {
    /// Build a table from explicit entries.
    ///
    /// Names and synonyms are lowercased and must be unique across the table.
    pub fn new(entries: Vec<FoodEntry>) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(entries.len());

        for mut entry in entries {
            entry.name = entry.name.trim().to_lowercase();
            entry.synonyms = entry
                .synonyms
                .iter()
                .map(|s| s.trim().to_lowercase())
                .collect();

            for name in entry.names() {
                if name.is_empty() {
                    return Err(TableError::EmptyName);
                }
                if !seen.insert(name.to_string()) {
                    return Err(TableError::DuplicateName(name.to_string()));
                }
            }
            normalized.push(entry);
        }

        Ok(Self {
            entries: normalized,
        })
    }

    /// The built-in table.
    pub fn builtin() -> Self {
        Self {
            entries: default_entries(),
        }
    }

    /// Look up an entry by canonical name or synonym.
    pub fn get(&self, name: &str) -> Option<&FoodEntry> {
        let lower = name.trim().to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.names().any(|n| n == lower))
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[FoodEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[allow(clippy::too_many_arguments)]
fn food(
    name: &str,
    synonyms: &[&str],
    nutrition: Nutrition,
    glycemic_index: Option<u8>,
    impact: ImpactLevel,
    portion: (&str, &str, f64),
    ingredients: &[&str],
) -> FoodEntry {
    let (unit, description, grams) = portion;
    let mut entry = FoodEntry::new(
        name,
        nutrition,
        impact,
        Portion {
            unit: unit.into(),
            description: description.into(),
            grams,
        },
    );
    entry.synonyms = synonyms.iter().map(|s| s.to_string()).collect();
    entry.glycemic_index = glycemic_index;
    entry.ingredients = ingredients.iter().map(|s| s.to_string()).collect();
    entry
}

/// Default foods, grouped roughly by meal role.
fn default_entries() -> Vec<FoodEntry> {
    use ImpactLevel::{High, Low, Medium};
    let n = Nutrition::new;

    vec![
        // Grains and breads
        food(
            "rice",
            &["white rice", "steamed rice", "plain rice"],
            n(45.0, 4.0, 0.0, 1.0, 205.0),
            Some(73),
            High,
            ("cup", "1 cup cooked white rice", 150.0),
            &["rice", "water"],
        ),
        food(
            "brown rice",
            &[],
            n(45.0, 5.0, 2.0, 4.0, 215.0),
            Some(50),
            Medium,
            ("cup", "1 cup cooked brown rice", 150.0),
            &["brown rice", "water"],
        ),
        food(
            "chapati",
            &["roti", "phulka"],
            n(15.0, 3.0, 1.0, 2.0, 70.0),
            Some(52),
            Medium,
            ("piece", "1 medium chapati", 40.0),
            &["whole wheat flour", "water", "salt"],
        ),
        food(
            "paratha",
            &["aloo paratha"],
            n(30.0, 5.0, 10.0, 3.0, 230.0),
            Some(62),
            Medium,
            ("piece", "1 stuffed paratha", 90.0),
            &["whole wheat flour", "ghee", "potato", "spices"],
        ),
        food(
            "naan",
            &["butter naan"],
            n(45.0, 9.0, 5.0, 2.0, 260.0),
            Some(71),
            High,
            ("piece", "1 restaurant naan", 90.0),
            &["refined flour", "yogurt", "butter"],
        ),
        food(
            "puri",
            &["poori"],
            n(13.0, 2.0, 7.0, 1.0, 120.0),
            Some(70),
            High,
            ("piece", "1 deep fried puri", 30.0),
            &["whole wheat flour", "oil"],
        ),
        food(
            "bread",
            &["white bread", "toast"],
            n(13.0, 3.0, 1.0, 1.0, 75.0),
            Some(75),
            High,
            ("slice", "1 slice white bread", 28.0),
            &["refined flour", "yeast", "sugar"],
        ),
        food(
            "oats",
            &["oatmeal", "porridge"],
            n(27.0, 6.0, 3.0, 4.0, 160.0),
            Some(55),
            Medium,
            ("cup", "1 cup cooked oats", 240.0),
            &["rolled oats", "milk"],
        ),
        // South Indian
        food(
            "idli",
            &["idly"],
            n(8.0, 2.0, 0.0, 1.0, 39.0),
            Some(69),
            Medium,
            ("piece", "1 steamed idli", 40.0),
            &["rice", "urad dal"],
        ),
        food(
            "masala dosa",
            &[],
            n(50.0, 6.0, 10.0, 3.0, 300.0),
            Some(70),
            High,
            ("piece", "1 masala dosa with potato filling", 180.0),
            &["rice", "urad dal", "potato", "oil"],
        ),
        food(
            "dosa",
            &["plain dosa"],
            n(29.0, 4.0, 4.0, 1.0, 168.0),
            Some(66),
            Medium,
            ("piece", "1 plain dosa", 100.0),
            &["rice", "urad dal", "oil"],
        ),
        food(
            "sambar",
            &["sambhar"],
            n(12.0, 5.0, 3.0, 4.0, 100.0),
            Some(40),
            Low,
            ("bowl", "1 bowl sambar", 200.0),
            &["toor dal", "vegetables", "tamarind"],
        ),
        food(
            "upma",
            &[],
            n(30.0, 5.0, 7.0, 2.0, 200.0),
            Some(65),
            Medium,
            ("cup", "1 cup upma", 180.0),
            &["semolina", "vegetables", "oil"],
        ),
        food(
            "poha",
            &[],
            n(40.0, 4.0, 6.0, 2.0, 250.0),
            Some(64),
            Medium,
            ("plate", "1 plate poha", 180.0),
            &["flattened rice", "peanuts", "onion"],
        ),
        food(
            "curd rice",
            &[],
            n(35.0, 7.0, 5.0, 1.0, 210.0),
            Some(50),
            Medium,
            ("bowl", "1 bowl curd rice", 200.0),
            &["rice", "curd"],
        ),
        // Mixed rice dishes
        food(
            "biryani",
            &["chicken biryani", "veg biryani", "mutton biryani"],
            n(60.0, 18.0, 15.0, 2.0, 450.0),
            Some(70),
            High,
            ("plate", "1 plate biryani", 250.0),
            &["basmati rice", "meat or vegetables", "ghee", "spices"],
        ),
        food(
            "fried rice",
            &[],
            n(55.0, 8.0, 12.0, 2.0, 360.0),
            Some(70),
            High,
            ("plate", "1 plate fried rice", 220.0),
            &["rice", "vegetables", "soy sauce", "oil"],
        ),
        food(
            "khichdi",
            &["khichri"],
            n(40.0, 9.0, 5.0, 4.0, 240.0),
            Some(55),
            Medium,
            ("bowl", "1 bowl khichdi", 220.0),
            &["rice", "moong dal", "ghee"],
        ),
        // Lentils and legumes
        food(
            "dal",
            &["lentil curry", "lentils", "dal tadka", "dal fry"],
            n(18.0, 9.0, 4.0, 5.0, 150.0),
            Some(29),
            Low,
            ("bowl", "1 bowl cooked dal", 150.0),
            &["lentils", "turmeric", "cumin", "ghee"],
        ),
        food(
            "rajma",
            &["kidney beans", "rajma masala"],
            n(30.0, 12.0, 5.0, 10.0, 210.0),
            Some(29),
            Low,
            ("bowl", "1 bowl rajma", 180.0),
            &["kidney beans", "tomato", "onion"],
        ),
        food(
            "chole",
            &["chana masala", "chickpea curry", "chickpeas"],
            n(35.0, 12.0, 8.0, 10.0, 270.0),
            Some(33),
            Low,
            ("bowl", "1 bowl chole", 180.0),
            &["chickpeas", "tomato", "onion", "spices"],
        ),
        // Vegetables, dairy and protein
        food(
            "vegetable curry",
            &["sabzi", "mixed vegetables", "veg curry"],
            n(15.0, 4.0, 7.0, 5.0, 140.0),
            Some(35),
            Low,
            ("bowl", "1 bowl vegetable curry", 150.0),
            &["seasonal vegetables", "onion", "oil"],
        ),
        food(
            "salad",
            &["green salad"],
            n(7.0, 2.0, 0.0, 3.0, 40.0),
            Some(15),
            Low,
            ("bowl", "1 bowl salad", 100.0),
            &["cucumber", "tomato", "onion", "lettuce"],
        ),
        food(
            "curd",
            &["yogurt", "yoghurt", "raita"],
            n(5.0, 8.0, 4.0, 0.0, 100.0),
            Some(36),
            Low,
            ("cup", "1 cup plain curd", 200.0),
            &["milk", "culture"],
        ),
        food(
            "paneer",
            &["paneer curry", "cottage cheese"],
            n(4.0, 18.0, 20.0, 0.0, 265.0),
            Some(27),
            Low,
            ("serving", "100 g paneer", 100.0),
            &["milk"],
        ),
        food(
            "chicken curry",
            &["butter chicken", "chicken"],
            n(8.0, 25.0, 15.0, 1.0, 260.0),
            None,
            Low,
            ("bowl", "1 bowl chicken curry", 200.0),
            &["chicken", "tomato", "onion", "spices"],
        ),
        food(
            "fish curry",
            &["fish"],
            n(6.0, 22.0, 10.0, 1.0, 200.0),
            None,
            Low,
            ("bowl", "1 bowl fish curry", 200.0),
            &["fish", "coconut", "tamarind"],
        ),
        food(
            "egg",
            &["boiled egg", "omelette", "omelet"],
            n(1.0, 6.0, 5.0, 0.0, 78.0),
            None,
            Low,
            ("piece", "1 large egg", 50.0),
            &["egg"],
        ),
        food(
            "milk",
            &[],
            n(12.0, 8.0, 8.0, 0.0, 150.0),
            Some(31),
            Low,
            ("glass", "1 glass whole milk", 240.0),
            &["milk"],
        ),
        // Snacks, fruit and sweets
        food(
            "samosa",
            &[],
            n(24.0, 4.0, 17.0, 2.0, 260.0),
            Some(70),
            High,
            ("piece", "1 samosa", 100.0),
            &["refined flour", "potato", "peas", "oil"],
        ),
        food(
            "pakora",
            &["pakoda", "bhaji"],
            n(20.0, 5.0, 12.0, 3.0, 200.0),
            Some(60),
            Medium,
            ("serving", "4 pakoras", 80.0),
            &["gram flour", "onion", "oil"],
        ),
        food(
            "banana",
            &[],
            n(27.0, 1.0, 0.0, 3.0, 105.0),
            Some(51),
            Medium,
            ("piece", "1 medium banana", 118.0),
            &["banana"],
        ),
        food(
            "apple",
            &[],
            n(25.0, 0.0, 0.0, 4.0, 95.0),
            Some(36),
            Low,
            ("piece", "1 medium apple", 180.0),
            &["apple"],
        ),
        food(
            "tea",
            &["chai", "masala chai"],
            n(10.0, 2.0, 2.0, 0.0, 70.0),
            None,
            Medium,
            ("cup", "1 cup tea with milk and sugar", 150.0),
            &["tea", "milk", "sugar"],
        ),
        food(
            "gulab jamun",
            &[],
            n(25.0, 2.0, 7.0, 0.0, 175.0),
            Some(80),
            High,
            ("piece", "1 gulab jamun in syrup", 50.0),
            &["milk solids", "sugar syrup", "ghee"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_valid() {
        let table = FoodTable::builtin();
        let rebuilt = FoodTable::new(table.entries().to_vec());
        assert!(rebuilt.is_ok());
        assert!(table.len() > 30);
    }

    #[test]
    fn test_lookup_by_synonym() {
        let table = FoodTable::builtin();
        assert_eq!(table.get("roti").map(|e| e.name.as_str()), Some("chapati"));
        assert_eq!(table.get("Chapati").map(|e| e.name.as_str()), Some("chapati"));
        assert!(table.get("pizza").is_none());
    }

    #[test]
    fn test_reference_values() {
        let table = FoodTable::builtin();
        let chapati = table.get("chapati").unwrap();
        assert_eq!(chapati.nutrition.carbs, 15.0);
        assert_eq!(chapati.impact, ImpactLevel::Medium);

        let dal = table.get("dal").unwrap();
        assert_eq!(dal.nutrition.carbs, 18.0);
        assert_eq!(dal.impact, ImpactLevel::Low);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let table = FoodTable::builtin();
        let mut entries = table.entries().to_vec();
        let mut dup = entries[0].clone();
        dup.name = "something else".into();
        dup.synonyms = vec!["ROTI".into()];
        entries.push(dup);

        assert!(matches!(
            FoodTable::new(entries),
            Err(TableError::DuplicateName(name)) if name == "roti"
        ));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut entry = FoodTable::builtin().entries()[0].clone();
        entry.name = "  ".into();
        assert!(matches!(FoodTable::new(vec![entry]), Err(TableError::EmptyName)));
    }
}
