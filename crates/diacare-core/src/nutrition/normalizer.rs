//! Regional dish name normalizer.
//!
//! Rewrites colloquial and regional (Hindi, Telugu, Tamil, Kannada,
//! Malayalam, Bengali) dish names to the canonical names used by the food
//! table. Longer phrases are replaced before shorter ones so "annam pappu"
//! becomes "dal rice" rather than "rice dal". Overlaps between languages are
//! resolved by length alone; there is no language detection.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use super::TableError;

static BUILTIN: LazyLock<RegionalNormalizer> = LazyLock::new(|| {
    RegionalNormalizer::from_mappings(default_mappings())
        .expect("built-in regional mappings compile")
});

/// Normalize `text` with the built-in regional mapping.
pub fn normalize_regional(text: &str) -> String {
    BUILTIN.normalize(text)
}

/// A compiled phrase replacement.
#[derive(Debug, Clone)]
struct Replacement {
    phrase: String,
    canonical: String,
    regex: Regex,
}

/// Normalizer for meal descriptions.
#[derive(Debug, Clone)]
pub struct RegionalNormalizer {
    /// Sorted by descending phrase length
    replacements: Vec<Replacement>,
}

impl Default for RegionalNormalizer {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RegionalNormalizer {
    /// The normalizer with the built-in regional mapping.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Build a normalizer from `(regional phrase, canonical phrase)` pairs.
    pub fn from_mappings<I, S>(mappings: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut replacements = Vec::new();
        for (phrase, canonical) in mappings {
            let phrase = phrase.as_ref().trim().to_lowercase();
            if phrase.is_empty() {
                return Err(TableError::EmptyName);
            }
            let regex = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(&phrase)))
                .case_insensitive(true)
                .build()?;
            replacements.push(Replacement {
                phrase,
                canonical: canonical.as_ref().trim().to_lowercase(),
                regex,
            });
        }

        // Stable sort keeps declaration order among equal lengths.
        replacements.sort_by(|a, b| b.phrase.chars().count().cmp(&a.phrase.chars().count()));

        Ok(Self { replacements })
    }

    /// Lowercase `text` and replace every known regional phrase.
    pub fn normalize(&self, text: &str) -> String {
        let mut normalized = text.to_lowercase();
        for replacement in &self.replacements {
            if replacement.regex.is_match(&normalized) {
                normalized = replacement
                    .regex
                    .replace_all(&normalized, regex::NoExpand(&replacement.canonical))
                    .into_owned();
            }
        }
        normalized
    }

    /// Canonical phrase for a regional phrase, if known.
    pub fn canonical_for(&self, phrase: &str) -> Option<&str> {
        let lower = phrase.trim().to_lowercase();
        self.replacements
            .iter()
            .find(|r| r.phrase == lower)
            .map(|r| r.canonical.as_str())
    }

    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }
}

/// Default regional mappings.
fn default_mappings() -> Vec<(&'static str, &'static str)> {
    vec![
        // Spelling variants
        ("chapathi", "chapati"),
        ("chappati", "chapati"),
        ("dhal", "dal"),
        ("daal", "dal"),
        ("biriyani", "biryani"),
        ("channa", "chole"),
        ("chana", "chole"),
        // Hindi
        ("dal chawal", "dal rice"),
        ("chawal", "rice"),
        ("dahi", "curd"),
        ("anda", "egg"),
        ("doodh", "milk"),
        ("kela", "banana"),
        // Telugu
        ("annam pappu", "dal rice"),
        ("perugu annam", "curd rice"),
        ("annam", "rice"),
        ("pappu", "dal"),
        ("perugu", "curd"),
        ("kura", "vegetable curry"),
        ("pesarattu", "dosa"),
        // Tamil
        ("thayir sadam", "curd rice"),
        ("sadam", "rice"),
        ("saadam", "rice"),
        ("paruppu", "dal"),
        ("thayir", "curd"),
        ("kuzhambu", "sambar"),
        ("kootu", "vegetable curry"),
        ("thosai", "dosa"),
        ("muttai", "egg"),
        // Kannada
        ("mosaru anna", "curd rice"),
        ("anna", "rice"),
        ("saaru", "sambar"),
        ("mosaru", "curd"),
        ("palya", "vegetable curry"),
        // Malayalam
        ("meen curry", "fish curry"),
        ("choru", "rice"),
        ("parippu", "dal"),
        ("thoran", "vegetable curry"),
        // Bengali
        ("dal bhaat", "dal rice"),
        ("maacher jhol", "fish curry"),
        ("bhaat", "rice"),
        ("doi", "curd"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_word_phrase_before_parts() {
        let normalizer = RegionalNormalizer::builtin();
        assert_eq!(normalizer.normalize("Annam Pappu"), "dal rice");
        assert_eq!(normalizer.normalize("thayir sadam"), "curd rice");
    }

    #[test]
    fn test_single_words() {
        let normalizer = RegionalNormalizer::builtin();
        assert_eq!(normalizer.normalize("2 chapathi with daal"), "2 chapati with dal");
        assert_eq!(normalizer.normalize("pappu and annam"), "dal and rice");
    }

    #[test]
    fn test_whole_word_only() {
        let normalizer = RegionalNormalizer::builtin();
        // "anna" must not fire inside "annapurna" or "banana"
        assert_eq!(normalizer.normalize("Annapurna banana"), "annapurna banana");
        assert_eq!(normalizer.normalize("kurakkan"), "kurakkan");
    }

    #[test]
    fn test_unknown_text_is_lowercased() {
        let normalizer = RegionalNormalizer::builtin();
        assert_eq!(normalizer.normalize("Chicken Curry"), "chicken curry");
    }

    #[test]
    fn test_idempotent_on_examples() {
        let normalizer = RegionalNormalizer::builtin();
        for input in [
            "annam pappu perugu",
            "dal chawal with dahi",
            "pappu chawal",
            "meen kura",
            "mosaru anna and saaru",
            "maacher jhol bhaat",
        ] {
            let once = normalizer.normalize(input);
            assert_eq!(normalizer.normalize(&once), once, "input: {}", input);
        }
    }

    #[test]
    fn test_custom_mappings() {
        let normalizer =
            RegionalNormalizer::from_mappings(vec![("nasi", "rice"), ("nasi lemak", "coconut rice")])
                .unwrap();
        assert_eq!(normalizer.normalize("Nasi Lemak"), "coconut rice");
        assert_eq!(normalizer.normalize("nasi"), "rice");
        assert_eq!(normalizer.canonical_for("NASI"), Some("rice"));
        assert_eq!(normalizer.len(), 2);
    }

    #[test]
    fn test_empty_phrase_rejected() {
        let result = RegionalNormalizer::from_mappings(vec![(" ", "rice")]);
        assert!(matches!(result, Err(TableError::EmptyName)));
    }
}
