pub mod corpus;
pub mod fit;

use clap::ValueEnum;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use corpus::PassageTable;
pub use fit::fit_to_length;

/// Passage categories available in the embedded corpus
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    #[default]
    Quotes,
    Programming,
    Random,
    Literature,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Quotes,
        Category::Programming,
        Category::Random,
        Category::Literature,
    ];

    /// The category after this one, wrapping around
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Difficulty tiers, each mapped to a target passage length in characters
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    #[value(alias = "short")]
    Easy,
    #[default]
    Medium,
    #[value(alias = "long")]
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn target_len(self) -> usize {
        match self {
            Difficulty::Easy => 50,
            Difficulty::Medium => 100,
            Difficulty::Hard => 200,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|d| *d == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Pick a random passage for `category` and fit it to the difficulty's target length
pub fn select_text(category: Category, difficulty: Difficulty) -> String {
    select_text_with(&mut rand::thread_rng(), category, difficulty)
}

/// Same as [`select_text`] with an injected random source
pub fn select_text_with<R: Rng + ?Sized>(
    rng: &mut R,
    category: Category,
    difficulty: Difficulty,
) -> String {
    let table = PassageTable::for_category(category);
    table
        .passages
        .choose(rng)
        .map(|passage| fit_to_length(passage, difficulty.target_len()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_every_combination_yields_text_within_target() {
        let mut rng = StdRng::seed_from_u64(7);
        for category in Category::ALL {
            for difficulty in Difficulty::ALL {
                for _ in 0..10 {
                    let text = select_text_with(&mut rng, category, difficulty);
                    assert!(!text.is_empty());
                    assert!(text.chars().count() <= difficulty.target_len());
                    assert_eq!(text, text.trim_end());
                }
            }
        }
    }

    #[test]
    fn test_hard_texts_are_padded_towards_target() {
        let mut rng = StdRng::seed_from_u64(42);
        for category in Category::ALL {
            let text = select_text_with(&mut rng, category, Difficulty::Hard);
            // boundary truncation never drops below 70% of the target
            assert!(text.chars().count() >= 140, "{category}: {text}");
        }
    }

    #[test]
    fn test_seeded_selection_is_deterministic() {
        let a = select_text_with(&mut StdRng::seed_from_u64(3), Category::Random, Difficulty::Easy);
        let b = select_text_with(&mut StdRng::seed_from_u64(3), Category::Random, Difficulty::Easy);
        assert_eq!(a, b);
    }

    #[test]
    fn test_select_text_uses_thread_rng() {
        let text = select_text(Category::Quotes, Difficulty::Medium);
        assert!(!text.is_empty());
    }

    #[test]
    fn test_category_cycle_wraps() {
        assert_eq!(Category::Quotes.next(), Category::Programming);
        assert_eq!(Category::Literature.next(), Category::Quotes);
        assert_eq!(Difficulty::Hard.next(), Difficulty::Easy);
    }

    #[test]
    fn test_display_is_lowercase() {
        assert_eq!(Category::Programming.to_string(), "programming");
        assert_eq!(Difficulty::Easy.to_string(), "easy");
    }

    #[test]
    fn test_difficulty_aliases_parse() {
        assert_eq!(Difficulty::from_str("short", true), Ok(Difficulty::Easy));
        assert_eq!(Difficulty::from_str("long", true), Ok(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("medium", true), Ok(Difficulty::Medium));
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Category::Literature).unwrap();
        assert_eq!(json, "\"literature\"");
        let parsed: Difficulty = serde_json::from_str("\"hard\"").unwrap();
        assert_eq!(parsed, Difficulty::Hard);
    }
}
