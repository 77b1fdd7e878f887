//! Heuristic normalization of a free-text OpenAI answer.
//!
//! Everything here is keyword matching on the lowercased answer. Colours in
//! particular are placeholders: one random hex code per colour name the
//! answer mentions, not measured pixel colours.

use rand::Rng;

use crate::types::{ImageMetadata, NormalizedAnalysis, Sentiment};

/// Fixed confidence reported for OpenAI answers.
pub const OPENAI_CONFIDENCE: f32 = 0.85;

pub const POSITIVE_WORDS: &[&str] = &[
    "happy",
    "beautiful",
    "bright",
    "joy",
    "smiling",
    "pleasant",
    "peaceful",
    "vibrant",
    "cheerful",
    "lovely",
    "wonderful",
    "good",
];

pub const NEGATIVE_WORDS: &[&str] = &[
    "sad", "dark", "gloomy", "angry", "broken", "dirty", "fear", "danger", "damaged", "lonely",
    "bad", "ugly",
];

pub const OBJECT_VOCABULARY: &[&str] = &[
    "person",
    "people",
    "car",
    "dog",
    "cat",
    "tree",
    "building",
    "sky",
    "water",
    "house",
    "bird",
    "flower",
    "table",
    "chair",
    "computer",
    "phone",
    "book",
    "road",
    "mountain",
    "food",
];

pub const COLOR_NAMES: &[&str] = &[
    "red", "blue", "green", "yellow", "orange", "purple", "pink", "brown", "black", "white",
    "gray", "grey",
];

/// Build a normalized analysis from the model's answer.
pub fn normalize(text: &str, metadata: ImageMetadata) -> NormalizedAnalysis {
    normalize_with(&mut rand::thread_rng(), text, metadata)
}

pub fn normalize_with<R: Rng>(rng: &mut R, text: &str, metadata: ImageMetadata) -> NormalizedAnalysis {
    NormalizedAnalysis::new(
        extract_objects(text),
        placeholder_colors(rng, text),
        detect_sentiment(text),
        OPENAI_CONFIDENCE,
        text.trim(),
        metadata,
    )
}

/// Positive vs. negative keyword occurrence count; a tie is neutral.
pub fn detect_sentiment(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let count = |words: &[&str]| -> usize { words.iter().map(|w| lower.matches(w).count()).sum() };
    let positive = count(POSITIVE_WORDS);
    let negative = count(NEGATIVE_WORDS);

    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

/// Vocabulary words mentioned anywhere in the text, in vocabulary order.
pub fn extract_objects(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    OBJECT_VOCABULARY
        .iter()
        .filter(|word| lower.contains(*word))
        .map(|word| word.to_string())
        .collect()
}

/// One random `#rrggbb` per colour name mentioned in the text.
pub fn placeholder_colors<R: Rng>(rng: &mut R, text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    COLOR_NAMES
        .iter()
        .filter(|name| lower.contains(*name))
        .map(|_| format!("#{:06x}", rng.gen_range(0..=0xFF_FFFFu32)))
        .collect()
}
