//! Mock backend: synthetic analyses from fixed palettes, no network.

use rand::Rng;

use crate::types::{ImageMetadata, NormalizedAnalysis, Sentiment};

/// The object lists a mock analysis picks from.
pub const OBJECT_SETS: [&[&str]; 5] = [
    &["person", "car", "building", "tree", "sky"],
    &["dog", "grass", "ball", "fence", "house"],
    &["cat", "sofa", "window", "plant", "lamp"],
    &["laptop", "coffee cup", "desk", "notebook", "phone"],
    &["mountain", "lake", "forest", "clouds", "sun"],
];

/// The colour palettes a mock analysis picks from.
pub const COLOR_PALETTES: [&[&str]; 5] = [
    &["#1e90ff", "#87ceeb", "#f5f5f5"],
    &["#228b22", "#8fbc8f", "#deb887"],
    &["#ff6347", "#ffd700", "#ffa500"],
    &["#2f4f4f", "#708090", "#000000"],
    &["#ff69b4", "#dda0dd", "#fffacd"],
];

pub const SENTIMENTS: [Sentiment; 4] = [
    Sentiment::Positive,
    Sentiment::Neutral,
    Sentiment::Negative,
    Sentiment::Mixed,
];

pub const DESCRIPTIONS: [&str; 5] = [
    "A busy street scene with people walking past tall buildings.",
    "A dog playing with a ball on a sunny lawn in front of a house.",
    "A cozy living room with a cat resting on the sofa by the window.",
    "A tidy workspace with a laptop, a notebook and a cup of coffee.",
    "A calm mountain lake surrounded by forest under a partly cloudy sky.",
];

/// Used when the image header gives no dimensions.
const COMMON_RESOLUTIONS: [(u32, u32); 4] = [(1920, 1080), (1280, 720), (1024, 768), (800, 600)];

const MIN_CONFIDENCE: f32 = 0.70;

/// Generates plausible-looking analyses for demos and as the fallback result.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockBackend;

impl MockBackend {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, metadata: &ImageMetadata) -> NormalizedAnalysis {
        self.generate_with(&mut rand::thread_rng(), metadata)
    }

    pub fn generate_with<R: Rng>(
        &self,
        rng: &mut R,
        metadata: &ImageMetadata,
    ) -> NormalizedAnalysis {
        let objects = OBJECT_SETS[rng.gen_range(0..OBJECT_SETS.len())];
        let colors = COLOR_PALETTES[rng.gen_range(0..COLOR_PALETTES.len())];
        let sentiment = SENTIMENTS[rng.gen_range(0..SENTIMENTS.len())];
        let text = DESCRIPTIONS[rng.gen_range(0..DESCRIPTIONS.len())];
        let confidence = rng.gen_range(MIN_CONFIDENCE..=1.0);

        let mut metadata = metadata.clone();
        if metadata.width == 0 || metadata.height == 0 {
            let (width, height) = COMMON_RESOLUTIONS[rng.gen_range(0..COMMON_RESOLUTIONS.len())];
            metadata.width = width;
            metadata.height = height;
        }

        NormalizedAnalysis::new(
            objects.iter().map(|s| s.to_string()).collect(),
            colors.iter().map(|s| s.to_string()).collect(),
            sentiment,
            confidence,
            text,
            metadata,
        )
    }
}
