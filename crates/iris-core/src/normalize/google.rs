//! Google Cloud Vision `images:annotate` response types and their
//! normalization.
//!
//! Unlike the OpenAI answer, this response is structured, so the mapping is
//! direct: labels become objects, dominant colours become `rgb()` strings,
//! face likelihoods become emotion fields, and the safe-search block is kept
//! verbatim.

use serde::Deserialize;

use crate::types::{
    FaceEmotions, ImageMetadata, NormalizedAnalysis, PaletteColor, ScoredLabel, Sentiment,
};

/// Confidence reported when no labels were detected.
pub const DEFAULT_CONFIDENCE: f32 = 0.5;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchAnnotateResponse {
    pub responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotateImageResponse {
    pub label_annotations: Vec<EntityAnnotation>,
    pub text_annotations: Vec<EntityAnnotation>,
    pub full_text_annotation: Option<FullTextAnnotation>,
    pub face_annotations: Vec<FaceAnnotation>,
    pub logo_annotations: Vec<EntityAnnotation>,
    pub safe_search_annotation: Option<serde_json::Value>,
    pub image_properties_annotation: Option<ImageProperties>,
    pub error: Option<Status>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityAnnotation {
    pub description: String,
    pub score: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FullTextAnnotation {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FaceAnnotation {
    pub joy_likelihood: String,
    pub sorrow_likelihood: String,
    pub anger_likelihood: String,
    pub surprise_likelihood: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageProperties {
    pub dominant_colors: DominantColors,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DominantColors {
    pub colors: Vec<ColorInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorInfo {
    pub color: RgbColor,
    pub score: f32,
    pub pixel_fraction: f32,
}

/// Channels are floats in [0, 255]; the API omits zero channels.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RgbColor {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl RgbColor {
    fn css(&self) -> String {
        let channel = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        format!(
            "rgb({}, {}, {})",
            channel(self.red),
            channel(self.green),
            channel(self.blue)
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Status {
    pub code: i32,
    pub message: String,
}

/// Build a normalized analysis from one annotate response.
pub fn normalize(response: AnnotateImageResponse, metadata: ImageMetadata) -> NormalizedAnalysis {
    let labels: Vec<ScoredLabel> = response
        .label_annotations
        .into_iter()
        .map(|l| ScoredLabel {
            name: l.description,
            score: l.score,
        })
        .collect();

    let confidence = labels
        .iter()
        .map(|l| l.score)
        .reduce(f32::max)
        .map(|s| s.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_CONFIDENCE);

    let palette: Vec<PaletteColor> = response
        .image_properties_annotation
        .map(|p| p.dominant_colors.colors)
        .unwrap_or_default()
        .into_iter()
        .map(|c| PaletteColor {
            color: c.color.css(),
            score: c.score,
            pixel_fraction: c.pixel_fraction,
        })
        .collect();

    let faces: Vec<FaceEmotions> = response
        .face_annotations
        .into_iter()
        .map(|f| FaceEmotions {
            joy: likelihood_or_unknown(f.joy_likelihood),
            sorrow: likelihood_or_unknown(f.sorrow_likelihood),
            anger: likelihood_or_unknown(f.anger_likelihood),
            surprise: likelihood_or_unknown(f.surprise_likelihood),
        })
        .collect();

    let text = response
        .full_text_annotation
        .map(|t| t.text)
        .or_else(|| {
            response
                .text_annotations
                .into_iter()
                .next()
                .map(|t| t.description)
        })
        .unwrap_or_default();

    let mut analysis = NormalizedAnalysis::new(
        labels.iter().map(|l| l.name.clone()).collect(),
        palette.iter().map(|c| c.color.clone()).collect(),
        sentiment_from_faces(&faces),
        confidence,
        text.trim(),
        metadata,
    );
    analysis.labels = labels;
    analysis.palette = palette;
    analysis.faces = faces;
    analysis.logos = response
        .logo_annotations
        .into_iter()
        .map(|l| l.description)
        .collect();
    analysis.safe_search = response.safe_search_annotation;
    analysis
}

fn likelihood_or_unknown(value: String) -> String {
    if value.is_empty() {
        "UNKNOWN".to_string()
    } else {
        value
    }
}

fn is_likely(likelihood: &str) -> bool {
    matches!(likelihood, "LIKELY" | "VERY_LIKELY")
}

/// Joy on any face reads positive, sorrow or anger negative, both mixed.
pub fn sentiment_from_faces(faces: &[FaceEmotions]) -> Sentiment {
    let joyful = faces.iter().any(|f| is_likely(&f.joy));
    let unhappy = faces
        .iter()
        .any(|f| is_likely(&f.sorrow) || is_likely(&f.anger));

    match (joyful, unhappy) {
        (true, true) => Sentiment::Mixed,
        (true, false) => Sentiment::Positive,
        (false, true) => Sentiment::Negative,
        (false, false) => Sentiment::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> ImageMetadata {
        ImageMetadata {
            width: 1024,
            height: 768,
            format: "jpeg".to_string(),
            size_bytes: 50_000,
        }
    }

    const SAMPLE: &str = r#"{
        "labelAnnotations": [
            {"mid": "/m/0bt9lr", "description": "Dog", "score": 0.97, "topicality": 0.97},
            {"mid": "/m/01_gv", "description": "Grass", "score": 0.88}
        ],
        "textAnnotations": [{"locale": "en", "description": "BEWARE OF DOG\n"}],
        "faceAnnotations": [
            {"joyLikelihood": "VERY_LIKELY", "sorrowLikelihood": "VERY_UNLIKELY",
             "angerLikelihood": "VERY_UNLIKELY", "surpriseLikelihood": "POSSIBLE"}
        ],
        "logoAnnotations": [{"description": "Acme", "score": 0.6}],
        "safeSearchAnnotation": {"adult": "VERY_UNLIKELY", "violence": "UNLIKELY", "racy": "POSSIBLE"},
        "imagePropertiesAnnotation": {
            "dominantColors": {"colors": [
                {"color": {"red": 34, "green": 139.4, "blue": 34}, "score": 0.6, "pixelFraction": 0.4},
                {"color": {"green": 128}, "score": 0.2, "pixelFraction": 0.1}
            ]}
        }
    }"#;

    #[test]
    fn test_normalize_full_response() {
        let response: AnnotateImageResponse = serde_json::from_str(SAMPLE).unwrap();
        let analysis = normalize(response, metadata());

        assert_eq!(analysis.objects, vec!["Dog", "Grass"]);
        assert!((analysis.labels[1].score - 0.88).abs() < 1e-6);
        assert!((analysis.confidence - 0.97).abs() < 1e-6);
        assert_eq!(analysis.colors, vec!["rgb(34, 139, 34)", "rgb(0, 128, 0)"]);
        assert!((analysis.palette[0].pixel_fraction - 0.4).abs() < 1e-6);
        assert_eq!(analysis.text, "BEWARE OF DOG");
        assert_eq!(analysis.faces[0].joy, "VERY_LIKELY");
        assert_eq!(analysis.faces[0].surprise, "POSSIBLE");
        assert_eq!(analysis.sentiment, Sentiment::Positive);
        assert_eq!(analysis.logos, vec!["Acme"]);
        assert_eq!(analysis.metadata, metadata());
    }

    #[test]
    fn test_safe_search_passed_through_verbatim() {
        let response: AnnotateImageResponse = serde_json::from_str(SAMPLE).unwrap();
        let analysis = normalize(response, metadata());
        let expected: serde_json::Value = serde_json::from_str(
            r#"{"adult": "VERY_UNLIKELY", "violence": "UNLIKELY", "racy": "POSSIBLE"}"#,
        )
        .unwrap();
        assert_eq!(analysis.safe_search, Some(expected));
    }

    #[test]
    fn test_empty_response_defaults() {
        let analysis = normalize(AnnotateImageResponse::default(), metadata());
        assert!(analysis.objects.is_empty());
        assert!(analysis.colors.is_empty());
        assert_eq!(analysis.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
        assert_eq!(analysis.text, "");
        assert!(analysis.safe_search.is_none());
    }

    #[test]
    fn test_full_text_preferred_over_text_annotations() {
        let response: AnnotateImageResponse = serde_json::from_str(
            r#"{"fullTextAnnotation": {"text": "Full page text"},
                "textAnnotations": [{"description": "fragment"}]}"#,
        )
        .unwrap();
        assert_eq!(normalize(response, metadata()).text, "Full page text");
    }

    #[test]
    fn test_sentiment_from_faces() {
        let face = |joy: &str, sorrow: &str, anger: &str| FaceEmotions {
            joy: joy.to_string(),
            sorrow: sorrow.to_string(),
            anger: anger.to_string(),
            surprise: "UNKNOWN".to_string(),
        };
        assert_eq!(sentiment_from_faces(&[]), Sentiment::Neutral);
        assert_eq!(
            sentiment_from_faces(&[face("UNLIKELY", "LIKELY", "UNLIKELY")]),
            Sentiment::Negative
        );
        assert_eq!(
            sentiment_from_faces(&[
                face("LIKELY", "UNLIKELY", "UNLIKELY"),
                face("UNLIKELY", "UNLIKELY", "VERY_LIKELY"),
            ]),
            Sentiment::Mixed
        );
        assert_eq!(
            sentiment_from_faces(&[face("POSSIBLE", "POSSIBLE", "POSSIBLE")]),
            Sentiment::Neutral
        );
    }

    #[test]
    fn test_error_status_parsed() {
        let batch: BatchAnnotateResponse = serde_json::from_str(
            r#"{"responses": [{"error": {"code": 3, "message": "Bad image data."}}]}"#,
        )
        .unwrap();
        let error = batch.responses[0].error.as_ref().unwrap();
        assert_eq!(error.code, 3);
        assert_eq!(error.message, "Bad image data.");
    }
}
