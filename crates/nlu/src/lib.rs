use std::sync::Arc;

use aari_core::{AariError, AariResult, ClassificationResult, EntityMap};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub mod bayes;
pub mod classifier;
pub mod corpus;
pub mod extractor;
pub mod keywords;
pub mod patterns;
pub mod tfidf;

pub use classifier::{IntentClassifier, IntentPrediction, StatisticalModel};
pub use extractor::EntityExtractor;
pub use keywords::{KeywordClassifier, KeywordMatch};
pub use patterns::{CapitalizedNameRecognizer, NameRecognizer};

const DEFAULT_MAX_FEATURES: usize = 500;
const DEFAULT_SMOOTHING: f64 = 0.1;
const DEFAULT_UNKNOWN_CONFIDENCE: f32 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NluConfig {
    #[serde(default = "default_true")]
    pub statistical_model: bool,
    #[serde(default = "default_max_features")]
    pub max_features: usize,
    #[serde(default = "default_smoothing")]
    pub smoothing: f64,
    #[serde(default = "default_unknown_confidence")]
    pub unknown_confidence: f32,
    #[serde(default = "default_true")]
    pub corroborate_confidence: bool,
    /// Enables the capitalised-name tier of contact extraction.
    #[serde(default)]
    pub name_recognizer: bool,
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            statistical_model: true,
            max_features: DEFAULT_MAX_FEATURES,
            smoothing: DEFAULT_SMOOTHING,
            unknown_confidence: DEFAULT_UNKNOWN_CONFIDENCE,
            corroborate_confidence: true,
            name_recognizer: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_features() -> usize {
    DEFAULT_MAX_FEATURES
}

fn default_smoothing() -> f64 {
    DEFAULT_SMOOTHING
}

fn default_unknown_confidence() -> f32 {
    DEFAULT_UNKNOWN_CONFIDENCE
}

/// Classifier and extractor behind one call. Immutable after construction and
/// safe to share across threads.
#[derive(Debug)]
pub struct NluEngine {
    classifier: IntentClassifier,
    extractor: EntityExtractor,
}

impl NluEngine {
    pub fn new(config: NluConfig) -> AariResult<Self> {
        let mut extractor = EntityExtractor::new()?;
        if config.name_recognizer {
            extractor = extractor.with_recognizer(Arc::new(CapitalizedNameRecognizer));
        }

        let classifier = IntentClassifier::new(&config);
        info!(
            "NLU engine ready (statistical model: {}, name recognizer: {})",
            classifier.has_model(),
            config.name_recognizer
        );

        Ok(Self {
            classifier,
            extractor,
        })
    }

    pub fn classify(&self, utterance: &str) -> IntentPrediction {
        self.classifier.classify(utterance)
    }

    pub fn extract(&self, utterance: &str) -> EntityMap {
        self.extractor.extract(utterance)
    }

    /// Classifies and extracts in one pass. Empty or NUL-containing input is
    /// rejected; everything else yields a result.
    pub fn process(&self, utterance: &str) -> AariResult<ClassificationResult> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(AariError::InvalidInput("Empty utterance".to_string()));
        }
        if utterance.contains('\0') {
            return Err(AariError::InvalidInput(
                "Utterance contains a NUL character".to_string(),
            ));
        }

        let prediction = self.classify(utterance);
        let entities = self.extract(utterance);

        debug!(
            "Classified '{}' as {} ({:.2}, {:?}) with {} entities",
            utterance,
            prediction.intent,
            prediction.confidence,
            prediction.source,
            entities.len()
        );

        Ok(ClassificationResult {
            utterance: utterance.to_string(),
            intent: prediction.intent,
            entities,
            confidence: prediction.confidence,
            source: prediction.source,
            model_intent: prediction.model_intent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aari_core::{ConfidenceSource, EntityKind, Intent};

    fn engine() -> NluEngine {
        NluEngine::new(NluConfig::default()).unwrap()
    }

    #[test]
    fn processes_message_command() {
        let result = engine()
            .process("send message to john saying hello friend")
            .unwrap();
        assert_eq!(result.intent, Intent::SendMessage);
        assert_eq!(result.entities.get(EntityKind::Contact), Some("john"));
        assert_eq!(result.entities.get(EntityKind::Message), Some("hello friend"));
        assert!(result.confidence > 0.0 && result.confidence <= 1.0);
    }

    #[test]
    fn strong_keywords_exceed_unknown_floor() {
        let engine = engine();
        for (utterance, intent) in [
            ("call mom", Intent::MakeCall),
            ("play music", Intent::PlayMedia),
            ("download the report", Intent::DownloadFile),
            ("remind me to stretch", Intent::SetReminder),
        ] {
            let result = engine.process(utterance).unwrap();
            assert_eq!(result.intent, intent, "{}", utterance);
            assert!(result.confidence > 0.3, "{}: {}", utterance, result.confidence);
        }
    }

    #[test]
    fn unknown_is_pinned_low() {
        let result = engine().process("zxqv blorp").unwrap();
        assert_eq!(result.intent, Intent::Unknown);
        assert_eq!(result.confidence, 0.3);
        assert_eq!(result.source, ConfidenceSource::Fallback);
    }

    #[test]
    fn rejects_empty_and_nul_input() {
        let engine = engine();
        assert!(matches!(
            engine.process("   "),
            Err(AariError::InvalidInput(_))
        ));
        assert!(matches!(
            engine.process("call\0mom"),
            Err(AariError::InvalidInput(_))
        ));
    }

    #[test]
    fn uppercase_input_is_normalised() {
        let result = engine().process("CALL MOM").unwrap();
        assert_eq!(result.intent, Intent::MakeCall);
        assert_eq!(result.entities.get(EntityKind::Contact), Some("mom"));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: NluConfig = serde_json::from_str(r#"{"smoothing": 0.5}"#).unwrap();
        assert!(config.statistical_model);
        assert_eq!(config.max_features, 500);
        assert_eq!(config.smoothing, 0.5);
        assert!(!config.name_recognizer);
    }

    #[test]
    fn name_recognizer_can_be_enabled() {
        let engine = NluEngine::new(NluConfig {
            name_recognizer: true,
            ..NluConfig::default()
        })
        .unwrap();
        let result = engine.process("please email Mary Poppins").unwrap();
        assert_eq!(result.entities.get(EntityKind::Contact), Some("poppins"));
    }
}
