// crates/nlu/src/classifier.rs

use aari_core::{AariResult, ConfidenceSource, Intent};
use tracing::{debug, info, warn};

use crate::bayes::{MultinomialNb, Prediction};
use crate::corpus;
use crate::keywords::KeywordClassifier;
use crate::tfidf::TfidfVectorizer;
use crate::NluConfig;

/// How far above the unknown confidence a weak keyword match is lifted.
pub const MATCH_FLOOR_MARGIN: f32 = 0.05;

/// TF-IDF features feeding a multinomial Naive Bayes model, trained once from
/// the embedded corpus.
#[derive(Debug, Clone)]
pub struct StatisticalModel {
    vectorizer: TfidfVectorizer,
    model: MultinomialNb,
}

impl StatisticalModel {
    pub fn train(max_features: usize, smoothing: f64) -> AariResult<Self> {
        let (texts, labels) = corpus::training_samples();
        let vectorizer = TfidfVectorizer::fit(&texts, max_features)?;
        let samples = texts
            .iter()
            .map(|text| vectorizer.transform(text))
            .collect::<Vec<_>>();
        let model = MultinomialNb::fit(
            &samples,
            &labels,
            vectorizer.vocabulary_size(),
            smoothing,
        )?;

        info!(
            "Trained intent model: {} samples, {} features, {} intents",
            texts.len(),
            vectorizer.vocabulary_size(),
            model.classes().len()
        );

        Ok(Self { vectorizer, model })
    }

    /// `None` when the utterance shares no vocabulary with the corpus.
    pub fn predict(&self, text: &str) -> Option<Prediction> {
        let features = self.vectorizer.transform(text);
        if features.is_empty() {
            return None;
        }
        Some(self.model.predict(&features))
    }

    pub fn posterior(&self, text: &str, intent: Intent) -> Option<f64> {
        let features = self.vectorizer.transform(text);
        if features.is_empty() {
            return None;
        }
        self.model
            .predict_proba(&features)
            .into_iter()
            .find(|(candidate, _)| *candidate == intent)
            .map(|(_, p)| p)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntentPrediction {
    pub intent: Intent,
    pub confidence: f32,
    pub source: ConfidenceSource,
    pub model_intent: Option<Intent>,
}

/// Keyword scoring decides the intent; the statistical model, when present,
/// only corroborates the confidence and reports divergence. A matched intent
/// always reports a confidence strictly above `unknown_confidence`.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    keywords: KeywordClassifier,
    model: Option<StatisticalModel>,
    unknown_confidence: f32,
    corroborate: bool,
}

impl IntentClassifier {
    pub fn new(config: &NluConfig) -> Self {
        let model = if config.statistical_model {
            match StatisticalModel::train(config.max_features, config.smoothing) {
                Ok(model) => Some(model),
                Err(e) => {
                    warn!("Statistical intent model unavailable, using keywords only: {}", e);
                    None
                }
            }
        } else {
            info!("Statistical intent model disabled, using keywords only");
            None
        };

        Self {
            keywords: KeywordClassifier::new(),
            model,
            unknown_confidence: config.unknown_confidence,
            corroborate: config.corroborate_confidence,
        }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Classifies an utterance. Never fails: anything unmatched is
    /// `Intent::Unknown` with the fixed low confidence.
    pub fn classify(&self, utterance: &str) -> IntentPrediction {
        let text = utterance.to_lowercase();
        let model_prediction = self.model.as_ref().and_then(|m| m.predict(&text));
        let model_intent = model_prediction.map(|p| p.intent);

        let Some(matched) = self.keywords.classify(&text) else {
            return IntentPrediction {
                intent: Intent::Unknown,
                confidence: self.unknown_confidence,
                source: ConfidenceSource::Fallback,
                model_intent,
            };
        };

        let mut prediction = IntentPrediction {
            intent: matched.intent,
            confidence: matched.confidence,
            source: ConfidenceSource::Keyword,
            model_intent,
        };

        if let (Some(model), Some(model_prediction)) = (self.model.as_ref(), model_prediction) {
            let agrees = model_prediction.intent == matched.intent;
            if !agrees {
                debug!(
                    "Model prefers {} ({:.2}) over keyword intent {}",
                    model_prediction.intent, model_prediction.probability, matched.intent
                );
            }

            if self.corroborate {
                let posterior = if agrees {
                    Some(model_prediction.probability)
                } else {
                    model.posterior(&text, matched.intent)
                };
                if let Some(posterior) = posterior.map(|p| (p as f32).min(1.0)) {
                    if posterior > prediction.confidence {
                        prediction.confidence = posterior;
                        prediction.source = ConfidenceSource::Corroborated;
                    }
                }
            }
        }

        // A match must always outrank `Unknown`.
        if prediction.confidence <= self.unknown_confidence {
            prediction.confidence = (self.unknown_confidence + MATCH_FLOOR_MARGIN).min(1.0);
            prediction.source = ConfidenceSource::Floored;
        }

        prediction
    }
}
