// crates/nlu/src/bayes.rs

//! Multinomial Naive Bayes with additive smoothing over sparse TF-IDF features.

use aari_core::{AariError, AariResult, Intent};

use crate::tfidf::SparseVector;

#[derive(Debug, Clone)]
pub struct MultinomialNb {
    classes: Vec<Intent>,
    class_log_prior: Vec<f64>,
    /// `feature_log_prob[class][feature]`
    feature_log_prob: Vec<Vec<f64>>,
}

/// Predicted label together with its posterior probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub intent: Intent,
    pub probability: f64,
}

impl MultinomialNb {
    /// Fits the model. Classes keep the order of their first appearance in
    /// `labels`, which is also the tie-break order at prediction time.
    pub fn fit(
        samples: &[SparseVector],
        labels: &[Intent],
        num_features: usize,
        alpha: f64,
    ) -> AariResult<Self> {
        if samples.len() != labels.len() {
            return Err(AariError::Nlu(format!(
                "Sample/label count mismatch: {} vs {}",
                samples.len(),
                labels.len()
            )));
        }
        if samples.is_empty() || num_features == 0 {
            return Err(AariError::Nlu("Cannot fit Naive Bayes on empty data".to_string()));
        }
        if alpha <= 0.0 {
            return Err(AariError::Nlu("Smoothing must be positive".to_string()));
        }

        let mut classes: Vec<Intent> = Vec::new();
        for label in labels {
            if !classes.contains(label) {
                classes.push(*label);
            }
        }

        let mut class_counts = vec![0usize; classes.len()];
        let mut feature_counts = vec![vec![0.0f64; num_features]; classes.len()];

        for (sample, label) in samples.iter().zip(labels) {
            let class_idx = classes
                .iter()
                .position(|c| c == label)
                .ok_or_else(|| AariError::Nlu(format!("Unindexed label {}", label)))?;
            class_counts[class_idx] += 1;
            for &(feature, weight) in sample {
                if feature >= num_features {
                    return Err(AariError::Nlu(format!(
                        "Feature index {} out of range {}",
                        feature, num_features
                    )));
                }
                feature_counts[class_idx][feature] += weight;
            }
        }

        let total = samples.len() as f64;
        let class_log_prior = class_counts
            .iter()
            .map(|&count| (count as f64 / total).ln())
            .collect();

        let feature_log_prob = feature_counts
            .into_iter()
            .map(|counts| {
                let denominator = counts.iter().sum::<f64>() + alpha * num_features as f64;
                counts
                    .into_iter()
                    .map(|count| ((count + alpha) / denominator).ln())
                    .collect()
            })
            .collect();

        Ok(Self {
            classes,
            class_log_prior,
            feature_log_prob,
        })
    }

    pub fn classes(&self) -> &[Intent] {
        &self.classes
    }

    fn joint_log_likelihood(&self, sample: &SparseVector) -> Vec<f64> {
        self.class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, log_probs)| {
                prior
                    + sample
                        .iter()
                        .filter_map(|&(feature, weight)| {
                            log_probs.get(feature).map(|lp| weight * lp)
                        })
                        .sum::<f64>()
            })
            .collect()
    }

    /// Posterior distribution over classes, in class order.
    pub fn predict_proba(&self, sample: &SparseVector) -> Vec<(Intent, f64)> {
        let jll = self.joint_log_likelihood(sample);
        let max = jll.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = jll.iter().map(|v| (v - max).exp()).collect();
        let sum: f64 = exp.iter().sum();

        self.classes
            .iter()
            .zip(exp)
            .map(|(intent, e)| (*intent, e / sum))
            .collect()
    }

    /// Most probable class; the earliest class wins exact ties.
    pub fn predict(&self, sample: &SparseVector) -> Prediction {
        let mut best = Prediction {
            intent: self.classes[0],
            probability: f64::NEG_INFINITY,
        };
        for (intent, probability) in self.predict_proba(sample) {
            if probability > best.probability {
                best = Prediction {
                    intent,
                    probability,
                };
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_model() -> MultinomialNb {
        // feature 0 = "call", feature 1 = "play"
        let samples = vec![
            vec![(0, 1.0)],
            vec![(0, 0.8), (1, 0.2)],
            vec![(1, 1.0)],
        ];
        let labels = vec![Intent::MakeCall, Intent::MakeCall, Intent::PlayMedia];
        MultinomialNb::fit(&samples, &labels, 2, 0.1).unwrap()
    }

    #[test]
    fn predicts_dominant_feature_class() {
        let model = toy_model();
        assert_eq!(model.predict(&vec![(0, 1.0)]).intent, Intent::MakeCall);
        assert_eq!(model.predict(&vec![(1, 1.0)]).intent, Intent::PlayMedia);
    }

    #[test]
    fn posteriors_sum_to_one() {
        let model = toy_model();
        let total: f64 = model
            .predict_proba(&vec![(0, 0.5), (1, 0.5)])
            .iter()
            .map(|(_, p)| p)
            .sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_sample_falls_back_to_priors() {
        let model = toy_model();
        let prediction = model.predict(&Vec::new());
        assert_eq!(prediction.intent, Intent::MakeCall);
        assert!((prediction.probability - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn class_order_follows_first_appearance() {
        let model = toy_model();
        assert_eq!(model.classes(), &[Intent::MakeCall, Intent::PlayMedia]);
    }

    #[test]
    fn rejects_mismatched_inputs() {
        let samples = vec![vec![(0, 1.0)]];
        assert!(MultinomialNb::fit(&samples, &[], 1, 0.1).is_err());
        assert!(MultinomialNb::fit(&samples, &[Intent::Query], 1, 0.0).is_err());
        assert!(MultinomialNb::fit(&[vec![(3, 1.0)]], &[Intent::Query], 1, 0.1).is_err());
    }
}
