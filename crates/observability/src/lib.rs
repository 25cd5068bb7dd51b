// crates/observability/src/lib.rs

use aari_core::{AariError, AariResult, ClassificationResult, Intent};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

pub mod metrics;

pub use metrics::{MetricType, Metrics};

/// Observability configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            service_name: "aari".to_string(),
        }
    }
}

/// Metrics collector
pub struct MetricsCollector {
    config: ObservabilityConfig,
    metrics: Arc<Metrics>,
    start_time: Instant,
}

impl MetricsCollector {
    pub fn new() -> AariResult<Self> {
        Self::with_config(ObservabilityConfig::default())
    }

    pub fn with_config(config: ObservabilityConfig) -> AariResult<Self> {
        Ok(Self {
            config,
            metrics: Arc::new(Metrics::new()?),
            start_time: Instant::now(),
        })
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn add(&self, metric: MetricType, value: u64) {
        if self.config.metrics_enabled {
            self.metrics.add(metric, value);
        }
    }

    pub fn increment(&self, metric: MetricType) {
        self.add(metric, 1);
    }

    /// Counts one classified utterance, its intent, and whether the
    /// statistical model disagreed.
    pub fn record_classification(&self, result: &ClassificationResult) {
        if !self.config.metrics_enabled {
            return;
        }

        self.metrics.increment(MetricType::UtterancesClassified);
        self.metrics.increment_intent(result.intent);
        if result.intent == Intent::Unknown {
            self.metrics.increment(MetricType::UnknownIntents);
        }
        if result.model_diverged() {
            debug!(
                "Model predicted {:?} but keywords chose {}",
                result.model_intent, result.intent
            );
            self.metrics.increment(MetricType::ModelDivergence);
        }
    }

    pub fn get_prometheus_metrics(&self) -> AariResult<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.metrics.registry().gather();
        let mut buffer = vec![];
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| AariError::Unknown(format!("Failed to encode metrics: {}", e)))?;
        String::from_utf8(buffer)
            .map_err(|e| AariError::Unknown(format!("Metrics are not UTF-8: {}", e)))
    }

    pub fn get_health_status(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_name: self.config.service_name.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            metrics: self.metrics.get_summary(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub service_name: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub metrics: MetricsSummary,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub utterances_classified: u64,
    pub unknown_intents: u64,
    pub clarifications: u64,
    pub dispatches: u64,
    pub dispatch_failures: u64,
    pub complex_tasks: u64,
    pub errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use aari_core::{ConfidenceSource, EntityMap};

    fn result(intent: Intent, model_intent: Option<Intent>) -> ClassificationResult {
        ClassificationResult {
            utterance: "x".to_string(),
            intent,
            entities: EntityMap::new(),
            confidence: 0.3,
            source: ConfidenceSource::Keyword,
            model_intent,
        }
    }

    #[test]
    fn classification_counters() {
        let collector = MetricsCollector::new().unwrap();
        collector.record_classification(&result(Intent::MakeCall, Some(Intent::MakeCall)));
        collector.record_classification(&result(Intent::Unknown, None));
        collector.record_classification(&result(Intent::Query, Some(Intent::PlayMedia)));

        let metrics = collector.metrics();
        assert_eq!(metrics.get(MetricType::UtterancesClassified), 3);
        assert_eq!(metrics.get(MetricType::UnknownIntents), 1);
        assert_eq!(metrics.get(MetricType::ModelDivergence), 1);
        assert_eq!(metrics.intent_count(Intent::MakeCall), 1);
    }

    #[test]
    fn collectors_do_not_share_state() {
        let a = MetricsCollector::new().unwrap();
        let b = MetricsCollector::new().unwrap();
        a.increment(MetricType::Dispatches);
        assert_eq!(a.get_health_status().metrics.dispatches, 1);
        assert_eq!(b.get_health_status().metrics.dispatches, 0);
    }

    #[test]
    fn disabled_metrics_stay_zero() {
        let collector = MetricsCollector::with_config(ObservabilityConfig {
            metrics_enabled: false,
            ..ObservabilityConfig::default()
        })
        .unwrap();
        collector.increment(MetricType::Errors);
        collector.record_classification(&result(Intent::Greeting, None));
        assert_eq!(collector.get_health_status().metrics, MetricsSummary::default());
    }

    #[test]
    fn prometheus_text_exposition() {
        let collector = MetricsCollector::new().unwrap();
        collector.increment(MetricType::Clarifications);
        collector.record_classification(&result(Intent::SetReminder, None));

        let text = collector.get_prometheus_metrics().unwrap();
        assert!(text.contains("aari_clarifications_total 1"));
        assert!(text.contains("aari_intents_total{intent=\"set_reminder\"} 1"));
    }
}
