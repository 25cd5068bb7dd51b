use crate::MetricsSummary;
use aari_core::{AariError, AariResult, Intent};
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    UtterancesClassified,
    UnknownIntents,
    ModelDivergence,
    Clarifications,
    Dispatches,
    DispatchFailures,
    ContactUnresolved,
    ComplexTasks,
    Errors,
}

impl MetricType {
    pub const ALL: [MetricType; 9] = [
        MetricType::UtterancesClassified,
        MetricType::UnknownIntents,
        MetricType::ModelDivergence,
        MetricType::Clarifications,
        MetricType::Dispatches,
        MetricType::DispatchFailures,
        MetricType::ContactUnresolved,
        MetricType::ComplexTasks,
        MetricType::Errors,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MetricType::UtterancesClassified => "aari_utterances_classified_total",
            MetricType::UnknownIntents => "aari_unknown_intents_total",
            MetricType::ModelDivergence => "aari_model_divergence_total",
            MetricType::Clarifications => "aari_clarifications_total",
            MetricType::Dispatches => "aari_dispatches_total",
            MetricType::DispatchFailures => "aari_dispatch_failures_total",
            MetricType::ContactUnresolved => "aari_contact_unresolved_total",
            MetricType::ComplexTasks => "aari_complex_tasks_total",
            MetricType::Errors => "aari_errors_total",
        }
    }

    fn help(&self) -> &'static str {
        match self {
            MetricType::UtterancesClassified => "Utterances run through the classifier",
            MetricType::UnknownIntents => "Utterances classified as unknown",
            MetricType::ModelDivergence => "Statistical model disagreed with the keyword path",
            MetricType::Clarifications => "Clarifying questions asked instead of dispatching",
            MetricType::Dispatches => "Requests handed to the task sink",
            MetricType::DispatchFailures => "Dispatches that did not succeed",
            MetricType::ContactUnresolved => "Contacts that could not be resolved",
            MetricType::ComplexTasks => "Utterances routed through the complex-task path",
            MetricType::Errors => "Rejected or failed requests",
        }
    }
}

/// Counters registered in a private Prometheus registry.
pub struct Metrics {
    registry: Registry,
    counters: HashMap<MetricType, IntCounter>,
    intents: IntCounterVec,
}

fn metrics_error(e: prometheus::Error) -> AariError {
    AariError::Unknown(format!("Metrics registry error: {}", e))
}

impl Metrics {
    pub fn new() -> AariResult<Self> {
        let registry = Registry::new();

        let mut counters = HashMap::new();
        for metric in MetricType::ALL {
            let counter = IntCounter::new(metric.name(), metric.help()).map_err(metrics_error)?;
            registry
                .register(Box::new(counter.clone()))
                .map_err(metrics_error)?;
            counters.insert(metric, counter);
        }

        let intents = IntCounterVec::new(
            Opts::new("aari_intents_total", "Classified utterances per intent"),
            &["intent"],
        )
        .map_err(metrics_error)?;
        registry
            .register(Box::new(intents.clone()))
            .map_err(metrics_error)?;

        Ok(Self {
            registry,
            counters,
            intents,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn add(&self, metric: MetricType, value: u64) {
        if let Some(counter) = self.counters.get(&metric) {
            counter.inc_by(value);
        }
    }

    pub fn increment(&self, metric: MetricType) {
        self.add(metric, 1);
    }

    pub fn increment_intent(&self, intent: Intent) {
        self.intents.with_label_values(&[intent.as_str()]).inc();
    }

    pub fn get(&self, metric: MetricType) -> u64 {
        self.counters.get(&metric).map(IntCounter::get).unwrap_or_default()
    }

    pub fn intent_count(&self, intent: Intent) -> u64 {
        self.intents.with_label_values(&[intent.as_str()]).get()
    }

    pub fn get_summary(&self) -> MetricsSummary {
        MetricsSummary {
            utterances_classified: self.get(MetricType::UtterancesClassified),
            unknown_intents: self.get(MetricType::UnknownIntents),
            clarifications: self.get(MetricType::Clarifications),
            dispatches: self.get(MetricType::Dispatches),
            dispatch_failures: self.get(MetricType::DispatchFailures),
            complex_tasks: self.get(MetricType::ComplexTasks),
            errors: self.get(MetricType::Errors),
        }
    }
}
