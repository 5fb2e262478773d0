//! Metrics setup and update for the mapper.

use prometheus::core::{AtomicU64, GenericCounter};

/// Counters updated while mapping events.
#[derive(Debug, Clone)]
pub struct Metrics {
    pub documents_total: GenericCounter<AtomicU64>,
    pub record_documents_total: GenericCounter<AtomicU64>,
    pub ignored_events_total: GenericCounter<AtomicU64>,
    pub empty_responses_total: GenericCounter<AtomicU64>,
    pub ambiguous_root_total: GenericCounter<AtomicU64>,
    pub fetch_pages_total: GenericCounter<AtomicU64>,
}

impl Metrics {
    /// Create the counters and register them with the provided Prometheus Registry.
    pub fn initialize(
        metrics_registry: &mut prometheus::Registry,
    ) -> Result<Self, prometheus::Error> {
        let documents_total = add_int_counter_metric(
            metrics_registry,
            "message_mapper_documents_total",
            "Total documents built from fetch responses.",
        )?;

        let record_documents_total = add_int_counter_metric(
            metrics_registry,
            "message_mapper_record_documents_total",
            "Total documents built straight from the event record.",
        )?;

        let ignored_events_total = add_int_counter_metric(
            metrics_registry,
            "message_mapper_ignored_events_total",
            "Total events ignored because of the user that initiated them.",
        )?;

        let empty_responses_total = add_int_counter_metric(
            metrics_registry,
            "message_mapper_empty_responses_total",
            "Total fetch queries that returned no rows.",
        )?;

        let ambiguous_root_total = add_int_counter_metric(
            metrics_registry,
            "message_mapper_ambiguous_root_total",
            "Total fetch responses rejected for describing several root records.",
        )?;

        let fetch_pages_total = add_int_counter_metric(
            metrics_registry,
            "message_mapper_fetch_pages_total",
            "Total pages retrieved from the fetch executor.",
        )?;

        Ok(Self {
            documents_total,
            record_documents_total,
            ignored_events_total,
            empty_responses_total,
            ambiguous_root_total,
            fetch_pages_total,
        })
    }
}

/// Create a new int counter metric and register it with the provided Prometheus Registry
fn add_int_counter_metric(
    metrics_registry: &mut prometheus::Registry,
    metric_name: &str,
    metric_description: &str,
) -> Result<GenericCounter<AtomicU64>, prometheus::Error> {
    let int_counter =
        prometheus::IntCounter::with_opts(prometheus::Opts::new(metric_name, metric_description))?;
    metrics_registry.register(Box::new(int_counter.clone()))?;
    Ok(int_counter)
}
