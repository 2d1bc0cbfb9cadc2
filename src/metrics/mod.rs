mod server;

use prometheus::core::Collector;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

pub use server::start_metrics_server;

// ============================================================================
// Platform Metrics - Prometheus
// ============================================================================
//
// Series, all under the `community` namespace:
// - uow_transactions_total / uow_transaction_duration_seconds per aggregate
// - events_published_total per event type
// - event_handler_invocations_total and event_handler_retries_total
// - dead_letters_total, overall and per event type
// - graphql_resolver_calls_total per field and outcome
//
// Scraped from /metrics on the metrics server.
// ============================================================================

const NAMESPACE: &str = "community";

/// Outcome label values.
pub mod outcome {
    pub const COMMITTED: &str = "committed";
    pub const ROLLED_BACK: &str = "rolled_back";
    pub const CONFLICT: &str = "conflict";
    pub const SUCCESS: &str = "success";
    pub const FAILED: &str = "failed";
    pub const DENIED: &str = "denied";
}

pub struct Metrics {
    registry: Registry,

    // Unit of work
    pub transactions_total: IntCounterVec,
    pub transaction_duration: HistogramVec,

    // Event bus
    pub events_published: IntCounterVec,
    pub handler_invocations: IntCounterVec,
    pub handler_retries: IntCounterVec,
    pub dead_letters_total: IntCounter,
    pub dead_letters_by_event_type: IntCounterVec,

    // GraphQL
    pub resolver_calls: IntCounterVec,
}

fn counter_vec(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> anyhow::Result<IntCounterVec> {
    let counter = IntCounterVec::new(Opts::new(name, help).namespace(NAMESPACE), labels)?;
    register(registry, &counter)?;
    Ok(counter)
}

fn register<C: Collector + Clone + 'static>(registry: &Registry, collector: &C) -> anyhow::Result<()> {
    registry.register(Box::new(collector.clone()))?;
    Ok(())
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let transactions_total = counter_vec(
            &registry,
            "uow_transactions_total",
            "Unit-of-work transactions by outcome",
            &["aggregate", "outcome"],
        )?;
        let transaction_duration = HistogramVec::new(
            HistogramOpts::new(
                "uow_transaction_duration_seconds",
                "Unit-of-work transaction duration",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["aggregate"],
        )?;
        register(&registry, &transaction_duration)?;

        let events_published = counter_vec(
            &registry,
            "events_published_total",
            "Domain events published after commit",
            &["event_type"],
        )?;
        let handler_invocations = counter_vec(
            &registry,
            "event_handler_invocations_total",
            "Integration-event handler runs, retries included, by final outcome",
            &["event_type", "handler", "outcome"],
        )?;
        let handler_retries = counter_vec(
            &registry,
            "event_handler_retries_total",
            "Integration-event handler attempts after the first",
            &["operation", "attempt"],
        )?;

        let dead_letters_total = IntCounter::with_opts(
            Opts::new("dead_letters_total", "Envelopes moved to the dead letter queue")
                .namespace(NAMESPACE),
        )?;
        register(&registry, &dead_letters_total)?;
        let dead_letters_by_event_type = counter_vec(
            &registry,
            "dead_letters_by_event_type_total",
            "Dead-lettered envelopes by event type",
            &["event_type"],
        )?;

        let resolver_calls = counter_vec(
            &registry,
            "graphql_resolver_calls_total",
            "GraphQL field resolutions by outcome",
            &["type_name", "field_name", "outcome"],
        )?;

        Ok(Self {
            registry,
            transactions_total,
            transaction_duration,
            events_published,
            handler_invocations,
            handler_retries,
            dead_letters_total,
            dead_letters_by_event_type,
            resolver_calls,
        })
    }

    /// Registry served by the metrics endpoint.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_transaction(&self, aggregate: &str, outcome: &str, duration_secs: f64) {
        self.transactions_total
            .with_label_values(&[aggregate, outcome])
            .inc();
        self.transaction_duration
            .with_label_values(&[aggregate])
            .observe(duration_secs);
    }

    pub fn record_event_published(&self, event_type: &str) {
        self.events_published.with_label_values(&[event_type]).inc();
    }

    pub fn record_handler_invocation(&self, event_type: &str, handler: &str, outcome: &str) {
        self.handler_invocations
            .with_label_values(&[event_type, handler, outcome])
            .inc();
    }

    /// `operation` is `<event type>/<handler>`; `attempt` counts from 2.
    pub fn record_retry_attempt(&self, operation: &str, attempt: u32) {
        let attempt = attempt.to_string();
        self.handler_retries
            .with_label_values(&[operation, attempt.as_str()])
            .inc();
    }

    pub fn record_dead_letter(&self, event_type: &str) {
        self.dead_letters_total.inc();
        self.dead_letters_by_event_type
            .with_label_values(&[event_type])
            .inc();
    }

    pub fn record_resolver_call(&self, type_name: &str, field_name: &str, outcome: &str) {
        self.resolver_calls
            .with_label_values(&[type_name, field_name, outcome])
            .inc();
    }
}
