use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::{Arc, OnceLock};
use tracing::info;

// Declare the static OnceLock to hold the Metrics.
static METRICS_INSTANCE: OnceLock<Arc<Metrics>> = OnceLock::new();

/// Initializes on first use and returns the process-wide `Metrics`.
pub fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| {
        info!("Initializing Metrics ...");
        Metrics::new()
    })
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Request metrics
    pub requests: IntCounterVec,
    pub request_failures: IntCounterVec,
    pub request_duration: HistogramVec,

    // Auth metrics
    pub provider_calls: IntCounterVec,
    pub auth_retries: IntCounter,
    pub session_expired: IntCounter,

    // Cache metrics
    pub cached_token_expiry_unix: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("classroomclient".into()), None).expect("valid registry prefix");

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Requests
            requests: IntCounterVec::new(Opts::new("requests_total", "Total API calls by method"), &["method"]).expect("requests_total"),
            request_failures: IntCounterVec::new(Opts::new("request_failures_total", "Rejected API calls by kind"), &["kind"]).expect("request_failures_total"),
            request_duration: HistogramVec::new(HistogramOpts::new("request_duration_seconds", "API call duration seconds, retries included").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]), &["method"]).expect("request_duration_seconds"),

            // Auth
            provider_calls: IntCounterVec::new(Opts::new("token_provider_calls_total", "Access token provider invocations by outcome"), &["outcome"]).expect("token_provider_calls_total"),
            auth_retries: IntCounter::new("auth_retries_total", "Requests resent after a 401").expect("auth_retries_total"),
            session_expired: IntCounter::new("session_expired_total", "Unrecoverable authorization failures").expect("session_expired_total"),

            // Cache
            cached_token_expiry_unix: IntGauge::new("cached_token_expiry_unix_seconds", "Expiry of the most recently cached token").expect("cached_token_expiry_unix_seconds"),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        let _ = reg.register(Box::new(metrics.requests.clone()));
        let _ = reg.register(Box::new(metrics.request_failures.clone()));
        let _ = reg.register(Box::new(metrics.request_duration.clone()));
        let _ = reg.register(Box::new(metrics.provider_calls.clone()));
        let _ = reg.register(Box::new(metrics.auth_retries.clone()));
        let _ = reg.register(Box::new(metrics.session_expired.clone()));
        let _ = reg.register(Box::new(metrics.cached_token_expiry_unix.clone()));

        metrics
    }
}

/// Text exposition of everything registered so far.
pub fn gather_text() -> anyhow::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = get_metrics().registry.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
