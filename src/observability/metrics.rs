use prometheus::{
    Gauge, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the process-wide `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Authorize metrics
    pub authorize_requests: IntCounter,
    pub authorize_failures: IntCounterVec,
    pub authorize_duration: Histogram,

    // Cache metrics
    pub token_cache_hits: IntCounterVec,
    pub token_valid_until: IntGauge,

    // Upstream data metrics
    pub upstream_requests: IntCounterVec,
    pub upstream_failures: IntCounterVec,
    pub upstream_duration: HistogramVec,

    // HTTP surface
    pub http_errors: IntCounterVec,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,

    // === Service resource metrics ===
    pub process_cpu_usage: Gauge,
    pub process_memory_usage: IntGauge,
    pub process_virtual_memory: IntGauge,
    pub process_open_fds: IntGauge,
    pub process_threads: IntGauge,
    pub process_start_time: IntGauge,
    pub process_uptime: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        // names and label sets are static
        let metrics = Arc::new(Self {
            registry: Registry::new_custom(Some("mbconnector".into()), None).unwrap(),

            // Authorize
            authorize_requests: IntCounter::new("authorize_requests_total", "Authorize exchanges started").unwrap(),
            authorize_failures: IntCounterVec::new(Opts::new("authorize_failures_total", "Authorize failures by reason"), &["reason"]).unwrap(),
            authorize_duration: Histogram::with_opts(HistogramOpts::new("authorize_duration_seconds", "Authorize round trip seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0])).unwrap(),

            // Cache
            token_cache_hits: IntCounterVec::new(Opts::new("token_cache_hits_total", "Tokens served from cache by path"), &["path"]).unwrap(),
            token_valid_until: IntGauge::new("token_valid_until_unix_seconds", "Validity end of the cached token").unwrap(),

            // Upstream
            upstream_requests: IntCounterVec::new(Opts::new("upstream_requests_total", "Upstream data requests"), &["endpoint"]).unwrap(),
            upstream_failures: IntCounterVec::new(Opts::new("upstream_failures_total", "Upstream data failures by reason"), &["endpoint", "reason"]).unwrap(),
            upstream_duration: HistogramVec::new(HistogramOpts::new("upstream_duration_seconds", "Upstream data request seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]), &["endpoint"]).unwrap(),

            http_errors: IntCounterVec::new(Opts::new("http_errors_total", "Error responses by status"), &["status"]).unwrap(),

            // Config/runtime
            config_validation_errors: IntCounter::new("config_validation_errors_total", "Validation errors during startup").unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),
            process_cpu_usage: Gauge::new("process_cpu_usage_percent", "CPU usage % of this process").unwrap(),
            process_memory_usage: IntGauge::new("process_memory_usage_bytes", "Resident memory used by this process").unwrap(),
            process_virtual_memory: IntGauge::new("process_virtual_memory_bytes", "Virtual memory used by this process").unwrap(),
            process_open_fds: IntGauge::new("process_open_fds", "Number of open file descriptors").unwrap(),
            process_threads: IntGauge::new("process_threads", "Thread count of this process").unwrap(),
            process_start_time: IntGauge::new("process_start_time_seconds", "Process start time (UNIX seconds)").unwrap(),
            process_uptime: IntGauge::new("process_uptime_seconds", "Process uptime seconds").unwrap(),
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(metrics.authorize_requests.clone()),
            Box::new(metrics.authorize_failures.clone()),
            Box::new(metrics.authorize_duration.clone()),
            Box::new(metrics.token_cache_hits.clone()),
            Box::new(metrics.token_valid_until.clone()),
            Box::new(metrics.upstream_requests.clone()),
            Box::new(metrics.upstream_failures.clone()),
            Box::new(metrics.upstream_duration.clone()),
            Box::new(metrics.http_errors.clone()),
            Box::new(metrics.config_validation_errors.clone()),
            Box::new(metrics.up.clone()),
            Box::new(metrics.process_cpu_usage.clone()),
            Box::new(metrics.process_memory_usage.clone()),
            Box::new(metrics.process_virtual_memory.clone()),
            Box::new(metrics.process_open_fds.clone()),
            Box::new(metrics.process_threads.clone()),
            Box::new(metrics.process_start_time.clone()),
            Box::new(metrics.process_uptime.clone()),
        ];
        for collector in collectors {
            if let Err(e) = reg.register(collector) {
                tracing::error!("metric registration failed: {}", e);
            }
        }

        metrics
    }
}

/// Metrics if they were already initialized, for call sites that cannot await.
pub fn try_get_metrics() -> Option<&'static Arc<Metrics>> {
    METRICS_INSTANCE.get()
}
