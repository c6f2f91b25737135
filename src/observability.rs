use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: mutations executed by the serial lane. Labels: op, status.
pub const MUTATIONS_TOTAL: &str = "campfire_mutations_total";

/// Histogram: mutation latency in seconds, queue wait excluded. Labels: op.
pub const MUTATION_DURATION_SECONDS: &str = "campfire_mutation_duration_seconds";

/// Counter: availability queries served by the pool. Labels: status.
pub const QUERIES_TOTAL: &str = "campfire_queries_total";

/// Histogram: availability query latency in seconds.
pub const QUERY_DURATION_SECONDS: &str = "campfire_query_duration_seconds";

// ── USE metrics (resource state) ────────────────────────────────

/// Gauge: free days currently tracked by the availability cache.
pub const CACHE_FREE_DATES: &str = "campfire_cache_free_dates";

/// Counter: horizon rotations performed.
pub const ROTATIONS_TOTAL: &str = "campfire_rotations_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
