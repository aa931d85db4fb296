//! Prometheus metrics registry and instruments.

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder,
};

/// All instruments live on one registry so `/metrics` can gather them in
/// a single pass.
pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
    pub provider_requests_total: IntCounter,
    pub provider_request_failures_total: IntCounter,
    pub sweep_symbols_total: IntCounter,
    pub symbols_skipped_total: IntCounter,
    pub signals_stored_total: IntCounter,
    pub store_failures_total: IntCounter,
    pub sweeps_completed_total: IntCounter,
    pub database_connected: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounter::with_opts(Opts::new(
            "http_requests_total",
            "Total HTTP requests handled",
        ))?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        let http_requests_in_flight = IntGauge::with_opts(Opts::new(
            "http_requests_in_flight",
            "HTTP requests currently being served",
        ))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;

        let provider_requests_total = IntCounter::with_opts(Opts::new(
            "provider_requests_total",
            "Outbound requests to the indicator and price providers",
        ))?;
        registry.register(Box::new(provider_requests_total.clone()))?;

        let provider_request_failures_total = IntCounter::with_opts(Opts::new(
            "provider_request_failures_total",
            "Failed provider requests, counted per attempt",
        ))?;
        registry.register(Box::new(provider_request_failures_total.clone()))?;

        let sweep_symbols_total = IntCounter::with_opts(Opts::new(
            "sweep_symbols_total",
            "Symbols processed across all sweeps",
        ))?;
        registry.register(Box::new(sweep_symbols_total.clone()))?;

        let symbols_skipped_total = IntCounter::with_opts(Opts::new(
            "symbols_skipped_total",
            "Symbols skipped because their fetch was abandoned",
        ))?;
        registry.register(Box::new(symbols_skipped_total.clone()))?;

        let signals_stored_total = IntCounter::with_opts(Opts::new(
            "signals_stored_total",
            "Signal rows upserted into the store",
        ))?;
        registry.register(Box::new(signals_stored_total.clone()))?;

        let store_failures_total = IntCounter::with_opts(Opts::new(
            "store_failures_total",
            "Signal updates dropped after store retries were exhausted",
        ))?;
        registry.register(Box::new(store_failures_total.clone()))?;

        let sweeps_completed_total = IntCounter::with_opts(Opts::new(
            "sweeps_completed_total",
            "Completed sweep passes across both cadences",
        ))?;
        registry.register(Box::new(sweeps_completed_total.clone()))?;

        let database_connected = Gauge::with_opts(Opts::new(
            "database_connected",
            "Whether the signal database connection is up (1) or down (0)",
        ))?;
        registry.register(Box::new(database_connected.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            provider_requests_total,
            provider_request_failures_total,
            sweep_symbols_total,
            symbols_skipped_total,
            signals_stored_total,
            store_failures_total,
            sweeps_completed_total,
            database_connected,
        })
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
