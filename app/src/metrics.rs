//! # Prometheus Metrics
//!
//! Operational metrics for the HTTP server, rendered at `/metrics`.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so they
//! do not collide with any default global registry consumers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};
use std::sync::Arc;

use mockbank_ledger::{Amount, Transaction, TransactionType};

/// Holds all Prometheus metric handles for the server.
///
/// Clone-friendly (prometheus handles are `Arc`s internally) so it can be
/// shared across request handlers.
#[derive(Clone)]
pub struct AppMetrics {
    registry: Registry,
    /// Transfers applied to the ledger.
    pub transfers_completed_total: IntCounter,
    /// Top-ups applied to the ledger.
    pub top_ups_completed_total: IntCounter,
    /// Submissions refused by validation or the single-flight guard.
    pub submissions_rejected_total: IntCounter,
    /// Times the bank directory fell back to the built-in list.
    pub directory_fallbacks_total: IntCounter,
    /// Balance after the last applied transaction, in kobo.
    pub balance_kobo: IntGauge,
    /// Wall time from submission to completion, simulated delay included.
    pub processing_latency_seconds: Histogram,
}

impl AppMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("mockbank".into()), None)?;

        let transfers_completed_total = IntCounter::new(
            "transfers_completed_total",
            "Total number of transfers applied to the ledger",
        )?;
        registry.register(Box::new(transfers_completed_total.clone()))?;

        let top_ups_completed_total = IntCounter::new(
            "top_ups_completed_total",
            "Total number of top-ups applied to the ledger",
        )?;
        registry.register(Box::new(top_ups_completed_total.clone()))?;

        let submissions_rejected_total = IntCounter::new(
            "submissions_rejected_total",
            "Total number of submissions refused before processing",
        )?;
        registry.register(Box::new(submissions_rejected_total.clone()))?;

        let directory_fallbacks_total = IntCounter::new(
            "directory_fallbacks_total",
            "Times the bank directory was replaced by the fallback list",
        )?;
        registry.register(Box::new(directory_fallbacks_total.clone()))?;

        let balance_kobo = IntGauge::new("balance_kobo", "Current ledger balance in kobo")?;
        registry.register(Box::new(balance_kobo.clone()))?;

        let processing_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "processing_latency_seconds",
                "Submission to completion latency in seconds",
            )
            .buckets(vec![0.01, 0.1, 0.5, 1.0, 2.0, 2.5, 3.0, 3.5, 5.0, 10.0]),
        )?;
        registry.register(Box::new(processing_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            transfers_completed_total,
            top_ups_completed_total,
            submissions_rejected_total,
            directory_fallbacks_total,
            balance_kobo,
            processing_latency_seconds,
        })
    }

    /// Records a completed transaction and the balance it left behind.
    pub fn record_completed(&self, tx: &Transaction, balance: Amount, elapsed_secs: f64) {
        match tx.kind {
            TransactionType::Transfer => self.transfers_completed_total.inc(),
            TransactionType::Credit => self.top_ups_completed_total.inc(),
        }
        self.set_balance(balance);
        self.processing_latency_seconds.observe(elapsed_secs);
    }

    pub fn set_balance(&self, balance: Amount) {
        self.balance_kobo
            .set(i64::try_from(balance.kobo()).unwrap_or(i64::MAX));
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<AppMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
///
/// Returns HTTP 500 if encoding fails.
pub async fn metrics_handler(State(metrics): State<SharedMetrics>) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
