//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sender_sends_total` (counter): resend attempts by result
//! - `sender_polls_total` (counter): status polls by result
//! - `sender_outcomes_total` (counter): waiter outcomes
//! - `sender_confirmation_seconds` (histogram): time from first send to outcome
//! - `sender_simulations_total` (counter): simulations by result
//!
//! Recording is a no-op until a recorder is installed, so library users
//! and tests pay nothing unless they opt in.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_send(ok: bool) {
    counter!("sender_sends_total", "result" => result_label(ok)).increment(1);
}

pub fn record_poll(ok: bool) {
    counter!("sender_polls_total", "result" => result_label(ok)).increment(1);
}

pub fn record_simulation(ok: bool) {
    counter!("sender_simulations_total", "result" => result_label(ok)).increment(1);
}

/// Record a waiter outcome (`confirmed`, `failed`, `expired`, `timed_out`).
pub fn record_outcome(outcome: &'static str, elapsed: Duration) {
    counter!("sender_outcomes_total", "outcome" => outcome).increment(1);
    histogram!("sender_confirmation_seconds", "outcome" => outcome).record(elapsed.as_secs_f64());
}

fn result_label(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "error"
    }
}
