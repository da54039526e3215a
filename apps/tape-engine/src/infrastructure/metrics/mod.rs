//! Prometheus Metrics Module
//!
//! Exposes engine metrics via Prometheus format for monitoring.
//!
//! # Metrics
//!
//! - `tape_engine_trades_accepted_total`: accepted canonical events
//! - `tape_engine_messages_rejected_total{reason}`: dropped messages
//! - `tape_engine_lifecycle_transitions_total{status}`: status changes
//! - `tape_engine_buffer_len`: current history buffer length
//!
//! Metrics are exposed at `/metrics` on the health server port.

use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::domain::lifecycle::ConnectionStatus;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// # Panics
///
/// Panics if the recorder cannot be installed.
#[allow(clippy::expect_used)]
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder");

            register_metrics();
            handle
        })
        .clone()
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

fn register_metrics() {
    describe_counter!(
        "tape_engine_trades_accepted_total",
        "Total trade messages accepted into the history buffer"
    );
    describe_counter!(
        "tape_engine_messages_rejected_total",
        "Total inbound messages dropped by the normalizer, by reason"
    );
    describe_counter!(
        "tape_engine_lifecycle_transitions_total",
        "Total connection lifecycle transitions, by resulting status"
    );
    describe_gauge!(
        "tape_engine_buffer_len",
        "Current number of trades retained in the history buffer"
    );
}

/// Record an accepted trade event.
pub fn record_trade_accepted() {
    counter!("tape_engine_trades_accepted_total").increment(1);
}

/// Record a dropped inbound message.
pub fn record_message_rejected(reason: &'static str) {
    counter!(
        "tape_engine_messages_rejected_total",
        "reason" => reason
    )
    .increment(1);
}

/// Record a lifecycle transition into the given status.
pub fn record_lifecycle_transition(status: ConnectionStatus) {
    counter!(
        "tape_engine_lifecycle_transitions_total",
        "status" => status.as_str()
    )
    .increment(1);
}

/// Update the history buffer length gauge.
pub fn set_buffer_len(len: usize) {
    #[allow(clippy::cast_precision_loss)]
    gauge!("tape_engine_buffer_len").set(len as f64);
}

// =============================================================================
// Tests
// =============================================================================
